//! Forward-mode automatic differentiation with dual numbers.
//! Tiny. Few dependencies. Stable Rust.
//!
//! # Features
//!
//! - **Eager duals** — [Dual] computes a value and its derivative with
//! respect to one seeded variable right away, for every operation.
//!
//! - **Lazy expressions** — [Expr] records operations in a tree of shared
//! nodes and computes nothing until the expression gets materialized
//! into a [Dual]. Operands are reference counted, so expressions may
//! freely outlive the variables they were built from.
//!
//! - **Arbitrary scalar types** — Both engines work with any inner type
//! that satisfies [scalar::Real], such as [f32] and [f64].
//!
//! - **Graph recycling** — Expression [graphs](Graph) can be re-evaluated
//! with new input values, and saved to or loaded from disc.
//!
//! # Examples
//!
//! Differentiating a function with both engines:
//! ```
//! use microdual::{ ops::*, Dual, Expr };
//!
//! // Seed the variable of interest with a derivative of one
//! let x: Dual = Dual::variable(5.32);
//! let y = (x * x).sin();
//!
//! // Same function, evaluated lazily
//! let x: Expr = Expr::variable(5.32);
//! let f = (&x * &x).sin();
//! let z = f.eval();
//!
//! assert_eq!(y, z);
//! println!("f(x) = {}, f'(x) = {}", z.value(), z.derivative());
//! ```
//!
//! ## More examples
//! Check the `/demos` folder for more example code.
//!
//!
//! # Optional features
//!
//! Some features can be toggled in your `Cargo.toml`.
//!
//! - `serialize` *(default)* — Serialization of duals and expression graphs using [serde] and [postcard].

mod internal;
mod dual;
mod expr;

pub mod ops;
pub mod scalar;

pub use dual::Dual;
pub use expr::{ Expr, Graph, BinaryNode, UnaryNode };


/// Everything needed for everyday use.

pub mod prelude {
  pub use crate::{
    Dual,
    Expr,
    Graph,
    scalar::Real,
    ops::{ Expression, RealOps },
  };
}
