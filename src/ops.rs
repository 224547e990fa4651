use crate::{
  dual::Dual,
  scalar::Real,
};


/// Anything that can report a value and its derivative with respect
/// to the seeded variable.
///
/// Implemented by the eager [Dual] as well as the lazy [Expr](crate::Expr).
/// For lazy expressions, both accessors recompute their result from the
/// operands on every call.

pub trait Expression<T: Real> {
  fn value(&self) -> T;
  fn derivative(&self) -> T;

  /// Materialize into a concrete [Dual], querying the value
  /// and the derivative exactly once each.

  fn eval(&self) -> Dual<T> {
    Dual::new(self.value(), self.derivative())
  }
}


/// Differentiable elementary functions.
///
/// [Dual] computes its result right away, while
/// [Expr](crate::Expr) records another node in the expression tree.

pub trait RealOps<T: Real> {
  type Output;

  fn sin(&self) -> Self::Output;
  fn cos(&self) -> Self::Output;
  fn exp(&self) -> Self::Output;
  fn log(&self) -> Self::Output;

  /// Raise to a constant exponent. The exponent itself is not differentiated.
  fn pow(&self, k: T) -> Self::Output;

  fn abs(&self) -> Self::Output;

  fn sqr(&self) -> Self::Output {
    self.pow(T::one() + T::one())
  }

  fn sqrt(&self) -> Self::Output {
    self.pow(T::one() / (T::one() + T::one()))
  }
}


#[cfg(test)]
mod tests {
  use std::cell::Cell;

  use super::*;
  use crate::internal::assert_close;

  struct Counting {
    values: Cell<usize>,
    derivatives: Cell<usize>,
  }

  impl Expression<f64> for Counting {
    fn value(&self) -> f64 {
      self.values.set(self.values.get() + 1);
      4.0
    }

    fn derivative(&self) -> f64 {
      self.derivatives.set(self.derivatives.get() + 1);
      -1.5
    }
  }

  #[test]
  fn eval_queries_once() {
    let expr = Counting { values: Cell::new(0), derivatives: Cell::new(0) };
    let dual = expr.eval();
    assert_eq!(dual, Dual::new(4.0, -1.5));
    assert_eq!(expr.values.get(), 1);
    assert_eq!(expr.derivatives.get(), 1);
  }

  #[test]
  fn sqr_and_sqrt() {
    let x: Dual = Dual::variable(3.0);
    assert_close(x.sqr().derivative(), 6.0);
    assert_close(x.sqrt().derivative(), 0.5 / 3f64.sqrt());
  }
}
