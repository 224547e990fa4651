#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

use crate::{
  expr::Expr,
  scalar::Real,
  ops::{ Expression, RealOps },
};


/// Eagerly evaluated dual number.
///
/// Holds a value together with its derivative with respect to a single
/// seeded variable. Every operator computes both parts immediately.
///
/// Seed the variable of interest with [variable](Dual::variable) and
/// everything else with [scalar](Dual::scalar):
///
/// ```
/// use microdual::{ ops::*, Dual };
///
/// let x: Dual = Dual::variable(2.0);
/// let y = x * x * x - 4.0 * x;
/// assert_eq!(y.derivative(), 3.0 * 2.0 * 2.0 - 4.0);
/// ```

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Dual<T: Real = f64> {
  value: T,
  derivative: T,
}

impl<T: Real> Dual<T> {
  pub fn new(value: T, derivative: T) -> Self {
    Self { value, derivative }
  }

  /// Constant with a derivative of zero.

  pub fn scalar(value: T) -> Self {
    Self::new(value, T::zero())
  }

  /// The variable to differentiate against, seeded with a derivative of one.

  pub fn variable(value: T) -> Self {
    Self::new(value, T::one())
  }

  pub fn value(&self) -> T {
    self.value
  }

  pub fn derivative(&self) -> T {
    self.derivative
  }

  pub fn set_value(&mut self, value: T) {
    self.value = value;
  }

  pub fn set_derivative(&mut self, derivative: T) {
    self.derivative = derivative;
  }

  /// Evaluate an expression into this Dual.

  pub fn assign(&mut self, expr: &impl Expression<T>) -> &mut Self {
    self.value = expr.value();
    self.derivative = expr.derivative();
    self
  }

  /// Wrap in a lazy expression leaf that can later be
  /// [fed](Expr::feed) with new values.

  pub fn lazy(&self) -> Expr<T> {
    Expr::leaf(*self)
  }
}

impl<T: Real> Expression<T> for Dual<T> {
  fn value(&self) -> T {
    self.value
  }

  fn derivative(&self) -> T {
    self.derivative
  }

  fn eval(&self) -> Dual<T> {
    *self
  }
}

impl<T: Real> From<T> for Dual<T> {
  fn from(value: T) -> Self {
    Self::scalar(value)
  }
}

impl<T: Real> From<&Expr<T>> for Dual<T> {
  fn from(expr: &Expr<T>) -> Self {
    expr.eval()
  }
}

impl<T: Real> From<Expr<T>> for Dual<T> {
  fn from(expr: Expr<T>) -> Self {
    expr.eval()
  }
}

impl<T: Real> RealOps<T> for Dual<T> {
  type Output = Self;

  fn sin(&self) -> Self {
    Self::new(self.value.sin(), self.derivative * self.value.cos())
  }

  fn cos(&self) -> Self {
    Self::new(self.value.cos(), -self.derivative * self.value.sin())
  }

  fn exp(&self) -> Self {
    Self::new(self.value.exp(), self.derivative * self.value.exp())
  }

  fn log(&self) -> Self {
    Self::new(self.value.ln(), self.derivative / self.value)
  }

  fn pow(&self, k: T) -> Self {
    Self::new(self.value.powf(k), k * self.value.powf(k - T::one()) * self.derivative)
  }

  fn abs(&self) -> Self {
    Self::new(self.value.abs(), self.derivative * self.value / self.value.abs())
  }
}

impl<T: Real> std::ops::Add for Dual<T> {
  type Output = Self;

  fn add(self, rhs: Self) -> Self {
    Self::new(self.value + rhs.value, self.derivative + rhs.derivative)
  }
}

impl<T: Real> std::ops::Sub for Dual<T> {
  type Output = Self;

  fn sub(self, rhs: Self) -> Self {
    Self::new(self.value - rhs.value, self.derivative - rhs.derivative)
  }
}

impl<T: Real> std::ops::Mul for Dual<T> {
  type Output = Self;

  fn mul(self, rhs: Self) -> Self {
    Self::new(
      self.value * rhs.value,
      self.value * rhs.derivative + self.derivative * rhs.value,
    )
  }
}

impl<T: Real> std::ops::Div for Dual<T> {
  type Output = Self;

  fn div(self, rhs: Self) -> Self {
    Self::new(
      self.value / rhs.value,
      (self.derivative * rhs.value - self.value * rhs.derivative) / (rhs.value * rhs.value),
    )
  }
}

impl<T: Real> std::ops::Neg for Dual<T> {
  type Output = Self;

  fn neg(self) -> Self {
    Self::new(-self.value, -self.derivative)
  }
}

macro_rules! add_operator {
  ($op:ident, $meth:ident, $assign:ident, $assign_meth:ident, $symbol:tt) => {
    impl<T: Real> std::ops::$op<&Dual<T>> for &Dual<T> { // &dual + &other
      type Output = Dual<T>;

      fn $meth(self, rhs: &Dual<T>) -> Dual<T> {
        *self $symbol *rhs
      }
    }

    impl<T: Real> std::ops::$op<T> for Dual<T> { // dual + T
      type Output = Dual<T>;

      fn $meth(self, rhs: T) -> Dual<T> {
        self $symbol Dual::scalar(rhs)
      }
    }

    impl<T: Real> std::ops::$assign for Dual<T> { // dual += other
      fn $assign_meth(&mut self, rhs: Dual<T>) {
        *self = *self $symbol rhs;
      }
    }

    impl<T: Real> std::ops::$assign<T> for Dual<T> { // dual += T
      fn $assign_meth(&mut self, rhs: T) {
        *self = *self $symbol Dual::scalar(rhs);
      }
    }

    impl std::ops::$op<Dual<f32>> for f32 { // T + dual
      type Output = Dual<f32>;

      fn $meth(self, rhs: Dual<f32>) -> Dual<f32> {
        Dual::scalar(self) $symbol rhs
      }
    }

    impl std::ops::$op<Dual<f64>> for f64 { // T + dual
      type Output = Dual<f64>;

      fn $meth(self, rhs: Dual<f64>) -> Dual<f64> {
        Dual::scalar(self) $symbol rhs
      }
    }
  };
}

add_operator!(Add, add, AddAssign, add_assign, +);
add_operator!(Sub, sub, SubAssign, sub_assign, -);
add_operator!(Mul, mul, MulAssign, mul_assign, *);
add_operator!(Div, div, DivAssign, div_assign, /);

impl<T: Real> std::fmt::Display for Dual<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "({}, {})", self.value, self.derivative)
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::internal::assert_close;

  #[test]
  fn constructors() {
    let x1: Dual = Dual::default();
    assert_eq!((x1.value(), x1.derivative()), (0.0, 0.0));

    let x2: Dual = Dual::from(4.56);
    assert_eq!((x2.value(), x2.derivative()), (4.56, 0.0));

    let x3: Dual = Dual::new(7.53, 2.99);
    assert_eq!((x3.value(), x3.derivative()), (7.53, 2.99));

    let x4 = x3;
    assert_eq!(x4.value().to_bits(), x3.value().to_bits());
    assert_eq!(x4.derivative().to_bits(), x3.derivative().to_bits());

    assert_eq!(Dual::variable(1.5), Dual::new(1.5, 1.0));
  }

  #[test]
  fn setters() {
    let mut x = Dual::new(1.0, 2.0);
    x.set_value(3.0);
    x.set_derivative(-4.0);
    assert_eq!(x, Dual::new(3.0, -4.0));
  }

  #[test]
  fn addition() {
    let x = Dual::new(1.2, 2.9) + Dual::new(9.1, 7.5);
    assert_close(x.value(), 10.3);
    assert_close(x.derivative(), 10.4);
  }

  #[test]
  fn subtraction() {
    let x = Dual::new(1.2, 2.9) - Dual::new(9.1, 7.5);
    assert_close(x.value(), -7.9);
    assert_close(x.derivative(), -4.6);
  }

  #[test]
  fn multiplication() {
    let x = Dual::new(6.0, 10.0) * Dual::new(3.0, 5.0);
    assert_eq!(x, Dual::new(18.0, 60.0));
  }

  #[test]
  fn division() {
    let x = Dual::new(6.0, 10.0) / Dual::new(3.0, 2.0);
    assert_eq!(x, Dual::new(2.0, 2.0));
  }

  #[test]
  fn scalars() {
    let x: Dual = Dual::variable(3.0);
    assert_eq!(2.0 * x + 1.0, Dual::new(7.0, 2.0));
    assert_eq!(1.0 / x, Dual::new(1.0 / 3.0, -1.0 / 9.0));
    assert_eq!(-x, Dual::new(-3.0, -1.0));
    assert_eq!(&x - &x, Dual::new(0.0, 0.0));

    let mut y = x;
    y *= x;
    y += 1.0;
    assert_eq!(y, Dual::new(10.0, 6.0));
  }

  #[test]
  fn sine() {
    let x: Dual = Dual::variable(5.32);
    let f = (x * x).sin();
    assert_close(f.derivative(), 2.0 * x.value() * (x.value() * x.value()).cos());
  }

  #[test]
  fn cosine() {
    let x: Dual = Dual::variable(5.32);
    let f = (x * x).cos();
    assert_close(f.derivative(), -2.0 * x.value() * (x.value() * x.value()).sin());
  }

  #[test]
  fn exponential() {
    let x: Dual = Dual::variable(5.32);
    let f = (x * x).exp();
    assert_close(f.derivative(), 2.0 * x.value() * (x.value() * x.value()).exp());
  }

  #[test]
  fn logarithm() {
    let x: Dual = Dual::variable(5.32);
    let f = (x * x).log();
    assert_close(f.derivative(), 2.0 * x.value() / (x.value() * x.value()));
  }

  #[test]
  fn power() {
    let x: Dual = Dual::variable(5.32);
    assert_close((x * x * x).derivative(), 3.0 * x.value() * x.value());
    assert_close(x.pow(3.0).derivative(), 3.0 * x.value() * x.value());
    assert_close((2.0 * x).pow(0.5).derivative(), 1.0 / (2.0 * x.value()).sqrt());
  }

  #[test]
  fn absolute() {
    let x: Dual = Dual::variable(-5.32);
    let f = (x * x - 2.3).abs();
    let inner = x.value() * x.value() - 2.3;
    assert_close(f.derivative(), 2.0 * x.value() * inner / inner.abs());
    assert_eq!(Dual::variable(-2.0).abs(), Dual::new(2.0, -1.0));
  }

  #[test]
  fn composition() {
    let x: Dual = Dual::variable(2.3);
    let f = (x * x).log().cos().sin().exp();
    let v = x.value();
    let expected = (v * v).ln().cos().sin().exp()
      * (v * v).ln().cos().cos()
      * -(v * v).ln().sin()
      * 2.0 * v / (v * v);
    assert_close(f.derivative(), expected);
  }

  #[test]
  fn domain_errors_propagate() {
    let zero: Dual = Dual::variable(0.0);
    assert!((Dual::<f64>::scalar(1.0) / zero).value().is_infinite());
    assert!(zero.abs().derivative().is_nan());
    assert!(Dual::<f64>::variable(-1.0).log().value().is_nan());
    assert!(zero.log().value().is_infinite());
  }

  #[test]
  fn single_precision() {
    let x = Dual::<f32>::variable(2.0);
    let y = 3.0f32 * x * x;
    assert_eq!(y, Dual::new(12.0, 12.0));
  }

  #[test]
  fn display() {
    assert_eq!(Dual::new(1.5, -2.0).to_string(), "(1.5, -2)");
  }
}
