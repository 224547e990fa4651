#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

use crate::{
  scalar::Real,
  ops::Expression,
};


/// Operation combining two operands.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum BinaryNode {
  Add,
  Subtract,
  Multiply,
  Divide,
}

impl BinaryNode {
  pub fn value<T: Real>(&self, lhs: &impl Expression<T>, rhs: &impl Expression<T>) -> T {
    match self {
      Self::Add => lhs.value() + rhs.value(),
      Self::Subtract => lhs.value() - rhs.value(),
      Self::Multiply => lhs.value() * rhs.value(),
      Self::Divide => lhs.value() / rhs.value(),
    }
  }

  pub fn derivative<T: Real>(&self, lhs: &impl Expression<T>, rhs: &impl Expression<T>) -> T {
    match self {
      Self::Add => lhs.derivative() + rhs.derivative(),
      Self::Subtract => lhs.derivative() - rhs.derivative(),
      Self::Multiply => lhs.value() * rhs.derivative() + lhs.derivative() * rhs.value(),
      Self::Divide => {
        let r = rhs.value();
        (lhs.derivative() * r - lhs.value() * rhs.derivative()) / (r * r)
      },
    }
  }
}


/// Elementary function applied to a single operand.

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum UnaryNode<T> {
  Sine,
  Cosine,
  Exponential,
  Logarithm,
  /// Constant exponent. The derivative follows `k * v^(k-1) * d`,
  /// the same rule [Dual](crate::Dual) applies. The variant
  /// `k * v^(k - 1*d)`, which folds the operand's derivative into the
  /// exponent, is deliberately not used: it only agrees with the power
  /// rule when that derivative is one.
  Power(T),
  Absolute,
}

impl<T: Real> UnaryNode<T> {
  pub fn value(&self, arg: &impl Expression<T>) -> T {
    let v = arg.value();
    match *self {
      Self::Sine => v.sin(),
      Self::Cosine => v.cos(),
      Self::Exponential => v.exp(),
      Self::Logarithm => v.ln(),
      Self::Power(k) => v.powf(k),
      Self::Absolute => v.abs(),
    }
  }

  pub fn derivative(&self, arg: &impl Expression<T>) -> T {
    let v = arg.value();
    let d = arg.derivative();
    match *self {
      Self::Sine => d * v.cos(),
      Self::Cosine => -d * v.sin(),
      Self::Exponential => d * v.exp(),
      Self::Logarithm => d / v,
      Self::Power(k) => k * v.powf(k - T::one()) * d,
      Self::Absolute => d * v / v.abs(),
    }
  }
}
