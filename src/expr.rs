use std::rc::Rc;
use std::cell::Cell;
use std::collections::HashSet;

use log::{debug, trace};

mod nodes;
mod graph;

pub use nodes::{ BinaryNode, UnaryNode };
pub use graph::Graph;

use crate::{
  internal::*,
  dual::Dual,
  scalar::Real,
  ops::{ Expression, RealOps },
};


#[derive(Debug)]
enum Op<T: Real> {
  Leaf(Cell<Dual<T>>),
  Unary(UnaryNode<T>, Expr<T>),
  Binary(BinaryNode, Expr<T>, Expr<T>),
}


/// Node in an expression tree, holding the operation that
/// produces it together with shared handles to its operands.

#[derive(Debug)]
struct Node<T: Real> {
  id: usize,
  op: Op<T>,
}

impl<T: Real> Op<T> {
  // Move operand handles out, leaving an empty leaf behind
  fn detach(&mut self, stack: &mut Vec<Expr<T>>) {
    match std::mem::replace(self, Op::Leaf(Cell::new(Dual::default()))) {
      Op::Leaf(_) => {},
      Op::Unary(_, arg) => stack.push(arg),
      Op::Binary(_, lhs, rhs) => {
        stack.push(lhs);
        stack.push(rhs);
      },
    }
  }
}

// Long chains would overflow the stack when dropped recursively,
// so uniquely owned operands get unlinked iteratively instead.
impl<T: Real> Drop for Node<T> {
  fn drop(&mut self) {
    let mut stack = vec![];
    self.op.detach(&mut stack);
    while let Some(expr) = stack.pop() {
      if let Ok(mut node) = Rc::try_unwrap(expr.node) {
        node.op.detach(&mut stack);
      }
    }
  }
}


/// Lazily evaluated dual number.
///
/// Arithmetic on expressions only records the operation in a tree
/// of shared nodes. Nothing gets computed until the expression is
/// materialized with [eval](Expression::eval) or
/// [assigned](Dual::assign) into a [Dual].
///
/// Nodes don't cache their results. Every call to
/// [value](Expression::value) or [derivative](Expression::derivative)
/// walks the tree again, so evaluate once and keep the resulting [Dual]
/// when both parts are needed repeatedly.
///
/// ```
/// use microdual::{ ops::*, Dual, Expr };
///
/// let x: Expr = Expr::variable(5.32);
/// let f = (&x * &x).sin();
///
/// let mut out = Dual::default();
/// out.assign(&f);
/// assert_eq!(out.derivative(), 2.0 * 5.32 * (5.32f64 * 5.32).cos());
/// ```

#[derive(Debug, Clone)]
pub struct Expr<T: Real = f64> {
  node: Rc<Node<T>>,
}

impl<T: Real> Expr<T> {
  fn operation(op: Op<T>) -> Self {
    Self {
      node: Rc::new(Node { id: make_id(), op }),
    }
  }

  /// Leaf holding a concrete dual number.

  pub fn leaf(dual: Dual<T>) -> Self {
    Self::operation(Op::Leaf(Cell::new(dual)))
  }

  /// Constant leaf with a derivative of zero.

  pub fn scalar(value: T) -> Self {
    Self::leaf(Dual::scalar(value))
  }

  /// Leaf for the variable to differentiate against.

  pub fn variable(value: T) -> Self {
    Self::leaf(Dual::variable(value))
  }

  pub fn id(&self) -> usize {
    self.node.id
  }

  pub fn is_leaf(&self) -> bool {
    matches!(self.node.op, Op::Leaf(_))
  }

  pub fn unary_op(&self, node: UnaryNode<T>) -> Self {
    Self::operation(Op::Unary(node, self.clone()))
  }

  pub fn binary_op(&self, node: BinaryNode, rhs: &Self) -> Self {
    Self::operation(Op::Binary(node, self.clone(), rhs.clone()))
  }

  /// Replace the dual number held by this leaf.
  ///
  /// All expressions built on top of it see the new
  /// value on their next evaluation.

  pub fn feed(&self, dual: Dual<T>) {
    match &self.node.op {
      Op::Leaf(cell) => {
        trace!("Feeding leaf #{} with {dual}", self.id());
        cell.set(dual);
      },
      _ => panic!("Cannot feed computed expression #{}", self.id()),
    }
  }

  /// List all leaves this expression depends on, each one once.

  pub fn inputs(&self) -> Vec<Self> {
    self.history()
      .into_iter()
      .filter(|expr| expr.is_leaf() )
      .collect()
  }

  /// Number of distinct nodes, operations and leaves in this expression.

  pub fn statistics(&self) -> (usize, usize, usize) {
    let history = self.history();
    let num_nodes = history.len();
    let num_leaves = history.iter().filter(|expr| expr.is_leaf() ).count();
    (num_nodes, num_nodes - num_leaves, num_leaves)
  }

  // Operands in post-order, each node once
  fn history(&self) -> Vec<Self> {
    let mut history = vec![];
    let mut visited = HashSet::new();
    let mut stack = vec![(self.clone(), false)];
    while let Some((expr, expanded)) = stack.pop() {
      if expanded {
        history.push(expr);
        continue
      }
      if !visited.insert(expr.id()) { continue }
      stack.push((expr.clone(), true));
      match &expr.node.op {
        Op::Leaf(_) => {},
        Op::Unary(_, arg) => stack.push((arg.clone(), false)),
        Op::Binary(_, lhs, rhs) => {
          stack.push((rhs.clone(), false));
          stack.push((lhs.clone(), false));
        },
      }
    }
    history
  }

  /// Compute a function's derivative numerically at a random point and
  /// compare it to the automatically derived solution.
  ///
  /// Supply any function to check that it gets differentiated correctly.
  /// Returns the absolute difference between both derivatives.

  pub fn check_derivative<F>(generator: F) -> T
  where
    F: Fn(&Self) -> Self
  {
    let (x, _) = randn::<T>();
    let eps = T::epsilon().cbrt() * x.abs().max(T::one());
    let two = T::one() + T::one();
    // Derivative using auto diff
    let automatic = generator(&Self::variable(x)).derivative();
    // Central difference
    let prev = generator(&Self::scalar(x - eps)).value();
    let next = generator(&Self::scalar(x + eps)).value();
    let numeric = (next - prev) / (two * eps);
    debug!("Derivative check at {x}: automatic {automatic}, numeric {numeric}");
    (automatic - numeric).abs()
  }
}

impl<T: Real> Expression<T> for Expr<T> {
  fn value(&self) -> T {
    match &self.node.op {
      Op::Leaf(cell) => cell.get().value(),
      Op::Unary(node, arg) => node.value(arg),
      Op::Binary(node, lhs, rhs) => node.value(lhs, rhs),
    }
  }

  fn derivative(&self) -> T {
    match &self.node.op {
      Op::Leaf(cell) => cell.get().derivative(),
      Op::Unary(node, arg) => node.derivative(arg),
      Op::Binary(node, lhs, rhs) => node.derivative(lhs, rhs),
    }
  }
}

impl<T: Real> From<Dual<T>> for Expr<T> {
  fn from(dual: Dual<T>) -> Self {
    Self::leaf(dual)
  }
}

impl<T: Real> RealOps<T> for Expr<T> {
  type Output = Self;

  fn sin(&self) -> Self {
    self.unary_op(UnaryNode::Sine)
  }

  fn cos(&self) -> Self {
    self.unary_op(UnaryNode::Cosine)
  }

  fn exp(&self) -> Self {
    self.unary_op(UnaryNode::Exponential)
  }

  fn log(&self) -> Self {
    self.unary_op(UnaryNode::Logarithm)
  }

  fn pow(&self, k: T) -> Self {
    self.unary_op(UnaryNode::Power(k))
  }

  fn abs(&self) -> Self {
    self.unary_op(UnaryNode::Absolute)
  }
}

impl<T: Real> std::ops::Neg for &Expr<T> {
  type Output = Expr<T>;

  fn neg(self) -> Self::Output {
    self * -T::one()
  }
}

impl<T: Real> std::ops::Neg for Expr<T> {
  type Output = Expr<T>;

  fn neg(self) -> Self::Output {
    -&self
  }
}

macro_rules! add_operator {
  (@scalar $t:ty, $op:ident, $meth:ident, $symbol:tt) => {
    impl std::ops::$op<&Expr<$t>> for $t { // T * &expr
      type Output = Expr<$t>;

      fn $meth(self, rhs: &Expr<$t>) -> Expr<$t> {
        &Expr::scalar(self) $symbol rhs
      }
    }

    impl std::ops::$op<Expr<$t>> for $t { // T * expr
      type Output = Expr<$t>;

      fn $meth(self, rhs: Expr<$t>) -> Expr<$t> {
        &Expr::scalar(self) $symbol &rhs
      }
    }
  };

  ($op:ident, $meth:ident, $node:ident, $symbol:tt) => {
    impl<T: Real> std::ops::$op for &Expr<T> { // &expr * &other
      type Output = Expr<T>;

      fn $meth(self, rhs: Self) -> Expr<T> {
        self.binary_op(BinaryNode::$node, rhs)
      }
    }

    impl<T: Real> std::ops::$op for Expr<T> { // expr * other
      type Output = Expr<T>;

      fn $meth(self, rhs: Self) -> Expr<T> {
        &self $symbol &rhs
      }
    }

    impl<T: Real> std::ops::$op<Expr<T>> for &Expr<T> { // &expr * other
      type Output = Expr<T>;

      fn $meth(self, rhs: Expr<T>) -> Expr<T> {
        self $symbol &rhs
      }
    }

    impl<T: Real> std::ops::$op<&Expr<T>> for Expr<T> { // expr * &other
      type Output = Expr<T>;

      fn $meth(self, rhs: &Expr<T>) -> Expr<T> {
        &self $symbol rhs
      }
    }

    impl<T: Real> std::ops::$op<T> for &Expr<T> { // &expr * T
      type Output = Expr<T>;

      fn $meth(self, rhs: T) -> Expr<T> {
        self $symbol &Expr::scalar(rhs)
      }
    }

    impl<T: Real> std::ops::$op<T> for Expr<T> { // expr * T
      type Output = Expr<T>;

      fn $meth(self, rhs: T) -> Expr<T> {
        &self $symbol &Expr::scalar(rhs)
      }
    }

    impl<T: Real> std::ops::$op<Dual<T>> for &Expr<T> { // &expr * dual
      type Output = Expr<T>;

      fn $meth(self, rhs: Dual<T>) -> Expr<T> {
        self $symbol &Expr::leaf(rhs)
      }
    }

    impl<T: Real> std::ops::$op<Dual<T>> for Expr<T> { // expr * dual
      type Output = Expr<T>;

      fn $meth(self, rhs: Dual<T>) -> Expr<T> {
        &self $symbol &Expr::leaf(rhs)
      }
    }

    impl<T: Real> std::ops::$op<&Expr<T>> for Dual<T> { // dual * &expr
      type Output = Expr<T>;

      fn $meth(self, rhs: &Expr<T>) -> Expr<T> {
        &Expr::leaf(self) $symbol rhs
      }
    }

    impl<T: Real> std::ops::$op<Expr<T>> for Dual<T> { // dual * expr
      type Output = Expr<T>;

      fn $meth(self, rhs: Expr<T>) -> Expr<T> {
        &Expr::leaf(self) $symbol &rhs
      }
    }

    add_operator!(@scalar f32, $op, $meth, $symbol);
    add_operator!(@scalar f64, $op, $meth, $symbol);
  };
}

add_operator!(Add, add, Add, +);
add_operator!(Sub, sub, Subtract, -);
add_operator!(Mul, mul, Multiply, *);
add_operator!(Div, div, Divide, /);

impl<T: Real> std::fmt::Display for Expr<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "{}", self.eval())
  }
}
