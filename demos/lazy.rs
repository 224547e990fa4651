// Lazy expressions only record operations. Nothing gets
// computed until the expression is materialized into a Dual.

use microdual::{ ops::*, Dual, Expr };

fn main() {
  let x: Expr = Expr::variable(5.32);

  // Build the expression tree
  let f = (&x * &x - 2.3).abs().sqrt();
  let (nodes, ops, leaves) = f.statistics();
  println!("Expression has {nodes} nodes ({ops} operations, {leaves} leaves)");

  // Evaluate it into a concrete dual number
  let mut out = Dual::default();
  out.assign(&f);
  println!("f(x) = {out}");

  // Leaves can be fed with new values and the
  // expression re-evaluated without rebuilding it
  x.feed(Dual::variable(-1.0));
  println!("f(-1) = {}", f.eval());
}
