// This example demonstrates building an expression graph with
// multiple inputs and multiple outputs and saving it to a file.

// The graph can then be loaded elsewhere in its entirety,
// without access to the original code.

use microdual::prelude::*;

fn main() {
  let filename = "model.dual";

  build_model(filename);
  load_model(filename);
}

fn build_model(filename: &str) {
  // Have some inputs
  let x: Expr = Expr::variable(1.0);
  let k: Expr = Expr::scalar(2.0);

  // Do some computations
  let y = (&x * &k).sin();
  let z = (&y * &y + x.exp()).log();

  // Pack the resulting expressions into a Graph to make its inputs
  // and outputs explicit and arrange them in an order of your liking.
  let graph = Graph::new(&[x, k], &[y, z]);

  graph.save(filename).unwrap();
}

fn load_model(filename: &str) {
  let graph: Graph = Graph::load(filename).unwrap();

  // Feed new data using #run
  let outputs = graph.run(&[
    Dual::variable(0.5),
    Dual::scalar(3.0),
  ]);

  for (i, out) in outputs.iter().enumerate() {
    println!("Output {i}: {out}");
  }
}
