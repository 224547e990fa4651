use itertools::Itertools;
use log::debug;

#[cfg(feature = "serialize")]
use std::{ io, fs, path::Path, collections::HashMap };

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize, de::DeserializeOwned};

use crate::{
  dual::Dual,
  scalar::Real,
  ops::Expression,
  expr::Expr,
};

#[cfg(feature = "serialize")]
use crate::expr::{ Op, BinaryNode, UnaryNode };


/// Snapshot of an expression graph with defined inputs and outputs.
///
/// Can be used for re-evaluating all outputs with new input values
/// or, with the `serialize` feature, for saving the entire graph to disc.

#[derive(Debug, Clone)]
pub struct Graph<T: Real = f64> {
  pub inputs: Vec<Expr<T>>,
  pub outputs: Vec<Expr<T>>,
}

impl<T: Real> Graph<T> {
  pub fn new(inputs: &[Expr<T>], outputs: &[Expr<T>]) -> Self {
    Self {
      inputs: inputs.into(),
      outputs: outputs.into(),
    }
  }

  /// Feed new values into the inputs, in order, and
  /// materialize every output once.

  pub fn run(&self, inputs: &[Dual<T>]) -> Vec<Dual<T>> {
    assert_eq!(inputs.len(), self.inputs.len(),
      "Graph expects {} inputs, got {}", self.inputs.len(), inputs.len());
    for (input, &dual) in self.inputs.iter().zip(inputs) {
      input.feed(dual);
    }
    debug!("Running graph with {} inputs and {} outputs", self.inputs.len(), self.outputs.len());
    self.outputs.iter().map(|out| out.eval() ).collect()
  }

  // Children always get created before their parents,
  // so sorting by id yields a valid evaluation order.
  fn history(&self) -> Vec<Expr<T>> {
    let mut history = self.inputs
      .iter()
      .chain(self.outputs.iter())
      .map(|expr| expr.history() )
      .collect::<Vec<_>>()
      .concat();
    history.sort_by_key(|expr| expr.id() );
    history.into_iter().unique_by(|expr| expr.id() ).collect()
  }

  /// Number of distinct nodes across all inputs and outputs.

  pub fn size(&self) -> usize {
    self.history().len()
  }
}

#[cfg(feature = "serialize")]
impl<T: Real + Serialize + DeserializeOwned> Graph<T> {
  pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
    let bytes = fs::read(path.as_ref())?;
    debug!("Loading graph from {} ({} bytes)", path.as_ref().display(), bytes.len());
    Self::from_bytes(&bytes)
  }

  pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
    let data = self.to_bytes()?;
    debug!("Saving graph to {} ({} bytes)", path.as_ref().display(), data.len());
    fs::write(path, data)
  }

  pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
    let history_dump = self.history().iter().map(|expr| NodeDump {
      id: expr.id(),
      op: match &expr.node.op {
        Op::Leaf(cell) => OpDump::Leaf(cell.get()),
        Op::Unary(node, arg) => OpDump::Unary(*node, arg.id()),
        Op::Binary(node, lhs, rhs) => OpDump::Binary(*node, lhs.id(), rhs.id()),
      },
    }).collect();

    let map_expr = |expr: &Expr<T>| expr.id();

    let graph_dump = GraphDump {
      history: history_dump,
      inputs: self.inputs.iter().map(map_expr).collect(),
      outputs: self.outputs.iter().map(map_expr).collect(),
    };

    postcard::to_allocvec(&graph_dump).map_err(invalid_data)
  }

  /// Rebuild a graph from its serialized form.
  ///
  /// Nodes receive fresh ids, while shared subexpressions stay shared.

  pub fn from_bytes(bytes: &[u8]) -> io::Result<Self> {
    let graph_dump: GraphDump<T> = postcard::from_bytes(bytes).map_err(invalid_data)?;
    let mut nodes: HashMap<usize, Expr<T>> = HashMap::new();
    let lookup = |nodes: &HashMap<usize, Expr<T>>, id: usize| {
      nodes.get(&id).cloned().ok_or_else(|| invalid_data(format!("Unknown node #{id}")) )
    };
    for dump in graph_dump.history {
      let expr = match dump.op {
        OpDump::Leaf(dual) => Expr::leaf(dual),
        OpDump::Unary(node, arg) => lookup(&nodes, arg)?.unary_op(node),
        OpDump::Binary(node, lhs, rhs) => lookup(&nodes, lhs)?.binary_op(node, &lookup(&nodes, rhs)?),
      };
      nodes.insert(dump.id, expr);
    }
    let inputs = graph_dump.inputs.into_iter().map(|id| lookup(&nodes, id) ).collect::<io::Result<Vec<_>>>()?;
    let outputs = graph_dump.outputs.into_iter().map(|id| lookup(&nodes, id) ).collect::<io::Result<Vec<_>>>()?;
    if let Some(input) = inputs.iter().find(|input| !input.is_leaf() ) {
      return Err(invalid_data(format!("Input #{} is not a leaf", input.id())))
    }
    Ok(Graph { inputs, outputs })
  }
}

#[cfg(feature = "serialize")]
fn invalid_data(err: impl ToString) -> io::Error {
  io::Error::new(io::ErrorKind::InvalidData, err.to_string())
}

#[cfg(feature = "serialize")]
#[derive(Serialize, Deserialize)]
enum OpDump<T: Real> {
  Leaf(Dual<T>),
  Unary(UnaryNode<T>, usize),
  Binary(BinaryNode, usize, usize),
}

#[cfg(feature = "serialize")]
#[derive(Serialize, Deserialize)]
struct NodeDump<T: Real> {
  id: usize,
  op: OpDump<T>,
}

#[cfg(feature = "serialize")]
#[derive(Serialize, Deserialize)]
struct GraphDump<T: Real> {
  history: Vec<NodeDump<T>>,
  inputs: Vec<usize>,
  outputs: Vec<usize>,
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::{ ops::RealOps, internal::assert_close };

  fn model() -> (Graph, Expr, Expr) {
    let x: Expr = Expr::variable(1.5);
    let y: Expr = Expr::scalar(0.25);
    let shared = &x * &y;
    let f = (&shared + shared.sin()).exp();
    let g = (&shared / (&x - 3.0)).abs().pow(1.5);
    (Graph::new(&[x.clone(), y.clone()], &[f, g]), x, y)
  }

  #[test]
  fn run() {
    let (graph, x, _) = model();
    let out = graph.run(&[Dual::variable(2.0), Dual::scalar(0.5)]);
    assert_eq!(x.eval(), Dual::variable(2.0));
    let s = Dual::variable(2.0) * Dual::scalar(0.5);
    let expected = (s + s.sin()).exp();
    assert_close(out[0].value(), expected.value());
    assert_close(out[0].derivative(), expected.derivative());
  }

  #[test]
  #[should_panic]
  fn run_missing_inputs() {
    let (graph, _, _) = model();
    graph.run(&[Dual::variable(2.0)]);
  }

  #[test]
  fn size() {
    let (graph, _, _) = model();
    // x, y, shared, sin, add, exp, 3.0, sub, div, abs, pow
    assert_eq!(graph.size(), 11);
  }

  #[cfg(feature = "serialize")]
  #[test]
  fn bytes() {
    let (graph, _, _) = model();
    let loaded = Graph::from_bytes(&graph.to_bytes().unwrap()).unwrap();
    assert_eq!(loaded.size(), graph.size());
    assert_eq!(loaded.inputs.len(), 2);
    assert_eq!(loaded.outputs.len(), 2);
    for inputs in [[Dual::variable(1.5), Dual::scalar(0.25)], [Dual::variable(-0.7), Dual::new(2.0, 0.5)]] {
      let expected = graph.run(&inputs);
      let actual = loaded.run(&inputs);
      assert_eq!(actual, expected);
    }
  }

  #[cfg(feature = "serialize")]
  #[test_log::test]
  fn save_and_load() {
    let (graph, _, _) = model();
    let path = std::env::temp_dir().join(format!("microdual-{}.graph", std::process::id()));
    graph.save(&path).unwrap();
    let loaded: Graph = Graph::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    let inputs = [Dual::variable(2.5), Dual::scalar(1.0)];
    let expected = graph.run(&inputs);
    assert!(expected.iter().all(|out| out.value().is_finite() && out.derivative().is_finite() ));
    assert_eq!(loaded.run(&inputs), expected);
  }

  #[cfg(feature = "serialize")]
  #[test]
  fn malformed() {
    let err = Graph::<f64>::from_bytes(&[0xff, 0xff, 0xff]).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);

    let dump = GraphDump::<f64> {
      history: vec![NodeDump { id: 7, op: OpDump::Unary(UnaryNode::Sine, 3) }],
      inputs: vec![],
      outputs: vec![7],
    };
    let bytes = postcard::to_allocvec(&dump).unwrap();
    let err = Graph::<f64>::from_bytes(&bytes).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
  }
}
