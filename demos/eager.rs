use microdual::{ ops::*, Dual };

fn main() {
  // Differentiate with respect to x by seeding it with a derivative of one
  let x: Dual = Dual::variable(2.3);

  // Everything else is a constant
  let c = Dual::scalar(0.5);

  let f = ((x * x).log().cos().sin() * c).exp();

  println!("f(x) = {}", f.value());
  println!("f'(x) = {}", f.derivative());

  // Derivative of a polynomial, evaluated along a range of points
  for i in -2..=2 {
    let x: Dual = Dual::variable(i as f64);
    let p = 3.0 * x.pow(3.0) - 2.0 * x + 1.0;
    println!("p({i}) = {p}");
  }
}
