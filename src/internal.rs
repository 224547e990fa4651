use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;

use crate::scalar::Real;


pub fn make_id() -> usize {
  static LAST_ID: AtomicUsize = AtomicUsize::new(0);
  LAST_ID.fetch_add(1, Ordering::Relaxed)
}


/// Convert a literal into the target scalar type.

#[inline]
pub fn lit<T: Real>(x: f64) -> T {
  T::from(x).unwrap_or_else(T::nan)
}


// Polar Box-Muller transformation

pub fn randn<T: Real>() -> (T, T) {
  let mut rng = rand::thread_rng();
  let u = rng.gen_range(-T::one(), T::one());
  let v = rng.gen_range(-T::one(), T::one());
  let r = u * u + v * v;
  // Try again if outside interval
  if r == T::zero() || r >= T::one() { return randn() }
  let c = (lit::<T>(-2.0) * r.ln() / r).sqrt();
  (u * c, v * c)
}


#[cfg(test)]
#[track_caller]
pub fn assert_close(actual: f64, expected: f64) {
  let scale = expected.abs().max(1.0);
  assert!((actual - expected).abs() <= 1e-6 * scale,
    "{actual} is not close to {expected}");
}
