use rand::distributions::uniform::SampleUniform;
use num_traits::Float;


/// All scalar types a [Dual](crate::Dual) or [Expr](crate::Expr)
/// can be built from.
///
/// This trait gets implemented automatically for all types
/// that satisfy its dependent traits, most notably [f32] and [f64].

pub trait Real: Float + SampleUniform + Default + Send + Sync + std::fmt::Debug + std::fmt::Display + 'static {}
impl<T: Float + SampleUniform + Default + Send + Sync + std::fmt::Debug + std::fmt::Display + 'static> Real for T {}
