use crate::Result;

/// A forward/inverse transform over vectors of ring coefficients.
///
/// Two implementations exist: [NttContext](crate::NttContext), an exact negacyclic transform
/// over a prime field, and [FftContext](crate::FftContext), the floating-point canonical
/// embedding over the complex numbers. Callers pick one explicitly at construction time.
pub trait RingTransform {
    /// Element type the transform operates on.
    type Value: Clone;

    /// Map coefficients to the evaluation domain.
    fn forward(&self, values: &[Self::Value]) -> Result<Vec<Self::Value>>;

    /// Map evaluations back to coefficients. For the exact transform
    /// `inverse(forward(v)) == v`; for the complex one it holds approximately.
    fn inverse(&self, values: &[Self::Value]) -> Result<Vec<Self::Value>>;
}
