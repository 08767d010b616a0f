use num_bigint::BigInt;
use thiserror::Error;

/// All errors reported by the CKKS engine.
///
/// Errors are detected where the violated precondition is checked and are
/// returned to the caller unchanged. Numeric drift from noise growth is not
/// an error; it shows up as a bounded difference in decoded values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CkksError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("no primitive {degree}-th root of unity modulo {modulus}")]
    NoRootOfUnity { degree: u64, modulus: u64 },

    #[error("too many values to encode: {len} > {capacity} slots")]
    CapacityExceeded { len: usize, capacity: usize },

    #[error("value out of range: {0}")]
    ValueOutOfRange(String),

    #[error("ring degree mismatch: expected {expected}, got {actual}")]
    RingDegreeMismatch { expected: usize, actual: usize },

    #[error("ciphertext levels do not match: {left} != {right}")]
    LevelMismatch { left: usize, right: usize },

    #[error("scales do not match: {left} != {right}")]
    ScaleMismatch { left: f64, right: f64 },

    #[error("ciphertext size mismatch: expected {expected} polynomials, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("scale {scale} is too small to rescale (must exceed {required})")]
    InsufficientScale { scale: f64, required: f64 },

    #[error("modulus chain exhausted at level {level}")]
    LevelExhausted { level: usize },

    #[error("modulus of level {to} does not divide the modulus of level {from}")]
    IndivisibleModulus { from: usize, to: usize },

    #[error("ciphertext modulus {actual} does not belong to level {level}")]
    ModulusMismatch { level: usize, actual: BigInt },

    #[error("operation requires a secret key")]
    MissingSecretKey,
}

pub type Result<T> = std::result::Result<T, CkksError>;
