use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// Bit size of the CRT primes used for big-modulus multiplication unless configured otherwise.
pub const DEFAULT_PRIME_SIZE: usize = 59;

/// Configuration of a CKKS instance.
///
/// The parameters are plain data; they are validated once when a
/// [CkksContext](crate::CkksContext) is created from them.
/// ```rust
/// use ckks::*;
/// use ckks::util::bigint::pow2;
/// let params = CkksParameters::new(8, pow2(600), pow2(1200), (1u64 << 30) as f64)
///     .set_prime_size(Some(59));
/// let context = CkksContext::new(params).unwrap();
/// assert_eq!(context.slot_count(), 4);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CkksParameters {
    poly_degree: usize,
    ciph_modulus: BigInt,
    big_modulus: BigInt,
    scaling_factor: f64,
    modulus_chain: Option<Vec<BigInt>>,
    prime_size: Option<usize>,
}

impl CkksParameters {

    /// Creates parameters for ring degree `poly_degree`, top ciphertext modulus q0,
    /// key-switching modulus P and scaling factor.
    pub fn new(poly_degree: usize, ciph_modulus: BigInt, big_modulus: BigInt, scaling_factor: f64) -> Self {
        Self {
            poly_degree,
            ciph_modulus,
            big_modulus,
            scaling_factor,
            modulus_chain: None,
            prime_size: Some(DEFAULT_PRIME_SIZE),
        }
    }

    pub fn poly_degree(&self) -> usize {self.poly_degree}
    pub fn ciph_modulus(&self) -> &BigInt {&self.ciph_modulus}
    pub fn big_modulus(&self) -> &BigInt {&self.big_modulus}
    pub fn scaling_factor(&self) -> f64 {self.scaling_factor}
    pub fn modulus_chain(&self) -> Option<&[BigInt]> {self.modulus_chain.as_deref()}
    pub fn prime_size(&self) -> Option<usize> {self.prime_size}

    pub fn set_poly_degree(mut self, poly_degree: usize) -> Self {
        self.poly_degree = poly_degree;
        self
    }

    pub fn set_ciph_modulus(mut self, ciph_modulus: BigInt) -> Self {
        self.ciph_modulus = ciph_modulus;
        self
    }

    pub fn set_big_modulus(mut self, big_modulus: BigInt) -> Self {
        self.big_modulus = big_modulus;
        self
    }

    pub fn set_scaling_factor(mut self, scaling_factor: f64) -> Self {
        self.scaling_factor = scaling_factor;
        self
    }

    /// Use an explicit modulus chain q0 > q1 > ... instead of deriving it by repeated
    /// division by the scaling factor. The first entry replaces the ciphertext modulus.
    pub fn set_modulus_chain(mut self, chain: Vec<BigInt>) -> Self {
        if let Some(first) = chain.first() {
            self.ciph_modulus = first.clone();
        }
        self.modulus_chain = Some(chain);
        self
    }

    /// Bit size of the CRT primes for polynomial multiplication. `None` selects
    /// schoolbook multiplication.
    pub fn set_prime_size(mut self, prime_size: Option<usize>) -> Self {
        self.prime_size = prime_size;
        self
    }

}
