use std::sync::Arc;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{FromPrimitive, One, Zero};
use tracing::debug;

use crate::{
    util::{self, bigint},
    CkksError, CkksParameters, CrtContext, FftContext, Polynomial, Result,
};

/// Validated parameters together with everything precomputed from them.
///
/// A context is created once and shared through an [Arc] by the key generator,
/// encoder, encryptor, decryptor and evaluator. Level `l` of a ciphertext refers to
/// the modulus `modulus_chain()[l]`; level 0 is the top modulus q0.
pub struct CkksContext {
    params: CkksParameters,
    scaling_factor_int: BigInt,
    modulus_chain: Vec<BigInt>,
    key_modulus: BigInt,
    crt_context: Option<CrtContext>,
    fft_context: FftContext,
}

impl CkksContext {

    /// Validates the parameters and precomputes the modulus chain, the CRT
    /// multiplier and the canonical embedding tables.
    pub fn new(params: CkksParameters) -> Result<Arc<Self>> {
        let poly_degree = params.poly_degree();
        if util::get_power_of_two(poly_degree as u64) < 1
            || poly_degree < util::HE_POLY_MOD_DEGREE_MIN
            || poly_degree > util::HE_POLY_MOD_DEGREE_MAX
        {
            return Err(CkksError::InvalidParameters(format!(
                "poly degree must be a power of two in [{}, {}], got {}",
                util::HE_POLY_MOD_DEGREE_MIN, util::HE_POLY_MOD_DEGREE_MAX, poly_degree
            )));
        }

        let scaling_factor = params.scaling_factor();
        if !scaling_factor.is_finite() || scaling_factor <= 1.0 {
            return Err(CkksError::InvalidParameters(format!(
                "scaling factor must be finite and greater than 1, got {}", scaling_factor
            )));
        }
        let scaling_factor_int = BigInt::from_f64(scaling_factor.round())
            .ok_or_else(|| CkksError::InvalidParameters(format!("scaling factor {} is not representable", scaling_factor)))?;

        let modulus_chain = match params.modulus_chain() {
            Some(chain) => Self::check_modulus_chain(chain)?,
            None => Self::derive_modulus_chain(params.ciph_modulus(), &scaling_factor_int),
        };
        let ciph_modulus = &modulus_chain[0];
        if ciph_modulus <= &scaling_factor_int {
            return Err(CkksError::InvalidParameters(format!(
                "ciphertext modulus {} must exceed the scaling factor", ciph_modulus
            )));
        }
        if params.big_modulus() < ciph_modulus {
            return Err(CkksError::InvalidParameters(
                "big modulus must be at least the ciphertext modulus".into()
            ));
        }
        let key_modulus = params.big_modulus() * ciph_modulus;

        let crt_context = match params.prime_size() {
            Some(prime_size) => {
                // a product of two centered operands modulo P*q0 is bounded by N*(P*q0)^2/4
                let bound_bits = 2 * bigint::bit_length(&key_modulus)
                    + util::get_significant_bit_count(poly_degree as u64) as u64;
                Some(CrtContext::with_capacity(bound_bits, prime_size, poly_degree)?)
            }
            None => None,
        };
        let fft_context = FftContext::new(2 * poly_degree)?;

        debug!(
            poly_degree,
            levels = modulus_chain.len(),
            crt_primes = crt_context.as_ref().map_or(0, |crt| crt.primes().len()),
            "created CKKS context"
        );

        Ok(Arc::new(Self {
            params,
            scaling_factor_int,
            modulus_chain,
            key_modulus,
            crt_context,
            fft_context,
        }))
    }

    fn check_modulus_chain(chain: &[BigInt]) -> Result<Vec<BigInt>> {
        if chain.is_empty() {
            return Err(CkksError::InvalidParameters("modulus chain is empty".into()));
        }
        if chain.iter().any(|q| q <= &BigInt::one()) {
            return Err(CkksError::InvalidParameters("moduli must be greater than 1".into()));
        }
        for pair in chain.windows(2) {
            if pair[1] >= pair[0] {
                return Err(CkksError::InvalidParameters(format!(
                    "modulus chain must be strictly decreasing, {} follows {}", pair[1], pair[0]
                )));
            }
            if !pair[0].mod_floor(&pair[1]).is_zero() {
                return Err(CkksError::InvalidParameters(format!(
                    "modulus {} does not divide its predecessor {}", pair[1], pair[0]
                )));
            }
        }
        Ok(chain.to_vec())
    }

    /// Each level floor-divides the previous modulus by Δ while the quotient stays above Δ,
    /// so `q_l / q_(l+1)` rounds down to Δ even when Δ does not divide q0.
    fn derive_modulus_chain(ciph_modulus: &BigInt, scaling_factor: &BigInt) -> Vec<BigInt> {
        let mut chain = vec![ciph_modulus.clone()];
        loop {
            let quotient = chain[chain.len() - 1].div_floor(scaling_factor);
            if &quotient <= scaling_factor {
                break;
            }
            chain.push(quotient);
        }
        chain
    }

    pub fn parameters(&self) -> &CkksParameters {&self.params}

    /// Ring degree N.
    pub fn poly_degree(&self) -> usize {self.params.poly_degree()}

    /// Number of complex slots, N/2.
    pub fn slot_count(&self) -> usize {self.params.poly_degree() / 2}

    pub fn scaling_factor(&self) -> f64 {self.params.scaling_factor()}

    /// The scaling factor rounded to an integer.
    pub fn scaling_factor_int(&self) -> &BigInt {&self.scaling_factor_int}

    /// The key-switching modulus P.
    pub fn big_modulus(&self) -> &BigInt {self.params.big_modulus()}

    /// Top ciphertext modulus q0.
    pub fn ciph_modulus(&self) -> &BigInt {&self.modulus_chain[0]}

    /// Modulus P*q0 of switching keys.
    pub fn key_modulus(&self) -> &BigInt {&self.key_modulus}

    pub fn modulus_chain(&self) -> &[BigInt] {&self.modulus_chain}

    /// Index of the last level; a ciphertext there can no longer be rescaled.
    pub fn max_level(&self) -> usize {self.modulus_chain.len() - 1}

    /// Modulus of the given level.
    pub fn modulus_at(&self, level: usize) -> Result<&BigInt> {
        self.modulus_chain.get(level).ok_or(CkksError::LevelExhausted { level })
    }

    /// The factor `q_l / q_(l+1)`, rounded down, removed by rescaling at `level`.
    pub fn rescale_factor(&self, level: usize) -> Result<BigInt> {
        let current = self.modulus_at(level)?;
        let next = self.modulus_chain.get(level + 1).ok_or(CkksError::LevelExhausted { level })?;
        Ok(current / next)
    }

    pub fn crt_context(&self) -> Option<&CrtContext> {self.crt_context.as_ref()}

    pub fn fft_context(&self) -> &FftContext {&self.fft_context}

    /// Ring product modulo `modulus`, using the CRT multiplier when one is configured.
    pub fn multiply(&self, a: &Polynomial, b: &Polynomial, modulus: &BigInt) -> Result<Polynomial> {
        a.multiply(b, modulus, self.crt_context.as_ref())
    }

    pub(crate) fn check_ring_degree(&self, poly: &Polynomial) -> Result<()> {
        if poly.ring_degree() != self.poly_degree() {
            return Err(CkksError::RingDegreeMismatch {
                expected: self.poly_degree(),
                actual: poly.ring_degree(),
            });
        }
        Ok(())
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::bigint::pow2;

    const SCALE: f64 = 1073741824.0;

    #[test]
    fn test_derived_chain() {
        let params = CkksParameters::new(4, pow2(600), pow2(1200), SCALE).set_prime_size(None);
        let context = CkksContext::new(params).unwrap();
        let chain = context.modulus_chain();
        assert_eq!(chain.len(), 19);
        assert_eq!(chain[0], pow2(600));
        assert_eq!(chain[18], pow2(60));
        assert_eq!(context.max_level(), 18);
        assert_eq!(context.rescale_factor(3).unwrap(), pow2(30));
        assert!(matches!(context.rescale_factor(18), Err(CkksError::LevelExhausted { level: 18 })));
        assert_eq!(context.key_modulus(), &pow2(1800));
        assert_eq!(context.slot_count(), 2);
        assert!(context.crt_context().is_none());
    }

    #[test]
    fn test_chain_with_odd_factor() {
        let q0 = pow2(90) * 3u32;
        let params = CkksParameters::new(4, q0.clone(), pow2(200), SCALE).set_prime_size(None);
        let context = CkksContext::new(params).unwrap();
        assert_eq!(context.modulus_chain(), &[q0, pow2(60) * 3u32, pow2(30) * 3u32]);
    }

    #[test]
    fn test_chain_with_non_dividing_scale() {
        let scale = 1e9;
        let params = CkksParameters::new(8, pow2(600), pow2(1200), scale).set_prime_size(None);
        let context = CkksContext::new(params).unwrap();
        let chain = context.modulus_chain();
        let delta = BigInt::from(1_000_000_000u64);
        // 2^600 is about 10^180.6
        assert_eq!(chain.len(), 20);
        for level in 0..context.max_level() {
            assert_eq!(chain[level + 1], &chain[level] / &delta);
            assert_eq!(context.rescale_factor(level).unwrap(), delta);
        }
        assert!(chain[19] > delta);
    }

    #[test]
    fn test_explicit_chain() {
        let chain = vec![pow2(80) * 15u32, pow2(50) * 15u32, pow2(50) * 5u32];
        let params = CkksParameters::new(8, BigInt::zero(), pow2(100), SCALE)
            .set_modulus_chain(chain.clone())
            .set_prime_size(None);
        let context = CkksContext::new(params).unwrap();
        assert_eq!(context.modulus_chain(), chain.as_slice());
        assert_eq!(context.rescale_factor(1).unwrap(), BigInt::from(3));
    }

    #[test]
    fn test_crt_capacity() {
        let params = CkksParameters::new(8, pow2(120), pow2(150), SCALE);
        let context = CkksContext::new(params).unwrap();
        let crt = context.crt_context().unwrap();
        let needed = 2 * bigint::bit_length(context.key_modulus()) + 4;
        assert!(crt.modulus().bits() > needed);
    }

    #[test]
    fn test_invalid_parameters() {
        let invalid = [
            CkksParameters::new(6, pow2(600), pow2(1200), SCALE),
            CkksParameters::new(1, pow2(600), pow2(1200), SCALE),
            CkksParameters::new(4, pow2(600), pow2(1200), 1.0),
            CkksParameters::new(4, pow2(600), pow2(1200), f64::NAN),
            CkksParameters::new(4, pow2(20), pow2(1200), SCALE),
            CkksParameters::new(4, pow2(600), pow2(100), SCALE),
            CkksParameters::new(4, pow2(600), pow2(1200), SCALE).set_modulus_chain(vec![]),
            CkksParameters::new(4, pow2(600), pow2(1200), SCALE).set_modulus_chain(vec![pow2(60), pow2(90)]),
            CkksParameters::new(4, pow2(600), pow2(1200), SCALE).set_modulus_chain(vec![pow2(90), pow2(60) * 3u32]),
            CkksParameters::new(4, pow2(600), pow2(1200), SCALE).set_prime_size(Some(10)),
        ];
        for params in invalid {
            assert!(
                matches!(CkksContext::new(params.clone()), Err(CkksError::InvalidParameters(_))),
                "accepted {:?}", params
            );
        }
    }
}
