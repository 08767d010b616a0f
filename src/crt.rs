use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};
use tracing::debug;

use crate::util::{self, bigint};
use crate::{CkksError, Modulus, NttContext, Result};

/// Chinese-remainder representation of huge integers by word-size NTT primes.
///
/// Every prime is congruent to 1 modulo 2N, so each residue polynomial can be multiplied
/// with its own [NttContext]. As long as the product of the primes exceeds twice the largest
/// coefficient of a product, the exact coefficients are recovered by [Self::reconstruct].
#[derive(Clone)]
pub struct CrtContext {
    poly_degree: usize,
    primes: Vec<Modulus>,
    ntts: Vec<NttContext>,
    modulus: BigInt,
    crt_vals: Vec<BigInt>,
    crt_inv_vals: Vec<u64>,
}

impl CrtContext {

    /// Create a context of `num_primes` primes of `prime_size` bits for degree-`poly_degree` rings.
    pub fn new(num_primes: usize, prime_size: usize, poly_degree: usize) -> Result<Self> {
        if !(util::HE_CRT_PRIME_BIT_COUNT_MIN..=util::HE_CRT_PRIME_BIT_COUNT_MAX).contains(&prime_size) {
            return Err(CkksError::InvalidParameters(format!(
                "CRT prime size must be in [{}, {}] bits, got {}",
                util::HE_CRT_PRIME_BIT_COUNT_MIN, util::HE_CRT_PRIME_BIT_COUNT_MAX, prime_size
            )));
        }
        if num_primes == 0 {
            return Err(CkksError::InvalidParameters("CRT context needs at least one prime".into()));
        }
        let primes = util::get_primes(2 * poly_degree as u64, prime_size, num_primes)?;
        let ntts = primes.iter()
            .map(|p| NttContext::new(poly_degree, p.value()))
            .collect::<Result<Vec<_>>>()?;

        let modulus = primes.iter().fold(BigInt::one(), |acc, p| acc * p.value());
        let crt_vals = primes.iter().map(|p| &modulus / p.value()).collect::<Vec<_>>();
        let crt_inv_vals = crt_vals.iter().zip(&primes)
            .map(|(val, p)| {
                util::try_invert_u64_mod(bigint::reduce_u64(val, p.value()), p)
                    .ok_or_else(|| CkksError::InvalidParameters("CRT primes are not coprime".into()))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(num_primes, prime_size, modulus_bits = modulus.bits(), "created CRT context");
        Ok(Self { poly_degree, primes, ntts, modulus, crt_vals, crt_inv_vals })
    }

    /// Smallest context able to represent every signed integer of magnitude below `2^bound_bits`.
    pub fn with_capacity(bound_bits: u64, prime_size: usize, poly_degree: usize) -> Result<Self> {
        // each prime contributes at least prime_size - 1 bits, plus one bit for the sign
        let needed = bound_bits + 1;
        let per_prime = prime_size.saturating_sub(1).max(1) as u64;
        let num_primes = ((needed + per_prime - 1) / per_prime) as usize;
        Self::new(num_primes, prime_size, poly_degree)
    }

    pub fn poly_degree(&self) -> usize {self.poly_degree}
    pub fn primes(&self) -> &[Modulus] {&self.primes}
    pub fn ntts(&self) -> &[NttContext] {&self.ntts}
    /// Product of all primes.
    pub fn modulus(&self) -> &BigInt {&self.modulus}

    /// Residues of `value` modulo every prime.
    pub fn crt(&self, value: &BigInt) -> Vec<u64> {
        self.primes.iter().map(|p| bigint::reduce_u64(value, p.value())).collect()
    }

    /// The unique integer in `[0, modulus)` with the given residues.
    pub fn reconstruct(&self, values: &[u64]) -> BigInt {
        let sum = values.iter()
            .zip(&self.primes)
            .zip(self.crt_inv_vals.iter().zip(&self.crt_vals))
            .fold(BigInt::zero(), |acc, ((value, p), (inv, val))| {
                let intermed = util::multiply_u64_mod(p.reduce(*value), *inv, p);
                acc + val * intermed
            });
        sum.mod_floor(&self.modulus)
    }

}
