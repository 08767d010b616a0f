use std::cmp::Ordering;

use crate::{util, CkksError, Result};

/// Represent an integer modulus of up to 61 bits.
///
/// Word-size moduli are the primes the NTT and the CRT multiplier run over.
/// The modulus stores the precomputation for Barrett reduction, so products
/// widened to [u128] reduce without a division.
#[derive(Debug, Eq, Clone, Copy, Default)]
pub struct Modulus {
    value: u64,
    const_ratio: [u64; 3],
    bit_count: usize,
    is_prime: bool,
}

impl Ord for Modulus {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl PartialOrd for Modulus {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Modulus {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Modulus {

    /// Create a new Modulus instance with the given value.
    ///
    /// The value must be at least 2 and fit in [util::HE_MOD_BIT_COUNT_MAX] bits.
    pub fn new(value: u64) -> Result<Self> {
        if value < 2 || (value >> util::HE_MOD_BIT_COUNT_MAX) != 0 {
            return Err(CkksError::InvalidParameters(format!(
                "word modulus must be in [2, 2^{}), got {}", util::HE_MOD_BIT_COUNT_MAX, value
            )));
        }
        // floor(2^128 / value) in the first two words, 2^128 mod value in the third
        let mut quotient = u128::MAX / value as u128;
        let mut remainder = (u128::MAX % value as u128) as u64 + 1;
        if remainder == value {
            quotient += 1;
            remainder = 0;
        }
        Ok(Modulus {
            value,
            const_ratio: [quotient as u64, (quotient >> 64) as u64, remainder],
            bit_count: util::get_significant_bit_count(value),
            is_prime: util::is_prime_u64(value),
        })
    }

    /// Calculate the Barrett reduction.
    #[inline]
    pub fn reduce(&self, value: u64) -> u64 {
        util::barrett_reduce_u64(value, self)
    }

    /// Calculate the Barrett reduction on [u128].
    #[inline]
    pub fn reduce_u128(&self, value: u128) -> u64 {
        util::barrett_reduce_u128(value, self)
    }

    /// Reduce a signed value into `[0, value)`.
    #[inline]
    pub fn reduce_i64(&self, value: i64) -> u64 {
        value.rem_euclid(self.value as i64) as u64
    }

    /// Inner property.
    pub fn const_ratio(&self) -> &[u64; 3] {&self.const_ratio}
    /// The [u64] value.
    pub fn value(&self) -> u64 {self.value}
    /// Is the value a prime number?
    pub fn is_prime(&self) -> bool {self.is_prime}
    /// How many bits are there in the modulus?
    pub fn bit_count(&self) -> usize {self.bit_count}

}

impl std::fmt::Display for Modulus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Modulus ({})", self.value)
    }
}
