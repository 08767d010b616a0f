//! Arbitrary-precision modular helpers over [BigInt].

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

/// True modulo: the result always lies in `[0, modulus)`.
#[inline]
pub fn reduce(value: &BigInt, modulus: &BigInt) -> BigInt {
    value.mod_floor(modulus)
}

/// Centered representative in `(-modulus/2, modulus/2]`.
pub fn mod_small(value: &BigInt, modulus: &BigInt) -> BigInt {
    let reduced = value.mod_floor(modulus);
    let half: BigInt = modulus >> 1;
    if reduced > half {
        reduced - modulus
    } else {
        reduced
    }
}

/// `value / divisor` rounded to the nearest integer, ties rounded up.
pub fn divide_round(value: &BigInt, divisor: &BigInt) -> BigInt {
    let (quotient, remainder) = value.div_mod_floor(divisor);
    // remainder is in [0, divisor) for positive divisors
    if (&remainder << 1u32) >= *divisor {
        quotient + 1
    } else {
        quotient
    }
}

/// Modular exponentiation, `exponent` must be non-negative.
pub fn mod_exp(value: &BigInt, exponent: &BigInt, modulus: &BigInt) -> BigInt {
    reduce(value, modulus).modpow(exponent, modulus)
}

/// Modular inverse, or `None` when `value` and `modulus` are not coprime.
pub fn mod_inv(value: &BigInt, modulus: &BigInt) -> Option<BigInt> {
    let reduced = reduce(value, modulus);
    if reduced.is_zero() {
        return None;
    }
    let egcd = reduced.extended_gcd(modulus);
    if !egcd.gcd.is_one() {
        return None;
    }
    Some(reduce(&egcd.x, modulus))
}

/// Residue of `value` modulo a word-size modulus.
pub fn reduce_u64(value: &BigInt, modulus: u64) -> u64 {
    // the residue is below 2^64, so it has at most one digit
    value.mod_floor(&BigInt::from(modulus)).iter_u64_digits().next().unwrap_or(0)
}

/// Power of two `2^exponent` as a [BigInt].
pub fn pow2(exponent: u32) -> BigInt {
    BigInt::one() << exponent
}

/// Number of bits of `|value|`.
pub fn bit_length(value: &BigInt) -> u64 {
    value.abs().bits()
}
