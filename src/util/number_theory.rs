use crate::modulus::Modulus;
use crate::{util, CkksError, Result};

/// Witnesses that make Miller-Rabin deterministic for every 64-bit input.
const MILLER_RABIN_BASES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/** Extended GCD:
Returns (gcd, x, y) where gcd is the greatest common divisor of a and b.
The numbers x, y are such that gcd = ax + by.
*/
pub fn xgcd(mut x: u64, mut y: u64) -> (u64, i128, i128) {
    let mut prev_a: i128 = 1; let mut a: i128 = 0;
    let mut prev_b: i128 = 0; let mut b: i128 = 1;
    while y != 0 {
        let q = (x / y) as i128;
        let r = x % y;
        x = y;
        y = r;
        (prev_a, a) = (a, prev_a - q * a);
        (prev_b, b) = (b, prev_b - q * b);
    }
    (x, prev_a, prev_b)
}

pub fn try_invert_u64_mod_u64(value: u64, modulus: u64) -> Option<u64> {
    if value == 0 {return None;}
    let (cd, a, _) = xgcd(value, modulus);
    if cd != 1 {
        None
    } else {
        Some(a.rem_euclid(modulus as i128) as u64)
    }
}

#[inline]
fn mul_mod_raw(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 * b as u128) % m as u128) as u64
}

fn pow_mod_raw(mut base: u64, mut exponent: u64, m: u64) -> u64 {
    let mut result = 1 % m;
    base %= m;
    while exponent > 0 {
        if exponent & 1 == 1 {result = mul_mod_raw(result, base, m);}
        base = mul_mod_raw(base, base, m);
        exponent >>= 1;
    }
    result
}

/// Deterministic Miller-Rabin primality test for 64-bit values.
pub fn is_prime_u64(value: u64) -> bool {
    if value < 2 {return false;}
    for p in MILLER_RABIN_BASES {
        if value == p {return true;}
        if value % p == 0 {return false;}
    }
    // Find r and odd d that satisfy value = 2^r * d + 1.
    let mut d = value - 1;
    let mut r = 0;
    while (d & 1) == 0 {d >>= 1; r += 1;}
    'witness: for a in MILLER_RABIN_BASES {
        let mut x = pow_mod_raw(a, d, value);
        if x == 1 || x == value - 1 {continue;}
        for _ in 1..r {
            x = mul_mod_raw(x, x, value);
            if x == value - 1 {continue 'witness;}
        }
        return false;
    }
    true
}

/// Find `count` primes of exactly `bit_size` bits that are congruent to 1 modulo `factor`,
/// searching downwards from 2^bit_size.
pub fn get_primes(factor: u64, bit_size: usize, mut count: usize) -> Result<Vec<Modulus>> {
    let mut destination = Vec::with_capacity(count);
    // Start with (2^bit_size - 1) / factor * factor + 1
    let mut value = ((0x1u64 << bit_size) - 1) / factor * factor + 1;
    let lower_bound = 0x1u64 << (bit_size - 1);
    while count > 0 && value > lower_bound {
        if is_prime_u64(value) {
            destination.push(Modulus::new(value)?);
            count -= 1;
        }
        value -= factor;
    }
    if count > 0 {
        return Err(CkksError::InvalidParameters(format!(
            "failed to find enough {}-bit primes congruent to 1 mod {}", bit_size, factor
        )));
    }
    Ok(destination)
}

pub fn is_primitive_root(root: u64, degree: u64, modulus: &Modulus) -> bool {
    if root == 0 {
        false
    } else {
        // We check if root is a degree-th root of unity in integers modulo modulus,
        // where degree is a power of two. It suffices to check that root^(degree/2)
        // is -1 modulo modulus.
        util::exponentiate_u64_mod(root, degree >> 1, modulus) == (modulus.value() - 1)
    }
}

/// Search for any primitive `degree`-th root of unity, `degree` a power of two.
pub fn try_primitive_root(degree: u64, modulus: &Modulus) -> Option<u64> {
    let size_entire_group = modulus.value() - 1;
    // size_entire_group must be divisible by degree, or otherwise the primitive root does not
    // exist in integers modulo modulus
    if degree < 2 || size_entire_group % degree != 0 {
        return None;
    }
    let size_quotient_group = size_entire_group / degree;
    (2..modulus.value())
        .map(|candidate| util::exponentiate_u64_mod(candidate, size_quotient_group, modulus))
        .find(|root| is_primitive_root(*root, degree, modulus))
}

/// The smallest primitive `degree`-th root of unity modulo a prime.
pub fn try_minimal_primitive_root(degree: u64, modulus: &Modulus) -> Option<u64> {
    let root = try_primitive_root(degree, modulus)?;
    // Every primitive root is an odd power of the one found.
    let generator_sq = util::multiply_u64_mod(root, root, modulus);
    let mut current_generator = root;
    let mut minimal = root;
    for _ in 0..(degree / 2) {
        minimal = minimal.min(current_generator);
        current_generator = util::multiply_u64_mod(current_generator, generator_sq, modulus);
    }
    Some(minimal)
}
