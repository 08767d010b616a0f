pub const HE_MOD_BIT_COUNT_MAX: usize = 61;

pub const HE_POLY_MOD_DEGREE_MAX: usize = 131072;
pub const HE_POLY_MOD_DEGREE_MIN: usize = 2;

pub const HE_CRT_PRIME_BIT_COUNT_MAX: usize = 60;
pub const HE_CRT_PRIME_BIT_COUNT_MIN: usize = 20;

pub const HE_CIPHERTEXT_SIZE_MAX: usize = 3;
pub const HE_CIPHERTEXT_SIZE_MIN: usize = 2;

pub const HE_PRNG_SEED_BYTES: usize = 64;

#[inline]
pub fn get_significant_bit_count(value: u64) -> usize {
    if value == 0 {0} else {64 - value.leading_zeros() as usize}
}

/// Returns log2(value) if value is a power of two, otherwise -1.
pub fn get_power_of_two(value: u64) -> isize {
    if value == 0 || (value & (value - 1)) != 0 {-1}
    else {value.trailing_zeros() as isize}
}

#[inline]
pub fn reverse_bits_u64(operand: u64, bit_count: usize) -> u64 {
    if bit_count == 0 {
        0
    } else {
        operand.reverse_bits() >> (64 - bit_count)
    }
}

/// Permute a slice whose length is a power of two into bit-reversed order.
pub fn bit_reverse_vec<T: Clone>(values: &[T]) -> Vec<T> {
    let width = get_power_of_two(values.len() as u64);
    assert!(width >= 0, "bit reversal needs a power-of-two length");
    (0..values.len())
        .map(|i| values[reverse_bits_u64(i as u64, width as usize) as usize].clone())
        .collect()
}

/// Compare two scales with a tolerance relative to their magnitude.
pub fn are_close_f64(value1: f64, value2: f64) -> bool {
    let scale_factor = value1.abs().max(value2.abs()).max(1.0);
    (value1 - value2).abs() < f64::EPSILON * 16.0 * scale_factor
}
