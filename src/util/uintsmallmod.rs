use crate::modulus::Modulus;

use super::try_invert_u64_mod_u64;

/** Reduces `input` with base 2^64 Barrett reduction. */
#[inline]
pub fn barrett_reduce_u128(input: u128, modulus: &Modulus) -> u64 {
    let [ratio0, ratio1, _] = *modulus.const_ratio();
    let (input0, input1) = (input as u64, (input >> 64) as u64);

    // Round 1
    let carry = ((input0 as u128 * ratio0 as u128) >> 64) as u64;
    let product = input0 as u128 * ratio1 as u128;
    let (tmp1, overflow) = (product as u64).overflowing_add(carry);
    let tmp3 = ((product >> 64) as u64) + overflow as u64;

    // Round 2
    let product = input1 as u128 * ratio0 as u128;
    let (_, overflow) = tmp1.overflowing_add(product as u64);
    let carry = ((product >> 64) as u64) + overflow as u64;

    // Only the third word of input * const_ratio is needed
    let quotient = input1.wrapping_mul(ratio1).wrapping_add(tmp3).wrapping_add(carry);

    // Barrett subtraction; one more subtraction is enough
    let remainder = input0.wrapping_sub(quotient.wrapping_mul(modulus.value()));
    if remainder >= modulus.value() {remainder - modulus.value()} else {remainder}
}

/** floor(2^64 / modulus) is the high word of the 128-bit ratio. */
#[inline]
pub fn barrett_reduce_u64(input: u64, modulus: &Modulus) -> u64 {
    let quotient = ((input as u128 * modulus.const_ratio()[1] as u128) >> 64) as u64;
    let remainder = input - quotient * modulus.value();
    if remainder >= modulus.value() {remainder - modulus.value()} else {remainder}
}

/** Both operands must be reduced. */
#[inline]
pub fn add_u64_mod(operand1: u64, operand2: u64, modulus: &Modulus) -> u64 {
    let sum = operand1 + operand2;
    if sum >= modulus.value() {sum - modulus.value()} else {sum}
}

/** Both operands must be reduced. */
#[inline]
pub fn sub_u64_mod(operand1: u64, operand2: u64, modulus: &Modulus) -> u64 {
    if operand1 >= operand2 {operand1 - operand2} else {operand1 + modulus.value() - operand2}
}

#[inline]
pub fn multiply_u64_mod(operand1: u64, operand2: u64, modulus: &Modulus) -> u64 {
    modulus.reduce_u128(operand1 as u128 * operand2 as u128)
}

#[inline]
pub fn try_invert_u64_mod(operand: u64, modulus: &Modulus) -> Option<u64> {
    try_invert_u64_mod_u64(operand, modulus.value())
}

/**
Returns operand^exponent mod modulus.
*/
pub fn exponentiate_u64_mod(operand: u64, mut exponent: u64, modulus: &Modulus) -> u64 {
    let mut power = modulus.reduce(operand);
    let mut result = modulus.reduce(1);
    while exponent > 0 {
        if (exponent & 1) > 0 {
            result = multiply_u64_mod(result, power, modulus);
        }
        exponent >>= 1;
        power = multiply_u64_mod(power, power, modulus);
    }
    result
}
