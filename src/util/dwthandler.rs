use super::basic::{bit_reverse_vec, get_power_of_two};

/**
Provides an interface to all necessary arithmetic of the number structure that specializes a DwtHandler.
*/
pub trait Arithmetic: Clone {

    type Value: Clone;
    type Root;
    type Scalar;

    fn add(&self, a: &Self::Value, b: &Self::Value) -> Self::Value;
    fn sub(&self, a: &Self::Value, b: &Self::Value) -> Self::Value;
    fn mul_root(&self, a: &Self::Value, r: &Self::Root) -> Self::Value;
    fn mul_scalar(&self, a: &Self::Value, s: &Self::Scalar) -> Self::Value;

}

/**
Runs the radix-2 butterfly network shared by the exact number-theoretic transform and the
floating-point complex transforms.

@par The handler only knows how to combine values; which root of unity is used at each butterfly
is decided by the caller through a `root_at(stage, index)` closure. Stage `m` runs from 1 to
log2(n) and combines blocks of `2^m` values, `index` is the position inside the lower half of a
block. Plugging in `rou[index << (1 + log n - m)]` yields the cyclic DFT; plugging in the
rotation-group indices yields the CKKS canonical embedding.

@par The forward network is decimation-in-time (Cooley-Tukey): the input is permuted into
bit-reversed order and the output comes out in natural order. The inverse network is
decimation-in-frequency (Gentleman-Sande) on natural-order input followed by a bit-reversal,
so that `inverse_transform` with inverse roots undoes `transform` up to a factor of n.
*/
#[derive(Clone, Default)]
pub struct DwtHandler<ArithmeticType: Arithmetic> {
    arithmetic: ArithmeticType
}

impl<ArithmeticType: Arithmetic> DwtHandler<ArithmeticType> {

    pub fn new(num_struct: &ArithmeticType) -> Self {
        Self {arithmetic: num_struct.clone()}
    }

    pub fn transform<F>(&self, values: &[ArithmeticType::Value], root_at: F) -> Vec<ArithmeticType::Value>
    where
        F: Fn(usize, usize) -> ArithmeticType::Root
    {
        let log_n = get_power_of_two(values.len() as u64);
        debug_assert!(log_n >= 0);
        let mut result = bit_reverse_vec(values);
        for logm in 1..=(log_n as usize) {
            let gap = 1 << (logm - 1);
            let roots = (0..gap).map(|i| root_at(logm, i)).collect::<Vec<_>>();
            for block in result.chunks_exact_mut(gap << 1) {
                let (left, right) = block.split_at_mut(gap);
                for ((x, y), r) in left.iter_mut().zip(right.iter_mut()).zip(roots.iter()) {
                    let v = self.arithmetic.mul_root(y, r);
                    *y = self.arithmetic.sub(x, &v);
                    *x = self.arithmetic.add(x, &v);
                }
            }
        }
        result
    }

    pub fn inverse_transform<F>(&self, values: &[ArithmeticType::Value], root_at: F) -> Vec<ArithmeticType::Value>
    where
        F: Fn(usize, usize) -> ArithmeticType::Root
    {
        let log_n = get_power_of_two(values.len() as u64);
        debug_assert!(log_n >= 0);
        let mut result = values.to_vec();
        for logm in (1..=(log_n as usize)).rev() {
            let gap = 1 << (logm - 1);
            let roots = (0..gap).map(|i| root_at(logm, i)).collect::<Vec<_>>();
            for block in result.chunks_exact_mut(gap << 1) {
                let (left, right) = block.split_at_mut(gap);
                for ((x, y), r) in left.iter_mut().zip(right.iter_mut()).zip(roots.iter()) {
                    let u = self.arithmetic.add(x, y);
                    let v = self.arithmetic.sub(x, y);
                    *x = u;
                    *y = self.arithmetic.mul_root(&v, r);
                }
            }
        }
        bit_reverse_vec(&result)
    }

    pub fn scale(&self, values: &mut [ArithmeticType::Value], scalar: &ArithmeticType::Scalar) {
        for value in values.iter_mut() {
            *value = self.arithmetic.mul_scalar(value, scalar);
        }
    }

}
