use itertools::Itertools;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};

use crate::util::{self, bigint};
use crate::{CkksError, CrtContext, Modulus, NttContext, Result, RingTransform};

/// An element of `Z[X]/(X^N + 1)` with arbitrary-precision coefficients.
///
/// Coefficient `i` is the coefficient of `X^i`. All operations return new polynomials.
/// Operations that take an optional modulus reduce their result into `[0, modulus)` when
/// one is given and leave it unreduced otherwise.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SerializedPolynomial")]
pub struct Polynomial {
    coeffs: Vec<BigInt>,
}

#[derive(Deserialize)]
struct SerializedPolynomial {
    coeffs: Vec<BigInt>,
}

impl TryFrom<SerializedPolynomial> for Polynomial {
    type Error = CkksError;

    fn try_from(value: SerializedPolynomial) -> Result<Self> {
        Self::new(value.coeffs.len(), value.coeffs)
    }
}

impl Polynomial {

    /// Build a polynomial of ring degree `ring_degree` from exactly that many coefficients.
    pub fn new(ring_degree: usize, coeffs: Vec<BigInt>) -> Result<Self> {
        if util::get_power_of_two(ring_degree as u64) < 1 {
            return Err(CkksError::InvalidParameters(format!(
                "ring degree must be a power of two and at least 2, got {}", ring_degree
            )));
        }
        if coeffs.len() != ring_degree {
            return Err(CkksError::RingDegreeMismatch { expected: ring_degree, actual: coeffs.len() });
        }
        Ok(Self { coeffs })
    }

    /// Convenience constructor from small signed coefficients.
    pub fn from_i64(ring_degree: usize, coeffs: &[i64]) -> Result<Self> {
        Self::new(ring_degree, coeffs.iter().map(|c| BigInt::from(*c)).collect())
    }

    /// The zero polynomial.
    pub fn zero(ring_degree: usize) -> Self {
        Self { coeffs: vec![BigInt::zero(); ring_degree] }
    }

    pub fn ring_degree(&self) -> usize {self.coeffs.len()}

    pub fn coeffs(&self) -> &[BigInt] {&self.coeffs}

    /// Largest absolute coefficient.
    pub fn max_abs(&self) -> BigInt {
        self.coeffs.iter().map(|c| c.abs()).max().unwrap_or_default()
    }

    fn check_same_degree(&self, other: &Self) -> Result<()> {
        if self.ring_degree() != other.ring_degree() {
            return Err(CkksError::RingDegreeMismatch {
                expected: self.ring_degree(),
                actual: other.ring_degree(),
            });
        }
        Ok(())
    }

    fn map_coeffs<F: FnMut(&BigInt) -> BigInt>(&self, f: F) -> Self {
        Self { coeffs: self.coeffs.iter().map(f).collect() }
    }

    fn with_optional_reduce(self, modulus: Option<&BigInt>) -> Self {
        match modulus {
            Some(q) => self.reduce(q),
            None => self,
        }
    }

    pub fn add(&self, other: &Self, modulus: Option<&BigInt>) -> Result<Self> {
        self.check_same_degree(other)?;
        let coeffs = self.coeffs.iter().zip(&other.coeffs).map(|(a, b)| a + b).collect();
        Ok(Self { coeffs }.with_optional_reduce(modulus))
    }

    pub fn sub(&self, other: &Self, modulus: Option<&BigInt>) -> Result<Self> {
        self.check_same_degree(other)?;
        let coeffs = self.coeffs.iter().zip(&other.coeffs).map(|(a, b)| a - b).collect();
        Ok(Self { coeffs }.with_optional_reduce(modulus))
    }

    pub fn negate(&self, modulus: Option<&BigInt>) -> Self {
        self.map_coeffs(|c| -c).with_optional_reduce(modulus)
    }

    pub fn scalar_multiply(&self, scalar: &BigInt, modulus: Option<&BigInt>) -> Self {
        self.map_coeffs(|c| c * scalar).with_optional_reduce(modulus)
    }

    /// Divide every coefficient by `scalar`, rounding to the nearest integer.
    pub fn scalar_integer_divide(&self, scalar: &BigInt) -> Result<Self> {
        if !scalar.is_positive() {
            return Err(CkksError::ValueOutOfRange(format!("divisor must be positive, got {}", scalar)));
        }
        Ok(self.map_coeffs(|c| bigint::divide_round(c, scalar)))
    }

    /// Reduce every coefficient into `[0, modulus)`.
    pub fn reduce(&self, modulus: &BigInt) -> Self {
        self.map_coeffs(|c| bigint::reduce(c, modulus))
    }

    /// Reduce every coefficient into `(-modulus/2, modulus/2]`.
    pub fn mod_small(&self, modulus: &BigInt) -> Self {
        self.map_coeffs(|c| bigint::mod_small(c, modulus))
    }

    /// Negacyclic schoolbook product, `O(N^2)` big-integer multiplications.
    pub fn multiply_naive(&self, other: &Self, modulus: Option<&BigInt>) -> Result<Self> {
        self.check_same_degree(other)?;
        let n = self.ring_degree();
        let mut coeffs = vec![BigInt::zero(); n];
        for (i, a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in other.coeffs.iter().enumerate() {
                let product = a * b;
                let index = i + j;
                // X^N = -1
                if index < n {
                    coeffs[index] += product;
                } else {
                    coeffs[index - n] -= product;
                }
            }
        }
        Ok(Self { coeffs }.with_optional_reduce(modulus))
    }

    /// Product modulo a word-size prime through an exact negacyclic transform.
    /// The result lies in `[0, modulus)`.
    pub fn multiply_transform<T>(&self, other: &Self, transform: &T, modulus: &Modulus) -> Result<Self>
    where
        T: RingTransform<Value = u64>,
    {
        self.check_same_degree(other)?;
        let a = transform.forward(&self.residues(modulus))?;
        let b = transform.forward(&other.residues(modulus))?;
        let pointwise = a.into_iter().zip(b)
            .map(|(x, y)| util::multiply_u64_mod(x, y, modulus))
            .collect_vec();
        let coeffs = transform.inverse(&pointwise)?;
        Ok(Self { coeffs: coeffs.into_iter().map(BigInt::from).collect() })
    }

    /// Product modulo the prime of `ntt`, result in `[0, p)`.
    pub fn multiply_ntt(&self, other: &Self, ntt: &NttContext) -> Result<Self> {
        self.check_degree(ntt.degree())?;
        self.multiply_transform(other, ntt, ntt.modulus())
    }

    /// Product modulo the CRT modulus, as the centered representative.
    ///
    /// This is the exact integer product whenever every coefficient of the true product
    /// has absolute value below half the CRT modulus.
    pub fn multiply_crt(&self, other: &Self, crt: &CrtContext) -> Result<Self> {
        self.check_same_degree(other)?;
        self.check_degree(crt.poly_degree())?;
        let products = crt.ntts().iter()
            .map(|ntt| self.multiply_ntt(other, ntt))
            .collect::<Result<Vec<_>>>()?;
        let coeffs = (0..self.ring_degree())
            .map(|i| {
                let residues = products.iter().zip(crt.primes())
                    .map(|(p, prime)| bigint::reduce_u64(&p.coeffs[i], prime.value()))
                    .collect_vec();
                bigint::mod_small(&crt.reconstruct(&residues), crt.modulus())
            })
            .collect();
        Ok(Self { coeffs })
    }

    /// Product in `Z_q[X]/(X^N + 1)` with the result in `[0, modulus)`.
    ///
    /// Operands are first brought to their centered representatives. With a CRT context
    /// whose modulus bounds the product, the fast path is used; otherwise the schoolbook
    /// product is computed.
    pub fn multiply(&self, other: &Self, modulus: &BigInt, crt: Option<&CrtContext>) -> Result<Self> {
        self.check_same_degree(other)?;
        let a = self.mod_small(modulus);
        let b = other.mod_small(modulus);
        if let Some(crt) = crt {
            if Self::crt_can_hold_product(&a, &b, crt) {
                return Ok(a.multiply_crt(&b, crt)?.reduce(modulus));
            }
            tracing::debug!(
                modulus_bits = modulus.bits(),
                crt_bits = crt.modulus().bits(),
                "CRT modulus too small for product, using schoolbook multiplication"
            );
        }
        a.multiply_naive(&b, Some(modulus))
    }

    fn crt_can_hold_product(a: &Self, b: &Self, crt: &CrtContext) -> bool {
        if crt.poly_degree() != a.ring_degree() {
            return false;
        }
        // |c_k| <= N * max|a| * max|b|, which must stay below crt_modulus / 2
        let bound_bits = bigint::bit_length(&a.max_abs())
            + bigint::bit_length(&b.max_abs())
            + util::get_significant_bit_count(a.ring_degree() as u64) as u64;
        bound_bits < crt.modulus().bits()
    }

    fn check_degree(&self, degree: usize) -> Result<()> {
        if self.ring_degree() != degree {
            return Err(CkksError::RingDegreeMismatch { expected: degree, actual: self.ring_degree() });
        }
        Ok(())
    }

    fn residues(&self, modulus: &Modulus) -> Vec<u64> {
        self.coeffs.iter().map(|c| bigint::reduce_u64(c, modulus.value())).collect()
    }

}
