use itertools::Itertools;

use crate::util::dwthandler::{Arithmetic, DwtHandler};
use crate::{
    util, CkksError, Modulus, Result, RingTransform,
};

#[derive(Clone, Copy, Default)]
struct ModArith {
    modulus: Modulus,
}

impl Arithmetic for ModArith {
    type Value = u64;
    type Root = u64;
    type Scalar = u64;

    #[inline]
    fn add(&self, a: &Self::Value, b: &Self::Value) -> Self::Value {
        util::add_u64_mod(*a, *b, &self.modulus)
    }

    #[inline]
    fn sub(&self, a: &Self::Value, b: &Self::Value) -> Self::Value {
        util::sub_u64_mod(*a, *b, &self.modulus)
    }

    #[inline]
    fn mul_root(&self, a: &Self::Value, r: &Self::Root) -> Self::Value {
        util::multiply_u64_mod(*a, *r, &self.modulus)
    }

    #[inline]
    fn mul_scalar(&self, a: &Self::Value, s: &Self::Scalar) -> Self::Value {
        util::multiply_u64_mod(*a, *s, &self.modulus)
    }
}

type NTTHandler = DwtHandler<ModArith>;

/// Precomputed tables for the negacyclic number-theoretic transform modulo a word-size prime.
///
/// For a prime q with q = 1 (mod 2N) the context holds a primitive 2N-th root of unity psi
/// (the smallest one), the powers psi^0, ..., psi^(N-1) and their inverses. All arithmetic
/// is exact, so the inverse transform recovers its input bit for bit.
#[derive(Clone)]
pub struct NttContext {
    degree: usize,
    log_degree: usize,
    modulus: Modulus,
    root: u64,
    inv_degree: u64,
    roots_of_unity: Vec<u64>,
    roots_of_unity_inv: Vec<u64>,
    ntt_handler: NTTHandler,
}

impl NttContext {

    /// Build the tables for `Z_q[X]/(X^N + 1)` with the minimal primitive 2N-th root of unity.
    pub fn new(poly_degree: usize, coeff_modulus: u64) -> Result<Self> {
        let modulus = Self::check_arguments(poly_degree, coeff_modulus)?;
        let degree = 2 * poly_degree as u64;
        let root = util::try_minimal_primitive_root(degree, &modulus)
            .ok_or(CkksError::NoRootOfUnity { degree, modulus: coeff_modulus })?;
        Self::with_root(poly_degree, coeff_modulus, root)
    }

    /// Build the tables around a caller-chosen primitive 2N-th root of unity.
    pub fn with_root(poly_degree: usize, coeff_modulus: u64, root: u64) -> Result<Self> {
        let modulus = Self::check_arguments(poly_degree, coeff_modulus)?;
        let degree = 2 * poly_degree as u64;
        if !util::is_primitive_root(root, degree, &modulus) {
            return Err(CkksError::NoRootOfUnity { degree, modulus: coeff_modulus });
        }
        let inv_root = util::try_invert_u64_mod(root, &modulus)
            .ok_or(CkksError::NoRootOfUnity { degree, modulus: coeff_modulus })?;
        let inv_degree = util::try_invert_u64_mod(poly_degree as u64, &modulus)
            .ok_or_else(|| CkksError::InvalidParameters(format!(
                "degree {} is not invertible modulo {}", poly_degree, coeff_modulus
            )))?;

        // Populate tables with powers of root in natural order.
        let powers = |base: u64| {
            std::iter::successors(Some(1u64), move |power| Some(util::multiply_u64_mod(*power, base, &modulus)))
                .take(poly_degree)
                .collect::<Vec<_>>()
        };

        Ok(NttContext {
            degree: poly_degree,
            log_degree: util::get_power_of_two(poly_degree as u64) as usize,
            modulus,
            root,
            inv_degree,
            roots_of_unity: powers(root),
            roots_of_unity_inv: powers(inv_root),
            ntt_handler: NTTHandler::new(&ModArith { modulus }),
        })
    }

    fn check_arguments(poly_degree: usize, coeff_modulus: u64) -> Result<Modulus> {
        if util::get_power_of_two(poly_degree as u64) < 1 || poly_degree > util::HE_POLY_MOD_DEGREE_MAX {
            return Err(CkksError::InvalidParameters(format!(
                "polynomial degree must be a power of two in [2, {}], got {}",
                util::HE_POLY_MOD_DEGREE_MAX, poly_degree
            )));
        }
        let modulus = Modulus::new(coeff_modulus)?;
        if !modulus.is_prime() {
            return Err(CkksError::InvalidParameters(format!(
                "NTT modulus {} is not prime", coeff_modulus
            )));
        }
        Ok(modulus)
    }

    // get members
    pub fn degree(&self) -> usize {self.degree}
    pub fn modulus(&self) -> &Modulus {&self.modulus}
    pub fn root(&self) -> u64 {self.root}
    pub fn inv_degree(&self) -> u64 {self.inv_degree}
    pub fn roots_of_unity(&self) -> &[u64] {&self.roots_of_unity}
    pub fn roots_of_unity_inv(&self) -> &[u64] {&self.roots_of_unity_inv}

    fn check_length(&self, len: usize) -> Result<()> {
        if len != self.degree {
            return Err(CkksError::RingDegreeMismatch { expected: self.degree, actual: len });
        }
        Ok(())
    }

    /// Cyclic transform of `coeffs` driven by the root table `rou`.
    ///
    /// With [Self::roots_of_unity] this evaluates the input at the powers of psi^2 and
    /// returns them in natural order; with [Self::roots_of_unity_inv] it runs the inverse
    /// network without the final 1/N factor.
    pub fn ntt(&self, coeffs: &[u64], rou: &[u64]) -> Result<Vec<u64>> {
        self.check_length(coeffs.len())?;
        self.check_length(rou.len())?;
        let reduced = coeffs.iter().map(|x| self.modulus.reduce(*x)).collect_vec();
        let log_degree = self.log_degree;
        Ok(self.ntt_handler.transform(&reduced, |logm, i| rou[i << (1 + log_degree - logm)]))
    }

    /// Exact inverse of [Self::ntt] with the forward table.
    pub fn intt(&self, values: &[u64]) -> Result<Vec<u64>> {
        let mut result = self.ntt(values, &self.roots_of_unity_inv)?;
        self.ntt_handler.scale(&mut result, &self.inv_degree);
        Ok(result)
    }

    /// Negacyclic forward transform: weigh coefficient i by psi^i, then transform.
    pub fn ftt_fwd(&self, coeffs: &[u64]) -> Result<Vec<u64>> {
        self.check_length(coeffs.len())?;
        let weighted = coeffs.iter().zip(&self.roots_of_unity)
            .map(|(c, r)| util::multiply_u64_mod(self.modulus.reduce(*c), *r, &self.modulus))
            .collect_vec();
        self.ntt(&weighted, &self.roots_of_unity)
    }

    /// Negacyclic inverse transform: transform back, then weigh slot i by psi^(-i) / N.
    pub fn ftt_inv(&self, values: &[u64]) -> Result<Vec<u64>> {
        let transformed = self.ntt(values, &self.roots_of_unity_inv)?;
        Ok(transformed.into_iter().zip(&self.roots_of_unity_inv)
            .map(|(v, r)| {
                let unweighted = util::multiply_u64_mod(v, *r, &self.modulus);
                util::multiply_u64_mod(unweighted, self.inv_degree, &self.modulus)
            })
            .collect())
    }

    /// Product of two polynomials in `Z_q[X]/(X^N + 1)`.
    pub fn multiply(&self, a: &[u64], b: &[u64]) -> Result<Vec<u64>> {
        let a = self.ftt_fwd(a)?;
        let b = self.ftt_fwd(b)?;
        let pointwise = a.into_iter().zip(b)
            .map(|(x, y)| util::multiply_u64_mod(x, y, &self.modulus))
            .collect_vec();
        self.ftt_inv(&pointwise)
    }

}

impl RingTransform for NttContext {
    type Value = u64;

    fn forward(&self, values: &[u64]) -> Result<Vec<u64>> {
        self.ftt_fwd(values)
    }

    fn inverse(&self, values: &[u64]) -> Result<Vec<u64>> {
        self.ftt_inv(values)
    }
}
