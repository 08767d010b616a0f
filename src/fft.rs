use num_complex::Complex64;

use crate::util::dwthandler::{Arithmetic, DwtHandler};
use crate::{util, CkksError, Result, RingTransform};

/// Generator of the rotation group of slots, (Z/MZ)* = <5> x <-1>.
const ROTATION_GENERATOR: usize = 5;

#[derive(Clone, Copy, Default)]
struct ComplexArith;

impl Arithmetic for ComplexArith {
    type Value = Complex64;
    type Root = Complex64;
    type Scalar = f64;

    #[inline]
    fn add(&self, a: &Self::Value, b: &Self::Value) -> Self::Value {
        a + b
    }

    #[inline]
    fn sub(&self, a: &Self::Value, b: &Self::Value) -> Self::Value {
        a - b
    }

    #[inline]
    fn mul_root(&self, a: &Self::Value, r: &Self::Root) -> Self::Value {
        a * r
    }

    #[inline]
    fn mul_scalar(&self, a: &Self::Value, s: &Self::Scalar) -> Self::Value {
        a * s
    }
}

type FFTHandler = DwtHandler<ComplexArith>;

struct ComplexRoots {
    roots: Vec<Complex64>,
    degree_of_roots: usize,
}

#[inline]
fn mirror(a: Complex64) -> Complex64 {
    Complex64::new(a.im, a.re)
}

impl ComplexRoots {

    fn new(degree_of_roots: usize) -> Self {
        // Generate 1/8 of all roots, the rest follows by symmetry.
        let roots = (0..=degree_of_roots / 8).map(|i| {
            Complex64::from_polar(1.0, 2.0 * std::f64::consts::PI * (i as f64) / (degree_of_roots as f64))
        }).collect();
        Self {
            roots,
            degree_of_roots,
        }
    }

    fn get_root(&self, mut index: usize) -> Complex64 {
        index &= self.degree_of_roots - 1;

        // This express the 8-fold symmetry of all n-th roots.
        if index <= self.degree_of_roots / 8 {
            self.roots[index]
        } else if index <= self.degree_of_roots / 4 {
            mirror(self.roots[self.degree_of_roots / 4 - index])
        } else if index < self.degree_of_roots / 2 {
            -self.get_root(self.degree_of_roots / 2 - index).conj()
        } else if index <= 3 * self.degree_of_roots / 4 {
            -self.get_root(index - self.degree_of_roots / 2)
        } else {
            self.get_root(self.degree_of_roots - index).conj()
        }
    }

}

/// Complex M-th roots of unity and the transforms built from them.
///
/// `fft_fwd`/`fft_inv` are the plain cyclic FFT and its inverse. `emb`/`emb_inv` implement the
/// CKKS canonical embedding: `emb` evaluates a vector of n <= M/4 slot coefficients at the
/// primitive M-th roots zeta^(5^j), and `emb_inv` recovers the coefficients. Both are only
/// approximate inverses of each other because they run in floating point.
#[derive(Clone)]
pub struct FftContext {
    fft_length: usize,
    num_slots: usize,
    roots_of_unity: Vec<Complex64>,
    roots_of_unity_inv: Vec<Complex64>,
    rot_group: Vec<usize>,
    fft_handler: FFTHandler,
}

impl FftContext {

    /// Precompute the tables for the M-th roots of unity, M a power of two and at least 4.
    pub fn new(fft_length: usize) -> Result<Self> {
        if util::get_power_of_two(fft_length as u64) < 2 {
            return Err(CkksError::InvalidParameters(format!(
                "FFT length must be a power of two and at least 4, got {}", fft_length
            )));
        }
        let complex_roots = ComplexRoots::new(fft_length);
        let roots_of_unity = (0..fft_length).map(|i| complex_roots.get_root(i)).collect::<Vec<_>>();
        let roots_of_unity_inv = roots_of_unity.iter().map(|r| r.conj()).collect();

        let num_slots = fft_length / 4;
        let rot_group = std::iter::successors(Some(1usize), |g| Some((g * ROTATION_GENERATOR) % fft_length))
            .take(num_slots)
            .collect();

        Ok(Self {
            fft_length,
            num_slots,
            roots_of_unity,
            roots_of_unity_inv,
            rot_group,
            fft_handler: FFTHandler::new(&ComplexArith),
        })
    }

    /// The order M of the roots of unity.
    pub fn fft_length(&self) -> usize {self.fft_length}

    /// Maximal input length of [Self::emb] and [Self::emb_inv], M/4.
    pub fn num_slots(&self) -> usize {self.num_slots}

    fn check_power_of_two(len: usize) -> Result<()> {
        if util::get_power_of_two(len as u64) < 0 {
            return Err(CkksError::ValueOutOfRange(format!(
                "transform length must be a power of two, got {}", len
            )));
        }
        Ok(())
    }

    fn check_fft_input(&self, values: &[Complex64]) -> Result<()> {
        Self::check_power_of_two(values.len())?;
        if values.len() > self.fft_length {
            return Err(CkksError::CapacityExceeded { len: values.len(), capacity: self.fft_length });
        }
        Ok(())
    }

    fn check_embedding_input(&self, values: &[Complex64]) -> Result<()> {
        if values.len() > self.num_slots {
            return Err(CkksError::CapacityExceeded { len: values.len(), capacity: self.num_slots });
        }
        Self::check_power_of_two(values.len())
    }

    fn fft(&self, coeffs: &[Complex64], rou: &[Complex64]) -> Vec<Complex64> {
        let m = self.fft_length;
        self.fft_handler.transform(coeffs, |logm, i| rou[(i * m) >> logm])
    }

    /// Cyclic FFT of a power-of-two length vector, evaluating at the powers of e^(2 pi i / n).
    pub fn fft_fwd(&self, coeffs: &[Complex64]) -> Result<Vec<Complex64>> {
        self.check_fft_input(coeffs)?;
        Ok(self.fft(coeffs, &self.roots_of_unity))
    }

    /// Inverse of [Self::fft_fwd].
    pub fn fft_inv(&self, values: &[Complex64]) -> Result<Vec<Complex64>> {
        self.check_fft_input(values)?;
        let mut result = self.fft(values, &self.roots_of_unity_inv);
        self.fft_handler.scale(&mut result, &(1.0 / values.len() as f64));
        Ok(result)
    }

    #[inline]
    fn embedding_root_index(&self, logm: usize, i: usize) -> usize {
        let idx_mod = 1 << (logm + 2);
        let gap = self.fft_length / idx_mod;
        (self.rot_group[i] % idx_mod) * gap
    }

    /// Canonical embedding of slot coefficients.
    pub fn emb(&self, coeffs: &[Complex64]) -> Result<Vec<Complex64>> {
        self.check_embedding_input(coeffs)?;
        Ok(self.fft_handler.transform(coeffs, |logm, i| {
            self.roots_of_unity[self.embedding_root_index(logm, i)]
        }))
    }

    /// Inverse canonical embedding.
    pub fn emb_inv(&self, values: &[Complex64]) -> Result<Vec<Complex64>> {
        self.check_embedding_input(values)?;
        let mut result = self.fft_handler.inverse_transform(values, |logm, i| {
            self.roots_of_unity_inv[self.embedding_root_index(logm, i)]
        });
        self.fft_handler.scale(&mut result, &(1.0 / values.len() as f64));
        Ok(result)
    }

}

impl RingTransform for FftContext {
    type Value = Complex64;

    fn forward(&self, values: &[Complex64]) -> Result<Vec<Complex64>> {
        self.emb(values)
    }

    fn inverse(&self, values: &[Complex64]) -> Result<Vec<Complex64>> {
        self.emb_inv(values)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    pub(crate) fn check_complex_vector_approx_eq(a: &[Complex64], b: &[Complex64], tolerance: f64) {
        assert_eq!(a.len(), b.len());
        a.iter().zip(b).enumerate().for_each(|(i, (x, y))| {
            assert!((x - y).norm() < tolerance, "index {}: {} != {}", i, x, y);
        });
    }

    fn sample_uniform(rng: &mut impl Rng, len: usize) -> Vec<Complex64> {
        (0..len).map(|_| Complex64::new(rng.gen_range(0.0..7.0), 0.0)).collect()
    }

    #[test]
    fn test_roots() {
        let context = FftContext::new(16).unwrap();
        for (i, root) in context.roots_of_unity.iter().enumerate() {
            let expected = Complex64::from_polar(1.0, 2.0 * std::f64::consts::PI * i as f64 / 16.0);
            assert!((root - expected).norm() < 1e-12);
        }
        assert_eq!(context.rot_group, vec![1, 5, 9, 13]);
        assert!(FftContext::new(2).is_err());
        assert!(FftContext::new(12).is_err());
    }

    #[test]
    fn test_fft() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);
        let n = 1 << 5;
        let context = FftContext::new(4 * n).unwrap();
        let vec = sample_uniform(&mut rng, n);
        let fft_vec = context.fft_fwd(&vec).unwrap();
        let to_check = context.fft_inv(&fft_vec).unwrap();
        check_complex_vector_approx_eq(&vec, &to_check, 1e-6);
    }

    #[test]
    fn test_fft_matches_dft() {
        let context = FftContext::new(16).unwrap();
        let vec = (0..8).map(|i| Complex64::new(i as f64, -(i as f64) / 2.0)).collect::<Vec<_>>();
        let fft_vec = context.fft_fwd(&vec).unwrap();
        let dft = (0..8).map(|k| {
            (0..8).map(|j| vec[j] * Complex64::from_polar(1.0, 2.0 * std::f64::consts::PI * (j * k) as f64 / 8.0))
                .sum::<Complex64>()
        }).collect::<Vec<_>>();
        check_complex_vector_approx_eq(&fft_vec, &dft, 1e-9);
    }

    #[test]
    fn test_emb() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);
        let n = 1 << 5;
        let context = FftContext::new(4 * n).unwrap();
        let vec = sample_uniform(&mut rng, n);
        let emb_vec = context.emb(&vec).unwrap();
        let to_check = context.emb_inv(&emb_vec).unwrap();
        check_complex_vector_approx_eq(&vec, &to_check, 1e-6);
        let to_check = context.inverse(&context.forward(&vec).unwrap()).unwrap();
        check_complex_vector_approx_eq(&vec, &to_check, 1e-6);
    }

    #[test]
    fn test_emb_evaluates_at_rotation_group() {
        // emb(v)[j] = sum_k v[k] * zeta^(k * 5^j) with zeta = e^(2 pi i / M)
        let context = FftContext::new(32).unwrap();
        let vec = (0..8).map(|i| Complex64::new(1.0 + i as f64, 0.5)).collect::<Vec<_>>();
        let emb_vec = context.emb(&vec).unwrap();
        let expected = (0..8).map(|j| {
            let power = context.rot_group[j];
            (0..8).map(|k| vec[k] * Complex64::from_polar(1.0, 2.0 * std::f64::consts::PI * (k * power) as f64 / 32.0))
                .sum::<Complex64>()
        }).collect::<Vec<_>>();
        check_complex_vector_approx_eq(&emb_vec, &expected, 1e-9);
    }

    #[test]
    fn test_embedding_capacity() {
        let context = FftContext::new(16).unwrap();
        let too_long = vec![Complex64::new(1.0, 0.0); 8];
        assert!(matches!(context.emb(&too_long), Err(CkksError::CapacityExceeded { len: 8, capacity: 4 })));
        assert!(matches!(context.emb_inv(&too_long[..3]), Err(CkksError::ValueOutOfRange(_))));
        assert!(context.fft_fwd(&[Complex64::new(1.0, 0.0); 32]).is_err());
    }
}
