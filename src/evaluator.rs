use std::sync::Arc;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::ToPrimitive;
use tracing::{instrument, trace};

use crate::{
    util,
    Ciphertext, CkksContext, CkksError, Plaintext, Polynomial, RelinKey, Result, SwitchingKey,
};

/// Provides operations on [Ciphertext] objects.
///
/// Due to the properties of the encryption scheme, the arithmetic operations pass
/// through the encryption layer to the underlying slots, acting on them element-wise.
/// Every operation returns a new ciphertext and leaves its inputs untouched.
///
/// ## Arithmetic Operations
/// Addition, subtraction and negation keep level and scale. Binary operations require
/// both operands to be at the same level with the same scale; there is no implicit
/// alignment. Use [Evaluator::mod_switch_to_level] to bring a ciphertext down to a
/// lower level first.
///
/// ## Relinearization
/// The product of two ciphertexts of size 2 has size 3 and decrypts under `(1, s, s^2)`.
/// Relinearization uses a [RelinKey] to fold the `s^2` component back, and
/// [Evaluator::multiply] does this immediately.
///
/// ## Rescaling
/// A product carries the product of the input scales. [Evaluator::rescale] divides the
/// ciphertext by `q_l / q_(l+1)`, moving it one level down the modulus chain and dividing
/// its scale accordingly. Multiplying or rescaling at the last level fails with
/// [CkksError::LevelExhausted].
pub struct Evaluator {
    context: Arc<CkksContext>,
}

impl Evaluator {

    /// Create an evaluator with the specified [CkksContext].
    pub fn new(context: Arc<CkksContext>) -> Self {
        Self { context }
    }

    /// The [CkksContext] used by the evaluator.
    pub fn context(&self) -> &Arc<CkksContext> {&self.context}

    fn check_ciphertext(&self, cipher: &Ciphertext) -> Result<()> {
        let modulus = self.context.modulus_at(cipher.level())?;
        if modulus != cipher.modulus() {
            return Err(CkksError::ModulusMismatch { level: cipher.level(), actual: cipher.modulus().clone() });
        }
        if cipher.poly_degree() != self.context.poly_degree() {
            return Err(CkksError::RingDegreeMismatch {
                expected: self.context.poly_degree(),
                actual: cipher.poly_degree(),
            });
        }
        Ok(())
    }

    fn check_size(cipher: &Ciphertext, expected: usize) -> Result<()> {
        if cipher.size() != expected {
            return Err(CkksError::SizeMismatch { expected, actual: cipher.size() });
        }
        Ok(())
    }

    fn check_scale(left: f64, right: f64) -> Result<()> {
        if !util::are_close_f64(left, right) {
            return Err(CkksError::ScaleMismatch { left, right });
        }
        Ok(())
    }

    fn check_binary_operands(&self, cipher1: &Ciphertext, cipher2: &Ciphertext) -> Result<()> {
        self.check_ciphertext(cipher1)?;
        self.check_ciphertext(cipher2)?;
        Self::check_size(cipher1, 2)?;
        Self::check_size(cipher2, 2)?;
        if cipher1.level() != cipher2.level() {
            return Err(CkksError::LevelMismatch { left: cipher1.level(), right: cipher2.level() });
        }
        Self::check_scale(cipher1.scale(), cipher2.scale())
    }

    fn check_not_last_level(&self, cipher: &Ciphertext) -> Result<()> {
        if cipher.level() >= self.context.max_level() {
            return Err(CkksError::LevelExhausted { level: cipher.level() });
        }
        Ok(())
    }

    /// Negates a ciphertext.
    pub fn negate(&self, cipher: &Ciphertext) -> Result<Ciphertext> {
        self.check_ciphertext(cipher)?;
        Self::check_size(cipher, 2)?;
        let modulus = cipher.modulus();
        let polys = cipher.polys().iter().map(|p| p.negate(Some(modulus))).collect();
        Ciphertext::new(polys, cipher.scale(), cipher.level(), modulus.clone())
    }

    /// Adds two ciphertexts at the same level and scale.
    pub fn add(&self, cipher1: &Ciphertext, cipher2: &Ciphertext) -> Result<Ciphertext> {
        self.check_binary_operands(cipher1, cipher2)?;
        let modulus = cipher1.modulus();
        let polys = cipher1.polys().iter().zip(cipher2.polys())
            .map(|(a, b)| a.add(b, Some(modulus)))
            .collect::<Result<Vec<_>>>()?;
        Ciphertext::new(polys, cipher1.scale(), cipher1.level(), modulus.clone())
    }

    /// Subtracts `cipher2` from `cipher1`; both at the same level and scale.
    pub fn sub(&self, cipher1: &Ciphertext, cipher2: &Ciphertext) -> Result<Ciphertext> {
        self.check_binary_operands(cipher1, cipher2)?;
        let modulus = cipher1.modulus();
        let polys = cipher1.polys().iter().zip(cipher2.polys())
            .map(|(a, b)| a.sub(b, Some(modulus)))
            .collect::<Result<Vec<_>>>()?;
        Ciphertext::new(polys, cipher1.scale(), cipher1.level(), modulus.clone())
    }

    /// Adds a plaintext with the same scale to a ciphertext.
    pub fn add_plain(&self, cipher: &Ciphertext, plain: &Plaintext) -> Result<Ciphertext> {
        self.check_ciphertext(cipher)?;
        Self::check_size(cipher, 2)?;
        self.context.check_ring_degree(plain.poly())?;
        Self::check_scale(cipher.scale(), plain.scale())?;
        let modulus = cipher.modulus();
        let c0 = cipher.c0().add(plain.poly(), Some(modulus))?;
        Ciphertext::new(vec![c0, cipher.c1().clone()], cipher.scale(), cipher.level(), modulus.clone())
    }

    /// Multiplies a ciphertext by a plaintext. The result carries the product of both scales.
    #[instrument(skip_all)]
    pub fn multiply_plain(&self, cipher: &Ciphertext, plain: &Plaintext) -> Result<Ciphertext> {
        self.check_ciphertext(cipher)?;
        Self::check_size(cipher, 2)?;
        self.check_not_last_level(cipher)?;
        self.context.check_ring_degree(plain.poly())?;
        let modulus = cipher.modulus();
        let polys = cipher.polys().iter()
            .map(|c| self.context.multiply(c, plain.poly(), modulus))
            .collect::<Result<Vec<_>>>()?;
        Ciphertext::new(polys, cipher.scale() * plain.scale(), cipher.level(), modulus.clone())
    }

    /// Tensor product of two ciphertexts, giving a size-3 ciphertext under `(1, s, s^2)`.
    #[instrument(skip_all)]
    pub fn multiply_without_relin(&self, cipher1: &Ciphertext, cipher2: &Ciphertext) -> Result<Ciphertext> {
        self.check_binary_operands(cipher1, cipher2)?;
        self.check_not_last_level(cipher1)?;
        let modulus = cipher1.modulus();
        let context = &self.context;

        let d0 = context.multiply(cipher1.c0(), cipher2.c0(), modulus)?;
        let d1 = context.multiply(cipher1.c0(), cipher2.c1(), modulus)?
            .add(&context.multiply(cipher1.c1(), cipher2.c0(), modulus)?, Some(modulus))?;
        let d2 = context.multiply(cipher1.c1(), cipher2.c1(), modulus)?;
        Ciphertext::new(vec![d0, d1, d2], cipher1.scale() * cipher2.scale(), cipher1.level(), modulus.clone())
    }

    /// Multiplies two ciphertexts and relinearizes the product.
    /// The result has the product of the input scales and should be rescaled.
    #[instrument(skip_all)]
    pub fn multiply(&self, cipher1: &Ciphertext, cipher2: &Ciphertext, relin_key: &RelinKey) -> Result<Ciphertext> {
        let product = self.multiply_without_relin(cipher1, cipher2)?;
        self.relinearize(&product, relin_key)
    }

    /// Applies a switching key to `poly` at `level`: returns `round(poly * key / P)` for
    /// both key components, modulo `q_level`.
    fn key_switch(&self, poly: &Polynomial, key: &SwitchingKey, level: usize) -> Result<(Polynomial, Polynomial)> {
        let modulus = self.context.modulus_at(level)?;
        let big_modulus = self.context.big_modulus();
        let key_modulus: BigInt = big_modulus * modulus;
        let centered = poly.mod_small(modulus);

        let switch_component = |component: &Polynomial| -> Result<Polynomial> {
            let reduced = component.reduce(&key_modulus);
            Ok(self.context.multiply(&reduced, &centered, &key_modulus)?
                .mod_small(&key_modulus)
                .scalar_integer_divide(big_modulus)?
                .reduce(modulus))
        };
        Ok((switch_component(key.p0())?, switch_component(key.p1())?))
    }

    /// Folds the `s^2` component of a size-3 ciphertext back into a size-2 ciphertext.
    #[instrument(skip_all)]
    pub fn relinearize(&self, cipher: &Ciphertext, relin_key: &RelinKey) -> Result<Ciphertext> {
        self.check_ciphertext(cipher)?;
        Self::check_size(cipher, 3)?;
        let modulus = cipher.modulus();
        let (k0, k1) = self.key_switch(&cipher.polys()[2], relin_key.as_switching_key(), cipher.level())?;
        let c0 = cipher.c0().add(&k0, Some(modulus))?;
        let c1 = cipher.c1().add(&k1, Some(modulus))?;
        Ciphertext::new(vec![c0, c1], cipher.scale(), cipher.level(), modulus.clone())
    }

    /// Moves a ciphertext decryptable under `s'` to one decryptable under `s`, where the
    /// switching key was created by the owner of `s` for `s'`.
    #[instrument(skip_all)]
    pub fn switch_key(&self, cipher: &Ciphertext, switching_key: &SwitchingKey) -> Result<Ciphertext> {
        self.check_ciphertext(cipher)?;
        Self::check_size(cipher, 2)?;
        let modulus = cipher.modulus();
        let (k0, k1) = self.key_switch(cipher.c1(), switching_key, cipher.level())?;
        let c0 = cipher.c0().add(&k0, Some(modulus))?;
        Ciphertext::new(vec![c0, k1], cipher.scale(), cipher.level(), modulus.clone())
    }

    /// Divides a ciphertext by `q_l / q_(l+1)` and moves it to the next level.
    #[instrument(skip_all)]
    pub fn rescale(&self, cipher: &Ciphertext) -> Result<Ciphertext> {
        self.check_ciphertext(cipher)?;
        Self::check_size(cipher, 2)?;
        let required = self.context.scaling_factor();
        if cipher.scale() <= required || util::are_close_f64(cipher.scale(), required) {
            return Err(CkksError::InsufficientScale { scale: cipher.scale(), required });
        }
        self.check_not_last_level(cipher)?;

        let level = cipher.level();
        let modulus = cipher.modulus();
        let factor = self.context.rescale_factor(level)?;
        let new_modulus = self.context.modulus_at(level + 1)?;
        let polys = cipher.polys().iter()
            .map(|p| -> Result<Polynomial> {
                Ok(p.mod_small(modulus).scalar_integer_divide(&factor)?.reduce(new_modulus))
            })
            .collect::<Result<Vec<_>>>()?;
        let factor = factor.to_f64()
            .ok_or_else(|| CkksError::ValueOutOfRange(format!("rescale factor {} does not fit a float", factor)))?;

        trace!(from = level, to = level + 1, "rescaled ciphertext");
        Ciphertext::new(polys, cipher.scale() / factor, level + 1, new_modulus.clone())
    }

    /// Reduces a ciphertext to the modulus of a lower `level` without changing its scale.
    ///
    /// Plain reduction is only valid when the target modulus divides the current one, which
    /// holds for chains built from a dividing scaling factor but not for floor-divided ones.
    pub fn mod_switch_to_level(&self, cipher: &Ciphertext, level: usize) -> Result<Ciphertext> {
        self.check_ciphertext(cipher)?;
        if level < cipher.level() {
            return Err(CkksError::LevelMismatch { left: cipher.level(), right: level });
        }
        let new_modulus = self.context.modulus_at(level)?;
        if !cipher.modulus().is_multiple_of(new_modulus) {
            return Err(CkksError::IndivisibleModulus { from: cipher.level(), to: level });
        }
        let polys = cipher.polys().iter()
            .map(|p| p.mod_small(cipher.modulus()).reduce(new_modulus))
            .collect();
        trace!(from = cipher.level(), to = level, "switched ciphertext modulus");
        Ciphertext::new(polys, cipher.scale(), level, new_modulus.clone())
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fft::tests::check_complex_vector_approx_eq;
    use crate::util::{bigint::pow2, PRNGSeed};
    use crate::{CkksEncoder, CkksParameters, Decryptor, Encryptor, KeyGenerator};
    use num_complex::Complex64;
    use rand::{Rng, SeedableRng};

    const TOLERANCE: f64 = 1e-3;

    struct Setup {
        context: Arc<CkksContext>,
        keygen: KeyGenerator,
        encoder: CkksEncoder,
        encryptor: Encryptor,
        decryptor: Decryptor,
        evaluator: Evaluator,
    }

    impl Setup {
        fn new(params: CkksParameters) -> Self {
            let context = CkksContext::new(params).unwrap();
            let keygen = KeyGenerator::from_seed(context.clone(), PRNGSeed::from(42)).unwrap();
            let encoder = CkksEncoder::new(context.clone());
            let encryptor = Encryptor::new(context.clone(), keygen.public_key().clone(), None)
                .with_seed(PRNGSeed::from(1));
            let decryptor = Decryptor::new(context.clone(), keygen.secret_key().clone());
            let evaluator = Evaluator::new(context.clone());
            Self { context, keygen, encoder, encryptor, decryptor, evaluator }
        }

        fn standard(poly_degree: usize) -> Self {
            Self::new(CkksParameters::new(poly_degree, pow2(600), pow2(1200), 2.0_f64.powi(30)))
        }

        fn encrypt(&self, values: &[Complex64]) -> Ciphertext {
            let plain = self.encoder.encode(values, self.context.scaling_factor()).unwrap();
            self.encryptor.encrypt(&plain).unwrap()
        }

        fn decrypt(&self, cipher: &Ciphertext) -> Vec<Complex64> {
            self.encoder.decode(&self.decryptor.decrypt(cipher).unwrap()).unwrap()
        }
    }

    fn random_values(rng: &mut impl Rng, len: usize) -> Vec<Complex64> {
        (0..len).map(|_| Complex64::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0))).collect()
    }

    fn elementwise<F: Fn(Complex64, Complex64) -> Complex64>(a: &[Complex64], b: &[Complex64], f: F) -> Vec<Complex64> {
        a.iter().zip(b).map(|(x, y)| f(*x, *y)).collect()
    }

    #[test]
    fn test_add_sub_negate() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);
        let setup = Setup::standard(16);
        let a = random_values(&mut rng, 8);
        let b = random_values(&mut rng, 8);
        let ca = setup.encrypt(&a);
        let cb = setup.encrypt(&b);

        let sum = setup.evaluator.add(&ca, &cb).unwrap();
        assert_eq!(sum.level(), 0);
        check_complex_vector_approx_eq(&setup.decrypt(&sum), &elementwise(&a, &b, |x, y| x + y), TOLERANCE);

        let difference = setup.evaluator.sub(&ca, &cb).unwrap();
        check_complex_vector_approx_eq(&setup.decrypt(&difference), &elementwise(&a, &b, |x, y| x - y), TOLERANCE);

        let negated = setup.evaluator.negate(&ca).unwrap();
        let expected = a.iter().map(|x| -x).collect::<Vec<_>>();
        check_complex_vector_approx_eq(&setup.decrypt(&negated), &expected, TOLERANCE);
    }

    #[test]
    fn test_multiply_rescale() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);
        let setup = Setup::standard(16);
        let a = random_values(&mut rng, 8);
        let b = random_values(&mut rng, 8);
        let ca = setup.encrypt(&a);
        let cb = setup.encrypt(&b);

        let product = setup.evaluator.multiply(&ca, &cb, setup.keygen.relin_key()).unwrap();
        assert_eq!(product.size(), 2);
        assert_eq!(product.level(), 0);
        assert_eq!(product.scale(), 2.0_f64.powi(60));

        let rescaled = setup.evaluator.rescale(&product).unwrap();
        assert_eq!(rescaled.level(), ca.level() + 1);
        assert_eq!(rescaled.modulus(), &pow2(570));
        assert_eq!(rescaled.scale(), 2.0_f64.powi(30));
        check_complex_vector_approx_eq(&setup.decrypt(&rescaled), &elementwise(&a, &b, |x, y| x * y), TOLERANCE);
    }

    #[test]
    fn test_multiply_small_ring() {
        let setup = Setup::standard(4);
        let a = [Complex64::new(28.0, 0.0), Complex64::new(1.0, 0.0)];
        let b = [Complex64::new(0.5, 0.0), Complex64::new(-3.0, 0.0)];
        let product = setup.evaluator.multiply(&setup.encrypt(&a), &setup.encrypt(&b), setup.keygen.relin_key()).unwrap();
        let rescaled = setup.evaluator.rescale(&product).unwrap();
        check_complex_vector_approx_eq(&setup.decrypt(&rescaled), &elementwise(&a, &b, |x, y| x * y), TOLERANCE);
    }

    #[test]
    fn test_multiply_without_relin() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        let setup = Setup::standard(8);
        let a = random_values(&mut rng, 4);
        let b = random_values(&mut rng, 4);
        let product = setup.evaluator.multiply_without_relin(&setup.encrypt(&a), &setup.encrypt(&b)).unwrap();
        assert_eq!(product.size(), 3);
        assert_eq!(product.degree(), 2);
        let expected = elementwise(&a, &b, |x, y| x * y);
        check_complex_vector_approx_eq(&setup.decrypt(&product), &expected, TOLERANCE);

        let relinearized = setup.evaluator.relinearize(&product, setup.keygen.relin_key()).unwrap();
        assert_eq!(relinearized.size(), 2);
        check_complex_vector_approx_eq(&setup.decrypt(&relinearized), &expected, TOLERANCE);

        assert!(matches!(
            setup.evaluator.add(&product, &product),
            Err(CkksError::SizeMismatch { expected: 2, actual: 3 })
        ));
        assert!(matches!(
            setup.evaluator.relinearize(&relinearized, setup.keygen.relin_key()),
            Err(CkksError::SizeMismatch { expected: 3, actual: 2 })
        ));
        assert!(matches!(setup.evaluator.rescale(&product), Err(CkksError::SizeMismatch { .. })));
    }

    #[test]
    fn test_plain_operations() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(11);
        let setup = Setup::standard(8);
        let a = random_values(&mut rng, 4);
        let b = random_values(&mut rng, 4);
        let ca = setup.encrypt(&a);
        let pb = setup.encoder.encode(&b, setup.context.scaling_factor()).unwrap();

        let sum = setup.evaluator.add_plain(&ca, &pb).unwrap();
        check_complex_vector_approx_eq(&setup.decrypt(&sum), &elementwise(&a, &b, |x, y| x + y), TOLERANCE);

        let product = setup.evaluator.multiply_plain(&ca, &pb).unwrap();
        let rescaled = setup.evaluator.rescale(&product).unwrap();
        check_complex_vector_approx_eq(&setup.decrypt(&rescaled), &elementwise(&a, &b, |x, y| x * y), TOLERANCE);

        let other_scale = setup.encoder.encode(&b, 2.0_f64.powi(20)).unwrap();
        assert!(matches!(setup.evaluator.add_plain(&ca, &other_scale), Err(CkksError::ScaleMismatch { .. })));
    }

    #[test]
    fn test_mismatches() {
        let setup = Setup::standard(8);
        let values = [Complex64::new(1.0, 0.0), Complex64::new(2.0, 0.0)];
        let fresh = setup.encrypt(&values);
        let product = setup.evaluator.multiply(&fresh, &fresh, setup.keygen.relin_key()).unwrap();
        let rescaled = setup.evaluator.rescale(&product).unwrap();

        assert!(matches!(
            setup.evaluator.add(&fresh, &rescaled),
            Err(CkksError::LevelMismatch { left: 0, right: 1 })
        ));
        assert!(matches!(
            setup.evaluator.multiply(&fresh, &rescaled, setup.keygen.relin_key()),
            Err(CkksError::LevelMismatch { .. })
        ));
        assert!(matches!(setup.evaluator.add(&fresh, &product), Err(CkksError::ScaleMismatch { .. })));
        assert!(matches!(setup.evaluator.rescale(&fresh), Err(CkksError::InsufficientScale { .. })));

        let wrong_modulus = Ciphertext::new(fresh.polys().to_vec(), fresh.scale(), 1, fresh.modulus().clone()).unwrap();
        assert!(matches!(setup.evaluator.negate(&wrong_modulus), Err(CkksError::ModulusMismatch { level: 1, .. })));
    }

    #[test]
    fn test_level_exhaustion() {
        let scale = 2.0_f64.powi(30);
        let params = CkksParameters::new(8, pow2(90), pow2(90), scale);
        let setup = Setup::new(params);
        assert_eq!(setup.context.modulus_chain(), &[pow2(90), pow2(60)]);

        let values = [Complex64::new(1.5, 0.0), Complex64::new(-2.0, 0.0)];
        let fresh = setup.encrypt(&values);
        let product = setup.evaluator.multiply(&fresh, &fresh, setup.keygen.relin_key()).unwrap();
        let rescaled = setup.evaluator.rescale(&product).unwrap();
        assert_eq!(rescaled.level(), 1);
        let expected = elementwise(&values, &values, |x, y| x * y);
        check_complex_vector_approx_eq(&setup.decrypt(&rescaled)[..2], &expected, TOLERANCE);

        assert!(matches!(
            setup.evaluator.multiply(&rescaled, &rescaled, setup.keygen.relin_key()),
            Err(CkksError::LevelExhausted { level: 1 })
        ));
        let plain = setup.encoder.encode(&values, scale).unwrap();
        assert!(matches!(setup.evaluator.multiply_plain(&rescaled, &plain), Err(CkksError::LevelExhausted { level: 1 })));

        let squared_scale = Ciphertext::new(rescaled.polys().to_vec(), scale * scale, 1, rescaled.modulus().clone()).unwrap();
        assert!(matches!(setup.evaluator.rescale(&squared_scale), Err(CkksError::LevelExhausted { level: 1 })));
    }

    #[test]
    fn test_mod_switch_then_add() {
        let setup = Setup::standard(8);
        let a = [Complex64::new(3.0, 1.0), Complex64::new(-1.0, 0.5)];
        let b = [Complex64::new(2.0, 0.0), Complex64::new(0.25, -1.0)];
        let ca = setup.encrypt(&a);
        let cb = setup.encrypt(&b);
        let product = setup.evaluator.rescale(&setup.evaluator.multiply(&ca, &cb, setup.keygen.relin_key()).unwrap()).unwrap();

        let switched = setup.evaluator.mod_switch_to_level(&ca, 1).unwrap();
        assert_eq!(switched.level(), 1);
        assert_eq!(switched.modulus(), product.modulus());
        check_complex_vector_approx_eq(&setup.decrypt(&switched)[..2], &a, TOLERANCE);

        let sum = setup.evaluator.add(&product, &switched).unwrap();
        let expected = a.iter().zip(&b).map(|(x, y)| x * y + x).collect::<Vec<_>>();
        check_complex_vector_approx_eq(&setup.decrypt(&sum)[..2], &expected, TOLERANCE);

        assert!(matches!(setup.evaluator.mod_switch_to_level(&product, 0), Err(CkksError::LevelMismatch { .. })));
        assert!(matches!(setup.evaluator.mod_switch_to_level(&ca, 19), Err(CkksError::LevelExhausted { level: 19 })));
    }

    #[test]
    fn test_non_dividing_scale() {
        let scale = 1e9;
        let setup = Setup::new(CkksParameters::new(8, pow2(600), pow2(1200), scale));
        assert_eq!(setup.context.max_level(), 19);
        let values = [Complex64::new(28.0, 0.0), Complex64::new(1.0, 0.0)];
        let cipher = setup.encrypt(&values);
        let relin_key = setup.keygen.relin_key();

        let mut power = cipher.clone();
        let mut expected = values.to_vec();
        for level in 1..=3 {
            let product = setup.evaluator.multiply(&power, &power, relin_key).unwrap();
            power = setup.evaluator.rescale(&product).unwrap();
            assert_eq!(power.level(), level);
            assert_eq!(power.scale(), scale);
            expected = elementwise(&expected, &expected, |x, y| x * y);
            let largest = expected[0].norm();
            check_complex_vector_approx_eq(&setup.decrypt(&power)[..2], &expected, largest * 1e-6);
        }

        assert!(matches!(
            setup.evaluator.mod_switch_to_level(&cipher, 1),
            Err(CkksError::IndivisibleModulus { from: 0, to: 1 })
        ));
    }

    #[test]
    fn test_switch_key() {
        let setup = Setup::standard(8);
        let other = KeyGenerator::from_seed(setup.context.clone(), PRNGSeed::from(43)).unwrap();
        let other_encryptor = Encryptor::new(setup.context.clone(), other.public_key().clone(), None);

        let values = [Complex64::new(4.0, -2.0), Complex64::new(0.5, 0.0), Complex64::new(-7.0, 3.0)];
        let plain = setup.encoder.encode(&values, setup.context.scaling_factor()).unwrap();
        let cipher = other_encryptor.encrypt(&plain).unwrap();

        let switching_key = setup.keygen.create_switching_key(other.secret_key().poly()).unwrap();
        let switched = setup.evaluator.switch_key(&cipher, &switching_key).unwrap();
        assert_eq!(switched.level(), cipher.level());
        check_complex_vector_approx_eq(&setup.decrypt(&switched)[..3], &values, TOLERANCE);
    }

    #[test]
    fn test_depth_two() {
        let setup = Setup::standard(8);
        let values = [Complex64::new(1.5, 0.0), Complex64::new(-0.5, 0.25)];
        let cipher = setup.encrypt(&values);
        let relin_key = setup.keygen.relin_key();
        let squared = setup.evaluator.rescale(&setup.evaluator.multiply(&cipher, &cipher, relin_key).unwrap()).unwrap();
        let fourth = setup.evaluator.rescale(&setup.evaluator.multiply(&squared, &squared, relin_key).unwrap()).unwrap();
        assert_eq!(fourth.level(), 2);
        let expected = values.iter().map(|x| x.powi(4)).collect::<Vec<_>>();
        check_complex_vector_approx_eq(&setup.decrypt(&fourth)[..2], &expected, TOLERANCE);
    }

    #[test]
    fn test_serialize_ciphertext() {
        let setup = Setup::standard(8);
        let cipher = setup.encrypt(&[Complex64::new(2.0, 0.0)]);
        let bytes = bincode::serialize(&cipher).unwrap();
        let restored: Ciphertext = bincode::deserialize(&bytes).unwrap();
        assert_eq!(restored, cipher);
        let sum = setup.evaluator.add(&restored, &cipher).unwrap();
        assert!((setup.decrypt(&sum)[0].re - 4.0).abs() < TOLERANCE);
    }
}
