use std::sync::Arc;

use tracing::instrument;

use crate::{
    util::{rlwe, BlakeRNGFactory, PRNGSeed},
    Ciphertext, CkksContext, CkksError, Plaintext, Polynomial, PublicKey, Result, SecretKey,
};

/// Encrypts [Plaintext] objects into [Ciphertext] objects.
///
/// Constructing an Encryptor requires a [CkksContext] and the public key. If an
/// Encryptor is also given a secret key, it additionally supports symmetric-key
/// encryption with [Encryptor::encrypt_symmetric].
///
/// Fresh ciphertexts are at level 0, that is modulo the top modulus q0, and carry
/// the scale of their plaintext.
/// ```rust
/// use ckks::*;
/// use ckks::util::bigint::pow2;
/// let params = CkksParameters::new(4, pow2(600), pow2(1200), (1u64 << 30) as f64);
/// let context = CkksContext::new(params).unwrap();
/// let keygen = KeyGenerator::new(context.clone()).unwrap();
/// let encoder = CkksEncoder::new(context.clone());
/// let encryptor = Encryptor::new(context.clone(), keygen.public_key().clone(), None);
/// let decryptor = Decryptor::new(context.clone(), keygen.secret_key().clone());
///
/// let plain = encoder.encode_f64(&[28.0, 1.0], context.scaling_factor()).unwrap();
/// let cipher = encryptor.encrypt(&plain).unwrap();
/// let decoded = encoder.decode(&decryptor.decrypt(&cipher).unwrap()).unwrap();
/// assert!((decoded[0].re - 28.0).abs() < 1e-4);
/// assert!((decoded[1].re - 1.0).abs() < 1e-4);
/// ```
pub struct Encryptor {
    context: Arc<CkksContext>,
    public_key: PublicKey,
    secret_key: Option<SecretKey>,
    rng_factory: BlakeRNGFactory,
}

impl Encryptor {

    /// Creates a new Encryptor drawing fresh randomness for every encryption.
    pub fn new(context: Arc<CkksContext>, public_key: PublicKey, secret_key: Option<SecretKey>) -> Self {
        Self {
            context,
            public_key,
            secret_key,
            rng_factory: BlakeRNGFactory::new(),
        }
    }

    /// Derive all encryption randomness from `seed`, making ciphertexts reproducible.
    pub fn with_seed(mut self, seed: PRNGSeed) -> Self {
        self.rng_factory = BlakeRNGFactory::from_seed(seed);
        self
    }

    /// Get the public key used by the encryptor.
    pub fn public_key(&self) -> &PublicKey {&self.public_key}

    /// Get the secret key used by the encryptor, if any.
    pub fn secret_key(&self) -> Option<&SecretKey> {self.secret_key.as_ref()}

    /// Public-key encryption: `(c0, c1) = (p0*u + e0 + m, p1*u + e1)` modulo q0 with a
    /// fresh ternary `u` and Gaussian `e0`, `e1`.
    #[instrument(skip_all)]
    pub fn encrypt(&self, plain: &Plaintext) -> Result<Ciphertext> {
        self.context.check_ring_degree(plain.poly())?;
        let degree = self.context.poly_degree();
        let modulus = self.context.ciph_modulus();
        let mut rng = self.rng_factory.get_rng();

        let u = Polynomial::new(degree, rlwe::sample::ternary(&mut rng, degree))?;
        let e0 = Polynomial::new(degree, rlwe::sample::noise(&mut rng, degree))?;
        let e1 = Polynomial::new(degree, rlwe::sample::noise(&mut rng, degree))?;

        let c0 = self.context.multiply(self.public_key.p0(), &u, modulus)?
            .add(&e0, None)?
            .add(plain.poly(), Some(modulus))?;
        let c1 = self.context.multiply(self.public_key.p1(), &u, modulus)?
            .add(&e1, Some(modulus))?;
        Ciphertext::new(vec![c0, c1], plain.scale(), 0, modulus.clone())
    }

    /// Secret-key encryption: `(c0, c1) = (-a*s + e + m, a)` modulo q0 with uniform `a`.
    #[instrument(skip_all)]
    pub fn encrypt_symmetric(&self, plain: &Plaintext) -> Result<Ciphertext> {
        let secret_key = self.secret_key.as_ref().ok_or(CkksError::MissingSecretKey)?;
        self.context.check_ring_degree(plain.poly())?;
        let modulus = self.context.ciph_modulus();
        let mut rng = self.rng_factory.get_rng();
        let (b, a) = rlwe::encrypt_zero::symmetric(&self.context, secret_key.poly(), modulus, &mut rng)?;
        let c0 = b.add(plain.poly(), Some(modulus))?;
        Ciphertext::new(vec![c0, a], plain.scale(), 0, modulus.clone())
    }

}

/// Decrypts [Ciphertext] objects into [Plaintext] objects.
pub struct Decryptor {
    context: Arc<CkksContext>,
    secret_key: SecretKey,
}

impl Decryptor {

    /// Creates a Decryptor holding the secret key.
    pub fn new(context: Arc<CkksContext>, secret_key: SecretKey) -> Self {
        Self { context, secret_key }
    }

    /// Computes `c0 + c1*s (+ c2*s^2)` modulo the ciphertext's modulus.
    ///
    /// The resulting plaintext has centered coefficients and the ciphertext's scale.
    #[instrument(skip_all)]
    pub fn decrypt(&self, cipher: &Ciphertext) -> Result<Plaintext> {
        let modulus = self.context.modulus_at(cipher.level())?;
        if modulus != cipher.modulus() {
            return Err(CkksError::ModulusMismatch { level: cipher.level(), actual: cipher.modulus().clone() });
        }
        self.context.check_ring_degree(cipher.c0())?;

        let s = self.secret_key.poly();
        let mut result = cipher.c0().add(&self.context.multiply(cipher.c1(), s, modulus)?, Some(modulus))?;
        if let Some(c2) = cipher.polys().get(2) {
            let s_squared = self.context.multiply(s, s, modulus)?;
            let term = self.context.multiply(c2, &s_squared, modulus)?;
            result = result.add(&term, Some(modulus))?;
        }
        Ok(Plaintext::new(result.mod_small(modulus), cipher.scale()))
    }

}
