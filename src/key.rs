use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    util::{rlwe, BlakeRNGFactory, PRNGSeed},
    CkksContext, Polynomial, Result,
};

/// Struct to store a secret key.
///
/// The key is a ternary polynomial `s` with coefficients in {-1, 0, 1},
/// stored in centered form. Only the party that decrypts should hold it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKey {
    poly: Polynomial,
}

impl SecretKey {

    /// Wraps a secret polynomial.
    pub fn new(poly: Polynomial) -> Self {
        Self { poly }
    }

    /// The secret polynomial `s`.
    pub fn poly(&self) -> &Polynomial {&self.poly}

}

/// Struct to store a public key.
///
/// The pair `(p0, p1) = (-a*s + e, a)` modulo the top ciphertext modulus q0.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    p0: Polynomial,
    p1: Polynomial,
}

impl PublicKey {

    pub fn new(p0: Polynomial, p1: Polynomial) -> Self {
        Self { p0, p1 }
    }

    pub fn p0(&self) -> &Polynomial {&self.p0}
    pub fn p1(&self) -> &Polynomial {&self.p1}

}

/// Struct to store a key-switching key.
///
/// The pair `(p0, p1) = (-a*s + e + P*s', a)` modulo `P*q0`, which moves a ciphertext
/// component multiplied by `s'` onto the secret `s` of the generator that created it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchingKey {
    p0: Polynomial,
    p1: Polynomial,
}

impl SwitchingKey {

    pub fn new(p0: Polynomial, p1: Polynomial) -> Self {
        Self { p0, p1 }
    }

    pub fn p0(&self) -> &Polynomial {&self.p0}
    pub fn p1(&self) -> &Polynomial {&self.p1}

}

/// Relinearization key: a [SwitchingKey] for `s' = s^2`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelinKey {
    key: SwitchingKey,
}

impl RelinKey {

    pub fn new(key: SwitchingKey) -> Self {
        Self { key }
    }

    pub fn as_switching_key(&self) -> &SwitchingKey {&self.key}

}

/// Generates matching secret key, public key and relinearization key.
///
/// Every generator samples a fresh secret key. Randomness comes from the system
/// entropy unless the generator is created with [KeyGenerator::from_seed], in which
/// case all keys, including later switching keys, are reproducible.
pub struct KeyGenerator {
    context: Arc<CkksContext>,
    rng_factory: BlakeRNGFactory,
    secret_key: SecretKey,
    public_key: PublicKey,
    relin_key: RelinKey,
}

impl KeyGenerator {

    /// Create a new KeyGenerator with fresh randomness.
    pub fn new(context: Arc<CkksContext>) -> Result<Self> {
        Self::with_rng_factory(context, BlakeRNGFactory::new())
    }

    /// Create a KeyGenerator whose keys are derived deterministically from `seed`.
    pub fn from_seed(context: Arc<CkksContext>, seed: PRNGSeed) -> Result<Self> {
        Self::with_rng_factory(context, BlakeRNGFactory::from_seed(seed))
    }

    #[instrument(skip_all)]
    fn with_rng_factory(context: Arc<CkksContext>, rng_factory: BlakeRNGFactory) -> Result<Self> {
        let degree = context.poly_degree();
        let mut rng = rng_factory.get_rng();
        let secret_key = SecretKey::new(Polynomial::new(degree, rlwe::sample::ternary(&mut rng, degree))?);

        let (p0, p1) = rlwe::encrypt_zero::symmetric(
            &context, secret_key.poly(), context.ciph_modulus(), &mut rng
        )?;
        let public_key = PublicKey::new(p0, p1);

        let sk_squared = secret_key.poly().multiply_naive(secret_key.poly(), None)?;
        let relin_key = RelinKey::new(
            Self::generate_switching_key(&context, &secret_key, &sk_squared, &rng_factory)?
        );
        tracing::debug!(poly_degree = degree, seeded = rng_factory.is_seeded(), "generated keys");
        Ok(Self { context, rng_factory, secret_key, public_key, relin_key })
    }

    fn generate_switching_key(
        context: &CkksContext,
        secret_key: &SecretKey,
        new_key: &Polynomial,
        rng_factory: &BlakeRNGFactory,
    ) -> Result<SwitchingKey> {
        context.check_ring_degree(new_key)?;
        let key_modulus = context.key_modulus();
        let mut rng = rng_factory.get_rng();
        let (p0, p1) = rlwe::encrypt_zero::symmetric(context, secret_key.poly(), key_modulus, &mut rng)?;
        let shifted_key = new_key.scalar_multiply(context.big_modulus(), None);
        Ok(SwitchingKey::new(p0.add(&shifted_key, Some(key_modulus))?, p1))
    }

    /// The [CkksContext] used by the KeyGenerator.
    pub fn context(&self) -> &Arc<CkksContext> {&self.context}

    /// Obtain a reference to the secret key.
    pub fn secret_key(&self) -> &SecretKey {&self.secret_key}

    /// Obtain a reference to the public key.
    pub fn public_key(&self) -> &PublicKey {&self.public_key}

    /// Obtain a reference to the relinearization key.
    pub fn relin_key(&self) -> &RelinKey {&self.relin_key}

    /// Creates a key that switches ciphertext components multiplied by `new_key` to
    /// components multiplied by this generator's secret key.
    pub fn create_switching_key(&self, new_key: &Polynomial) -> Result<SwitchingKey> {
        Self::generate_switching_key(&self.context, &self.secret_key, new_key, &self.rng_factory)
    }

}
