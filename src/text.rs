use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::{util, CkksError, Polynomial, Result};

/// Struct to store a plaintext element.
///
/// The data for the plaintext is a single ring polynomial with integer
/// coefficients, holding encoded values multiplied by [Plaintext::scale].
/// Coefficients are kept in centered form, so small negative values stay small.
///
/// See [Ciphertext] for the struct that stores ciphertexts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plaintext {
    poly: Polynomial,
    scale: f64,
}

impl Plaintext {

    /// Wraps a polynomial together with the scale its values were multiplied by.
    pub fn new(poly: Polynomial, scale: f64) -> Self {
        Self { poly, scale }
    }

    /// The underlying polynomial.
    pub fn poly(&self) -> &Polynomial {&self.poly}

    /// The scale of the plaintext.
    pub fn scale(&self) -> f64 {self.scale}

    /// Number of coefficients of the plaintext polynomial.
    pub fn coeff_count(&self) -> usize {self.poly.ring_degree()}

}

/// Struct to store a ciphertext element.
///
/// A ciphertext is a list of polynomials modulo the modulus of its level
/// `(c0, c1, ...)` such that `c0 + c1*s + c2*s^2 + ...` decrypts to the plaintext.
/// A fresh ciphertext has two polynomials (degree class 1); a product that was not
/// relinearized has three (degree class 2). The ciphertext carries its scale and
/// its position in the modulus chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SerializedCiphertext")]
pub struct Ciphertext {
    polys: Vec<Polynomial>,
    scale: f64,
    level: usize,
    modulus: BigInt,
}

#[derive(Deserialize)]
struct SerializedCiphertext {
    polys: Vec<Polynomial>,
    scale: f64,
    level: usize,
    modulus: BigInt,
}

impl TryFrom<SerializedCiphertext> for Ciphertext {
    type Error = CkksError;

    fn try_from(value: SerializedCiphertext) -> Result<Self> {
        Self::new(value.polys, value.scale, value.level, value.modulus)
    }
}

impl Ciphertext {

    /// Assembles a ciphertext from its components.
    pub fn new(polys: Vec<Polynomial>, scale: f64, level: usize, modulus: BigInt) -> Result<Self> {
        if !(util::HE_CIPHERTEXT_SIZE_MIN..=util::HE_CIPHERTEXT_SIZE_MAX).contains(&polys.len()) {
            return Err(CkksError::SizeMismatch {
                expected: util::HE_CIPHERTEXT_SIZE_MIN,
                actual: polys.len(),
            });
        }
        let degree = polys[0].ring_degree();
        if let Some(poly) = polys.iter().find(|p| p.ring_degree() != degree) {
            return Err(CkksError::RingDegreeMismatch { expected: degree, actual: poly.ring_degree() });
        }
        Ok(Self { polys, scale, level, modulus })
    }

    /// All polynomials `c0, c1, ...`.
    pub fn polys(&self) -> &[Polynomial] {&self.polys}

    /// The constant component `c0`.
    pub fn c0(&self) -> &Polynomial {&self.polys[0]}

    /// The component multiplied by `s`.
    pub fn c1(&self) -> &Polynomial {&self.polys[1]}

    /// Number of polynomials, 2 or 3.
    pub fn size(&self) -> usize {self.polys.len()}

    /// Degree in the secret key: 1 for a relinearized ciphertext, 2 after a bare product.
    pub fn degree(&self) -> usize {self.polys.len() - 1}

    pub fn scale(&self) -> f64 {self.scale}

    /// Index into the modulus chain.
    pub fn level(&self) -> usize {self.level}

    /// The modulus `q_level` all components are reduced by.
    pub fn modulus(&self) -> &BigInt {&self.modulus}

    /// Ring degree N.
    pub fn poly_degree(&self) -> usize {self.polys[0].ring_degree()}

}
