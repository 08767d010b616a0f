use std::sync::Arc;

use num_bigint::BigInt;
use num_complex::Complex64;
use num_traits::{FromPrimitive, Signed, ToPrimitive, Zero};

use crate::{CkksContext, CkksError, Plaintext, Polynomial, Result};

/// Encodes vectors of complex (or real) numbers into [Plaintext] polynomials and back.
///
/// A ring of degree N holds N/2 complex slots. Encoding applies the inverse canonical
/// embedding, scales by the requested factor and rounds; the real parts of the N/2
/// embedding coefficients go to the lower half of the polynomial and the imaginary
/// parts to the upper half. Decoding reverses this and is accurate up to rounding
/// error of order 1/scale.
/// ```rust
/// use ckks::*;
/// use ckks::util::bigint::pow2;
/// let params = CkksParameters::new(8, pow2(200), pow2(200), (1u64 << 30) as f64);
/// let context = CkksContext::new(params).unwrap();
/// let encoder = CkksEncoder::new(context.clone());
/// let plain = encoder.encode_f64(&[1.5, -2.0, 3.25], context.scaling_factor()).unwrap();
/// let decoded = encoder.decode(&plain).unwrap();
/// assert!((decoded[1].re + 2.0).abs() < 1e-6);
/// ```
pub struct CkksEncoder {
    context: Arc<CkksContext>,
}

impl CkksEncoder {

    /// Creates an encoder for the given context.
    pub fn new(context: Arc<CkksContext>) -> Self {
        Self { context }
    }

    /// Number of complex values a plaintext can hold.
    pub fn slot_count(&self) -> usize {
        self.context.slot_count()
    }

    /// Encodes up to N/2 complex values, scaled by `scale`.
    pub fn encode(&self, values: &[Complex64], scale: f64) -> Result<Plaintext> {
        let slots = self.slot_count();
        if values.len() > slots {
            return Err(CkksError::CapacityExceeded { len: values.len(), capacity: slots });
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(CkksError::ValueOutOfRange(format!("scale must be positive and finite, got {}", scale)));
        }
        if let Some(value) = values.iter().find(|v| !v.is_finite()) {
            return Err(CkksError::ValueOutOfRange(format!("cannot encode {}", value)));
        }

        let mut padded = values.to_vec();
        padded.resize(slots, Complex64::zero());
        let embedded = self.context.fft_context().emb_inv(&padded)?;

        let mut coeffs = vec![BigInt::zero(); self.context.poly_degree()];
        let (lower, upper) = coeffs.split_at_mut(slots);
        for ((re, im), value) in lower.iter_mut().zip(upper.iter_mut()).zip(&embedded) {
            *re = Self::scale_and_round(value.re, scale)?;
            *im = Self::scale_and_round(value.im, scale)?;
        }

        let bound: BigInt = self.context.ciph_modulus() >> 1;
        if coeffs.iter().any(|c| c.abs() >= bound) {
            return Err(CkksError::ValueOutOfRange(
                "encoded coefficients exceed the ciphertext modulus".into()
            ));
        }
        Ok(Plaintext::new(Polynomial::new(self.context.poly_degree(), coeffs)?, scale))
    }

    /// Encodes up to N/2 real values, scaled by `scale`.
    pub fn encode_f64(&self, values: &[f64], scale: f64) -> Result<Plaintext> {
        let values = values.iter().map(|x| Complex64::new(*x, 0.0)).collect::<Vec<_>>();
        self.encode(&values, scale)
    }

    /// Decodes a plaintext into its N/2 complex slots.
    pub fn decode(&self, plain: &Plaintext) -> Result<Vec<Complex64>> {
        self.context.check_ring_degree(plain.poly())?;
        let slots = self.slot_count();
        let scale = plain.scale();
        let coeffs = plain.poly().coeffs();
        let unscaled = (0..slots)
            .map(|i| -> Result<Complex64> {
                Ok(Complex64::new(
                    Self::unscale(&coeffs[i], scale)?,
                    Self::unscale(&coeffs[i + slots], scale)?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        self.context.fft_context().emb(&unscaled)
    }

    fn scale_and_round(value: f64, scale: f64) -> Result<BigInt> {
        BigInt::from_f64((value * scale).round())
            .ok_or_else(|| CkksError::ValueOutOfRange(format!("{} * {} is not representable", value, scale)))
    }

    fn unscale(coeff: &BigInt, scale: f64) -> Result<f64> {
        match coeff.to_f64() {
            Some(value) if value.is_finite() => Ok(value / scale),
            _ => Err(CkksError::ValueOutOfRange(format!("coefficient {} does not fit a float", coeff))),
        }
    }

}
