//! Leveled CKKS homomorphic encryption over `Z[X]/(X^N + 1)`.
//!
//! The crate provides the two ring transforms the scheme is built on, an exact
//! negacyclic NTT ([NttContext]) and the complex canonical embedding ([FftContext]),
//! together with the CKKS pipeline: parameters and context, key generation, encoding,
//! encryption, decryption and the homomorphic [Evaluator].
//!
//! ```rust
//! use ckks::*;
//! use ckks::util::bigint::pow2;
//! let params = CkksParameters::new(8, pow2(600), pow2(1200), (1u64 << 30) as f64);
//! let context = CkksContext::new(params).unwrap();
//! let keygen = KeyGenerator::new(context.clone()).unwrap();
//! let encoder = CkksEncoder::new(context.clone());
//! let encryptor = Encryptor::new(context.clone(), keygen.public_key().clone(), None);
//! let decryptor = Decryptor::new(context.clone(), keygen.secret_key().clone());
//! let evaluator = Evaluator::new(context.clone());
//!
//! let x = encryptor.encrypt(&encoder.encode_f64(&[1.5, 2.0], context.scaling_factor()).unwrap()).unwrap();
//! let y = encryptor.encrypt(&encoder.encode_f64(&[4.0, -1.0], context.scaling_factor()).unwrap()).unwrap();
//! let product = evaluator.multiply(&x, &y, keygen.relin_key()).unwrap();
//! let product = evaluator.rescale(&product).unwrap();
//! let result = encoder.decode(&decryptor.decrypt(&product).unwrap()).unwrap();
//! assert!((result[0].re - 6.0).abs() < 1e-3);
//! assert!((result[1].re + 2.0).abs() < 1e-3);
//! ```

mod context;
mod crt;
mod encoder;
mod encryptor;
mod error;
mod evaluator;
mod fft;
mod key;
mod modulus;
mod ntt;
mod params;
mod polynomial;
mod text;
mod transform;
pub mod util;

pub use context::CkksContext;
pub use crt::CrtContext;
pub use encoder::CkksEncoder;
pub use encryptor::{Decryptor, Encryptor};
pub use error::{CkksError, Result};
pub use evaluator::Evaluator;
pub use fft::FftContext;
pub use key::{KeyGenerator, PublicKey, RelinKey, SecretKey, SwitchingKey};
pub use modulus::Modulus;
pub use ntt::NttContext;
pub use params::{CkksParameters, DEFAULT_PRIME_SIZE};
pub use polynomial::Polynomial;
pub use text::{Ciphertext, Plaintext};
pub use transform::RingTransform;
