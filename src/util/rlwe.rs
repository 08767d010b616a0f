pub mod sample {
    use num_bigint::{BigInt, RandBigInt};
    use num_traits::Zero;
    use rand::{Rng, distributions::Uniform, prelude::Distribution};

    pub const NOISE_STANDARD_DEVIATION: f64 = 3.2;
    pub const NOISE_DISTRIBUTION_WITH_MULTIPLIER: f64 = 6.0;
    pub const NOISE_MAX_DEVIATION: f64 = NOISE_STANDARD_DEVIATION * NOISE_DISTRIBUTION_WITH_MULTIPLIER;

    #[derive(Clone, Copy)]
    struct ClippedNormal {
        normal: rand_distr::Normal<f64>,
        max_deviation: f64,
    }

    impl Distribution<f64> for ClippedNormal {
        fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
            let mean = self.normal.mean();
            loop {
                let sample = self.normal.sample(rng);
                if (sample - mean).abs() <= self.max_deviation {
                    break sample;
                }
            }
        }
    }

    impl ClippedNormal {
        fn new(mean: f64, standard_deviation: f64, max_deviation: f64) -> Self {
            debug_assert!(max_deviation > 0.0 && standard_deviation > 0.0);
            Self {
                normal: rand_distr::Normal::new(mean, standard_deviation)
                    .expect("standard deviation is a positive constant"),
                max_deviation,
            }
        }
    }

    /// Coefficients drawn uniformly from {-1, 0, 1}.
    pub fn ternary<T: Rng + ?Sized>(rng: &mut T, coeff_count: usize) -> Vec<BigInt> {
        let distribution = Uniform::new_inclusive(-1i8, 1);
        (0..coeff_count).map(|_| BigInt::from(rng.sample(distribution))).collect()
    }

    /// Rounded Gaussian error, clipped at [NOISE_MAX_DEVIATION].
    pub fn noise<T: Rng + ?Sized>(rng: &mut T, coeff_count: usize) -> Vec<BigInt> {
        let distribution = ClippedNormal::new(
            0.0, NOISE_STANDARD_DEVIATION, NOISE_MAX_DEVIATION
        );
        (0..coeff_count)
            .map(|_| BigInt::from(distribution.sample(rng).round() as i64))
            .collect()
    }

    /// Coefficients drawn uniformly from `[0, modulus)`.
    pub fn uniform<T: Rng + ?Sized>(rng: &mut T, coeff_count: usize, modulus: &BigInt) -> Vec<BigInt> {
        (0..coeff_count)
            .map(|_| rng.gen_bigint_range(&BigInt::zero(), modulus))
            .collect()
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use rand::SeedableRng;

        #[test]
        fn test_ternary() {
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);
            let sampled = ternary(&mut rng, 1000);
            assert_eq!(sampled.len(), 1000);
            assert!(sampled.iter().all(|x| *x >= BigInt::from(-1) && *x <= BigInt::from(1)));
            for v in [-1, 0, 1] {
                assert!(sampled.iter().any(|x| *x == BigInt::from(v)));
            }
        }

        #[test]
        fn test_noise() {
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);
            let sampled = noise(&mut rng, 4096);
            let bound = BigInt::from(NOISE_MAX_DEVIATION.ceil() as i64);
            assert!(sampled.iter().all(|x| *x <= bound && *x >= -bound.clone()));
            assert!(sampled.iter().any(|x| !x.is_zero()));
        }

        #[test]
        fn test_uniform() {
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);
            let modulus = BigInt::from(1) << 600;
            let sampled = uniform(&mut rng, 64, &modulus);
            assert!(sampled.iter().all(|x| *x >= BigInt::zero() && *x < modulus));
            assert!(sampled.iter().any(|x| x.bits() > 590));
        }
    }
}

pub mod encrypt_zero {
    use num_bigint::BigInt;
    use rand::Rng;

    use super::sample;
    use crate::{CkksContext, Polynomial, Result};

    /// Symmetric encryption of zero under `secret` modulo `modulus`.
    ///
    /// Returns `(b, a)` with `a` uniform in `[0, modulus)` and `b = -a*s + e`, where `e`
    /// is fresh Gaussian noise. Both components are reduced into `[0, modulus)`.
    pub fn symmetric<R: Rng + ?Sized>(
        context: &CkksContext,
        secret: &Polynomial,
        modulus: &BigInt,
        rng: &mut R,
    ) -> Result<(Polynomial, Polynomial)> {
        let degree = context.poly_degree();
        let a = Polynomial::new(degree, sample::uniform(rng, degree, modulus))?;
        let e = Polynomial::new(degree, sample::noise(rng, degree))?;
        let b = context.multiply(&a, secret, modulus)?
            .negate(None)
            .add(&e, Some(modulus))?;
        Ok((b, a))
    }

}
