use ndarray::Array2;
use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

use crate::{MlErr, Result};

/// The strategy used to generate the initial values of a parameter tensor.
///
/// The fan in and fan out of the distributions that need them are taken from the shape of
/// the tensor being generated, `(fan_in, fan_out)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamGen {
    Const { value: f64 },
    Uniform { low: f64, high: f64 },
    Normal { mean: f64, std_dev: f64 },
    XavierUniform,
    LecunUniform,
    Kaiming,
    Xavier,
}

impl ParamGen {
    /// Generates a new tensor of shape `dim`.
    ///
    /// # Arguments
    /// * `dim` - The shape of the tensor, also used as `(fan_in, fan_out)`.
    /// * `rng` - A random number generator.
    ///
    /// # Returns
    /// An error if the distribution's parameters are invalid (e.g. `low >= high`).
    pub fn generate<R: Rng + ?Sized>(&self, dim: (usize, usize), rng: &mut R) -> Result<Array2<f64>> {
        let (fan_in, fan_out) = dim;

        match *self {
            ParamGen::Const { value } => Ok(Array2::from_elem(dim, value)),
            ParamGen::Uniform { low, high } => uniform(dim, low, high, rng),
            ParamGen::Normal { mean, std_dev } => normal(dim, mean, std_dev, rng),
            ParamGen::XavierUniform => {
                let range = (6. / (fan_in + fan_out).max(1) as f64).sqrt();
                uniform(dim, -range, range, rng)
            }
            ParamGen::LecunUniform => {
                let range = (3. / fan_in.max(1) as f64).sqrt();
                uniform(dim, -range, range, rng)
            }
            ParamGen::Kaiming => {
                let std_dev = (2. / fan_in.max(1) as f64).sqrt();
                normal(dim, 0., std_dev, rng)
            }
            ParamGen::Xavier => {
                let std_dev = (2. / (fan_in + fan_out).max(1) as f64).sqrt();
                normal(dim, 0., std_dev, rng)
            }
        }
    }
}

fn uniform<R: Rng + ?Sized>(
    dim: (usize, usize),
    low: f64,
    high: f64,
    rng: &mut R,
) -> Result<Array2<f64>> {
    let dist = Uniform::new(low, high).map_err(|e| MlErr::InvalidDistribution(e.to_string()))?;
    Ok(Array2::from_shape_simple_fn(dim, || dist.sample(rng)))
}

fn normal<R: Rng + ?Sized>(
    dim: (usize, usize),
    mean: f64,
    std_dev: f64,
    rng: &mut R,
) -> Result<Array2<f64>> {
    let dist = Normal::new(mean, std_dev).map_err(|e| MlErr::InvalidDistribution(e.to_string()))?;
    Ok(Array2::from_shape_simple_fn(dim, || dist.sample(rng)))
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn const_fills_the_shape() {
        let mut rng = StdRng::seed_from_u64(0);
        let w = ParamGen::Const { value: 0.5 }.generate((2, 3), &mut rng).unwrap();
        assert_eq!(w, Array2::from_elem((2, 3), 0.5));
    }

    #[test]
    fn xavier_uniform_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let w = ParamGen::XavierUniform.generate((4, 2), &mut rng).unwrap();
        let range = 1.0f64;
        assert_eq!(w.dim(), (4, 2));
        assert!(w.iter().all(|v| v.abs() <= range));
    }

    #[test]
    fn same_seed_same_values() {
        let a = ParamGen::Kaiming
            .generate((3, 3), &mut StdRng::seed_from_u64(42))
            .unwrap();
        let b = ParamGen::Kaiming
            .generate((3, 3), &mut StdRng::seed_from_u64(42))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_ranges_are_errors() {
        let mut rng = StdRng::seed_from_u64(0);
        let uniform = ParamGen::Uniform { low: 1., high: 0. }.generate((1, 1), &mut rng);
        let normal = ParamGen::Normal {
            mean: 0.,
            std_dev: f64::NAN,
        }
        .generate((1, 1), &mut rng);

        assert!(matches!(uniform, Err(MlErr::InvalidDistribution(_))));
        assert!(matches!(normal, Err(MlErr::InvalidDistribution(_))));
    }
}
