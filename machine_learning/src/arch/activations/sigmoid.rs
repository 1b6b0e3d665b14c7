/// The logistic function scaled by an amplitude: `amp / (1 + e^-z)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sigmoid {
    amp: f64,
}

impl Default for Sigmoid {
    fn default() -> Self {
        Self { amp: 1. }
    }
}

impl Sigmoid {
    pub fn new(amp: f64) -> Self {
        Self { amp }
    }

    pub fn f(&self, z: f64) -> f64 {
        self.amp / (1. + (-z).exp())
    }

    pub fn df(&self, z: f64) -> f64 {
        let s = 1. / (1. + (-z).exp());
        self.amp * s * (1. - s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_at_zero() {
        let sigmoid = Sigmoid::new(2.);
        assert_eq!(sigmoid.f(0.), 1.);
        assert_eq!(sigmoid.df(0.), 0.5);
    }

    #[test]
    fn sigmoid_is_stable_for_large_inputs() {
        let sigmoid = Sigmoid::default();
        assert_eq!(sigmoid.f(-200.), 0.);
        assert_eq!(sigmoid.df(-200.), 0.);
        assert_eq!(sigmoid.df(200.), 0.);
    }
}
