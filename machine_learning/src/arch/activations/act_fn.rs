use super::{Relu, Sigmoid, Tanh};

/// An element-wise activation function together with its derivative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActFn {
    Sigmoid(Sigmoid),
    Tanh(Tanh),
    Relu(Relu),
}

impl ActFn {
    pub fn sigmoid(amp: f64) -> Self {
        ActFn::Sigmoid(Sigmoid::new(amp))
    }

    pub fn tanh() -> Self {
        ActFn::Tanh(Tanh::new())
    }

    pub fn relu() -> Self {
        ActFn::Relu(Relu::new())
    }

    /// Returns a short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ActFn::Sigmoid(_) => "sigmoid",
            ActFn::Tanh(_) => "tanh",
            ActFn::Relu(_) => "relu",
        }
    }

    pub fn f(&self, x: f64) -> f64 {
        match self {
            ActFn::Sigmoid(a) => a.f(x),
            ActFn::Tanh(a) => a.f(x),
            ActFn::Relu(a) => a.f(x),
        }
    }

    pub fn df(&self, x: f64) -> f64 {
        match self {
            ActFn::Sigmoid(a) => a.df(x),
            ActFn::Tanh(a) => a.df(x),
            ActFn::Relu(a) => a.df(x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivatives_match_finite_differences() {
        let eps = 1e-3;
        for act_fn in [ActFn::sigmoid(1.5), ActFn::tanh(), ActFn::relu()] {
            for z in [-2.0f64, -0.3, 0.7, 1.9] {
                let numeric = (act_fn.f(z + eps) - act_fn.f(z - eps)) / (2. * eps);
                let analytic = act_fn.df(z);
                assert!(
                    (numeric - analytic).abs() < 1e-2,
                    "{}: df({z}) = {analytic}, numeric {numeric}",
                    act_fn.name()
                );
            }
        }
    }
}
