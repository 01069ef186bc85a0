/// a collection of built-in integrands with known closed-form integrals,
/// for the task shell and for testing purposes
use std::f64::consts::PI;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// Named integrands the task shell can select. Each is a pure function of
/// one real variable; where a closed form of the integral is known it is
/// exposed through [`TestIntegrand::exact_integral`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum TestIntegrand {
    /// sin(x)
    Sin,
    /// cos(x)
    Cos,
    /// exp(-x)
    ExpNeg,
    /// exp(-x^2)
    Gaussian,
    /// 1/(1 + x^2)
    Lorentzian,
    /// constant 1 - diverges over an unbounded interval
    Unit,
}

impl TestIntegrand {
    pub fn from_name(name: &str) -> Result<TestIntegrand, String> {
        match name.trim().to_lowercase().as_str() {
            "sin" => Ok(TestIntegrand::Sin),
            "cos" => Ok(TestIntegrand::Cos),
            "exp_neg" | "exp-neg" | "expneg" => Ok(TestIntegrand::ExpNeg),
            "gaussian" | "gauss" => Ok(TestIntegrand::Gaussian),
            "lorentzian" | "lorentz" => Ok(TestIntegrand::Lorentzian),
            "unit" | "one" => Ok(TestIntegrand::Unit),
            other => Err(format!(
                "Unknown integrand '{}'. Valid integrands: {}",
                other,
                TestIntegrand::iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<String>>()
                    .join(", ")
            )),
        }
    }

    pub fn function(&self) -> Box<dyn Fn(f64) -> f64> {
        match self {
            TestIntegrand::Sin => Box::new(f64::sin),
            TestIntegrand::Cos => Box::new(f64::cos),
            TestIntegrand::ExpNeg => Box::new(|x: f64| (-x).exp()),
            TestIntegrand::Gaussian => Box::new(|x: f64| (-x * x).exp()),
            TestIntegrand::Lorentzian => Box::new(|x: f64| 1.0 / (1.0 + x * x)),
            TestIntegrand::Unit => Box::new(|_: f64| 1.0),
        }
    }

    /// Closed-form value of the integral from `a` to `upper`
    /// (`None` = +infinity), where one is known.
    pub fn exact_integral(&self, a: f64, upper: Option<f64>) -> Option<f64> {
        match (self, upper) {
            (TestIntegrand::Sin, Some(b)) => Some(a.cos() - b.cos()),
            (TestIntegrand::Cos, Some(b)) => Some(b.sin() - a.sin()),
            (TestIntegrand::ExpNeg, Some(b)) => Some((-a).exp() - (-b).exp()),
            (TestIntegrand::ExpNeg, None) => Some((-a).exp()),
            // no elementary antiderivative on a finite interval
            (TestIntegrand::Gaussian, Some(_)) => None,
            (TestIntegrand::Gaussian, None) => {
                if a == 0.0 {
                    Some(PI.sqrt() / 2.0)
                } else {
                    None
                }
            }
            (TestIntegrand::Lorentzian, Some(b)) => Some(b.atan() - a.atan()),
            (TestIntegrand::Lorentzian, None) => Some(PI / 2.0 - a.atan()),
            (TestIntegrand::Unit, Some(b)) => Some(b - a),
            // divergent
            (TestIntegrand::Sin, None) => None,
            (TestIntegrand::Cos, None) => None,
            (TestIntegrand::Unit, None) => None,
        }
    }
}
