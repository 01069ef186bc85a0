/// Composite quadrature kernels on a finite interval.
///
/// Both kernels sample the integrand on the uniform mesh x_i = a + i*h,
/// h = (b - a)/n. The trapezoidal rule is O(h^2), Simpson's rule is O(h^4);
/// the Runge refinement loop in [`crate::numerical::runge`] relies on these
/// orders through [`QuadMethod::runge_divisor`].
use std::error::Error;
use std::fmt;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// Quadrature rule selector. A closed set: each variant maps to one kernel
/// formula and one Runge error-scaling constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum QuadMethod {
    Trapezoidal,
    Simpsons,
}

impl QuadMethod {
    /// Parse a method name as it appears in a task document. Accepts the
    /// numeric codes of the original interactive prompt as well.
    pub fn from_name(name: &str) -> Result<QuadMethod, String> {
        match name.trim().to_lowercase().as_str() {
            "trapezoidal" | "trapezoid" | "1" => Ok(QuadMethod::Trapezoidal),
            "simpsons" | "simpson" | "2" => Ok(QuadMethod::Simpsons),
            other => Err(format!(
                "Unknown quadrature method '{}'. Valid methods: {}",
                other,
                QuadMethod::iter()
                    .map(|m| m.to_string())
                    .collect::<Vec<String>>()
                    .join(", ")
            )),
        }
    }

    /// Runge coefficient: 2^p - 1 where p is the order of the rule.
    pub fn runge_divisor(&self) -> f64 {
        match self {
            QuadMethod::Trapezoidal => 3.0,
            QuadMethod::Simpsons => 15.0,
        }
    }

    /// Simpson's kernel rejects odd subdivision counts.
    pub fn requires_even_n(&self) -> bool {
        matches!(self, QuadMethod::Simpsons)
    }

    /// Get a description of the quadrature method
    pub fn description(&self) -> &'static str {
        match self {
            QuadMethod::Trapezoidal => "composite trapezoidal rule, error O(h^2)",
            QuadMethod::Simpsons => "composite Simpson's rule, error O(h^4)",
        }
    }
}

/// Errors of the quadrature core. `NotConverged` is an expected outcome of
/// the refinement loop, not a crash; the shell decides how to present it.
#[derive(Debug, Clone, PartialEq)]
pub enum IntegrationError {
    /// Simpson's rule invoked with an odd subdivision count.
    OddSubdivisions { n: usize },
    /// Subdivision count of zero at the dispatch boundary.
    ZeroSubdivisions,
    /// Degenerate, inverted or non-finite interval.
    BadInterval { a: f64, b: f64 },
    /// The Runge error estimate never fell below tolerance within the
    /// iteration ceiling.
    NotConverged { iterations: usize, last_error: f64 },
}

impl fmt::Display for IntegrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrationError::OddSubdivisions { n } => {
                write!(f, "Simpson's rule requires an even subdivision count, got n = {}", n)
            }
            IntegrationError::ZeroSubdivisions => {
                write!(f, "Subdivision count must be at least 1")
            }
            IntegrationError::BadInterval { a, b } => {
                write!(f, "Invalid integration interval [{}, {}]: bounds must be finite with a < b", a, b)
            }
            IntegrationError::NotConverged { iterations, last_error } => {
                write!(
                    f,
                    "No convergence after {} refinements, last error estimate = {}",
                    iterations, last_error
                )
            }
        }
    }
}

impl Error for IntegrationError {}

/// Composite trapezoidal rule on [a, b] with n subdivisions.
///
/// Preconditions (enforced by [`estimate`]): n >= 1, a < b, both finite.
pub fn trapezoidal_rule<F>(f: &F, a: f64, b: f64, n: usize) -> f64
where
    F: Fn(f64) -> f64 + ?Sized,
{
    let h = (b - a) / (n as f64);
    let mut sum = 0.5 * (f(a) + f(b));
    for i in 1..n {
        let x = a + (i as f64) * h;
        sum += f(x);
    }
    sum * h
}

/// Composite Simpson's rule on [a, b] with n subdivisions.
///
/// An odd n is rejected, never silently coerced: the 4/2 weight pattern is
/// only valid on an even number of panels.
pub fn simpsons_rule<F>(f: &F, a: f64, b: f64, n: usize) -> Result<f64, IntegrationError>
where
    F: Fn(f64) -> f64 + ?Sized,
{
    if n % 2 != 0 {
        return Err(IntegrationError::OddSubdivisions { n });
    }
    let h = (b - a) / (n as f64);
    let mut sum = f(a) + f(b);
    for i in 1..n {
        let x = a + (i as f64) * h;
        if i % 2 == 0 {
            sum += 2.0 * f(x);
        } else {
            sum += 4.0 * f(x);
        }
    }
    Ok(sum * h / 3.0)
}

/// Single kernel dispatch entry point: validates the interval and the
/// subdivision count, then evaluates the selected rule. Pure and
/// deterministic for a side-effect-free integrand.
pub fn estimate<F>(
    method: QuadMethod,
    f: &F,
    a: f64,
    b: f64,
    n: usize,
) -> Result<f64, IntegrationError>
where
    F: Fn(f64) -> f64 + ?Sized,
{
    if n == 0 {
        return Err(IntegrationError::ZeroSubdivisions);
    }
    if !a.is_finite() || !b.is_finite() || a >= b {
        return Err(IntegrationError::BadInterval { a, b });
    }
    match method {
        QuadMethod::Trapezoidal => Ok(trapezoidal_rule(f, a, b, n)),
        QuadMethod::Simpsons => simpsons_rule(f, a, b, n),
    }
}
