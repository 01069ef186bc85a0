/// Runge-driven refinement of the composite quadrature kernels.
///
/// The loop doubles the subdivision count each pass (and doubles the finite
/// cutoff when the true upper bound is infinite), compares the two successive
/// estimates scaled by the Runge coefficient of the chosen rule and stops
/// when the estimate falls below tolerance. A fixed ceiling bounds the
/// worst-case work; exhausting it is an expected outcome, not a crash.
use crate::numerical::quadrature::{IntegrationError, QuadMethod, estimate};
use log::{error, info, warn};
use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode};
use std::collections::HashMap;
use std::time::Instant;
use tabled::{builder::Builder, settings::Style};

/// Default refinement ceiling: the loop gives up after this many completed
/// kernel-pair evaluations.
pub const MAX_REFINEMENTS: usize = 20;

/// One completed refinement pass, as reported to the progress observer.
#[derive(Debug, Clone, PartialEq)]
pub struct RefinementStep {
    pub iteration: usize,
    /// finite upper cutoff used for the refined estimate
    pub cutoff: f64,
    /// subdivision count used for the refined estimate
    pub subdivisions: usize,
    /// the refined estimate I2
    pub estimate: f64,
    /// Runge error estimate |I2 - I1| / (2^p - 1)
    pub error: f64,
}

/// Integrate f over [a, B] (or [a, +inf) approximated by a doubling cutoff)
/// to absolute tolerance epsilon using Runge's a-posteriori error rule.
///
/// Each pass computes I1 at the current resolution, doubles n (and the
/// cutoff when `unbounded_upper`), computes I2 and the error estimate
/// |I2 - I1| / divisor. On success the refined estimate I2 is returned;
/// after `max_refinements` completed passes the loop returns
/// [`IntegrationError::NotConverged`] and never a stale value.
///
/// The observer is called once per completed pass. It is advisory only and
/// must not be relied upon for control flow.
///
/// Caveat for unbounded intervals: doubling the cutoff together with n keeps
/// the step width constant and assumes the tail decays fast enough to be
/// covered by the Runge estimate. A slowly decaying tail can produce a false
/// convergence signal; choose the initial subdivision count fine enough for
/// the initial cutoff.
pub fn integrate_with_runge<F>(
    f: &F,
    a: f64,
    method: QuadMethod,
    epsilon: f64,
    initial_cutoff: f64,
    initial_n: usize,
    unbounded_upper: bool,
    max_refinements: usize,
    observer: &mut dyn FnMut(&RefinementStep),
) -> Result<f64, IntegrationError>
where
    F: Fn(f64) -> f64 + ?Sized,
{
    let mut cutoff = initial_cutoff;
    let mut n = initial_n;
    let mut iteration: usize = 0;
    let mut last_error = f64::INFINITY;

    loop {
        if iteration >= max_refinements {
            return Err(IntegrationError::NotConverged {
                iterations: iteration,
                last_error,
            });
        }

        let i1 = estimate(method, f, a, cutoff, n)?;

        n *= 2;
        if unbounded_upper {
            cutoff *= 2.0;
        }

        let i2 = estimate(method, f, a, cutoff, n)?;

        let runge_error = (i2 - i1).abs() / method.runge_divisor();
        iteration += 1;
        last_error = runge_error;

        let step = RefinementStep {
            iteration,
            cutoff,
            subdivisions: n,
            estimate: i2,
            error: runge_error,
        };
        observer(&step);

        if runge_error <= epsilon {
            return Ok(i2);
        }
    }
}

/// Solver facade around [`integrate_with_runge`]: owns the task parameters,
/// records the refinement history, reports progress through the `log` facade
/// and prints a statistics table on completion.
pub struct RungeIntegrator {
    pub integrand: Box<dyn Fn(f64) -> f64>,
    pub lower_bound: f64,
    pub method: QuadMethod,
    pub epsilon: f64,
    pub initial_cutoff: f64,
    pub initial_n: usize,
    pub unbounded_upper: bool,
    pub max_refinements: usize,

    pub loglevel: Option<String>,
    history: Vec<RefinementStep>,
    result: Option<f64>,
    failure: Option<IntegrationError>,
    calc_statistics: HashMap<String, String>,
}

impl RungeIntegrator {
    pub fn new() -> RungeIntegrator {
        RungeIntegrator {
            integrand: Box::new(f64::sin),
            lower_bound: 0.0,
            method: QuadMethod::Trapezoidal,
            epsilon: 1e-6,
            initial_cutoff: 1.0,
            initial_n: 2,
            unbounded_upper: false,
            max_refinements: MAX_REFINEMENTS,
            loglevel: Some("info".to_string()),
            history: Vec::new(),
            result: None,
            failure: None,
            calc_statistics: HashMap::new(),
        }
    }
    ////////////////////////////SETTERS///////////////////////////////////////////////////////////////////
    /// Basic method to set the integration task. A finite upper bound is
    /// passed as `Some(b)`; `None` selects the unbounded mode, in which case
    /// `initial_cutoff` supplies the starting truncation point.
    pub fn set_task(
        &mut self,
        integrand: Box<dyn Fn(f64) -> f64>,
        lower_bound: f64,
        upper_bound: Option<f64>,
        method: QuadMethod,
        epsilon: f64,
        initial_cutoff: Option<f64>,
        initial_n: usize,
    ) {
        let (cutoff, unbounded_upper) = match upper_bound {
            Some(b) => {
                assert!(b.is_finite(), "Finite upper bound should be a finite number.");
                (b, false)
            }
            None => {
                let cutoff = initial_cutoff
                    .expect("An initial cutoff is required when the upper bound is infinite.");
                (cutoff, true)
            }
        };
        assert!(
            lower_bound.is_finite(),
            "Lower bound should be a finite number."
        );
        assert!(cutoff.is_finite(), "Initial cutoff should be a finite number.");
        assert!(
            lower_bound < cutoff,
            "Lower bound should be strictly below the upper bound/cutoff."
        );
        assert!(epsilon > 0.0, "Epsilon should be a positive number.");
        assert!(initial_n >= 1, "Initial subdivision count should be at least 1.");
        if method.requires_even_n() {
            assert!(
                initial_n % 2 == 0,
                "Simpson's rule requires an even initial subdivision count."
            );
        }

        self.integrand = integrand;
        self.lower_bound = lower_bound;
        self.method = method;
        self.epsilon = epsilon;
        self.initial_cutoff = cutoff;
        self.initial_n = initial_n;
        self.unbounded_upper = unbounded_upper;
    }

    pub fn set_solver_params(&mut self, loglevel: Option<String>, max_refinements: Option<usize>) {
        self.loglevel = if let Some(level) = loglevel {
            assert!(
                level == "debug"
                    || level == "info"
                    || level == "warn"
                    || level == "error"
                    || level == "off"
                    || level == "none",
                "loglevel must be debug/info, warn, error or off"
            );
            Some(level)
        } else {
            self.loglevel.clone()
        };
        self.max_refinements = if let Some(max_refinements) = max_refinements {
            assert!(
                max_refinements > 0,
                "Refinement ceiling should be a positive number."
            );
            max_refinements
        } else {
            self.max_refinements
        };
    }
    /////////////////////////////////////////////////////////////////////////////////////////////
    //                ITERATIONS
    /////////////////////////////////////////////////////////////////////////////////////////////
    /// main function to run the refinement loop
    pub fn main_loop(&mut self) -> Result<f64, IntegrationError> {
        let f = self.integrand.as_ref();
        let mut history: Vec<RefinementStep> = Vec::new();
        let mut previous_error = f64::INFINITY;
        let mut observer = |step: &RefinementStep| {
            info!(
                "iteration = {}, n = {}, B = {}, error = {}",
                step.iteration, step.subdivisions, step.cutoff, step.error
            );
            if step.error > previous_error {
                warn!("Error is increasing");
            }
            previous_error = step.error;
            history.push(step.clone());
        };
        let res = integrate_with_runge(
            f,
            self.lower_bound,
            self.method,
            self.epsilon,
            self.initial_cutoff,
            self.initial_n,
            self.unbounded_upper,
            self.max_refinements,
            &mut observer,
        );
        self.history = history;
        res
    }
    ////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
    //                                       main functions to start the solver and caclulate statistics
    ////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

    pub fn solver(&mut self) -> Option<f64> {
        let begin = Instant::now();
        let res = self.main_loop();
        let elapsed = begin.elapsed();
        self.calc_statistics.insert(
            "time elapsed, ms".to_string(),
            format!("{}", elapsed.as_millis()),
        );
        match res {
            Ok(value) => {
                self.result = Some(value);
                self.failure = None;
            }
            Err(e) => {
                error!("{}", e);
                self.result = None;
                self.failure = Some(e);
            }
        }
        self.calc_statistics();
        self.result
    }

    // wrapper around solver function to implement logging
    pub fn solve(&mut self) -> Option<f64> {
        let is_logging_disabled = self
            .loglevel
            .as_ref()
            .map(|level| level == "off" || level == "none")
            .unwrap_or(false);

        if is_logging_disabled {
            self.solver()
        } else {
            let loglevel = self.loglevel.clone();
            let log_option = if let Some(level) = loglevel {
                match level.as_str() {
                    "debug" => LevelFilter::Info,
                    "info" => LevelFilter::Info,
                    "warn" => LevelFilter::Warn,
                    "error" => LevelFilter::Error,
                    _ => panic!("loglevel must be debug, info, warn or error"),
                }
            } else {
                LevelFilter::Info
            };
            let logger_instance = CombinedLogger::init(vec![TermLogger::new(
                log_option,
                Config::default(),
                TerminalMode::Mixed,
                ColorChoice::Auto,
            )]);

            match logger_instance {
                Ok(()) => {
                    let res = self.solver();
                    info!(" \n \n Program ended");
                    res
                }
                Err(_) => self.solver(),
            }
        }
    }

    pub fn get_result(&self) -> Option<f64> {
        self.result
    }

    pub fn get_failure(&self) -> Option<IntegrationError> {
        self.failure.clone()
    }

    pub fn get_history(&self) -> &[RefinementStep] {
        &self.history
    }

    fn calc_statistics(&self) {
        let mut stats = self.calc_statistics.clone();
        stats.insert("method".to_string(), self.method.to_string());
        stats.insert("number of iterations".to_string(), self.history.len().to_string());
        if let Some(last) = self.history.last() {
            stats.insert("final subdivisions".to_string(), last.subdivisions.to_string());
            stats.insert("final cutoff".to_string(), last.cutoff.to_string());
            stats.insert("last error estimate".to_string(), last.error.to_string());
        }
        let mut table = Builder::from(stats).build();
        table.with(Style::modern_rounded());
        info!("\n \n CALC STATISTICS \n \n {}", table.to_string());
    }
}

impl Default for RungeIntegrator {
    fn default() -> Self {
        RungeIntegrator::new()
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                     TESTS
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod runge_tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_sin_simpson_converges_to_two() {
        let result = integrate_with_runge(
            &|x: f64| x.sin(),
            0.0,
            QuadMethod::Simpsons,
            1e-6,
            PI,
            2,
            false,
            MAX_REFINEMENTS,
            &mut |_| {},
        )
        .unwrap();
        assert!((result - 2.0).abs() < 1e-6, "result = {}", result);
    }

    #[test]
    fn test_sin_trapezoid_converges_to_two() {
        let result = integrate_with_runge(
            &|x: f64| x.sin(),
            0.0,
            QuadMethod::Trapezoidal,
            1e-6,
            PI,
            2,
            false,
            MAX_REFINEMENTS,
            &mut |_| {},
        )
        .unwrap();
        assert!((result - 2.0).abs() < 1e-5, "result = {}", result);
    }

    #[test]
    fn test_divergent_integral_fails_after_ceiling() {
        // f = 1 over an unbounded interval diverges: the estimates keep
        // drifting apart and the ceiling check trips on the 21st pass
        let mut observed = 0usize;
        let mut observer = |_: &RefinementStep| {
            observed += 1;
        };
        let res = integrate_with_runge(
            &|_: f64| 1.0,
            0.0,
            QuadMethod::Trapezoidal,
            1e-6,
            1.0,
            2,
            true,
            MAX_REFINEMENTS,
            &mut observer,
        );
        assert_eq!(observed, 20);
        match res {
            Err(IntegrationError::NotConverged { iterations, last_error }) => {
                assert_eq!(iterations, 20);
                assert!(last_error > 1e-6);
            }
            other => panic!("expected NotConverged, got {:?}", other),
        }
    }

    #[test]
    fn test_exp_decay_over_unbounded_interval() {
        // int_0^inf exp(-x) = 1; the initial n must be fine enough for the
        // initial cutoff because the step width stays constant while the
        // cutoff doubles
        let result = integrate_with_runge(
            &|x: f64| (-x).exp(),
            0.0,
            QuadMethod::Simpsons,
            1e-6,
            10.0,
            128,
            true,
            MAX_REFINEMENTS,
            &mut |_| {},
        )
        .unwrap();
        assert!((result - 1.0).abs() < 1e-3, "result = {}", result);
    }

    #[test]
    fn test_integration_is_deterministic() {
        let run = || {
            integrate_with_runge(
                &|x: f64| 1.0 / (1.0 + x * x),
                0.0,
                QuadMethod::Trapezoidal,
                1e-8,
                1.0,
                2,
                false,
                MAX_REFINEMENTS,
                &mut |_| {},
            )
            .unwrap()
        };
        let first = run();
        let second = run();
        assert_eq!(first.to_bits(), second.to_bits());
        assert!((first - PI / 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_odd_initial_n_surfaces_kernel_error() {
        let res = integrate_with_runge(
            &|x: f64| x.sin(),
            0.0,
            QuadMethod::Simpsons,
            1e-6,
            PI,
            3,
            false,
            MAX_REFINEMENTS,
            &mut |_| {},
        );
        assert_eq!(res, Err(IntegrationError::OddSubdivisions { n: 3 }));
    }

    #[test]
    fn test_observer_sees_doubling_schedule() {
        let mut steps: Vec<RefinementStep> = Vec::new();
        let _ = integrate_with_runge(
            &|x: f64| x.sin(),
            0.0,
            QuadMethod::Trapezoidal,
            1e-10,
            PI,
            2,
            false,
            MAX_REFINEMENTS,
            &mut |step| steps.push(step.clone()),
        );
        assert!(steps.len() > 1);
        for (k, step) in steps.iter().enumerate() {
            assert_eq!(step.iteration, k + 1);
            // n starts at 2 and has been doubled once per pass
            assert_eq!(step.subdivisions, 2usize << (k + 1));
            // bounded task: the cutoff never moves
            assert_eq!(step.cutoff, PI);
        }
    }

    #[test]
    fn test_integrator_facade() {
        let mut solver = RungeIntegrator::new();
        solver.set_task(
            Box::new(f64::sin),
            0.0,
            Some(PI),
            QuadMethod::Simpsons,
            1e-6,
            None,
            2,
        );
        solver.set_solver_params(Some("off".to_string()), None);
        let result = solver.solve().unwrap();
        assert!((result - 2.0).abs() < 1e-6);
        assert_eq!(solver.get_result(), Some(result));
        assert!(solver.get_failure().is_none());
        assert!(!solver.get_history().is_empty());
    }

    #[test]
    fn test_integrator_facade_reports_failure() {
        let mut solver = RungeIntegrator::new();
        solver.set_task(
            Box::new(|_: f64| 1.0),
            0.0,
            None,
            QuadMethod::Trapezoidal,
            1e-6,
            Some(1.0),
            2,
        );
        solver.set_solver_params(Some("off".to_string()), Some(5));
        assert!(solver.solve().is_none());
        match solver.get_failure() {
            Some(IntegrationError::NotConverged { iterations, .. }) => {
                assert_eq!(iterations, 5)
            }
            other => panic!("expected NotConverged, got {:?}", other),
        }
        assert_eq!(solver.get_history().len(), 5);
    }

    #[test]
    #[should_panic(expected = "even initial subdivision count")]
    fn test_set_task_rejects_odd_n_for_simpson() {
        let mut solver = RungeIntegrator::new();
        solver.set_task(
            Box::new(f64::sin),
            0.0,
            Some(PI),
            QuadMethod::Simpsons,
            1e-6,
            None,
            3,
        );
    }
}
