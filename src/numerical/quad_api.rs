/// user-facing api: assemble an integration task from plain values or from a
/// task document and run the Runge-driven solver. The core never depends on
/// this module; it is glue between the text surface and the numeric contract.
///
/// Task document format (see [`crate::Utils::task_parser`]):
/// ```text
/// // integrate sin over [0, pi] to 1e-6
/// integration
///  method: simpson
///  integrand: sin
///  lower_bound: 0.0
///  upper_bound: 3.141592653589793
///  epsilon: 1e-6
///  initial_n: 2
/// ```
/// `upper_bound: inf` selects the unbounded mode and requires
/// `initial_cutoff`. Optional keys: `epsilon` (default 1e-6), `initial_n`
/// (default 2), `loglevel` (default info), `save_history` (CSV file name).
use crate::Utils::logger::save_history_to_csv;
use crate::Utils::task_parser::{DocumentMap, SectionMap, Value, parse_document_as, parse_document_from_file};
use crate::numerical::integrands::TestIntegrand;
use crate::numerical::quadrature::QuadMethod;
use crate::numerical::runge::RungeIntegrator;
use log::{error, info};
use std::path::Path;

const TASK_SECTION: &str = "integration";

const DEFAULT_EPSILON: f64 = 1e-6;
const DEFAULT_INITIAL_N: usize = 2;

/// One integration request as the operator states it.
#[derive(Debug, Clone)]
pub struct QuadTask {
    pub integrand: TestIntegrand,
    pub method: QuadMethod,
    pub lower_bound: f64,
    /// None = integrate to +infinity via a doubling cutoff
    pub upper_bound: Option<f64>,
    pub epsilon: f64,
    pub initial_cutoff: Option<f64>,
    pub initial_n: usize,
    pub loglevel: Option<String>,
    /// CSV file to dump the refinement history into
    pub save_history: Option<String>,
}

impl QuadTask {
    pub fn from_document(doc: &str) -> Result<QuadTask, String> {
        let parsed = parse_document_as(doc, None)?;
        QuadTask::from_map(&parsed)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<QuadTask, String> {
        let parsed = parse_document_from_file(path, None)?;
        QuadTask::from_map(&parsed)
    }

    fn from_map(parsed: &DocumentMap) -> Result<QuadTask, String> {
        let section = parsed
            .get(TASK_SECTION)
            .ok_or_else(|| format!("Task document must contain an '{}' section", TASK_SECTION))?;

        fn scalar<'a>(
            section: &'a SectionMap,
            key: &str,
        ) -> Option<&'a Value> {
            section
                .get(key)
                .and_then(|v| v.as_ref())
                .and_then(|values| values.first())
        }
        fn number(
            section: &SectionMap,
            key: &str,
        ) -> Result<Option<f64>, String> {
            match scalar(section, key) {
                None => Ok(None),
                Some(value) => value
                    .to_f64()
                    .map(Some)
                    .ok_or_else(|| format!("Key '{}' should be a number, got '{}'", key, value)),
            }
        }

        let integrand = match scalar(section, "integrand") {
            Some(value) => TestIntegrand::from_name(&value.to_string_value())?,
            None => return Err("Task document must name an 'integrand'".to_string()),
        };
        let method = match scalar(section, "method") {
            Some(value) => QuadMethod::from_name(&value.to_string_value())?,
            None => return Err("Task document must name a 'method'".to_string()),
        };
        let lower_bound = number(section, "lower_bound")?
            .ok_or_else(|| "Task document must set 'lower_bound'".to_string())?;
        let upper_bound = match number(section, "upper_bound")? {
            Some(b) if b.is_infinite() => None,
            Some(b) => Some(b),
            None => return Err("Task document must set 'upper_bound' (a number or inf)".to_string()),
        };
        let initial_cutoff = number(section, "initial_cutoff")?;
        if upper_bound.is_none() && initial_cutoff.is_none() {
            return Err(
                "An 'initial_cutoff' is required when the upper bound is inf".to_string(),
            );
        }
        let epsilon = number(section, "epsilon")?.unwrap_or(DEFAULT_EPSILON);
        let initial_n = match number(section, "initial_n")? {
            Some(n) if n >= 1.0 && n.fract() == 0.0 => n as usize,
            Some(n) => return Err(format!("'initial_n' should be a positive integer, got {}", n)),
            None => DEFAULT_INITIAL_N,
        };
        let loglevel = scalar(section, "loglevel").map(|v| v.to_string_value());
        let save_history = scalar(section, "save_history").map(|v| v.to_string_value());

        Ok(QuadTask {
            integrand,
            method,
            lower_bound,
            upper_bound,
            epsilon,
            initial_cutoff,
            initial_n,
            loglevel,
            save_history,
        })
    }

    /// Run the task: build the solver, integrate, render the outcome and
    /// optionally dump the refinement history.
    pub fn run(&self) -> Option<f64> {
        let mut solver = RungeIntegrator::new();
        solver.set_task(
            self.integrand.function(),
            self.lower_bound,
            self.upper_bound,
            self.method,
            self.epsilon,
            self.initial_cutoff,
            self.initial_n,
        );
        solver.set_solver_params(self.loglevel.clone(), None);
        let result = solver.solve();

        match result {
            Some(value) => {
                println!(
                    "Approximate value of the integral of {} : {}",
                    self.integrand, value
                );
                info!("integral of {} = {}", self.integrand, value);
            }
            None => {
                println!("The integral did not converge");
            }
        }

        if let Some(filename) = &self.save_history {
            if let Err(e) = save_history_to_csv(solver.get_history(), filename) {
                error!("Failed to save refinement history to '{}': {}", filename, e);
            }
        }

        result
    }
}
