/// Example#1
/// ```
/// // the shortest way: one call to the pure refinement loop
/// use RungeQuad::numerical::quadrature::QuadMethod;
/// use RungeQuad::numerical::runge::{MAX_REFINEMENTS, integrate_with_runge};
/// let result = integrate_with_runge(
///     &|x: f64| x.sin(),
///     0.0,
///     QuadMethod::Simpsons,
///     1e-6,
///     std::f64::consts::PI,
///     2,
///     false,
///     MAX_REFINEMENTS,
///     &mut |_| {},
/// )
/// .unwrap();
/// assert!((result - 2.0).abs() < 1e-6);
/// ```
/// Example#2
/// ```
/// // or more verbose way... the solver facade with logging and statistics
/// use RungeQuad::numerical::quadrature::QuadMethod;
/// use RungeQuad::numerical::runge::RungeIntegrator;
/// let mut solver = RungeIntegrator::new();
/// solver.set_task(
///     Box::new(f64::sin),
///     0.0,
///     Some(std::f64::consts::PI),
///     QuadMethod::Simpsons,
///     1e-6,
///     None,
///     2,
/// );
/// solver.set_solver_params(Some("off".to_string()), None);
/// let result = solver.solve().unwrap();
/// assert!((result - 2.0).abs() < 1e-6);
/// println!("result = {:?} \n", solver.get_result().unwrap());
/// ```
pub mod runge;

/// composite trapezoidal and Simpson's kernels with the method enum and the
/// error taxonomy of the quadrature core
pub mod quadrature;

/// a collection of built-in integrands with known closed-form integrals
pub mod integrands;

/// general api to assemble and run an integration task from a task document
/// Example#1
/// ```
/// use RungeQuad::numerical::quad_api::QuadTask;
/// let doc = "integration
///  method: simpson
///  integrand: sin
///  lower_bound: 0.0
///  upper_bound: 3.141592653589793
///  epsilon: 1e-6
///  initial_n: 2
///  loglevel: off";
/// let task = QuadTask::from_document(doc).unwrap();
/// let result = task.run().unwrap();
/// assert!((result - 2.0).abs() < 1e-6);
/// ```
pub mod quad_api;
