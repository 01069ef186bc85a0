#![allow(non_snake_case)]
use RungeQuad::numerical::quad_api::QuadTask;
use RungeQuad::numerical::quadrature::QuadMethod;
use RungeQuad::numerical::runge::RungeIntegrator;
use std::env;
use std::f64::consts::PI;

fn main() {
    // a task document path on the command line wins over the built-in demos
    let args: Vec<String> = env::args().collect();
    if args.len() > 1 {
        match QuadTask::from_file(&args[1]) {
            Ok(task) => {
                task.run();
            }
            Err(e) => eprintln!("{}", e),
        }
        return;
    }

    let example = 0;
    match example {
        0 => {
            // INTEGRAL OVER A FINITE INTERVAL
            // int_0^pi sin(x) dx = 2, Simpson's rule driven by Runge's estimate
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
            solver.set_solver_params(Some("info".to_string()), None);
            match solver.solve() {
                Some(result) => println!("Approximate value of the integral: {}", result),
                None => println!("The integral did not converge"),
            }
        }
        1 => {
            // SEMI-INFINITE INTERVAL
            // int_0^inf exp(-x) dx = 1; the cutoff starts at 10 and doubles
            // together with n, so the initial n must resolve the initial cutoff
            let mut solver = RungeIntegrator::new();
            solver.set_task(
                Box::new(|x: f64| (-x).exp()),
                0.0,
                None,
                QuadMethod::Simpsons,
                1e-6,
                Some(10.0),
                128,
            );
            solver.set_solver_params(Some("info".to_string()), None);
            match solver.solve() {
                Some(result) => println!("Approximate value of the integral: {}", result),
                None => println!("The integral did not converge"),
            }
        }
        2 => {
            // TASK DOCUMENT
            let doc = "// trapezoid demo
            integration
             method: trapezoid
             integrand: lorentzian
             lower_bound: 0.0
             upper_bound: 1.0
             epsilon: 1e-8
             save_history: history.csv";
            match QuadTask::from_document(doc) {
                Ok(task) => {
                    task.run();
                }
                Err(e) => eprintln!("{}", e),
            }
        }
        _ => panic!("no such example"),
    }
}
