//! Headless demo: run the default oscillator and compare the three methods

use oscsim::prelude::*;

fn main() {
    env_logger::init();

    let params = OscillatorParameters::default();
    println!("Damped driven oscillator");
    println!("========================");
    println!(
        "m = {}, k = {}, c = {}, x0 = {}, v0 = {}, dt = {}",
        params.mass, params.damping, params.stiffness, params.x0, params.v0, params.dt
    );
    println!("h(t) = {}, w(t) = {}", params.h_expr, params.w_expr);
    println!();

    let mut sim = match Simulation::new(params) {
        Ok(sim) => sim,
        Err(err) => {
            eprintln!("configuration error: {err}");
            std::process::exit(1);
        }
    };

    println!(
        "{:>8} {:>12} {:>12} {:>12}",
        "Time", "Exact", "Euler", "Leapfrog"
    );

    let ticks = 2000;
    for i in 1..=ticks {
        let tick = match sim.step() {
            Ok(tick) => tick,
            Err(err) => {
                eprintln!("tick failed: {err}");
                std::process::exit(1);
            }
        };

        if i % 200 == 0 {
            println!(
                "{:8.2} {:12.4} {:12.4} {:12.4}",
                tick.time, tick.analytic.position, tick.euler.position, tick.leapfrog.position
            );
        }
    }

    let exact = sim.state(Method::Analytic);
    let euler = sim.state(Method::Euler);
    let frog = sim.state(Method::Leapfrog);
    println!();
    println!("After {} ticks (t = {:.2}):", ticks, sim.time());
    println!(
        "  Euler error:    {:.6}",
        (euler.position - exact.position).abs()
    );
    println!(
        "  Leapfrog error: {:.6}",
        (frog.position - exact.position).abs()
    );

    if let Err(err) = sim.save_csv("positions.csv") {
        eprintln!("csv export failed: {err}");
    } else {
        println!("Recorded window written to positions.csv");
    }
}
