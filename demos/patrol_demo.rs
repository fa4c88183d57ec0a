// Demonstration: run the patrol environment with a routing controller and
// report evaluation metrics.
//
//   cargo run --example patrol_demo -- --mode planned --episodes 10 --seed 7

use std::env;

use lattice_patrol::env::{EnvConfig, EvaluationMetrics, LogRenderer, PatrolEnv, RenderMode};
use lattice_patrol::routing::{ControllerMode, NearestNeighborSolver, Policy, RoutingController};

fn main() {
    let args: Vec<String> = env::args().collect();
    let mode = match arg_value(&args, "--mode").unwrap_or("greedy") {
        "random" => ControllerMode::Random,
        "greedy" => ControllerMode::Greedy,
        "planned" => ControllerMode::Planned,
        other => {
            eprintln!(
                "Unknown --mode '{}'; expected 'random', 'greedy' or 'planned'.",
                other
            );
            std::process::exit(2);
        }
    };
    let episodes: usize = arg_value(&args, "--episodes")
        .and_then(|s| s.parse().ok())
        .unwrap_or(10);
    let seed: u64 = arg_value(&args, "--seed")
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);

    let mut env = match PatrolEnv::new(EnvConfig::default(), seed) {
        Ok(env) => env
            .with_solver(NearestNeighborSolver)
            .with_renderer(LogRenderer),
        Err(e) => {
            eprintln!("Failed to build environment: {}", e);
            std::process::exit(1);
        }
    };
    println!(
        "{} robots, {} targets, {} edge slots",
        env.n_robots(),
        env.n_targets(),
        env.max_edges()
    );

    let mut policy = RoutingController::new(mode);
    match EvaluationMetrics::evaluate(&mut env, &mut policy, episodes) {
        Ok(metrics) => {
            println!("Policy: {}", policy.name());
            println!("{}", metrics);
        }
        Err(e) => {
            eprintln!("Evaluation failed: {}", e);
            std::process::exit(1);
        }
    }

    // final frame goes through `log`; silent unless a logger is installed
    if let Err(e) = env.render(RenderMode::Human) {
        eprintln!("Render failed: {}", e);
    }
    env.close();
}

fn arg_value<'a>(args: &'a [String], key: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}
