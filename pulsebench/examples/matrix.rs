//! Demo: measure a naive matrix multiply with the throughput strategy and
//! dump the run report as JSON.
//!
//! ```sh
//! cargo run --release --example matrix
//! ```

use anyhow::Result;
use pulsebench::{Engine, EngineTuning, TaskConfiguration};

const N: usize = 64;

fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; N * N];
    for i in 0..N {
        for k in 0..N {
            let aik = a[i * N + k];
            for j in 0..N {
                out[i * N + j] += aik * b[k * N + j];
            }
        }
    }
    out
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let a: Vec<f64> = (0..N * N).map(|i| (i % 7) as f64).collect();
    let b: Vec<f64> = (0..N * N).map(|i| (i % 11) as f64).collect();

    let tuning = EngineTuning {
        pin_cpu: Some(0),
        ..EngineTuning::default()
    };
    let mut engine = Engine::new(TaskConfiguration::default()).with_tuning(tuning);

    let outcome = engine.throughput(1, || {}, |_state| multiply(&a, &b), |_state| {})?;

    match outcome.report() {
        Some(report) => println!("{}", serde_json::to_string_pretty(report)?),
        None => println!("matrix multiply was reported unmeasurable"),
    }
    Ok(())
}
