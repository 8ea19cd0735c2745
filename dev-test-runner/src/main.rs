//! Decode → encode → decode every sample in a case file and report what happened.
//!
//! Usage: `dev-test-runner [CASES]` (defaults to `dev-test-runner/samples.json`).
//! Logging follows `RUST_LOG`.
mod models;

use anyhow::{bail, Context, Result};
use jsonier::Marshal;
use serde::Deserialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use models::Order;

#[derive(Debug, Deserialize)]
struct CaseFile {
    cases: Vec<Case>,
}

#[derive(Debug, Deserialize)]
struct Case {
    name: String,
    /// `true` if decoding must fail.
    #[serde(default)]
    expect_error: bool,
    document: serde_json::Value,
}

/// Case-file errors name the JSON path of the offending entry.
fn load_cases(src: &str) -> Result<CaseFile> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize(de).map_err(|err| {
        let path = err.path().to_string();
        anyhow::anyhow!("at {path}: {}", err.into_inner())
    })
}

fn run_case(case: &Case) -> Result<()> {
    match (Order::from_json(&case.document), case.expect_error) {
        (Ok(order), false) => {
            let encoded = order.to_json()?;
            let again = Order::from_json(&encoded)?;
            if again != order {
                bail!("round trip changed the record: {order:?} → {again:?}");
            }
            info!(case = %case.name, json = %encoded, "ok");
            Ok(())
        }
        (Err(err), true) => {
            info!(case = %case.name, %err, "failed as expected");
            Ok(())
        }
        (Ok(order), true) => bail!("expected an error, decoded {order:?}"),
        (Err(err), false) => Err(err).context("decode failed"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "dev-test-runner/samples.json".to_string());
    let source = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let file = load_cases(&source).with_context(|| format!("parsing {path}"))?;

    let mut failures = 0usize;
    for case in &file.cases {
        if let Err(err) = run_case(case) {
            failures += 1;
            error!(case = %case.name, "{err:#}");
        }
    }
    if failures > 0 {
        bail!("{failures} of {} cases failed", file.cases.len());
    }
    info!(cases = file.cases.len(), "all cases passed");
    Ok(())
}
