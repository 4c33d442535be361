use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{info, warn};

use tollgate_core::config::GuardConfig;
use tollgate_core::domain::ResourceRecord;
use tollgate_core::impls::InMemoryOwnerStore;
use tollgate_core::telemetry::{LogFormat, init_tracing};
use tollgate_core::{ReconcileAction, StateClassifier};

#[derive(Debug, Parser)]
#[command(name = "tollgate", about = "Reconciliation admission guard", version)]
struct Cli {
    /// Log format on stderr: text or json.
    #[arg(long, global = true, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Say whether one provisioning state blocks mutation.
    Classify {
        /// State as reported by the provider.
        #[arg(long)]
        state: String,

        /// Terminal states; defaults to succeeded, failed, canceled, ready.
        #[arg(long = "terminal", value_delimiter = ',')]
        terminal: Vec<String>,
    },

    /// Evaluate every dependent of a scenario against a config.
    Evaluate {
        #[arg(long, env = "TOLLGATE_CONFIG")]
        config: PathBuf,

        #[arg(long)]
        scenario: PathBuf,

        /// Consecutive blocked attempts, drives the requeue delay.
        #[arg(long, default_value_t = 1)]
        attempt: u32,
    },
}

/// Snapshot of a resource store: owners with their states and the
/// dependents to evaluate.
#[derive(Debug, Deserialize)]
struct Scenario {
    #[serde(default)]
    owners: Vec<ResourceRecord>,
    dependents: Vec<ResourceRecord>,
}

/// No `--terminal` flags: the database-server preset. Flags that leave no
/// non-blank state are rejected, as in the config file.
fn classifier_from_flags(terminal: &[String]) -> Result<StateClassifier> {
    if terminal.is_empty() {
        return Ok(StateClassifier::database_server());
    }
    let classifier = StateClassifier::new(terminal);
    if classifier.is_empty() {
        bail!("--terminal lists no non-blank state; every state would block");
    }
    Ok(classifier)
}

fn classify(state: &str, terminal: &[String]) -> Result<()> {
    let classifier = classifier_from_flags(terminal)?;
    let blocking = classifier.is_blocking(Some(state));
    println!(
        "{}",
        serde_json::json!({
            "state": state,
            "blocking": blocking,
            "terminal_states": classifier.terminal_states().collect::<Vec<_>>(),
        })
    );
    Ok(())
}

async fn evaluate(config: PathBuf, scenario: PathBuf, attempt: u32) -> Result<()> {
    let config = GuardConfig::from_path(&config)
        .with_context(|| format!("loading config {}", config.display()))?;
    let raw = std::fs::read_to_string(&scenario)
        .with_context(|| format!("reading scenario {}", scenario.display()))?;
    let scenario: Scenario = serde_json::from_str(&raw).context("parsing scenario")?;

    let store = Arc::new(InMemoryOwnerStore::new());
    for owner in &scenario.owners {
        store.insert_record(owner).await;
    }
    info!(owners = store.len().await, "loaded scenario");

    let controller = config
        .into_builder()?
        .with_owner_state_source(store)
        .build()?;

    let mut blocked = 0usize;
    for dependent in &scenario.dependents {
        match controller.admit(dependent, attempt).await {
            Ok(admission) => {
                if let ReconcileAction::Requeue { .. } = admission.action {
                    blocked += 1;
                }
                println!("{}", serde_json::to_string(&admission.record)?);
            }
            Err(err) if err.is_retryable() => {
                warn!(kind = %dependent.kind, name = %dependent.name, error = %err, "will retry");
                blocked += 1;
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("evaluating {}/{}", dependent.kind, dependent.name)
                });
            }
        }
    }

    info!(
        total = scenario.dependents.len(),
        blocked, "evaluation finished"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    match cli.command {
        Command::Classify { state, terminal } => classify(&state, &terminal),
        Command::Evaluate {
            config,
            scenario,
            attempt,
        } => evaluate(config, scenario, attempt).await,
    }
}
