//! T1/T2 sweep command implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use qqms_adapter_runtime::{DEFAULT_ENDPOINT, RuntimeService};
use qqms_adapter_sim::{NoisySimulatorFactory, ThermalNoiseProvider, generic_profile, load_profile};
use qqms_hal::{Credentials, DecayModel, DeviceProfile};
use qqms_sweep::{
    BackendResolver, CalibrationPipeline, CalibrationSummary, FailurePolicy, MeasurementOutcome,
    StoreSpec, SweepConfig, SweepObserver, open_store,
};

/// Seed of the generic reference device when none is given.
pub const REFERENCE_PROFILE_SEED: u64 = 42;

/// Arguments shared by `t1` and `t2`.
///
/// Flags override environment variables, which override the `--config`
/// file, which overrides built-in defaults.
#[derive(Args, Debug, Default)]
pub struct SweepArgs {
    /// Number of qubits to sweep
    #[arg(short = 'n', long)]
    pub qubits: Option<u32>,

    /// Run on a remote device instead of the local simulator
    #[arg(long)]
    pub live: bool,

    /// Remote backend id (required with --live)
    #[arg(short, long)]
    pub backend: Option<String>,

    /// API token for the execution service
    #[arg(long, env = "QQMS_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Service instance (hub/group/project)
    #[arg(long, env = "QQMS_INSTANCE")]
    pub instance: Option<String>,

    /// Execution service endpoint
    #[arg(long, env = "QQMS_RUNTIME_ENDPOINT")]
    pub endpoint: Option<String>,

    /// First delay, in delay units
    #[arg(long)]
    pub delay_start: Option<f64>,

    /// Last delay, in delay units
    #[arg(long)]
    pub delay_end: Option<f64>,

    /// Number of delay points per qubit
    #[arg(long)]
    pub delay_spread: Option<u32>,

    /// Seconds per delay unit
    #[arg(long)]
    pub delay_unit: Option<f64>,

    /// Shots per delay point
    #[arg(long)]
    pub shots: Option<u32>,

    /// History table (defaults to T1History / T2History)
    #[arg(short, long)]
    pub table: Option<String>,

    /// History store (memory, json[:dir], sqlite[:path], dynamodb:region)
    #[arg(long, env = "QQMS_STORE")]
    pub store: Option<StoreSpec>,

    /// YAML sweep configuration file
    #[arg(short, long, env = "QQMS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Simulator seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Reference device profile (JSON) for the local simulator
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Write the result series as JSON to this file
    #[arg(short, long)]
    pub export: Option<PathBuf>,

    /// Do not write history records
    #[arg(long)]
    pub no_persist: bool,

    /// Stop at the first qubit that fails to execute
    #[arg(long)]
    pub fail_fast: bool,
}

/// Build the effective configuration for `model` from a file and flags.
pub fn resolve_config(model: DecayModel, args: &SweepArgs) -> Result<SweepConfig> {
    let mut config = match &args.config {
        Some(path) => SweepConfig::load(path)?,
        None => SweepConfig {
            store: StoreSpec::Sqlite(None),
            ..Default::default()
        },
    };

    config.model = model;
    if let Some(n) = args.qubits {
        config.num_qubits = n;
    }
    if args.live {
        config.live_backend = true;
    }
    if let Some(backend) = &args.backend {
        config.backend_id = Some(backend.clone());
    }
    if let Some(instance) = &args.instance {
        config.instance = Some(instance.clone());
    }
    if let Some(v) = args.delay_start {
        config.delay_start = v;
    }
    if let Some(v) = args.delay_end {
        config.delay_end = v;
    }
    if let Some(v) = args.delay_spread {
        config.delay_spread = v;
    }
    if let Some(v) = args.delay_unit {
        config.delay_unit = v;
    }
    if let Some(v) = args.shots {
        config.shots = v;
    }
    if let Some(table) = &args.table {
        config.table_id = Some(table.clone());
    }
    if let Some(store) = &args.store {
        config.store = store.clone();
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.no_persist {
        config.persist = false;
    }
    if args.fail_fast {
        config.failure_policy = FailurePolicy::Abort;
    }

    config.validate()?;
    Ok(config)
}

fn reference_profile(config: &SweepConfig, path: Option<&Path>) -> Result<DeviceProfile> {
    match path {
        Some(path) => {
            let profile = load_profile(path)
                .with_context(|| format!("Failed to load profile: {}", path.display()))?;
            if profile.num_qubits() < config.num_qubits {
                tracing::warn!(
                    profile = %profile.name,
                    profile_qubits = profile.num_qubits(),
                    requested = config.num_qubits,
                    "profile covers fewer qubits than requested; extra qubits will have no fit"
                );
            }
            Ok(profile)
        }
        None => Ok(generic_profile(
            config.num_qubits,
            config.seed.unwrap_or(REFERENCE_PROFILE_SEED),
        )),
    }
}

fn credentials(config: &SweepConfig, token: Option<&str>) -> Result<Option<Credentials>> {
    if !config.live_backend {
        return Ok(None);
    }
    let credentials = match token {
        Some(token) => Credentials::new(token),
        None => Credentials::from_env()?,
    };
    Ok(Some(match &config.instance {
        Some(instance) => credentials.with_instance(instance.clone()),
        None => credentials,
    }))
}

/// Advances a progress bar as qubits complete.
struct ProgressObserver {
    bar: ProgressBar,
}

impl SweepObserver for ProgressObserver {
    fn on_qubit_start(&self, qubit: u32, total: u32) {
        self.bar.set_message(format!("qubit {qubit}/{}", total.saturating_sub(1)));
    }

    fn on_qubit_complete(&self, _qubit: u32, _outcome: &MeasurementOutcome) {
        self.bar.inc(1);
    }
}

/// Execute a sweep command.
pub async fn execute(model: DecayModel, args: SweepArgs) -> Result<()> {
    let config = resolve_config(model, &args)?;

    println!(
        "{} Measuring {} on {} qubits ({})",
        style("→").cyan().bold(),
        style(model).green(),
        config.num_qubits,
        if config.live_backend {
            style(config.backend_id.as_deref().unwrap_or_default().to_string()).yellow()
        } else {
            style("local simulator".to_string()).yellow()
        }
    );

    let profile = reference_profile(&config, args.profile.as_deref())?;
    let factory = match config.seed {
        Some(seed) => NoisySimulatorFactory::with_seed(seed),
        None => NoisySimulatorFactory::new(),
    };
    let service = RuntimeService::new(args.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT))
        .with_poll_interval(config.poll_interval());
    let resolver = BackendResolver::new(
        Arc::new(ThermalNoiseProvider::new()),
        Arc::new(factory),
        Arc::new(service),
    );

    let store = if config.persist {
        open_store(&config.store).await?
    } else {
        open_store(&StoreSpec::Memory).await?
    };

    let bar = ProgressBar::new(u64::from(config.num_qubits));
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    bar.enable_steady_tick(std::time::Duration::from_millis(100));

    let pipeline = CalibrationPipeline::new(resolver, profile, store)
        .with_credentials(credentials(&config, args.token.as_deref())?)
        .with_observer(Arc::new(ProgressObserver { bar: bar.clone() }));

    let summary = pipeline.run(&config).await;
    bar.finish_and_clear();
    let summary = summary?;

    print_summary(&config, &summary);

    if let Some(path) = &args.export {
        let json = serde_json::to_string_pretty(&summary.report.series)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write export: {}", path.display()))?;
        println!(
            "\n{} Series written to {}",
            style("✓").green().bold(),
            style(path.display()).cyan()
        );
    }

    Ok(())
}

/// Render an outcome in microseconds, or a dash when absent.
pub fn format_outcome(outcome: &MeasurementOutcome) -> String {
    match (outcome.value(), outcome.std_dev()) {
        (Some(v), Some(s)) => format!("{:>9.3} ± {:.3} µs", v * 1e6, s * 1e6),
        _ => format!("{:>9}", "—"),
    }
}

fn print_summary(config: &SweepConfig, summary: &CalibrationSummary) {
    let series = &summary.report.series;
    println!(
        "\n{} {} results ({} fitted, {} without fit):",
        style("✓").green().bold(),
        series.model(),
        series.len() - series.absent_count(),
        series.absent_count()
    );

    for (qubit, outcome) in series.iter() {
        let text = format_outcome(outcome);
        println!(
            "  q{:<4} {}",
            qubit,
            if outcome.is_absent() {
                style(text).dim()
            } else {
                style(text).cyan()
            }
        );
    }

    for failure in &summary.report.failures {
        println!(
            "  {} qubit {}: {}",
            style("✗").red(),
            failure.qubit,
            failure.message
        );
    }

    if config.persist {
        println!(
            "\n  Persisted {} record(s) to {} ({})",
            style(summary.persisted).yellow(),
            style(&summary.table_id).cyan(),
            config.store
        );
        for failure in &summary.persistence_errors {
            println!(
                "  {} qubit {} not persisted: {}",
                style("✗").red(),
                failure.qubit,
                failure.message
            );
        }
    }
}
