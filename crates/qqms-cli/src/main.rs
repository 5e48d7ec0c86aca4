//! QQMS Command-Line Interface
//!
//! Runs T1/T2 delay-sweep calibrations and inspects their history.
//!
//! ```text
//! qqms t1 --qubits 5                       local noisy simulator
//! qqms t2 --live --backend ibm_kyoto       remote device
//! qqms history --table T1History --qubit 0
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use qqms_hal::DecayModel;
use qqms_sweep::StoreSpec;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::sweep::SweepArgs;
use commands::{history, profile, sweep, version};

/// QQMS - qubit decoherence calibration and history tracking
#[derive(Parser)]
#[command(name = "qqms")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure T1 (energy relaxation) on every qubit
    T1(SweepArgs),

    /// Measure T2 (Hahn-echo dephasing) on every qubit
    T2(SweepArgs),

    /// Show recorded measurements
    History {
        /// Table to read (e.g. T1History)
        #[arg(short, long)]
        table: String,

        /// History store (memory, json[:dir], sqlite[:path], dynamodb:region)
        #[arg(long, env = "QQMS_STORE")]
        store: Option<StoreSpec>,

        /// Only this qubit
        #[arg(short, long)]
        qubit: Option<u32>,

        /// Only this model kind (t1, t2)
        #[arg(short, long)]
        model: Option<DecayModel>,

        /// Show at most this many of the most recent records
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Print a generic reference device profile as JSON
    Profile {
        /// Number of qubits
        #[arg(short = 'n', long, default_value = "5")]
        qubits: u32,

        /// Profile seed
        #[arg(short, long, default_value_t = sweep::REFERENCE_PROFILE_SEED)]
        seed: u64,
    },

    /// Show version information
    Version,
}

fn log_filter(verbose: u8) -> String {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("{level},reqwest=warn,hyper=warn,hyper_util=warn,aws_config=warn,aws_smithy_runtime=warn")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_filter(cli.verbose)))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::T1(args) => sweep::execute(DecayModel::Relaxation, args).await,

        Commands::T2(args) => sweep::execute(DecayModel::Dephasing, args).await,

        Commands::History {
            table,
            store,
            qubit,
            model,
            limit,
            format,
        } => history::execute(&table, store, qubit, model, limit, &format).await,

        Commands::Profile { qubits, seed } => profile::execute(qubits, seed),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_t1_defaults() {
        let cli = Cli::try_parse_from(["qqms", "t1"]).unwrap();
        match cli.command {
            Commands::T1(args) => {
                assert_eq!(args.qubits, None);
                assert!(!args.live);
                assert!(!args.no_persist);
            }
            _ => panic!("expected t1"),
        }
    }

    #[test]
    fn test_t2_sweep_flags() {
        let cli = Cli::try_parse_from([
            "qqms",
            "t2",
            "-n",
            "3",
            "--delay-start",
            "0",
            "--delay-end",
            "50",
            "--delay-spread",
            "10",
            "--store",
            "sqlite:/tmp/h.db",
            "--seed",
            "7",
            "--export",
            "t2.json",
            "--no-persist",
        ])
        .unwrap();
        match cli.command {
            Commands::T2(args) => {
                assert_eq!(args.qubits, Some(3));
                assert_eq!(args.delay_end, Some(50.0));
                assert_eq!(args.delay_spread, Some(10));
                assert_eq!(
                    args.store,
                    Some(StoreSpec::Sqlite(Some("/tmp/h.db".into())))
                );
                assert_eq!(args.seed, Some(7));
                assert!(args.no_persist);
            }
            _ => panic!("expected t2"),
        }
    }

    #[test]
    fn test_live_flags() {
        let cli = Cli::try_parse_from([
            "qqms", "t1", "--live", "--backend", "ibm_kyoto", "--token", "secret",
        ])
        .unwrap();
        match cli.command {
            Commands::T1(args) => {
                assert!(args.live);
                assert_eq!(args.backend.as_deref(), Some("ibm_kyoto"));
                assert_eq!(args.token.as_deref(), Some("secret"));
            }
            _ => panic!("expected t1"),
        }
    }

    #[test]
    fn test_backend_only_from_flag() {
        use clap::CommandFactory;

        let cmd = Cli::command();
        let t1 = cmd.find_subcommand("t1").unwrap();
        let backend = t1
            .get_arguments()
            .find(|a| a.get_id() == "backend")
            .unwrap();
        assert!(backend.get_env().is_none());

        let token = t1.get_arguments().find(|a| a.get_id() == "token").unwrap();
        assert!(token.get_env().is_some());
    }

    #[test]
    fn test_bad_store_rejected() {
        assert!(Cli::try_parse_from(["qqms", "t1", "--store", "redis"]).is_err());
    }

    #[test]
    fn test_history_args() {
        let cli = Cli::try_parse_from([
            "qqms", "history", "-t", "T2History", "-q", "4", "-m", "t2", "-f", "json",
        ])
        .unwrap();
        match cli.command {
            Commands::History {
                table,
                qubit,
                model,
                format,
                ..
            } => {
                assert_eq!(table, "T2History");
                assert_eq!(qubit, Some(4));
                assert_eq!(model, Some(DecayModel::Dephasing));
                assert_eq!(format, "json");
            }
            _ => panic!("expected history"),
        }
    }

    #[test]
    fn test_history_requires_table() {
        assert!(Cli::try_parse_from(["qqms", "history"]).is_err());
    }

    #[test]
    fn test_verbosity_and_filter() {
        let cli = Cli::try_parse_from(["qqms", "-vv", "version"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(log_filter(cli.verbose).starts_with("debug,"));
        assert!(log_filter(0).contains("reqwest=warn"));
    }

    #[test]
    fn test_unknown_command() {
        assert!(Cli::try_parse_from(["qqms", "t3"]).is_err());
        assert!(Cli::try_parse_from(["qqms"]).is_err());
    }
}
