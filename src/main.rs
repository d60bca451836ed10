use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bcqm_soft_rudder::{fit_beta_from_csv, run_scan, write_scan_outputs, RunConfig};

#[derive(Debug, Parser)]
#[command(author, version, about = "BCQM IV_c soft-rudder single-thread W_coh scan")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a W_coh scan from a YAML config
    Run {
        /// Path to YAML config file
        config: PathBuf,

        /// Override simulation.seed
        #[arg(long)]
        seed: Option<u64>,

        /// Override simulation.n_ensembles
        #[arg(long)]
        n_ensembles: Option<usize>,

        /// Override output.base_dir
        #[arg(long)]
        output: Option<PathBuf>,

        /// Evaluate coherence values one at a time
        #[arg(long, default_value_t = false)]
        sequential: bool,
    },
    /// Fit beta in A ~ W^(-beta) from an amplitude_scaling CSV
    FitBeta {
        /// Path to amplitude_scaling_soft_rudder.csv
        csv: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Run {
            config,
            seed,
            n_ensembles,
            output,
            sequential,
        } => {
            let mut cfg = RunConfig::load(&config)
                .with_context(|| format!("failed to load config: {}", config.display()))?;
            if let Some(v) = seed {
                cfg.simulation.seed = v;
            }
            if let Some(v) = n_ensembles {
                cfg.simulation.n_ensembles = v;
            }
            if let Some(v) = output {
                cfg.output.base_dir = v;
            }
            if sequential {
                cfg.simulation.parallel = false;
            }

            let result = run_scan(&cfg).context("W_coh scan failed")?;
            let outputs = write_scan_outputs(&cfg, &result, &cfg.output.base_dir).with_context(
                || format!("failed to write outputs to {}", cfg.output.base_dir.display()),
            )?;

            println!("Output directory: {}", outputs.output_dir.display());
            println!("Amplitude table: {}", outputs.amplitude_csv.display());
            println!("Manifest: {}", outputs.manifest_path.display());
        }
        Command::FitBeta { csv } => {
            let fit = fit_beta_from_csv(&csv)
                .with_context(|| format!("failed to fit beta from {}", csv.display()))?;
            println!("Fitted beta (A ~ W^(-beta)): beta = {:.6}", fit.beta);
        }
    }

    Ok(())
}
