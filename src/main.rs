//! # recon CLI
//!
//! The `recon` binary creates calling-campaign jobs from a contact list and
//! reconciles the campaign's call log back onto that list.
//!
//! ## Usage
//!
//! ```bash
//! recon --config ./config/recon.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `recon job create <contacts>` | Build the outbound call list, rowmap, and manifest |
//! | `recon job list` | List stored jobs, newest first |
//! | `recon job show <id>` | Show one job's manifest |
//! | `recon job delete <id>` | Delete one job |
//! | `recon job clear --yes` | Delete every job |
//! | `recon analyze <id> <results>` | Classify, reconcile, and write the re-import report |
//! | `recon classify <results>` | Fill in outcomes only |
//! | `recon stats <results>` | Print call statistics |
//!
//! ## Examples
//!
//! ```bash
//! # New job from a contact export
//! recon job create ./contacts.csv --name "AIテレアポ用リスト" --robots 3
//!
//! # Reconcile the platform's result CSV back onto the job
//! recon analyze 20240601_1030_ABCDE ./results.csv --output ./report.csv
//!
//! # Machine-readable statistics
//! recon stats ./results.csv --json
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use call_reconcile::{analyze, config, create, jobs, logging, stats};

/// recon — reconcile outbound call-campaign results with their contact list.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. When the file does not exist, built-in defaults are used.
#[derive(Parser)]
#[command(
    name = "recon",
    about = "recon — reconcile outbound call-campaign results with their contact list",
    version,
    long_about = "recon builds outbound call lists from a contact export, keeps a fingerprint \
    rowmap per job, classifies the calling platform's result log into outcomes, and merges the \
    results back onto the original contacts for re-import."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/recon.toml")]
    config: PathBuf,

    /// Debug-level logging (overridden by `RUST_LOG`).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Create, inspect, and delete jobs.
    Job {
        #[command(subcommand)]
        action: JobAction,
    },

    /// Classify a call-result table and reconcile it against a job.
    ///
    /// Writes the re-import report (CSV, or JSON when the output path ends
    /// in `.json`) and prints statistics plus match counts.
    Analyze {
        /// Job id returned by `recon job create`.
        job_id: String,

        /// Call-result table exported from the calling platform.
        results: PathBuf,

        /// Report path. Defaults to `結果_<job_id>_<timestamp>.csv` in the job directory.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the summary as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Fill in outcomes for a call-result table without reconciling.
    ///
    /// Rows that already carry an outcome are left unchanged.
    Classify {
        /// Call-result table.
        results: PathBuf,

        /// Output path. Prints CSV to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Classify a call-result table and print its statistics.
    Stats {
        /// Call-result table.
        results: PathBuf,

        /// Print the statistics as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Job management subcommands.
#[derive(Subcommand)]
enum JobAction {
    /// Create a job from a contact table.
    ///
    /// Stores the contact table, the outbound call list, the fingerprint
    /// rowmap, and the manifest under `<store.root>/<job_id>/`.
    Create {
        /// Contact table (CSV or JSON).
        contacts: PathBuf,

        /// Base name of the outbound call-list file.
        #[arg(long)]
        name: Option<String>,

        /// Number of calling robots the list is dialed with (1-5).
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=5))]
        robots: u8,
    },

    /// List stored jobs, newest first.
    List,

    /// Show a job's manifest.
    Show {
        /// Job id.
        id: String,
    },

    /// Delete a job and every file stored with it.
    Delete {
        /// Job id.
        id: String,
    },

    /// Delete every job in the store.
    Clear {
        /// Confirm deletion.
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let cfg = config::load_config_or_default(&cli.config)?;

    match cli.command {
        Commands::Job { action } => match action {
            JobAction::Create {
                contacts,
                name,
                robots,
            } => {
                create::run_create(&cfg, &contacts, name.as_deref(), robots).await?;
            }
            JobAction::List => {
                jobs::run_list(&cfg).await?;
            }
            JobAction::Show { id } => {
                jobs::run_show(&cfg, &id).await?;
            }
            JobAction::Delete { id } => {
                jobs::run_delete(&cfg, &id).await?;
            }
            JobAction::Clear { yes } => {
                jobs::run_clear(&cfg, yes).await?;
            }
        },
        Commands::Analyze {
            job_id,
            results,
            output,
            json,
        } => {
            analyze::run_analyze(&cfg, &job_id, &results, output.as_deref(), json).await?;
        }
        Commands::Classify { results, output } => {
            analyze::run_classify(&cfg, &results, output.as_deref()).await?;
        }
        Commands::Stats { results, json } => {
            stats::run_stats(&cfg, &results, json).await?;
        }
    }

    Ok(())
}
