//! # Apply CLI (`apply`)
//!
//! Command-line interface for the application drafting pipeline.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `apply init` | Create the SQLite cache database and schema |
//! | `apply draft <resume> <job>` | Run the pipeline and draft an email |
//! | `apply cache info` | List cached documents |
//! | `apply cache clear` | Remove all cache entries |
//!
//! ## Examples
//!
//! ```bash
//! # Draft with the policy-selected style
//! apply draft resume.pdf job.txt
//!
//! # Force a style and skip the cache
//! apply draft resume.pdf job.txt --style startup_casual --no-cache
//! ```

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use apply_harness::cache::DocumentCache;
use apply_harness::config;
use apply_harness::db;
use apply_harness::export;
use apply_harness::models::EmailStyle;
use apply_harness::pipeline::{run_draft, DraftOptions, WorkflowResult};

/// Apply Harness CLI — drafts job application emails from a resume and a
/// job description.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file; a missing file falls back to built-in defaults.
#[derive(Parser)]
#[command(
    name = "apply",
    about = "Apply Harness — local-first job application email drafting",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./apply.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the cache database schema.
    ///
    /// Creates the SQLite file and the cache table. Idempotent.
    Init,

    /// Draft an application email from a resume and a job description.
    ///
    /// Both documents may be plain text or PDF. The run record and the
    /// drafted email are written under the configured output directory.
    Draft {
        /// Path to the resume (txt or pdf).
        resume: PathBuf,

        /// Path to the job description (txt or pdf).
        job: PathBuf,

        /// Email style: `auto` (policy-selected), `executive_formal`,
        /// `startup_casual`, `technical_detailed`, or `leadership_focused`.
        #[arg(long, default_value = "auto")]
        style: String,

        /// Bypass the document cache for this run.
        #[arg(long)]
        no_cache: bool,
    },

    /// Inspect or clear the document cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// List cached documents with fingerprints and sizes.
    Info,
    /// Delete all cache entries.
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let pool = db::connect(&cfg.cache.path).await?;
            db::ensure_schema(&pool).await?;
            pool.close().await;
            println!("Cache database initialized at {}", cfg.cache.path.display());
        }
        Commands::Draft {
            resume,
            job,
            style,
            no_cache,
        } => {
            let style_override = match style.as_str() {
                "auto" => None,
                other => match EmailStyle::parse(other) {
                    Some(s) => Some(s),
                    None => bail!(
                        "Unknown style '{}'. Must be auto, executive_formal, \
                         startup_casual, technical_detailed, or leadership_focused.",
                        other
                    ),
                },
            };

            let result = run_draft(
                &cfg,
                &resume,
                &job,
                DraftOptions {
                    style_override,
                    use_cache: !no_cache,
                },
            )
            .await;

            let written = export::export_result(&cfg.output.dir, &result)?;
            print_result(&result, &written);

            if !result.is_done() {
                std::process::exit(1);
            }
        }
        Commands::Cache { action } => {
            let cache = DocumentCache::open(&cfg.cache.path).await?;
            match action {
                CacheAction::Info => {
                    let entries = cache.info().await?;
                    if entries.is_empty() {
                        println!("Cache is empty.");
                    } else {
                        println!("{} cached document(s):", entries.len());
                        for entry in entries {
                            println!(
                                "  {}  {}  {} bytes  cached {}",
                                &entry.fingerprint[..12.min(entry.fingerprint.len())],
                                entry.source_path,
                                entry.file_size,
                                entry.created_at
                            );
                        }
                    }
                }
                CacheAction::Clear => {
                    cache.clear().await?;
                    println!("Cache cleared.");
                }
            }
            cache.close().await;
        }
    }

    Ok(())
}

fn print_result(result: &WorkflowResult, written: &[PathBuf]) {
    println!("Run {} finished: {:?}", result.run_id, result.state);

    if let Some(failure) = &result.failure {
        println!("Failed at stage '{}': {}", failure.stage, failure.error);
    }

    if let Some(email) = result.context.email() {
        println!();
        println!("Style:   {}", email.style_used);
        println!("Origin:  {:?}", email.origin);
        println!("Subject: {}", email.subject);
    }

    if let Some(summary) = &result.summary {
        println!();
        println!("Assessment: {}", summary.assessment);
        println!(
            "Skill match: {:.0}% ({})",
            summary.skill_match_ratio * 100.0,
            summary.matched_skills.join(", ")
        );
        println!("Next steps:");
        for step in &summary.next_steps {
            println!("  - {}", step);
        }
    }

    if !written.is_empty() {
        println!();
        for path in written {
            println!("Wrote {}", path.display());
        }
    }
}
