//! Offline bundle export: `locale-hub-export <snapshot.json> <format> <out-dir>`.
//!
//! The snapshot is committed and published in a throwaway in-memory hub whose
//! work root is `<out-dir>`; the zip archive path is logged. Other settings
//! come from `.locale-hub.json` in the current directory when present.

use std::path::PathBuf;
use std::process::ExitCode;

use locale_hub_core::LocaleHub;
use locale_hub_core::commit::NewCommit;
use locale_hub_core::config::{
    HubSettings,
    discover_settings,
};
use locale_hub_core::manifest::Snapshot;
use tracing_subscriber::EnvFilter;

/// Project id of the throwaway hub.
const PROJECT_ID: &str = "local";

/// Positional command line arguments.
#[derive(Debug)]
struct Args {
    snapshot: PathBuf,
    format: String,
    out_dir: PathBuf,
}

impl Args {
    /// `None` unless exactly three arguments are given.
    fn parse() -> Option<Self> {
        let mut args = std::env::args_os().skip(1);
        let snapshot = args.next()?.into();
        let format = args.next()?.into_string().ok()?;
        let out_dir = args.next()?.into();
        if args.next().is_some() {
            return None;
        }
        Some(Self { snapshot, format, out_dir })
    }
}

/// Commit, publish and export the snapshot, returning the archive path.
async fn run(args: Args) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let raw = tokio::fs::read_to_string(&args.snapshot).await?;
    let snapshot: Snapshot = serde_json::from_str(&raw)?;

    let settings = discover_settings(&std::env::current_dir()?)?;
    let hub = LocaleHub::in_memory(HubSettings { work_root: args.out_dir, ..settings })?;
    let commit = hub
        .append_commit(NewCommit {
            project_id: PROJECT_ID.to_string(),
            author_id: "locale-hub-export".to_string(),
            title: format!("Export {}", args.snapshot.display()),
            description: None,
            snapshot,
        })
        .await?;
    hub.set_publish_state(PROJECT_ID, &commit.id, true).await?;

    Ok(hub.generate_bundle(PROJECT_ID, &args.format).await?)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let Some(args) = Args::parse() else {
        tracing::error!("Usage: locale-hub-export <snapshot.json> <android|ios> <out-dir>");
        return ExitCode::from(2);
    };

    match run(args).await {
        Ok(archive) => {
            tracing::info!(archive = %archive.display(), "Export finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Export failed: {e}");
            ExitCode::FAILURE
        }
    }
}
