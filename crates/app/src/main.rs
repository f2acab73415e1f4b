use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use services::copy_feedback::CopyFeedback;
use services::mention_index::{MentionIndex, MentionIndexOptions};
use services::settings_api::{InMemorySettingsBackend, SettingsController, StaticTaskSource};
use services::settings_flow::SettingsState;
use shared::mention::resolve_key_action;
use shared::platform::Platform;
use shared::provider_catalog;
use shared::settings::AppSettings;
use shared::task_types::{TaskRecord, TaskStatus};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod clipboard;
mod config;

use clipboard::SystemClipboard;
use config::{load_config_or_default, AppConfig};

#[derive(Parser)]
#[command(name = "little-helper")]
#[command(about = "Composer and settings tools for Little Helper", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a platform token (defaults to this machine)
    Platform {
        #[arg(long)]
        id: Option<String>,
    },
    /// List providers shown in the selector
    Providers,
    /// List `@` mention completions for a query
    Mention {
        query: String,
        /// Folder to search (repeatable, defaults to the configured roots)
        #[arg(long)]
        root: Vec<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show what each key would do in the mention dropdown
    Keys {
        /// Key names, e.g. ArrowDown Enter Escape
        #[arg(required = true)]
        keys: Vec<String>,
        #[arg(long)]
        active: bool,
        #[arg(long)]
        items: bool,
        #[arg(long)]
        shift: bool,
    },
    /// Copy a markdown file to the clipboard
    Copy { file: PathBuf },
    /// Run a settings change through the save flow
    Settings {
        #[arg(long)]
        set_max_results: Option<usize>,
        /// Pretend a background task is running
        #[arg(long, conflicts_with = "tasks_unavailable")]
        with_tasks: bool,
        /// Pretend the task list cannot be fetched
        #[arg(long)]
        tasks_unavailable: bool,
        /// Accept the confirmation prompt if one appears
        #[arg(long)]
        confirm: bool,
    },
}

fn init_tracing(config: &AppConfig, verbose: bool) {
    let default_filter = if verbose { "debug" } else { config.log_filter.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config_or_default();
    init_tracing(&config, cli.verbose);

    match cli.command {
        Command::Platform { id } => {
            let platform = match id.as_deref() {
                Some(token) => Platform::classify(Some(token)),
                None => Platform::current(),
            };
            println!("{}", platform);
        }
        Command::Providers => {
            for p in provider_catalog::selectable() {
                let key = if p.requires_api_key { "api key" } else { "no key" };
                println!("{:<10} {:<16} {}", p.id, p.display_name, key);
            }
        }
        Command::Mention { query, root, limit } => {
            let roots = if root.is_empty() {
                config.mention_root_paths()
            } else {
                root
            };
            let show_root = roots.len() > 1;
            let index = MentionIndex::new(MentionIndexOptions {
                roots,
                max_results: limit.unwrap_or(config.max_results),
            });
            for candidate in index.candidates(&query)? {
                let rest = &candidate.path[candidate.matched.len()..];
                if show_root {
                    println!("[{}]{}  ({})", candidate.matched, rest, candidate.root.display());
                } else {
                    println!("[{}]{}", candidate.matched, rest);
                }
            }
        }
        Command::Keys {
            keys,
            active,
            items,
            shift,
        } => {
            for key in keys {
                println!("{:<10} {:?}", key, resolve_key_action(active, items, &key, shift));
            }
        }
        Command::Copy { file } => {
            let markdown = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let mut sink = SystemClipboard::new()?;
            let mut feedback = CopyFeedback::default();
            let now = chrono::Utc::now();
            feedback.copy(&mut sink, &markdown, now);
            println!("{}", feedback.label(now));
        }
        Command::Settings {
            set_max_results,
            with_tasks,
            tasks_unavailable,
            confirm,
        } => {
            run_settings(set_max_results, with_tasks, tasks_unavailable, confirm).await?;
        }
    }
    Ok(())
}

async fn run_settings(
    max_results: Option<usize>,
    with_tasks: bool,
    tasks_unavailable: bool,
    confirm: bool,
) -> Result<()> {
    let tasks = if tasks_unavailable {
        StaticTaskSource::Unavailable("task service not reachable".into())
    } else if with_tasks {
        StaticTaskSource::Tasks(vec![TaskRecord {
            id: "demo".into(),
            title: "Indexing Documents".into(),
            status: TaskStatus::Running,
        }])
    } else {
        StaticTaskSource::Tasks(Vec::new())
    };
    let controller = SettingsController::new(InMemorySettingsBackend::new(AppSettings::default()), tasks);

    println!("load: {}", controller.load().await?);
    let mut edited = controller.current().unwrap_or_default();
    if let Some(n) = max_results {
        edited.max_results = n;
    }

    let state = controller.request_save(edited).await?;
    println!("save: {}", state);
    if let SettingsState::AwaitingConfirmation { .. } = state {
        let state = if confirm {
            controller.confirm().await?
        } else {
            controller.cancel()?
        };
        println!("{}: {}", if confirm { "confirm" } else { "cancel" }, state);
    }

    let stored = controller.backend().snapshot();
    info!(max_results = stored.max_results, "Stored settings");
    println!("max_results = {}", stored.max_results);
    Ok(())
}
