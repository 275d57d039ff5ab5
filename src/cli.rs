//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::fallback_adapter::FallbackDataPort;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::batch::evaluate_with_port;
use crate::domain::checklist::{Checklist, ChecklistDefinition, ConditionItem};
use crate::domain::checklist_validation::validate_definition;
use crate::domain::config_validation::validate_config;
use crate::domain::error::ScreenerError;
use crate::domain::evaluation::{EvaluationResult, rank_by_score};
use crate::domain::field::{CATALOG_VERSION, catalog};
use crate::domain::universe::{DEFAULT_MAX_SYMBOLS, check_batch_size, parse_symbols};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::store_port::{DEFAULT_RESULT_LIMIT, StorePort};

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Parser, Debug)]
#[command(name = "screener", about = "Stock screening checklist evaluator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate a checklist against a batch of symbols
    Evaluate {
        #[arg(short, long)]
        config: PathBuf,
        /// Stored checklist id
        #[arg(long, conflicts_with = "definition", required_unless_present = "definition")]
        checklist: Option<i64>,
        /// Checklist definition JSON file
        #[arg(short, long)]
        definition: Option<PathBuf>,
        /// Comma-separated symbols, overriding the configured list
        #[arg(long)]
        symbols: Option<String>,
        /// Persist results to the store
        #[arg(long)]
        save: bool,
        /// Order output by score, highest first
        #[arg(long)]
        ranked: bool,
    },
    /// List the field catalog
    Fields,
    /// Validate a checklist definition file
    Validate {
        #[arg(short, long)]
        definition: PathBuf,
    },
    /// Store a checklist definition file
    Import {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        definition: PathBuf,
    },
    /// Show stored results for a checklist, newest first
    History {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        checklist: i64,
        #[arg(long, default_value_t = DEFAULT_RESULT_LIMIT)]
        limit: usize,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Evaluate {
            config,
            checklist,
            definition,
            symbols,
            save,
            ranked,
        } => run_evaluate(
            &config,
            checklist,
            definition.as_deref(),
            symbols.as_deref(),
            save,
            ranked,
        ),
        Command::Fields => {
            init_logging(None, true);
            run_fields()
        }
        Command::Validate { definition } => {
            init_logging(None, true);
            run_validate(&definition)
        }
        Command::Import { config, definition } => run_import(&config, &definition),
        Command::History {
            config,
            checklist,
            limit,
        } => run_history(&config, checklist, limit),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Installs the stderr subscriber. `RUST_LOG` wins over the configured level.
pub fn init_logging(level: Option<&str>, ansi: bool) {
    let level = level.unwrap_or(DEFAULT_LOG_LEVEL);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .try_init();
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ScreenerError> {
    let adapter = FileConfigAdapter::from_file(path).map_err(|e| ScreenerError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;
    validate_config(&adapter)?;
    init_logging(
        adapter.get_string("logging", "level").as_deref(),
        adapter.get_bool("logging", "ansi", true),
    );
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(adapter)
}

pub fn read_definition(path: &Path) -> Result<ChecklistDefinition, ScreenerError> {
    let parse_error = |reason: String| ScreenerError::DefinitionParse {
        file: path.display().to_string(),
        reason,
    };
    let content = fs::read_to_string(path).map_err(|e| parse_error(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))
}

/// Symbols for a run: the override, else `[evaluation] symbols`, else
/// everything the data port knows. Capped at `[evaluation] max_symbols`.
pub fn resolve_symbols(
    symbols_override: Option<&str>,
    config: &dyn ConfigPort,
    data_port: &dyn DataPort,
) -> Result<Vec<String>, ScreenerError> {
    let symbols = match symbols_override {
        Some(s) => parse_symbols(s)?,
        None => match config
            .get_string("evaluation", "symbols")
            .filter(|s| !s.trim().is_empty())
        {
            Some(s) => parse_symbols(&s)?,
            None => data_port.list_symbols()?,
        },
    };

    let limit = config.get_int("evaluation", "max_symbols", DEFAULT_MAX_SYMBOLS as i64);
    check_batch_size(&symbols, limit.max(1) as usize)?;
    Ok(symbols)
}

fn run_evaluate(
    config_path: &Path,
    checklist_id: Option<i64>,
    definition_path: Option<&Path>,
    symbols_override: Option<&str>,
    save: bool,
    ranked: bool,
) -> Result<(), ScreenerError> {
    let config = load_config(config_path)?;

    let store = if save || definition_path.is_none() {
        Some(open_store(&config)?)
    } else {
        None
    };

    let (checklist, items) = load_checklist(checklist_id, definition_path, store.as_deref())?;
    tracing::info!(checklist_id = checklist.id, name = %checklist.name, items = items.len(), "loaded checklist");

    let save_to = if save { store.as_deref() } else { None };
    if let Some(store) = save_to
        && store.get_checklist(checklist.id)?.is_none()
    {
        return Err(ScreenerError::ChecklistNotFound { id: checklist.id });
    }

    let data_port = FallbackDataPort::from_config(&config)?;
    let symbols = resolve_symbols(symbols_override, &config, &data_port)?;

    let mut results = evaluate_with_port(&data_port, &symbols, &checklist, &items);
    if ranked {
        rank_by_score(&mut results);
    }

    write_results(&results)?;

    if let Some(store) = save_to {
        let saved = store.save_results(&results)?;
        tracing::info!(saved = saved.len(), "stored results");
    }
    Ok(())
}

fn load_checklist(
    checklist_id: Option<i64>,
    definition_path: Option<&Path>,
    store: Option<&dyn StorePort>,
) -> Result<(Checklist, Vec<ConditionItem>), ScreenerError> {
    match (definition_path, checklist_id, store) {
        (Some(path), _, _) => {
            let definition = read_definition(path)?;
            if let Err(e) = validate_definition(&definition) {
                tracing::warn!(error = %e, "definition has invalid items; they will fail");
            }
            Ok((definition.checklist, definition.items))
        }
        (None, Some(id), Some(store)) => store.load_definition(id),
        _ => Err(ScreenerError::ConfigMissing {
            section: "evaluate".into(),
            key: "checklist".into(),
        }),
    }
}

fn write_results(results: &[EvaluationResult]) -> Result<(), ScreenerError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for result in results {
        let line = serde_json::to_string(result).map_err(io::Error::other)?;
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn run_fields() -> Result<(), ScreenerError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "# field catalog v{CATALOG_VERSION}")?;
    let mut category = "";
    for info in catalog() {
        if info.category != category {
            category = info.category;
            writeln!(out, "[{category}]")?;
        }
        let operators: Vec<&str> = info
            .field_type
            .operators()
            .iter()
            .map(|op| op.symbol())
            .collect();
        writeln!(
            out,
            "  {:<20} {:<7} {:<30} {}",
            info.key,
            info.field_type.as_str(),
            info.label,
            operators.join(" ")
        )?;
    }
    Ok(())
}

fn run_validate(definition_path: &Path) -> Result<(), ScreenerError> {
    let definition = read_definition(definition_path)?;
    validate_definition(&definition)?;
    println!(
        "Definition is valid: {} ({} items)",
        definition.checklist.name,
        definition.items.len()
    );
    Ok(())
}

#[cfg(feature = "sqlite")]
fn open_store(config: &dyn ConfigPort) -> Result<Box<dyn StorePort>, ScreenerError> {
    use crate::adapters::sqlite_adapter::SqliteStore;
    Ok(Box::new(SqliteStore::from_config(config)?))
}

#[cfg(not(feature = "sqlite"))]
fn open_store(_config: &dyn ConfigPort) -> Result<Box<dyn StorePort>, ScreenerError> {
    Err(ScreenerError::Database {
        reason: "sqlite feature is required for stored checklists".into(),
    })
}

fn run_import(config_path: &Path, definition_path: &Path) -> Result<(), ScreenerError> {
    let config = load_config(config_path)?;
    let definition = read_definition(definition_path)?;

    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::sqlite_adapter::SqliteStore;

        let store = SqliteStore::from_config(&config)?;
        let stored = store.import_definition(&definition)?;
        println!(
            "Imported checklist {} as id {} ({} items)",
            stored.checklist.name,
            stored.checklist.id,
            stored.items.len()
        );
        Ok(())
    }

    #[cfg(not(feature = "sqlite"))]
    {
        let _ = (&config, &definition);
        Err(ScreenerError::Database {
            reason: "sqlite feature is required for import".into(),
        })
    }
}

fn run_history(config_path: &Path, checklist_id: i64, limit: usize) -> Result<(), ScreenerError> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;
    if store.get_checklist(checklist_id)?.is_none() {
        return Err(ScreenerError::ChecklistNotFound { id: checklist_id });
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for stored in store.results_for(checklist_id, limit)? {
        let line = serde_json::to_string(&stored).map_err(io::Error::other)?;
        writeln!(out, "{line}")?;
    }
    Ok(())
}
