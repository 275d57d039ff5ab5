//! CLI integration tests for command orchestration.
//!
//! Tests cover:
//! - Config loading and validation with real INI files on disk
//! - Definition file parsing
//! - Symbol resolution (override, config, data port) and the batch ceiling
//! - The `screener` binary end to end: evaluate, fields, validate, import, history

mod common;

use common::*;
use screener::cli;
use screener::domain::error::ScreenerError;
use screener::domain::evaluation::{EvaluationResult, Verdict};
use screener::domain::universe::UniverseError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn write_temp_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    path
}

const METRICS_CSV: &str = "symbol,pe_ratio,market_cap,dividend_yield,sector\n\
    AAPL,15,2000000000,0,Technology\n\
    MSFT,32,3000000000000,0.008,Technology\n";

fn write_config(dir: &Path, extra: &str) -> PathBuf {
    let metrics = write_temp_file(dir, "metrics.csv", METRICS_CSV);
    let ini = format!(
        "[data]\nsources = {}\nretry_delay_ms = 0\nbackoff = fixed\n\n\
         [sqlite]\npath = {}\npool_size = 2\n\n\
         [logging]\nlevel = warn\n{}",
        metrics.display(),
        dir.join("screener.db").display(),
        extra
    );
    write_temp_file(dir, "config.ini", &ini)
}

fn write_definition(dir: &Path) -> PathBuf {
    let json = serde_json::to_string_pretty(&value_definition()).unwrap();
    write_temp_file(dir, "value.json", &json)
}

fn screener(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_screener"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout_results(output: &Output) -> Vec<EvaluationResult> {
    String::from_utf8(output.stdout.clone())
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

mod config_loading {
    use super::*;

    #[test]
    fn load_config_valid() {
        let dir = TempDir::new().unwrap();
        let path = write_config(dir.path(), "");
        assert!(cli::load_config(&path).is_ok());
    }

    #[test]
    fn load_config_missing_file() {
        let err = cli::load_config(Path::new("/nonexistent/screener.ini")).unwrap_err();
        assert!(matches!(err, ScreenerError::ConfigParse { .. }));
    }

    #[test]
    fn load_config_rejects_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = write_temp_file(
            dir.path(),
            "bad.ini",
            "[data]\nsources = a.csv\nbackoff = sometimes\n",
        );
        let err = cli::load_config(&path).unwrap_err();
        assert!(matches!(err, ScreenerError::ConfigInvalid { key, .. } if key == "backoff"));
    }

    #[test]
    fn load_config_rejects_unknown_log_level() {
        let dir = TempDir::new().unwrap();
        let path = write_temp_file(
            dir.path(),
            "loud.ini",
            "[data]\nsources = a.csv\n\n[logging]\nlevel = shouty\n",
        );
        let err = cli::load_config(&path).unwrap_err();
        assert!(matches!(err, ScreenerError::ConfigInvalid { key, .. } if key == "level"));
    }

    #[test]
    fn load_config_rejects_non_numeric_limits() {
        let dir = TempDir::new().unwrap();
        let path = write_config(dir.path(), "\n[evaluation]\nmax_symbols = abc\n");
        let err = cli::load_config(&path).unwrap_err();
        assert!(matches!(err, ScreenerError::ConfigInvalid { key, .. } if key == "max_symbols"));
    }
}

mod definitions {
    use super::*;

    #[test]
    fn read_definition_valid() {
        let dir = TempDir::new().unwrap();
        let path = write_definition(dir.path());
        let definition = cli::read_definition(&path).unwrap();
        assert_eq!(definition, value_definition());
    }

    #[test]
    fn read_definition_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = write_temp_file(dir.path(), "broken.json", "{\"checklist\": ");
        let err = cli::read_definition(&path).unwrap_err();
        assert!(matches!(err, ScreenerError::DefinitionParse { .. }));
    }

    #[test]
    fn read_definition_missing_file() {
        let err = cli::read_definition(Path::new("/nonexistent/def.json")).unwrap_err();
        assert!(matches!(err, ScreenerError::DefinitionParse { file, .. } if file == "/nonexistent/def.json"));
    }
}

mod symbol_resolution {
    use super::*;
    use screener::adapters::file_config_adapter::FileConfigAdapter;

    fn port() -> MockDataPort {
        MockDataPort::new().with_metrics(aapl()).with_metrics(msft())
    }

    #[test]
    fn override_wins() {
        let config =
            FileConfigAdapter::from_string("[evaluation]\nsymbols = AAPL, MSFT\n").unwrap();
        let symbols = cli::resolve_symbols(Some("ibm, goog"), &config, &port()).unwrap();
        assert_eq!(symbols, vec!["IBM", "GOOG"]);
    }

    #[test]
    fn configured_symbols_used_without_override() {
        let config = FileConfigAdapter::from_string("[evaluation]\nsymbols = msft\n").unwrap();
        assert_eq!(cli::resolve_symbols(None, &config, &port()).unwrap(), vec!["MSFT"]);
    }

    #[test]
    fn data_port_listing_is_the_fallback() {
        let config = FileConfigAdapter::from_string("[data]\nsources = x.csv\n").unwrap();
        assert_eq!(
            cli::resolve_symbols(None, &config, &port()).unwrap(),
            vec!["AAPL", "MSFT"]
        );
    }

    #[test]
    fn batch_ceiling_enforced() {
        let config = FileConfigAdapter::from_string("[evaluation]\nmax_symbols = 2\n").unwrap();
        let err = cli::resolve_symbols(Some("A,B,C"), &config, &port()).unwrap_err();
        assert!(matches!(
            err,
            ScreenerError::Universe(UniverseError::TooMany {
                requested: 3,
                limit: 2
            })
        ));
    }

    #[test]
    fn duplicate_override_rejected() {
        let config = FileConfigAdapter::from_string("").unwrap();
        let err = cli::resolve_symbols(Some("AAPL,aapl"), &config, &port()).unwrap_err();
        assert!(matches!(
            err,
            ScreenerError::Universe(UniverseError::DuplicateSymbol(_))
        ));
    }
}

mod binary {
    use super::*;

    #[test]
    fn evaluate_definition_writes_json_lines() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path(), "");
        let definition = write_definition(dir.path());

        let output = screener(&[
            "evaluate",
            "-c",
            config.to_str().unwrap(),
            "-d",
            definition.to_str().unwrap(),
            "--symbols",
            "MSFT,BAD,AAPL",
        ]);

        assert!(output.status.success());
        let results = stdout_results(&output);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].symbol, "MSFT");
        assert_eq!(results[0].verdict, Verdict::Partial);
        assert!(results[1].is_degraded());
        assert_eq!(results[2].verdict, Verdict::Pass);
    }

    #[test]
    fn evaluate_ranked_orders_by_score() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path(), "");
        let definition = write_definition(dir.path());

        let output = screener(&[
            "evaluate",
            "-c",
            config.to_str().unwrap(),
            "-d",
            definition.to_str().unwrap(),
            "--ranked",
        ]);

        assert!(output.status.success());
        let order: Vec<String> = stdout_results(&output)
            .into_iter()
            .map(|r| r.symbol)
            .collect();
        assert_eq!(order, vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn evaluate_rejects_oversized_batch() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path(), "\n[evaluation]\nmax_symbols = 1\n");
        let definition = write_definition(dir.path());

        let output = screener(&[
            "evaluate",
            "-c",
            config.to_str().unwrap(),
            "-d",
            definition.to_str().unwrap(),
            "--symbols",
            "AAPL,MSFT",
        ]);

        assert_eq!(output.status.code(), Some(2));
        assert!(output.stdout.is_empty());
    }

    #[test]
    fn fields_lists_catalog() {
        let output = screener(&["fields"]);
        assert!(output.status.success());
        let text = String::from_utf8(output.stdout).unwrap();
        assert!(text.contains("pe_ratio"));
        assert!(text.contains("analyst_rating"));
        assert!(text.contains("[Valuation]"));
    }

    #[test]
    fn validate_reports_bad_definition() {
        let dir = TempDir::new().unwrap();
        let mut definition = value_definition();
        definition.items[1].operator = "contains".into();
        let path = write_temp_file(
            dir.path(),
            "bad.json",
            &serde_json::to_string(&definition).unwrap(),
        );

        let output = screener(&["validate", "-d", path.to_str().unwrap()]);
        assert_eq!(output.status.code(), Some(4));
        let stderr = String::from_utf8(output.stderr).unwrap();
        assert!(stderr.contains("invalid checklist item 2"));
    }

    #[test]
    fn validate_accepts_good_definition() {
        let dir = TempDir::new().unwrap();
        let path = write_definition(dir.path());
        let output = screener(&["validate", "-d", path.to_str().unwrap()]);
        assert!(output.status.success());
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn import_evaluate_save_history() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path(), "");
        let definition = write_definition(dir.path());
        let config_arg = config.to_str().unwrap();

        let imported = screener(&[
            "import",
            "-c",
            config_arg,
            "-d",
            definition.to_str().unwrap(),
        ]);
        assert!(imported.status.success());
        let message = String::from_utf8(imported.stdout).unwrap();
        assert!(message.contains("as id 1"));

        let evaluated = screener(&[
            "evaluate",
            "-c",
            config_arg,
            "--checklist",
            "1",
            "--symbols",
            "AAPL",
            "--save",
        ]);
        assert!(evaluated.status.success());
        assert_eq!(stdout_results(&evaluated)[0].verdict, Verdict::Pass);

        let history = screener(&["history", "-c", config_arg, "--checklist", "1"]);
        assert!(history.status.success());
        let lines = String::from_utf8(history.stdout).unwrap();
        assert_eq!(lines.lines().count(), 1);
        assert!(lines.contains("\"symbol\":\"AAPL\""));
    }

    #[test]
    fn invalid_log_level_exits_before_logging() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path(), "");
        let ini = fs::read_to_string(&config).unwrap().replace("level = warn", "level = shouty");
        fs::write(&config, ini).unwrap();
        let definition = write_definition(dir.path());

        let output = screener(&[
            "evaluate",
            "-c",
            config.to_str().unwrap(),
            "-d",
            definition.to_str().unwrap(),
        ]);

        assert_eq!(output.status.code(), Some(2));
        let stderr = String::from_utf8(output.stderr).unwrap();
        assert_eq!(
            stderr.trim(),
            "error: invalid config value [logging] level: unknown log level 'shouty'"
        );
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn save_with_unstored_definition_reports_missing_checklist() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path(), "");
        let definition = write_definition(dir.path());

        let output = screener(&[
            "evaluate",
            "-c",
            config.to_str().unwrap(),
            "-d",
            definition.to_str().unwrap(),
            "--symbols",
            "AAPL",
            "--save",
        ]);

        assert_eq!(output.status.code(), Some(4));
        assert!(output.stdout.is_empty());
        let stderr = String::from_utf8(output.stderr).unwrap();
        assert!(stderr.contains("error: checklist 1 not found"));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn save_with_stored_definition_prints_and_persists() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path(), "");
        let definition = write_definition(dir.path());
        let config_arg = config.to_str().unwrap();
        let definition_arg = definition.to_str().unwrap();

        assert!(screener(&["import", "-c", config_arg, "-d", definition_arg]).status.success());

        let evaluated = screener(&[
            "evaluate",
            "-c",
            config_arg,
            "-d",
            definition_arg,
            "--symbols",
            "AAPL,MSFT",
            "--save",
        ]);
        assert!(evaluated.status.success());
        assert_eq!(stdout_results(&evaluated).len(), 2);

        let history = screener(&["history", "-c", config_arg, "--checklist", "1"]);
        assert_eq!(String::from_utf8(history.stdout).unwrap().lines().count(), 2);
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn history_unknown_checklist_fails() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path(), "");
        let output = screener(&["history", "-c", config.to_str().unwrap(), "--checklist", "9"]);
        assert_eq!(output.status.code(), Some(4));
    }
}
