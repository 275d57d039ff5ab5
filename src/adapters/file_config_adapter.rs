//! INI file configuration adapter.

use crate::ports::config_port::{ConfigPort, parse_bool};
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    const SAMPLE: &str = r#"
[data]
sources = primary.csv, backup.csv
retry_delay_ms = 250
backoff = exponential

[evaluation]
symbols = AAPL, MSFT
max_symbols = 25

[sqlite]
path = /tmp/screener.db
pool_size = 2

[logging]
level = debug
ansi = no
"#;

    #[test]
    fn from_string_parses_config() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_string("sqlite", "path"),
            Some("/tmp/screener.db".to_string())
        );
        assert_eq!(
            adapter.get_string("data", "backoff"),
            Some("exponential".to_string())
        );
    }

    #[test]
    fn get_list_splits_and_trims() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_list("data", "sources"),
            vec!["primary.csv".to_string(), "backup.csv".to_string()]
        );
        assert!(adapter.get_list("data", "missing").is_empty());
    }

    #[test]
    fn get_list_drops_empty_entries() {
        let adapter =
            FileConfigAdapter::from_string("[evaluation]\nsymbols = AAPL,, MSFT ,\n").unwrap();
        assert_eq!(adapter.get_list("evaluation", "symbols"), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[evaluation]\nmax_symbols = 10\n").unwrap();
        assert_eq!(adapter.get_string("evaluation", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_value_or_default() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_int("evaluation", "max_symbols", 50), 25);
        assert_eq!(adapter.get_int("evaluation", "missing", 50), 50);
    }

    #[test]
    fn get_int_returns_default_for_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[data]\nretry_delay_ms = soon\n").unwrap();
        assert_eq!(adapter.get_int("data", "retry_delay_ms", 200), 200);
    }

    #[test]
    fn get_bool_values() {
        let adapter =
            FileConfigAdapter::from_string("[x]\na = true\nb = yes\nc = 0\nd = maybe\n").unwrap();
        assert!(adapter.get_bool("x", "a", false));
        assert!(adapter.get_bool("x", "b", false));
        assert!(!adapter.get_bool("x", "c", true));
        assert!(adapter.get_bool("x", "d", true));
        assert!(!adapter.get_bool("x", "missing", false));

        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert!(!adapter.get_bool("logging", "ansi", true));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config(SAMPLE);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_int("sqlite", "pool_size", 4), 2);
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(result.is_err());
    }
}
