use std::{env, net::SocketAddr, path::PathBuf};
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/habits.json";
const DEFAULT_FALLBACK_DIR: &str = "data/records";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Document store, falling back to the record store when it cannot be opened.
    Auto,
    Document,
    Records,
}

impl StorageMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "document" => Some(Self::Document),
            "records" => Some(Self::Records),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub fallback_dir: PathBuf,
    pub storage: StorageMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            fallback_dir: PathBuf::from(DEFAULT_FALLBACK_DIR),
            storage: StorageMode::Auto,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup("PORT") {
            match value.parse::<u16>() {
                Ok(port) => config.port = port,
                Err(_) => warn!("ignoring invalid PORT {value:?}"),
            }
        }
        if let Some(path) = lookup("HABITS_DATA_PATH").filter(|v| !v.is_empty()) {
            config.data_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("HABITS_FALLBACK_DIR").filter(|v| !v.is_empty()) {
            config.fallback_dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup("HABITS_STORAGE") {
            match StorageMode::parse(&value) {
                Some(mode) => config.storage = mode,
                None => warn!("ignoring invalid HABITS_STORAGE {value:?}"),
            }
        }

        config
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_path, PathBuf::from("data/habits.json"));
        assert_eq!(config.fallback_dir, PathBuf::from("data/records"));
        assert_eq!(config.storage, StorageMode::Auto);
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "9191"),
            ("HABITS_DATA_PATH", "/tmp/h.json"),
            ("HABITS_FALLBACK_DIR", "/tmp/records"),
            ("HABITS_STORAGE", "Records"),
        ]));
        assert_eq!(config.port, 9191);
        assert_eq!(config.data_path, PathBuf::from("/tmp/h.json"));
        assert_eq!(config.fallback_dir, PathBuf::from("/tmp/records"));
        assert_eq!(config.storage, StorageMode::Records);
        assert_eq!(config.addr().port(), 9191);
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let config = Config::from_lookup(lookup(&[("PORT", "eighty"), ("HABITS_STORAGE", "cloud")]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.storage, StorageMode::Auto);
    }
}
