use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::PathBuf,
};

use anyhow::{Context, Result};
use directories::BaseDirs;

/// Key under which an explicitly chosen model is remembered between runs.
pub const MODEL_KEY: &str = "FIXCODE_MODEL";

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(default_config_path())
    }

    /// Load from an explicit file path. Tests use this to keep every
    /// instance isolated from the user's real configuration.
    pub fn load_from(config_path: PathBuf) -> Self {
        let mut map = default_map();

        if config_path.exists() {
            if let Ok(file) = fs::File::open(&config_path) {
                let reader = BufReader::new(file);
                for line in reader.lines().map_while(|l| l.ok()) {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    if let Some((k, v)) = line.split_once('=') {
                        map.insert(k.trim().to_string(), v.trim().to_string());
                    }
                }
            }
        }

        // Overlay environment variables (take precedence)
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self { inner: map, config_path }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).cloned()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.parse::<usize>().ok())
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).map(PathBuf::from)
    }

    /// Write `key=value` back to the config file: the matching line is
    /// rewritten in place, or a new line is appended when the key is
    /// absent. The whole file is rewritten with a single trailing line
    /// terminator.
    pub fn persist(&mut self, key: &str, value: &str) -> Result<()> {
        let mut lines: Vec<String> = if self.config_path.exists() {
            fs::read_to_string(&self.config_path)
                .with_context(|| format!("failed to read {}", self.config_path.display()))?
                .lines()
                .map(str::to_string)
                .collect()
        } else {
            Vec::new()
        };

        let mut replaced = false;
        for line in lines.iter_mut() {
            let trimmed = line.trim_start();
            if trimmed.starts_with('#') {
                continue;
            }
            if let Some((k, _)) = trimmed.split_once('=') {
                if k.trim() == key {
                    *line = format!("{}={}", key, value);
                    replaced = true;
                    break;
                }
            }
        }
        if !replaced {
            lines.push(format!("{}={}", key, value));
        }

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&self.config_path, format!("{}\n", lines.join("\n")))
            .with_context(|| format!("failed to write {}", self.config_path.display()))?;

        self.inner.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn is_config_key(k: &str) -> bool {
    // Accept known keys or FIXCODE_*/OPENAI_* for forward-compat
    const KEYS: &[&str] = &[
        "OPENAI_API_KEY",
        "OPENAI_BASE_URL",
        "DEFAULT_MODEL",
        "REQUEST_TIMEOUT",
        "MAX_ATTEMPTS",
        "RETRY_ON_SAME_ERROR",
        "EXECUTOR_MAP_PATH",
    ];

    KEYS.contains(&k) || k.starts_with("FIXCODE_") || k.starts_with("OPENAI_")
}

fn config_dir() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("fixcode")
}

fn default_config_path() -> PathBuf {
    config_dir().join(".fixcoderc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();

    m.insert(
        "EXECUTOR_MAP_PATH".into(),
        config_dir().join("executors.json").to_string_lossy().into_owned(),
    );

    // Numbers
    m.insert("REQUEST_TIMEOUT".into(), "60".into());
    m.insert("MAX_ATTEMPTS".into(), "3".into());

    // Strings
    m.insert("DEFAULT_MODEL".into(), "mistralai/mistral-7b-instruct:free".into());
    m.insert("OPENAI_BASE_URL".into(), "default".into());

    // Bools as strings
    m.insert("RETRY_ON_SAME_ERROR".into(), "false".into());

    m
}
