//! Executor registry: file extension to command template.

use std::{collections::HashMap, fs};

use anyhow::{Context, Result};

use crate::config::Config;

/// Placeholder token substituted with the target file's absolute path.
pub const FILE_TOKEN: &str = "$file";

#[derive(Debug, Clone)]
pub struct ExecutorRegistry {
    map: HashMap<String, String>,
}

impl ExecutorRegistry {
    /// Load the registry from the JSON map file named by
    /// `EXECUTOR_MAP_PATH`, falling back to the built-in defaults when
    /// no such file exists. The registry is immutable afterwards.
    pub fn load(cfg: &Config) -> Result<Self> {
        if let Some(path) = cfg.get_path("EXECUTOR_MAP_PATH") {
            if path.exists() {
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let map: HashMap<String, String> = serde_json::from_str(&text)
                    .with_context(|| format!("invalid executor map in {}", path.display()))?;
                return Ok(Self::from_map(map));
            }
        }
        Ok(Self::from_map(default_map()))
    }

    pub fn from_map(map: HashMap<String, String>) -> Self {
        let map = map
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        Self { map }
    }

    /// Look up the command template for an extension such as ".py".
    pub fn template_for(&self, extension: &str) -> Option<&str> {
        self.map.get(&extension.to_lowercase()).map(String::as_str)
    }
}

fn default_map() -> HashMap<String, String> {
    let entries = [
        (".py", "python3 $file"),
        (".js", "node $file"),
        (".sh", "sh $file"),
        (".rb", "ruby $file"),
        (".pl", "perl $file"),
        (".php", "php $file"),
        (".lua", "lua $file"),
        (".go", "go run $file"),
    ];
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = ExecutorRegistry::from_map(HashMap::from([(
            ".PY".to_string(),
            "python3 $file".to_string(),
        )]));
        assert_eq!(registry.template_for(".py"), Some("python3 $file"));
        assert_eq!(registry.template_for(".Py"), Some("python3 $file"));
    }

    #[test]
    fn unknown_extension_has_no_template() {
        let registry = ExecutorRegistry::from_map(HashMap::new());
        assert_eq!(registry.template_for(".zig"), None);
    }

    #[test]
    fn defaults_cover_common_interpreters() {
        let registry = ExecutorRegistry::from_map(default_map());
        for ext in [".py", ".js", ".sh", ".rb"] {
            let template = registry.template_for(ext).unwrap();
            assert!(template.contains(FILE_TOKEN), "{ext} template lacks token");
        }
    }
}
