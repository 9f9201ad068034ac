//! Process runner: builds the concrete command for a file and executes it.

use std::{fs, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use tokio::process::Command;

use crate::{
    executors::{ExecutorRegistry, FILE_TOKEN},
    printer,
};

/// Outcome of one execution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    Failure { stderr: String },
    Unsupported { extension: String },
}

pub struct ProcessRunner<'a> {
    registry: &'a ExecutorRegistry,
}

impl<'a> ProcessRunner<'a> {
    pub fn new(registry: &'a ExecutorRegistry) -> Self {
        Self { registry }
    }

    /// Run `file` through its registered executor, capturing both output
    /// streams. An unregistered extension returns `Unsupported` without
    /// spawning anything.
    pub async fn run(&self, file: &Path) -> Result<RunOutcome> {
        let extension = file_extension(file);
        let Some(template) = self.registry.template_for(&extension) else {
            return Ok(RunOutcome::Unsupported { extension });
        };

        printer::step(&format!("Running {} (extension: {})", file.display(), extension));
        let absolute = fs::canonicalize(file)
            .with_context(|| format!("failed to resolve {}", file.display()))?;
        let argv = build_argv(template, &absolute.to_string_lossy())?;

        let output = Command::new(&argv[0])
            .args(&argv[1..])
            .output()
            .await
            .with_context(|| format!("failed to execute `{}`", argv.join(" ")))?;

        if output.status.success() {
            printer::success("Program ran successfully:");
            let stdout = String::from_utf8_lossy(&output.stdout);
            if !stdout.is_empty() {
                print!("{}", stdout);
            }
            Ok(RunOutcome::Success)
        } else {
            Ok(RunOutcome::Failure {
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }
}

/// Lower-cased extension including the leading dot, or "" when absent.
pub fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// Split a command template into argv words and substitute every
/// occurrence of the file token. Substitution happens per argument
/// slot, after word splitting, so the path is never re-parsed by a
/// shell.
pub fn build_argv(template: &str, file_path: &str) -> Result<Vec<String>> {
    let words = shlex::split(template)
        .ok_or_else(|| anyhow!("invalid executor template: {}", template))?;
    if words.is_empty() {
        bail!("empty executor template");
    }
    Ok(words
        .into_iter()
        .map(|w| w.replace(FILE_TOKEN, file_path))
        .collect())
}
