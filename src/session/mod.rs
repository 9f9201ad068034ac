//! Run/fix/apply session: execute the file, request a fix on failure,
//! apply it (after confirmation unless auto-apply is set) and re-run.

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use anyhow::{Context, Result};
use is_terminal::IsTerminal;

use crate::{
    executors::ExecutorRegistry,
    extract::CodeExtractor,
    fix::SuggestFix,
    printer::{self, MarkdownPrinter},
    runner::{ProcessRunner, RunOutcome},
};

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub model: String,
    pub auto_apply: bool,
    pub max_attempts: usize,
    pub retry_on_same_error: bool,
}

pub struct SessionController<'a> {
    registry: &'a ExecutorRegistry,
    fixer: &'a dyn SuggestFix,
    extractor: &'a dyn CodeExtractor,
    options: SessionOptions,
}

impl<'a> SessionController<'a> {
    pub fn new(
        registry: &'a ExecutorRegistry,
        fixer: &'a dyn SuggestFix,
        extractor: &'a dyn CodeExtractor,
        options: SessionOptions,
    ) -> Self {
        Self { registry, fixer, extractor, options }
    }

    pub async fn run(&self, file: &Path) -> Result<()> {
        let runner = ProcessRunner::new(self.registry);
        let mut previous_error: Option<String> = None;

        for attempt in 1..=self.options.max_attempts {
            let stderr = match runner.run(file).await? {
                RunOutcome::Success => return Ok(()),
                RunOutcome::Unsupported { extension } => {
                    printer::error(&format!(
                        "Unsupported or unknown file extension: {}",
                        extension
                    ));
                    return Ok(());
                }
                RunOutcome::Failure { stderr } => stderr,
            };

            printer::warn("Error detected:");
            eprintln!("{}", stderr);

            if !self.options.retry_on_same_error
                && previous_error.as_deref() == Some(stderr.as_str())
            {
                printer::error("Error output unchanged after the last fix, giving up");
                return Ok(());
            }
            if attempt == self.options.max_attempts {
                printer::error(&format!("Giving up after {} attempts", attempt));
                return Ok(());
            }

            let code = fs::read_to_string(file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let Some(suggestion) = self
                .fixer
                .request_fix(&code, &stderr, &self.options.model)
                .await
            else {
                return Ok(());
            };

            printer::success("Suggested fix:");
            MarkdownPrinter::default().print(&suggestion);

            let candidate = self.extractor.extract(&suggestion);
            if candidate.is_empty() {
                printer::error("No code could be extracted from the suggestion");
                return Ok(());
            }

            if !self.options.auto_apply && !confirm_apply()? {
                println!("Leaving {} unmodified", file.display());
                return Ok(());
            }

            fs::write(file, &candidate)
                .with_context(|| format!("failed to write {}", file.display()))?;
            printer::step(&format!("Applied fix to {}, re-running", file.display()));
            previous_error = Some(stderr);
        }

        Ok(())
    }
}

fn confirm_apply() -> Result<bool> {
    if !io::stdin().is_terminal() {
        printer::warn("Standard input is not a terminal; not applying (use --apply to skip confirmation)");
        return Ok(false);
    }
    print!("Apply this fix and re-run? [y/N]: ");
    io::stdout().flush().ok();
    let mut choice = String::new();
    io::stdin().read_line(&mut choice)?;
    let c = choice.trim().to_lowercase();
    Ok(c == "y" || c == "yes")
}
