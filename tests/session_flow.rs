use std::collections::HashMap;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use fixcode::executors::ExecutorRegistry;
use fixcode::extract::FencedBlockExtractor;
use fixcode::fix::SuggestFix;
use fixcode::session::{SessionController, SessionOptions};
use tempfile::TempDir;

/// Returns the nth scripted reply per call, `None` once exhausted.
struct ScriptedFixer {
    replies: Vec<String>,
    calls: AtomicUsize,
}

impl ScriptedFixer {
    fn new(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(|r| r.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SuggestFix for ScriptedFixer {
    async fn request_fix(&self, _code: &str, _error: &str, _model: &str) -> Option<String> {
        let i = self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies.get(i).cloned()
    }
}

fn sh_registry() -> ExecutorRegistry {
    ExecutorRegistry::from_map(HashMap::from([(
        ".sh".to_string(),
        "sh $file".to_string(),
    )]))
}

fn options(auto_apply: bool, max_attempts: usize, retry_on_same_error: bool) -> SessionOptions {
    SessionOptions {
        model: "test-model".to_string(),
        auto_apply,
        max_attempts,
        retry_on_same_error,
    }
}

#[tokio::test]
async fn successful_run_requests_no_fix() -> Result<()> {
    let dir = TempDir::new()?;
    let script = dir.path().join("ok.sh");
    fs::write(&script, "exit 0\n")?;

    let registry = sh_registry();
    let fixer = ScriptedFixer::new(&[]);
    let controller =
        SessionController::new(&registry, &fixer, &FencedBlockExtractor, options(true, 3, false));
    controller.run(&script).await?;

    assert_eq!(fixer.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn auto_apply_writes_extracted_code_and_rerun_succeeds() -> Result<()> {
    let dir = TempDir::new()?;
    let script = dir.path().join("job.sh");
    fs::write(&script, "echo broken >&2\nexit 1\n")?;

    let registry = sh_registry();
    let fixer = ScriptedFixer::new(&["Here is a fix:\n```sh\necho ok\n```\nNote: removed the failure"]);
    let controller =
        SessionController::new(&registry, &fixer, &FencedBlockExtractor, options(true, 3, false));
    controller.run(&script).await?;

    // The fenced interior was applied verbatim and the second run passed.
    assert_eq!(fs::read_to_string(&script)?, "echo ok");
    assert_eq!(fixer.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn unchanged_error_output_stops_the_loop() -> Result<()> {
    let dir = TempDir::new()?;
    let script = dir.path().join("job.sh");
    fs::write(&script, "echo same >&2\nexit 1\n")?;

    // The "fix" reproduces the identical failure.
    let reply = "```\necho same >&2\nexit 1\n```";
    let registry = sh_registry();
    let fixer = ScriptedFixer::new(&[reply, reply, reply]);
    let controller =
        SessionController::new(&registry, &fixer, &FencedBlockExtractor, options(true, 10, false));
    controller.run(&script).await?;

    assert_eq!(fixer.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn attempt_cap_bounds_the_fix_cycle() -> Result<()> {
    let dir = TempDir::new()?;
    let script = dir.path().join("job.sh");
    fs::write(&script, "echo err1 >&2\nexit 1\n")?;

    // Every fix fails differently, so only the attempt cap can stop it.
    let registry = sh_registry();
    let fixer = ScriptedFixer::new(&[
        "```\necho err2 >&2\nexit 1\n```",
        "```\necho err3 >&2\nexit 1\n```",
        "```\necho err4 >&2\nexit 1\n```",
    ]);
    let controller =
        SessionController::new(&registry, &fixer, &FencedBlockExtractor, options(true, 3, true));
    controller.run(&script).await?;

    // Three run attempts, fixes requested after the first two failures only.
    assert_eq!(fixer.calls(), 2);
    assert_eq!(fs::read_to_string(&script)?, "echo err3 >&2\nexit 1");
    Ok(())
}

#[tokio::test]
async fn no_suggestion_terminates_without_touching_the_file() -> Result<()> {
    let dir = TempDir::new()?;
    let script = dir.path().join("job.sh");
    let original = "echo broken >&2\nexit 1\n";
    fs::write(&script, original)?;

    let registry = sh_registry();
    let fixer = ScriptedFixer::new(&[]);
    let controller =
        SessionController::new(&registry, &fixer, &FencedBlockExtractor, options(true, 3, false));
    controller.run(&script).await?;

    assert_eq!(fixer.calls(), 1);
    assert_eq!(fs::read_to_string(&script)?, original);
    Ok(())
}

#[tokio::test]
async fn without_a_terminal_confirmation_declines_and_file_is_untouched() -> Result<()> {
    let dir = TempDir::new()?;
    let script = dir.path().join("job.sh");
    let original = "echo broken >&2\nexit 1\n";
    fs::write(&script, original)?;

    // Test harness stdin is not a TTY, so the confirmation counts as "no".
    let registry = sh_registry();
    let fixer = ScriptedFixer::new(&["```\necho ok\n```"]);
    let controller =
        SessionController::new(&registry, &fixer, &FencedBlockExtractor, options(false, 3, false));
    controller.run(&script).await?;

    assert_eq!(fixer.calls(), 1);
    assert_eq!(fs::read_to_string(&script)?, original);
    Ok(())
}

#[tokio::test]
async fn unsupported_extension_ends_the_session_without_a_fix_request() -> Result<()> {
    let dir = TempDir::new()?;
    let target = dir.path().join("data.zig");
    fs::write(&target, "whatever\n")?;

    let registry = sh_registry();
    let fixer = ScriptedFixer::new(&["```\nunused\n```"]);
    let controller =
        SessionController::new(&registry, &fixer, &FencedBlockExtractor, options(true, 3, false));
    controller.run(&target).await?;

    assert_eq!(fixer.calls(), 0);
    assert_eq!(fs::read_to_string(&target)?, "whatever\n");
    Ok(())
}
