use anyhow::Result;

use fixcode::{
    cli::Cli,
    config::{Config, MODEL_KEY},
    executors::ExecutorRegistry,
    extract::FencedBlockExtractor,
    fix::{FixRequester, DEFAULT_MODEL},
    session::{SessionController, SessionOptions},
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let mut cfg = Config::load();

    // An explicit model choice is remembered for later invocations.
    if let Some(model) = args.model.as_deref() {
        cfg.persist(MODEL_KEY, model)?;
    }

    // Resolve model: CLI overrides persisted choice; fall back to DEFAULT_MODEL
    let model = args
        .model
        .clone()
        .or_else(|| cfg.get(MODEL_KEY))
        .or_else(|| cfg.get("DEFAULT_MODEL"))
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let registry = ExecutorRegistry::load(&cfg)?;
    let fixer = FixRequester::from_config(&cfg)?;
    let extractor = FencedBlockExtractor;

    let options = SessionOptions {
        model,
        auto_apply: args.apply,
        max_attempts: args
            .max_attempts
            .or_else(|| cfg.get_usize("MAX_ATTEMPTS"))
            .unwrap_or(3)
            .max(1),
        retry_on_same_error: args.retry_same_error || cfg.get_bool("RETRY_ON_SAME_ERROR"),
    };

    SessionController::new(&registry, &fixer, &extractor, options)
        .run(&args.file)
        .await
}
