use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wishtrack_cli::config::CliConfig;
use wishtrack_cli::prompt::LinePrompt;
use wishtrack_cli::{render, repl};
use wishtrack_events::EventBus;
use wishtrack_session::LedgerSession;
use wishtrack_store::JsonFileStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wishtrack=info,wishtrack_cli=info,wishtrack_session=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // --- Configuration ---
    let config = CliConfig::from_env()?;
    tracing::info!(
        user = %config.user,
        data_dir = %config.data_dir.display(),
        bulk_size = config.bulk_size,
        "Loaded configuration"
    );

    // --- Event bus ---
    let bus = Arc::new(EventBus::default());
    let printer = tokio::spawn(render::print_events(bus.subscribe()));

    // --- Session ---
    let input = Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines()));
    let store = JsonFileStore::new(&config.data_dir);
    let prompt = LinePrompt::new(Arc::clone(&input));
    let mut session = LedgerSession::open(config.user.clone(), store, prompt, Arc::clone(&bus))?;

    repl::run(&mut session, input, config.bulk_size).await?;

    // Dropping every sender closes the bus and lets the printer finish.
    drop(session);
    drop(bus);
    printer.await?;

    tracing::info!("Goodbye");
    Ok(())
}
