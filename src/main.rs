use anyhow::{anyhow, Result};
use parley::config::AppConfig;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parley=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Parley chat assistant");

    // Optional config path as the first argument
    let explicit = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load_or_default(explicit.as_deref())?;

    parley::ui::run(config).map_err(|e| anyhow!("{e}"))
}
