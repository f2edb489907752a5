pub mod deal;
pub mod init;
pub mod play;
pub mod validate;

use anyhow::{Context, Result};

use votesort_core::GameEngine;
use votesort_providers::config::{create_provider, load_config_from, VotesortConfig};

use crate::GameArgs;

/// Merge command-line flags over the loaded config.
pub fn resolve_config(args: &GameArgs) -> Result<VotesortConfig> {
    let mut config = load_config_from(args.config.as_deref())?;
    if let Some(variant) = &args.variant {
        config.variant = variant
            .parse()
            .map_err(|e: String| anyhow::anyhow!("{e}"))?;
    }
    if let Some(data) = &args.data {
        config.data_path = Some(data.clone());
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    Ok(config)
}

/// Load the dataset the flags point at and deal the first game.
pub async fn load_engine(args: &GameArgs) -> Result<GameEngine> {
    let config = resolve_config(args)?;
    let provider = create_provider(&config);
    tracing::debug!(provider = provider.name(), variant = %config.variant, "loading dataset");
    GameEngine::from_provider(provider.as_ref(), &config.engine_config())
        .await
        .with_context(|| format!("cannot start a {} game", config.variant))
}
