//! The `votesort deal` command.

use anyhow::Result;

use crate::GameArgs;

pub async fn execute(args: GameArgs) -> Result<()> {
    let engine = super::load_engine(&args).await?;
    let json = serde_json::to_string_pretty(engine.session().instance())?;
    println!("{json}");
    Ok(())
}
