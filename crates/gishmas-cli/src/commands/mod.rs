pub mod config;
pub mod days;
pub mod guests;
pub mod play;
pub mod quiz;

use gishmas_core::{AppContext, Config};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Load config and resolve storage and identity.
pub async fn context() -> Result<AppContext, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let ctx = AppContext::bootstrap(config).await?;
    tracing::debug!(
        namespace = %ctx.config().app.namespace,
        signed_in = ctx.user().is_some(),
        "context ready"
    );
    Ok(ctx)
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
