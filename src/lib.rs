pub mod core;
pub mod schemas;
pub mod services;

use crate::core::{config::Settings, telemetry};

/// Load environment configuration and install the tracing subscriber. The
/// hosting application calls this once at startup, then hands the settings
/// to `GeminiClient::from_settings`.
pub fn init() -> anyhow::Result<Settings> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;

    tracing::info!(
        environment = %settings.runtime().environment.as_str(),
        model = %settings.ai().model,
        "Vidya quiz engine initialized"
    );

    Ok(settings)
}
