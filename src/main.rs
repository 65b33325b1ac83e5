use dotenvy::dotenv;
use once_cell::sync::Lazy;
use tracing::{info, warn};

mod config;
mod console;
mod editor;
mod llm;
mod utils;

use config::CONFIG;
use llm::GeminiClient;
use utils::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let _guards = init_logging(&config::log_dir_from_env(), &config::log_level_from_env());
    Lazy::force(&CONFIG);

    if !CONFIG.has_api_key() {
        warn!("GEMINI_API_KEY is not set; edit requests will be rejected by the API");
    }

    let client = GeminiClient::from_config(&CONFIG);
    info!(
        "Starting portrait editor (model={}, safety={:?})",
        CONFIG.gemini_image_model, CONFIG.gemini_safety_settings
    );

    console::run(client).await?;
    info!("Portrait editor stopped");
    Ok(())
}
