pub mod client;
pub mod config;
pub mod controller;
pub mod model;
pub mod presenter;
pub mod terminal;

use std::sync::Arc;
use tracing::info;

use client::HttpRecommendationClient;
use controller::RequestController;
use presenter::MovieCardPresenter;
use terminal::Session;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Client error: {0}")]
    Transport(#[from] client::TransportError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Config file; `None` means the default path, if present.
    pub config_path: Option<String>,
    pub endpoint: Option<String>,
    /// Submit this prompt once instead of reading prompts from stdin.
    pub prompt: Option<String>,
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Shown,
    Failed,
}

pub async fn run(options: RunOptions) -> Result<RunOutcome, ClientError> {
    let config = config::Config::load(options.config_path.as_deref())?
        .with_endpoint_overrides(options.endpoint, std::env::var(config::ENDPOINT_ENV).ok());

    let endpoint = config.endpoint_url()?;
    let timeout = config.timeout()?;
    info!("Recommendation service: {}", endpoint);

    let service = Arc::new(HttpRecommendationClient::new(endpoint, timeout)?);
    let controller = RequestController::new(service, config.cards.placeholder_poster.clone());
    let presenter = MovieCardPresenter::from_config(&config.cards);
    let mut session = Session::new(controller, presenter, config.cards.columns, std::io::stdout());

    match options.prompt {
        Some(prompt) => {
            let shown = session.run_once(&prompt, options.json).await?;
            Ok(if shown { RunOutcome::Shown } else { RunOutcome::Failed })
        }
        None => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            session.run(stdin).await?;
            Ok(RunOutcome::Shown)
        }
    }
}
