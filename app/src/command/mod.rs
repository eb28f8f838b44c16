//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy with its own input type, dispatched
//! statically from `main`.

use chatrs_config::Config;
use chatrs_conversation::{CompletionGateway, GenerationSettings};
use chatrs_core::CompletionProvider;
use chatrs_providers::OpenAiProvider;
use std::sync::Arc;
use tracing::info;

mod chat;
mod info;
mod init;
mod serve;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use serve::{ServeInput, ServeStrategy};
pub use version::VersionStrategy;

/// Build the completion gateway from config, optionally overriding the model.
fn build_gateway(config: &Config, model: Option<String>) -> anyhow::Result<CompletionGateway> {
    let openai = &config.providers.openai;
    let model = model.unwrap_or_else(|| openai.model.clone());

    let provider =
        OpenAiProvider::new(openai.timeout())?.with_base_url(openai.base_url.clone());

    info!(
        "Completion endpoint: {} (model {model}, max_tokens {}, timeout {}s)",
        openai.base_url, openai.max_tokens, openai.timeout_secs
    );

    let provider: Arc<dyn CompletionProvider> = Arc::new(provider);
    Ok(CompletionGateway::new(
        provider,
        GenerationSettings::deterministic(model, openai.max_tokens),
    ))
}

/// Core trait defining the contract for all command strategies.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}
