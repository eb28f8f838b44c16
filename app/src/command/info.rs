use chatrs_config::{API_KEY_ENV, Config};

/// Strategy for displaying configuration information.
///
/// The API key is only ever shown masked.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let openai = &config.providers.openai;

        println!("=== chatrs Configuration ===\n");

        println!("Completion Endpoint:");
        println!("  Base URL: {}", openai.base_url);
        println!("  Model: {}", openai.model);
        println!("  Max Tokens: {}", openai.max_tokens);
        println!("  Timeout: {}s", openai.timeout_secs);
        println!(
            "  Default API Key: {} (override with {API_KEY_ENV})",
            config.default_credential().masked()
        );
        println!();

        println!("Web:");
        println!("  Address: {}:{}", config.web.host, config.web.port);
        println!("  Session Idle Timeout: {}s", config.web.session_idle_secs);
        println!("  Secure Cookies: {}", config.web.secure_cookies);

        Ok(())
    }
}
