//! Terminal conversation against the same gateway the web app uses.

use chatrs_config::Config;
use chatrs_conversation::{CompletionGateway, ConversationSession};
use std::io::Write;
use tracing::info;

use super::build_gateway;

const SUMMARY_HEADER: &str = "Nice chatting with you! :";

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Optional single message to send (non-interactive mode)
    pub message: Option<String>,
    /// Optional model override
    pub model: Option<String>,
}

/// Strategy for chatting from the terminal.
///
/// Uses the API key from config or `OPENAI_API_KEY`; the session lives only
/// as long as the process.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load_or_default()?;
        let credential = config.default_credential();
        if credential.is_empty() {
            anyhow::bail!(
                "No API key configured. Set {} or add one with 'chatrs init'.",
                chatrs_config::API_KEY_ENV
            );
        }

        let gateway = build_gateway(&config, input.model)?;
        let mut session = ConversationSession::new().with_credential(credential);
        info!("Starting terminal session: {}", session.id);

        if let Some(msg) = input.message {
            let result = gateway.process_turn(&mut session, &msg).await?;
            println!("{}", result.reply.trim());
        } else {
            run_interactive(&gateway, &mut session).await?;
        }

        session.teardown();
        Ok(())
    }
}

async fn run_interactive(
    gateway: &CompletionGateway,
    session: &mut ConversationSession,
) -> anyhow::Result<()> {
    println!("=== How can I help you? ===");
    println!("Type '/summary' for a summary, 'exit' or 'quit' to end.\n");

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if matches!(input, "exit" | "quit" | "q") {
            break;
        }

        if input.is_empty() {
            continue;
        }

        if input == "/summary" {
            match session.summarize() {
                Ok(summary) => println!("\n{SUMMARY_HEADER}\n\n{summary}\n"),
                Err(e) => eprintln!("{e}"),
            }
            continue;
        }

        match gateway.process_turn(session, input).await {
            Ok(result) => println!("\n{}\n", result.reply.trim()),
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    println!("\nSession ended. Total turns: {}", session.turn_count());
    Ok(())
}
