//! Prompt templates for the conversation and the running summary.

/// Prefix used for the user's lines inside prompts and summaries.
pub const HUMAN_PREFIX: &str = "Human";

/// Prefix used for the model's lines inside prompts and summaries.
pub const AI_PREFIX: &str = "AI";

const CONVERSATION_PREAMBLE: &str = "The following is a friendly conversation between a human and an AI. \
The AI is talkative and provides lots of specific details from its context. \
If the AI does not know the answer to a question, it truthfully says it does not know.";

const SUMMARY_INSTRUCTIONS: &str = "Progressively summarize the lines of conversation provided, \
adding onto the previous summary and returning a new summary.";

const SUMMARY_EXAMPLE: &str = "EXAMPLE
Current summary:
The human asks what the AI thinks of artificial intelligence. The AI thinks artificial intelligence is a force for good.

New lines of conversation:
Human: Why do you think artificial intelligence is a force for good?
AI: Because artificial intelligence will help humans reach their full potential.

New summary:
The human asks what the AI thinks of artificial intelligence. The AI thinks artificial intelligence is a force for good because it will help humans reach their full potential.
END OF EXAMPLE";

/// Render one exchange as prompt lines.
#[must_use]
pub fn exchange_lines(user_input: &str, reply: &str) -> String {
    format!(
        "{HUMAN_PREFIX}: {user_input}\n{AI_PREFIX}: {}",
        reply.trim()
    )
}

/// Prompt for the next reply: the running summary stands in for the history.
#[must_use]
pub fn conversation_prompt(summary: &str, user_input: &str) -> String {
    format!(
        "{CONVERSATION_PREAMBLE}\n\nCurrent conversation:\n{summary}\n{HUMAN_PREFIX}: {user_input}\n{AI_PREFIX}:"
    )
}

/// Prompt asking the model to fold `new_lines` into `summary`.
#[must_use]
pub fn summary_prompt(summary: &str, new_lines: &str) -> String {
    format!(
        "{SUMMARY_INSTRUCTIONS}\n\n{SUMMARY_EXAMPLE}\n\nCurrent summary:\n{summary}\n\nNew lines of conversation:\n{new_lines}\n\nNew summary:"
    )
}
