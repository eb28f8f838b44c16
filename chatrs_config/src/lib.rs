mod schema;

pub use schema::{API_KEY_ENV, Config, OpenAiConfig, ProvidersConfig, WebConfig};
