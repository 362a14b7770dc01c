//! AI text polishing backed by a hosted chat-completion API.
//!
//! Failures never surface as request errors: the rewrite operations return a typed
//! [`AiError`] the handler reports alongside an empty result, and skill suggestions
//! degrade to an empty list.

mod client;
pub mod prompts;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

pub use client::ChatClient;

/// Upper bound on suggested skills.
pub const MAX_SUGGESTED_SKILLS: usize = 8;
const MAX_TOKENS: u32 = 300;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("unreadable response: {0}")]
    Parse(String),
    #[error("model returned empty content")]
    EmptyContent,
}

/// One prompt in, trimmed completion text out.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, AiError>;
}

pub struct AiAssistant {
    backend: Arc<dyn ChatBackend>,
}

impl AiAssistant {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    pub async fn improve_summary(&self, summary: &str) -> Result<String, AiError> {
        info!("✍️ Improving summary ({} chars)", summary.len());
        self.backend.complete(&prompts::improve_summary(summary), MAX_TOKENS).await
    }

    /// At most [`MAX_SUGGESTED_SKILLS`] suggestions; empty when the call fails.
    /// Blank entries in `skills` are left out of the prompt.
    pub async fn suggest_skills(&self, skills: &[String]) -> Vec<String> {
        let known: Vec<String> = skills
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let prompt = prompts::suggest_skills(&known, MAX_SUGGESTED_SKILLS);
        match self.backend.complete(&prompt, MAX_TOKENS).await {
            Ok(raw) => {
                let suggestions = parse_skill_list(&raw);
                info!("💡 Suggested {} skills", suggestions.len());
                suggestions
            }
            Err(e) => {
                warn!("⚠️ Skill suggestion failed, returning none: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn improve_project(&self, description: &str) -> Result<String, AiError> {
        info!("✍️ Improving project description ({} chars)", description.len());
        self.backend.complete(&prompts::improve_project(description), MAX_TOKENS).await
    }
}

fn parse_skill_list(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(MAX_SUGGESTED_SKILLS)
        .map(str::to_string)
        .collect()
}


#[cfg(test)]
mod tests {
    use super::test_support::ScriptedBackend;
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn suggest_skills_degrades_to_empty_on_failure() {
        let assistant = AiAssistant::new(Arc::new(ScriptedBackend::failing()));
        let skills: Vec<String> = (1..=10).map(|i| format!("skill-{i}")).collect();
        assert!(assistant.suggest_skills(&skills).await.is_empty());
    }

    #[tokio::test]
    async fn suggest_skills_splits_and_caps() {
        let backend = Arc::new(ScriptedBackend::replying(
            "Docker, Kubernetes\nTerraform,, AWS, GCP, Kafka, Redis, GraphQL, gRPC, WebAssembly",
        ));
        let assistant = AiAssistant::new(backend.clone());
        let suggestions = assistant.suggest_skills(&["Rust".into()]).await;
        assert_eq!(
            suggestions,
            vec!["Docker", "Kubernetes", "Terraform", "AWS", "GCP", "Kafka", "Redis", "GraphQL"]
        );
        assert!(backend.prompts.lock().unwrap()[0].contains("(Rust)"));
    }

    #[tokio::test]
    async fn blank_skills_stay_out_of_the_prompt() {
        let backend = Arc::new(ScriptedBackend::replying("Go"));
        let assistant = AiAssistant::new(backend.clone());
        assistant.suggest_skills(&["Rust".into(), "  ".into(), String::new(), "SQL".into()]).await;
        assert!(backend.prompts.lock().unwrap()[0].contains("(Rust, SQL)"));
    }

    #[tokio::test]
    async fn rewrite_failures_are_typed() {
        let assistant = AiAssistant::new(Arc::new(ScriptedBackend::failing()));
        let err = assistant.improve_summary("Engineer").await.unwrap_err();
        assert!(matches!(err, AiError::Api { status: 503, .. }));
        assert!(assistant.improve_project("Built things").await.is_err());
    }

    #[tokio::test]
    async fn rewrites_pass_the_reply_through() {
        let backend = Arc::new(ScriptedBackend::replying("• Shipped a parser"));
        let assistant = AiAssistant::new(backend.clone());
        assert_eq!(assistant.improve_project("wrote a parser").await.unwrap(), "• Shipped a parser");
        assert!(backend.prompts.lock().unwrap()[0].ends_with("wrote a parser"));
    }

    #[test]
    fn skill_list_parsing_ignores_blanks() {
        assert_eq!(parse_skill_list(" , \n "), Vec::<String>::new());
        assert_eq!(parse_skill_list("Rust"), vec!["Rust"]);
    }
}
