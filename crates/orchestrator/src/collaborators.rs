//! Text collaborators the stages delegate to: translation, summarization and
//! follow-up generation.

use std::sync::Arc;

use async_trait::async_trait;
use council_common::{CouncilError, Followup, Result, SpecialistOutcome};
use council_llm::{complete_text, LlmClient};
use serde::Deserialize;
use tracing::debug;

#[async_trait]
pub trait Translator: Send + Sync {
    /// Language code of `text`.
    async fn detect(&self, text: &str) -> Result<String>;

    async fn translate(&self, text: &str, from: &str, to: &str) -> Result<String>;
}

/// Reports a fixed language and returns text unchanged.
#[derive(Debug, Clone)]
pub struct PassthroughTranslator {
    language: String,
}

impl PassthroughTranslator {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }
}

impl Default for PassthroughTranslator {
    fn default() -> Self {
        Self::new("en")
    }
}

#[async_trait]
impl Translator for PassthroughTranslator {
    async fn detect(&self, _text: &str) -> Result<String> {
        Ok(self.language.clone())
    }

    async fn translate(&self, text: &str, _from: &str, _to: &str) -> Result<String> {
        Ok(text.to_string())
    }
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Merge the completed specialists' answers into one reply to `question`.
    /// Only called with at least one contribution.
    async fn summarize(&self, question: &str, contributions: &[&SpecialistOutcome])
        -> Result<String>;
}

const SUMMARY_INSTRUCTIONS: &str = r#"Provide a comprehensive summary that:
1. Addresses the user's question directly
2. Combines the best insights from all experts
3. Provides clear, actionable steps
4. Maintains a supportive and encouraging tone
5. Is well-structured and easy to follow"#;

pub struct LlmSummarizer {
    llm: Arc<dyn LlmClient>,
}

impl LlmSummarizer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    fn prompt(question: &str, contributions: &[&SpecialistOutcome]) -> String {
        let responses = contributions
            .iter()
            .map(|o| format!("Expert {}: {}", o.name, o.content))
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            "You are an AI coach for entrepreneurs. Summarize and synthesize the following expert \
             responses into a cohesive, actionable response.\n\n\
             Original Question: {question}\n\n\
             Expert Responses:\n{responses}\n\n\
             {SUMMARY_INSTRUCTIONS}"
        )
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(
        &self,
        question: &str,
        contributions: &[&SpecialistOutcome],
    ) -> Result<String> {
        debug!(contributions = contributions.len(), "Summarizing specialist responses");
        complete_text(
            self.llm.as_ref(),
            None,
            &Self::prompt(question, contributions),
            false,
        )
        .await
    }
}

#[async_trait]
pub trait FollowupGenerator: Send + Sync {
    async fn followups(&self, question: &str, summary: &str) -> Result<Vec<Followup>>;
}

/// Used when follow-up generation fails.
pub fn fallback_followups() -> Vec<Followup> {
    vec![
        Followup::new(
            "Would you like me to elaborate on any specific aspect?",
            "clarification",
        ),
        Followup::new("What's your next immediate step?", "action_planning"),
        Followup::new(
            "Do you have any concerns about implementing this advice?",
            "concerns",
        ),
    ]
}

pub struct LlmFollowupGenerator {
    llm: Arc<dyn LlmClient>,
}

impl LlmFollowupGenerator {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    fn prompt(question: &str, summary: &str) -> String {
        format!(
            "Based on the user's question and the response provided, generate 3 relevant \
             follow-up questions that would help the user further.\n\n\
             Original Question: {question}\n\
             Response: {summary}\n\n\
             Generate follow-up questions that:\n\
             1. Are specific and actionable\n\
             2. Help the user dive deeper into the topic\n\
             3. Address potential next steps\n\
             4. Are relevant to their business context\n\n\
             Return as JSON array with objects containing 'question' and 'category' fields."
        )
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FollowupPayload {
    List(Vec<Followup>),
    Questions { questions: Vec<Followup> },
    Followups { followups: Vec<Followup> },
}

/// Parse a model reply into follow-ups. Accepts a bare array or an object
/// wrapping it under `questions` or `followups`.
pub fn parse_followups(raw: &str) -> Result<Vec<Followup>> {
    let trimmed = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let payload: FollowupPayload = serde_json::from_str(trimmed)
        .map_err(|e| CouncilError::Service(format!("unparseable follow-ups: {e}")))?;

    Ok(match payload {
        FollowupPayload::List(list) => list,
        FollowupPayload::Questions { questions } => questions,
        FollowupPayload::Followups { followups } => followups,
    })
}

#[async_trait]
impl FollowupGenerator for LlmFollowupGenerator {
    async fn followups(&self, question: &str, summary: &str) -> Result<Vec<Followup>> {
        let raw = complete_text(
            self.llm.as_ref(),
            None,
            &Self::prompt(question, summary),
            true,
        )
        .await?;
        parse_followups(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_llm::{LlmRequest, LlmResponse};
    use std::sync::Mutex;

    struct CannedLlm {
        reply: &'static str,
        seen: Mutex<Vec<LlmRequest>>,
    }

    impl CannedLlm {
        fn new(reply: &'static str) -> Arc<Self> {
            Arc::new(Self {
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmClient for CannedLlm {
        async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
            self.seen.lock().unwrap().push(request);
            Ok(LlmResponse {
                content: self.reply.to_string(),
                model: "canned".to_string(),
                usage: None,
                finish_reason: None,
            })
        }
        fn model_name(&self) -> &str {
            "canned"
        }
    }

    #[test]
    fn parses_bare_array_with_default_category() {
        let parsed = parse_followups(
            r#"[{"question": "What is your budget?", "category": "finance"}, {"question": "Who are your customers?"}]"#,
        )
        .unwrap();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].category, "finance");
        assert_eq!(parsed[1].category, "general");
    }

    #[test]
    fn parses_wrapped_and_fenced_payloads() {
        let wrapped = parse_followups(r#"{"questions": [{"question": "Next?"}]}"#).unwrap();
        assert_eq!(wrapped[0].question, "Next?");

        let fenced =
            parse_followups("```json\n{\"followups\": [{\"question\": \"Why?\"}]}\n```").unwrap();
        assert_eq!(fenced[0].question, "Why?");
    }

    #[test]
    fn rejects_non_json() {
        assert!(parse_followups("Here are some questions: ...").is_err());
    }

    #[test]
    fn fallback_has_three_categories() {
        let categories: Vec<String> = fallback_followups().into_iter().map(|f| f.category).collect();
        assert_eq!(categories, vec!["clarification", "action_planning", "concerns"]);
    }

    #[tokio::test]
    async fn summarizer_includes_every_contribution() {
        let llm = CannedLlm::new("combined advice");
        let summarizer = LlmSummarizer::new(llm.clone());

        let a = SpecialistOutcome::pending("market_analyst").start().completed(
            "big market",
            0.5,
            chrono::Utc::now(),
        );
        let b = SpecialistOutcome::pending("legal_advisor").start().completed(
            "form an LLC",
            0.7,
            chrono::Utc::now(),
        );

        let summary = summarizer.summarize("Should I launch?", &[&a, &b]).await.unwrap();
        assert_eq!(summary, "combined advice");

        let seen = llm.seen.lock().unwrap();
        let prompt = &seen[0].messages[0].content;
        assert!(prompt.contains("Original Question: Should I launch?"));
        assert!(prompt.contains("Expert market_analyst: big market"));
        assert!(prompt.contains("Expert legal_advisor: form an LLC"));
    }

    #[tokio::test]
    async fn followup_generator_requests_json() {
        let llm = CannedLlm::new(r#"[{"question": "How will you fund it?", "category": "funding"}]"#);
        let generator = LlmFollowupGenerator::new(llm.clone());

        let followups = generator.followups("q", "summary").await.unwrap();
        assert_eq!(followups, vec![Followup::new("How will you fund it?", "funding")]);
        assert!(llm.seen.lock().unwrap()[0].json_mode);
    }

    #[tokio::test]
    async fn passthrough_translator_is_identity() {
        let translator = PassthroughTranslator::new("de");
        assert_eq!(translator.detect("Hallo").await.unwrap(), "de");
        assert_eq!(translator.translate("Hallo", "de", "en").await.unwrap(), "Hallo");
    }
}
