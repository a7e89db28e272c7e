//! LLM-backed advisor specialist.

use std::sync::Arc;

use async_trait::async_trait;
use council_common::{CouncilError, Result, Specialist};
use council_llm::{complete_text, LlmClient};
use tracing::info;

use crate::decision::OptInJudge;

/// Static description of one advisor: who it is and how it answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisorProfile {
    pub name: String,
    pub description: String,
    pub system_prompt: String,
    /// Lead-in placed before the user's question
    pub instructions: String,
    /// Structure the answer should follow
    pub guidelines: String,
}

impl AdvisorProfile {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        system_prompt: impl Into<String>,
        instructions: impl Into<String>,
        guidelines: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            system_prompt: system_prompt.into(),
            instructions: instructions.into(),
            guidelines: guidelines.into(),
        }
    }

    fn advice_prompt(&self, user_prompt: &str) -> String {
        format!(
            "{}\n\nQuestion: {}\n\n{}",
            self.instructions, user_prompt, self.guidelines
        )
    }
}

/// A specialist whose judgment and content both come from the model.
pub struct AdvisorSpecialist {
    profile: AdvisorProfile,
    judge: OptInJudge,
    llm: Arc<dyn LlmClient>,
}

impl AdvisorSpecialist {
    pub fn new(profile: AdvisorProfile, llm: Arc<dyn LlmClient>) -> Self {
        let judge = OptInJudge::new(&profile.name, &profile.description);
        Self {
            profile,
            judge,
            llm,
        }
    }
}

#[async_trait]
impl Specialist for AdvisorSpecialist {
    fn name(&self) -> &str {
        &self.profile.name
    }

    fn description(&self) -> &str {
        &self.profile.description
    }

    async fn decide(&self, prompt: &str) -> Result<bool> {
        self.judge.decide(self.llm.as_ref(), prompt).await
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let content = complete_text(
            self.llm.as_ref(),
            Some(&self.profile.system_prompt),
            &self.profile.advice_prompt(prompt),
            false,
        )
        .await
        .map_err(|e| CouncilError::Generation(format!("{}: {}", self.profile.name, e)))?;

        info!(
            specialist = %self.profile.name,
            response_len = content.len(),
            "Advisor response generated"
        );
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_llm::{LlmRequest, LlmResponse};
    use std::sync::Mutex;

    /// Answers judgment prompts with `verdict` and everything else with
    /// `advice`, recording every request.
    struct ScriptedLlm {
        verdict: std::result::Result<&'static str, &'static str>,
        advice: std::result::Result<&'static str, &'static str>,
        requests: Mutex<Vec<LlmRequest>>,
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
            let is_judgment = request
                .system_prompt
                .as_deref()
                .is_some_and(|s| s.contains("only 'yes' or 'no'"));
            self.requests.lock().unwrap().push(request);

            let scripted = if is_judgment { self.verdict } else { self.advice };
            scripted
                .map(|content| LlmResponse {
                    content: content.to_string(),
                    model: "scripted".to_string(),
                    usage: None,
                    finish_reason: None,
                })
                .map_err(|e| CouncilError::Service(e.to_string()))
        }
        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    fn profile() -> AdvisorProfile {
        AdvisorProfile::new(
            "market_analyst",
            "Expert in market research",
            "You are a market analysis expert.",
            "Provide market analysis for the following question:",
            "Cover market size.",
        )
    }

    fn advisor(
        verdict: std::result::Result<&'static str, &'static str>,
        advice: std::result::Result<&'static str, &'static str>,
    ) -> (AdvisorSpecialist, Arc<ScriptedLlm>) {
        let llm = Arc::new(ScriptedLlm {
            verdict,
            advice,
            requests: Mutex::new(Vec::new()),
        });
        (AdvisorSpecialist::new(profile(), llm.clone()), llm)
    }

    #[tokio::test]
    async fn decide_uses_model_verdict() {
        let (yes, _) = advisor(Ok("Yes"), Ok("advice"));
        let (no, _) = advisor(Ok("no."), Ok("advice"));

        assert!(yes.decide("How big is the market?").await.unwrap());
        assert!(!no.decide("How big is the market?").await.unwrap());
    }

    #[tokio::test]
    async fn decide_failure_is_decision_error() {
        let (specialist, _) = advisor(Err("503 Service Unavailable"), Ok("advice"));

        let err = specialist.decide("question").await.unwrap_err();
        assert!(matches!(err, CouncilError::Decision(_)));
    }

    #[tokio::test]
    async fn ambiguous_verdict_opts_out() {
        let (specialist, _) = advisor(Ok("It depends"), Ok("advice"));
        assert!(!specialist.decide("question").await.unwrap());

        let (chatty, _) = advisor(Ok("Yes, this is about market size"), Ok("advice"));
        assert!(!chatty.decide("question").await.unwrap());
    }

    #[tokio::test]
    async fn generate_builds_prompt_from_profile() {
        let (specialist, llm) = advisor(Ok("yes"), Ok("The market is large."));

        let content = specialist.generate("Is there demand?").await.unwrap();
        assert_eq!(content, "The market is large.");

        let requests = llm.requests.lock().unwrap();
        let request = requests.last().unwrap();
        assert_eq!(
            request.system_prompt.as_deref(),
            Some("You are a market analysis expert.")
        );
        let user = &request.messages[0].content;
        assert!(user.contains("Question: Is there demand?"));
        assert!(user.ends_with("Cover market size."));
    }

    #[tokio::test]
    async fn generate_failure_is_generation_error() {
        let (specialist, _) = advisor(Ok("yes"), Err("401 Unauthorized"));

        let err = specialist.generate("question").await.unwrap_err();
        assert!(matches!(err, CouncilError::Generation(_)));
        assert!(err.to_string().contains("market_analyst"));
    }
}
