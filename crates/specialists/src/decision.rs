//! Opt-in judgment: asks the model whether a specialist should answer.

use council_common::{CouncilError, Result};
use council_llm::{complete_text, LlmClient};
use tracing::{debug, warn};

/// Builds the yes/no judgment prompt for one specialist and interprets the
/// model's answer.
#[derive(Debug, Clone)]
pub struct OptInJudge {
    specialist: String,
    description: String,
}

impl OptInJudge {
    pub fn new(specialist: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            specialist: specialist.into(),
            description: description.into(),
        }
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are a {} expert. Respond with only 'yes' or 'no'.",
            self.specialist
        )
    }

    fn decision_prompt(&self, user_prompt: &str) -> String {
        format!(
            "You are a {name} expert. Based on the user's question, decide if you should provide advice.\n\n\
             Expert Description: {description}\n\
             User Question: {user_prompt}\n\n\
             Respond with only 'yes' or 'no' based on whether this question requires {name} expertise.",
            name = self.specialist,
            description = self.description,
        )
    }

    /// Ask the model. A failed call is a [`CouncilError::Decision`]; an answer
    /// that is neither yes nor no opts out.
    pub async fn decide(&self, llm: &dyn LlmClient, user_prompt: &str) -> Result<bool> {
        let answer = complete_text(
            llm,
            Some(&self.system_prompt()),
            &self.decision_prompt(user_prompt),
            false,
        )
        .await
        .map_err(|e| {
            CouncilError::Decision(format!("{} could not decide: {}", self.specialist, e))
        })?;

        match parse_decision(&answer) {
            Some(decision) => {
                debug!(specialist = %self.specialist, answer = %answer.trim(), decision, "Opt-in decision");
                Ok(decision)
            }
            None => {
                warn!(
                    specialist = %self.specialist,
                    answer = %answer.trim(),
                    "Ambiguous opt-in answer, opting out"
                );
                Ok(false)
            }
        }
    }
}

/// Interpret a yes/no answer. The whole trimmed answer must be the verdict,
/// ignoring case, quotes and trailing punctuation.
pub fn parse_decision(answer: &str) -> Option<bool> {
    let verdict = answer
        .trim()
        .trim_start_matches(['"', '\''])
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .to_lowercase();

    match verdict.as_str() {
        "yes" | "true" | "1" => Some(true),
        "no" | "false" | "0" => Some(false),
        _ => None,
    }
}
