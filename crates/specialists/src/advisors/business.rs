//! Business strategy advisor.

use crate::advisor::AdvisorProfile;

pub const NAME: &str = "business_strategist";

const DESCRIPTION: &str = "Expert in business strategy, market positioning, and competitive analysis for startups and entrepreneurs";

const SYSTEM_PROMPT: &str =
    "You are a business strategy expert. Provide actionable business advice for entrepreneurs.";

const INSTRUCTIONS: &str = "You are a business strategy expert. Provide comprehensive business advice for the following question:";

const GUIDELINES: &str = r#"Provide a structured response with:
1. Key insights
2. Actionable steps
3. Potential challenges
4. Success metrics"#;

pub fn profile() -> AdvisorProfile {
    AdvisorProfile::new(NAME, DESCRIPTION, SYSTEM_PROMPT, INSTRUCTIONS, GUIDELINES)
}
