//! Legal and compliance advisor.

use crate::advisor::AdvisorProfile;

pub const NAME: &str = "legal_advisor";

const DESCRIPTION: &str = "Expert in legal matters, compliance, and business law for startups";

const SYSTEM_PROMPT: &str =
    "You are a legal advisor expert. Provide legal guidance for entrepreneurs.";

const INSTRUCTIONS: &str =
    "You are a legal advisor expert. Provide legal guidance for the following question:";

const GUIDELINES: &str = r#"Provide analysis covering:
1. Legal considerations and requirements
2. Compliance and regulatory issues
3. Risk assessment and mitigation
4. Recommended legal steps"#;

pub fn profile() -> AdvisorProfile {
    AdvisorProfile::new(NAME, DESCRIPTION, SYSTEM_PROMPT, INSTRUCTIONS, GUIDELINES)
}
