use crate::advisor::AdvisorProfile;

pub const NAME: &str = "technical_advisor";

const DESCRIPTION: &str =
    "Expert in technology, product development, and technical architecture for startups";

const SYSTEM_PROMPT: &str =
    "You are a technical advisor expert. Provide technical guidance for entrepreneurs.";

const INSTRUCTIONS: &str =
    "You are a technical advisor expert. Provide technical guidance for the following question:";

const GUIDELINES: &str = r#"Provide analysis covering:
1. Technical architecture considerations
2. Technology stack recommendations
3. Development approach and methodology
4. Technical risk assessment"#;

pub fn profile() -> AdvisorProfile {
    AdvisorProfile::new(NAME, DESCRIPTION, SYSTEM_PROMPT, INSTRUCTIONS, GUIDELINES)
}
