use crate::advisor::AdvisorProfile;

pub const NAME: &str = "financial_advisor";

const DESCRIPTION: &str =
    "Expert in financial planning, funding strategies, and financial modeling for startups";

const SYSTEM_PROMPT: &str =
    "You are a financial advisor expert. Provide financial guidance for entrepreneurs.";

const INSTRUCTIONS: &str =
    "You are a financial advisor expert. Provide financial advice for the following question:";

const GUIDELINES: &str = r#"Provide analysis covering:
1. Financial planning considerations
2. Funding options and strategies
3. Financial modeling insights
4. Risk assessment and mitigation"#;

pub fn profile() -> AdvisorProfile {
    AdvisorProfile::new(NAME, DESCRIPTION, SYSTEM_PROMPT, INSTRUCTIONS, GUIDELINES)
}
