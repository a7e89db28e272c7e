//! Market research advisor.

use crate::advisor::AdvisorProfile;

pub const NAME: &str = "market_analyst";

const DESCRIPTION: &str =
    "Expert in market research, competitive analysis, and market opportunity assessment";

const SYSTEM_PROMPT: &str =
    "You are a market analysis expert. Provide insights on market research and analysis.";

const INSTRUCTIONS: &str =
    "You are a market analysis expert. Provide market analysis for the following question:";

const GUIDELINES: &str = r#"Provide analysis covering:
1. Market size and opportunity
2. Competitive landscape
3. Target audience insights
4. Market entry strategies"#;

pub fn profile() -> AdvisorProfile {
    AdvisorProfile::new(NAME, DESCRIPTION, SYSTEM_PROMPT, INSTRUCTIONS, GUIDELINES)
}
