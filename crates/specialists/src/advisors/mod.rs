//! The five default advisors.

pub mod business;
pub mod finance;
pub mod legal;
pub mod market;
pub mod technical;

use crate::advisor::AdvisorProfile;

/// Profiles of every default advisor, in registration order.
pub fn default_profiles() -> Vec<AdvisorProfile> {
    vec![
        business::profile(),
        market::profile(),
        finance::profile(),
        legal::profile(),
        technical::profile(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn default_profiles_have_unique_names() {
        let profiles = default_profiles();
        let names: HashSet<_> = profiles.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(profiles.len(), 5);
        assert_eq!(names.len(), 5);
        assert!(names.contains("business_strategist"));
        assert!(names.contains("technical_advisor"));
    }

    #[test]
    fn every_profile_asks_for_structure() {
        for profile in default_profiles() {
            assert!(!profile.description.is_empty(), "{}", profile.name);
            assert!(profile.guidelines.contains("1."), "{}", profile.name);
            assert!(profile.instructions.contains("following question"), "{}", profile.name);
        }
    }
}
