//! Shared User-Agent string for provider HTTP clients.
//!
//! Every tier sends the same header so mirror traffic is not fingerprintable
//! per backend.

/// Project URL for User-Agent identification (RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/fierce/topic-discovery";

/// Default User-Agent for provider search requests.
#[must_use]
pub(crate) fn default_provider_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("topic-discovery/{version} (education-tool; +{PROJECT_UA_URL})")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_user_agent_contains_version_and_url() {
        let ua = default_provider_user_agent();
        assert!(ua.contains(PROJECT_UA_URL), "UA must contain project URL: {ua}");
        assert_eq!(
            env!("CARGO_PKG_VERSION"),
            ua.strip_prefix("topic-discovery/")
                .and_then(|s| s.split(' ').next())
                .unwrap(),
            "UA must contain crate version"
        );
    }

    #[test]
    fn test_provider_user_agent_identifies_tool() {
        assert!(default_provider_user_agent().contains("education-tool"));
    }
}
