use crate::types::{AnalysisResult, Network, ResolvedSource};
use chrono::{SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static SECURITY_SCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"## SECURITY SCORE\s+(\d+)").expect("valid security score regex"));

/// Bundle model output with echo metadata for the caller.
///
/// Address and network are echoed only for address-form submissions.
pub fn package(report_text: String, resolved: &ResolvedSource, network: Network) -> AnalysisResult {
    let security_score = extract_security_score(&report_text);
    let (address, network) = match &resolved.original_address {
        Some(address) if resolved.is_address => {
            (Some(address.clone()), Some(network.as_str().to_string()))
        }
        _ => (None, None),
    };

    AnalysisResult {
        report_text,
        address,
        network,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        security_score,
    }
}

/// Score from a `## SECURITY SCORE <n>` marker, if present and within 1-10.
pub fn extract_security_score(report_text: &str) -> Option<u8> {
    let caps = SECURITY_SCORE.captures(report_text)?;
    let score: u8 = caps.get(1)?.as_str().parse().ok()?;
    (1..=10).contains(&score).then_some(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_score_extraction() {
        assert_eq!(extract_security_score("## SECURITY SCORE\n7"), Some(7));
        assert_eq!(extract_security_score("## SECURITY SCORE   10/10"), Some(10));
        assert_eq!(
            extract_security_score("preamble\n## SECURITY SCORE\n\n3\n## CRITICAL"),
            Some(3)
        );
    }

    #[test]
    fn test_score_absent_or_invalid() {
        assert_eq!(extract_security_score("no marker here"), None);
        assert_eq!(extract_security_score("## SECURITY SCORE\n[score]"), None);
        assert_eq!(extract_security_score("## SECURITY SCORE\n0"), None);
        assert_eq!(extract_security_score("## SECURITY SCORE\n42"), None);
        assert_eq!(
            extract_security_score("## SECURITY SCORE\n99999999999999999999"),
            None
        );
    }

    #[test]
    fn test_package_address_submission() {
        let address = format!("0x{}", "a".repeat(40));
        let resolved = ResolvedSource::from_address(address.clone(), "contract C {}");
        let result = package("## SECURITY SCORE\n6".to_string(), &resolved, Network::Bsc);

        assert_eq!(result.address.as_deref(), Some(address.as_str()));
        assert_eq!(result.network.as_deref(), Some("bsc"));
        assert_eq!(result.security_score, Some(6));
        assert!(result.timestamp.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&result.timestamp).is_ok());
    }

    #[test]
    fn test_package_literal_submission_has_no_echo() {
        let resolved = ResolvedSource::literal("contract C {}");
        let result = package("plain text".to_string(), &resolved, Network::Polygon);

        assert_eq!(result.report_text, "plain text");
        assert!(result.address.is_none());
        assert!(result.network.is_none());
        assert!(result.security_score.is_none());
    }
}
