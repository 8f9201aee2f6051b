//! Structure of the audit report the model is asked to produce.
//!
//! The heading text and order below are shared by the prompt template and by
//! any consumer that splits a report into sections, so they must stay stable.

use once_cell::sync::Lazy;
use regex::Regex;

/// Report headings, in the order the model is instructed to emit them.
pub const REPORT_SECTIONS: [&str; 6] = [
    "SECURITY SCORE",
    "CRITICAL VULNERABILITIES",
    "MEDIUM/LOW VULNERABILITIES",
    "GAS OPTIMIZATIONS",
    "CODE QUALITY",
    "RECOMMENDATIONS",
];

static SECTION_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"##\s+([A-Z /]+)").expect("valid section heading regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    pub title: String,
    pub body: String,
}

/// Split report text on `## HEADING` markers. Text before the first heading
/// is dropped; a report without headings yields no sections.
pub fn split_sections(report_text: &str) -> Vec<ReportSection> {
    let headings: Vec<_> = SECTION_HEADING.captures_iter(report_text).collect();
    let mut sections = Vec::with_capacity(headings.len());

    for (i, caps) in headings.iter().enumerate() {
        let (Some(whole), Some(title)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let body_end = headings
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(report_text.len());

        sections.push(ReportSection {
            title: title.as_str().trim().to_string(),
            body: report_text[whole.end()..body_end].trim().to_string(),
        });
    }

    sections
}

/// Expected headings that do not appear in the report.
pub fn missing_sections(report_text: &str) -> Vec<&'static str> {
    let present: Vec<String> = split_sections(report_text)
        .into_iter()
        .map(|s| s.title)
        .collect();

    REPORT_SECTIONS
        .iter()
        .copied()
        .filter(|expected| !present.iter().any(|title| title == expected))
        .collect()
}
