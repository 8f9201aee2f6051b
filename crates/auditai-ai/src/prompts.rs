//! Audit prompt template.

use auditai_core::REPORT_SECTIONS;

const PREAMBLE: &str = "You are AuditAI, an expert smart contract security auditor.
Analyze the following smart contract code for security vulnerabilities, gas optimizations,
and best practice recommendations. Format your response as follows:";

/// Instruction shown under each heading, aligned with `REPORT_SECTIONS`.
const SECTION_INSTRUCTIONS: [&str; 6] = [
    "[Provide a score from 1-10, where 10 is most secure]",
    "[List any critical security issues with code references]",
    "[List any medium or low severity issues with code references]",
    "[Suggest optimizations to reduce gas costs]",
    "[Comment on code quality, readability and best practices]",
    "[Provide specific recommendations to improve the contract]",
];

/// Build the audit prompt for `source_text`. The source is embedded verbatim.
pub fn build_audit_prompt(source_text: &str) -> String {
    let mut prompt = String::with_capacity(source_text.len() + 1024);
    prompt.push_str(PREAMBLE);
    prompt.push_str("\n\n");

    for (heading, instruction) in REPORT_SECTIONS.iter().zip(SECTION_INSTRUCTIONS) {
        prompt.push_str("## ");
        prompt.push_str(heading);
        prompt.push('\n');
        prompt.push_str(instruction);
        prompt.push_str("\n\n");
    }

    prompt.push_str("Here's the smart contract code:\n```\n");
    prompt.push_str(source_text);
    prompt.push_str("\n```\n");
    prompt
}
