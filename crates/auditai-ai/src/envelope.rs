//! Decoding of generative model response bodies.
//!
//! Providers have returned text in several envelope shapes over time. Each
//! known shape is a named variant; anything else decodes to `Unrecognized`
//! rather than failing.

use serde::Deserialize;
use serde_json::Value;

/// Report text used when the response shape is not one we know.
pub const UNRECOGNIZED_RESPONSE: &str = "Response structure not recognized";
/// Report text used when a known shape carries no text.
pub const NO_RESPONSE: &str = "No response generated.";

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ModelEnvelope {
    /// `{"response": ...}`: a nested response object (or plain string).
    Wrapped { response: NestedResponse },
    /// `{"candidates": [{"content": {"parts": [{"text": ...}]}}]}`
    Candidates { candidates: Vec<Candidate> },
    /// `{"text": ...}`
    Direct { text: String },
    Unrecognized(Value),
}

/// Value under a `response` key. Anything that is neither a string nor a
/// known envelope fails to decode, so `Wrapped` does not match and the
/// remaining shapes are tried.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NestedResponse {
    Text(String),
    Envelope(Box<KnownEnvelope>),
}

/// The shapes of `ModelEnvelope` without the `Unrecognized` fallback.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum KnownEnvelope {
    Wrapped { response: NestedResponse },
    Candidates { candidates: Vec<Candidate> },
    Direct { text: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ContentPart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentPart {
    #[serde(default)]
    pub text: Option<String>,
}

/// Outcome of reading text out of an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeText {
    Text(String),
    /// A known shape without any text in it
    Missing,
    Unrecognized,
}

impl EnvelopeText {
    /// Text for the report, substituting the fixed messages when absent.
    pub fn into_report_text(self) -> String {
        match self {
            EnvelopeText::Text(text) => text,
            EnvelopeText::Missing => NO_RESPONSE.to_string(),
            EnvelopeText::Unrecognized => UNRECOGNIZED_RESPONSE.to_string(),
        }
    }
}

impl ModelEnvelope {
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or(ModelEnvelope::Unrecognized(value))
    }

    pub fn shape(&self) -> &'static str {
        match self {
            ModelEnvelope::Wrapped { .. } => "wrapped",
            ModelEnvelope::Candidates { .. } => "candidates",
            ModelEnvelope::Direct { .. } => "direct",
            ModelEnvelope::Unrecognized(_) => "unrecognized",
        }
    }

    /// Finish reason of the first candidate, where the shape carries one.
    pub fn finish_reason(&self) -> Option<&str> {
        match self {
            ModelEnvelope::Wrapped { response } => response.finish_reason(),
            ModelEnvelope::Candidates { candidates } => first_finish_reason(candidates),
            _ => None,
        }
    }

    pub fn into_text(self) -> EnvelopeText {
        match self {
            ModelEnvelope::Wrapped { response } => response.into_text(),
            ModelEnvelope::Candidates { candidates } => first_candidate_text(candidates),
            ModelEnvelope::Direct { text } => non_empty(text),
            ModelEnvelope::Unrecognized(_) => EnvelopeText::Unrecognized,
        }
    }
}

impl NestedResponse {
    fn finish_reason(&self) -> Option<&str> {
        match self {
            NestedResponse::Text(_) => None,
            NestedResponse::Envelope(inner) => match inner.as_ref() {
                KnownEnvelope::Wrapped { response } => response.finish_reason(),
                KnownEnvelope::Candidates { candidates } => first_finish_reason(candidates),
                KnownEnvelope::Direct { .. } => None,
            },
        }
    }

    fn into_text(self) -> EnvelopeText {
        match self {
            NestedResponse::Text(text) => non_empty(text),
            NestedResponse::Envelope(inner) => match *inner {
                KnownEnvelope::Wrapped { response } => response.into_text(),
                KnownEnvelope::Candidates { candidates } => first_candidate_text(candidates),
                KnownEnvelope::Direct { text } => non_empty(text),
            },
        }
    }
}

fn first_finish_reason(candidates: &[Candidate]) -> Option<&str> {
    candidates.first()?.finish_reason.as_deref()
}

fn first_candidate_text(candidates: Vec<Candidate>) -> EnvelopeText {
    candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .map(non_empty)
        .unwrap_or(EnvelopeText::Missing)
}

fn non_empty(text: String) -> EnvelopeText {
    if text.is_empty() {
        EnvelopeText::Missing
    } else {
        EnvelopeText::Text(text)
    }
}
