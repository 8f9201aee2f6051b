use crate::error::{AuditError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// EVM network whose block explorer is queried for verified source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Ethereum,
    Bsc,
    Polygon,
    Avalanche,
}

impl Network {
    pub const ALL: [Network; 4] = [
        Network::Ethereum,
        Network::Bsc,
        Network::Polygon,
        Network::Avalanche,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Ethereum => "ethereum",
            Network::Bsc => "bsc",
            Network::Polygon => "polygon",
            Network::Avalanche => "avalanche",
        }
    }

    /// Parse a network name, falling back to Ethereum for anything unknown.
    pub fn from_name_lenient(name: &str) -> Self {
        match name.parse() {
            Ok(network) => network,
            Err(_) => {
                tracing::warn!(network = name, "Unknown network, falling back to ethereum");
                Network::Ethereum
            }
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ethereum" => Ok(Network::Ethereum),
            "bsc" => Ok(Network::Bsc),
            "polygon" => Ok(Network::Polygon),
            "avalanche" => Ok(Network::Avalanche),
            other => Err(AuditError::Input(format!(
                "Unknown network: {}. Must be one of: ethereum, bsc, polygon, avalanche",
                other
            ))),
        }
    }
}

/// One user submission: a contract address or literal source, plus a network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    raw_input: String,
    network: Network,
}

impl AnalysisRequest {
    pub fn new(raw_input: impl Into<String>, network: Network) -> Result<Self> {
        let raw_input = raw_input.into();
        if raw_input.trim().is_empty() {
            return Err(AuditError::Input(
                "Contract address or source code is required".to_string(),
            ));
        }
        Ok(Self { raw_input, network })
    }

    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    pub fn network(&self) -> Network {
        self.network
    }
}

/// Source code ready to be embedded into a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub source_text: String,
    pub is_address: bool,
    pub original_address: Option<String>,
}

impl ResolvedSource {
    pub fn literal(source_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            is_address: false,
            original_address: None,
        }
    }

    pub fn from_address(address: impl Into<String>, source_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            is_address: true,
            original_address: Some(address.into()),
        }
    }
}

/// Outcome of one completed pipeline run, as returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub report_text: String,
    pub address: Option<String>,
    pub network: Option<String>,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_score: Option<u8>,
}
