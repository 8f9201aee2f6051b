use crate::address::is_contract_address;
use crate::client::SourceFetcher;
use crate::envelope::unwrap_source;
use auditai_core::{AnalysisRequest, AuditError, Network, ResolvedSource, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Turns free-form input into analyzable source code.
#[derive(Clone)]
pub struct Resolver {
    fetcher: Arc<dyn SourceFetcher>,
}

impl Resolver {
    pub fn new(fetcher: Arc<dyn SourceFetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn resolve_request(&self, request: &AnalysisRequest) -> Result<ResolvedSource> {
        self.resolve(request.raw_input(), request.network()).await
    }

    /// Resolve `raw_input` for `network`.
    ///
    /// Address-form input is looked up once on the network's explorer; any
    /// other non-blank input is returned verbatim as literal source.
    pub async fn resolve(&self, raw_input: &str, network: Network) -> Result<ResolvedSource> {
        if raw_input.trim().is_empty() {
            return Err(AuditError::Input(
                "Contract address or source code is required".to_string(),
            ));
        }

        if !is_contract_address(raw_input) {
            debug!(len = raw_input.len(), "Input treated as literal source code");
            return Ok(ResolvedSource::literal(raw_input));
        }

        let fetched = self.fetcher.fetch_source(raw_input, network).await?;
        info!(
            address = raw_input,
            %network,
            contract = fetched.contract_name.as_deref().unwrap_or("unknown"),
            "Fetched verified source"
        );

        Ok(ResolvedSource::from_address(
            raw_input,
            unwrap_source(&fetched.source_code),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ContractSource;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Serves a canned source and records which lookups were made.
    struct StubFetcher {
        outcome: std::result::Result<String, String>,
        calls: AtomicUsize,
        last_network: Mutex<Option<Network>>,
    }

    impl StubFetcher {
        fn returning(source: &str) -> Arc<Self> {
            Arc::new(Self {
                outcome: Ok(source.to_string()),
                calls: AtomicUsize::new(0),
                last_network: Mutex::new(None),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                outcome: Err(message.to_string()),
                calls: AtomicUsize::new(0),
                last_network: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl SourceFetcher for StubFetcher {
        async fn fetch_source(&self, _address: &str, network: Network) -> Result<ContractSource> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_network.lock().unwrap() = Some(network);
            match &self.outcome {
                Ok(source) => Ok(ContractSource {
                    source_code: source.clone(),
                    contract_name: Some("C".to_string()),
                }),
                Err(message) => Err(AuditError::UpstreamFetch(message.clone())),
            }
        }
    }

    fn address() -> String {
        format!("0x{}", "a".repeat(40))
    }

    #[tokio::test]
    async fn test_blank_input_rejected() {
        let fetcher = StubFetcher::returning("contract C {}");
        let resolver = Resolver::new(fetcher.clone());

        for input in ["", "   "] {
            let err = resolver.resolve(input, Network::Ethereum).await.unwrap_err();
            assert!(matches!(err, AuditError::Input(_)));
        }
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_address_resolves_single_file_source() {
        let fetcher = StubFetcher::returning("contract C {}");
        let resolver = Resolver::new(fetcher.clone());

        let resolved = resolver.resolve(&address(), Network::Ethereum).await.unwrap();
        assert_eq!(resolved.source_text, "contract C {}");
        assert!(resolved.is_address);
        assert_eq!(resolved.original_address, Some(address()));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*fetcher.last_network.lock().unwrap(), Some(Network::Ethereum));
    }

    #[tokio::test]
    async fn test_literal_source_skips_lookup() {
        let fetcher = StubFetcher::returning("unused");
        let resolver = Resolver::new(fetcher.clone());
        let input = "contract C { function f() public {} }";

        let resolved = resolver.resolve(input, Network::Polygon).await.unwrap();
        assert!(!resolved.is_address);
        assert_eq!(resolved.source_text, input);
        assert!(resolved.original_address.is_none());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_multi_file_envelope_unwrapped() {
        let fetcher = StubFetcher::returning(
            r#"{"sources":{"A.sol":{"content":"contract A {}"},"B.sol":{"content":"contract B {}"}}}"#,
        );
        let resolver = Resolver::new(fetcher);

        let resolved = resolver.resolve(&address(), Network::Bsc).await.unwrap();
        assert_eq!(resolved.source_text, "contract A {}");
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let resolver = Resolver::new(StubFetcher::failing("not found"));

        let err = resolver
            .resolve(&address(), Network::Avalanche)
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::UpstreamFetch(ref m) if m == "not found"));
    }

    #[tokio::test]
    async fn test_resolve_request_uses_request_network() {
        let fetcher = StubFetcher::returning("contract C {}");
        let resolver = Resolver::new(fetcher.clone());
        let request = AnalysisRequest::new(address(), Network::Polygon).unwrap();

        resolver.resolve_request(&request).await.unwrap();
        assert_eq!(*fetcher.last_network.lock().unwrap(), Some(Network::Polygon));
    }
}
