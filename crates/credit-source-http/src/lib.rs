// # HTTP Record Source
//
// This crate provides the HTTP record source for the credit monitor.
//
// ## Purpose
//
// Fetches the encrypted payload from the rating endpoint:
//
// ```http
// GET {api_url}?cecId={cec_id}
// ```
//
// The endpoint answers with a JSON envelope `{code, msg, data}` where `data`
// is the base64 ciphertext. A `code` other than `"0"` or an absent/empty
// `data` means there is nothing to process this run, which is reported as a
// source error (the engine aborts the run with the stored snapshot
// untouched).
//
// ## Transport Fallback
//
// Some deployments can only reach the endpoint through one of several HTTP
// proxies. [`FallbackRecordSource`] holds an ordered candidate list (the
// direct client first, then one client per proxy URL) and returns the first
// successful fetch; each failed candidate is logged and the next one tried.
// The engine itself never retries, so this is the only place a second
// attempt can happen.

use std::time::Duration;

use credit_core::ComponentRegistry;
use credit_core::config::SourceConfig;
use credit_core::traits::{RecordSource, RecordSourceFactory};
use credit_core::{Error, Result};
use serde::Deserialize;
use tracing::{debug, warn};

/// Response envelope of the rating endpoint
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Option<String>,
}

/// Pull the ciphertext out of an envelope, or say why there is none
fn extract_ciphertext(envelope: ApiEnvelope) -> Result<String> {
    if envelope.code != "0" {
        return Err(Error::source(format!(
            "endpoint returned code {:?}: {}",
            envelope.code, envelope.msg
        )));
    }
    match envelope.data {
        Some(data) if !data.is_empty() => Ok(data),
        _ => Err(Error::source("endpoint returned no data")),
    }
}

fn build_client(timeout: Duration, proxy: Option<&str>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().timeout(timeout);
    if let Some(proxy_url) = proxy {
        let proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|e| Error::config(format!("invalid proxy URL {:?}: {}", proxy_url, e)))?;
        builder = builder.proxy(proxy);
    }
    builder
        .build()
        .map_err(|e| Error::source(format!("failed to build HTTP client: {}", e)))
}

/// HTTP record source using a single client
pub struct HttpRecordSource {
    url: String,
    cec_id: String,
    client: reqwest::Client,
    /// Human label for logs ("direct" or the proxy URL)
    route: String,
}

impl HttpRecordSource {
    /// Create a source that connects directly
    pub fn new(url: impl Into<String>, cec_id: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            url: url.into(),
            cec_id: cec_id.into(),
            client: build_client(timeout, None)?,
            route: "direct".to_string(),
        })
    }

    /// Create a source that connects through an HTTP proxy
    pub fn via_proxy(
        url: impl Into<String>,
        cec_id: impl Into<String>,
        timeout: Duration,
        proxy_url: &str,
    ) -> Result<Self> {
        Ok(Self {
            url: url.into(),
            cec_id: cec_id.into(),
            client: build_client(timeout, Some(proxy_url))?,
            route: format!("proxy {}", proxy_url),
        })
    }

    /// Route label for logging
    pub fn route(&self) -> &str {
        &self.route
    }

    async fn fetch(&self) -> Result<String> {
        debug!("fetching credit payload via {}", self.route);

        let response = self
            .client
            .get(&self.url)
            .query(&[("cecId", self.cec_id.as_str())])
            .send()
            .await
            .map_err(|e| Error::source(format!("request failed ({}): {}", self.route, e)))?;

        if !response.status().is_success() {
            return Err(Error::source(format!(
                "endpoint returned HTTP {} ({})",
                response.status(),
                self.route
            )));
        }

        let envelope: ApiEnvelope = response
            .json()
            .await
            .map_err(|e| Error::source(format!("invalid envelope JSON ({}): {}", self.route, e)))?;

        extract_ciphertext(envelope)
    }
}

#[async_trait::async_trait]
impl RecordSource for HttpRecordSource {
    async fn fetch_ciphertext(&self) -> Result<String> {
        self.fetch().await
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

/// Sequential-candidate record source: first success wins
///
/// Candidates are tried in order; a failure is logged and the next candidate
/// tried. When every candidate fails, the last error is returned.
pub struct FallbackRecordSource {
    candidates: Vec<HttpRecordSource>,
}

impl FallbackRecordSource {
    /// Create a fallback source from an ordered candidate list
    pub fn new(candidates: Vec<HttpRecordSource>) -> Result<Self> {
        if candidates.is_empty() {
            return Err(Error::config("fallback source needs at least one candidate"));
        }
        Ok(Self { candidates })
    }

    /// Number of configured candidates
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Always false; construction rejects an empty candidate list
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[async_trait::async_trait]
impl RecordSource for FallbackRecordSource {
    async fn fetch_ciphertext(&self) -> Result<String> {
        let mut last_error = None;

        for candidate in &self.candidates {
            match candidate.fetch().await {
                Ok(ciphertext) => {
                    debug!("fetch succeeded via {}", candidate.route());
                    return Ok(ciphertext);
                }
                Err(e) => {
                    warn!("candidate {} failed: {}", candidate.route(), e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::source("no fetch candidates configured")))
    }

    fn source_name(&self) -> &'static str {
        "http-fallback"
    }
}

/// Factory for creating HTTP record sources
pub struct HttpSourceFactory;

impl RecordSourceFactory for HttpSourceFactory {
    fn create(&self, config: &SourceConfig) -> Result<Box<dyn RecordSource>> {
        match config {
            SourceConfig::Http {
                url,
                cec_id,
                proxies,
                timeout_secs,
            } => {
                let timeout = Duration::from_secs(*timeout_secs);
                let direct = HttpRecordSource::new(url.clone(), cec_id.clone(), timeout)?;

                if proxies.is_empty() {
                    return Ok(Box::new(direct));
                }

                let mut candidates = vec![direct];
                for proxy_url in proxies {
                    candidates.push(HttpRecordSource::via_proxy(
                        url.clone(),
                        cec_id.clone(),
                        timeout,
                        proxy_url,
                    )?);
                }
                Ok(Box::new(FallbackRecordSource::new(candidates)?))
            }
            _ => Err(Error::config("invalid config for HTTP record source")),
        }
    }
}

/// Register the HTTP record source with a registry
pub fn register(registry: &ComponentRegistry) {
    registry.register_source("http", Box::new(HttpSourceFactory));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_config(proxies: Vec<String>) -> SourceConfig {
        SourceConfig::Http {
            url: "http://endpoint.invalid/details".to_string(),
            cec_id: "org-1".to_string(),
            proxies,
            timeout_secs: 30,
        }
    }

    #[test]
    fn factory_creates_direct_source() {
        let source = HttpSourceFactory.create(&http_config(Vec::new()));
        assert!(source.is_ok());
        assert_eq!(source.unwrap().source_name(), "http");
    }

    #[test]
    fn factory_creates_fallback_chain_with_proxies() {
        let source = HttpSourceFactory
            .create(&http_config(vec!["http://proxy.invalid:3128".to_string()]))
            .unwrap();
        assert_eq!(source.source_name(), "http-fallback");
    }

    #[test]
    fn invalid_proxy_url_is_a_config_error() {
        let err = match HttpSourceFactory.create(&http_config(vec!["::not a url::".to_string()])) {
            Ok(_) => panic!("expected a config error"),
            Err(e) => e,
        };
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn envelope_with_data_yields_ciphertext() {
        let envelope: ApiEnvelope =
            serde_json::from_str(r#"{"code":"0","msg":"ok","data":"QUJD"}"#).unwrap();
        assert_eq!(extract_ciphertext(envelope).unwrap(), "QUJD");
    }

    #[test]
    fn nonzero_code_means_no_processing() {
        let envelope: ApiEnvelope =
            serde_json::from_str(r#"{"code":"500","msg":"internal error"}"#).unwrap();
        let err = extract_ciphertext(envelope).unwrap_err();
        assert!(matches!(err, Error::Source(_)));
    }

    #[test]
    fn missing_or_empty_data_means_no_processing() {
        let missing: ApiEnvelope = serde_json::from_str(r#"{"code":"0","msg":"ok"}"#).unwrap();
        assert!(extract_ciphertext(missing).is_err());

        let empty: ApiEnvelope =
            serde_json::from_str(r#"{"code":"0","msg":"ok","data":""}"#).unwrap();
        assert!(extract_ciphertext(empty).is_err());
    }

    #[test]
    fn fallback_rejects_empty_candidate_list() {
        assert!(FallbackRecordSource::new(Vec::new()).is_err());
    }
}
