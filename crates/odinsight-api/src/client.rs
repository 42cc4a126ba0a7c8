// Upstream HTTP client
//
// Wraps one shared `reqwest::Client` and issues probe and data requests
// against any `SourceDescriptor`. Decoding picks the wire shape from the
// descriptor's `SourceKind`; turning payloads into domain values is left to
// `odinsight-core`.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{
    IcpHolders, IcpSeries, IcpSummary, MempoolStatPoint, MempoolStatistics, SeriesPayload,
    SummaryPayload, WireTransactions,
};
use crate::source::{Query, SourceDescriptor, SourceKind};
use crate::transport::TransportConfig;

/// Raw HTTP client for the registered upstream providers.
#[derive(Debug, Clone)]
pub struct SourceClient {
    http: reqwest::Client,
    timeout: Duration,
    probe_timeout: Duration,
}

impl SourceClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            timeout: transport.timeout,
            probe_timeout: transport.probe_timeout,
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, timeout: Duration, probe_timeout: Duration) -> Self {
        Self {
            http,
            timeout,
            probe_timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    // ── Probe ────────────────────────────────────────────────────────

    /// Check whether a source answers its summary endpoint with a 2xx
    /// within the probe timeout. Never fails: every error is `false`.
    pub async fn probe(&self, source: &SourceDescriptor) -> bool {
        let url = match source.url_for(Query::Summary) {
            Ok(url) => url,
            Err(e) => {
                debug!(source = %source.name, error = %e, "probe skipped: bad URL");
                return false;
            }
        };

        trace!(source = %source.name, %url, "probing");
        let request = self.request(source, url).timeout(self.probe_timeout);
        match request.send().await {
            Ok(resp) => {
                let ok = resp.status().is_success();
                debug!(source = %source.name, status = resp.status().as_u16(), ok, "probe finished");
                ok
            }
            Err(e) => {
                debug!(source = %source.name, error = %e, "probe failed");
                false
            }
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// `GET {summary}`
    pub async fn summary(&self, source: &SourceDescriptor) -> Result<SummaryPayload, Error> {
        let url = source.url_for(Query::Summary)?;
        match source.kind {
            SourceKind::IcpDashboard => self
                .get::<IcpSummary>(source, url)
                .await
                .map(SummaryPayload::Icp),
            SourceKind::MempoolSpace => self
                .get::<MempoolStatistics>(source, url)
                .await
                .map(SummaryPayload::Mempool),
        }
    }

    /// `GET {series}?range={range}&type={series_type}`
    pub async fn series(
        &self,
        source: &SourceDescriptor,
        range: &str,
        series_type: &str,
    ) -> Result<SeriesPayload, Error> {
        let mut url = source.url_for(Query::Series)?;
        url.query_pairs_mut()
            .append_pair("range", range)
            .append_pair("type", series_type);
        match source.kind {
            SourceKind::IcpDashboard => self
                .get::<IcpSeries>(source, url)
                .await
                .map(SeriesPayload::Icp),
            SourceKind::MempoolSpace => self
                .get::<Vec<MempoolStatPoint>>(source, url)
                .await
                .map(SeriesPayload::Mempool),
        }
    }

    /// `GET {addresses}`. Holder lists share one contract across kinds.
    pub async fn holders(&self, source: &SourceDescriptor) -> Result<IcpHolders, Error> {
        let url = source.url_for(Query::Addresses)?;
        self.get(source, url).await
    }

    /// `GET {transactions}?limit={limit}`
    pub async fn transactions(
        &self,
        source: &SourceDescriptor,
        limit: usize,
    ) -> Result<WireTransactions, Error> {
        let mut url = source.url_for(Query::Transactions)?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        self.get(source, url).await
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn request(&self, source: &SourceDescriptor, url: Url) -> reqwest::RequestBuilder {
        source
            .headers
            .iter()
            .fold(self.http.get(url), |builder, (name, value)| {
                builder.header(name.as_str(), value.as_str())
            })
    }

    /// Send a GET with the fetch timeout and decode a 2xx JSON body.
    async fn get<T: DeserializeOwned>(&self, source: &SourceDescriptor, url: Url) -> Result<T, Error> {
        debug!(source = %source.name, "GET {}", url);

        let resp = self
            .request(source, url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = resp.text().await.map_err(|e| self.map_send_error(e))?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(e)
        }
    }
}
