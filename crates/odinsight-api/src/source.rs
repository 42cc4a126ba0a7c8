// ── Source descriptors ──
//
// A source is an immutable description of one upstream provider: where it
// lives, which endpoint serves each query, and which payload contract it
// speaks. Registry order (held by `odinsight-core`) is priority order.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use url::Url;

use crate::error::Error;

/// Public ICP dashboard API (ckBTC metrics).
pub const ICP_DASHBOARD_BASE: &str = "https://ic-api.internetcomputer.org";

/// Public mempool.space API.
pub const MEMPOOL_SPACE_BASE: &str = "https://mempool.space/api";

/// Payload contract a source speaks. Selects the transform applied to its
/// responses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SourceKind {
    /// ICP dashboard shape: satoshi-denominated `total_supply`, `time_series`,
    /// `holders`. Self-hosted backends implementing the same contract use it too.
    IcpDashboard,
    /// mempool.space statistics shape.
    MempoolSpace,
}

/// One domain query a source may serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Query {
    Summary,
    Series,
    Addresses,
    Transactions,
}

/// Endpoint paths, relative to the source's base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub summary: String,
    pub series: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addresses: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions: Option<String>,
}

impl Endpoints {
    /// The path serving `query`, if the source declares one.
    pub fn path(&self, query: Query) -> Option<&str> {
        match query {
            Query::Summary => Some(&self.summary),
            Query::Series => Some(&self.series),
            Query::Addresses => self.addresses.as_deref(),
            Query::Transactions => self.transactions.as_deref(),
        }
    }
}

/// An upstream data provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    pub kind: SourceKind,
    pub base_url: Url,
    pub endpoints: Endpoints,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl SourceDescriptor {
    pub fn new(name: impl Into<String>, kind: SourceKind, base_url: Url, endpoints: Endpoints) -> Self {
        Self {
            name: name.into(),
            kind,
            base_url,
            endpoints,
            headers: BTreeMap::new(),
        }
    }

    /// The ICP dashboard ckBTC metrics API.
    ///
    /// Its holders endpoint is not publicly served, so address queries are
    /// left undeclared.
    pub fn icp_dashboard() -> Result<Self, Error> {
        Ok(Self::new(
            "ICP Dashboard",
            SourceKind::IcpDashboard,
            Url::parse(ICP_DASHBOARD_BASE)?,
            Endpoints {
                summary: "/api/v3/metrics/ckbtc-total-supply".into(),
                series: "/api/v3/metrics/ckbtc-transactions".into(),
                addresses: None,
                transactions: None,
            },
        ))
    }

    /// The mempool.space statistics API.
    pub fn mempool_space() -> Result<Self, Error> {
        Ok(Self::new(
            "Mempool.space",
            SourceKind::MempoolSpace,
            Url::parse(MEMPOOL_SPACE_BASE)?,
            Endpoints {
                summary: "/v1/statistics".into(),
                series: "/v1/statistics/24h".into(),
                addresses: None,
                transactions: None,
            },
        ))
    }

    /// Add an extra request header sent on every call to this source.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn supports(&self, query: Query) -> bool {
        self.endpoints.path(query).is_some()
    }

    /// Build `{base_url}{path}` for a query.
    ///
    /// The base URL may carry a path prefix (`https://mempool.space/api`),
    /// so the endpoint is appended rather than joined.
    pub fn url_for(&self, query: Query) -> Result<Url, Error> {
        let path = self.endpoints.path(query).ok_or_else(|| Error::Unsupported {
            source_name: self.name.clone(),
            query: query.to_string(),
        })?;
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.base_url)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn url_keeps_base_path_prefix() {
        let source = SourceDescriptor::mempool_space().unwrap();
        let url = source.url_for(Query::Summary).unwrap();
        assert_eq!(url.as_str(), "https://mempool.space/api/v1/statistics");
    }

    #[test]
    fn url_tolerates_trailing_slash() {
        let mut source = SourceDescriptor::icp_dashboard().unwrap();
        source.base_url = Url::parse("http://127.0.0.1:8080/").unwrap();
        let url = source.url_for(Query::Series).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/api/v3/metrics/ckbtc-transactions"
        );
    }

    #[test]
    fn undeclared_endpoint_is_unsupported() {
        let source = SourceDescriptor::icp_dashboard().unwrap();
        assert!(!source.supports(Query::Addresses));
        assert!(matches!(
            source.url_for(Query::Addresses),
            Err(Error::Unsupported { .. })
        ));
    }

    #[test]
    fn kind_round_trips_through_strings() {
        assert_eq!(SourceKind::MempoolSpace.to_string(), "mempool_space");
        assert_eq!(
            "icp_dashboard".parse::<SourceKind>().unwrap(),
            SourceKind::IcpDashboard
        );
    }
}
