// Copyright 2026 Zillow Client Contributors
// SPDX-License-Identifier: Apache-2.0

//! Endpoint caller for the valuation API.
//!
//! One async method per API operation. Each call validates its parameters
//! before touching the network, issues exactly one GET (retry policy
//! belongs to the caller), decodes the XML body into a tree, and hands the
//! operation's result subtree to the mapper.

use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::property::{map_comparables, CompsResult, DetailLevel, Property};
use crate::xml;

const USER_AGENT: &str = concat!("zillow/", env!("CARGO_PKG_VERSION"));

const SEARCH_RESULTS_ENDPOINT: &str = "GetSearchResults.htm";
const DEEP_SEARCH_RESULTS_ENDPOINT: &str = "GetDeepSearchResults.htm";
const ZESTIMATE_ENDPOINT: &str = "GetZestimate.htm";
const COMPS_ENDPOINT: &str = "GetComps.htm";
const DEEP_COMPS_ENDPOINT: &str = "GetDeepComps.htm";

// Result subtree locations, one per response envelope.
const SEARCH_RESULT_PATH: &str = "/searchresults/response/results/result";
const ZESTIMATE_PATH: &str = "/zestimate/response";
const COMPS_PRINCIPAL_PATH: &str = "/comps/response/properties/principal";
const COMPS_COMPARABLES_PATH: &str = "/comps/response/properties/comparables/comp";

/// Client for the valuation endpoints.
///
/// Holds a configured `reqwest::Client` and nothing else; calls are
/// independent and the client can be cloned cheaply and shared.
#[derive(Debug, Clone)]
pub struct ValuationClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ValuationClient {
    /// Create a client with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client with an explicit configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http, config })
    }

    /// Find a property by street address and map its core record.
    ///
    /// `citystatezip` is free-form: a "City, ST" pair or a ZIP code.
    /// `rentzestimate` asks the API to include a rental estimate in the
    /// response.
    pub async fn search_results(
        &self,
        zws_id: &str,
        address: &str,
        citystatezip: &str,
        rentzestimate: bool,
    ) -> Result<Property> {
        self.search(
            SEARCH_RESULTS_ENDPOINT,
            zws_id,
            address,
            citystatezip,
            rentzestimate,
            DetailLevel::Standard,
        )
        .await
    }

    /// Like [`search_results`](Self::search_results), but the result also
    /// carries assessment and sale details in
    /// [`extended_details`](Property::extended_details).
    pub async fn deep_search_results(
        &self,
        zws_id: &str,
        address: &str,
        citystatezip: &str,
        rentzestimate: bool,
    ) -> Result<Property> {
        self.search(
            DEEP_SEARCH_RESULTS_ENDPOINT,
            zws_id,
            address,
            citystatezip,
            rentzestimate,
            DetailLevel::Extended,
        )
        .await
    }

    /// Fetch the current value estimate for a known property id.
    pub async fn zestimate(
        &self,
        zws_id: &str,
        zpid: &str,
        rentzestimate: bool,
    ) -> Result<Property> {
        Self::require("zws-id", zws_id)?;
        Self::require("zpid", zpid)?;

        let mut params = vec![("zws-id", zws_id), ("zpid", zpid)];
        if rentzestimate {
            params.push(("rentzestimate", "true"));
        }

        let (tree, body) = self.fetch_tree(ZESTIMATE_ENDPOINT, &params).await?;
        let scope = resolve(&tree, ZESTIMATE_PATH, &body)?;
        map_scope(scope, DetailLevel::Standard, &body)
    }

    /// Fetch up to `count` comparable properties for a known property id,
    /// paired with the principal property they were compared against.
    pub async fn comps(
        &self,
        zws_id: &str,
        zpid: &str,
        count: u32,
        rentzestimate: bool,
    ) -> Result<CompsResult> {
        self.comps_request(
            COMPS_ENDPOINT,
            zws_id,
            zpid,
            count,
            rentzestimate,
            DetailLevel::Standard,
        )
        .await
    }

    /// Like [`comps`](Self::comps), but principal and comparables carry
    /// assessment and sale details.
    pub async fn deep_comps(
        &self,
        zws_id: &str,
        zpid: &str,
        count: u32,
        rentzestimate: bool,
    ) -> Result<CompsResult> {
        self.comps_request(
            DEEP_COMPS_ENDPOINT,
            zws_id,
            zpid,
            count,
            rentzestimate,
            DetailLevel::Extended,
        )
        .await
    }

    // ── Shared call flow ────────────────────────────────────────────────

    async fn search(
        &self,
        endpoint: &str,
        zws_id: &str,
        address: &str,
        citystatezip: &str,
        rentzestimate: bool,
        detail: DetailLevel,
    ) -> Result<Property> {
        Self::require("zws-id", zws_id)?;
        Self::require("address", address)?;
        Self::require("citystatezip", citystatezip)?;

        let mut params = vec![
            ("zws-id", zws_id),
            ("address", address),
            ("citystatezip", citystatezip),
        ];
        if rentzestimate {
            params.push(("rentzestimate", "true"));
        }

        let (tree, body) = self.fetch_tree(endpoint, &params).await?;
        let scope = resolve(&tree, SEARCH_RESULT_PATH, &body)?;
        map_scope(scope, detail, &body)
    }

    async fn comps_request(
        &self,
        endpoint: &str,
        zws_id: &str,
        zpid: &str,
        count: u32,
        rentzestimate: bool,
        detail: DetailLevel,
    ) -> Result<CompsResult> {
        Self::require("zws-id", zws_id)?;
        Self::require("zpid", zpid)?;

        let count = count.to_string();
        let mut params = vec![
            ("zws-id", zws_id),
            ("zpid", zpid),
            ("count", count.as_str()),
        ];
        if rentzestimate {
            params.push(("rentzestimate", "true"));
        }

        let (tree, body) = self.fetch_tree(endpoint, &params).await?;
        let principal_scope = resolve(&tree, COMPS_PRINCIPAL_PATH, &body)?;
        let comparables_scope = resolve(&tree, COMPS_COMPARABLES_PATH, &body)?;

        let principal = map_scope(principal_scope, detail, &body)?;
        let (comps, rejects) = map_comparables(comparables_scope, detail);

        Ok(CompsResult {
            principal,
            comps,
            rejects,
        })
    }

    /// One GET, decoded to a tree. Returns the raw body alongside so
    /// failures later in the call can carry it.
    async fn fetch_tree(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<(Value, String)> {
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        );
        tracing::debug!("GET {url}");

        let response = self
            .http
            .get(&url)
            .query(params)
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;

        let tree = xml::parse(&body).map_err(|e| Error::MalformedResponse {
            reason: e.to_string(),
            body: body.clone(),
        })?;
        Ok((tree, body))
    }

    fn require(name: &'static str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(Error::InvalidRequest(name));
        }
        Ok(())
    }
}

fn resolve<'t>(tree: &'t Value, path: &str, body: &str) -> Result<&'t Value> {
    tree.pointer(path).ok_or_else(|| Error::MalformedResponse {
        reason: format!("missing result node at `{path}`"),
        body: body.to_string(),
    })
}

fn map_scope(scope: &Value, detail: DetailLevel, body: &str) -> Result<Property> {
    Property::from_tree(scope, detail).map_err(|e| Error::MalformedResponse {
        reason: e.to_string(),
        body: body.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_address_is_invalid_request() {
        let client = ValuationClient::new().unwrap();
        let err = client
            .search_results("my-key", "", "98109", false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest("address")));
    }

    #[tokio::test]
    async fn test_whitespace_parameter_is_invalid_request() {
        let client = ValuationClient::new().unwrap();
        let err = client
            .deep_search_results("my-key", "2114 Bigelow Ave", "   ", false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest("citystatezip")));
    }

    #[tokio::test]
    async fn test_empty_key_named_first() {
        let client = ValuationClient::new().unwrap();
        let err = client.zestimate("", "", false).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest("zws-id")));
    }

    #[tokio::test]
    async fn test_empty_zpid_is_invalid_request() {
        let client = ValuationClient::new().unwrap();
        let err = client.comps("my-key", "", 25, false).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest("zpid")));

        let err = client
            .deep_comps("my-key", " ", 5, false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest("zpid")));
    }
}
