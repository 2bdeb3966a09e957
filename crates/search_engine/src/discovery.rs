use reqwest::header::ACCEPT;
use serde::Deserialize;

use crate::connection::map_reqwest_error;
use crate::{ConnectionError, FailureKind};

const DISCOVERY_MEDIA_TYPE: &str = "text/x-camli-configuration";

/// Server configuration served to UI pages.
///
/// Roots are paths relative to the server URL, e.g. `/bs/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryDocument {
    pub blob_root: String,
    pub search_root: String,
    #[serde(default)]
    pub signing: Option<SigningConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningConfig {
    pub public_key_blob_ref: String,
    pub sign_handler: String,
}

/// Fetches the discovery document from `{server}/?camli.mode=config`.
pub async fn fetch_discovery(
    client: &reqwest::Client,
    server: &url::Url,
) -> Result<DiscoveryDocument, ConnectionError> {
    let mut url = server.clone();
    url.query_pairs_mut().append_pair("camli.mode", "config");

    let response = client
        .get(url)
        .header(ACCEPT, DISCOVERY_MEDIA_TYPE)
        .send()
        .await
        .map_err(map_reqwest_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(ConnectionError::new(
            FailureKind::HttpStatus(status.as_u16()),
            "discovery request failed",
        ));
    }

    let body = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&body)
        .map_err(|err| ConnectionError::new(FailureKind::Decode, err.to_string()))
}
