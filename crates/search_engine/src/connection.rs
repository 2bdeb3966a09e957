use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use page_logging::{page_debug, page_info};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::discovery::{fetch_discovery, DiscoveryDocument, SigningConfig};
use crate::schema::{claim_blob, permanode_blob, BlobHash};
use crate::{ConnectionError, FailureKind};

/// Produces the `claimDate` stamped on new claims.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub server_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Upper bound for one permanode or claim operation (sign + upload).
    pub operation_timeout: Duration,
    pub blob_hash: BlobHash,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3179/".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            operation_timeout: Duration::from_secs(60),
            blob_hash: BlobHash::default(),
        }
    }
}

/// A permanode attribute search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrQuery {
    pub attribute: String,
    pub value: String,
    pub fuzzy: bool,
    pub max: usize,
}

impl AttrQuery {
    /// Permanodes marked as roots.
    pub fn roots(max: usize) -> Self {
        Self {
            attribute: "camliRoot".to_string(),
            value: String::new(),
            fuzzy: false,
            max,
        }
    }
}

#[async_trait::async_trait]
pub trait ServerConnection: Send + Sync {
    /// Creates a new permanode and returns its blobref.
    async fn create_permanode(&self) -> Result<String, ConnectionError>;

    /// Adds `attribute = value` to `permanode`; returns the claim's blobref.
    async fn add_attribute_claim(
        &self,
        permanode: &str,
        attribute: &str,
        value: &str,
    ) -> Result<String, ConnectionError>;

    /// Permanodes signed by the page's signer that carry the attribute.
    async fn permanodes_with_attr(&self, query: &AttrQuery) -> Result<Vec<String>, ConnectionError>;
}

#[derive(Debug, Deserialize)]
struct WithAttrResponse {
    #[serde(rename = "withAttr", default)]
    with_attr: Vec<WithAttrItem>,
}

#[derive(Debug, Deserialize)]
struct WithAttrItem {
    permanode: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    received: Vec<ReceivedBlob>,
}

#[derive(Debug, Deserialize)]
struct ReceivedBlob {
    #[serde(rename = "blobRef")]
    blob_ref: String,
}

/// [`ServerConnection`] over the server's HTTP handlers.
#[derive(Clone)]
pub struct HttpConnection {
    client: reqwest::Client,
    server: Url,
    discovery: DiscoveryDocument,
    blob_hash: BlobHash,
    clock: Clock,
}

impl HttpConnection {
    pub fn new(
        settings: &ConnectionSettings,
        discovery: DiscoveryDocument,
    ) -> Result<Self, ConnectionError> {
        Ok(Self {
            client: build_client(settings)?,
            server: parse_server(&settings.server_url)?,
            discovery,
            blob_hash: settings.blob_hash,
            clock: default_clock(),
        })
    }

    /// Fetches the discovery document and connects with it.
    pub async fn discover(settings: &ConnectionSettings) -> Result<Self, ConnectionError> {
        let client = build_client(settings)?;
        let server = parse_server(&settings.server_url)?;
        let discovery = fetch_discovery(&client, &server).await?;
        page_info!(
            "Discovered blobRoot={} searchRoot={} signing={}",
            discovery.blob_root,
            discovery.search_root,
            discovery.signing.is_some()
        );
        Ok(Self {
            client,
            server,
            discovery,
            blob_hash: settings.blob_hash,
            clock: default_clock(),
        })
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn discovery(&self) -> &DiscoveryDocument {
        &self.discovery
    }

    fn signing(&self) -> Result<&SigningConfig, ConnectionError> {
        self.discovery.signing.as_ref().ok_or_else(|| {
            ConnectionError::new(FailureKind::SigningUnavailable, "discovery has no signing")
        })
    }

    fn resolve(&self, path: &str) -> Result<Url, ConnectionError> {
        self.server
            .join(path)
            .map_err(|err| ConnectionError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    fn resolve_under(&self, root: &str, path: &str) -> Result<Url, ConnectionError> {
        self.resolve(root)?
            .join(path)
            .map_err(|err| ConnectionError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn sign(&self, unsigned: &Value) -> Result<String, ConnectionError> {
        let signing = self.signing()?;
        let url = self.resolve(&signing.sign_handler)?;
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("json", &unsigned.to_string())
            .finish();

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response)?;
        response.text().await.map_err(map_reqwest_error)
    }

    async fn upload(&self, signed: String) -> Result<String, ConnectionError> {
        let blob_ref = self.blob_hash.blob_ref(signed.as_bytes());
        let url = self.resolve_under(&self.discovery.blob_root, "camli/upload")?;
        let part = reqwest::multipart::Part::bytes(signed.into_bytes()).file_name(blob_ref.clone());
        let form = reqwest::multipart::Form::new().part(blob_ref.clone(), part);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response)?;
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        let uploaded: UploadResponse = serde_json::from_slice(&body)
            .map_err(|err| ConnectionError::new(FailureKind::Decode, err.to_string()))?;

        if !uploaded.received.iter().any(|blob| blob.blob_ref == blob_ref) {
            return Err(ConnectionError::new(
                FailureKind::Decode,
                format!("upload response does not list {blob_ref}"),
            ));
        }
        page_debug!("Uploaded {}", blob_ref);
        Ok(blob_ref)
    }

    async fn sign_and_upload(&self, unsigned: Value) -> Result<String, ConnectionError> {
        let signed = self.sign(&unsigned).await?;
        self.upload(signed).await
    }
}

#[async_trait::async_trait]
impl ServerConnection for HttpConnection {
    async fn create_permanode(&self) -> Result<String, ConnectionError> {
        let signer = self.signing()?.public_key_blob_ref.clone();
        let random = uuid::Uuid::new_v4().simple().to_string();
        self.sign_and_upload(permanode_blob(&signer, &random)).await
    }

    async fn add_attribute_claim(
        &self,
        permanode: &str,
        attribute: &str,
        value: &str,
    ) -> Result<String, ConnectionError> {
        let signer = self.signing()?.public_key_blob_ref.clone();
        let claim_date = (self.clock)();
        self.sign_and_upload(claim_blob(&signer, permanode, &claim_date, attribute, value))
            .await
    }

    async fn permanodes_with_attr(&self, query: &AttrQuery) -> Result<Vec<String>, ConnectionError> {
        let signer = &self.signing()?.public_key_blob_ref;
        let mut url =
            self.resolve_under(&self.discovery.search_root, "camli/search/permanodeattr")?;
        url.query_pairs_mut()
            .append_pair("signer", signer)
            .append_pair("attr", &query.attribute)
            .append_pair("value", &query.value)
            .append_pair("fuzzy", if query.fuzzy { "true" } else { "false" })
            .append_pair("max", &query.max.to_string());

        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
        let response = ensure_success(response)?;
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        let decoded: WithAttrResponse = serde_json::from_slice(&body)
            .map_err(|err| ConnectionError::new(FailureKind::Decode, err.to_string()))?;

        Ok(decoded
            .with_attr
            .into_iter()
            .map(|item| item.permanode)
            .collect())
    }
}

fn default_clock() -> Clock {
    Arc::new(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn build_client(settings: &ConnectionSettings) -> Result<reqwest::Client, ConnectionError> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .build()
        .map_err(|err| ConnectionError::new(FailureKind::Network, err.to_string()))
}

fn parse_server(raw: &str) -> Result<Url, ConnectionError> {
    Url::parse(raw).map_err(|err| ConnectionError::new(FailureKind::InvalidUrl, err.to_string()))
}

fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ConnectionError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ConnectionError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ))
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ConnectionError {
    if err.is_timeout() {
        return ConnectionError::new(FailureKind::Timeout, err.to_string());
    }
    ConnectionError::new(FailureKind::Network, err.to_string())
}
