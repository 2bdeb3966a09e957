use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use search_engine::{
    AttrQuery, BlobHash, ConnectionSettings, DiscoveryDocument, FailureKind, HttpConnection,
    ServerConnection, SigningConfig,
};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer) -> ConnectionSettings {
    ConnectionSettings {
        server_url: server.uri(),
        ..ConnectionSettings::default()
    }
}

fn discovery() -> DiscoveryDocument {
    DiscoveryDocument {
        blob_root: "/bs/".to_string(),
        search_root: "/my-search/".to_string(),
        signing: Some(SigningConfig {
            public_key_blob_ref: "sha224-key".to_string(),
            sign_handler: "/sighelper/camli/sig/sign".to_string(),
        }),
    }
}

async fn mount_signer(server: &MockServer, marker: &str, signed: &str) {
    Mock::given(method("POST"))
        .and(path("/sighelper/camli/sig/sign"))
        .and(body_string_contains(marker))
        .respond_with(ResponseTemplate::new(200).set_body_string(signed))
        .mount(server)
        .await;
}

async fn mount_upload(server: &MockServer, signed: &str) {
    Mock::given(method("POST"))
        .and(path("/bs/camli/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "received": [{ "blobRef": BlobHash::Sha224.blob_ref(signed.as_bytes()), "size": signed.len() }]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn discover_reads_roots_and_signing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("camli.mode", "config"))
        .and(header("accept", "text/x-camli-configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "blobRoot": "/bs/",
            "searchRoot": "/my-search/",
            "signing": {
                "publicKeyBlobRef": "sha224-key",
                "signHandler": "/sighelper/camli/sig/sign"
            },
            "ownerName": "ignored"
        })))
        .mount(&server)
        .await;

    let connection = HttpConnection::discover(&settings(&server))
        .await
        .expect("discover ok");
    assert_eq!(connection.discovery(), &discovery());
}

#[tokio::test]
async fn discover_reports_bad_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = HttpConnection::discover(&settings(&server))
        .await
        .err()
        .expect("discover fails");
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
}

#[tokio::test]
async fn search_sends_attribute_query_and_decodes_permanodes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/my-search/camli/search/permanodeattr"))
        .and(query_param("signer", "sha224-key"))
        .and(query_param("attr", "tag"))
        .and(query_param("value", "vacation"))
        .and(query_param("fuzzy", "false"))
        .and(query_param("max", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "withAttr": [
                { "permanode": "sha224-one", "signer": "sha224-key" },
                { "permanode": "sha224-two", "signer": "sha224-key" }
            ]
        })))
        .mount(&server)
        .await;

    let connection = HttpConnection::new(&settings(&server), discovery()).unwrap();
    let query = AttrQuery {
        attribute: "tag".to_string(),
        value: "vacation".to_string(),
        fuzzy: false,
        max: 100,
    };

    let found = connection.permanodes_with_attr(&query).await.expect("search ok");
    assert_eq!(found, vec!["sha224-one".to_string(), "sha224-two".to_string()]);
}

#[tokio::test]
async fn search_without_matches_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/my-search/camli/search/permanodeattr"))
        .and(query_param("attr", "camliRoot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let connection = HttpConnection::new(&settings(&server), discovery()).unwrap();
    let found = connection
        .permanodes_with_attr(&AttrQuery::roots(100))
        .await
        .expect("search ok");
    assert!(found.is_empty());
}

#[tokio::test]
async fn search_reports_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let connection = HttpConnection::new(&settings(&server), discovery()).unwrap();
    let err = connection
        .permanodes_with_attr(&AttrQuery::roots(10))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
}

#[tokio::test]
async fn search_reports_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let connection = HttpConnection::new(&settings(&server), discovery()).unwrap();
    let err = connection
        .permanodes_with_attr(&AttrQuery::roots(10))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn create_permanode_signs_then_uploads() {
    let server = MockServer::start().await;
    let signed = "{\"camliType\":\"permanode\",\"camliSig\":\"abc\"}";
    mount_signer(&server, "permanode", signed).await;
    mount_upload(&server, signed).await;

    let connection = HttpConnection::new(&settings(&server), discovery()).unwrap();
    let permanode = connection.create_permanode().await.expect("create ok");
    assert_eq!(permanode, BlobHash::Sha224.blob_ref(signed.as_bytes()));
}

#[tokio::test]
async fn sha1_servers_get_sha1_refs() {
    let server = MockServer::start().await;
    let signed = "{\"camliType\":\"permanode\",\"camliSig\":\"old\"}";
    let expected = BlobHash::Sha1.blob_ref(signed.as_bytes());
    mount_signer(&server, "permanode", signed).await;
    Mock::given(method("POST"))
        .and(path("/bs/camli/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "received": [{ "blobRef": expected, "size": signed.len() }]
        })))
        .mount(&server)
        .await;

    let sha1 = ConnectionSettings {
        blob_hash: BlobHash::Sha1,
        ..settings(&server)
    };
    let connection = HttpConnection::new(&sha1, discovery()).unwrap();
    let permanode = connection.create_permanode().await.expect("create ok");
    assert!(permanode.starts_with("sha1-"));
    assert_eq!(permanode, expected);
}

#[tokio::test]
async fn claim_carries_permanode_attribute_and_date() {
    let server = MockServer::start().await;
    let signed = "{\"camliType\":\"claim\",\"camliSig\":\"def\"}";
    mount_signer(&server, "camliMember", signed).await;
    mount_upload(&server, signed).await;

    let connection = HttpConnection::new(&settings(&server), discovery())
        .unwrap()
        .with_clock(Arc::new(|| "2026-10-17T00:00:00.000Z".to_string()));
    let claim = connection
        .add_attribute_claim("sha224-pn", "camliMember", "sha224-item")
        .await
        .expect("claim ok");
    assert_eq!(claim, BlobHash::Sha224.blob_ref(signed.as_bytes()));

    let requests = server.received_requests().await.unwrap_or_default();
    let sign_body = requests
        .iter()
        .find(|request| request.url.path() == "/sighelper/camli/sig/sign")
        .map(|request| String::from_utf8_lossy(&request.body).into_owned())
        .expect("sign request");
    let form: Vec<(String, String)> = url::form_urlencoded::parse(sign_body.as_bytes())
        .into_owned()
        .collect();
    let unsigned: serde_json::Value = serde_json::from_str(&form[0].1).unwrap();
    assert_eq!(form[0].0, "json");
    assert_eq!(
        unsigned,
        json!({
            "camliVersion": 1,
            "camliType": "claim",
            "camliSigner": "sha224-key",
            "permaNode": "sha224-pn",
            "claimType": "add-attribute",
            "claimDate": "2026-10-17T00:00:00.000Z",
            "attribute": "camliMember",
            "value": "sha224-item",
        })
    );
}

#[tokio::test]
async fn upload_must_acknowledge_blob() {
    let server = MockServer::start().await;
    mount_signer(&server, "permanode", "signed").await;
    Mock::given(method("POST"))
        .and(path("/bs/camli/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "received": [] })))
        .mount(&server)
        .await;

    let connection = HttpConnection::new(&settings(&server), discovery()).unwrap();
    let err = connection.create_permanode().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn missing_signing_is_reported() {
    let server = MockServer::start().await;
    let unsigned = DiscoveryDocument {
        signing: None,
        ..discovery()
    };

    let connection = HttpConnection::new(&settings(&server), unsigned).unwrap();
    let err = connection.create_permanode().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::SigningUnavailable);
}

#[tokio::test]
async fn slow_signer_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sighelper/camli/sig/sign"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("late"),
        )
        .mount(&server)
        .await;

    let settings = ConnectionSettings {
        request_timeout: Duration::from_millis(50),
        ..settings(&server)
    };
    let connection = HttpConnection::new(&settings, discovery()).unwrap();
    let err = connection.create_permanode().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}
