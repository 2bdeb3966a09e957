use std::fmt::Write;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha1::Sha1;
use sha2::{Digest, Sha224};

/// Hash used to address uploaded blobs.
///
/// Older servers only accept `sha1-` refs; current ones take `sha224-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobHash {
    #[default]
    Sha224,
    Sha1,
}

impl BlobHash {
    pub fn prefix(self) -> &'static str {
        match self {
            BlobHash::Sha224 => "sha224",
            BlobHash::Sha1 => "sha1",
        }
    }

    /// Content address of `bytes`: `{prefix}-{hex}`.
    pub fn blob_ref(self, bytes: &[u8]) -> String {
        match self {
            BlobHash::Sha224 => hex_ref(self.prefix(), &Sha224::digest(bytes)),
            BlobHash::Sha1 => hex_ref(self.prefix(), &Sha1::digest(bytes)),
        }
    }
}

/// Unsigned permanode schema blob.
pub fn permanode_blob(signer: &str, random: &str) -> Value {
    json!({
        "camliVersion": 1,
        "camliType": "permanode",
        "camliSigner": signer,
        "random": random,
    })
}

/// Unsigned `add-attribute` claim schema blob.
pub fn claim_blob(
    signer: &str,
    permanode: &str,
    claim_date: &str,
    attribute: &str,
    value: &str,
) -> Value {
    json!({
        "camliVersion": 1,
        "camliType": "claim",
        "camliSigner": signer,
        "permaNode": permanode,
        "claimType": "add-attribute",
        "claimDate": claim_date,
        "attribute": attribute,
        "value": value,
    })
}

fn hex_ref(prefix: &str, digest: &[u8]) -> String {
    let mut out = String::with_capacity(prefix.len() + 1 + digest.len() * 2);
    out.push_str(prefix);
    out.push('-');
    for byte in digest {
        let _ = write!(&mut out, "{byte:02x}");
    }
    out
}
