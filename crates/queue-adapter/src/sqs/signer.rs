//! AWS Signature Version 4 request signing.

use crate::config::Credentials;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

#[cfg(test)]
#[path = "signer_tests.rs"]
mod tests;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SIGNED_HEADERS: &str = "host;x-amz-date";

/// Signature V4 signer bound to one set of static credentials.
///
/// Signing steps:
/// 1. Canonical request (method, URI, empty query, headers, payload hash)
/// 2. String to sign (algorithm, timestamp, scope, request hash)
/// 3. Signing key from the 4-level HMAC chain
/// 4. Authorization header
///
/// Only `host` and `x-amz-date` are signed; the form body is covered by the
/// payload hash.
#[derive(Clone)]
pub(crate) struct SigV4Signer {
    credentials: Credentials,
    region: String,
    service: String,
}

impl SigV4Signer {
    pub(crate) fn new(credentials: Credentials, region: impl Into<String>) -> Self {
        Self {
            credentials,
            region: region.into(),
            service: "sqs".to_string(),
        }
    }

    #[cfg(test)]
    fn with_service(mut self, service: &str) -> Self {
        self.service = service.to_string();
        self
    }

    /// Headers to attach to a request: `Authorization` and `x-amz-date`.
    ///
    /// `host` must be exactly the value the HTTP client sends in the `Host`
    /// header, including a non-default port.
    pub(crate) fn sign(
        &self,
        method: &str,
        host: &str,
        path: &str,
        body: &str,
        timestamp: &DateTime<Utc>,
    ) -> Vec<(&'static str, String)> {
        let date_stamp = timestamp.format("%Y%m%d").to_string();
        let amz_date = timestamp.format("%Y%m%dT%H%M%SZ").to_string();

        let canonical_request = canonical_request(method, host, path, &amz_date, body);

        let credential_scope = format!(
            "{}/{}/{}/aws4_request",
            date_stamp, self.region, self.service
        );
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            amz_date,
            credential_scope,
            hex_sha256(canonical_request.as_bytes())
        );

        let signature = self.calculate_signature(&string_to_sign, &date_stamp);

        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM,
            self.credentials.access_key_id(),
            credential_scope,
            SIGNED_HEADERS,
            signature
        );

        vec![("Authorization", authorization), ("x-amz-date", amz_date)]
    }

    fn calculate_signature(&self, string_to_sign: &str, date_stamp: &str) -> String {
        let k_secret = format!("AWS4{}", self.credentials.secret_access_key());
        let k_date = hmac_sha256(k_secret.as_bytes(), date_stamp.as_bytes());
        let k_region = hmac_sha256(&k_date, self.region.as_bytes());
        let k_service = hmac_sha256(&k_region, self.service.as_bytes());
        let k_signing = hmac_sha256(&k_service, b"aws4_request");

        hex::encode(hmac_sha256(&k_signing, string_to_sign.as_bytes()))
    }
}

/// URI-encode each path segment once more, as SigV4 requires for every
/// service except S3. `path` is the already-escaped path the client sends.
fn canonical_uri(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn canonical_request(method: &str, host: &str, path: &str, amz_date: &str, body: &str) -> String {
    let uri = canonical_uri(path);
    let canonical_headers = format!("host:{}\nx-amz-date:{}\n", host, amz_date);

    format!(
        "{}\n{}\n\n{}\n{}\n{}",
        method,
        uri,
        canonical_headers,
        SIGNED_HEADERS,
        hex_sha256(body.as_bytes())
    )
}

fn hex_sha256(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
