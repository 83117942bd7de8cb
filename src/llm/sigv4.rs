//! AWS Signature Version 4 request signing.
//!
//! Used by the static-credential strategy. Pure functions only; the caller
//! supplies the clock so signatures are reproducible in tests.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::config::StaticCredentials;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// The parts of an HTTP request that go into the signature.
pub struct SigningRequest<'a> {
    pub method: &'a str,
    /// `host` or `host:port`, exactly as the Host header will be sent.
    pub host: &'a str,
    /// Request path as sent on the wire (already percent-encoded once).
    pub path: &'a str,
    /// Canonical query string, empty if none.
    pub query: &'a str,
    /// Extra headers to sign. `host`, `x-amz-date` and the session token
    /// header are added automatically.
    pub headers: &'a [(&'a str, &'a str)],
    pub payload: &'a [u8],
}

pub struct SigningScope<'a> {
    pub region: &'a str,
    pub service: &'a str,
}

/// Headers the caller must attach to the outgoing request.
#[derive(Debug, Clone)]
pub struct SignedHeaders {
    pub authorization: String,
    pub amz_date: String,
    pub security_token: Option<String>,
}

impl SignedHeaders {
    pub fn into_headers(self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("authorization", self.authorization),
            ("x-amz-date", self.amz_date),
        ];
        if let Some(token) = self.security_token {
            headers.push(("x-amz-security-token", token));
        }
        headers
    }
}

/// Sign a request at time `now`.
pub fn sign(
    request: &SigningRequest<'_>,
    credentials: &StaticCredentials,
    scope: &SigningScope<'_>,
    now: DateTime<Utc>,
) -> SignedHeaders {
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date_stamp = now.format("%Y%m%d").to_string();

    let mut headers: Vec<(String, String)> = request
        .headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), normalize_header_value(value)))
        .collect();
    headers.push(("host".to_string(), request.host.to_string()));
    headers.push(("x-amz-date".to_string(), amz_date.clone()));
    if let Some(token) = &credentials.session_token {
        headers.push(("x-amz-security-token".to_string(), token.clone()));
    }
    headers.sort_by(|a, b| a.0.cmp(&b.0));

    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value))
        .collect();
    let signed_headers = headers
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");

    // Step 1: canonical request
    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        request.method,
        canonical_uri(request.path),
        request.query,
        canonical_headers,
        signed_headers,
        sha256_hex(request.payload)
    );

    // Step 2: string to sign
    let credential_scope = format!(
        "{}/{}/{}/aws4_request",
        date_stamp, scope.region, scope.service
    );
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date,
        credential_scope,
        sha256_hex(canonical_request.as_bytes())
    );

    // Step 3: signature
    let signing_key = derive_signing_key(
        &credentials.secret_access_key,
        &date_stamp,
        scope.region,
        scope.service,
    );
    let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes()));

    let authorization = format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM, credentials.access_key_id, credential_scope, signed_headers, signature
    );

    SignedHeaders {
        authorization,
        amz_date,
        security_token: credentials.session_token.clone(),
    }
}

/// Non-S3 services sign the path with every segment encoded a second time.
pub fn canonical_uri(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

pub fn derive_signing_key(secret: &str, date_stamp: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{}", secret).as_bytes(), date_stamp.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn normalize_header_value(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn example_credentials() -> StaticCredentials {
        StaticCredentials {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
            session_token: None,
        }
    }

    // Worked example from the AWS SigV4 documentation (IAM ListUsers).
    #[test]
    fn derives_documented_signing_key() {
        let key = derive_signing_key(
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            "20150830",
            "us-east-1",
            "iam",
        );
        assert_eq!(
            hex::encode(key),
            "c4afb1cc5771d871763a393e44b703571b55cc28424d1a5e86da6ed3c154a4b9"
        );
    }

    #[test]
    fn signs_documented_list_users_request() {
        let now = Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap();
        let headers = [("Content-Type", "application/x-www-form-urlencoded; charset=utf-8")];
        let request = SigningRequest {
            method: "GET",
            host: "iam.amazonaws.com",
            path: "/",
            query: "Action=ListUsers&Version=2010-05-08",
            headers: &headers,
            payload: b"",
        };
        let scope = SigningScope { region: "us-east-1", service: "iam" };

        let signed = sign(&request, &example_credentials(), &scope, now);

        assert_eq!(signed.amz_date, "20150830T123600Z");
        assert_eq!(
            signed.authorization,
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/iam/aws4_request, \
             SignedHeaders=content-type;host;x-amz-date, \
             Signature=5d672d79c15b13162d9279b0855cfba6789a8edb4c82c400e06b5924a6f2b5d7"
        );
    }

    #[test]
    fn session_token_is_signed_and_attached() {
        let mut creds = example_credentials();
        creds.session_token = Some("FQoGZXIvYXdzEXAMPLE".to_string());
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let request = SigningRequest {
            method: "POST",
            host: "bedrock-runtime.us-east-1.amazonaws.com",
            path: "/model/m/invoke",
            query: "",
            headers: &[("content-type", "application/json")],
            payload: b"{}",
        };
        let scope = SigningScope { region: "us-east-1", service: "bedrock" };

        let signed = sign(&request, &creds, &scope, now);

        assert!(signed
            .authorization
            .contains("SignedHeaders=content-type;host;x-amz-date;x-amz-security-token"));
        assert!(signed.authorization.contains("/20240301/us-east-1/bedrock/aws4_request"));
        let headers = signed.into_headers();
        assert!(headers
            .iter()
            .any(|(name, value)| *name == "x-amz-security-token" && value == "FQoGZXIvYXdzEXAMPLE"));
    }

    #[test]
    fn canonical_uri_double_encodes_segments() {
        assert_eq!(
            canonical_uri("/model/anthropic.claude-3-sonnet-20240229-v1%3A0/invoke"),
            "/model/anthropic.claude-3-sonnet-20240229-v1%253A0/invoke"
        );
        assert_eq!(canonical_uri("/"), "/");
        assert_eq!(canonical_uri(""), "/");
    }

    #[test]
    fn empty_payload_hash_is_well_known() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
