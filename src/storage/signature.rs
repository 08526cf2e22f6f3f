//! SharedKey request signing for the blob service.
//!
//! Implements the SharedKey authorization scheme: an HMAC-SHA256 over a
//! canonical string built from the verb, the standard headers, the `x-ms-*`
//! headers and the canonical resource, keyed with the decoded account key.

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::BTreeMap;

type HmacSha256 = Hmac<Sha256>;

/// Service version sent with every request.
pub const STORAGE_API_VERSION: &str = "2021-08-06";

/// Standard headers that take part in the string-to-sign, in order.
const SIGNED_STANDARD_HEADERS: [&str; 11] = [
    "content-encoding",
    "content-language",
    "content-length",
    "content-md5",
    "content-type",
    "date",
    "if-modified-since",
    "if-match",
    "if-none-match",
    "if-unmodified-since",
    "range",
];

/// A request as seen by the signer.
#[derive(Debug, Clone, Default)]
pub struct CanonicalRequest {
    /// HTTP verb, upper case.
    pub method: String,
    /// Encoded URL path, starting with `/`.
    pub path: String,
    /// Query parameters.
    pub query: Vec<(String, String)>,
    /// Request headers, names lower-cased.
    pub headers: BTreeMap<String, String>,
}

impl CanonicalRequest {
    /// Create a request for a verb and path.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            query: Vec::new(),
            headers: BTreeMap::new(),
        }
    }

    /// Add a header.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }
}

/// Signs requests with an account key.
#[derive(Clone)]
pub struct SharedKeySigner {
    account_name: String,
    key: Vec<u8>,
}

impl SharedKeySigner {
    /// Create a signer from the account name and decoded key.
    pub fn new(account_name: impl Into<String>, key: Vec<u8>) -> Self {
        Self {
            account_name: account_name.into(),
            key,
        }
    }

    /// Build the canonical string-to-sign for a request.
    pub fn string_to_sign(&self, request: &CanonicalRequest) -> String {
        let mut out = String::new();
        out.push_str(&request.method.to_ascii_uppercase());
        out.push('\n');

        for name in SIGNED_STANDARD_HEADERS {
            let value = request.headers.get(name).map(String::as_str).unwrap_or("");
            // A zero content length is signed as an empty string.
            let value = if name == "content-length" && value == "0" { "" } else { value };
            out.push_str(value);
            out.push('\n');
        }

        out.push_str(&self.canonicalized_headers(&request.headers));
        out.push_str(&self.canonicalized_resource(&request.path, &request.query));
        out
    }

    /// Compute the `Authorization` header value for a request.
    pub fn authorization(&self, request: &CanonicalRequest) -> String {
        let signature = self.sign(&self.string_to_sign(request));
        format!("SharedKey {}:{}", self.account_name, signature)
    }

    fn sign(&self, string_to_sign: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC can take key of any size");
        mac.update(string_to_sign.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }

    fn canonicalized_headers(&self, headers: &BTreeMap<String, String>) -> String {
        // BTreeMap iteration is already sorted by lower-cased name.
        headers
            .iter()
            .filter(|(name, _)| name.starts_with("x-ms-"))
            .map(|(name, value)| format!("{}:{}\n", name, value.trim()))
            .collect()
    }

    fn canonicalized_resource(&self, path: &str, query: &[(String, String)]) -> String {
        let mut resource = format!("/{}{}", self.account_name, path);

        let mut params: BTreeMap<String, Vec<&str>> = BTreeMap::new();
        for (name, value) in query {
            params
                .entry(name.to_ascii_lowercase())
                .or_default()
                .push(value.as_str());
        }

        for (name, mut values) in params {
            values.sort_unstable();
            resource.push('\n');
            resource.push_str(&name);
            resource.push(':');
            resource.push_str(&values.join(","));
        }

        resource
    }
}

impl std::fmt::Debug for SharedKeySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedKeySigner")
            .field("account_name", &self.account_name)
            .finish_non_exhaustive()
    }
}

/// Format a timestamp the way the `x-ms-date` header expects (RFC 1123).
pub fn format_ms_date(time: chrono::DateTime<chrono::Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn signer() -> SharedKeySigner {
        SharedKeySigner::new("homes", b"secret".to_vec())
    }

    fn blob_request() -> CanonicalRequest {
        CanonicalRequest::new("GET", "/models/models/linear_model.json")
            .header("x-ms-version", STORAGE_API_VERSION)
            .header("x-ms-date", "Mon, 05 Feb 2024 10:00:00 GMT")
    }

    #[test]
    fn test_string_to_sign_layout() {
        let sts = signer().string_to_sign(&blob_request());
        let expected = format!(
            "GET\n{}x-ms-date:Mon, 05 Feb 2024 10:00:00 GMT\nx-ms-version:2021-08-06\n/homes/models/models/linear_model.json",
            "\n".repeat(11)
        );
        assert_eq!(sts, expected);
    }

    #[test]
    fn test_zero_content_length_is_blank() {
        let with_zero = signer().string_to_sign(&blob_request().header("Content-Length", "0"));
        let without = signer().string_to_sign(&blob_request());
        assert_eq!(with_zero, without);

        let with_len = signer().string_to_sign(&blob_request().header("Content-Length", "12"));
        assert!(with_len.starts_with("GET\n\n\n12\n"));
    }

    #[test]
    fn test_query_parameters_are_sorted() {
        let mut request = blob_request();
        request.query = vec![
            ("restype".to_string(), "container".to_string()),
            ("Comp".to_string(), "list".to_string()),
        ];
        let sts = signer().string_to_sign(&request);
        assert!(sts.ends_with("/homes/models/models/linear_model.json\ncomp:list\nrestype:container"));
    }

    #[test]
    fn test_non_ms_headers_are_not_canonicalized() {
        let sts = signer().string_to_sign(&blob_request().header("user-agent", "homeprice"));
        assert!(!sts.contains("user-agent"));
    }

    #[test]
    fn test_authorization_format() {
        let auth = signer().authorization(&blob_request());
        let (scheme, rest) = auth.split_once(' ').unwrap();
        assert_eq!(scheme, "SharedKey");
        let (account, signature) = rest.split_once(':').unwrap();
        assert_eq!(account, "homes");
        assert_eq!(STANDARD.decode(signature).unwrap().len(), 32);
    }

    #[test]
    fn test_signature_depends_on_key() {
        let other = SharedKeySigner::new("homes", b"other".to_vec());
        assert_ne!(
            signer().authorization(&blob_request()),
            other.authorization(&blob_request())
        );
        assert_eq!(
            signer().authorization(&blob_request()),
            signer().authorization(&blob_request())
        );
    }

    #[test]
    fn test_format_ms_date() {
        let time = chrono::Utc.with_ymd_and_hms(2024, 2, 5, 10, 0, 0).unwrap();
        assert_eq!(format_ms_date(time), "Mon, 05 Feb 2024 10:00:00 GMT");
    }

    #[test]
    fn test_debug_hides_key() {
        assert!(!format!("{:?}", signer()).contains("secret"));
    }
}
