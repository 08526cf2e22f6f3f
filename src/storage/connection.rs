//! Storage account connection strings.
//!
//! A connection string is a list of `Key=Value` pairs separated by `;`, e.g.
//! `DefaultEndpointsProtocol=https;AccountName=acct;AccountKey=...;EndpointSuffix=core.windows.net`.
//! Keys are matched case-insensitively; values may themselves contain `=`
//! (account keys are base64 and SAS tokens are query strings).

use crate::error::{PriceError, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::collections::BTreeMap;

const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

/// Well-known account of the local storage emulator.
const DEV_ACCOUNT_NAME: &str = "devstoreaccount1";
const DEV_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
const DEV_BLOB_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";

/// Parsed connection string.
#[derive(Debug, Clone, Default)]
pub struct ConnectionString {
    pairs: BTreeMap<String, String>,
}

impl ConnectionString {
    /// Parse a raw connection string.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut pairs = BTreeMap::new();

        for part in raw.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let (key, value) = part.split_once('=').ok_or_else(|| {
                PriceError::Config(format!("Malformed connection string segment: '{}'", part))
            })?;

            pairs.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
        }

        if pairs.is_empty() {
            return Err(PriceError::Config("Connection string is empty".into()));
        }

        Ok(Self { pairs })
    }

    /// Look up a key, ignoring case.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Resolve the connection string into account settings.
    pub fn into_account(self) -> Result<StorageAccount> {
        if self
            .get("UseDevelopmentStorage")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        {
            return StorageAccount::development();
        }

        let name = self.get("AccountName").map(str::to_string);

        let key = self
            .get("AccountKey")
            .map(|k| {
                STANDARD
                    .decode(k)
                    .map_err(|e| PriceError::Config(format!("AccountKey is not valid base64: {}", e)))
            })
            .transpose()?;

        let sas = self
            .get("SharedAccessSignature")
            .map(|s| s.trim_start_matches('?').to_string());

        let blob_endpoint = match self.get("BlobEndpoint") {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => {
                let account = name.as_deref().ok_or_else(|| {
                    PriceError::Config("Connection string is missing AccountName".into())
                })?;
                let protocol = self.get("DefaultEndpointsProtocol").unwrap_or("https");
                let suffix = self.get("EndpointSuffix").unwrap_or(DEFAULT_ENDPOINT_SUFFIX);
                format!("{}://{}.blob.{}", protocol, account, suffix)
            }
        };

        let credential = match (key, sas) {
            (Some(key), _) => {
                let account_name = name.ok_or_else(|| {
                    PriceError::Config("AccountKey requires AccountName".into())
                })?;
                Credential::SharedKey { account_name, key }
            }
            (None, Some(token)) => Credential::Sas(token),
            (None, None) => {
                return Err(PriceError::Config(
                    "Connection string must contain AccountKey or SharedAccessSignature".into(),
                ))
            }
        };

        Ok(StorageAccount {
            blob_endpoint,
            credential,
        })
    }
}

/// How requests to the account are authorized.
#[derive(Clone)]
pub enum Credential {
    /// Sign each request with the account key.
    SharedKey { account_name: String, key: Vec<u8> },
    /// Append a pre-signed query string.
    Sas(String),
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::SharedKey { account_name, .. } => f
                .debug_struct("SharedKey")
                .field("account_name", account_name)
                .field("key", &"<redacted>")
                .finish(),
            Credential::Sas(_) => f.write_str("Sas(<redacted>)"),
        }
    }
}

/// Resolved account settings.
#[derive(Debug, Clone)]
pub struct StorageAccount {
    /// Base URL of the blob service, without a trailing slash.
    pub blob_endpoint: String,
    /// Request authorization.
    pub credential: Credential,
}

impl StorageAccount {
    /// Settings for the local storage emulator.
    pub fn development() -> Result<Self> {
        let key = STANDARD
            .decode(DEV_ACCOUNT_KEY)
            .map_err(|e| PriceError::Internal(e.to_string()))?;
        Ok(Self {
            blob_endpoint: DEV_BLOB_ENDPOINT.to_string(),
            credential: Credential::SharedKey {
                account_name: DEV_ACCOUNT_NAME.to_string(),
                key,
            },
        })
    }

    /// URL of a blob, without any query string.
    pub fn blob_url(&self, container: &str, blob: &str) -> String {
        format!(
            "{}/{}/{}",
            self.blob_endpoint,
            container.trim_matches('/'),
            blob.trim_start_matches('/')
        )
    }
}
