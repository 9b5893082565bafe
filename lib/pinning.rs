//! HTTP client for a Pinata-compatible IPFS pinning service.
//!
//! Issue photos are pinned before the report transaction is submitted; the
//! contract stores only the directory CID and the filenames.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::validation::ImageFile;

pub const DEFAULT_API_URL: &str = "https://api.pinata.cloud";
pub const DEFAULT_GATEWAY_URL: &str = "https://gateway.pinata.cloud/ipfs";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "pinning credentials not configured (set PINATA_JWT, or \
         PINATA_API_KEY and PINATA_SECRET_API_KEY)"
    )]
    MissingCredentials,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("pinning service returned HTTP {status}: {body}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Clone, Debug)]
pub enum PinningAuth {
    ApiKey { key: String, secret: String },
    Jwt(String),
}

#[derive(Clone, Debug)]
pub struct PinningConfig {
    pub api_url: String,
    pub gateway_url: String,
    pub auth: PinningAuth,
}

impl PinningConfig {
    /// Read credentials and URL overrides from the environment.
    ///
    /// `PINATA_JWT` wins over the key/secret pair. `PINATA_API_URL` and
    /// `PINATA_GATEWAY_URL` override the public endpoints.
    pub fn from_env() -> Result<Self, Error> {
        let auth = if let Ok(jwt) = std::env::var("PINATA_JWT") {
            PinningAuth::Jwt(jwt)
        } else {
            match (
                std::env::var("PINATA_API_KEY"),
                std::env::var("PINATA_SECRET_API_KEY"),
            ) {
                (Ok(key), Ok(secret)) => {
                    PinningAuth::ApiKey { key, secret }
                }
                _ => return Err(Error::MissingCredentials),
            }
        };
        Ok(Self {
            api_url: std::env::var("PINATA_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            gateway_url: std::env::var("PINATA_GATEWAY_URL")
                .unwrap_or_else(|_| DEFAULT_GATEWAY_URL.to_string()),
            auth,
        })
    }
}

/// Upload outcome: the directory CID plus the numbered filenames inside
/// it, in upload order.
#[derive(Clone, Debug)]
pub struct ImageUploadResult {
    pub cid: String,
    pub filenames: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Wraps `reqwest::Client` with the service URLs and credentials.
#[derive(Clone)]
pub struct PinningClient {
    http: reqwest::Client,
    config: PinningConfig,
}

impl PinningClient {
    pub fn new(config: PinningConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self { http, config })
    }

    fn with_auth(
        &self,
        request: reqwest::RequestBuilder,
    ) -> reqwest::RequestBuilder {
        match &self.config.auth {
            PinningAuth::Jwt(token) => request.bearer_auth(token),
            PinningAuth::ApiKey { key, secret } => request
                .header("pinata_api_key", key)
                .header("pinata_secret_api_key", secret),
        }
    }

    /// Pin a set of images as one wrapped directory.
    ///
    /// Files are renamed `{index}.{extension}` so the contract-side
    /// filename list stays small and predictable.
    pub async fn pin_images(
        &self,
        files: &[ImageFile],
        issue_tag: Option<&str>,
    ) -> Result<ImageUploadResult, Error> {
        let mut form = reqwest::multipart::Form::new();
        let mut filenames = Vec::with_capacity(files.len());
        for (index, file) in files.iter().enumerate() {
            let extension =
                file.extension().unwrap_or_else(|| "jpg".to_string());
            let filename = format!("{index}.{extension}");
            let part = reqwest::multipart::Part::bytes(file.bytes.clone())
                .file_name(filename.clone());
            form = form.part("file", part);
            filenames.push(filename);
        }

        let name = match issue_tag {
            Some(tag) => format!("civic-issue-{tag}-images"),
            None => "civic-issue-images".to_string(),
        };
        let metadata = serde_json::json!({
            "name": name,
            "keyvalues": { "type": "civic-issue-images" },
        });
        let options = serde_json::json!({
            "cidVersion": 1,
            "wrapWithDirectory": true,
        });
        form = form
            .text("pinataMetadata", metadata.to_string())
            .text("pinataOptions", options.to_string());

        let url = format!("{}/pinning/pinFileToIPFS", self.config.api_url);
        let response = self
            .with_auth(self.http.post(&url))
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::UnexpectedStatus { status, body });
        }

        let pinned: PinResponse = response.json().await?;
        tracing::info!(
            cid = %pinned.ipfs_hash,
            files = filenames.len(),
            "pinned issue images"
        );
        Ok(ImageUploadResult {
            cid: pinned.ipfs_hash,
            filenames,
        })
    }

    /// Verify the configured credentials against the service.
    pub async fn test_authentication(&self) -> Result<(), Error> {
        let url =
            format!("{}/data/testAuthentication", self.config.api_url);
        let response = self.with_auth(self.http.get(&url)).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(Error::UnexpectedStatus { status, body })
        }
    }

    /// Gateway URL for one stored image.
    ///
    /// A filename that is itself a CID (`Q…`/`b…` prefix, legacy single-file
    /// pins) is addressed directly instead of through the directory.
    pub fn image_url(&self, cid: &str, filename: &str) -> String {
        if filename.starts_with('Q') || filename.starts_with('b') {
            format!("{}/{}", self.config.gateway_url, filename)
        } else {
            format!("{}/{}/{}", self.config.gateway_url, cid, filename)
        }
    }

    pub fn image_urls(
        &self,
        cid: &str,
        filenames: &[String],
    ) -> Vec<String> {
        filenames
            .iter()
            .map(|filename| self.image_url(cid, filename))
            .collect()
    }
}
