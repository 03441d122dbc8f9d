//! DigitalOcean API client
//!
//! Direct REST implementation of [`CloudApi`] using Bearer token authentication.

use crate::api::{CloudApi, CreateDropletRequest, Droplet, SshKey};
use crate::error::{CloudError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const DIGITALOCEAN_API_BASE: &str = "https://api.digitalocean.com/v2";

const KEYS_PER_PAGE: u32 = 200;

/// DigitalOcean REST client
pub struct DigitalOceanClient {
    client: reqwest::Client,
    api_token: String,
    base_url: String,
}

impl DigitalOceanClient {
    /// Create a client for the public API
    pub fn new(api_token: impl Into<String>) -> Self {
        Self::with_base_url(api_token, DIGITALOCEAN_API_BASE)
    }

    /// Create a client against a different base URL (e.g. a mock server)
    pub fn with_base_url(api_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_token: api_token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-2xx response into [`CloudError::RemoteApi`]
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&body)
            .map(|e| e.message)
            .ok()
            .filter(|m| !m.is_empty())
            .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            });

        Err(CloudError::RemoteApi {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl CloudApi for DigitalOceanClient {
    async fn list_ssh_keys(&self) -> Result<Vec<SshKey>> {
        let mut keys = Vec::new();
        let mut page = 1;

        loop {
            let url = self.url(&format!(
                "/account/keys?page={}&per_page={}",
                page, KEYS_PER_PAGE
            ));
            let response = self
                .client
                .get(&url)
                .bearer_auth(&self.api_token)
                .send()
                .await?;

            let body: SshKeysResponse = Self::check(response).await?.json().await?;
            keys.extend(body.ssh_keys);

            let has_next = body
                .links
                .and_then(|l| l.pages)
                .and_then(|p| p.next)
                .is_some();
            if !has_next {
                break;
            }
            page += 1;
        }

        tracing::debug!("Listed {} SSH keys", keys.len());
        Ok(keys)
    }

    async fn create_ssh_key(&self, name: &str, public_key: &str) -> Result<SshKey> {
        let request_body = CreateSshKeyRequest {
            name: name.to_string(),
            public_key: public_key.to_string(),
        };

        let response = self
            .client
            .post(self.url("/account/keys"))
            .bearer_auth(&self.api_token)
            .json(&request_body)
            .send()
            .await?;

        let body: SshKeyResponse = Self::check(response).await?.json().await?;
        tracing::info!("Uploaded SSH key {} ({})", body.ssh_key.name, body.ssh_key.fingerprint);
        Ok(body.ssh_key)
    }

    async fn create_droplet(&self, request: &CreateDropletRequest) -> Result<Droplet> {
        let response = self
            .client
            .post(self.url("/droplets"))
            .bearer_auth(&self.api_token)
            .json(request)
            .send()
            .await?;

        let body: DropletResponse = Self::check(response).await?.json().await?;
        tracing::info!("Created droplet {} ({})", request.name, body.droplet.id);
        Ok(body.droplet)
    }

    async fn get_droplet(&self, id: &str) -> Result<Droplet> {
        let response = self
            .client
            .get(self.url(&format!("/droplets/{}", id)))
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        let body: DropletResponse = Self::check(response).await?.json().await?;
        Ok(body.droplet)
    }

    async fn delete_droplet(&self, id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/droplets/{}", id)))
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        Self::check(response).await?;
        tracing::info!("Deleted droplet {}", id);
        Ok(())
    }
}

// ============ API Types ============

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct SshKeysResponse {
    #[serde(default)]
    ssh_keys: Vec<SshKey>,
    links: Option<Links>,
}

#[derive(Debug, Deserialize)]
struct Links {
    pages: Option<Pages>,
}

#[derive(Debug, Deserialize)]
struct Pages {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SshKeyResponse {
    ssh_key: SshKey,
}

#[derive(Debug, Serialize)]
struct CreateSshKeyRequest {
    name: String,
    public_key: String,
}

#[derive(Debug, Deserialize)]
struct DropletResponse {
    droplet: Droplet,
}
