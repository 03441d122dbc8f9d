//! Cloud API abstraction
//!
//! The orchestrator only talks to the provider through [`CloudApi`], so the
//! HTTP adapter can be swapped for an in-memory fake in tests.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

/// Operations the droplet lifecycle needs from the provider
#[async_trait]
pub trait CloudApi: Send + Sync {
    /// List SSH keys registered on the account
    async fn list_ssh_keys(&self) -> Result<Vec<SshKey>>;

    /// Register a public key and return it with its fingerprint
    async fn create_ssh_key(&self, name: &str, public_key: &str) -> Result<SshKey>;

    /// Submit a droplet create request
    async fn create_droplet(&self, request: &CreateDropletRequest) -> Result<Droplet>;

    /// Fetch a droplet by id
    async fn get_droplet(&self, id: &str) -> Result<Droplet>;

    /// Delete a droplet by id
    async fn delete_droplet(&self, id: &str) -> Result<()>;
}

/// SSH key registered on the account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshKey {
    pub name: String,

    #[serde(default)]
    pub public_key: String,

    pub fingerprint: String,
}

/// Droplet create payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDropletRequest {
    pub name: String,
    pub region: String,
    pub size: String,
    pub image: String,
    pub ssh_keys: Vec<String>,
    pub backups: bool,
    pub ipv6: bool,
    pub user_data: Option<String>,
    pub private_networking: Option<bool>,
    pub volumes: Option<Vec<String>>,
    pub tags: Vec<String>,
}

impl CreateDropletRequest {
    /// Build a request with the fixed defaults: no backups, no IPv6, no user
    /// data, no private networking, no volumes and no tags.
    pub fn new(
        name: impl Into<String>,
        region: impl Into<String>,
        size: impl Into<String>,
        image: impl Into<String>,
        fingerprint: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            size: size.into(),
            image: image.into(),
            ssh_keys: vec![fingerprint.into()],
            backups: false,
            ipv6: false,
            user_data: None,
            private_networking: None,
            volumes: None,
            tags: Vec::new(),
        }
    }
}

/// Droplet as returned by the provider (only the fields we use)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Droplet {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: String,

    #[serde(default)]
    pub networks: Networks,
}

impl Droplet {
    /// First public IPv4 address, if one has been assigned
    pub fn public_ipv4(&self) -> Option<&str> {
        self.networks
            .v4
            .iter()
            .find(|n| n.network_type == "public")
            .map(|n| n.ip_address.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Networks {
    #[serde(default)]
    pub v4: Vec<NetworkV4>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkV4 {
    pub ip_address: String,

    #[serde(rename = "type")]
    pub network_type: String,
}

/// Droplet ids are numeric on the wire but carried as strings
pub(crate) fn id_from_number_or_string<'de, D>(
    deserializer: D,
) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(u64),
        Text(String),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Number(n) => n.to_string(),
        Id::Text(s) => s,
    })
}
