//! Droplet lifecycle
//!
//! Create flow:
//!
//! ```text
//! Start ─▶ KeyLookup ─┬─────────────▶ KeyReady ─▶ Creating ─▶ Polling ─▶ Done
//!                     └─▶ KeyUpload ──┘                        ↺ (no public IP yet)
//! ```
//!
//! Destroy flow: `Start ─▶ Loaded ─▶ Deleting ─▶ Done`.
//!
//! Every API failure is fatal. The only retry is the readiness poll, which
//! repeats while the droplet has no public address.

use crate::api::{CloudApi, CreateDropletRequest};
use crate::error::{CloudError, Result};
use crate::state::{PersistedState, StateManager};
use std::path::PathBuf;
use std::time::Duration;
use tinyform_core::{DropletConfig, FlowError, expand_home};
use tokio::fs;

pub const DEFAULT_PUBLIC_KEY: &str = "~/.ssh/id_rsa.pub";

/// Delay between readiness polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Readiness poll policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between attempts
    pub interval: Duration,

    /// Give up after this many attempts (`None` polls forever)
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
        }
    }
}

/// Create flow phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatePhase {
    Start,
    KeyLookup,
    KeyUpload,
    KeyReady,
    Creating,
    Polling,
    Done,
}

/// Destroy flow phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyPhase {
    Start,
    Loaded,
    Deleting,
    Done,
}

/// Progress reported to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    SshKeyReused { name: String, fingerprint: String },
    SshKeyUploaded { name: String, fingerprint: String },
    CreatingDroplet { name: String },
    DropletCreated { id: String },
    WaitingForAddress { id: String },
    PollAttempt { id: String, attempt: u32 },
    DropletReady { id: String, ip: String },
    StateSaved { path: PathBuf },
    DeletingDroplet { id: String },
    DropletDeleted { id: String },
}

type Observer<'a> = Box<dyn Fn(&LifecycleEvent) + Send + Sync + 'a>;

/// Runs the create and destroy flows against a [`CloudApi`]
pub struct Orchestrator<'a, A: CloudApi + ?Sized> {
    api: &'a A,
    state: StateManager,
    poll: PollPolicy,
    default_public_key: PathBuf,
    observer: Option<Observer<'a>>,
}

impl<'a, A: CloudApi + ?Sized> Orchestrator<'a, A> {
    pub fn new(api: &'a A, state: StateManager) -> Self {
        Self {
            api,
            state,
            poll: PollPolicy::default(),
            default_public_key: expand_home(DEFAULT_PUBLIC_KEY),
            observer: None,
        }
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Public key used when `ssh_keys` has no `file(...)` entry
    pub fn with_default_public_key(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_public_key = path.into();
        self
    }

    pub fn with_observer(
        mut self,
        observer: impl Fn(&LifecycleEvent) + Send + Sync + 'a,
    ) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    fn emit(&self, event: LifecycleEvent) {
        if let Some(observer) = &self.observer {
            observer(&event);
        }
    }

    /// Create the droplet, wait for its public address and persist the state
    pub async fn create(&self, droplet: &DropletConfig) -> Result<PersistedState> {
        let name = droplet.required("name")?;
        let region = droplet.required("region")?;
        let size = droplet.required("size")?;
        let image = droplet.required("image")?;
        let public_key = self.public_key(droplet).await?;

        create_transition(CreatePhase::Start, CreatePhase::KeyLookup);
        let fingerprint = self
            .ensure_ssh_key(&format!("{}-key", name), &public_key)
            .await?;

        create_transition(CreatePhase::KeyReady, CreatePhase::Creating);
        self.emit(LifecycleEvent::CreatingDroplet {
            name: name.to_string(),
        });
        let request = CreateDropletRequest::new(name, region, size, image, fingerprint);
        let created = self.api.create_droplet(&request).await?;
        self.emit(LifecycleEvent::DropletCreated {
            id: created.id.clone(),
        });

        create_transition(CreatePhase::Creating, CreatePhase::Polling);
        let ip = self.wait_for_public_ip(&created.id).await?;

        create_transition(CreatePhase::Polling, CreatePhase::Done);
        let state = PersistedState::new(created.id, ip);
        self.state.save(&state).await?;
        self.emit(LifecycleEvent::StateSaved {
            path: self.state.path().to_path_buf(),
        });

        Ok(state)
    }

    /// Reuse a registered key with the same public key material, or upload it.
    /// Returns the fingerprint.
    pub async fn ensure_ssh_key(&self, key_name: &str, public_key: &str) -> Result<String> {
        let keys = self.api.list_ssh_keys().await?;

        if let Some(existing) = keys.into_iter().find(|k| k.public_key.trim() == public_key) {
            tracing::debug!("SSH key already registered: {}", existing.name);
            create_transition(CreatePhase::KeyLookup, CreatePhase::KeyReady);
            self.emit(LifecycleEvent::SshKeyReused {
                name: existing.name,
                fingerprint: existing.fingerprint.clone(),
            });
            return Ok(existing.fingerprint);
        }

        create_transition(CreatePhase::KeyLookup, CreatePhase::KeyUpload);
        let uploaded = self.api.create_ssh_key(key_name, public_key).await?;
        create_transition(CreatePhase::KeyUpload, CreatePhase::KeyReady);
        self.emit(LifecycleEvent::SshKeyUploaded {
            name: uploaded.name,
            fingerprint: uploaded.fingerprint.clone(),
        });
        Ok(uploaded.fingerprint)
    }

    /// Poll the droplet until a public IPv4 address shows up
    pub async fn wait_for_public_ip(&self, id: &str) -> Result<String> {
        self.emit(LifecycleEvent::WaitingForAddress { id: id.to_string() });

        let mut attempt = 0;
        loop {
            attempt += 1;
            self.emit(LifecycleEvent::PollAttempt {
                id: id.to_string(),
                attempt,
            });

            let droplet = self.api.get_droplet(id).await?;
            if let Some(ip) = droplet.public_ipv4() {
                self.emit(LifecycleEvent::DropletReady {
                    id: id.to_string(),
                    ip: ip.to_string(),
                });
                return Ok(ip.to_string());
            }

            if let Some(max) = self.poll.max_attempts
                && attempt >= max
            {
                return Err(CloudError::Timeout(format!(
                    "droplet {} has no public IPv4 address after {} attempts",
                    id, attempt
                )));
            }

            tracing::debug!(
                "Droplet {} has no public address yet (attempt {})",
                id,
                attempt
            );
            tokio::time::sleep(self.poll.interval).await;
        }
    }

    /// Delete the droplet recorded in the state file
    pub async fn destroy(&self) -> Result<PersistedState> {
        let state = self.state.load().await?;
        destroy_transition(DestroyPhase::Start, DestroyPhase::Loaded);

        destroy_transition(DestroyPhase::Loaded, DestroyPhase::Deleting);
        self.emit(LifecycleEvent::DeletingDroplet {
            id: state.id.clone(),
        });
        self.api.delete_droplet(&state.id).await?;

        destroy_transition(DestroyPhase::Deleting, DestroyPhase::Done);
        self.emit(LifecycleEvent::DropletDeleted {
            id: state.id.clone(),
        });
        Ok(state)
    }

    /// Public key from `file(...)` in `ssh_keys`, otherwise the default key file
    async fn public_key(&self, droplet: &DropletConfig) -> Result<String> {
        if let Some(content) = &droplet.ssh_key_content {
            return Ok(content.clone());
        }

        let path = &self.default_public_key;
        let content = fs::read_to_string(path)
            .await
            .map_err(|_| FlowError::SshKeyFileNotFound { path: path.clone() })?;
        Ok(content.trim().to_string())
    }
}

fn create_transition(from: CreatePhase, to: CreatePhase) {
    tracing::debug!("create: {:?} -> {:?}", from, to);
}

fn destroy_transition(from: DestroyPhase, to: DestroyPhase) {
    tracing::debug!("destroy: {:?} -> {:?}", from, to);
}
