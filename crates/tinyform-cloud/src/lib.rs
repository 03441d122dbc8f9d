//! Tinyform Cloud
//!
//! DigitalOcean API client and the droplet lifecycle built on top of it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 tinyform CLI                  │
//! │            (create / --destroy)               │
//! └───────────────────┬──────────────────────────┘
//!                     │ Deployment (tinyform-core)
//! ┌───────────────────▼──────────────────────────┐
//! │                tinyform-cloud                 │
//! │  ┌──────────────────┐  ┌──────────────────┐  │
//! │  │   Orchestrator   │  │   StateManager   │  │
//! │  │ (create/destroy) │  │    (.tfstate)    │  │
//! │  └────────┬─────────┘  └──────────────────┘  │
//! │  ┌────────▼─────────────────────────────┐    │
//! │  │        trait CloudApi { ... }        │    │
//! │  └────────┬─────────────────────────────┘    │
//! └───────────┼──────────────────────────────────┘
//!             │
//!     ┌───────▼────────┐
//!     │  DigitalOcean  │
//!     │   REST API v2  │
//!     └────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tinyform_cloud::{DigitalOceanClient, Orchestrator, StateManager};
//!
//! let deployment = tinyform_core::load_configuration("main.tf")?;
//! let client = DigitalOceanClient::new(&deployment.token);
//! let orchestrator = Orchestrator::new(&client, StateManager::default());
//!
//! let state = orchestrator.create(&deployment.droplet).await?;
//! println!("{} -> {}", state.id, state.ip);
//! ```

pub mod api;
pub mod digitalocean;
pub mod error;
pub mod lifecycle;
pub mod state;

// Re-exports
pub use api::{CloudApi, CreateDropletRequest, Droplet, NetworkV4, Networks, SshKey};
pub use digitalocean::{DIGITALOCEAN_API_BASE, DigitalOceanClient};
pub use error::{CloudError, Result};
pub use lifecycle::{
    CreatePhase, DEFAULT_POLL_INTERVAL, DEFAULT_PUBLIC_KEY, DestroyPhase, LifecycleEvent,
    Orchestrator, PollPolicy,
};
pub use state::{DEFAULT_STATE_FILE, PersistedState, StateManager};
