//! # namesync clients
//!
//! HTTP clients for the two platforms namesync reconciles.
//!
//! - [`FirewallaClient`] reads the authoritative inventory from the
//!   Firewalla MSP API and implements [`namesync_engine::MasterSource`].
//! - [`UnifiClient`] reads and renames clients through the UniFi Network
//!   integration API and implements [`namesync_engine::FollowerTarget`].
//!
//! Both share a retrying JSON transport: rate-limited (429) and server
//! error responses are retried with exponential backoff, honouring
//! `Retry-After`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use namesync_clients::{FirewallaClient, FirewallaConfig, UnifiClient, UnifiConfig};
//! use namesync_engine::{ReconcileEngine, RunConfig};
//!
//! let master = FirewallaClient::new(&FirewallaConfig::new(fw_host, fw_token))?;
//! let follower = UnifiClient::new(&UnifiConfig::new(unifi_host, api_key, site_id))?;
//! let report = ReconcileEngine::new(RunConfig::default(), master, follower).run().await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod firewalla;
mod http;
mod unifi;

pub use config::{FirewallaConfig, HttpConfig, RetryConfig, UnifiConfig, DEFAULT_PAGE_SIZE};
pub use error::{ClientError, ClientResult};
pub use firewalla::{FirewallaClient, FIREWALLA};
pub use unifi::{ConnectionType, UnifiClient, UNIFI};
