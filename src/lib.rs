//! # pos-admin
//!
//! Administrative client for a small retail point-of-sale backend.
//!
//! The backend owns every entity and all business rules. This crate talks
//! to its REST API and adds the client-side work around it: listing with
//! in-memory filters and pages, a sales cart with stock checks, order
//! submission with explicit compensation, and reports reduced from the raw
//! collections.
//!
//! ## Modules
//!
//! - [`client`]: REST client, session context and the [`client::Backend`] seam
//! - [`domain`]: entity snapshots and [`domain::Money`]
//! - [`validation`]: client-side checks for create/update payloads
//! - [`listing`]: filters, pagination and list statistics
//! - [`sales`]: cart, sales session and checkout
//! - [`reports`]: dashboard aggregation
//! - [`notify`]: transient user notices
//! - [`render`]: table / JSON / CSV output
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pos_admin::client::{ClientConfig, Credentials, PosClient, SessionContext};
//! use pos_admin::reports::{Dashboard, Period};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Arc::new(SessionContext::in_memory());
//!     let client = PosClient::new(ClientConfig::default(), session)?;
//!
//!     client
//!         .login(&Credentials {
//!             email: "admin@shop.test".into(),
//!             password: "secret".into(),
//!         })
//!         .await?;
//!
//!     let dashboard = Dashboard::load(&client, Period::LastWeek, chrono::Utc::now(), 5).await?;
//!     println!("Revenue: {}", dashboard.summary.revenue);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod domain;
pub mod listing;
pub mod notify;
pub mod render;
pub mod reports;
pub mod sales;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ClientError, ClientResult, PosClient, SessionContext};
pub use config::Config;
pub use domain::Money;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
