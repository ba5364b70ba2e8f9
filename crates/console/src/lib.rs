//! `shopdesk-console`
//!
//! **Responsibility:** the admin console's client side of the catalog.
//!
//! This crate provides:
//! - The catalog store (local entries kept in step with the remote catalog)
//! - The remote catalog service contract and its HTTP client
//! - Notifications, view scopes and configuration
//! - Command handlers used by the console views and the `shopdesk` binary
//!
//! The remote catalog service stays the authority; nothing is persisted locally.

pub mod commands;
pub mod config;
pub mod notify;
pub mod remote;
pub mod scope;
pub mod store;

pub use commands::ConsoleState;
pub use config::{ConsoleConfig, UpdateMode};
pub use notify::{Notification, NotificationCenter, NotificationLevel, NotificationStream};
pub use remote::{CatalogService, HttpCatalogService, RemoteError};
pub use scope::{ViewHandle, ViewScope};
pub use store::{CatalogState, CatalogStore, StoreError};
