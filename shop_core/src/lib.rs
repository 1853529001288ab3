#![forbid(unsafe_code)]

//! Core client library for the minishop marketplace backend.
//!
//! This crate provides:
//! - Wire types (users, products, orders, notifications)
//! - Session persistence
//! - Request gateway and outcome mapping
//! - Transports (reqwest, development mock layer)
//! - Typed endpoint wrappers

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod notify;
pub mod session;
pub mod request;
pub mod outcome;
pub mod transport;
pub mod gateway;
pub mod mock;
pub mod api;
pub mod client;

// Re-export commonly used types
pub use error::{ApiError, Error, Result, ValidationKind};
pub use types::*;
pub use config::{Config, Environment};
pub use notify::{LogNotifier, Notice, Notifier};
pub use session::{Session, SessionStore};
pub use request::{Method, RequestDescriptor};
pub use outcome::{Body, Outcome};
pub use transport::{HttpTransport, Transport};
pub use gateway::Gateway;
pub use mock::MockLayer;
pub use client::ShopClient;
