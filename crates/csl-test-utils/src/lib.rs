//! Shared test utilities for the csl-sync workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`client`]: [`RecordingClient`], an in-memory remote engine
//! - [`root`]: [`TestRoot`], a temporary definition tree with assertions

pub mod client;
pub mod root;

pub use client::RecordingClient;
pub use root::TestRoot;
