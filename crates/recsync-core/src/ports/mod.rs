//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IRecordStore`] - Paginated query, save and delete against the remote store
//! - [`IAuthProvider`] - Login, logout and session validation
//! - [`ISessionStore`] - Local persistence of the operator session
//! - [`ISyncObserver`] - Receives every state the sync engine emits

pub mod auth_provider;
pub mod observer;
pub mod record_store;

pub use auth_provider::{IAuthProvider, ISessionStore};
pub use observer::{ISyncObserver, NoopObserver};
pub use record_store::IRecordStore;
