//! Use cases (interactors) for recsync
//!
//! This module contains the application use cases that orchestrate
//! domain entities and port interfaces. The record synchronization
//! workflow lives in the `recsync-sync` crate; this module holds the
//! operator session lifecycle.
//!
//! ## Use Cases
//!
//! - [`AuthenticateUseCase`] - Login, logout and session status

pub mod authenticate;

pub use authenticate::AuthenticateUseCase;
