//! recsync Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `Record`, `Fields`, `RecordShape`, `Session`, `SyncState`
//! - **Use cases** - `AuthenticateUseCase`
//! - **Port definitions** - Traits for adapters: `IRecordStore`, `IAuthProvider`,
//!   `ISessionStore`, `ISyncObserver`
//! - **State machine** - Record synchronization states and the transition function
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure business logic with no I/O.
//! Ports define trait interfaces that adapter crates implement.
//! Use cases orchestrate domain entities through port interfaces.

pub mod config;
pub mod domain;
pub mod functions;
pub mod ports;
pub mod usecases;
