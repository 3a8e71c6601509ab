//! Authentication module: the session guard and its collaborators.
//!
//! This module provides:
//! - `SessionGuard`: the client-side session lifecycle (login, expiry,
//!   inactivity timeout, logout)
//! - `StateStore`: the key-value seam behind which session fields persist
//! - `Role`: the closed role set with its capability table
//! - `CredentialStore`: optional OS-keychain password storage
//!
//! The guard fails closed: a credential whose expiry cannot be decoded
//! is treated as already expired.

pub mod credentials;
pub mod guard;
pub mod role;
pub mod store;
pub mod token;

pub use credentials::CredentialStore;
pub use guard::{
    Session, SessionError, SessionGuard, SessionNotice, SessionState, Validity,
    INACTIVITY_THRESHOLD_MS, REDIRECT_DELAY_MS,
};
pub use role::{Capability, Role};
pub use store::{FileStore, MemoryStore, StateStore};
