//! REST API client module for the cost-estimation backend.
//!
//! This module provides the `ApiClient` for authenticating against the
//! backend and fetching reference data, process flows, machine rates and
//! cost aggregates.
//!
//! The API uses JWT bearer token authentication obtained through the
//! backend's `/login` endpoint; every protected request carries an
//! `Authorization: Bearer <token>` header.

pub mod client;
pub mod error;

pub use client::{ApiClient, LoginResponse};
pub use error::ApiError;
