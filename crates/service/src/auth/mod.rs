//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Centralizes credential verification and token issuance under the service
//! crate; the HTTP layer only maps errors to status codes.

pub mod domain;
pub mod errors;
pub mod repo;
pub mod repository;
pub mod service;

pub use service::AuthService;
