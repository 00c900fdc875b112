//! Service layer providing business-oriented operations on top of models.
//! - Separates business logic from data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod auth;
pub mod email;
pub mod errors;
pub mod schedule;
pub mod storage;
pub mod student_service;
#[cfg(test)]
pub mod test_support;
