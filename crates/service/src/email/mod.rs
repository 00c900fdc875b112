//! Outbound email: transport abstraction, HTTP provider client, templating.
//!
//! Delivery is fire-and-forget from the caller's point of view; completion is
//! reported through a oneshot channel and the log stream, never by blocking
//! business flows.

pub mod errors;
pub mod http;
pub mod sender;
pub mod template;

pub use errors::EmailError;
pub use sender::EmailSender;
