//! CQRS marker traits
//!
//! Commands change state; queries only read it. Handlers are registered with the
//! mediator the same way for both, and the markers let logging and tests tell them
//! apart.

/// Marker for write operations
pub trait Command {}

/// Marker for read operations
pub trait Query {}
