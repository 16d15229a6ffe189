//! Roster Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared plumbing for the Roster workspace members.
//!
//! - **Error Handling**: the [`RosterError`] type and [`Result`] alias
//! - **Logging**: tracing subscriber setup driven by environment variables
//!
//! # Example
//!
//! ```no_run
//! use roster_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> roster_common::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     let _guard = init_logging(&config)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

pub use error::{Result, RosterError};
