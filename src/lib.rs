// ABOUTME: Library root for the audiomaster client
// ABOUTME: Exposes configuration, the remote protocol and the run driver

pub mod config;
pub mod driver;
pub mod error;
pub mod logging;
pub mod remote;

pub use config::Config;
pub use driver::{Mode, Outcome};
pub use error::MasterError;
