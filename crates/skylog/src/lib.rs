//! `skylog` - A personal flight logbook
//!
//! This library provides the core functionality for recording flights,
//! tracking pilot currency and certificate expirations, exporting the
//! logbook as a static site, and publishing it to a git remote.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod airports;
pub mod cli;
pub mod config;
pub mod currency;
pub mod error;
pub mod export;
pub mod logging;
pub mod model;
pub mod publish;
pub mod stats;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use storage::Storage;
