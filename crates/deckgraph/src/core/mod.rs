//! Core abstractions for deck graph processing
//!
//! This module defines the traits shared by every pipeline stage together
//! with the domain types, errors, configuration and logging setup.

mod config;
mod database;
mod error;
mod layout;
pub mod logging;
mod parser;
mod renderer;
mod types;

pub use config::*;
pub use database::*;
pub use error::*;
pub use layout::*;
pub use logging::*;
pub use parser::*;
pub use renderer::*;
pub use types::*;
