//! Server module for the wizard
//!
//! # Module Structure
//!
//! - `config`: Configuration structures for all server components
//! - `loader`: Configuration loading from files and environment
//! - `router`: HTTP route and layer assembly
//! - `init`: Main server initialization and run loop

pub mod config;
mod init;
mod loader;
mod router;

pub use init::run;
pub use loader::load_config;
