//! Configuration loading for the Canta backend.
//!
//! Two sources, in order of preference: a JSON config file with `${VAR}`
//! env substitution, or plain environment variables with defaults.

pub mod env;
pub mod io;
pub mod schema;

pub use env::{resolve_env_vars, MissingEnvVarError};
pub use io::{load_config, load_or_env};
pub use schema::{CantaConfig, LogConfig, ServerConfig, VisionConfig};
