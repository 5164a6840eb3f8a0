pub mod config;
pub mod edit;
pub mod upload;

pub use config::*;
pub use edit::*;
