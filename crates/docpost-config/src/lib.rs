pub mod config;
pub mod error;
pub mod transforms;

pub use config::Config;
pub use error::ConfigError;
pub use transforms::TransformsConfig;
