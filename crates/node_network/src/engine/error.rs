//! Engine errors

use thiserror::Error;

use crate::config::ConfigError;
use crate::pool::PoolError;

/// Errors raised by [`NetworkEngine`](super::NetworkEngine)
#[derive(Error, Debug)]
pub enum EngineError {
    /// A render resource could not be provided
    #[error("render resource error: {0}")]
    Pool(#[from] PoolError),

    /// The container has no usable size
    #[error("invalid container size {width}x{height}")]
    InvalidContainer {
        /// Requested width in pixels
        width: f32,
        /// Requested height in pixels
        height: f32,
    },

    /// Settings could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The engine has already been torn down
    #[error("engine has been torn down")]
    TornDown,
}
