// src/error.rs
//! Crate-wide error handling.
//!
//! The simulation core is infallible by design (every branch of the
//! integrator produces a defined, finite result), so this enum only covers
//! the application boundary: asset decoding, GPU/surface setup, config
//! parsing. Works with `?`, and with `anyhow::Context` where the error
//! source is a foreign crate.

use thiserror::Error;

/// Main error type — lightweight, Send + Sync + 'static.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// I/O errors (asset files, config files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Vehicle model decode failures. Recovered at the boundary by
    /// substituting the placeholder mesh.
    #[error("asset error: {0}")]
    Asset(String),

    /// Window / surface / adapter setup failures.
    #[error("graphics error: {0}")]
    Graphics(String),

    /// Config (de)serialization.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// Opaque wrapper for any other error (great for foreign crates).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    #[inline]
    pub fn asset<S: Into<String>>(msg: S) -> Self {
        Self::Asset(msg.into())
    }

    #[inline]
    pub fn graphics<S: Into<String>>(msg: S) -> Self {
        Self::Graphics(msg.into())
    }

    #[inline]
    pub fn is_asset(&self) -> bool {
        matches!(self, Error::Asset(_))
    }
}

/// Convenient `Result` alias — use `crate::Result<T>` everywhere.
pub type Result<T> = std::result::Result<T, Error>;
