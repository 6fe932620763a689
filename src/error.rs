//! Error type shared by the controller and its hosts.

use thiserror::Error;

/// Errors raised while driving a marquee container.
///
/// None of these ever reach the page: the browser entry point logs them and
/// leaves the marquee static.
#[derive(Error, Debug)]
pub enum MarqueeError {
    #[error("Invalid marquee config: {0}")]
    InvalidConfig(String),

    /// A host (DOM) call failed.
    #[error("DOM operation failed ({context}): {message}")]
    Dom {
        context: &'static str,
        message: String,
    },

    #[cfg(feature = "toml")]
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl MarqueeError {
    /// Build a [`MarqueeError::Dom`] from any debuggable host error.
    pub fn dom(context: &'static str, err: impl std::fmt::Debug) -> Self {
        MarqueeError::Dom {
            context,
            message: format!("{:?}", err),
        }
    }
}

pub type Result<T> = std::result::Result<T, MarqueeError>;
