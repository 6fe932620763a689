//! # marquee-core
//!
//! Seamless-loop marquee controller for horizontally scrolling content bands.
//!
//! This crate provides platform-agnostic logic for:
//! - Duplicating content once so the scroll loop wraps without a visible seam
//! - Estimating a loop duration proportional to content width
//! - Pausing on hover and honouring the reduced-motion preference
//! - Resetting to the original markup without accumulating listeners
//!
//! The animation itself is left to the host's style sheet; the controller
//! only toggles marker classes and publishes the duration.
//!
//! ## Features
//!
//! - `serde` - Enable serialization for config and status types
//! - `toml` - Load [`MarqueeConfig`] from TOML
//! - `web` - Enable the browser (`web-sys`) backend
//!
//! ## Example
//!
//! ```rust,ignore
//! use marquee_core::{web, MarqueeConfig};
//!
//! // Mount on #marqueeContent once the document is parsed
//! let marquee = web::mount_when_ready(MarqueeConfig::default())?;
//! marquee.expose_for_debugging("marqueeAnimation")?;
//! ```

mod config;
mod controller;
mod duplicator;
mod duration;
mod error;
pub mod memory;
mod motion;
mod playback;
mod surface;

#[cfg(feature = "web")]
pub mod web;

pub use config::{MarqueeClasses, MarqueeConfig};
pub use controller::{MarqueeController, MarqueeStatus, MountStatus};
pub use duplicator::{duplicate_children, ContentDuplicator};
pub use duration::{DurationEstimator, Measurement};
pub use error::{MarqueeError, Result};
pub use motion::{MotionPreferenceObserver, MotionState};
pub use playback::{PlaybackController, PlaybackState};
pub use surface::{ListenerKind, MarqueeEvent, MarqueeHost, MarqueeSurface};
