//! Glyph-by-glyph font-variation effects driven by pointer proximity.
//!
//! Every frame, each glyph of a label is measured against the pointer. Its
//! distance becomes a falloff in `[0, 1]`, which blends every configured axis
//! between a resting and a peak value. The result is written straight to the
//! glyph as a `'wght' 600, 'wdth' 90` style string.
//!
//! The host supplies three things: a [`PointerEventSource`], a [`FrameLoop`]
//! that it pumps, and a factory for [`RenderTarget`]s. The [`terminal`] and
//! [`widget`] modules provide a ready-made ratatui implementation.

pub mod effect;
pub mod engine;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod layout;
pub mod oklch;
pub mod pointer;
pub mod settings;
pub mod target;
pub mod terminal;
pub mod widget;

pub use effect::{ProximityBuilder, VariableProximity};
pub use engine::{ProximityConfig, ProximityEngine};
pub use error::{Error, Result};
pub use frame::{EveryPump, FixedInterval, FrameHandle, FrameLoop, FrameScheduler};
pub use geometry::{Bounds, Point};
pub use pointer::{PointerChannel, PointerEventSource, PointerTracker, Subscription};
pub use settings::{AxisSetting, ParsedSettings};
pub use target::{Boundable, RenderTarget};
