//! Centralized constants used across the application.
//!
//! This module contains magic numbers and configuration values that are used
//! in multiple places or would benefit from being named constants.

/// Default window width in pixels
pub const DEFAULT_WINDOW_WIDTH: f32 = 1280.0;

/// Default window height in pixels
pub const DEFAULT_WINDOW_HEIGHT: f32 = 800.0;

/// Aspect ratio of the annotation surface (the displayed media frame)
pub const SURFACE_ASPECT_RATIO: f32 = 16.0 / 9.0;

/// Default eraser radius in surface pixels.
/// Pen-stroke points within this distance of the pointer are removed.
pub const DEFAULT_ERASER_RADIUS: f32 = 20.0;

/// Maximum number of shape-set snapshots kept for undo/redo
pub const MAX_HISTORY_DEPTH: usize = 50;

/// Default floor for the continuous-media match window, in seconds.
/// The effective window is the larger of this and one frame duration.
pub const DEFAULT_TOLERANCE_FLOOR: f64 = 0.1;

/// Seconds between playback correlation evaluations (10 Hz)
pub const DEFAULT_CORRELATION_INTERVAL: f32 = 0.1;

/// Minimum pointer travel in surface pixels before a new pen point is recorded
pub const MIN_PEN_POINT_SPACING: f32 = 2.0;
