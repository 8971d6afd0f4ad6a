//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - Trigonometric lookup tables
//! - Host-clock timers
//! - Logging utilities

pub mod math;
pub mod trig;
pub mod time;
pub mod logging;
