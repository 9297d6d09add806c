//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the baker:
//! - Math types and operations
//! - Typed handles for stored assets
//! - Logging setup

pub mod math;
pub mod collections;
pub mod logging;
