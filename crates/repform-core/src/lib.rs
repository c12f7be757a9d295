//! # Repform-Core
//!
//! Core types and utilities for the Repform exercise form analysis engine:
//! body-part tags, per-frame landmark sets, the geometry kernel and the
//! error taxonomy shared by every stage of the analysis.

pub mod error;
pub mod geometry;
pub mod types;

pub use error::{Error, Result};
pub use geometry::*;
pub use types::*;
