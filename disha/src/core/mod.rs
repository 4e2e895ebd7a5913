//! Core foundation layer.
//!
//! Bottom layer of the estimator stack with no internal dependencies.
//!
//! # Contents
//!
//! - [`types`]: Sample and timestamp types shared by every stage
//! - [`math`]: Heading wrap and angle helpers

pub mod math;
pub mod types;
