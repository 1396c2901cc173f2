//! Configuration validation
//!
//! - `validators`: checks for each configuration section
//! - `tests`: validator test suite

mod validators;

/// Validation trait for configuration structures
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}
