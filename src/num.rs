//! Utilities related to numbers.

use num;
use std::fmt;

/// Floating point marker trait for easier control over trait bounds.
pub trait BFloat:
    Sync + Send + num::Float + num::cast::FromPrimitive + fmt::Debug + fmt::Display
{
}

impl BFloat for f32 {}
impl BFloat for f64 {}
