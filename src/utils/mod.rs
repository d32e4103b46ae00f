//! Shared calendar and numeric helpers

pub mod math;
pub mod time;
