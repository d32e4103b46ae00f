//! Unit tests organised by module

pub mod analysis;
