//! compression/codecs/mod.rs
//! Concrete codec implementations.

pub mod deflate;

pub use deflate::*;
