// src/lib.rs

pub mod config;
pub mod derived;
pub mod error;
pub mod field;
pub mod grid;
pub mod loader;
pub mod movie;
pub mod output;
pub mod problems;
pub mod summary;
pub mod visualisation;

pub use error::{Error, Result};
