//! Core types and trait definitions for the campus feedback service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

#![allow(async_fn_in_trait)]

pub mod error;
pub mod model;
pub mod rating;
pub mod store;

pub use error::{Error, Result};
pub use rating::Rating;
