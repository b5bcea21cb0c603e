//! Core types and trait definitions for the BookBrainz entity data layer.
//!
//! This crate is deliberately free of database dependencies. Storage backends
//! implement the traits in [`store`]; everything else here is pure data and
//! pure functions over it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod achievement;
pub mod attributes;
pub mod case;
pub mod date;
pub mod derived_set;
pub mod entity;
pub mod error;
pub mod flag;
pub mod registry;
pub mod revision;
pub mod sets;
pub mod store;

pub use error::{Error, Result};
