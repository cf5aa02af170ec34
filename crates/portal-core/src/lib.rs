//! Core types and domain logic for the client portal.
//!
//! This crate is deliberately free of HTTP dependencies. It owns the data
//! model returned by the portal API, the active-period resolver, the status
//! classifier, and the per-service timeline cache. The remote API is reached
//! only through the [`source::TimelineSource`] trait.

pub mod account;
pub mod cache;
pub mod dashboard;
pub mod error;
pub mod history;
pub mod lenient;
pub mod period;
pub mod service;
pub mod source;
pub mod status;
pub mod timeline;

pub use error::{Error, Result};
