//! # vald-core
//!
//! Core types shared across the VALD extraction crates.
//!
//! This crate provides:
//! - [`Table`] / [`Cell`]: the tabular record set every fetcher, extractor,
//!   consolidator, and sink exchanges
//! - Entity views over table rows (tenants, categories, groups) and the column
//!   names the vendor API uses
//! - [`Device`]: the three test datasets (NordBord, ForceFrame, ForceDecks)
//! - [`Watermark`]: the "modified since" pagination cursor and timestamp helpers
//! - [`RunObserver`]: the synchronous log/progress callback contract
//! - Cross-cutting error types

pub mod cell;
pub mod device;
pub mod entities;
pub mod errors;
pub mod observer;
pub mod table;
pub mod watermark;

pub use cell::Cell;
pub use device::Device;
pub use entities::{Category, Group, Tenant};
pub use errors::CoreError;
pub use observer::{FnObserver, NullObserver, RunObserver};
pub use table::{Record, Row, Table};
pub use watermark::Watermark;
