//! Core types and analytics pipeline for the shelfstat library-loan
//! dashboard.
//!
//! This crate does no file I/O. Loan transactions and catalog
//! entries reach it through the [`dataset::DataSource`] trait; computed tables
//! leave it through the [`sink::Sink`] trait. Everything in between is pure,
//! synchronous and deterministic.

pub mod aggregate;
pub mod checkout;
pub mod dataset;
pub mod department;
pub mod enrich;
pub mod error;
pub mod recency;
pub mod record;
pub mod sink;
pub mod sparse;
pub mod subject;
pub mod table;
pub mod view;

pub use error::{Error, Result};
