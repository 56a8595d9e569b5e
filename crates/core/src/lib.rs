//! BloodConnect Core - Shared domain types.
//!
//! This crate provides the types used across all BloodConnect components:
//! - `server` - HTTP backend for the mobile client
//! - `cli` - Command-line tools for migrations and maintenance
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP clients.
//!
//! # Modules
//!
//! - [`types`] - Validated newtypes for emails, postal codes, passcodes, blood
//!   types, request statuses, coordinates and IDs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
