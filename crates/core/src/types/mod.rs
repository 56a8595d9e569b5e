//! Core types for BloodConnect.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod blood_type;
pub mod email;
pub mod geo;
pub mod id;
pub mod passcode;
pub mod postal_code;
pub mod status;

pub use blood_type::{BloodType, BloodTypeError};
pub use email::{Email, EmailError};
pub use geo::{GeoPoint, GeoPointError};
pub use id::*;
pub use passcode::{Passcode, PasscodeError};
pub use postal_code::{PostalCode, PostalCodeError};
pub use status::*;
