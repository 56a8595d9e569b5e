//! Domain models for the BloodConnect server.
//!
//! These are validated domain objects; database row types live next to the
//! repositories in [`crate::db`].

pub mod blood_bank;
pub mod blood_request;
pub mod campaign;
pub mod identity;
pub mod passcode;

pub use blood_bank::{CachedLookup, MAX_PROVIDER_ENTRIES, ProviderEntry};
pub use blood_request::{BloodRequest, NewBloodRequest, Responder};
pub use campaign::{Campaign, CampaignResponse, NewCampaign, Organizer};
pub use identity::{Identity, IdentityPatch, NewIdentity};
pub use passcode::PasscodeRecord;
