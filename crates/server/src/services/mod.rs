//! Business logic services.
//!
//! # Services
//!
//! - `passcode` - Email passcode issuance and verification
//! - `email` - Email delivery via SMTP (or the log in development)
//! - `blood_banks` - Blood bank lookups cached per postal code
//! - `campaigns` - Donation campaigns and the donors who join them
//! - `donors` - Registration, profiles and blood requests

pub mod blood_banks;
pub mod campaigns;
pub mod donors;
pub mod email;
pub mod passcode;

pub use blood_banks::{BloodBankService, LookupError};
pub use campaigns::{CampaignError, CampaignLocator, CampaignService};
pub use donors::{DonorError, DonorService};
pub use email::{EmailError, LogMailer, Mailer, OutgoingEmail, SmtpMailer};
pub use passcode::{PasscodeError, PasscodeService, generate_passcode};
