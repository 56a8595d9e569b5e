//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::{BloodBankConfig, PasscodeConfig};
use crate::db::Stores;
use crate::genai::Generator;
use crate::services::{
    BloodBankService, CampaignService, DonorService, Mailer, PasscodeService,
};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Handlers reach records only
/// through the services, which borrow the shared stores per request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    stores: Stores,
    passcodes: PasscodeService,
    blood_banks: BloodBankService,
    donors: DonorService,
    campaigns: CampaignService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `stores` - Record stores (`PostgreSQL` or in-memory)
    /// * `mailer` - Email delivery for passcodes
    /// * `generator` - Text generation for blood bank lookups
    #[must_use]
    pub fn new(
        stores: Stores,
        mailer: Arc<dyn Mailer>,
        generator: Arc<dyn Generator>,
        passcode_config: &PasscodeConfig,
        blood_bank_config: &BloodBankConfig,
    ) -> Self {
        let passcodes = PasscodeService::new(&stores, mailer, passcode_config);
        let blood_banks = BloodBankService::new(&stores, generator, blood_bank_config);
        let donors = DonorService::new(&stores);
        let campaigns = CampaignService::new(&stores);

        Self {
            inner: Arc::new(AppStateInner {
                stores,
                passcodes,
                blood_banks,
                donors,
                campaigns,
            }),
        }
    }

    /// Get a reference to the record stores.
    #[must_use]
    pub fn stores(&self) -> &Stores {
        &self.inner.stores
    }

    /// Get a reference to the passcode service.
    #[must_use]
    pub fn passcodes(&self) -> &PasscodeService {
        &self.inner.passcodes
    }

    /// Get a reference to the blood bank lookup service.
    #[must_use]
    pub fn blood_banks(&self) -> &BloodBankService {
        &self.inner.blood_banks
    }

    /// Get a reference to the donor directory service.
    #[must_use]
    pub fn donors(&self) -> &DonorService {
        &self.inner.donors
    }

    /// Get a reference to the campaign service.
    #[must_use]
    pub fn campaigns(&self) -> &CampaignService {
        &self.inner.campaigns
    }
}
