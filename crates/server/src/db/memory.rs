//! Process-local store for development (`STORE_BACKEND=memory`) and tests.
//!
//! One lock guards all tables, so every trait operation is atomic, including
//! [`PasscodeStore::replace`] and [`PasscodeStore::consume`]. Data is lost
//! when the process exits.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use blood_connect_core::{
    BloodRequestId, CampaignId, Email, Passcode, PostalCode, RequestStatus, UserId,
};

use super::{
    BloodRequestStore, CampaignStore, IdentityStore, LookupCacheStore, PasscodeStore,
    RepositoryError,
};
use crate::models::{
    BloodRequest, CachedLookup, Campaign, CampaignResponse, Identity, IdentityPatch,
    NewBloodRequest, NewCampaign, NewIdentity, PasscodeRecord, Responder,
};

#[derive(Default)]
struct Tables {
    passcodes: Vec<PasscodeRecord>,
    identities: HashMap<Email, Identity>,
    blood_requests: Vec<BloodRequest>,
    blood_banks: HashMap<PostalCode, CachedLookup>,
    campaigns: Vec<StoredCampaign>,
    next_identity_id: i32,
    next_request_id: i32,
    next_campaign_id: i32,
}

struct StoredCampaign {
    campaign: Campaign,
    responses: Vec<CampaignResponse>,
}

/// In-memory implementation of every store trait.
///
/// Cheap to clone; clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All passcode records for an email (test inspection).
    pub async fn passcodes_for(&self, email: &Email) -> Vec<PasscodeRecord> {
        let tables = self.tables.lock().await;
        tables
            .passcodes
            .iter()
            .filter(|p| &p.email == email)
            .cloned()
            .collect()
    }

    /// The cached lookup for a postal code, if any (test inspection).
    pub async fn cached_lookup(&self, postal_code: &PostalCode) -> Option<CachedLookup> {
        self.tables.lock().await.blood_banks.get(postal_code).cloned()
    }
}

fn newest_first(requests: &mut [BloodRequest]) {
    requests.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.as_i32().cmp(&a.id.as_i32()))
    });
}

#[async_trait]
impl PasscodeStore for MemoryStore {
    async fn replace(&self, record: &PasscodeRecord) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        tables.passcodes.retain(|p| p.email != record.email);
        tables.passcodes.push(record.clone());
        Ok(())
    }

    async fn consume(
        &self,
        email: &Email,
        code: &Passcode,
    ) -> Result<Option<PasscodeRecord>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let Some(record) = tables
            .passcodes
            .iter()
            .find(|p| &p.email == email && &p.code == code)
            .cloned()
        else {
            return Ok(None);
        };
        tables.passcodes.retain(|p| &p.email != email);
        Ok(Some(record))
    }

    async fn delete_for_email(&self, email: &Email) -> Result<u64, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let before = tables.passcodes.len();
        tables.passcodes.retain(|p| &p.email != email);
        Ok((before - tables.passcodes.len()) as u64)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let before = tables.passcodes.len();
        tables.passcodes.retain(|p| p.expires_at >= now);
        Ok((before - tables.passcodes.len()) as u64)
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn create(
        &self,
        new: &NewIdentity,
        now: DateTime<Utc>,
    ) -> Result<Identity, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.identities.contains_key(&new.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        tables.next_identity_id += 1;
        let identity = Identity {
            id: UserId::new(tables.next_identity_id),
            email: new.email.clone(),
            name: new.name.clone(),
            blood_type: new.blood_type,
            postal_code: new.postal_code.clone(),
            phone: new.phone.clone(),
            available_to_donate: false,
            created_at: now,
            updated_at: now,
        };
        tables
            .identities
            .insert(identity.email.clone(), identity.clone());
        Ok(identity)
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<Identity>, RepositoryError> {
        Ok(self.tables.lock().await.identities.get(email).cloned())
    }

    async fn exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        Ok(self.tables.lock().await.identities.contains_key(email))
    }

    async fn update(
        &self,
        email: &Email,
        patch: &IdentityPatch,
        now: DateTime<Utc>,
    ) -> Result<Identity, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let identity = tables
            .identities
            .get_mut(email)
            .ok_or(RepositoryError::NotFound)?;
        patch.apply(identity, now);
        Ok(identity.clone())
    }
}

#[async_trait]
impl BloodRequestStore for MemoryStore {
    async fn create(
        &self,
        new: &NewBloodRequest,
        now: DateTime<Utc>,
    ) -> Result<BloodRequest, RepositoryError> {
        let mut tables = self.tables.lock().await;
        tables.next_request_id += 1;
        let request = BloodRequest {
            id: BloodRequestId::new(tables.next_request_id),
            requester_email: new.requester_email.clone(),
            requester_name: new.requester_name.clone(),
            blood_type: new.blood_type,
            postal_code: new.postal_code.clone(),
            phone: new.phone.clone(),
            status: RequestStatus::Pending,
            responder: None,
            declined_donors: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        tables.blood_requests.push(request.clone());
        Ok(request)
    }

    async fn get(&self, id: BloodRequestId) -> Result<Option<BloodRequest>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.blood_requests.iter().find(|r| r.id == id).cloned())
    }

    async fn pending_for_donor(
        &self,
        postal_code: &PostalCode,
        donor: &Email,
    ) -> Result<Vec<BloodRequest>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut matches: Vec<BloodRequest> = tables
            .blood_requests
            .iter()
            .filter(|r| &r.postal_code == postal_code && r.is_visible_to(donor))
            .cloned()
            .collect();
        newest_first(&mut matches);
        Ok(matches)
    }

    async fn accept(
        &self,
        id: BloodRequestId,
        responder: &Responder,
        now: DateTime<Utc>,
    ) -> Result<BloodRequest, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let request = tables
            .blood_requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RepositoryError::NotFound)?;

        if request.status != RequestStatus::Pending {
            return Err(RepositoryError::Conflict(
                "blood request is no longer pending".to_owned(),
            ));
        }

        request.status = RequestStatus::Accepted;
        request.responder = Some(responder.clone());
        request.updated_at = now;
        Ok(request.clone())
    }

    async fn decline(
        &self,
        id: BloodRequestId,
        donor: &Email,
        now: DateTime<Utc>,
    ) -> Result<BloodRequest, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let request = tables
            .blood_requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RepositoryError::NotFound)?;

        if !request.declined_donors.contains(donor) {
            request.declined_donors.push(donor.clone());
        }
        request.updated_at = now;
        Ok(request.clone())
    }

    async fn list_for_requester(
        &self,
        requester: &Email,
    ) -> Result<Vec<BloodRequest>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut mine: Vec<BloodRequest> = tables
            .blood_requests
            .iter()
            .filter(|r| &r.requester_email == requester)
            .cloned()
            .collect();
        newest_first(&mut mine);
        Ok(mine)
    }

    async fn delete_pending_for_requester(
        &self,
        requester: &Email,
    ) -> Result<u64, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let before = tables.blood_requests.len();
        tables
            .blood_requests
            .retain(|r| !(&r.requester_email == requester && r.status == RequestStatus::Pending));
        Ok((before - tables.blood_requests.len()) as u64)
    }
}

#[async_trait]
impl LookupCacheStore for MemoryStore {
    async fn get(&self, postal_code: &PostalCode) -> Result<Option<CachedLookup>, RepositoryError> {
        Ok(self.cached_lookup(postal_code).await)
    }

    async fn upsert(&self, record: &CachedLookup) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        tables
            .blood_banks
            .insert(record.postal_code.clone(), record.clone());
        Ok(())
    }
}

#[async_trait]
impl CampaignStore for MemoryStore {
    async fn create(
        &self,
        new: &NewCampaign,
        now: DateTime<Utc>,
    ) -> Result<Campaign, RepositoryError> {
        let mut tables = self.tables.lock().await;
        tables.next_campaign_id += 1;
        let campaign = Campaign {
            id: CampaignId::new(tables.next_campaign_id),
            title: new.title.clone(),
            start_date: new.start_date.clone(),
            end_date: new.end_date.clone(),
            time: new.time.clone(),
            venue: new.venue.clone(),
            incentive: new.incentive.clone(),
            message: new.message.clone(),
            organizer: new.organizer.clone(),
            location: new.location,
            created_at: now,
        };
        tables.campaigns.push(StoredCampaign {
            campaign: campaign.clone(),
            responses: Vec::new(),
        });
        Ok(campaign)
    }

    async fn get(&self, id: CampaignId) -> Result<Option<Campaign>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .campaigns
            .iter()
            .find(|c| c.campaign.id == id)
            .map(|c| c.campaign.clone()))
    }

    async fn list_by_organizer(&self, organizer: &Email) -> Result<Vec<Campaign>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut mine: Vec<Campaign> = tables
            .campaigns
            .iter()
            .filter(|c| &c.campaign.organizer.email == organizer)
            .map(|c| c.campaign.clone())
            .collect();
        mine.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_i32().cmp(&a.id.as_i32()))
        });
        Ok(mine)
    }

    async fn add_response(
        &self,
        id: CampaignId,
        response: &CampaignResponse,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let stored = tables
            .campaigns
            .iter_mut()
            .find(|c| c.campaign.id == id)
            .ok_or(RepositoryError::NotFound)?;

        if stored.responses.iter().any(|r| r.email == response.email) {
            return Ok(false);
        }
        stored.responses.push(response.clone());
        Ok(true)
    }

    async fn responses(&self, id: CampaignId) -> Result<Vec<CampaignResponse>, RepositoryError> {
        let tables = self.tables.lock().await;
        tables
            .campaigns
            .iter()
            .find(|c| c.campaign.id == id)
            .map(|c| c.responses.clone())
            .ok_or(RepositoryError::NotFound)
    }
}
