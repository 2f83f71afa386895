use std::collections::BTreeSet;

use async_trait::async_trait;
use observability::PricingMetrics;
use strum::IntoEnumIterator;
use tracing::debug;

use crate::error::PricingResult;
use crate::models::{
    CloudProvider, ComputeOffer, OfferFilter, OfferKind, RegionBucket, StorageOffer,
};
use crate::repository::OfferSource;

/// Offer snapshot held in memory
///
/// Offers are validated on the way in and returned in insertion order.
/// Share it behind an `Arc` once loaded; mutation needs `&mut self`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOfferSource {
    compute: Vec<ComputeOffer>,
    storage: Vec<StorageOffer>,
}

impl InMemoryOfferSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source from existing offers, validating each one
    pub fn from_offers(
        compute: Vec<ComputeOffer>,
        storage: Vec<StorageOffer>,
    ) -> PricingResult<Self> {
        let mut source = Self::new();
        for offer in compute {
            source.insert_compute(offer)?;
        }
        for offer in storage {
            source.insert_storage(offer)?;
        }
        Ok(source)
    }

    pub fn insert_compute(&mut self, offer: ComputeOffer) -> PricingResult<()> {
        offer.validate_invariants()?;
        self.compute.push(offer);
        Ok(())
    }

    pub fn insert_storage(&mut self, offer: StorageOffer) -> PricingResult<()> {
        offer.validate_invariants()?;
        self.storage.push(offer);
        Ok(())
    }

    pub fn compute_len(&self) -> usize {
        self.compute.len()
    }

    pub fn storage_len(&self) -> usize {
        self.storage.len()
    }

    /// Publish per-provider offer counts as gauges
    pub fn record_offer_counts(&self) {
        for provider in CloudProvider::iter() {
            let label = provider.to_string();
            let compute = self.compute.iter().filter(|o| o.provider == provider).count();
            let storage = self.storage.iter().filter(|o| o.provider == provider).count();
            PricingMetrics::set_offer_count(&label, &OfferKind::Compute.to_string(), compute);
            PricingMetrics::set_offer_count(&label, &OfferKind::Storage.to_string(), storage);
        }
    }
}

#[async_trait]
impl OfferSource for InMemoryOfferSource {
    async fn compute_offers(&self, filter: &OfferFilter) -> PricingResult<Vec<ComputeOffer>> {
        let offers: Vec<ComputeOffer> = self
            .compute
            .iter()
            .filter(|o| filter.matches_compute(o))
            .cloned()
            .collect();
        debug!(matched = offers.len(), total = self.compute.len(), "Compute snapshot");
        Ok(offers)
    }

    async fn storage_offers(&self, filter: &OfferFilter) -> PricingResult<Vec<StorageOffer>> {
        let offers: Vec<StorageOffer> = self
            .storage
            .iter()
            .filter(|o| filter.matches_storage(o))
            .cloned()
            .collect();
        debug!(matched = offers.len(), total = self.storage.len(), "Storage snapshot");
        Ok(offers)
    }

    async fn regions_for_provider(
        &self,
        provider: CloudProvider,
    ) -> PricingResult<Vec<RegionBucket>> {
        let compute = self.compute.iter().filter(|o| o.provider == provider).map(|o| o.region);
        let storage = self.storage.iter().filter(|o| o.provider == provider).map(|o| o.region);
        let regions: BTreeSet<RegionBucket> = compute.chain(storage).collect();
        Ok(regions.into_iter().collect())
    }
}
