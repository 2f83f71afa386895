use async_trait::async_trait;

use crate::error::PricingResult;
use crate::models::{CloudProvider, ComputeOffer, OfferFilter, RegionBucket, StorageOffer};

/// Read side of the offer store
///
/// The pricing layer treats the store as an enumerable collection: it asks
/// for a filtered snapshot and aggregates it in memory. Implementations can
/// use different storage backends (in-memory, PostgreSQL, etc.)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OfferSource: Send + Sync {
    /// Compute offers matching the filter
    async fn compute_offers(&self, filter: &OfferFilter) -> PricingResult<Vec<ComputeOffer>>;

    /// Storage offers matching the filter
    async fn storage_offers(&self, filter: &OfferFilter) -> PricingResult<Vec<StorageOffer>>;

    /// Distinct region buckets a provider has offers in
    async fn regions_for_provider(
        &self,
        provider: CloudProvider,
    ) -> PricingResult<Vec<RegionBucket>>;
}
