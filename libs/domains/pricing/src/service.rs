use std::collections::BTreeMap;
use std::sync::Arc;

use observability::PricingTimer;
use tracing::{debug, instrument};

use crate::aggregator;
use crate::best_value::{self, CostMetric, StorageMetric};
use crate::config::PricingConfig;
use crate::error::PricingResult;
use crate::models::{
    CloudProvider, ComputeComparison, ComputeOffer, ComputeQuote, ComputeSpecs, OfferFilter,
    ProviderStats, RankedOffer, RegionBucket, RegionStats, StorageOffer, StorageTierStats,
};
use crate::repository::OfferSource;

/// Service for querying normalized cloud pricing
///
/// Every call takes a fresh snapshot from the source and recomputes; nothing
/// is cached between calls.
#[derive(Clone)]
pub struct PricingService<S: OfferSource> {
    source: Arc<S>,
    config: PricingConfig,
}

impl<S: OfferSource> PricingService<S> {
    /// Create a new pricing service
    pub fn new(source: S, config: PricingConfig) -> Self {
        Self::from_arc(Arc::new(source), config)
    }

    /// Create a service over a source that is already shared
    pub fn from_arc(source: Arc<S>, config: PricingConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Per-provider compute and storage statistics
    #[instrument(skip(self))]
    pub async fn provider_stats(&self, filter: &OfferFilter) -> PricingResult<Vec<ProviderStats>> {
        let compute = self.source.compute_offers(filter).await?;
        let storage = self.source.storage_offers(filter).await?;
        let _timer = PricingTimer::new("provider_stats", compute.len() + storage.len());
        Ok(aggregator::provider_stats_with_storage(&compute, &storage))
    }

    /// Per-region compute statistics
    #[instrument(skip(self))]
    pub async fn region_stats(&self, filter: &OfferFilter) -> PricingResult<Vec<RegionStats>> {
        let compute = self.source.compute_offers(filter).await?;
        let _timer = PricingTimer::new("region_stats", compute.len());
        Ok(aggregator::region_stats(&compute))
    }

    /// Capacity-price statistics per provider and access tier
    #[instrument(skip(self))]
    pub async fn storage_tier_stats(
        &self,
        filter: &OfferFilter,
    ) -> PricingResult<Vec<StorageTierStats>> {
        let storage = self.source.storage_offers(filter).await?;
        let _timer = PricingTimer::new("storage_tier_stats", storage.len());
        Ok(aggregator::storage_tier_stats(&storage))
    }

    /// Best compute offers under a metric. `limit` falls back to the
    /// configured default and is clamped to the configured maximum.
    #[instrument(skip(self))]
    pub async fn best_compute(
        &self,
        filter: &OfferFilter,
        metric: CostMetric,
        limit: Option<usize>,
    ) -> PricingResult<Vec<RankedOffer<ComputeOffer>>> {
        let limit = self.config.rank_limit(limit);
        let compute = self.source.compute_offers(filter).await?;
        let _timer = PricingTimer::new("best_compute", compute.len());
        let ranking = best_value::rank_compute(&compute, metric, limit);
        debug!(candidates = compute.len(), ranked = ranking.len(), limit, "Ranked compute offers");
        Ok(ranking)
    }

    /// Best storage offers under a metric
    #[instrument(skip(self))]
    pub async fn best_storage(
        &self,
        filter: &OfferFilter,
        metric: StorageMetric,
        limit: Option<usize>,
    ) -> PricingResult<Vec<RankedOffer<StorageOffer>>> {
        let limit = self.config.rank_limit(limit);
        let storage = self.source.storage_offers(filter).await?;
        let _timer = PricingTimer::new("best_storage", storage.len());
        let ranking = best_value::rank_storage(&storage, metric, limit);
        debug!(candidates = storage.len(), ranked = ranking.len(), limit, "Ranked storage offers");
        Ok(ranking)
    }

    /// Provider with the lowest average hourly compute price
    #[instrument(skip(self))]
    pub async fn cheapest_provider(
        &self,
        filter: &OfferFilter,
    ) -> PricingResult<Option<CloudProvider>> {
        let compute = self.source.compute_offers(filter).await?;
        let _timer = PricingTimer::new("cheapest_provider", compute.len());
        Ok(best_value::cheapest_provider(&aggregator::provider_stats(&compute)))
    }

    /// Compare VMs that meet a minimum shape across providers
    ///
    /// Quotes are ordered cheapest first and capped at the configured
    /// maximum ranking length. An empty `regions` list means any region.
    #[instrument(skip(self))]
    pub async fn compare_compute(
        &self,
        specs: ComputeSpecs,
        regions: Vec<RegionBucket>,
    ) -> PricingResult<ComputeComparison> {
        specs.validate_invariants()?;

        let filter = OfferFilter {
            regions,
            ..specs.to_filter()
        };
        let compute = self.source.compute_offers(&filter).await?;
        let _timer = PricingTimer::new("compare_compute", compute.len());

        let hours = self.config.hours_per_month;
        let quotes: Vec<ComputeQuote> = best_value::rank_compute(
            &compute,
            CostMetric::LowestHourlyPrice,
            self.config.max_rank_limit,
        )
        .into_iter()
        .map(|ranked| ComputeQuote {
            rank: ranked.rank,
            monthly_usd: ranked.offer.monthly_usd(hours),
            offer: ranked.offer,
        })
        .collect();

        // Quotes are sorted, so the first one seen per provider is its cheapest
        let mut per_provider: BTreeMap<CloudProvider, ComputeQuote> = BTreeMap::new();
        for quote in &quotes {
            per_provider
                .entry(quote.offer.provider)
                .or_insert_with(|| quote.clone());
        }

        let potential_monthly_savings = match (quotes.first(), quotes.last()) {
            (Some(cheapest), Some(priciest)) if quotes.len() > 1 => {
                Some(priciest.monthly_usd - cheapest.monthly_usd)
            }
            _ => None,
        };

        debug!(quotes = quotes.len(), providers = per_provider.len(), "Compared compute offers");

        Ok(ComputeComparison {
            specs,
            quotes,
            cheapest_per_provider: per_provider.into_values().collect(),
            potential_monthly_savings,
        })
    }

    /// Distinct region buckets a provider has offers in
    #[instrument(skip(self))]
    pub async fn regions(&self, provider: CloudProvider) -> PricingResult<Vec<RegionBucket>> {
        self.source.regions_for_provider(provider).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PricingError;
    use crate::models::{Details, OsFamily};
    use crate::repository::MockOfferSource;

    fn vm(provider: CloudProvider, name: &str, vcpu: u32, hourly: f64) -> ComputeOffer {
        ComputeOffer {
            provider,
            vm_name: name.to_string(),
            vcpu,
            memory_gib: f64::from(vcpu) * 4.0,
            cpu_arch: "x86_64".to_string(),
            hourly_usd: hourly,
            gpu: None,
            os: OsFamily::Linux,
            region: RegionBucket::Europe,
            provider_region: "eu".to_string(),
            details: Details::new(),
        }
    }

    fn many(count: usize) -> Vec<ComputeOffer> {
        (0..count)
            .map(|i| vm(CloudProvider::Aws, &format!("vm-{i:03}"), 2, 0.01 * (i + 1) as f64))
            .collect()
    }

    #[tokio::test]
    async fn test_best_compute_uses_default_limit() {
        let mut mock_source = MockOfferSource::new();
        mock_source
            .expect_compute_offers()
            .returning(|_| Ok(many(30)));

        let service = PricingService::new(mock_source, PricingConfig::default());
        let ranking = service
            .best_compute(&OfferFilter::default(), CostMetric::LowestHourlyPrice, None)
            .await
            .unwrap();

        assert_eq!(ranking.len(), 10);
        assert_eq!(ranking[0].offer.vm_name, "vm-000");
    }

    #[tokio::test]
    async fn test_best_compute_clamps_requested_limit() {
        let mut mock_source = MockOfferSource::new();
        mock_source
            .expect_compute_offers()
            .returning(|_| Ok(many(30)));

        let config = PricingConfig {
            max_rank_limit: 20,
            ..PricingConfig::default()
        };
        let service = PricingService::new(mock_source, config);
        let ranking = service
            .best_compute(&OfferFilter::default(), CostMetric::LowestHourlyPrice, Some(1_000))
            .await
            .unwrap();

        assert_eq!(ranking.len(), 20, "Requested limit should be clamped to the maximum");
    }

    #[tokio::test]
    async fn test_zero_maximum_limit_still_ranks_one() {
        let mut mock_source = MockOfferSource::new();
        mock_source
            .expect_storage_offers()
            .returning(|_| Ok(vec![]));
        mock_source
            .expect_compute_offers()
            .returning(|_| Ok(many(5)));

        let config = PricingConfig {
            max_rank_limit: 0,
            ..PricingConfig::default()
        };
        let service = PricingService::new(mock_source, config);
        let ranking = service
            .best_compute(&OfferFilter::default(), CostMetric::LowestHourlyPrice, None)
            .await
            .unwrap();
        assert_eq!(ranking.len(), 1);

        let storage = service
            .best_storage(&OfferFilter::default(), StorageMetric::LowestCapacityPrice, Some(3))
            .await
            .unwrap();
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_filter_is_passed_to_source() {
        let mut mock_source = MockOfferSource::new();
        let expected = OfferFilter::for_provider(CloudProvider::Gcp);
        mock_source
            .expect_compute_offers()
            .withf(|filter| filter.providers == vec![CloudProvider::Gcp])
            .times(1)
            .returning(|_| Ok(vec![]));

        let service = PricingService::new(mock_source, PricingConfig::default());
        let cheapest = service.cheapest_provider(&expected).await.unwrap();

        assert_eq!(cheapest, None, "Empty snapshot should have no cheapest provider");
    }

    #[tokio::test]
    async fn test_source_errors_propagate() {
        let mut mock_source = MockOfferSource::new();
        mock_source
            .expect_storage_offers()
            .returning(|_| Err(PricingError::Source("connection refused".into())));

        let service = PricingService::new(mock_source, PricingConfig::default());
        let err = service
            .storage_tier_stats(&OfferFilter::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PricingError::Source(_)));
    }

    #[tokio::test]
    async fn test_compare_compute_reports_savings() {
        let mut mock_source = MockOfferSource::new();
        mock_source
            .expect_compute_offers()
            .withf(|filter| {
                filter.min_vcpu == Some(2) && filter.regions == vec![RegionBucket::Europe]
            })
            .returning(|_| {
                Ok(vec![
                    vm(CloudProvider::Gcp, "e2-standard-2", 2, 0.067),
                    vm(CloudProvider::Aws, "m5.large", 2, 0.096),
                    vm(CloudProvider::Aws, "t3.large", 2, 0.0832),
                ])
            });

        let service = PricingService::new(mock_source, PricingConfig::default());
        let comparison = service
            .compare_compute(
                ComputeSpecs {
                    vcpu: 2,
                    memory_gib: 8.0,
                },
                vec![RegionBucket::Europe],
            )
            .await
            .unwrap();

        assert_eq!(comparison.quotes.len(), 3);
        assert_eq!(comparison.quotes[0].offer.vm_name, "e2-standard-2");
        assert_eq!(comparison.quotes[0].monthly_usd, 0.067 * 730.0);

        let cheapest: Vec<_> = comparison
            .cheapest_per_provider
            .iter()
            .map(|q| q.offer.vm_name.as_str())
            .collect();
        assert_eq!(cheapest, vec!["t3.large", "e2-standard-2"]);

        let savings = comparison.potential_monthly_savings.unwrap();
        assert!((savings - (0.096 - 0.067) * 730.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_compare_compute_rejects_invalid_specs() {
        let mock_source = MockOfferSource::new();
        let service = PricingService::new(mock_source, PricingConfig::default());

        let err = service
            .compare_compute(
                ComputeSpecs {
                    vcpu: 0,
                    memory_gib: 8.0,
                },
                vec![],
            )
            .await
            .unwrap_err();

        assert_eq!(err.validation().map(|v| v.field.as_str()), Some("vcpu"));
    }

    #[tokio::test]
    async fn test_regions_delegates_to_source() {
        let mut mock_source = MockOfferSource::new();
        mock_source
            .expect_regions_for_provider()
            .with(mockall::predicate::eq(CloudProvider::Azure))
            .returning(|_| Ok(vec![RegionBucket::NorthAmerica, RegionBucket::Europe]));

        let service = PricingService::new(mock_source, PricingConfig::default());
        let regions = service.regions(CloudProvider::Azure).await.unwrap();

        assert_eq!(regions, vec![RegionBucket::NorthAmerica, RegionBucket::Europe]);
    }
}
