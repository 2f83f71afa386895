//! Statistics over normalized offers.
//!
//! Every function here is pure: it borrows a snapshot, groups it with
//! ordered maps and returns fresh DTOs. Prices are sorted before summing so
//! the mean does not depend on input order, and null capacity prices are
//! skipped rather than counted as zero.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::models::{
    AccessTier, CloudProvider, ComputeOffer, OfferFilter, PriceSummary, ProviderStats,
    RegionBucket, RegionStats, StorageOffer, StorageTierStats,
};

/// count/min/avg/max of a set of prices, `None` when the set is empty
pub fn summarize(prices: impl IntoIterator<Item = f64>) -> Option<PriceSummary> {
    let mut prices: Vec<f64> = prices.into_iter().collect();
    if prices.is_empty() {
        return None;
    }
    prices.sort_by(f64::total_cmp);

    let count = prices.len();
    let sum: f64 = prices.iter().sum();
    Some(PriceSummary {
        count,
        min: prices[0],
        avg: sum / count as f64,
        max: prices[count - 1],
    })
}

#[derive(Default)]
struct ComputeGroup {
    prices: Vec<f64>,
    regions: BTreeSet<RegionBucket>,
}

#[derive(Default)]
struct StorageGroup {
    count: usize,
    capacity_prices: Vec<f64>,
    regions: BTreeSet<RegionBucket>,
}

fn group_compute<'a>(
    offers: impl IntoIterator<Item = &'a ComputeOffer>,
) -> BTreeMap<CloudProvider, ComputeGroup> {
    let mut groups: BTreeMap<CloudProvider, ComputeGroup> = BTreeMap::new();
    for offer in offers {
        let group = groups.entry(offer.provider).or_default();
        group.prices.push(offer.hourly_usd);
        group.regions.insert(offer.region);
    }
    groups
}

fn group_storage<'a>(
    offers: impl IntoIterator<Item = &'a StorageOffer>,
) -> BTreeMap<CloudProvider, StorageGroup> {
    let mut groups: BTreeMap<CloudProvider, StorageGroup> = BTreeMap::new();
    for offer in offers {
        let group = groups.entry(offer.provider).or_default();
        group.count += 1;
        group.capacity_prices.extend(offer.capacity_gb_month_usd);
        group.regions.insert(offer.region);
    }
    groups
}

/// One entry per provider with compute offers, ordered by provider
pub fn provider_stats<'a>(
    offers: impl IntoIterator<Item = &'a ComputeOffer>,
) -> Vec<ProviderStats> {
    provider_stats_with_storage(offers, std::iter::empty())
}

/// Per-provider compute and storage rollup. A provider present only through
/// storage offers gets `None` compute prices.
pub fn provider_stats_with_storage<'a, 'b>(
    compute: impl IntoIterator<Item = &'a ComputeOffer>,
    storage: impl IntoIterator<Item = &'b StorageOffer>,
) -> Vec<ProviderStats> {
    let compute = group_compute(compute);
    let storage = group_storage(storage);

    let providers: BTreeSet<CloudProvider> =
        compute.keys().chain(storage.keys()).copied().collect();

    let stats: Vec<ProviderStats> = providers
        .into_iter()
        .map(|provider| {
            let compute_group = compute.get(&provider);
            let storage_group = storage.get(&provider);

            let summary = compute_group.and_then(|g| summarize(g.prices.iter().copied()));
            let capacity = storage_group.and_then(|g| summarize(g.capacity_prices.iter().copied()));

            let regions: BTreeSet<RegionBucket> = compute_group
                .into_iter()
                .flat_map(|g| g.regions.iter())
                .chain(storage_group.into_iter().flat_map(|g| g.regions.iter()))
                .copied()
                .collect();

            ProviderStats {
                provider,
                offer_count: summary.map_or(0, |s| s.count),
                regions: regions.into_iter().collect(),
                min_hourly_usd: summary.map(|s| s.min),
                avg_hourly_usd: summary.map(|s| s.avg),
                max_hourly_usd: summary.map(|s| s.max),
                storage_offer_count: storage_group.map_or(0, |g| g.count),
                capacity_priced_count: capacity.map_or(0, |s| s.count),
                avg_capacity_gb_month_usd: capacity.map(|s| s.avg),
            }
        })
        .collect();

    debug!(providers = stats.len(), "Computed provider stats");
    stats
}

/// One entry per region bucket with compute offers, ordered by bucket
pub fn region_stats<'a>(offers: impl IntoIterator<Item = &'a ComputeOffer>) -> Vec<RegionStats> {
    let mut groups: BTreeMap<RegionBucket, (Vec<f64>, BTreeSet<CloudProvider>)> = BTreeMap::new();
    for offer in offers {
        let (prices, providers) = groups.entry(offer.region).or_default();
        prices.push(offer.hourly_usd);
        providers.insert(offer.provider);
    }

    let stats: Vec<RegionStats> = groups
        .into_iter()
        .filter_map(|(region, (prices, providers))| {
            summarize(prices).map(|summary| RegionStats {
                region,
                offer_count: summary.count,
                providers: providers.into_iter().collect(),
                min_hourly_usd: summary.min,
                avg_hourly_usd: summary.avg,
                max_hourly_usd: summary.max,
            })
        })
        .collect();

    debug!(regions = stats.len(), "Computed region stats");
    stats
}

/// Capacity prices per provider and access tier, ordered by both
pub fn storage_tier_stats<'a>(
    offers: impl IntoIterator<Item = &'a StorageOffer>,
) -> Vec<StorageTierStats> {
    let mut groups: BTreeMap<(CloudProvider, AccessTier), (usize, Vec<f64>)> = BTreeMap::new();
    for offer in offers {
        let (count, prices) = groups.entry((offer.provider, offer.access_tier)).or_default();
        *count += 1;
        prices.extend(offer.capacity_gb_month_usd);
    }

    let stats: Vec<StorageTierStats> = groups
        .into_iter()
        .map(|((provider, access_tier), (offer_count, prices))| {
            let capacity = summarize(prices);
            StorageTierStats {
                provider,
                access_tier,
                offer_count,
                capacity_priced_count: capacity.map_or(0, |s| s.count),
                min_capacity_gb_month_usd: capacity.map(|s| s.min),
                avg_capacity_gb_month_usd: capacity.map(|s| s.avg),
                max_capacity_gb_month_usd: capacity.map(|s| s.max),
            }
        })
        .collect();

    debug!(tiers = stats.len(), "Computed storage tier stats");
    stats
}

pub fn provider_stats_filtered<'a>(
    offers: impl IntoIterator<Item = &'a ComputeOffer>,
    filter: &OfferFilter,
) -> Vec<ProviderStats> {
    provider_stats(offers.into_iter().filter(|o| filter.matches_compute(o)))
}

pub fn provider_stats_with_storage_filtered<'a, 'b>(
    compute: impl IntoIterator<Item = &'a ComputeOffer>,
    storage: impl IntoIterator<Item = &'b StorageOffer>,
    filter: &OfferFilter,
) -> Vec<ProviderStats> {
    provider_stats_with_storage(
        compute.into_iter().filter(|o| filter.matches_compute(o)),
        storage.into_iter().filter(|o| filter.matches_storage(o)),
    )
}

pub fn region_stats_filtered<'a>(
    offers: impl IntoIterator<Item = &'a ComputeOffer>,
    filter: &OfferFilter,
) -> Vec<RegionStats> {
    region_stats(offers.into_iter().filter(|o| filter.matches_compute(o)))
}

pub fn storage_tier_stats_filtered<'a>(
    offers: impl IntoIterator<Item = &'a StorageOffer>,
    filter: &OfferFilter,
) -> Vec<StorageTierStats> {
    storage_tier_stats(offers.into_iter().filter(|o| filter.matches_storage(o)))
}
