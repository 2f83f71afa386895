//! Best-value selection and ranking.
//!
//! Offers are ordered by the metric score first. Equal scores fall back to
//! the offer's name, then provider, then native region, so the same input
//! always yields the same winner whatever order it arrives in.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use ts_rs::TS;

use crate::models::{CloudProvider, ComputeOffer, ProviderStats, RankedOffer, StorageOffer};

/// Ranking metric for compute offers
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    TS,
)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CostMetric {
    #[default]
    LowestHourlyPrice,
    VcpuPerDollar,
    MemoryPerDollar,
}

impl CostMetric {
    /// Score of an offer under this metric, `None` when undefined
    pub fn score(self, offer: &ComputeOffer) -> Option<f64> {
        match self {
            CostMetric::LowestHourlyPrice => Some(offer.hourly_usd),
            CostMetric::VcpuPerDollar => offer.vcpu_per_dollar(),
            CostMetric::MemoryPerDollar => offer.memory_gib_per_dollar(),
        }
    }

    pub fn higher_is_better(self) -> bool {
        !matches!(self, CostMetric::LowestHourlyPrice)
    }
}

/// Ranking metric for storage offers
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    TS,
)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StorageMetric {
    #[default]
    LowestCapacityPrice,
    LowestReadPrice,
    LowestWritePrice,
}

impl StorageMetric {
    pub fn score(self, offer: &StorageOffer) -> Option<f64> {
        match self {
            StorageMetric::LowestCapacityPrice => offer.capacity_gb_month_usd,
            StorageMetric::LowestReadPrice => offer.read_op_usd,
            StorageMetric::LowestWritePrice => offer.write_op_usd,
        }
    }
}

fn by_score(a: f64, b: f64, higher_is_better: bool) -> Ordering {
    if higher_is_better {
        b.total_cmp(&a)
    } else {
        a.total_cmp(&b)
    }
}

/// Secondary ordering for compute offers with equal scores
pub fn compute_tie_break(a: &ComputeOffer, b: &ComputeOffer) -> Ordering {
    a.vm_name
        .cmp(&b.vm_name)
        .then_with(|| a.provider.cmp(&b.provider))
        .then_with(|| a.provider_region.cmp(&b.provider_region))
        .then_with(|| a.os.cmp(&b.os))
        .then_with(|| a.hourly_usd.total_cmp(&b.hourly_usd))
        .then_with(|| a.vcpu.cmp(&b.vcpu))
        .then_with(|| a.memory_gib.total_cmp(&b.memory_gib))
        .then_with(|| a.region.cmp(&b.region))
        .then_with(|| a.cpu_arch.cmp(&b.cpu_arch))
        .then_with(|| gpu_key(a).cmp(&gpu_key(b)))
        .then_with(|| gpu_memory(a).total_cmp(&gpu_memory(b)))
}

fn gpu_key(offer: &ComputeOffer) -> (u32, Option<&str>) {
    (
        offer.gpu_count(),
        offer.gpu.as_ref().and_then(|g| g.name.as_deref()),
    )
}

fn gpu_memory(offer: &ComputeOffer) -> f64 {
    offer
        .gpu
        .as_ref()
        .and_then(|g| g.memory_gib)
        .unwrap_or(0.0)
}

/// Secondary ordering for storage offers with equal scores
pub fn storage_tie_break(a: &StorageOffer, b: &StorageOffer) -> Ordering {
    a.storage_class
        .cmp(&b.storage_class)
        .then_with(|| a.service_name.cmp(&b.service_name))
        .then_with(|| a.provider.cmp(&b.provider))
        .then_with(|| a.provider_region.cmp(&b.provider_region))
        .then_with(|| a.access_tier.cmp(&b.access_tier))
        .then_with(|| a.region.cmp(&b.region))
}

fn scored_compute<'a>(
    offers: impl IntoIterator<Item = &'a ComputeOffer>,
    metric: CostMetric,
) -> Vec<(f64, &'a ComputeOffer)> {
    let mut scored: Vec<(f64, &ComputeOffer)> = offers
        .into_iter()
        .filter_map(|offer| metric.score(offer).map(|score| (score, offer)))
        .collect();
    let higher = metric.higher_is_better();
    scored.sort_by(|(sa, a), (sb, b)| {
        by_score(*sa, *sb, higher).then_with(|| compute_tie_break(a, b))
    });
    scored
}

fn scored_storage<'a>(
    offers: impl IntoIterator<Item = &'a StorageOffer>,
    metric: StorageMetric,
) -> Vec<(f64, &'a StorageOffer)> {
    let mut scored: Vec<(f64, &StorageOffer)> = offers
        .into_iter()
        .filter_map(|offer| metric.score(offer).map(|score| (score, offer)))
        .collect();
    scored.sort_by(|(sa, a), (sb, b)| {
        by_score(*sa, *sb, false).then_with(|| storage_tie_break(a, b))
    });
    scored
}

fn ranked<T: Clone>(scored: Vec<(f64, &T)>, limit: usize) -> Vec<RankedOffer<T>> {
    scored
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, (score, offer))| RankedOffer {
            rank: i + 1,
            score,
            offer: offer.clone(),
        })
        .collect()
}

/// The single best compute offer, `None` when no offer has a defined score
pub fn best_compute<'a>(
    offers: impl IntoIterator<Item = &'a ComputeOffer>,
    metric: CostMetric,
) -> Option<&'a ComputeOffer> {
    scored_compute(offers, metric).into_iter().next().map(|(_, offer)| offer)
}

/// Top `limit` compute offers, best first
pub fn rank_compute<'a>(
    offers: impl IntoIterator<Item = &'a ComputeOffer>,
    metric: CostMetric,
    limit: usize,
) -> Vec<RankedOffer<ComputeOffer>> {
    ranked(scored_compute(offers, metric), limit)
}

pub fn best_storage<'a>(
    offers: impl IntoIterator<Item = &'a StorageOffer>,
    metric: StorageMetric,
) -> Option<&'a StorageOffer> {
    scored_storage(offers, metric).into_iter().next().map(|(_, offer)| offer)
}

pub fn rank_storage<'a>(
    offers: impl IntoIterator<Item = &'a StorageOffer>,
    metric: StorageMetric,
    limit: usize,
) -> Vec<RankedOffer<StorageOffer>> {
    ranked(scored_storage(offers, metric), limit)
}

/// Provider with the lowest average hourly price; ties go to the provider
/// that sorts first
pub fn cheapest_provider(stats: &[ProviderStats]) -> Option<CloudProvider> {
    stats
        .iter()
        .filter_map(|s| s.avg_hourly_usd.map(|avg| (avg, s.provider)))
        .min_by(|(a, pa), (b, pb)| a.total_cmp(b).then_with(|| pa.cmp(pb)))
        .map(|(_, provider)| provider)
}
