use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString};
use ts_rs::TS;
use validator::Validate;

use crate::error::{ValidationError, ValidationKind};

/// Free-form provider-specific fields carried alongside a canonical offer
pub type Details = Map<String, Value>;

/// Cloud provider enumeration
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    TS,
)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum CloudProvider {
    Aws,
    Azure,
    Gcp,
}

/// Coarse continental grouping used in place of provider region codes
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
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
pub enum RegionBucket {
    NorthAmerica,
    SouthAmerica,
    Europe,
    Asia,
    Africa,
    Oceania,
    Antarctica,
    MultiRegion,
}

/// Operating system family of a VM offer
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    TS,
)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum OsFamily {
    Linux,
    Windows,
    Other,
}

/// Storage retrieval-latency / cost class
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    TS,
)]
#[ts(export)]
pub enum AccessTier {
    #[serde(rename = "FREQUENT_ACCESS")]
    #[strum(serialize = "FREQUENT_ACCESS")]
    Frequent,
    #[serde(rename = "OCCASIONAL_ACCESS")]
    #[strum(serialize = "OCCASIONAL_ACCESS")]
    Occasional,
    #[serde(rename = "RARE_ACCESS")]
    #[strum(serialize = "RARE_ACCESS")]
    Rare,
    #[serde(rename = "ARCHIVE")]
    #[strum(serialize = "ARCHIVE")]
    Archive,
}

/// Offer type, used for labelling logs, metrics and batch reports
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, TS,
)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OfferKind {
    Compute,
    Storage,
}

/// Accelerator attached to a VM offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, TS)]
#[ts(export)]
pub struct GpuSpec {
    #[validate(range(min = 1))]
    pub count: u32,
    pub name: Option<String>,
    #[validate(range(exclusive_min = 0.0))]
    pub memory_gib: Option<f64>,
}

/// A single priced VM type from one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, TS)]
#[ts(export)]
#[validate(schema(function = "validate_compute_prices"))]
pub struct ComputeOffer {
    pub provider: CloudProvider,
    /// Provider VM identifier (e.g. "t3.medium", "Standard_D2s_v3")
    #[validate(length(min = 1))]
    pub vm_name: String,
    #[validate(range(min = 1))]
    pub vcpu: u32,
    #[validate(range(exclusive_min = 0.0))]
    pub memory_gib: f64,
    /// Architecture tag as reported by the provider (may be empty)
    pub cpu_arch: String,
    #[validate(range(min = 0.0))]
    pub hourly_usd: f64,
    #[validate(nested)]
    pub gpu: Option<GpuSpec>,
    pub os: OsFamily,
    pub region: RegionBucket,
    /// Native region code the offer was published under
    pub provider_region: String,
    /// Unmapped provider fields, verbatim
    #[ts(type = "Record<string, unknown>")]
    #[serde(default)]
    pub details: Details,
}

fn validate_compute_prices(offer: &ComputeOffer) -> Result<(), validator::ValidationError> {
    if !offer.hourly_usd.is_finite() {
        return Err(finite_violation("hourly_usd"));
    }
    if !offer.memory_gib.is_finite() {
        return Err(finite_violation("memory_gib"));
    }
    Ok(())
}

impl ComputeOffer {
    /// Check the structural invariants (positive sizes, non-negative finite
    /// price, GPU fields present together).
    pub fn validate_invariants(&self) -> Result<(), ValidationError> {
        self.validate().map_err(|e| first_violation(&e))
    }

    /// Estimated monthly cost at a fixed number of billable hours
    pub fn monthly_usd(&self, hours_per_month: f64) -> f64 {
        self.hourly_usd * hours_per_month
    }

    /// vCPUs per hourly dollar; undefined for free offers
    pub fn vcpu_per_dollar(&self) -> Option<f64> {
        (self.hourly_usd > 0.0).then(|| f64::from(self.vcpu) / self.hourly_usd)
    }

    /// GiB of memory per hourly dollar; undefined for free offers
    pub fn memory_gib_per_dollar(&self) -> Option<f64> {
        (self.hourly_usd > 0.0).then(|| self.memory_gib / self.hourly_usd)
    }

    pub fn gpu_count(&self) -> u32 {
        self.gpu.as_ref().map_or(0, |g| g.count)
    }
}

/// A single priced storage class/tier from one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, TS)]
#[ts(export)]
#[validate(schema(function = "validate_storage_prices"))]
pub struct StorageOffer {
    pub provider: CloudProvider,
    #[validate(length(min = 1))]
    pub service_name: String,
    /// Provider label for the class (e.g. "Standard - Infrequent Access", "Cool LRS")
    #[validate(length(min = 1))]
    pub storage_class: String,
    pub region: RegionBucket,
    pub provider_region: String,
    pub access_tier: AccessTier,
    #[validate(range(min = 0.0))]
    pub capacity_gb_month_usd: Option<f64>,
    #[validate(range(min = 0.0))]
    pub read_op_usd: Option<f64>,
    #[validate(range(min = 0.0))]
    pub write_op_usd: Option<f64>,
    #[validate(range(min = 0.0))]
    pub flat_fee_usd: Option<f64>,
    #[ts(type = "Record<string, unknown>")]
    #[serde(default)]
    pub details: Details,
}

fn validate_storage_prices(offer: &StorageOffer) -> Result<(), validator::ValidationError> {
    let components = [
        ("capacity_gb_month_usd", offer.capacity_gb_month_usd),
        ("read_op_usd", offer.read_op_usd),
        ("write_op_usd", offer.write_op_usd),
        ("flat_fee_usd", offer.flat_fee_usd),
    ];
    for (field, value) in components {
        if value.is_some_and(|v| !v.is_finite()) {
            return Err(finite_violation(field));
        }
    }
    Ok(())
}

impl StorageOffer {
    pub fn validate_invariants(&self) -> Result<(), ValidationError> {
        self.validate().map_err(|e| first_violation(&e))
    }

    pub fn has_any_price(&self) -> bool {
        self.capacity_gb_month_usd.is_some()
            || self.read_op_usd.is_some()
            || self.write_op_usd.is_some()
            || self.flat_fee_usd.is_some()
    }
}

fn finite_violation(field: &'static str) -> validator::ValidationError {
    validator::ValidationError::new(field).with_message("must be finite".into())
}

/// Collapse validator output into the first violation, ordered by field path.
fn first_violation(errors: &validator::ValidationErrors) -> ValidationError {
    let mut violations = Vec::new();
    collect_violations("", errors, &mut violations);
    violations.sort_by(|a, b| a.field.cmp(&b.field));
    violations
        .into_iter()
        .next()
        .unwrap_or_else(|| ValidationError::inconsistent("offer", "failed validation"))
}

fn collect_violations(
    prefix: &str,
    errors: &validator::ValidationErrors,
    out: &mut Vec<ValidationError>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for error in list {
                    // Schema-level errors land under `__all__` and carry the
                    // offending field as their code.
                    let field = if *field == "__all__" {
                        error.code.to_string()
                    } else {
                        path.clone()
                    };
                    let value = error
                        .params
                        .get("value")
                        .map(|v| v.to_string())
                        .unwrap_or_default();
                    let constraint = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    out.push(ValidationError::new(
                        field,
                        ValidationKind::OutOfRange { value, constraint },
                    ));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_violations(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_violations(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Typed query over an offer snapshot. Empty vectors and `None` mean "any".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OfferFilter {
    #[serde(default)]
    pub providers: Vec<CloudProvider>,
    #[serde(default)]
    pub regions: Vec<RegionBucket>,
    pub os: Option<OsFamily>,
    pub min_vcpu: Option<u32>,
    pub min_memory_gib: Option<f64>,
    /// `Some(true)` keeps only GPU offers, `Some(false)` only CPU offers
    pub gpu: Option<bool>,
    pub access_tier: Option<AccessTier>,
}

impl OfferFilter {
    pub fn for_provider(provider: CloudProvider) -> Self {
        Self {
            providers: vec![provider],
            ..Default::default()
        }
    }

    pub fn in_region(region: RegionBucket) -> Self {
        Self {
            regions: vec![region],
            ..Default::default()
        }
    }

    pub fn with_os(mut self, os: OsFamily) -> Self {
        self.os = Some(os);
        self
    }

    pub fn with_min_vcpu(mut self, vcpu: u32) -> Self {
        self.min_vcpu = Some(vcpu);
        self
    }

    pub fn with_min_memory_gib(mut self, memory_gib: f64) -> Self {
        self.min_memory_gib = Some(memory_gib);
        self
    }

    pub fn with_gpu(mut self, gpu: bool) -> Self {
        self.gpu = Some(gpu);
        self
    }

    pub fn with_access_tier(mut self, tier: AccessTier) -> Self {
        self.access_tier = Some(tier);
        self
    }

    fn matches_common(&self, provider: CloudProvider, region: RegionBucket) -> bool {
        (self.providers.is_empty() || self.providers.contains(&provider))
            && (self.regions.is_empty() || self.regions.contains(&region))
    }

    pub fn matches_compute(&self, offer: &ComputeOffer) -> bool {
        self.matches_common(offer.provider, offer.region)
            && self.os.is_none_or(|os| offer.os == os)
            && self.min_vcpu.is_none_or(|v| offer.vcpu >= v)
            && self.min_memory_gib.is_none_or(|m| offer.memory_gib >= m)
            && self.gpu.is_none_or(|wanted| offer.gpu.is_some() == wanted)
    }

    pub fn matches_storage(&self, offer: &StorageOffer) -> bool {
        self.matches_common(offer.provider, offer.region)
            && self.access_tier.is_none_or(|tier| offer.access_tier == tier)
    }
}

/// Minimum VM shape for a cross-provider comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate, TS)]
#[ts(export)]
pub struct ComputeSpecs {
    #[validate(range(min = 1))]
    pub vcpu: u32,
    #[validate(range(exclusive_min = 0.0))]
    pub memory_gib: f64,
}

impl ComputeSpecs {
    pub fn validate_invariants(&self) -> Result<(), ValidationError> {
        self.validate().map_err(|e| first_violation(&e))
    }

    pub fn to_filter(self) -> OfferFilter {
        OfferFilter::default()
            .with_min_vcpu(self.vcpu)
            .with_min_memory_gib(self.memory_gib)
    }
}

// ============================================================================
// Derived statistics
// ============================================================================

/// count/min/avg/max over a non-empty set of prices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceSummary {
    pub count: usize,
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

/// Per-provider rollup, recomputed from the current snapshot on every query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProviderStats {
    pub provider: CloudProvider,
    /// Number of compute offers
    pub offer_count: usize,
    /// Distinct region buckets the provider's offers appear in, sorted
    pub regions: Vec<RegionBucket>,
    pub min_hourly_usd: Option<f64>,
    pub avg_hourly_usd: Option<f64>,
    pub max_hourly_usd: Option<f64>,
    pub storage_offer_count: usize,
    /// Storage offers with a non-null capacity price
    pub capacity_priced_count: usize,
    /// `None` when no storage offer carries a capacity price
    pub avg_capacity_gb_month_usd: Option<f64>,
}

/// Per-region rollup of compute offers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RegionStats {
    pub region: RegionBucket,
    pub offer_count: usize,
    pub providers: Vec<CloudProvider>,
    pub min_hourly_usd: f64,
    pub avg_hourly_usd: f64,
    pub max_hourly_usd: f64,
}

/// Capacity-price rollup per provider and access tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StorageTierStats {
    pub provider: CloudProvider,
    pub access_tier: AccessTier,
    pub offer_count: usize,
    pub capacity_priced_count: usize,
    pub min_capacity_gb_month_usd: Option<f64>,
    pub avg_capacity_gb_month_usd: Option<f64>,
    pub max_capacity_gb_month_usd: Option<f64>,
}

/// An offer with its position in a best-value ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RankedOffer<T> {
    /// 1-based position
    pub rank: usize,
    /// Metric value the ranking was ordered by
    pub score: f64,
    pub offer: T,
}

/// Compute offer priced for a comparison table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ComputeQuote {
    pub rank: usize,
    pub offer: ComputeOffer,
    pub monthly_usd: f64,
}

/// Cross-provider comparison for a requested VM shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ComputeComparison {
    pub specs: ComputeSpecs,
    /// Comparable offers, cheapest first
    pub quotes: Vec<ComputeQuote>,
    /// Cheapest offer per provider, in provider order
    pub cheapest_per_provider: Vec<ComputeQuote>,
    /// Monthly difference between the most and least expensive quote
    pub potential_monthly_savings: Option<f64>,
}
