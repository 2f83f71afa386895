//! Pricing Domain
//!
//! Normalizes heterogeneous cloud provider price rows into one schema and
//! derives comparison statistics from it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   Service   │  ← Snapshot queries, rankings, cross-provider comparison
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌──────────────────────────┐
//! │ OfferSource │     │ Aggregator / Best value  │  ← Pure functions over snapshots
//! └──────┬──────┘     └──────────────────────────┘
//!        │
//! ┌──────▼──────┐
//! │ Normalizer  │  ← Provider dialects: raw rows → canonical offers
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Offers, enums, stats DTOs, filters
//! └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_pricing::{aggregator, CloudProvider, Normalizer, RawRow};
//!
//! let row = RawRow::new()
//!     .with("instanceType", "t3.micro")
//!     .with("vcpu", "2")
//!     .with("memory", "1 GiB")
//!     .with("pricePerUnitUsd", "0.0104")
//!     .with("regionCode", "us-east-1");
//! let offer = Normalizer::new().normalize_compute(CloudProvider::Aws, &row)?;
//! let stats = aggregator::provider_stats([&offer]);
//! ```

pub mod aggregator;
pub mod best_value;
pub mod config;
pub mod error;
pub mod memory;
pub mod models;
pub mod normalizer;
pub mod raw;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use best_value::{CostMetric, StorageMetric};
pub use config::PricingConfig;
pub use error::{PricingError, PricingResult, ValidationError, ValidationKind};
pub use memory::InMemoryOfferSource;
pub use models::{
    AccessTier, CloudProvider, ComputeComparison, ComputeOffer, ComputeQuote, ComputeSpecs,
    Details, GpuSpec, OfferFilter, OfferKind, OsFamily, PriceSummary, ProviderStats,
    RankedOffer, RegionBucket, RegionStats, StorageOffer, StorageTierStats,
};
pub use normalizer::{
    dialect_for, AwsDialect, AzureDialect, BatchReport, GcpDialect, Normalizer, ProviderDialect,
    RowRejection,
};
pub use raw::RawRow;
pub use repository::OfferSource;
pub use service::PricingService;
