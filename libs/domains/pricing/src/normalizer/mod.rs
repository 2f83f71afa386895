//! Provider row normalization.
//!
//! Each cloud provider publishes prices under its own field names, units and
//! enum spellings. A [`ProviderDialect`] knows one provider's conventions and
//! maps its raw rows onto [`ComputeOffer`] / [`StorageOffer`] and back. The
//! [`Normalizer`] façade picks the dialect and adds the batch forms used by
//! ingestion.

mod aws;
mod azure;
mod gcp;
mod parse;
pub mod regions;

pub use aws::AwsDialect;
pub use azure::AzureDialect;
pub use gcp::GcpDialect;

use observability::PricingMetrics;
use tracing::{info, warn};

use crate::error::{PricingError, PricingResult, ValidationError};
use crate::models::{CloudProvider, ComputeOffer, OfferKind, StorageOffer};
use crate::raw::RawRow;

/// One provider's field names and spellings
pub trait ProviderDialect: Send + Sync {
    fn provider(&self) -> CloudProvider;

    /// Map a raw compute row onto the canonical shape
    fn normalize_compute(&self, row: &RawRow) -> Result<ComputeOffer, ValidationError>;

    /// Map a raw storage row onto the canonical shape
    fn normalize_storage(&self, row: &RawRow) -> Result<StorageOffer, ValidationError>;

    /// Write an offer back under this provider's native keys. Details are
    /// written first so mapped fields win.
    fn compute_to_native(&self, offer: &ComputeOffer) -> RawRow;

    fn storage_to_native(&self, offer: &StorageOffer) -> RawRow;
}

/// Dialect for a provider
pub fn dialect_for(provider: CloudProvider) -> &'static dyn ProviderDialect {
    match provider {
        CloudProvider::Aws => &AwsDialect,
        CloudProvider::Azure => &AzureDialect,
        CloudProvider::Gcp => &GcpDialect,
    }
}

/// A row that failed normalization inside a batch
#[derive(Debug, Clone, PartialEq)]
pub struct RowRejection {
    /// Zero-based position of the row in the input
    pub index: usize,
    pub error: ValidationError,
}

/// Outcome of normalizing a batch without aborting on bad rows
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport<T> {
    pub offers: Vec<T>,
    pub rejections: Vec<RowRejection>,
}

impl<T> BatchReport<T> {
    pub fn accepted(&self) -> usize {
        self.offers.len()
    }

    pub fn rejected(&self) -> usize {
        self.rejections.len()
    }

    pub fn is_clean(&self) -> bool {
        self.rejections.is_empty()
    }

    /// Indices of every rejected row, ascending
    pub fn rejected_indices(&self) -> Vec<usize> {
        self.rejections.iter().map(|r| r.index).collect()
    }
}

/// Stateless entry point over the provider dialects
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize_compute(
        &self,
        provider: CloudProvider,
        row: &RawRow,
    ) -> Result<ComputeOffer, ValidationError> {
        let offer = dialect_for(provider).normalize_compute(row)?;
        offer.validate_invariants()?;
        Ok(offer)
    }

    pub fn normalize_storage(
        &self,
        provider: CloudProvider,
        row: &RawRow,
    ) -> Result<StorageOffer, ValidationError> {
        let offer = dialect_for(provider).normalize_storage(row)?;
        offer.validate_invariants()?;
        Ok(offer)
    }

    pub fn compute_to_native(&self, offer: &ComputeOffer) -> RawRow {
        dialect_for(offer.provider).compute_to_native(offer)
    }

    pub fn storage_to_native(&self, offer: &StorageOffer) -> RawRow {
        dialect_for(offer.provider).storage_to_native(offer)
    }

    /// Normalize every row or fail on the first invalid one
    pub fn normalize_compute_rows<'a>(
        &self,
        provider: CloudProvider,
        rows: impl IntoIterator<Item = &'a RawRow>,
    ) -> PricingResult<Vec<ComputeOffer>> {
        collect_all(rows, |row| self.normalize_compute(provider, row))
    }

    pub fn normalize_storage_rows<'a>(
        &self,
        provider: CloudProvider,
        rows: impl IntoIterator<Item = &'a RawRow>,
    ) -> PricingResult<Vec<StorageOffer>> {
        collect_all(rows, |row| self.normalize_storage(provider, row))
    }

    /// Normalize what can be normalized and report the rest
    pub fn partition_compute_rows<'a>(
        &self,
        provider: CloudProvider,
        rows: impl IntoIterator<Item = &'a RawRow>,
    ) -> BatchReport<ComputeOffer> {
        partition(provider, OfferKind::Compute, rows, |row| {
            self.normalize_compute(provider, row)
        })
    }

    pub fn partition_storage_rows<'a>(
        &self,
        provider: CloudProvider,
        rows: impl IntoIterator<Item = &'a RawRow>,
    ) -> BatchReport<StorageOffer> {
        partition(provider, OfferKind::Storage, rows, |row| {
            self.normalize_storage(provider, row)
        })
    }
}

fn collect_all<'a, T>(
    rows: impl IntoIterator<Item = &'a RawRow>,
    normalize: impl Fn(&RawRow) -> Result<T, ValidationError>,
) -> PricingResult<Vec<T>> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| normalize(row).map_err(|source| PricingError::Row { index, source }))
        .collect()
}

fn partition<'a, T>(
    provider: CloudProvider,
    kind: OfferKind,
    rows: impl IntoIterator<Item = &'a RawRow>,
    normalize: impl Fn(&RawRow) -> Result<T, ValidationError>,
) -> BatchReport<T> {
    let provider_label = provider.to_string();
    let kind_label = kind.to_string();

    let mut report = BatchReport {
        offers: Vec::new(),
        rejections: Vec::new(),
    };

    for (index, row) in rows.into_iter().enumerate() {
        match normalize(row) {
            Ok(offer) => report.offers.push(offer),
            Err(error) => {
                warn!(
                    provider = %provider,
                    kind = %kind,
                    index = index,
                    field = %error.field,
                    error = %error,
                    "Rejected raw pricing row"
                );
                PricingMetrics::record_row_rejected(&provider_label, &kind_label, &error.field);
                report.rejections.push(RowRejection { index, error });
            }
        }
    }

    PricingMetrics::record_rows_normalized(
        &provider_label,
        &kind_label,
        report.accepted(),
        report.rejected(),
    );
    info!(
        provider = %provider,
        kind = %kind,
        accepted = report.accepted(),
        rejected = report.rejected(),
        "Normalized pricing batch"
    );

    report
}
