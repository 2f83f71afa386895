//! GCP Cloud Billing catalog dialect.
//!
//! Compute list prices arrive as a `{units, nanos}` money pair. The pair is
//! joined as decimal text before parsing so the result is the f64 nearest to
//! the exact price rather than `units + nanos * 1e-9`.

use super::ProviderDialect;
use super::parse::{self, required};
use super::regions::gcp_region;
use crate::error::ValidationError;
use crate::models::{AccessTier, CloudProvider, ComputeOffer, OsFamily, RegionBucket, StorageOffer};
use crate::raw::RawRow;

const MACHINE_TYPE: &str = "machineType";
const CPUS: &str = "guestCpus";
const MEMORY_MB: &str = "memoryMb";
const ARCH: &str = "architecture";
const PRICE_UNITS: &str = "priceUnits";
const PRICE_NANOS: &str = "priceNanos";
const CURRENCY: &str = "currencyCode";
const ACCELERATOR_COUNT: &str = "acceleratorCount";
const ACCELERATOR_TYPE: &str = "acceleratorType";
const ACCELERATOR_MEMORY: &str = "acceleratorMemoryGb";
const OS: &str = "operatingSystem";
const REGION: &str = "region";

const SERVICE: &str = "serviceDisplayName";
const STORAGE_CLASS: &str = "storageClass";
const CAPACITY: &str = "capacityUsd";
const CLASS_B: &str = "classBOperationUsd";
const CLASS_A: &str = "classAOperationUsd";
const FLAT: &str = "flatUsd";

const COMPUTE_FIELDS: &[&str] = &[
    MACHINE_TYPE,
    CPUS,
    MEMORY_MB,
    ARCH,
    PRICE_UNITS,
    PRICE_NANOS,
    CURRENCY,
    ACCELERATOR_COUNT,
    ACCELERATOR_TYPE,
    ACCELERATOR_MEMORY,
    OS,
    REGION,
];

const STORAGE_FIELDS: &[&str] = &[
    SERVICE, STORAGE_CLASS, REGION, CAPACITY, CLASS_B, CLASS_A, FLAT, CURRENCY,
];

const USD: &str = "USD";
const NANOS_PER_UNIT: u64 = 1_000_000_000;
const MIB_PER_GIB: f64 = 1024.0;

fn access_tier(value: &str) -> Option<AccessTier> {
    match value.trim().to_ascii_uppercase().as_str() {
        "STANDARD" | "MULTI_REGIONAL" | "REGIONAL" | "DURABLE_REDUCED_AVAILABILITY" => {
            Some(AccessTier::Frequent)
        }
        "NEARLINE" => Some(AccessTier::Occasional),
        "COLDLINE" => Some(AccessTier::Rare),
        "ARCHIVE" => Some(AccessTier::Archive),
        _ => None,
    }
}

/// Join a money pair into a price. A missing half counts as zero, but at
/// least one half must be present.
fn money(row: &RawRow) -> Result<f64, ValidationError> {
    let units_text = row.get(PRICE_UNITS);
    let nanos_text = row.get(PRICE_NANOS);
    if units_text.is_none() && nanos_text.is_none() {
        return Err(ValidationError::missing(PRICE_UNITS));
    }

    let units = match units_text {
        Some(text) => text
            .parse::<i64>()
            .map_err(|_| ValidationError::not_a_number(PRICE_UNITS, text))?,
        None => 0,
    };
    if units < 0 {
        return Err(ValidationError::out_of_range(PRICE_UNITS, units, ">= 0"));
    }

    let nanos = match nanos_text {
        Some(text) => text
            .parse::<i64>()
            .map_err(|_| ValidationError::not_a_number(PRICE_NANOS, text))?,
        None => 0,
    };
    if !(0..NANOS_PER_UNIT as i64).contains(&nanos) {
        return Err(ValidationError::out_of_range(
            PRICE_NANOS,
            nanos,
            "0..=999999999",
        ));
    }

    parse::decimal(PRICE_UNITS, &format!("{units}.{nanos:09}"))
}

/// Split a price back into `{units, nanos}` using its shortest decimal form
fn split_money(price: f64) -> (String, String) {
    let text = parse::number(price);
    let (units, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    if fraction.len() <= 9 {
        let nanos = format!("{fraction:0<9}")
            .parse::<u64>()
            .unwrap_or_default();
        return (units.to_string(), nanos.to_string());
    }

    // More precision than the wire format carries
    let mut units = price.trunc() as u64;
    let mut nanos = (price.fract() * NANOS_PER_UNIT as f64).round() as u64;
    if nanos >= NANOS_PER_UNIT {
        units += 1;
        nanos -= NANOS_PER_UNIT;
    }
    (units.to_string(), nanos.to_string())
}

fn region(row: &RawRow) -> Result<(String, RegionBucket), ValidationError> {
    let code = required(row, REGION)?;
    let bucket = gcp_region(code).ok_or_else(|| ValidationError::unrecognized(REGION, code))?;
    Ok((code.to_string(), bucket))
}

fn positive_decimal(row: &RawRow, field: &str) -> Result<Option<f64>, ValidationError> {
    row.get(field)
        .map(|text| parse::positive(field, text, parse::decimal(field, text)?))
        .transpose()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GcpDialect;

impl ProviderDialect for GcpDialect {
    fn provider(&self) -> CloudProvider {
        CloudProvider::Gcp
    }

    fn normalize_compute(&self, row: &RawRow) -> Result<ComputeOffer, ValidationError> {
        parse::expect_literal(row, CURRENCY, USD)?;
        let (provider_region, region) = region(row)?;

        let memory_mb_text = required(row, MEMORY_MB)?;
        let memory_mb = parse::decimal(MEMORY_MB, memory_mb_text)?;
        let memory_gib = parse::positive(MEMORY_MB, memory_mb_text, memory_mb / MIB_PER_GIB)?;

        // List prices exclude OS licensing
        let os = match row.get(OS) {
            None => OsFamily::Linux,
            Some(text) => parse::os_family(OS, text)?,
        };

        let gpu = parse::gpu_spec(
            ACCELERATOR_COUNT,
            parse::optional_count(row, ACCELERATOR_COUNT)?,
            row.get(ACCELERATOR_TYPE),
            positive_decimal(row, ACCELERATOR_MEMORY)?,
        )?;

        Ok(ComputeOffer {
            provider: CloudProvider::Gcp,
            vm_name: required(row, MACHINE_TYPE)?.to_string(),
            vcpu: parse::required_positive_count(row, CPUS)?,
            memory_gib,
            cpu_arch: row.get(ARCH).unwrap_or_default().to_string(),
            hourly_usd: money(row)?,
            gpu,
            os,
            region,
            provider_region,
            details: row.unmapped(COMPUTE_FIELDS),
        })
    }

    fn normalize_storage(&self, row: &RawRow) -> Result<StorageOffer, ValidationError> {
        parse::expect_literal(row, CURRENCY, USD)?;
        let class = required(row, STORAGE_CLASS)?;
        let access_tier =
            access_tier(class).ok_or_else(|| ValidationError::unrecognized(STORAGE_CLASS, class))?;
        let (provider_region, region) = region(row)?;

        Ok(StorageOffer {
            provider: CloudProvider::Gcp,
            service_name: required(row, SERVICE)?.to_string(),
            storage_class: class.to_string(),
            region,
            provider_region,
            access_tier,
            capacity_gb_month_usd: parse::optional_price(row, CAPACITY)?,
            read_op_usd: parse::optional_price(row, CLASS_B)?,
            write_op_usd: parse::optional_price(row, CLASS_A)?,
            flat_fee_usd: parse::optional_price(row, FLAT)?,
            details: row.unmapped(STORAGE_FIELDS),
        })
    }

    fn compute_to_native(&self, offer: &ComputeOffer) -> RawRow {
        let mut row = RawRow::from_details(&offer.details);
        row.insert(MACHINE_TYPE, offer.vm_name.as_str());
        row.insert(CPUS, offer.vcpu.to_string());
        row.insert(MEMORY_MB, parse::number(offer.memory_gib * MIB_PER_GIB));
        if !offer.cpu_arch.is_empty() {
            row.insert(ARCH, offer.cpu_arch.as_str());
        }
        let (units, nanos) = split_money(offer.hourly_usd);
        row.insert(PRICE_UNITS, units);
        row.insert(PRICE_NANOS, nanos);
        row.insert(CURRENCY, USD);
        if let Some(gpu) = &offer.gpu {
            row.insert(ACCELERATOR_COUNT, gpu.count.to_string());
            if let Some(name) = &gpu.name {
                row.insert(ACCELERATOR_TYPE, name.as_str());
            }
            if let Some(memory) = gpu.memory_gib {
                row.insert(ACCELERATOR_MEMORY, parse::number(memory));
            }
        }
        if offer.os != OsFamily::Linux {
            row.insert(OS, parse::os_label(offer.os));
        }
        row.insert(REGION, offer.provider_region.as_str());
        row
    }

    fn storage_to_native(&self, offer: &StorageOffer) -> RawRow {
        let mut row = RawRow::from_details(&offer.details);
        row.insert(SERVICE, offer.service_name.as_str());
        row.insert(STORAGE_CLASS, offer.storage_class.as_str());
        row.insert(REGION, offer.provider_region.as_str());
        row.insert(CURRENCY, USD);
        let prices = [
            (CAPACITY, offer.capacity_gb_month_usd),
            (CLASS_B, offer.read_op_usd),
            (CLASS_A, offer.write_op_usd),
            (FLAT, offer.flat_fee_usd),
        ];
        for (field, value) in prices {
            if let Some(value) = value {
                row.insert(field, parse::number(value));
            }
        }
        row
    }
}
