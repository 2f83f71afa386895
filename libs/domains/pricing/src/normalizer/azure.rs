//! Azure Retail Prices dialect.

use super::ProviderDialect;
use super::parse::{self, required};
use super::regions::azure_region;
use crate::error::ValidationError;
use crate::models::{AccessTier, CloudProvider, ComputeOffer, OsFamily, RegionBucket, StorageOffer};
use crate::raw::RawRow;

const SKU: &str = "armSkuName";
const VCPUS: &str = "vCPUs";
const MEMORY: &str = "memoryGB";
const ARCH: &str = "cpuArchitectureType";
const PRICE: &str = "retailPrice";
const UNIT: &str = "unitOfMeasure";
const CURRENCY: &str = "currencyCode";
const GPUS: &str = "gpus";
const GPU_NAME: &str = "gpuName";
const GPU_MEMORY: &str = "gpuMemoryGB";
const REGION: &str = "armRegionName";
const PRODUCT: &str = "productName";

const SKU_NAME: &str = "skuName";
const ACCESS_TIER: &str = "accessTier";
const CAPACITY: &str = "capacityRetailPrice";
const READ: &str = "readOperationsRetailPrice";
const WRITE: &str = "writeOperationsRetailPrice";
const FLAT: &str = "flatRetailPrice";

// productName is only inspected for compute rows, so it stays in details
const COMPUTE_FIELDS: &[&str] = &[
    SKU, VCPUS, MEMORY, ARCH, PRICE, UNIT, CURRENCY, GPUS, GPU_NAME, GPU_MEMORY, REGION,
];

const STORAGE_FIELDS: &[&str] = &[
    PRODUCT, SKU_NAME, ACCESS_TIER, REGION, CAPACITY, READ, WRITE, FLAT, CURRENCY,
];

const HOURLY_UNIT: &str = "1 Hour";
const USD: &str = "USD";

fn access_tier(value: &str) -> Option<AccessTier> {
    match value.trim().to_ascii_lowercase().as_str() {
        "hot" | "premium" | "premium block blob" | "standard" | "general purpose" => {
            Some(AccessTier::Frequent)
        }
        "cool" => Some(AccessTier::Occasional),
        "cold" => Some(AccessTier::Rare),
        "archive" => Some(AccessTier::Archive),
        _ => None,
    }
}

fn access_tier_label(tier: AccessTier) -> &'static str {
    match tier {
        AccessTier::Frequent => "Hot",
        AccessTier::Occasional => "Cool",
        AccessTier::Rare => "Cold",
        AccessTier::Archive => "Archive",
    }
}

/// Azure publishes Windows and Linux meters as separate products
fn os_from_product(product: Option<&str>) -> OsFamily {
    match product {
        Some(name) if name.to_ascii_lowercase().contains("windows") => OsFamily::Windows,
        _ => OsFamily::Linux,
    }
}

fn product_for(os: OsFamily) -> &'static str {
    match os {
        OsFamily::Windows => "Virtual Machines Windows",
        _ => "Virtual Machines",
    }
}

fn region(row: &RawRow) -> Result<(String, RegionBucket), ValidationError> {
    let code = required(row, REGION)?;
    let bucket = azure_region(code).ok_or_else(|| ValidationError::unrecognized(REGION, code))?;
    Ok((code.to_string(), bucket))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AzureDialect;

impl ProviderDialect for AzureDialect {
    fn provider(&self) -> CloudProvider {
        CloudProvider::Azure
    }

    fn normalize_compute(&self, row: &RawRow) -> Result<ComputeOffer, ValidationError> {
        parse::expect_literal(row, UNIT, HOURLY_UNIT)?;
        parse::expect_literal(row, CURRENCY, USD)?;
        let (provider_region, region) = region(row)?;

        let gpu_memory = match row.get(GPU_MEMORY) {
            Some(text) => {
                let value = parse::decimal(GPU_MEMORY, text)?;
                Some(parse::positive(GPU_MEMORY, text, value)?)
            }
            None => None,
        };
        let gpu = parse::gpu_spec(
            GPUS,
            parse::optional_count(row, GPUS)?,
            row.get(GPU_NAME),
            gpu_memory,
        )?;

        Ok(ComputeOffer {
            provider: CloudProvider::Azure,
            vm_name: required(row, SKU)?.to_string(),
            vcpu: parse::required_positive_count(row, VCPUS)?,
            memory_gib: parse::required_memory_gib(row, MEMORY)?,
            cpu_arch: row.get(ARCH).unwrap_or_default().to_string(),
            hourly_usd: parse::required_price(row, PRICE)?,
            gpu,
            os: os_from_product(row.get(PRODUCT)),
            region,
            provider_region,
            details: row.unmapped(COMPUTE_FIELDS),
        })
    }

    fn normalize_storage(&self, row: &RawRow) -> Result<StorageOffer, ValidationError> {
        parse::expect_literal(row, CURRENCY, USD)?;
        let tier_text = required(row, ACCESS_TIER)?;
        let access_tier = access_tier(tier_text)
            .ok_or_else(|| ValidationError::unrecognized(ACCESS_TIER, tier_text))?;
        let (provider_region, region) = region(row)?;

        Ok(StorageOffer {
            provider: CloudProvider::Azure,
            service_name: required(row, PRODUCT)?.to_string(),
            storage_class: required(row, SKU_NAME)?.to_string(),
            region,
            provider_region,
            access_tier,
            capacity_gb_month_usd: parse::optional_price(row, CAPACITY)?,
            read_op_usd: parse::optional_price(row, READ)?,
            write_op_usd: parse::optional_price(row, WRITE)?,
            flat_fee_usd: parse::optional_price(row, FLAT)?,
            details: row.unmapped(STORAGE_FIELDS),
        })
    }

    fn compute_to_native(&self, offer: &ComputeOffer) -> RawRow {
        let mut row = RawRow::from_details(&offer.details);
        row.insert(SKU, offer.vm_name.as_str());
        row.insert(VCPUS, offer.vcpu.to_string());
        row.insert(MEMORY, parse::number(offer.memory_gib));
        if !offer.cpu_arch.is_empty() {
            row.insert(ARCH, offer.cpu_arch.as_str());
        }
        row.insert(PRICE, parse::number(offer.hourly_usd));
        row.insert(UNIT, HOURLY_UNIT);
        row.insert(CURRENCY, USD);
        if let Some(gpu) = &offer.gpu {
            row.insert(GPUS, gpu.count.to_string());
            if let Some(name) = &gpu.name {
                row.insert(GPU_NAME, name.as_str());
            }
            if let Some(memory) = gpu.memory_gib {
                row.insert(GPU_MEMORY, parse::number(memory));
            }
        }
        if !row.contains_key(PRODUCT) {
            row.insert(PRODUCT, product_for(offer.os));
        }
        row.insert(REGION, offer.provider_region.as_str());
        row
    }

    fn storage_to_native(&self, offer: &StorageOffer) -> RawRow {
        let mut row = RawRow::from_details(&offer.details);
        row.insert(PRODUCT, offer.service_name.as_str());
        row.insert(SKU_NAME, offer.storage_class.as_str());
        row.insert(ACCESS_TIER, access_tier_label(offer.access_tier));
        row.insert(REGION, offer.provider_region.as_str());
        row.insert(CURRENCY, USD);
        let prices = [
            (CAPACITY, offer.capacity_gb_month_usd),
            (READ, offer.read_op_usd),
            (WRITE, offer.write_op_usd),
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
