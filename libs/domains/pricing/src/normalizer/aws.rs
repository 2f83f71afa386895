//! AWS price list dialect (EC2 on-demand and S3/EBS storage products).

use regex::Regex;
use std::sync::LazyLock;

use super::ProviderDialect;
use super::parse::{self, required};
use super::regions::aws_region;
use crate::error::ValidationError;
use crate::models::{
    AccessTier, CloudProvider, ComputeOffer, GpuSpec, OsFamily, RegionBucket, StorageOffer,
};
use crate::raw::RawRow;

mod fields {
    pub const INSTANCE_TYPE: &str = "instanceType";
    pub const VCPU: &str = "vcpu";
    pub const MEMORY: &str = "memory";
    pub const ARCH: &str = "processorArchitecture";
    pub const PRICE: &str = "pricePerUnitUsd";
    pub const UNIT: &str = "unit";
    pub const GPU: &str = "gpu";
    pub const GPU_MEMORY: &str = "gpuMemory";
    pub const OS: &str = "operatingSystem";
    pub const REGION: &str = "regionCode";

    pub const SERVICE: &str = "servicename";
    pub const VOLUME_TYPE: &str = "volumeType";
    pub const STORAGE_CLASS: &str = "storageClass";
    pub const CAPACITY: &str = "pricePerGbMonthUsd";
    pub const READ: &str = "readRequestsUsd";
    pub const WRITE: &str = "writeRequestsUsd";
    pub const FLAT: &str = "flatFeeUsd";
}
use fields::*;

const COMPUTE_FIELDS: &[&str] = &[
    INSTANCE_TYPE, VCPU, MEMORY, ARCH, PRICE, UNIT, GPU, GPU_MEMORY, OS, REGION,
];

const STORAGE_FIELDS: &[&str] = &[
    SERVICE, VOLUME_TYPE, STORAGE_CLASS, REGION, CAPACITY, READ, WRITE, FLAT,
];

const HOURLY_UNIT: &str = "Hrs";

// "4 x NVIDIA T4", "8 NVIDIA A100"
static GPU_WITH_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*x?\s+(.+)$").expect("gpu pattern is valid"));

/// AWS spells storage classes per product family
fn access_tier(value: &str) -> Option<AccessTier> {
    match value.trim().to_ascii_lowercase().as_str() {
        "general purpose" | "intelligent-tiering" | "high performance" | "non-critical data" => {
            Some(AccessTier::Frequent)
        }
        "infrequent access" => Some(AccessTier::Occasional),
        "archive instant retrieval" => Some(AccessTier::Rare),
        "archive" => Some(AccessTier::Archive),
        _ => None,
    }
}

fn access_tier_label(tier: AccessTier) -> &'static str {
    match tier {
        AccessTier::Frequent => "General Purpose",
        AccessTier::Occasional => "Infrequent Access",
        AccessTier::Rare => "Archive Instant Retrieval",
        AccessTier::Archive => "Archive",
    }
}

fn parse_gpu(row: &RawRow) -> Result<Option<GpuSpec>, ValidationError> {
    let memory = parse::optional_memory_gib(row, GPU_MEMORY)?;
    let (count, name) = match row.get(GPU) {
        None => (None, None),
        Some(text) if text.chars().all(|c| c.is_ascii_digit()) => {
            (Some(parse::count(GPU, text)?), None)
        }
        Some(text) => match GPU_WITH_NAME.captures(text) {
            Some(captures) => (
                Some(parse::count(GPU, &captures[1])?),
                Some(captures.get(2).map_or("", |m| m.as_str().trim())),
            ),
            // A bare model name means a single accelerator
            None => (Some(1), Some(text)),
        },
    };
    parse::gpu_spec(GPU, count, name, memory)
}

fn region(row: &RawRow) -> Result<(String, RegionBucket), ValidationError> {
    let code = required(row, REGION)?;
    let bucket = aws_region(code).ok_or_else(|| ValidationError::unrecognized(REGION, code))?;
    Ok((code.to_string(), bucket))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AwsDialect;

impl ProviderDialect for AwsDialect {
    fn provider(&self) -> CloudProvider {
        CloudProvider::Aws
    }

    fn normalize_compute(&self, row: &RawRow) -> Result<ComputeOffer, ValidationError> {
        parse::expect_literal(row, UNIT, HOURLY_UNIT)?;
        let (provider_region, region) = region(row)?;
        let os = match row.get(OS) {
            None => OsFamily::Other,
            Some(text) => parse::os_family(OS, text)?,
        };

        Ok(ComputeOffer {
            provider: CloudProvider::Aws,
            vm_name: required(row, INSTANCE_TYPE)?.to_string(),
            vcpu: parse::required_positive_count(row, VCPU)?,
            memory_gib: parse::required_memory_gib(row, MEMORY)?,
            cpu_arch: row.get(ARCH).unwrap_or_default().to_string(),
            hourly_usd: parse::required_price(row, PRICE)?,
            gpu: parse_gpu(row)?,
            os,
            region,
            provider_region,
            details: row.unmapped(COMPUTE_FIELDS),
        })
    }

    fn normalize_storage(&self, row: &RawRow) -> Result<StorageOffer, ValidationError> {
        let tier_text = required(row, STORAGE_CLASS)?;
        let access_tier = access_tier(tier_text)
            .ok_or_else(|| ValidationError::unrecognized(STORAGE_CLASS, tier_text))?;
        let (provider_region, region) = region(row)?;

        Ok(StorageOffer {
            provider: CloudProvider::Aws,
            service_name: required(row, SERVICE)?.to_string(),
            storage_class: required(row, VOLUME_TYPE)?.to_string(),
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
        row.insert(INSTANCE_TYPE, offer.vm_name.as_str());
        row.insert(VCPU, offer.vcpu.to_string());
        row.insert(MEMORY, format!("{} GiB", parse::number(offer.memory_gib)));
        if !offer.cpu_arch.is_empty() {
            row.insert(ARCH, offer.cpu_arch.as_str());
        }
        row.insert(PRICE, parse::number(offer.hourly_usd));
        row.insert(UNIT, HOURLY_UNIT);
        if let Some(gpu) = &offer.gpu {
            let text = match &gpu.name {
                Some(name) => format!("{} x {}", gpu.count, name),
                None => gpu.count.to_string(),
            };
            row.insert(GPU, text);
            if let Some(memory) = gpu.memory_gib {
                row.insert(GPU_MEMORY, format!("{} GiB", parse::number(memory)));
            }
        }
        row.insert(OS, parse::os_label(offer.os));
        row.insert(REGION, offer.provider_region.as_str());
        row
    }

    fn storage_to_native(&self, offer: &StorageOffer) -> RawRow {
        let mut row = RawRow::from_details(&offer.details);
        row.insert(SERVICE, offer.service_name.as_str());
        row.insert(VOLUME_TYPE, offer.storage_class.as_str());
        row.insert(STORAGE_CLASS, access_tier_label(offer.access_tier));
        row.insert(REGION, offer.provider_region.as_str());
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
