//! Normalization tests for the Pricing domain
//!
//! These tests drive raw provider rows through the public normalizer:
//! - Mapping of native fields, units and enum spellings
//! - Re-serialization back to native keys
//! - Fail-closed rejection of unknown spellings
//! - Batch behaviour with mixed valid and invalid rows

use domain_pricing::*;
use serde_json::json;

fn aws_vm(instance: &str, price: &str, memory: &str, region: &str) -> RawRow {
    RawRow::new()
        .with("instanceType", instance)
        .with("vcpu", "4")
        .with("memory", memory)
        .with("processorArchitecture", "64-bit")
        .with("pricePerUnitUsd", price)
        .with("unit", "Hrs")
        .with("operatingSystem", "Linux")
        .with("regionCode", region)
        .with("tenancy", "Shared")
        .with("sku", "7W6DJ5C4Q9ZD4PJ7")
}

fn azure_vm(sku: &str, price: &str, product: &str) -> RawRow {
    RawRow::new()
        .with("armSkuName", sku)
        .with("vCPUs", "2")
        .with("memoryGB", "3.5")
        .with("cpuArchitectureType", "x64")
        .with("retailPrice", price)
        .with("unitOfMeasure", "1 Hour")
        .with("currencyCode", "USD")
        .with("armRegionName", "northeurope")
        .with("productName", product)
        .with("meterName", "D2 v2")
}

fn gcp_vm(machine: &str, units: &str, nanos: &str) -> RawRow {
    RawRow::new()
        .with("machineType", machine)
        .with("guestCpus", "8")
        .with("memoryMb", "30720")
        .with("architecture", "X86_64")
        .with("priceUnits", units)
        .with("priceNanos", nanos)
        .with("currencyCode", "USD")
        .with("region", "asia-southeast1")
        .with("skuId", "CF4E-A0C7-E3BF")
}

fn azure_blob(tier: &str, capacity: Option<&str>) -> RawRow {
    let row = RawRow::new()
        .with("productName", "General Block Blob v2")
        .with("skuName", format!("{tier} LRS"))
        .with("accessTier", tier)
        .with("armRegionName", "westus2")
        .with("readOperationsRetailPrice", "0.0004")
        .with("currencyCode", "USD");
    match capacity {
        Some(price) => row.with("capacityRetailPrice", price),
        None => row,
    }
}

fn assert_compute_round_trip(provider: CloudProvider, row: &RawRow) {
    let normalizer = Normalizer::new();
    let offer = normalizer.normalize_compute(provider, row).unwrap();
    let native = normalizer.compute_to_native(&offer);
    let again = normalizer.normalize_compute(provider, &native).unwrap();

    assert_eq!(again, offer, "{provider} row should round-trip: {native:?}");
    assert_eq!(again.hourly_usd.to_bits(), offer.hourly_usd.to_bits());
    assert_eq!(again.memory_gib.to_bits(), offer.memory_gib.to_bits());
}

#[test]
fn test_compute_rows_round_trip_through_native_keys() {
    let aws_cases = [
        ("0.192", "16 GiB"),
        ("0.0000001", "0.5 GiB"),
        ("13.338", "1,952 GiB"),
    ];
    for (price, memory) in aws_cases {
        let row = aws_vm("x2iedn.xlarge", price, memory, "eu-west-1");
        assert_compute_round_trip(CloudProvider::Aws, &row);
    }
    for price in ["0.146", "0.0021", "27.197"] {
        let row = azure_vm("Standard_D2_v2", price, "Virtual Machines Dv2 Series");
        assert_compute_round_trip(CloudProvider::Azure, &row);
    }
    for (units, nanos) in [("0", "134012000"), ("1", "5"), ("12", "999999999")] {
        assert_compute_round_trip(CloudProvider::Gcp, &gcp_vm("n2-standard-8", units, nanos));
    }

    let gpu_row = gcp_vm("a2-highgpu-1g", "3", "673385000")
        .with("acceleratorCount", "1")
        .with("acceleratorType", "nvidia-tesla-a100")
        .with("acceleratorMemoryGb", "40");
    assert_compute_round_trip(CloudProvider::Gcp, &gpu_row);

    let aws_gpu = aws_vm("g4dn.xlarge", "0.526", "16 GiB", "us-west-2-lax-1")
        .with("gpu", "1 x NVIDIA T4")
        .with("gpuMemory", "16 GiB");
    assert_compute_round_trip(CloudProvider::Aws, &aws_gpu);
}

#[test]
fn test_storage_rows_round_trip_through_native_keys() {
    let normalizer = Normalizer::new();
    let rows = [
        (CloudProvider::Azure, azure_blob("Cool", Some("0.01"))),
        (CloudProvider::Azure, azure_blob("Archive", None)),
        (
            CloudProvider::Gcp,
            RawRow::new()
                .with("serviceDisplayName", "Cloud Storage")
                .with("storageClass", "COLDLINE")
                .with("region", "nam4")
                .with("capacityUsd", "0.004")
                .with("classBOperationUsd", "0.0000005"),
        ),
        (
            CloudProvider::Aws,
            RawRow::new()
                .with("servicename", "Amazon Simple Storage Service")
                .with("volumeType", "Glacier Instant Retrieval")
                .with("storageClass", "Archive Instant Retrieval")
                .with("regionCode", "ap-southeast-2")
                .with("pricePerGbMonthUsd", "0.005")
                .with("flatFeeUsd", "0"),
        ),
    ];

    for (provider, row) in &rows {
        let offer = normalizer.normalize_storage(*provider, row).unwrap();
        let native = normalizer.storage_to_native(&offer);
        let again = normalizer.normalize_storage(*provider, &native).unwrap();
        assert_eq!(again, offer, "{provider} storage row should round-trip");
    }
}

#[test]
fn test_unmapped_fields_survive_in_details() {
    let row = aws_vm("m6i.xlarge", "0.192", "16 GiB", "us-east-1");
    let offer = Normalizer::new()
        .normalize_compute(CloudProvider::Aws, &row)
        .unwrap();
    assert_eq!(offer.details.len(), 2);
    assert_eq!(offer.details["tenancy"], json!("Shared"));
    assert_eq!(offer.details["sku"], json!("7W6DJ5C4Q9ZD4PJ7"));

    let native = Normalizer::new().compute_to_native(&offer);
    assert_eq!(native.get("tenancy"), Some("Shared"));
}

#[test]
fn test_unknown_access_tier_is_rejected_not_defaulted() {
    let err = Normalizer::new()
        .normalize_storage(CloudProvider::Azure, &azure_blob("Lukewarm", Some("0.02")))
        .unwrap_err();
    assert_eq!(err.field, "accessTier");
    assert_eq!(
        err.kind,
        ValidationKind::Unrecognized {
            value: "Lukewarm".to_string()
        }
    );
}

#[test]
fn test_missing_access_tier_is_rejected() {
    let mut row = azure_blob("Hot", Some("0.018"));
    row.remove("accessTier");
    let err = Normalizer::new()
        .normalize_storage(CloudProvider::Azure, &row)
        .unwrap_err();
    assert_eq!(err.field, "accessTier");
    assert_eq!(err.kind, ValidationKind::Missing);
}

#[test]
fn test_unknown_region_is_rejected() {
    let row = aws_vm("m5.large", "0.096", "8 GiB", "lunar-base-1");
    let err = Normalizer::new()
        .normalize_compute(CloudProvider::Aws, &row)
        .unwrap_err();
    assert_eq!(err.field, "regionCode");
}

#[test]
fn test_zones_resolve_through_parent_region() {
    let normalizer = Normalizer::new();
    for (zone, bucket) in [
        ("us-west-2-lax-1", RegionBucket::NorthAmerica),
        ("us-east-1-wl1-bos1", RegionBucket::NorthAmerica),
        ("ap-northeast-2-wl1-cjj1", RegionBucket::Asia),
    ] {
        let offer = normalizer
            .normalize_compute(CloudProvider::Aws, &aws_vm("t3.medium", "0.0416", "4 GiB", zone))
            .unwrap();
        assert_eq!(offer.region, bucket);
        assert_eq!(offer.provider_region, zone);
    }
}

#[test]
fn test_memory_units_convert_to_gib() {
    let normalizer = Normalizer::new();
    let nano = aws_vm("t4g.nano", "0.0042", "512 MiB", "us-east-1");
    let aws = normalizer
        .normalize_compute(CloudProvider::Aws, &nano)
        .unwrap();
    assert_eq!(aws.memory_gib, 0.5);

    let gcp = normalizer
        .normalize_compute(CloudProvider::Gcp, &gcp_vm("n1-standard-8", "0", "379998000"))
        .unwrap();
    assert_eq!(gcp.memory_gib, 30.0);

    let d2 = azure_vm("Standard_D2_v2", "0.146", "Virtual Machines");
    let azure = normalizer
        .normalize_compute(CloudProvider::Azure, &d2)
        .unwrap();
    assert_eq!(azure.memory_gib, 3.5);
}

#[test]
fn test_gpu_name_without_count_is_inconsistent() {
    let row = gcp_vm("n1-standard-8", "0", "379998000").with("acceleratorType", "nvidia-tesla-t4");
    let err = Normalizer::new()
        .normalize_compute(CloudProvider::Gcp, &row)
        .unwrap_err();
    assert_eq!(err.field, "acceleratorCount");
    assert!(matches!(err.kind, ValidationKind::Inconsistent { .. }));
}

#[test]
fn test_unrecognized_os_is_rejected() {
    let row = aws_vm("m5.large", "0.096", "8 GiB", "us-east-1").with("operatingSystem", "Plan 9");
    let err = Normalizer::new()
        .normalize_compute(CloudProvider::Aws, &row)
        .unwrap_err();
    assert_eq!(err.field, "operatingSystem");
}

#[test]
fn test_null_tokens_count_as_absent() {
    let row = aws_vm("m5.large", "0.096", "8 GiB", "us-east-1")
        .with("gpu", "N/A")
        .with("operatingSystem", "NA");
    let offer = Normalizer::new()
        .normalize_compute(CloudProvider::Aws, &row)
        .unwrap();
    assert_eq!(offer.gpu, None);
    assert_eq!(offer.os, OsFamily::Other);

    let err = Normalizer::new()
        .normalize_compute(CloudProvider::Aws, &row.with("pricePerUnitUsd", "null"))
        .unwrap_err();
    assert_eq!(err.field, "pricePerUnitUsd");
    assert_eq!(err.kind, ValidationKind::Missing);
}

#[test]
fn test_rows_from_json_objects() {
    let row = RawRow::from_json(&json!({
        "machineType": "e2-micro",
        "guestCpus": 2,
        "memoryMb": 1024,
        "priceUnits": "0",
        "priceNanos": 8376000,
        "region": "us-east1",
        "isSharedCpu": true
    }))
    .unwrap();
    let offer = Normalizer::new()
        .normalize_compute(CloudProvider::Gcp, &row)
        .unwrap();
    assert_eq!(offer.hourly_usd, 0.008376);
    assert_eq!(offer.details["isSharedCpu"], json!("true"));
}

#[test]
fn test_partition_reports_every_rejected_index() {
    let rows = vec![
        azure_blob("Hot", Some("0.018")),
        azure_blob("Lukewarm", Some("0.02")),
        azure_blob("Cold", Some("0.0036")),
        azure_blob("Cool", Some("-1")),
        azure_blob("Archive", None),
    ];
    let report = Normalizer::new().partition_storage_rows(CloudProvider::Azure, &rows);

    assert_eq!(report.accepted(), 3);
    assert_eq!(report.rejected_indices(), vec![1, 3]);
    assert_eq!(report.rejections[0].error.field, "accessTier");
    assert_eq!(report.rejections[1].error.field, "capacityRetailPrice");
}

#[test]
fn test_all_or_nothing_batch_stops_at_first_invalid_row() {
    let rows = vec![
        azure_blob("Hot", Some("0.018")),
        azure_blob("Cool", Some("0.01")),
        azure_blob("Lukewarm", Some("0.02")),
    ];
    let err = Normalizer::new()
        .normalize_storage_rows(CloudProvider::Azure, &rows)
        .unwrap_err();
    assert!(matches!(err, PricingError::Row { index: 2, .. }));
    assert_eq!(err.validation().map(|v| v.field.as_str()), Some("accessTier"));
}
