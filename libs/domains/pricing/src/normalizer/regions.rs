//! Provider region codes to continental buckets.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::RegionBucket::{self, *};

const AWS_REGIONS: &[(&str, RegionBucket)] = &[
    ("us-east-1", NorthAmerica),
    ("us-east-2", NorthAmerica),
    ("us-west-1", NorthAmerica),
    ("us-west-2", NorthAmerica),
    ("ca-central-1", NorthAmerica),
    ("ca-west-1", NorthAmerica),
    ("mx-central-1", NorthAmerica),
    ("us-gov-west-1", NorthAmerica),
    ("us-gov-east-1", NorthAmerica),
    ("sa-east-1", SouthAmerica),
    ("eu-central-1", Europe),
    ("eu-central-2", Europe),
    ("eu-west-1", Europe),
    ("eu-west-2", Europe),
    ("eu-west-3", Europe),
    ("eu-south-1", Europe),
    ("eu-south-2", Europe),
    ("eu-north-1", Europe),
    ("ap-east-1", Asia),
    ("ap-east-2", Asia),
    ("ap-south-1", Asia),
    ("ap-south-2", Asia),
    ("ap-northeast-1", Asia),
    ("ap-northeast-2", Asia),
    ("ap-northeast-3", Asia),
    ("ap-southeast-1", Asia),
    ("ap-southeast-3", Asia),
    ("ap-southeast-5", Asia),
    ("ap-southeast-7", Asia),
    ("il-central-1", Asia),
    ("me-south-1", Asia),
    ("me-central-1", Asia),
    ("cn-north-1", Asia),
    ("cn-northwest-1", Asia),
    ("ap-southeast-2", Oceania),
    ("ap-southeast-4", Oceania),
    ("af-south-1", Africa),
];

const AZURE_REGIONS: &[(&str, RegionBucket)] = &[
    ("eastus", NorthAmerica),
    ("eastus2", NorthAmerica),
    ("centralus", NorthAmerica),
    ("northcentralus", NorthAmerica),
    ("southcentralus", NorthAmerica),
    ("westus", NorthAmerica),
    ("westus2", NorthAmerica),
    ("westus3", NorthAmerica),
    ("westcentralus", NorthAmerica),
    ("mexicocentral", NorthAmerica),
    ("attatlanta1", NorthAmerica),
    ("attdallas1", NorthAmerica),
    ("global", NorthAmerica),
    ("canadacentral", NorthAmerica),
    ("canadaeast", NorthAmerica),
    ("usgovvirginia", NorthAmerica),
    ("usgovarizona", NorthAmerica),
    ("usgovtexas", NorthAmerica),
    ("usdodcentral", NorthAmerica),
    ("usdodeast", NorthAmerica),
    ("brazilsouth", SouthAmerica),
    ("brazilsoutheast", SouthAmerica),
    ("chilecentral", SouthAmerica),
    ("westeurope", Europe),
    ("northeurope", Europe),
    ("uksouth", Europe),
    ("ukwest", Europe),
    ("francecentral", Europe),
    ("francesouth", Europe),
    ("swedencentral", Europe),
    ("swedensouth", Europe),
    ("austriaeast", Europe),
    ("germanywestcentral", Europe),
    ("germanynorth", Europe),
    ("switzerlandnorth", Europe),
    ("switzerlandwest", Europe),
    ("norwayeast", Europe),
    ("norwaywest", Europe),
    ("italynorth", Europe),
    ("spaincentral", Europe),
    ("polandcentral", Europe),
    ("eastasia", Asia),
    ("southeastasia", Asia),
    ("japaneast", Asia),
    ("japanwest", Asia),
    ("koreacentral", Asia),
    ("koreasouth", Asia),
    ("centralindia", Asia),
    ("southindia", Asia),
    ("westindia", Asia),
    ("jioindiacentral", Asia),
    ("jioindiawest", Asia),
    ("indonesiacentral", Asia),
    ("malaysiawest", Asia),
    ("malaysiasouth", Asia),
    ("uaecentral", Asia),
    ("uaenorth", Asia),
    ("qatarcentral", Asia),
    ("israelcentral", Asia),
    ("israelnorthwest", Asia),
    ("australiaeast", Oceania),
    ("australiasoutheast", Oceania),
    ("australiacentral", Oceania),
    ("australiacentral2", Oceania),
    ("newzealandnorth", Oceania),
    ("perth", Oceania),
    ("southafricanorth", Africa),
    ("southafricawest", Africa),
];

/// Multi-region and special GCP locations that the prefix rules miss
const GCP_LOCATIONS: &[(&str, RegionBucket)] = &[
    ("us", NorthAmerica),
    ("nam4", NorthAmerica),
    ("eu", Europe),
    ("europe", Europe),
    ("eur4", Europe),
    ("eur5", Europe),
    ("eur7", Europe),
    ("eur8", Europe),
    ("asia", Asia),
    ("asia1", Asia),
    ("global", MultiRegion),
];

const GCP_PREFIXES: &[(&str, RegionBucket)] = &[
    ("us-", NorthAmerica),
    ("northamerica-", NorthAmerica),
    ("southamerica-", SouthAmerica),
    ("europe-", Europe),
    ("asia-", Asia),
    ("me-", Asia),
    ("australia-", Oceania),
    ("africa-", Africa),
];

// us-west-2-lax-1, ap-southeast-2-per-1
static AWS_LOCAL_ZONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9-]+)-[a-z]{3,4}-\d+$").expect("local zone pattern is valid")
});

// us-east-1-wl1-bos1, eu-west-2-wl2-man1
static AWS_WAVELENGTH_ZONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9-]+)-wl\d+(?:-[a-z0-9]+)?$").expect("wavelength zone pattern is valid")
});

fn lookup(table: &[(&str, RegionBucket)], code: &str) -> Option<RegionBucket> {
    table
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, bucket)| *bucket)
}

/// Resolve an AWS region code. Local Zones and Wavelength Zones resolve
/// through their parent region.
pub fn aws_region(code: &str) -> Option<RegionBucket> {
    let code = code.trim().to_ascii_lowercase();
    if let Some(bucket) = lookup(AWS_REGIONS, &code) {
        return Some(bucket);
    }
    [&*AWS_WAVELENGTH_ZONE, &*AWS_LOCAL_ZONE]
        .into_iter()
        .find_map(|pattern| pattern.captures(&code))
        .and_then(|captures| lookup(AWS_REGIONS, &captures[1]))
}

pub fn azure_region(code: &str) -> Option<RegionBucket> {
    lookup(AZURE_REGIONS, &code.trim().to_ascii_lowercase())
}

pub fn gcp_region(code: &str) -> Option<RegionBucket> {
    let code = code.trim().to_ascii_lowercase();
    lookup(GCP_LOCATIONS, &code).or_else(|| {
        GCP_PREFIXES
            .iter()
            .find(|(prefix, _)| code.starts_with(prefix) && code.len() > prefix.len())
            .map(|(_, bucket)| *bucket)
    })
}
