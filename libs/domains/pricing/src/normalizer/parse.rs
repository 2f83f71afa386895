//! Field-level parsing shared by the provider dialects.
//!
//! Every helper reports failures against the provider-native key it was
//! given, so a rejected row always names the cell that broke it.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ValidationError;
use crate::models::{GpuSpec, OsFamily};
use crate::raw::RawRow;

static MEMORY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([0-9][0-9,]*(?:\.[0-9]+)?)\s*(gib|gb|mib|mb|tib|tb)?$")
        .expect("memory pattern is valid")
});

static WINDOWS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)windows").expect("windows pattern is valid"));

static LINUX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)linux|rhel|red hat|suse|sles|ubuntu|amazon|debian|centos|rocky|alma")
        .expect("linux pattern is valid")
});

pub fn required<'a>(row: &'a RawRow, field: &str) -> Result<&'a str, ValidationError> {
    row.get(field).ok_or_else(|| ValidationError::missing(field))
}

/// Parse a finite decimal. Rust's float parser is correctly rounded, so the
/// result is the f64 nearest to the source text.
pub fn decimal(field: &str, text: &str) -> Result<f64, ValidationError> {
    let trimmed = text.trim();
    // `inf` and `NaN` are valid Rust float syntax but never a price
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
    {
        return Err(ValidationError::not_a_number(field, text));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ValidationError::not_a_number(field, text))
}

pub fn price(field: &str, text: &str) -> Result<f64, ValidationError> {
    let value = decimal(field, text)?;
    if value < 0.0 {
        return Err(ValidationError::out_of_range(field, text, ">= 0"));
    }
    // "-0" parses as negative zero, which sorts below 0.0 under total_cmp
    Ok(value + 0.0)
}

pub fn required_price(row: &RawRow, field: &str) -> Result<f64, ValidationError> {
    price(field, required(row, field)?)
}

pub fn optional_price(row: &RawRow, field: &str) -> Result<Option<f64>, ValidationError> {
    row.get(field).map(|text| price(field, text)).transpose()
}

pub fn count(field: &str, text: &str) -> Result<u32, ValidationError> {
    text.trim()
        .parse::<u32>()
        .map_err(|_| ValidationError::not_a_number(field, text))
}

pub fn required_positive_count(row: &RawRow, field: &str) -> Result<u32, ValidationError> {
    let text = required(row, field)?;
    let value = count(field, text)?;
    if value == 0 {
        return Err(ValidationError::out_of_range(field, text, ">= 1"));
    }
    Ok(value)
}

pub fn optional_count(row: &RawRow, field: &str) -> Result<Option<u32>, ValidationError> {
    row.get(field).map(|text| count(field, text)).transpose()
}

pub fn positive(field: &str, text: &str, value: f64) -> Result<f64, ValidationError> {
    if value <= 0.0 {
        return Err(ValidationError::out_of_range(field, text, "> 0"));
    }
    Ok(value)
}

/// Memory size in GiB. Accepts a bare number (already GiB) or a number with
/// a binary or decimal unit suffix; GB and TB are read as their binary
/// counterparts, as the providers use them.
pub fn memory_gib(field: &str, text: &str) -> Result<f64, ValidationError> {
    let captures = MEMORY_RE
        .captures(text.trim())
        .ok_or_else(|| ValidationError::not_a_number(field, text))?;
    let number = captures[1].replace(',', "");
    let value = decimal(field, &number)?;
    let gib = match captures
        .get(2)
        .map(|m| m.as_str().to_ascii_lowercase())
        .as_deref()
    {
        None | Some("gib") | Some("gb") => value,
        Some("mib") | Some("mb") => value / 1024.0,
        Some(_) => value * 1024.0,
    };
    positive(field, text, gib)
}

pub fn required_memory_gib(row: &RawRow, field: &str) -> Result<f64, ValidationError> {
    memory_gib(field, required(row, field)?)
}

pub fn optional_memory_gib(row: &RawRow, field: &str) -> Result<Option<f64>, ValidationError> {
    row.get(field).map(|text| memory_gib(field, text)).transpose()
}

/// Map free-form operating system text onto a family, failing closed
pub fn os_family(field: &str, text: &str) -> Result<OsFamily, ValidationError> {
    if WINDOWS_RE.is_match(text) {
        Ok(OsFamily::Windows)
    } else if LINUX_RE.is_match(text) {
        Ok(OsFamily::Linux)
    } else if text.trim().eq_ignore_ascii_case("other") {
        Ok(OsFamily::Other)
    } else {
        Err(ValidationError::unrecognized(field, text))
    }
}

/// Canonical spelling written back by the dialects
pub fn os_label(os: OsFamily) -> &'static str {
    match os {
        OsFamily::Linux => "Linux",
        OsFamily::Windows => "Windows",
        OsFamily::Other => "Other",
    }
}

pub fn expect_literal(row: &RawRow, field: &str, expected: &str) -> Result<(), ValidationError> {
    match row.get(field) {
        Some(value) if !value.eq_ignore_ascii_case(expected) => {
            Err(ValidationError::unrecognized(field, value))
        }
        _ => Ok(()),
    }
}

/// Combine the GPU cells of a row. A zero or absent count must come with no
/// name and no memory.
pub fn gpu_spec(
    count_field: &str,
    count: Option<u32>,
    name: Option<&str>,
    memory_gib: Option<f64>,
) -> Result<Option<GpuSpec>, ValidationError> {
    match count {
        Some(count) if count > 0 => Ok(Some(GpuSpec {
            count,
            name: name.map(str::to_string),
            memory_gib,
        })),
        _ if name.is_some() || memory_gib.is_some() => Err(ValidationError::inconsistent(
            count_field,
            "GPU name or memory given without a GPU count",
        )),
        _ => Ok(None),
    }
}

/// Display form of a float that parses back to the same bits
pub fn number(value: f64) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationKind;

    #[test]
    fn test_decimal_is_exact_and_finite() {
        assert_eq!(decimal("p", "0.0416").unwrap(), 0.0416);
        assert!(decimal("p", "NaN").is_err());
        assert!(decimal("p", "inf").is_err());
        assert!(decimal("p", "12 USD").is_err());
    }

    #[test]
    fn test_price_rejects_negative() {
        let err = price("retailPrice", "-0.5").unwrap_err();
        assert!(matches!(err.kind, ValidationKind::OutOfRange { .. }));
        assert_eq!(price("retailPrice", "0").unwrap(), 0.0);
    }

    #[test]
    fn test_negative_zero_price_is_plain_zero() {
        for text in ["-0", "-0.0", "-0e5"] {
            let value = price("pricePerUnitUsd", text).unwrap();
            assert_eq!(value.to_bits(), 0.0_f64.to_bits(), "{text} should parse as +0.0");
        }
    }

    #[test]
    fn test_memory_units() {
        assert_eq!(memory_gib("memory", "8 GiB").unwrap(), 8.0);
        assert_eq!(memory_gib("memory", "0.5 GiB").unwrap(), 0.5);
        assert_eq!(memory_gib("memory", "512 MiB").unwrap(), 0.5);
        assert_eq!(memory_gib("memory", "1 TiB").unwrap(), 1024.0);
        assert_eq!(memory_gib("memory", "1,952 GiB").unwrap(), 1952.0);
        assert_eq!(memory_gib("memoryGB", "16").unwrap(), 16.0);
        assert!(memory_gib("memory", "0 GiB").is_err());
        assert!(memory_gib("memory", "lots").is_err());
    }

    #[test]
    fn test_os_family_fails_closed() {
        assert_eq!(os_family("os", "Windows Server").unwrap(), OsFamily::Windows);
        assert_eq!(os_family("os", "RHEL").unwrap(), OsFamily::Linux);
        assert_eq!(os_family("os", "Red Hat Enterprise Linux with HA").unwrap(), OsFamily::Linux);
        assert_eq!(os_family("os", "other").unwrap(), OsFamily::Other);
        assert!(os_family("os", "Plan 9").is_err());
    }

    #[test]
    fn test_gpu_spec_consistency() {
        assert_eq!(gpu_spec("gpus", None, None, None).unwrap(), None);
        assert_eq!(gpu_spec("gpus", Some(0), None, None).unwrap(), None);
        let err = gpu_spec("gpus", Some(0), Some("T4"), None).unwrap_err();
        assert_eq!(err.field, "gpus");
        assert!(gpu_spec("gpus", None, None, Some(16.0)).is_err());
        let gpu = gpu_spec("gpus", Some(2), Some("A100"), Some(40.0)).unwrap().unwrap();
        assert_eq!(gpu.count, 2);
    }

    #[test]
    fn test_number_round_trips() {
        for value in [0.1, 0.0416, 1e-7, 3.75, 123456.789] {
            assert_eq!(number(value).parse::<f64>().unwrap().to_bits(), value.to_bits());
        }
    }
}
