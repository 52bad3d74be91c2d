//! Membership identifier construction.
//!
//! The public-facing identifier is `GNC/{tier}/{region}/{serial}` with the
//! serial left-padded to at least four digits. Once issued against a
//! membership record it is never regenerated or reassigned, so this
//! module must stay deterministic: same inputs, same string, no hidden
//! state.
use crate::{FALLBACK_REGION_CODE, MembershipTier, RegistryError, Tables};

pub const ID_PREFIX: &str = "GNC";

/// Build the identifier for already-allocated inputs.
///
/// The category must be in the table (`UnknownCategory` otherwise). An
/// unknown region resolves to [`FALLBACK_REGION_CODE`], not an error.
/// Serials of 10000 and above widen the field; nothing is truncated.
pub fn format_identifier(
    tables: &Tables,
    category: &str,
    region: &str,
    serial: u64,
) -> Result<String, RegistryError> {
    let tier = tables
        .category_tier(category)
        .ok_or_else(|| RegistryError::UnknownCategory(category.to_string()))?;

    let region_code = tables.region_code(region).unwrap_or(FALLBACK_REGION_CODE);

    Ok(identifier_for(tier, region_code, serial))
}

pub fn identifier_for(tier: MembershipTier, region_code: &str, serial: u64) -> String {
    format!("{ID_PREFIX}/{}/{region_code}/{serial:04}", tier.code())
}
