//! Registration orchestration.
//!
//! Order matters here: the category resolves before any counter state is
//! touched, so a rejected category never burns a serial. Once a serial is
//! allocated, any later failure leaves a permanent gap in that tier's run,
//! which is accepted; the serial is never reused and no identifier is
//! considered issued.
use chrono::Utc;
use registry::{FALLBACK_REGION_CODE, Tables, identifier::format_identifier};
use tracing::{info, warn};

use crate::{
    allocator::SerialAllocator,
    error::AppError,
    members::{MemberRecord, MemberStore},
    routes::RegistrationPayload,
};

pub async fn register_member(
    tables: &Tables,
    allocator: &SerialAllocator,
    members: &dyn MemberStore,
    payload: RegistrationPayload,
) -> Result<MemberRecord, AppError> {
    let tier = tables
        .category_tier(&payload.category)
        .ok_or_else(|| AppError::UnknownCategory(payload.category.clone()))?;

    if tables.region_code(&payload.region).is_none() {
        warn!(
            region = %payload.region,
            "Region not in table, filing under {FALLBACK_REGION_CODE}"
        );
    }

    let serial = allocator.allocate(tier).await?;
    let membership_id = format_identifier(tables, &payload.category, &payload.region, serial)?;

    let record = MemberRecord {
        membership_id,
        full_name: payload.full_name,
        email: payload.email,
        category: payload.category,
        region: payload.region,
        serial,
        registered_at: Utc::now(),
    };

    if !members.insert(&record).await? {
        // Serials are unique per tier, so a colliding identifier means the
        // counter hash was modified out of band.
        return Err(AppError::InternalError(
            format!("Identifier already issued: {}", record.membership_id).into(),
        ));
    }

    info!(membership_id = %record.membership_id, "Registered member");

    Ok(record)
}
