use chrono::{DateTime, Utc};
use uuid::{Builder, Uuid};

/// Fixed producer namespace value mixed into every run id.
pub const RUN_ID_NAMESPACE: &[u8] = b"frame";

/// Reproducible run id for a creation instant.
///
/// UUIDv7 layout: the 48-bit unix millisecond timestamp of `instant`, and the
/// remaining bits from a v5 digest of `data`. Same inputs, same id.
pub fn run_id_for(instant: DateTime<Utc>, data: &[u8]) -> Uuid {
    let millis = u64::try_from(instant.timestamp_millis()).unwrap_or(0);
    let digest = Uuid::new_v5(&Uuid::NAMESPACE_URL, data);

    let mut tail = [0u8; 10];
    tail.copy_from_slice(&digest.as_bytes()[6..16]);

    Builder::from_unix_timestamp_millis(millis, &tail).into_uuid()
}
