//! Payload codec
//!
//! `subject|user_id|object_id|expires_at`, integers in decimal. The subject
//! may not contain the delimiter, so splitting on it is unambiguous.

use crate::domain::payload::NoncePayload;
use crate::error::{DecodeError, NonceError, NonceResult};

/// Field delimiter
pub const DELIMITER: char = '|';

const FIELD_COUNT: usize = 4;

/// Serialize the four payload fields
///
/// # Errors
///
/// Returns [`NonceError::InvalidSubject`] if `subject` contains [`DELIMITER`].
pub fn encode(subject: &str, user_id: i64, object_id: i64, expires_at: i64) -> NonceResult<String> {
    if subject.contains(DELIMITER) {
        return Err(NonceError::InvalidSubject(DELIMITER));
    }
    Ok(format!(
        "{subject}{DELIMITER}{user_id}{DELIMITER}{object_id}{DELIMITER}{expires_at}"
    ))
}

/// Serialize a [`NoncePayload`]
pub fn encode_payload(payload: &NoncePayload) -> NonceResult<String> {
    encode(
        &payload.subject,
        payload.user_id,
        payload.object_id,
        payload.expires_at,
    )
}

/// Parse a serialized payload
pub fn decode(serialized: &str) -> Result<NoncePayload, DecodeError> {
    let fields: Vec<&str> = serialized.split(DELIMITER).collect();
    if fields.len() != FIELD_COUNT {
        return Err(DecodeError::FieldCount {
            expected: FIELD_COUNT,
            got: fields.len(),
        });
    }

    Ok(NoncePayload {
        subject: fields[0].to_string(),
        user_id: parse_int(fields[1], "user_id")?,
        object_id: parse_int(fields[2], "object_id")?,
        expires_at: parse_int(fields[3], "expires_at")?,
    })
}

/// Strict decimal: optional leading '-', digits only
fn parse_int(field: &str, name: &'static str) -> Result<i64, DecodeError> {
    let digits = field.strip_prefix('-').unwrap_or(field);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::InvalidInteger(name));
    }
    field
        .parse::<i64>()
        .map_err(|_| DecodeError::InvalidInteger(name))
}
