//! API utility functions
//!
//! Pure, stateless helpers for HTTP request processing, kept apart from the
//! handlers so they can be unit tested.

use crate::api::error::ApiError;
use crate::media::{AudioFormat, ClipRange, format_seconds};

/// Parses and validates Content-Type header for application/json
///
/// Accepts:
/// - `application/json`
/// - `application/json; charset=utf-8`
///
/// Rejects:
/// - `application/jsonp`
/// - `application/json-patch+json`
/// - `text/json`
/// - Malformed media types
pub fn parse_content_type(content_type: &str) -> Result<mime::Mime, ApiError> {
    let media_type: mime::Mime = content_type.parse().map_err(|_| {
        ApiError::InvalidPayload(format!("invalid Content-Type: {}", content_type))
    })?;

    if media_type.type_() != mime::APPLICATION || media_type.subtype() != mime::JSON {
        return Err(ApiError::InvalidPayload(format!(
            "Content-Type must be application/json, got: {}/{}",
            media_type.type_(),
            media_type.subtype()
        )));
    }

    Ok(media_type)
}

/// Validates that body size does not exceed the maximum allowed size
pub fn validate_body_size(data: &[u8], max_size: usize) -> Result<(), ApiError> {
    if data.len() > max_size {
        return Err(ApiError::PayloadTooLarge(data.len()));
    }
    Ok(())
}

/// Download name offered to the client: `audio_{id}.{ext}` for the full
/// track, `chunk_{id}_{start}_{end}.{ext}` for a clip.
pub fn attachment_name(identifier: &str, range: Option<ClipRange>, format: AudioFormat) -> String {
    let id = sanitize_filename_part(identifier);
    match range {
        Some(range) => format!(
            "chunk_{}_{}_{}.{}",
            id,
            format_seconds(range.start),
            format_seconds(range.end),
            format.extension()
        ),
        None => format!("audio_{}.{}", id, format.extension()),
    }
}

/// `Content-Disposition` value for an attachment.
pub fn content_disposition(filename: &str) -> String {
    format!("attachment; filename=\"{filename}\"")
}

fn sanitize_filename_part(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "media".to_string()
    } else {
        cleaned
    }
}
