//! Naming rules for uploaded files and upload chunks.
//!
//! Every client-supplied name that ends up in a filesystem path passes
//! through this module first, so a request can never escape the upload
//! or chunk directories.

use crate::error::CoreError;

/// Maximum length of a chunked-upload identifier.
pub const MAX_UPLOAD_ID_LEN: usize = 128;

/// Maximum length of a stored file name.
pub const MAX_FILE_NAME_LEN: usize = 255;

/// Prefix of a chunk file inside an upload's chunk directory.
pub const CHUNK_FILE_PREFIX: &str = "chunk_";

/// Validate a chunked-upload identifier: 1-128 chars of `[A-Za-z0-9_-]`.
pub fn validate_upload_id(upload_id: &str) -> Result<(), CoreError> {
    if upload_id.is_empty() || upload_id.len() > MAX_UPLOAD_ID_LEN {
        return Err(CoreError::Validation(format!(
            "uploadId must be between 1 and {MAX_UPLOAD_ID_LEN} characters"
        )));
    }
    if !upload_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(CoreError::Validation(
            "uploadId may only contain letters, digits, '-' and '_'".to_string(),
        ));
    }
    Ok(())
}

/// Parse a chunk index sent as a form field.
pub fn parse_chunk_index(raw: &str) -> Result<u32, CoreError> {
    raw.trim().parse::<u32>().map_err(|_| {
        CoreError::Validation(format!("index must be a non-negative integer, got '{raw}'"))
    })
}

/// File name of the chunk with the given index.
pub fn chunk_file_name(index: u32) -> String {
    format!("{CHUNK_FILE_PREFIX}{index}")
}

/// Reduce a client file name to a safe final path component.
///
/// Both `/` and `\` count as separators. Names that reduce to nothing,
/// `.` or `..` are rejected.
pub fn sanitize_file_name(raw: &str) -> Result<String, CoreError> {
    let base = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim()
        .trim_matches('\0');

    if base.is_empty() || base == "." || base == ".." {
        return Err(CoreError::Validation(format!("Invalid file name '{raw}'")));
    }
    if base.chars().any(char::is_control) {
        return Err(CoreError::Validation(
            "File name must not contain control characters".to_string(),
        ));
    }
    if base.len() > MAX_FILE_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "File name exceeds maximum length of {MAX_FILE_NAME_LEN} bytes"
        )));
    }
    Ok(base.to_string())
}

/// Collision-free stored name: the sanitized name prefixed with a unique token.
pub fn unique_file_name(token: &uuid::Uuid, file_name: &str) -> String {
    format!("{}_{file_name}", token.simple())
}
