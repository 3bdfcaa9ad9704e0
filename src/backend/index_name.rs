//! Index-name sanitization.

/// Characters Elasticsearch rejects in index names (plus space).
const INVALID_CHARS: [char; 11] = [' ', '/', '\\', '*', '?', '"', '<', '>', '|', '#', ','];

/// Normalizes a proposed index name to one Elasticsearch accepts.
///
/// Lower-cases, replaces invalid characters with `_`, strips leading
/// `-`, `_` and `+`, and prefixes the reserved names `.` and `..`.
#[must_use]
pub fn sanitize_index_name(name: &str) -> String {
    let replaced = name.to_lowercase().replace(INVALID_CHARS, "_");
    let trimmed = replaced.trim_start_matches(['-', '_', '+']);

    if trimmed == "." || trimmed == ".." {
        format!("index_{trimmed}")
    } else {
        trimmed.to_string()
    }
}
