use std::collections::HashSet;

/// Name recorded when the client sends no usable filename.
pub const DEFAULT_ORIGINAL_NAME: &str = "upload";

const MAX_ORIGINAL_NAME_CHARS: usize = 255;

/// Reduce a client-supplied filename to a flat display name.
///
/// Directory components are dropped, control characters removed, and the
/// result is capped at 255 characters. Empty, `.` or `..` results become
/// [`DEFAULT_ORIGINAL_NAME`].
pub fn clean_original_name(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return DEFAULT_ORIGINAL_NAME.to_string();
    };
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_ORIGINAL_NAME_CHARS)
        .collect();
    let trimmed = cleaned.trim();

    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        DEFAULT_ORIGINAL_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Split `name` into stem and extension (with dot). Leading-dot names have
/// no extension.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}

/// Return `name`, or `stem (n).ext` with the smallest `n >= 1` not yet in
/// `used`, and record the choice.
pub fn unique_archive_name(used: &mut HashSet<String>, name: &str) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }
    let (stem, ext) = split_extension(name);
    let mut n = 1u32;
    loop {
        let candidate = format!("{stem} ({n}){ext}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Build a safe `Content-Disposition` header value.
pub fn content_disposition_value(disposition: &str, filename: &str) -> String {
    let ascii_safe: String = filename
        .chars()
        .filter(|c| c.is_ascii_graphic() && !matches!(c, '"' | ';' | '\\'))
        .collect();
    let ascii_name = if ascii_safe.is_empty() {
        "download".to_string()
    } else {
        ascii_safe
    };

    // RFC 5987 percent-encoding for filename*.
    let encoded: String = filename
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                String::from(b as char)
            }
            _ => format!("%{b:02X}"),
        })
        .collect();

    format!("{disposition}; filename=\"{ascii_name}\"; filename*=UTF-8''{encoded}")
}
