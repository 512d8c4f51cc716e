//! Filename allocation for stored uploads.

use chrono::Utc;
use mediadrop_core::constants::NAME_RANDOM_MAX;
use rand::Rng;

/// Longest original-name suffix kept in an allocated name. Leaves room for the
/// timestamp and random prefix within the usual 255-byte filename limit.
const MAX_ORIGINAL_NAME_BYTES: usize = 200;
const MAX_EXTENSION_BYTES: usize = 16;
const FALLBACK_NAME: &str = "file";

/// Produces on-disk filenames for uploaded files.
///
/// Implementations must return a single path segment. The storage layer
/// rejects anything else before touching the filesystem.
pub trait NameAllocator: Send + Sync {
    fn allocate(&self, original_name: &str) -> String;
}

/// `{millis}-{random}-{original}` allocation.
///
/// Two uploads collide only when both the millisecond and the random draw
/// coincide; the storage layer still creates files exclusively and asks for a
/// new name on the rare collision.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampRandomAllocator;

impl NameAllocator for TimestampRandomAllocator {
    fn allocate(&self, original_name: &str) -> String {
        let millis = Utc::now().timestamp_millis();
        let random = rand::rng().random_range(0..=NAME_RANDOM_MAX);
        format!(
            "{}-{}-{}",
            millis,
            random,
            sanitize_original_name(original_name)
        )
    }
}

/// Reduce a client-supplied filename to a single, safe path segment.
///
/// Every directory component is stripped (both `/` and `\` count as
/// separators) and control characters are dropped. Names that end up empty,
/// `.` or `..` become `file`. Everything else is kept verbatim, except that
/// overlong names are shortened while keeping their extension.
pub fn sanitize_original_name(original_name: &str) -> String {
    let last_segment = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);

    let cleaned: String = last_segment.chars().filter(|c| !c.is_control()).collect();

    if cleaned.trim().is_empty() || cleaned == "." || cleaned == ".." {
        return FALLBACK_NAME.to_string();
    }

    truncate_preserving_extension(cleaned)
}

fn truncate_preserving_extension(name: String) -> String {
    if name.len() <= MAX_ORIGINAL_NAME_BYTES {
        return name;
    }

    let (stem, extension) = match name.rfind('.') {
        Some(idx) if idx > 0 && name.len() - idx <= MAX_EXTENSION_BYTES => name.split_at(idx),
        _ => (name.as_str(), ""),
    };

    let mut end = (MAX_ORIGINAL_NAME_BYTES - extension.len()).min(stem.len());
    while !stem.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}{}", &stem[..end], extension)
}
