//! Filename conventions for stored documents.
//!
//! An upload named "Contrato Comercial" is written as
//! `contrato_comercial_482931.pdf`, where the trailing segment is the last six
//! digits of the Unix time. Scanning reverses this: the numeric suffix is
//! dropped and the remaining words are capitalized back to
//! "Contrato Comercial".

/// Extension of files picked up by a scan. Matched case-sensitively.
pub const PDF_EXTENSION: &str = ".pdf";

/// Separator between words and before the uniqueness suffix.
pub const SEPARATOR: char = '_';

/// Number of trailing Unix-time digits used as the uniqueness suffix.
pub const SUFFIX_DIGITS: u32 = 6;

/// Characters that never make it into a stored file name.
const RESERVED: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

pub fn is_pdf(file_name: &str) -> bool {
    file_name.ends_with(PDF_EXTENSION)
}

/// Derive the label shown for a stored file.
///
/// ```
/// use trade_manual::documents::naming::display_name;
///
/// assert_eq!(display_name("contrato_comercial_482931.pdf"), "Contrato Comercial");
/// assert_eq!(display_name("nota.pdf"), "Nota");
/// assert_eq!(display_name("123.pdf"), "123.pdf");
/// ```
pub fn display_name(file_name: &str) -> String {
    let stem = file_name.strip_suffix(PDF_EXTENSION).unwrap_or(file_name);

    let mut parts: Vec<&str> = stem.split(SEPARATOR).collect();
    if parts.last().is_some_and(|last| is_numeric(last)) {
        parts.pop();
    }

    let display = parts
        .iter()
        .map(|word| capitalize(word))
        .collect::<Vec<_>>()
        .join(" ");

    if display.trim().is_empty() {
        file_name.to_string()
    } else {
        display
    }
}

/// Turn a user-supplied document name into a file name base.
///
/// Returns `None` if nothing usable is left.
pub fn safe_base_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }

    let base: String = trimmed
        .chars()
        .map(|c| {
            if c.is_whitespace() || c.is_control() || RESERVED.contains(&c) {
                SEPARATOR
            } else {
                c
            }
        })
        .collect::<String>()
        .to_lowercase();

    Some(base)
}

/// Zero-padded uniqueness suffix for a Unix time in seconds.
pub fn unique_suffix(unix_secs: u64) -> String {
    let modulus = 10u64.pow(SUFFIX_DIGITS);
    format!(
        "{:0width$}",
        unix_secs % modulus,
        width = SUFFIX_DIGITS as usize
    )
}

/// Full stored file name for an upload.
pub fn upload_file_name(base: &str, unix_secs: u64) -> String {
    format!(
        "{base}{SEPARATOR}{}{PDF_EXTENSION}",
        unique_suffix(unix_secs)
    )
}

fn is_numeric(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
