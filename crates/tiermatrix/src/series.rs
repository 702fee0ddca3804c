//! Series labels from uploaded filenames

use std::path::Path;

use lazy_regex::{regex, Regex};

/// Generated-ID prefixes, in priority order; only the first match is removed
fn id_prefixes() -> [&'static Regex; 3] {
    [
        // 20240501_120000_ab12cd34_
        regex!(r"^\d{8}_\d{6}_[a-f0-9]{8}_"),
        // uuid4_
        regex!(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}_"),
        // short job id
        regex!(r"^[a-f0-9]{8}_"),
    ]
}

const NOISE_SUFFIXES: &[&str] = &["_data", "_price", "_export", "_backup", "_processed"];
const NOISE_PREFIXES: &[&str] = &["data_", "price_", "export_", "backup_", "processed_"];

/// Clean series label for a filename
///
/// Drops the directory and a spreadsheet extension, one generated-ID prefix,
/// one noise suffix and one noise prefix (case-insensitive), then trims and
/// replaces spaces with underscores. If nothing is left the trimmed stem is
/// returned.
///
/// ```
/// use tiermatrix::series_name;
///
/// assert_eq!(series_name("20240501_120000_ab12cd34_MySeries_data.xlsx"), "MySeries");
/// assert_eq!(series_name("Sliding Window.xlsx"), "Sliding_Window");
/// ```
pub fn series_name(filename: &str) -> String {
    let base = Path::new(filename.trim())
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = regex!(r"(?i)\.(xlsx|xlsm|xlsb|xls|ods|csv)$").replace(&base, "");

    let mut name: &str = &stem;

    if let Some(m) = id_prefixes().iter().find_map(|re| re.find(name)) {
        name = &name[m.end()..];
    }

    if let Some(rest) = NOISE_SUFFIXES
        .iter()
        .find_map(|suffix| strip_suffix_ignore_case(name, suffix))
    {
        name = rest;
    }

    if let Some(rest) = NOISE_PREFIXES
        .iter()
        .find_map(|prefix| strip_prefix_ignore_case(name, prefix))
    {
        name = rest;
    }

    let cleaned = name.trim().replace(' ', "_");
    if cleaned.is_empty() {
        stem.trim().replace(' ', "_")
    } else {
        cleaned
    }
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let split = s.len().checked_sub(suffix.len())?;
    if !s.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = s.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() < prefix.len() || !s.is_char_boundary(prefix.len()) {
        return None;
    }
    let (head, tail) = s.split_at(prefix.len());
    head.eq_ignore_ascii_case(prefix).then_some(tail)
}
