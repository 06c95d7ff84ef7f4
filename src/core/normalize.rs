use regex::Regex;
use std::sync::LazyLock;

static NON_ASCII: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^[:ascii:]]+").expect("static regex"));

static NON_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("static regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Folder column: may contain `/`, never starts with one.
    Path,
    /// Secret name column: a single segment of `[A-Za-z0-9_]`.
    Name,
}

/// Turn raw column text into a store-safe path fragment. An empty result
/// means the input had nothing usable.
pub fn normalize_segment(raw: &str, kind: SegmentKind) -> String {
    let cleaned = raw.trim_matches(' ').replace(' ', "_").replace('\\', "/");

    match kind {
        SegmentKind::Path => NON_ASCII
            .replace_all(&cleaned, "")
            .trim_start_matches('/')
            .to_string(),
        SegmentKind::Name => NON_NAME_CHARS.replace_all(&cleaned, "").into_owned(),
    }
}
