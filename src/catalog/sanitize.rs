use std::path::{Component, Path};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sanitize_filename::Options;
use uuid::Uuid;

const MAX_SEGMENT_LEN: usize = 200;
const SUBJECT_FALLBACK_PREFIX: &str = "subject";
const FILE_FALLBACK_PREFIX: &str = "file";

const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Converts a user-supplied string into a single safe path segment.
///
/// The result only contains ASCII letters, digits, `_`, `-` and single dots,
/// never starts or ends with `.` or `_`, and is never empty. Inputs that clean
/// down to nothing (for example names written entirely in a non-Latin script)
/// map to a stable `subject-<digest>` segment derived from the raw input.
pub fn sanitize(raw: &str) -> String {
    let cleaned = clean(raw);
    if cleaned.is_empty() {
        return fallback(SUBJECT_FALLBACK_PREFIX, raw, "");
    }
    cleaned
}

/// Like [`sanitize`], but keeps the extension of the submitted name intact so
/// the stored file stays recognisable by type.
pub fn sanitize_file_name(raw: &str) -> String {
    let extension = clean(&file_extension(raw));
    let cleaned = clean(raw);

    if !cleaned.is_empty() && (extension.is_empty() || file_extension(&cleaned) == extension) {
        return cleaned;
    }

    fallback(FILE_FALLBACK_PREFIX, raw, &extension)
}

/// Lowercase suffix after the last dot, without the dot. Empty when the name
/// has no extension.
pub fn file_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Percent-encodes a value for use as one URL path segment or query value.
pub fn encode_segment(input: &str) -> String {
    utf8_percent_encode(input, PATH_SEGMENT).to_string()
}

/// True when `name` is exactly one ordinary, visible path component.
pub fn is_plain_component(name: &str) -> bool {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\', '\0']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// True when a subject name is nothing but dots, which URL resolution folds away.
pub fn is_dot_only(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c == '.')
}

fn clean(raw: &str) -> String {
    let joined = raw
        .split(|c: char| c.is_whitespace() || c == '/' || c == '\\')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    let mut collapsed = String::with_capacity(joined.len());
    for c in joined.chars() {
        if collapsed.len() >= MAX_SEGMENT_LEN {
            break;
        }
        if !(c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.') {
            continue;
        }
        if c == '.' && collapsed.ends_with('.') {
            continue;
        }
        collapsed.push(c);
    }

    let trimmed = collapsed.trim_matches(|c| c == '.' || c == '_');
    // Reserved device names (CON, LPT1 and friends) clean down to nothing.
    sanitize_filename::sanitize_with_options(
        trimmed,
        Options {
            windows: true,
            truncate: true,
            replacement: "",
        },
    )
}

fn fallback(prefix: &str, raw: &str, extension: &str) -> String {
    let digest = Uuid::new_v5(&Uuid::NAMESPACE_OID, raw.as_bytes()).simple().to_string();
    let short = &digest[..12];
    if extension.is_empty() {
        format!("{prefix}-{short}")
    } else {
        format!("{prefix}-{short}.{extension}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_components_exclude_traversal_and_hidden_names() {
        assert!(is_plain_component("a b#c.pdf"));
        assert!(is_plain_component("notes.pdf"));
        assert!(!is_plain_component(""));
        assert!(!is_plain_component(".."));
        assert!(!is_plain_component(".upload-1234"));
        assert!(!is_plain_component("../secret.pdf"));
        assert!(!is_plain_component("dir/notes.pdf"));
        assert!(!is_plain_component("dir\\notes.pdf"));
    }

    #[test]
    fn dot_only_names_are_detected() {
        assert!(is_dot_only("."));
        assert!(is_dot_only(".."));
        assert!(!is_dot_only("v1.2"));
        assert!(!is_dot_only(""));
    }

    #[test]
    fn keeps_simple_names() {
        assert_eq!(sanitize("Math"), "Math");
        assert_eq!(sanitize_file_name("notes.pdf"), "notes.pdf");
    }

    #[test]
    fn joins_whitespace_with_underscores() {
        assert_eq!(sanitize("Linear   Algebra II"), "Linear_Algebra_II");
        assert_eq!(sanitize("  padded  "), "padded");
    }

    #[test]
    fn strips_traversal_sequences() {
        let cleaned = sanitize("../../etc");
        assert!(!cleaned.contains(".."));
        assert!(!cleaned.contains('/'));
        assert_eq!(cleaned, "etc");

        let cleaned = sanitize("..\\..\\windows\\system32");
        assert!(!cleaned.contains(".."));
        assert!(!cleaned.contains('\\'));
    }

    #[test]
    fn collapses_dot_runs() {
        assert_eq!(sanitize_file_name("report..final...pdf"), "report.final.pdf");
    }

    #[test]
    fn reserved_tokens_never_survive() {
        for raw in [".", "..", "...", "CON", "nul.pdf"] {
            let cleaned = sanitize(raw);
            assert!(!cleaned.is_empty());
            assert_ne!(cleaned, ".");
            assert_ne!(cleaned, "..");
            assert!(!cleaned.eq_ignore_ascii_case("con"));
        }
    }

    #[test]
    fn non_latin_names_get_a_stable_segment() {
        let first = sanitize("数学");
        let second = sanitize("数学");
        let other = sanitize("物理");
        assert!(first.starts_with("subject-"));
        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[test]
    fn file_fallback_keeps_extension() {
        let stored = sanitize_file_name("讲义.PDF");
        assert!(stored.starts_with("file-"));
        assert!(stored.ends_with(".pdf"));
    }

    #[test]
    fn sanitize_is_idempotent() {
        for raw in [
            "Math",
            "../../etc",
            "a b/c\\d",
            "数学",
            "..hidden..",
            "CON",
            "__init__",
            "x.y.z",
            "ünïcødé name",
        ] {
            let once = sanitize(raw);
            assert_eq!(sanitize(&once), once, "input {raw:?}");
            let once = sanitize_file_name(raw);
            assert_eq!(sanitize_file_name(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn extension_is_lowercase_without_dot() {
        assert_eq!(file_extension("Slides.PPTX"), "pptx");
        assert_eq!(file_extension("README"), "");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
    }
}
