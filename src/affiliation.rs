//! Affiliation and author-line heuristics.

use once_cell::sync::Lazy;
use regex::Regex;

static PART_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[;,]|\band\b").expect("valid regex"));

static TITLE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i).*?\bat\b|.*?@").expect("valid regex"));

static JOB_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(director|manager|chair|engineer|professor|lecturer|phd|postdoc|student|researcher)\b",
    )
    .expect("valid regex")
});

/// Reduce a free-text affiliation to something a geocoder can resolve.
///
/// `"Professor at Harvard University"` becomes `"Harvard University"` and
/// `"PhD student, Stanford University"` becomes `"Stanford University"`.
/// Falls back to the trimmed input when no part survives.
pub fn clean_affiliation(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    for part in PART_SEPARATOR.split(trimmed) {
        let part = part.trim();
        let cleaned = TITLE_PREFIX.replace_all(part, "");
        let cleaned = cleaned.trim();
        if JOB_TITLE.is_match(cleaned) {
            continue;
        }
        if cleaned.chars().count() > 3 {
            return cleaned.to_string();
        }
    }

    trimmed.to_string()
}

/// Split a scraped author line ("A Smith, B Jones and C Wu") into names.
///
/// Ellipsis markers and one-letter fragments are dropped.
pub fn split_authors(raw: &str) -> Vec<String> {
    raw.split(" and ")
        .flat_map(|chunk| chunk.split(','))
        .map(|name| name.trim().trim_end_matches('…').trim())
        .filter(|name| name.chars().count() > 1 && *name != "..." && !name.starts_with('…'))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_position_prefix() {
        assert_eq!(
            clean_affiliation("Professor at Harvard University"),
            "Harvard University"
        );
        // Too short to trust once stripped, so the raw string is kept.
        assert_eq!(clean_affiliation("Professor at MIT"), "Professor at MIT");
        assert_eq!(
            clean_affiliation("Research Scientist at Google DeepMind"),
            "Google DeepMind"
        );
    }

    #[test]
    fn test_skips_title_only_parts() {
        assert_eq!(
            clean_affiliation("PhD Student, Stanford University"),
            "Stanford University"
        );
        assert_eq!(
            clean_affiliation("Assistant Professor; ETH Zurich"),
            "ETH Zurich"
        );
    }

    #[test]
    fn test_email_style_prefix() {
        assert_eq!(clean_affiliation("jdoe@Tsinghua University"), "Tsinghua University");
    }

    #[test]
    fn test_plain_institution_unchanged() {
        assert_eq!(clean_affiliation("University of Oxford"), "University of Oxford");
    }

    #[test]
    fn test_falls_back_to_input() {
        assert_eq!(clean_affiliation("  UCL "), "UCL");
        assert_eq!(clean_affiliation("Lecturer"), "Lecturer");
    }

    #[test]
    fn test_empty() {
        assert_eq!(clean_affiliation(""), "");
        assert_eq!(clean_affiliation("   "), "");
    }

    #[test]
    fn test_split_authors() {
        assert_eq!(
            split_authors("J Smith, M Garcia and W Zhang"),
            vec!["J Smith", "M Garcia", "W Zhang"]
        );
        assert_eq!(split_authors("A Mueller, B Lee, …"), vec!["A Mueller", "B Lee"]);
        assert!(split_authors("").is_empty());
        assert!(split_authors("X").is_empty());
    }
}
