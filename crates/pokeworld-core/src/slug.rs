use unicode_normalization::UnicodeNormalization;

/// Derive a URL slug from a display name.
///
/// Accents are folded to ASCII, anything that is not a word character,
/// whitespace or hyphen is removed, and runs of whitespace/hyphens become a
/// single hyphen: `"Mr. Mime"` becomes `"mr-mime"`.
pub fn slugify(value: &str) -> String {
    let folded: String = value
        .nfkd()
        .filter(|c| c.is_ascii())
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_ascii_whitespace())
        .collect::<String>()
        .to_lowercase();

    let joined = folded
        .split(|c: char| c == '-' || c.is_ascii_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    joined.trim_matches(|c| c == '-' || c == '_').to_string()
}
