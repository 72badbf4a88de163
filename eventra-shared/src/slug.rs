/// URL slug derivation
///
/// Lowercases, maps runs of non-alphanumeric characters to single hyphens,
/// and trims leading/trailing hyphens. Uniqueness is handled by the caller
/// with a numeric suffix (`acme-corp`, `acme-corp-1`, ...).

/// Derives a base slug from a display name
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true; // suppresses a leading hyphen

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

/// Appends the collision counter to a base slug
///
/// The first candidate is the base itself; subsequent candidates append
/// `-1`, `-2`, and so on.
pub fn with_suffix(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{}-{}", base, attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Acme Corp"), "acme-corp");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("A  --  B"), "a-b");
        assert_eq!(slugify("Rock & Roll!"), "rock-roll");
    }

    #[test]
    fn test_slugify_trims_edges() {
        assert_eq!(slugify("  padded  "), "padded");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_slugify_drops_non_ascii() {
        assert_eq!(slugify("Café 42"), "caf-42");
    }

    #[test]
    fn test_with_suffix() {
        assert_eq!(with_suffix("acme-corp", 0), "acme-corp");
        assert_eq!(with_suffix("acme-corp", 1), "acme-corp-1");
        assert_eq!(with_suffix("acme-corp", 2), "acme-corp-2");
    }
}
