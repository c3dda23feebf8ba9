//! Cache-key derivation from raw product names.

/// Normalize a raw product name into its cache lookup key.
///
/// Trims surrounding whitespace and lower-cases with the locale-invariant
/// Unicode case fold, so "Domates" and " domates " meet at the same key on
/// every machine. Keys are deliberately not unique across languages: the
/// cache is keyed by what the user typed, not by what it means. Infallible;
/// the empty string is a valid degenerate key.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_lowercases() {
        assert_eq!(normalize("  Domates "), "domates");
    }

    #[test]
    fn agrees_with_pre_trimmed_input() {
        assert_eq!(normalize(" Biber\t"), normalize("Biber"));
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(normalize("DOMATES"), normalize("domates"));
        assert_eq!(normalize("Süt"), normalize("SÜT"));
    }

    #[test]
    fn empty_input_is_a_valid_key() {
        assert_eq!(normalize("   "), "");
    }
}
