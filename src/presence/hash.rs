use sha2::{Digest, Sha256};

/// Replace a raw party identifier with a stable uppercase SHA-256 hex digest.
///
/// Clients in the same party hash the same raw id, so their party ids still
/// match without the raw id leaving the machine.
pub fn anonymize(id: &str) -> String {
    if id.is_empty() {
        return String::new();
    }

    hex::encode_upper(Sha256::digest(id.as_bytes()))
}

/// [`anonymize`] over the decimal representation of a numeric id
pub fn anonymize_id(id: u64) -> String {
    anonymize(&id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_maps_to_empty_output() {
        assert_eq!(anonymize(""), "");
    }

    #[test]
    fn digest_is_uppercase_hex_of_fixed_length() {
        let hash = anonymize("123");
        assert_eq!(hash.len(), 64);
        assert!(hash
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
        assert_eq!(
            hash,
            "A665A45920422F9D417E4867EFDC4FB8A04A1F3FFF1FA07E998E86F7F7A27AE3"
        );
    }

    #[test]
    fn digest_is_deterministic_and_distinct() {
        assert_eq!(anonymize("4242"), anonymize("4242"));
        assert_ne!(anonymize("10"), anonymize("30"));
    }

    #[test]
    fn numeric_ids_hash_their_decimal_form() {
        assert_eq!(anonymize_id(123), anonymize("123"));
        assert_eq!(anonymize_id(0), anonymize("0"));
    }
}
