//! Portuguese tax identifier (NIF) checksum validation.

/// Validate a NIF with the mod-11 check digit rule.
///
/// Non-digit characters are stripped first, so `"123 456 789"` and
/// `"123-456-789"` validate like `"123456789"`. After stripping, the value
/// must be exactly 9 digits; the first 8 are weighted 9 down to 2, the check
/// digit is `11 - (sum % 11)` mapped to 0 when it reaches 10 or 11, and must
/// equal the 9th digit.
#[must_use]
pub fn validate_nif(nif: &str) -> bool {
    let digits: Vec<u32> = nif.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != 9 {
        return false;
    }

    let sum: u32 = digits[..8]
        .iter()
        .zip((2..=9u32).rev())
        .map(|(digit, weight)| digit * weight)
        .sum();

    let mut check_digit = 11 - (sum % 11);
    if check_digit >= 10 {
        check_digit = 0;
    }

    check_digit == digits[8]
}
