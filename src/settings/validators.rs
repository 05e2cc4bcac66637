// src/settings/validators.rs

use crate::common::ValidationResult;

/// Normalizes a currency code to upper case, recording an error unless it is
/// three ASCII letters
pub fn normalize_currency_code(
    result: &mut ValidationResult,
    field: &str,
    value: Option<&str>,
) -> Option<String> {
    match value.map(str::trim) {
        None | Some("") => {
            result.add_error(field, "Currency code is required");
            None
        }
        Some(code) if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) => {
            Some(code.to_ascii_uppercase())
        }
        Some(_) => {
            result.add_error(field, "Currency code must be three letters");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_code_normalized() {
        let mut result = ValidationResult::new();
        assert_eq!(
            normalize_currency_code(&mut result, "currency", Some(" eur ")),
            Some("EUR".to_string())
        );
        assert!(result.is_valid);
    }

    #[test]
    fn test_currency_code_shape_checked() {
        let mut result = ValidationResult::new();
        assert_eq!(normalize_currency_code(&mut result, "from", Some("EU1")), None);
        assert_eq!(normalize_currency_code(&mut result, "to", None), None);
        assert_eq!(result.errors.len(), 2);
    }
}
