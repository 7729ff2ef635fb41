// src/common/validation.rs
//
// Validadores customizados usados com `#[validate(custom(...))]`.

use rust_decimal::Decimal;
use validator::ValidationError;

/// Remove espaços, hífens, pontos e parênteses. Mantém o `+` inicial.
pub fn normalize_phone(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect()
}

/// `+` opcional seguido de 10 a 15 dígitos.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let normalized = normalize_phone(phone);
    let digits = normalized.strip_prefix('+').unwrap_or(&normalized);

    let ok = (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());
    if ok {
        Ok(())
    } else {
        Err(coded("invalid_phone"))
    }
}

/// Preço estritamente positivo com no máximo 2 casas decimais.
pub fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_positive() && !price.is_zero() && price.normalize().scale() <= 2 {
        Ok(())
    } else {
        Err(coded("invalid_price"))
    }
}

pub fn validate_otp_format(otp: &str) -> Result<(), ValidationError> {
    if !otp.is_empty() && otp.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(coded("invalid_otp_format"))
    }
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(coded("required"))
    } else {
        Ok(())
    }
}

// A mensagem carrega o código; a tradução acontece no to_api_error
fn coded(code: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(code.into());
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn accepts_common_phone_formats() {
        assert!(validate_phone("+55 11 98765-4321").is_ok());
        assert!(validate_phone("(011) 98765.4321").is_ok());
        assert!(validate_phone("+919876543210").is_ok());
    }

    #[test]
    fn rejects_invalid_phones() {
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("+55 11 9876x-4321").is_err());
        assert!(validate_phone("1234567890123456").is_err());
        assert!(validate_phone("").is_err());
        assert_eq!(validate_phone("abc").unwrap_err().code, "invalid_phone");
    }

    #[test]
    fn normalizes_phone() {
        assert_eq!(normalize_phone(" +55 (11) 98765-4321 "), "+5511987654321");
    }

    #[test]
    fn price_must_be_positive_with_two_decimals() {
        assert!(validate_price(&Decimal::from_str("450000.00").unwrap()).is_ok());
        assert!(validate_price(&Decimal::from_str("99.5").unwrap()).is_ok());
        assert!(validate_price(&Decimal::ZERO).is_err());
        assert!(validate_price(&Decimal::from_str("-10").unwrap()).is_err());
        assert!(validate_price(&Decimal::from_str("10.001").unwrap()).is_err());
        // Zeros à direita não contam como casas decimais
        assert!(validate_price(&Decimal::from_str("10.5000").unwrap()).is_ok());
    }

    #[test]
    fn otp_must_be_digits() {
        assert!(validate_otp_format("042817").is_ok());
        assert!(validate_otp_format("04a817").is_err());
        assert!(validate_otp_format("").is_err());
    }
}
