// src/services/validation.rs

use std::sync::LazyLock;

use regex::Regex;

use crate::{common::error::ValidationError, models::crm::CustomerFields};

// local@dominio.tld, sem espaço e sem '@' extra em nenhuma parte
static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});

const PHONE_DIGITS: usize = 10;

pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() == PHONE_DIGITS && phone.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_SHAPE.is_match(email)
}

/// Regras do cliente, na ordem: telefone, e-mail, técnico.
/// Retorna só a primeira que falhar.
pub fn validate(fields: &CustomerFields) -> Result<(), ValidationError> {
    if !is_valid_phone(&fields.phone) {
        return Err(ValidationError::Phone);
    }
    if !is_valid_email(&fields.email) {
        return Err(ValidationError::Email);
    }
    if fields.technician.is_empty() {
        return Err(ValidationError::Technician);
    }

    Ok(())
}
