// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::common::i18n;
use crate::middleware::i18n::Locale;

/// Regra de cliente que falhou. Só a primeira falha é reportada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("phone must be exactly 10 digits")]
    Phone,

    #[error("email is malformed")]
    Email,

    #[error("technician is required")]
    Technician,
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::Phone => "invalid_phone",
            ValidationError::Email => "invalid_email",
            ValidationError::Technician => "technician_required",
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Phone => "phone",
            ValidationError::Email => "email",
            ValidationError::Technician => "technician",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    // Campos obrigatórios do formulário (derive do `validator`)
    #[error("form validation failed")]
    FormValidation(#[from] validator::ValidationErrors),

    #[error("customer {0} not found")]
    NotFound(i64),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(rule) => rule.code(),
            AppError::FormValidation(_) => "required_fields",
            AppError::NotFound(_) => "customer_not_found",
            AppError::Persistence(_) => "persistence_failure",
            AppError::Internal(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::FormValidation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Persistence(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte para a resposta HTTP no idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let details = match self {
            AppError::Validation(rule) => {
                let mut details = HashMap::new();
                details.insert(rule.field().to_string(), vec![rule.code().to_string()]);
                Some(details)
            }
            AppError::FormValidation(errors) => {
                let details = errors
                    .field_errors()
                    .into_iter()
                    .map(|(field, field_errors)| {
                        let codes = field_errors
                            .iter()
                            .map(|e| {
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            })
                            .collect();
                        (field.to_string(), codes)
                    })
                    .collect();
                Some(details)
            }
            _ => None,
        };

        ApiError {
            status,
            code: self.code(),
            message: i18n::message(&locale.0, self.code()).to_string(),
            details,
        }
    }
}

/// Erro pronto para sair pela API.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<HashMap<String, Vec<String>>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({
                "error": self.code,
                "message": self.message,
                "details": details,
            }),
            None => json!({
                "error": self.code,
                "message": self.message,
            }),
        };

        (self.status, Json(body)).into_response()
    }
}
