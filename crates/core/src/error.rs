use serde::Serialize;
use thiserror::Error;

/// One field-level validation failure.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Unified API error type.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Internal(_) => 500,
        }
    }
}

/// JSON error envelope: `{ "error": { "code": "…", "message": "…", "details": {} } }`
#[derive(Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
}

impl From<&ApiError> for ErrorEnvelope {
    fn from(e: &ApiError) -> Self {
        let details = match e {
            ApiError::Validation(fields) => {
                let map: serde_json::Map<String, serde_json::Value> = fields
                    .iter()
                    .map(|f| {
                        (
                            f.field.clone(),
                            serde_json::Value::String(f.message.clone()),
                        )
                    })
                    .collect();
                serde_json::Value::Object(map)
            }
            _ => serde_json::Value::Object(serde_json::Map::new()),
        };
        Self {
            error: ErrorBody {
                code: e.code().to_string(),
                message: e.to_string(),
                details,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_envelope_carries_field_details() {
        let err = ApiError::Validation(vec![
            FieldError::new("title", "must not be empty"),
            FieldError::new("year", "must be positive"),
        ]);
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.code(), "validation_error");

        let envelope = ErrorEnvelope::from(&err);
        let details = envelope.error.details.as_object().unwrap();
        assert_eq!(details["title"], "must not be empty");
        assert_eq!(details["year"], "must be positive");
    }

    #[test]
    fn not_found_maps_to_404_with_empty_details() {
        let err = ApiError::NotFound("movie not found".into());
        assert_eq!(err.status_code(), 404);
        let envelope = ErrorEnvelope::from(&err);
        assert!(envelope.error.details.as_object().unwrap().is_empty());
        assert_eq!(envelope.error.code, "not_found");
    }
}
