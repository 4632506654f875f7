//! Request extractors shared by several handlers.

use std::collections::HashMap;

use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};

use crate::error::AppError;

/// Plain text fields from a form body.
///
/// Accepts `application/x-www-form-urlencoded`, `multipart/form-data`
/// (file parts are skipped) and flat JSON objects. A request with no
/// body type yields no fields.
#[derive(Debug, Default)]
pub struct FormFields(pub HashMap<String, String>);

impl FormFields {
    /// Trimmed value of `key`, or `None` when missing or blank.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Whether `key` holds `true`, `1` or `yes` (any case).
    pub fn flag(&self, key: &str) -> bool {
        self.get(key)
            .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
    }
}

impl<S> FromRequest<S> for FormFields
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase())
            .unwrap_or_default();

        if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            let mut fields = HashMap::new();
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?
            {
                if field.file_name().is_some() {
                    continue;
                }
                let Some(name) = field.name().map(str::to_string) else {
                    continue;
                };
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                fields.insert(name, value);
            }
            Ok(Self(fields))
        } else if content_type.starts_with("application/json") {
            let Json(object) = Json::<serde_json::Map<String, serde_json::Value>>::from_request(
                req, state,
            )
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
            let fields = object
                .into_iter()
                .filter_map(|(key, value)| match value {
                    serde_json::Value::Null => None,
                    serde_json::Value::String(s) => Some((key, s)),
                    other => Some((key, other.to_string())),
                })
                .collect();
            Ok(Self(fields))
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            Ok(Self(fields))
        } else {
            Ok(Self::default())
        }
    }
}
