//! Multipart form parsing for the upload endpoints.

use std::collections::HashMap;

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use chrono::{DateTime, SubsecRound, Utc};
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::storage::UploadedFile;

#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

fn multipart_error(e: MultipartError) -> AppError {
    AppError::BadRequest(e.body_text())
}

/// Collects text fields and the single file part named `file_field`.
/// An empty file part (a file input left blank) counts as no file.
pub async fn read_form(mut multipart: Multipart, file_field: &str) -> Result<FormData, AppError> {
    let mut form = FormData::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == file_field {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_error)?;
            if bytes.is_empty() {
                continue;
            }
            form.file = Some(UploadedFile {
                file_name: file_name.unwrap_or_else(|| "upload".to_string()),
                content_type,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

impl FormData {
    #[cfg(test)]
    pub fn from_fields(fields: &[(&str, &str)]) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            file: None,
        }
    }

    /// Blank values are treated as absent.
    pub fn optional(&self, key: &str) -> Option<String> {
        self.fields
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn required(&self, key: &str) -> Result<String, AppError> {
        self.optional(key)
            .ok_or_else(|| AppError::BadRequest(format!("missing field: {key}")))
    }

    /// Parses a field into one of the snake_case enums of the models.
    pub fn required_enum<T: DeserializeOwned>(&self, key: &str) -> Result<T, AppError> {
        let raw = self.required(key)?;
        serde_json::from_value(serde_json::Value::String(raw.clone()))
            .map_err(|_| AppError::BadRequest(format!("invalid value for {key}: {raw}")))
    }

    pub fn required_datetime(&self, key: &str) -> Result<DateTime<Utc>, AppError> {
        let raw = self.required(key)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc).trunc_subsecs(0))
            .map_err(|_| AppError::BadRequest(format!("{key} must be an RFC 3339 timestamp")))
    }

    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool, AppError> {
        match self.optional(key).map(|v| v.to_ascii_lowercase()) {
            None => Ok(default),
            Some(v) if matches!(v.as_str(), "true" | "1" | "yes" | "on") => Ok(true),
            Some(v) if matches!(v.as_str(), "false" | "0" | "no" | "off") => Ok(false),
            Some(v) => Err(AppError::BadRequest(format!("invalid boolean for {key}: {v}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeliveryMode, MaterialType};

    #[test]
    fn blank_fields_are_absent() {
        let form = FormData::from_fields(&[("meeting_link", "  "), ("title", "Intro")]);
        assert_eq!(form.optional("meeting_link"), None);
        assert_eq!(form.required("title").unwrap(), "Intro");
        assert!(matches!(form.required("description"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn enums_parse_from_snake_case() {
        let form = FormData::from_fields(&[("mode", "in_person"), ("kind", "video"), ("bad", "zoom")]);
        assert_eq!(form.required_enum::<DeliveryMode>("mode").unwrap(), DeliveryMode::InPerson);
        assert_eq!(form.required_enum::<MaterialType>("kind").unwrap(), MaterialType::Video);
        assert!(form.required_enum::<DeliveryMode>("bad").is_err());
    }

    #[test]
    fn datetimes_are_normalized_to_utc() {
        let form = FormData::from_fields(&[("start_at", "2026-03-01T10:00:00+01:00")]);
        let dt = form.required_datetime("start_at").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-03-01T09:00:00+00:00");
    }

    #[test]
    fn booleans_default_and_parse() {
        let form = FormData::from_fields(&[("is_public", "false"), ("weird", "maybe")]);
        assert!(!form.bool_or("is_public", true).unwrap());
        assert!(form.bool_or("absent", true).unwrap());
        assert!(form.bool_or("weird", true).is_err());
    }
}
