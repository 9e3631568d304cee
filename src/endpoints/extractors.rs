//! Request extraction helpers shared by the upload endpoints

use axum::extract::Multipart;
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};
use crate::services::storage::UploadFile;

/// Multipart form field carrying the JSON request body
pub const PAYLOAD_FIELD: &str = "payload";

/// A multipart form split into its JSON payload and file parts
#[derive(Debug, Default)]
pub struct UploadForm {
    pub payload: Option<String>,
    pub files: Vec<UploadFile>,
}

impl UploadForm {
    /// Parse the `payload` field as JSON
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T> {
        let raw = self
            .payload
            .as_deref()
            .ok_or_else(|| AppError::BadRequest(format!("Missing '{}' field", PAYLOAD_FIELD)))?;
        serde_json::from_str(raw)
            .map_err(|e| AppError::BadRequest(format!("Invalid payload: {}", e)))
    }

    /// The single uploaded file, for endpoints that take exactly one
    pub fn single_file(mut self) -> Result<UploadFile> {
        match self.files.len() {
            1 => Ok(self.files.remove(0)),
            0 => Err(AppError::BadRequest("No file uploaded".to_string())),
            _ => Err(AppError::BadRequest("Only one file can be uploaded".to_string())),
        }
    }
}

/// Drain a multipart body. Every part with a file name is treated as an upload.
pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(file_name) = field.file_name().map(str::to_string) {
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read file '{}': {}", file_name, e)))?;
            form.files.push(UploadFile {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
        } else if name == PAYLOAD_FIELD {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read payload: {}", e)))?;
            form.payload = Some(text);
        } else {
            tracing::debug!(field = %name, "Ignoring unknown multipart field");
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::AddAssets;

    #[test]
    fn test_payload_missing_is_bad_request() {
        let form = UploadForm::default();
        let err = form.payload::<AddAssets>().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_payload_parses_json() {
        let form = UploadForm {
            payload: Some(r#"{"target":{"case_id":4},"assets":[{"name":"a.pdf"}]}"#.to_string()),
            files: vec![],
        };
        let parsed: AddAssets = form.payload().unwrap();
        assert_eq!(parsed.assets.len(), 1);
    }

    #[test]
    fn test_single_file_requires_exactly_one() {
        assert!(UploadForm::default().single_file().is_err());

        let file = UploadFile {
            file_name: "me.png".to_string(),
            content_type: Some("image/png".to_string()),
            bytes: vec![1, 2, 3],
        };
        let form = UploadForm {
            payload: None,
            files: vec![file.clone(), file],
        };
        assert!(form.single_file().is_err());
    }
}
