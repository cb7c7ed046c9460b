//! Request DTOs with validation.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use validator::Validate;

use trainhub_entity::upload::{DataFileEntry, ModelFileEntry, UploadRequest};

/// Body of `POST /api/uploads`.
///
/// Form-style callers send `data_files` and `model_file` as JSON-encoded
/// strings; both shapes are accepted.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UploadTrainingDataRequest {
    /// Name of an existing project.
    #[serde(default)]
    #[validate(length(min = 1, max = 140, message = "project_name is required"))]
    pub project_name: String,
    /// Data files.
    #[serde(default, alias = "training_data", deserialize_with = "json_or_string")]
    pub data_files: Vec<DataFileEntry>,
    /// Optional model artifact. An empty string means none.
    #[serde(default, deserialize_with = "json_or_string")]
    pub model_file: Option<ModelFileEntry>,
}

impl From<UploadTrainingDataRequest> for UploadRequest {
    fn from(req: UploadTrainingDataRequest) -> Self {
        Self {
            project_name: req.project_name,
            data_files: req.data_files,
            model_file: req.model_file,
        }
    }
}

/// Accept either a JSON value or a string holding JSON. `null` and blank
/// strings give the default.
fn json_or_string<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(T::default()),
        Value::String(s) if s.trim().is_empty() => Ok(T::default()),
        Value::String(s) => serde_json::from_str(&s).map_err(D::Error::custom),
        other => serde_json::from_value(other).map_err(D::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json_body() {
        let req: UploadTrainingDataRequest = serde_json::from_str(
            r#"{"project_name":"alpha","data_files":[{"content":"aGk=","category":"ok","name":"a.png"}]}"#,
        )
        .unwrap();
        assert_eq!(req.data_files.len(), 1);
        assert_eq!(req.data_files[0].name.as_deref(), Some("a.png"));
        assert!(req.model_file.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_json_encoded_strings() {
        let req: UploadTrainingDataRequest = serde_json::from_str(
            r#"{
                "project_name": "alpha",
                "training_data": "[{\"image\":\"aGk=\",\"label\":\"defective\"}]",
                "model_file": ""
            }"#,
        )
        .unwrap();
        assert_eq!(req.data_files[0].category.as_deref(), Some("defective"));
        assert!(req.model_file.is_none());

        let req: UploadTrainingDataRequest = serde_json::from_str(
            r#"{"project_name":"alpha","model_file":"{\"file_data\":\"aGk=\",\"file_name\":\"net.h5\"}"}"#,
        )
        .unwrap();
        assert!(req.model_file.unwrap().is_complete());
    }

    #[test]
    fn test_missing_project_fails_validation() {
        let req: UploadTrainingDataRequest = serde_json::from_str(r#"{"data_files":[]}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_malformed_string_is_an_error() {
        let result: Result<UploadTrainingDataRequest, _> =
            serde_json::from_str(r#"{"project_name":"alpha","data_files":"[not json"}"#);
        assert!(result.is_err());
    }
}
