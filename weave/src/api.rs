//! HTTP side of the backend: model list and image upload.

use reqwest::multipart::{Form, Part};
use weave_core::config::Settings;
use weave_core::error::UploadError;
use weave_core::types::ModelOption;
use weave_core::upload::PendingFile;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Format(String),
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    models_url: String,
    upload_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(settings: &Settings) -> Self {
        Self {
            http: reqwest::Client::new(),
            models_url: settings.api_url("/api/model/list"),
            upload_url: settings.api_url("/api/upload"),
            token: settings.token.clone(),
        }
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token.as_deref() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Fetches the selectable models.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] on transport or status failure and
    /// [`ApiError::Format`] when the body is not an array of models.
    pub async fn fetch_models(&self) -> Result<Vec<ModelOption>, ApiError> {
        let body: serde_json::Value = self
            .authorize(self.http.get(&self.models_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if !body.is_array() {
            return Err(ApiError::Format("model list is not an array".to_owned()));
        }
        serde_json::from_value(body).map_err(|e| ApiError::Format(e.to_string()))
    }

    /// Uploads one image and returns the URL the backend stored it under.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Failed`] for unreadable files, HTTP failures and
    /// responses without a `url` field.
    pub async fn upload(&self, file: PendingFile) -> Result<String, UploadError> {
        let fail = |reason: String| UploadError::Failed { name: file.name.clone(), reason };

        let bytes = tokio::fs::read(&file.local_path)
            .await
            .map_err(|e| fail(e.to_string()))?;
        let part = Part::bytes(bytes)
            .file_name(file.name.clone())
            .mime_str(&file.media_type)
            .map_err(|e| fail(e.to_string()))?;
        let form = Form::new().part("file", part);

        let body: serde_json::Value = self
            .authorize(self.http.post(&self.upload_url))
            .multipart(form)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| fail(e.to_string()))?
            .json()
            .await
            .map_err(|e| fail(e.to_string()))?;

        body.get("url")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| fail("response has no url".to_owned()))
    }
}
