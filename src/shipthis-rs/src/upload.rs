//! Multipart file upload to the Shipthis upload host.

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path;

use crate::headers::merge_headers;
use crate::{Client, Result, ShipthisError};

impl Client {
    /// Upload a file from disk. `file_name` defaults to the path's file name.
    pub async fn upload_file(
        &self,
        file_path: impl AsRef<Path>,
        file_name: Option<&str>,
    ) -> Result<Value> {
        let path = file_path.as_ref();
        let name = match file_name {
            Some(name) => name.to_string(),
            None => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string()),
        };
        let contents = tokio::fs::read(path).await?;
        self.upload_bytes(&name, contents).await
    }

    /// Upload in-memory content as a single `file` part
    #[tracing::instrument(skip(self, contents), fields(size = contents.len()))]
    pub async fn upload_bytes(&self, file_name: &str, contents: Vec<u8>) -> Result<Value> {
        let url = self.config().upload_url();

        let mut headers = merge_headers(self.config(), &BTreeMap::new())?;
        // The multipart boundary is set by the form
        headers.remove(CONTENT_TYPE);

        let form = Form::new().part("file", Part::bytes(contents).file_name(file_name.to_string()));

        let response = self
            .http()
            .post(&url)
            .headers(headers)
            .timeout(self.config().timeout() * 2)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Upload transport failure");
                ShipthisError::Transport(e)
            })?;

        let status = response.status();
        let body = response.bytes().await?;
        tracing::debug!(status = status.as_u16(), "Upload response received");

        if !status.is_success() {
            return crate::response::interpret(status, &body).map(|response| response.data);
        }

        Ok(serde_json::from_slice(&body)
            .unwrap_or_else(|_| json!({ "url": String::from_utf8_lossy(&body) })))
    }
}
