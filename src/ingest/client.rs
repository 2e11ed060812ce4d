use crate::{data::model::LocationRecord, MapError, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Shared async HTTP client for uploads
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent(concat!("listmap/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(120))
        .build()
        .unwrap_or_else(|e| {
            log::warn!("falling back to default HTTP client: {}", e);
            reqwest::Client::new()
        })
});

/// Body returned by the ingestion endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<LocationRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResponse {
    pub fn ok(records: Vec<LocationRecord>) -> Self {
        Self {
            success: true,
            data: Some(records),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Records of a successful upload. Records may lack coordinates when
    /// geocoding failed for them.
    pub fn into_records(self) -> Result<Vec<LocationRecord>> {
        if self.success {
            Ok(self.data.unwrap_or_default())
        } else {
            let message = self.error.unwrap_or_else(|| "upload failed".to_string());
            Err(MapError::Ingestion(message).into())
        }
    }
}

/// Turns an uploaded file into location records
#[async_trait]
pub trait IngestionService: Send + Sync {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadResponse>;
}

/// Posts files as multipart `file` fields to an HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpIngestionClient {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpIngestionClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(endpoint, HTTP_CLIENT.clone())
    }

    pub fn with_client(endpoint: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl IngestionService for HttpIngestionClient {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadResponse> {
        log::debug!("uploading {} ({} bytes) to {}", file_name, bytes.len(), self.endpoint);

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("text/csv")
            .map_err(MapError::from)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(MapError::from)?;
        let status = response.status();
        let body: UploadResponse = response.json().await.map_err(MapError::from)?;

        if !status.is_success() {
            log::warn!("upload of {} answered {}: {:?}", file_name, status, body.error);
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parsing() {
        let json = r#"{"success":true,"data":[{"name":"A","address":"Seoul","lat":37.5,"lon":127.0}]}"#;
        let response: UploadResponse = serde_json::from_str(json).unwrap();
        let records = response.into_records().unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].has_coordinates());

        let failed: UploadResponse =
            serde_json::from_str(r#"{"success":false,"error":"bad file"}"#).unwrap();
        let error = failed.into_records().unwrap_err();
        assert!(error.to_string().contains("bad file"));
    }

    #[test]
    fn test_client_keeps_endpoint() {
        let client = HttpIngestionClient::new("http://localhost:3000/api/upload");
        assert_eq!(client.endpoint(), "http://localhost:3000/api/upload");
        assert!(UploadResponse::ok(Vec::new()).into_records().unwrap().is_empty());
    }
}
