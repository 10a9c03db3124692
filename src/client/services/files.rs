// File upload and download

use reqwest::multipart::{Form, Part};

use crate::client::api_client::ApiClient;
use crate::client::error::{ClientError, ClientResult};
use crate::client::models::StoredFile;

use super::{decode_record, reraise};

/// Multipart field carrying the file
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Clone)]
pub struct FileService {
    client: ApiClient,
}

impl FileService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn upload_file(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> ClientResult<StoredFile> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_type)
            .map_err(|e| ClientError::Encode(format!("Invalid MIME type '{}': {}", mime_type, e)));
        let result = match part {
            Ok(part) => self.client.upload("", Form::new().part(UPLOAD_FIELD, part)).await,
            Err(e) => Err(e),
        };
        reraise("upload_file", result.and_then(decode_record))
    }

    pub async fn download_file(&self, file_id: &str) -> ClientResult<Vec<u8>> {
        let result = self.client.download(file_id).await;
        reraise("download_file", result)
    }
}
