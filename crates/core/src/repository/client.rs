//! HTTP implementation of the repository client.

use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use super::{Repository, RepositoryError, RequestStage};
use crate::token::TokenProvider;

/// Relation key for the download link in a repository resource descriptor.
const DOWNLOAD_REL: &str = "http://ns.adobe.com/adobecloud/rel/download";

/// Rewrite a content path into the API namespace used for writes.
/// `/content/dam/foo.psd` becomes `/api/assets/foo.psd`; paths already in
/// the API namespace pass through unchanged.
pub fn api_asset_path(asset_path: &str) -> String {
    let rewritten = asset_path.replacen("/content/dam", "/api/assets", 1);
    if rewritten.contains("/api/assets") {
        rewritten
    } else {
        format!("/api/assets{}", rewritten)
    }
}

/// Bearer-token-authenticated repository client.
pub struct HttpRepositoryClient {
    client: Client,
    tokens: TokenProvider,
    api_key: String,
}

impl HttpRepositoryClient {
    pub fn new(client: Client, tokens: TokenProvider, api_key: impl Into<String>) -> Self {
        Self {
            client,
            tokens,
            api_key: api_key.into(),
        }
    }

    async fn get_json(&self, url: &str, stage: RequestStage) -> Result<Value, RepositoryError> {
        let token = self.tokens.bearer().await?;

        debug!(%stage, url, "repository GET");
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RepositoryError::RequestFailed {
                stage,
                status: status.as_u16(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| RepositoryError::ParseError {
                stage,
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl Repository for HttpRepositoryClient {
    async fn fetch_asset_metadata(
        &self,
        host: &str,
        path: &str,
    ) -> Result<Value, RepositoryError> {
        let url = format!("{}{}.3.json", host, path);
        self.get_json(&url, RequestStage::Metadata).await
    }

    async fn fetch_presigned_download_url(
        &self,
        host: &str,
        path: &str,
    ) -> Result<String, RepositoryError> {
        // Step one: resource descriptor carrying the download relation.
        let token = self.tokens.bearer().await?;
        let descriptor_url = format!("{}/adobe/repository", host);

        debug!(host, path, "repository descriptor GET");
        let response = self
            .client
            .get(&descriptor_url)
            .query(&[("path", path)])
            .bearer_auth(token)
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RepositoryError::RequestFailed {
                stage: RequestStage::Descriptor,
                status: status.as_u16(),
            });
        }

        let descriptor: Value =
            response
                .json()
                .await
                .map_err(|e| RepositoryError::ParseError {
                    stage: RequestStage::Descriptor,
                    reason: e.to_string(),
                })?;

        let link = descriptor["_links"][DOWNLOAD_REL]["href"]
            .as_str()
            .ok_or_else(|| RepositoryError::MissingDownloadLink {
                path: path.to_string(),
            })?
            .to_string();

        // Step two: the link resolves to the presigned href.
        let resolved = self.get_json(&link, RequestStage::DownloadLink).await?;
        resolved["href"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| RepositoryError::ParseError {
                stage: RequestStage::DownloadLink,
                reason: "response carried no href".to_string(),
            })
    }

    async fn write_comment(
        &self,
        host: &str,
        path: &str,
        text: &str,
    ) -> Result<(), RepositoryError> {
        let token = self.tokens.bearer().await?;
        let url = format!("{}{}/comments/*", host, api_asset_path(path));

        debug!(url, "repository comment POST");
        let form = Form::new().text("message", text.to_string());
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RepositoryError::RequestFailed {
                stage: RequestStage::CommentWrite,
                status: status.as_u16(),
            });
        }

        Ok(())
    }

    async fn patch_metadata(
        &self,
        host: &str,
        path: &str,
        property_path: &str,
        value: &str,
    ) -> Result<(), RepositoryError> {
        let token = self.tokens.bearer().await?;
        let url = format!("{}{}/metadata", host, api_asset_path(path));

        let patch = json!([{ "op": "add", "path": property_path, "value": value }]);

        debug!(url, property_path, "repository metadata PATCH");
        let response = self
            .client
            .patch(&url)
            .bearer_auth(token)
            .header("Content-Type", "application/json-patch+json")
            .json(&patch)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RepositoryError::RequestFailed {
                stage: RequestStage::MetadataPatch,
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_asset_path_rewrites_content_namespace() {
        assert_eq!(
            api_asset_path("/content/dam/brand/hero.psd"),
            "/api/assets/brand/hero.psd"
        );
    }

    #[test]
    fn test_api_asset_path_prefixes_bare_path() {
        assert_eq!(api_asset_path("/brand/hero.psd"), "/api/assets/brand/hero.psd");
    }

    #[test]
    fn test_api_asset_path_passes_through_api_namespace() {
        assert_eq!(
            api_asset_path("/api/assets/brand/hero.psd"),
            "/api/assets/brand/hero.psd"
        );
    }

    #[test]
    fn test_api_asset_path_only_rewrites_leading_occurrence() {
        assert_eq!(
            api_asset_path("/content/dam/content/dam.psd"),
            "/api/assets/content/dam.psd"
        );
    }
}
