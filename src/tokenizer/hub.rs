use std::path::Path;

use futures_util::StreamExt;
use reqwest::Client;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use super::TokenizerError;
use crate::core::config::HubConfig;

/// Minimal Hugging Face Hub file fetcher.
#[derive(Clone)]
pub struct HubClient {
    endpoint: String,
    client: Client,
}

impl HubClient {
    /// The download timeout comes from configuration and applies to this
    /// client only.
    pub fn new(config: &HubConfig) -> Result<Self, TokenizerError> {
        let client = Client::builder()
            .timeout(config.download_timeout())
            .build()
            .map_err(|e| TokenizerError::Download(e.to_string()))?;
        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn resolve_url(&self, repo_id: &str, filename: &str) -> String {
        format!("{}/{}/resolve/main/{}", self.endpoint, repo_id, filename)
    }

    /// Downloads one file of `repo_id` to `target`, returning its size.
    ///
    /// Each call writes its own temporary file next to the target and
    /// persists it at the end. Concurrent downloads of the same file never
    /// share a partial file, and a failed download leaves nothing behind.
    pub async fn download(
        &self,
        repo_id: &str,
        filename: &str,
        target: &Path,
    ) -> Result<u64, TokenizerError> {
        validate_repo_id(repo_id)?;

        let parent = target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        tokio::fs::create_dir_all(parent).await?;

        let url = self.resolve_url(repo_id, filename);
        tracing::info!("Downloading {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TokenizerError::Download(e.to_string()))?
            .error_for_status()
            .map_err(|e| TokenizerError::Download(e.to_string()))?;

        // Removed on drop unless persisted.
        let partial = NamedTempFile::new_in(parent)?;
        let mut file = tokio::fs::File::from_std(partial.reopen()?);
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let data = chunk.map_err(|e| TokenizerError::Download(e.to_string()))?;
            file.write_all(&data).await?;
            downloaded += data.len() as u64;
        }
        file.flush().await?;
        drop(file);

        partial.persist(target).map_err(|e| TokenizerError::Io(e.error))?;
        tracing::info!("Saved {} ({} bytes)", target.display(), downloaded);
        Ok(downloaded)
    }
}

fn validate_repo_id(repo_id: &str) -> Result<(), TokenizerError> {
    let valid = !repo_id.trim().is_empty()
        && !repo_id.starts_with('/')
        && !repo_id.contains('\\')
        && repo_id
            .split('/')
            .all(|part| !part.is_empty() && part != "." && part != "..");
    if valid {
        Ok(())
    } else {
        Err(TokenizerError::InvalidModel(repo_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HubClient {
        HubClient::new(&HubConfig {
            endpoint: "https://hub.example/".to_string(),
            download_timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn resolve_url_uses_main_revision() {
        assert_eq!(
            client().resolve_url("openai-community/gpt2", "tokenizer.json"),
            "https://hub.example/openai-community/gpt2/resolve/main/tokenizer.json"
        );
    }

    /// Serves `chunks` blocks of 1000 bytes, pausing between blocks.
    async fn slow_hub(chunks: usize) -> String {
        use axum::body::{Body, Bytes};
        use axum::routing::get;

        let app = axum::Router::new().route(
            "/:org/:repo/resolve/main/:file",
            get(move || async move {
                let stream = futures_util::stream::iter(0..chunks).then(|_| async {
                    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                    Ok::<_, std::io::Error>(Bytes::from(vec![b'x'; 1000]))
                });
                Body::from_stream(stream)
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn concurrent_downloads_of_one_file_both_succeed() {
        let endpoint = slow_hub(20).await;
        let hub = HubClient::new(&HubConfig {
            endpoint,
            download_timeout_secs: 30,
        })
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("org").join("m").join("tokenizer.json");

        let first = hub.download("org/m", "tokenizer.json", &target);
        let second = async {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            hub.download("org/m", "tokenizer.json", &target).await
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first.unwrap(), 20_000);
        assert_eq!(second.unwrap(), 20_000);
        assert_eq!(std::fs::read(&target).unwrap().len(), 20_000);
        let leftovers = std::fs::read_dir(target.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[tokio::test]
    async fn failed_download_leaves_no_files() {
        let hub = HubClient::new(&HubConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            download_timeout_secs: 1,
        })
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("org").join("m").join("tokenizer.json");

        assert!(hub.download("org/m", "tokenizer.json", &target).await.is_err());
        assert_eq!(std::fs::read_dir(target.parent().unwrap()).unwrap().count(), 0);
    }

    #[test]
    fn repo_ids_cannot_escape_the_cache() {
        assert!(validate_repo_id("gpt2").is_ok());
        assert!(validate_repo_id("openai-community/gpt2").is_ok());
        assert!(validate_repo_id("../etc").is_err());
        assert!(validate_repo_id("/abs").is_err());
        assert!(validate_repo_id("a//b").is_err());
        assert!(validate_repo_id("").is_err());
    }
}
