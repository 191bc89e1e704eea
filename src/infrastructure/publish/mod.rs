//! Publish - archive the project and upload it to the deployment endpoint

use std::fs::File;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use reqwest::Client;
use walkdir::{DirEntry, WalkDir};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::application::errors::PublishError;
use crate::infrastructure::config::PublishConfig;

/// Directories never shipped
const EXCLUDED_DIRS: [&str; 2] = ["target", ".git"];

/// Uploads zipped project archives with basic authentication
pub struct Publisher {
    url: String,
    username: String,
    password: String,
    archive_path: Option<PathBuf>,
    client: Client,
}

impl Publisher {
    pub fn new(config: &PublishConfig) -> Result<Self, PublishError> {
        let setting = |value: &Option<String>, name: &str| {
            value
                .clone()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| PublishError::MissingSetting(name.to_string()))
        };

        Ok(Self {
            url: setting(&config.url, "publish.url (PUBLISH_URL)")?,
            username: setting(&config.username, "publish.username (PUBLISH_USERNAME)")?,
            password: setting(&config.password, "publish.password (PUBLISH_PASSWORD)")?,
            archive_path: config.archive_path.clone(),
            client: Client::new(),
        })
    }

    /// Archive `dir`, upload it, and remove the archive once accepted
    pub async fn publish(&self, dir: &Path) -> Result<PathBuf, PublishError> {
        let dir = dir.canonicalize()?;
        let archive_path = match &self.archive_path {
            Some(path) => path.clone(),
            None => default_archive_path(&dir),
        };

        let bytes = create_archive(&dir)?;
        tokio::fs::write(&archive_path, &bytes).await?;
        tracing::info!("Wrote {} ({} bytes)", archive_path.display(), bytes.len());

        let response = self.client
            .put(&self.url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Content-Type", "application/zip")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Rejected { status: status.as_u16(), body });
        }

        tokio::fs::remove_file(&archive_path).await?;
        tracing::info!("Published {} to {}", dir.display(), self.url);
        Ok(archive_path)
    }
}

/// `<parent>/<dir name>.zip`
pub fn default_archive_path(dir: &Path) -> PathBuf {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "site".to_string());
    let parent = dir.parent().unwrap_or(dir);
    parent.join(format!("{}.zip", name))
}

fn is_excluded(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && EXCLUDED_DIRS.iter().any(|d| entry.file_name() == *d)
}

/// Build a zip of `dir` in memory, entry names relative to `dir`
pub fn create_archive(dir: &Path) -> Result<Vec<u8>, PublishError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let walker = WalkDir::new(dir).sort_by_file_name().into_iter().filter_entry(|e| !is_excluded(e));
    for entry in walker {
        let entry = entry?;
        let name = match entry.path().strip_prefix(dir) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.to_string_lossy().replace('\\', "/"),
            _ => continue,
        };

        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
        } else if entry.file_type().is_file() {
            zip.start_file(name, options)?;
            io::copy(&mut File::open(entry.path())?, &mut zip)?;
        } else {
            tracing::debug!("Skipping {}", entry.path().display());
        }
    }

    Ok(zip.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::routing::put;
    use axum::Router;
    use std::collections::HashSet;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use zip::ZipArchive;

    /// Content type, authorization and body of one received upload
    type Upload = (String, String, Vec<u8>);

    fn entries(bytes: &[u8]) -> HashSet<String> {
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        archive
            .file_names()
            .map(|p| p.trim_end_matches('/').to_string())
            .collect()
    }

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.js"), "bot").unwrap();
        fs::create_dir_all(dir.path().join("cards")).unwrap();
        fs::write(dir.path().join("cards/welcome.json"), "{}").unwrap();
        dir
    }

    /// Deployment endpoint on a local port answering every PUT with `status`
    async fn deploy_endpoint(status: StatusCode) -> (String, Arc<Mutex<Vec<Upload>>>) {
        let uploads = Arc::new(Mutex::new(Vec::new()));
        let seen = uploads.clone();
        let app = Router::new().route(
            "/api/zip/site/wwwroot",
            put(move |headers: HeaderMap, body: Bytes| {
                let seen = seen.clone();
                async move {
                    let value = |name: header::HeaderName| {
                        headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or_default().to_string()
                    };
                    seen.lock().unwrap().push((
                        value(header::CONTENT_TYPE),
                        value(header::AUTHORIZATION),
                        body.to_vec(),
                    ));
                    (status, "deploy finished")
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/api/zip/site/wwwroot", addr), uploads)
    }

    fn publisher(url: String, archive_path: PathBuf) -> Publisher {
        Publisher::new(&PublishConfig {
            url: Some(url),
            username: Some("deployer".to_string()),
            password: Some("hunter2".to_string()),
            archive_path: Some(archive_path),
        })
        .unwrap()
    }

    #[test]
    fn test_archive_skips_build_output_and_git() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("Cargo.toml"), "[package]").unwrap();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/main.rs"), "fn main() {}").unwrap();
        fs::create_dir_all(root.join("target/debug")).unwrap();
        fs::write(root.join("target/debug/cake-bot"), "bin").unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join(".git/HEAD"), "ref").unwrap();
        fs::create_dir_all(root.join("cards/target")).unwrap();

        let found = entries(&create_archive(root).unwrap());

        assert!(found.contains("Cargo.toml"));
        assert!(found.contains("src/main.rs"));
        assert!(!found.iter().any(|p| p.starts_with("target") || p.starts_with(".git")));
        assert!(found.contains("cards"));
    }

    #[test]
    fn test_default_archive_path_is_beside_the_project() {
        let path = default_archive_path(Path::new("/work/cakes"));
        assert_eq!(path, PathBuf::from("/work/cakes.zip"));
    }

    #[test]
    fn test_credentials_are_required() {
        let config = PublishConfig {
            url: Some("https://deploy.example/api/site".to_string()),
            username: Some("deployer".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            Publisher::new(&config),
            Err(PublishError::MissingSetting(s)) if s.starts_with("publish.password")
        ));
    }

    #[tokio::test]
    async fn test_accepted_upload_removes_the_archive() {
        let site = project();
        let out = tempfile::tempdir().unwrap();
        let (url, uploads) = deploy_endpoint(StatusCode::OK).await;

        let archive = publisher(url, out.path().join("site.zip"))
            .publish(site.path())
            .await
            .unwrap();
        assert!(!archive.exists());

        let uploads = uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        let (content_type, authorization, body) = &uploads[0];
        assert_eq!(content_type, "application/zip");
        assert!(authorization.starts_with("Basic "));
        assert!(entries(body).contains("cards/welcome.json"));
    }

    #[tokio::test]
    async fn test_rejected_upload_keeps_the_archive() {
        let site = project();
        let out = tempfile::tempdir().unwrap();
        let archive = out.path().join("site.zip");
        let (url, _) = deploy_endpoint(StatusCode::INTERNAL_SERVER_ERROR).await;

        let result = publisher(url, archive.clone()).publish(site.path()).await;

        match result {
            Err(PublishError::Rejected { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "deploy finished");
            }
            other => panic!("expected a rejected upload, got {:?}", other),
        }
        assert!(entries(&fs::read(&archive).unwrap()).contains("index.js"));
    }
}
