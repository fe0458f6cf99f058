//! Local-disk blob storage for uploaded files (vouchers, profile pictures).
//!
//! Files are written before the operation's transaction commits; a rollback
//! can therefore leave an orphaned file behind. That inconsistency is
//! accepted, the store never resolves it.

use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use uuid::Uuid;

use crate::{
    config::StorageConfig,
    error::{AppError, AppResult},
};

/// Subdirectory a blob lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Voucher,
    Profile,
}

impl FileKind {
    fn dir(&self) -> &'static str {
        match self {
            FileKind::Voucher => "vouchers",
            FileKind::Profile => "profiles",
        }
    }
}

#[derive(Clone)]
pub struct StorageService {
    root: PathBuf,
    max_bytes: usize,
}

impl StorageService {
    /// Create the store, making sure the upload directories exist
    pub async fn new(config: StorageConfig) -> AppResult<Self> {
        let root = PathBuf::from(&config.upload_dir);
        for kind in [FileKind::Voucher, FileKind::Profile] {
            fs::create_dir_all(root.join(kind.dir()))
                .await
                .map_err(|e| AppError::Storage(format!("Cannot create upload dir: {}", e)))?;
        }
        Ok(Self {
            root,
            max_bytes: config.max_upload_bytes,
        })
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Store a blob under a sanitized, timestamped, collision-proof name.
    /// Returns the path relative to the upload root; that string is what
    /// gets persisted on the owning record.
    pub async fn store(
        &self,
        kind: FileKind,
        original_name: &str,
        bytes: &[u8],
    ) -> AppResult<String> {
        if bytes.len() > self.max_bytes {
            return Err(AppError::Validation(format!(
                "File exceeds the {} byte upload limit",
                self.max_bytes
            )));
        }
        let tag = Uuid::new_v4().simple().to_string();
        let stored_name = format!(
            "{}_{}_{}",
            Utc::now().format("%Y%m%d_%H%M%S"),
            &tag[..8],
            sanitize_filename(original_name)
        );
        let relative = format!("{}/{}", kind.dir(), stored_name);
        fs::write(self.root.join(&relative), bytes)
            .await
            .map_err(|e| AppError::Storage(format!("Cannot write {}: {}", relative, e)))?;
        Ok(relative)
    }

    /// Read a stored blob back. The path must be one previously returned by
    /// `store`; anything escaping the upload root is rejected.
    pub async fn open(&self, stored: &str) -> AppResult<(Vec<u8>, &'static str)> {
        let relative = Path::new(stored);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(AppError::Validation("Invalid file path".to_string()));
        }
        let bytes = fs::read(self.root.join(relative)).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::NotFound(format!("File {} not found", stored))
            } else {
                AppError::Storage(format!("Cannot read {}: {}", stored, e))
            }
        })?;
        Ok((bytes, content_type_for(stored)))
    }
}

/// Keep only filename-safe characters, mirroring what the upload forms send.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

fn content_type_for(name: &str) -> &'static str {
    match name.rsplit('.').next().map(str::to_ascii_lowercase).as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_path_separators() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_filename("voucher 2024.pdf"), "voucher_2024.pdf");
        assert_eq!(sanitize_filename("..."), "file");
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type_for("a/b.PDF"), "application/pdf");
        assert_eq!(content_type_for("pic.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("blob"), "application/octet-stream");
    }
}
