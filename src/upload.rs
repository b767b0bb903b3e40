//! Multipart article submissions.
//!
//! The create and edit forms post `multipart/form-data` with the text fields
//! of [`ArticleForm`] plus two file fields:
//!
//! | Field | Max files | Stored as |
//! |-------|-----------|-----------|
//! | `hero_image` | 1 | `hero-<millis>-<rand><ext>` |
//! | `article_images` | 20 | `img-<millis>-<rand><ext>` |
//!
//! Files are streamed chunk by chunk into the upload directory. The leading
//! bytes are sniffed and anything that is not a JPEG, PNG, WebP, GIF or AVIF
//! is deleted and rejected. Empty file parts (a file input left blank) are
//! skipped.

use crate::authoring::ArticleForm;
use axum::extract::Multipart;
use axum::extract::multipart::{Field, MultipartError};
use image::ImageFormat;
use rand::Rng;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

pub const HERO_FIELD: &str = "hero_image";
pub const IMAGES_FIELD: &str = "article_images";
pub const MAX_HERO_FILES: usize = 1;
pub const MAX_ARTICLE_IMAGES: usize = 20;

/// Bytes needed to recognise every accepted format.
const SNIFF_LEN: usize = 16;

const ACCEPTED: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::WebP,
    ImageFormat::Gif,
    ImageFormat::Avif,
];

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("malformed upload: {0}")]
    Multipart(#[from] MultipartError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("too many files in {field} (max {max})")]
    TooManyFiles { field: &'static str, max: usize },
    #[error("{0} is not a supported image")]
    NotAnImage(String),
}

/// A file written to the upload directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub file_name: String,
    pub path: PathBuf,
}

impl StoredUpload {
    /// Public URL under `/uploads`.
    pub fn url(&self) -> String {
        format!("/uploads/{}", self.file_name)
    }
}

/// Everything an article form submitted.
#[derive(Debug, Default)]
pub struct ArticleSubmission {
    pub form: ArticleForm,
    pub hero: Option<StoredUpload>,
    pub images: Vec<StoredUpload>,
}

impl ArticleSubmission {
    pub fn hero_url(&self) -> Option<String> {
        self.hero.as_ref().map(StoredUpload::url)
    }

    pub fn image_urls(&self) -> Vec<String> {
        self.images.iter().map(StoredUpload::url).collect()
    }

    /// Remove the stored files, for a submission that was rejected after
    /// upload.
    pub async fn discard(self) {
        for upload in self.hero.into_iter().chain(self.images) {
            if let Err(e) = fs::remove_file(&upload.path).await {
                warn!(path = %upload.path.display(), error = %e, "could not remove upload");
            }
        }
    }
}

/// Read a whole article submission, writing files into `dir`.
///
/// On error, files already written for this submission are removed.
pub async fn read_article_submission(
    mut multipart: Multipart,
    dir: &Path,
) -> Result<ArticleSubmission, UploadError> {
    fs::create_dir_all(dir).await?;
    let mut submission = ArticleSubmission::default();

    let result = async {
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                HERO_FIELD => {
                    if let Some(upload) = store_file(field, dir, "hero").await? {
                        if submission.hero.is_some() {
                            submission.images.push(upload);
                            return Err(UploadError::TooManyFiles {
                                field: HERO_FIELD,
                                max: MAX_HERO_FILES,
                            });
                        }
                        submission.hero = Some(upload);
                    }
                }
                IMAGES_FIELD => {
                    if let Some(upload) = store_file(field, dir, "img").await? {
                        submission.images.push(upload);
                        if submission.images.len() > MAX_ARTICLE_IMAGES {
                            return Err(UploadError::TooManyFiles {
                                field: IMAGES_FIELD,
                                max: MAX_ARTICLE_IMAGES,
                            });
                        }
                    }
                }
                "title" => submission.form.title = field.text().await?,
                "body_text" => submission.form.body_text = field.text().await?,
                "hero_image_url" => submission.form.hero_image_url = field.text().await?,
                "category" => submission.form.category = field.text().await?,
                "author" => submission.form.author = field.text().await?,
                "author_role" => submission.form.author_role = field.text().await?,
                other => debug!(field = other, "ignoring form field"),
            }
        }
        Ok(())
    }
    .await;

    match result {
        Ok(()) => Ok(submission),
        Err(e) => {
            submission.discard().await;
            Err(e)
        }
    }
}

/// Stream one file field to disk. Returns `None` for an empty part.
async fn store_file(
    mut field: Field<'_>,
    dir: &Path,
    prefix: &str,
) -> Result<Option<StoredUpload>, UploadError> {
    let original = field.file_name().unwrap_or_default().to_string();
    if original.is_empty() {
        while field.chunk().await?.is_some() {}
        return Ok(None);
    }

    let file_name = unique_name(prefix, &original);
    let path = dir.join(&file_name);
    let mut file = fs::File::create(&path).await?;
    let mut head: Vec<u8> = Vec::with_capacity(SNIFF_LEN);
    let mut written = 0usize;
    let mut checked = false;

    let outcome: Result<(), UploadError> = async {
        while let Some(chunk) = field.chunk().await? {
            if !checked {
                let take = (SNIFF_LEN - head.len()).min(chunk.len());
                head.extend_from_slice(&chunk[..take]);
                if head.len() >= SNIFF_LEN {
                    check_format(&head, &original)?;
                    checked = true;
                }
            }
            file.write_all(&chunk).await?;
            written += chunk.len();
        }
        file.flush().await?;
        if !checked && written > 0 {
            check_format(&head, &original)?;
        }
        Ok(())
    }
    .await;

    if let Err(e) = outcome {
        drop(file);
        let _ = fs::remove_file(&path).await;
        return Err(e);
    }
    if written == 0 {
        drop(file);
        fs::remove_file(&path).await?;
        return Ok(None);
    }

    debug!(file = %file_name, bytes = written, "stored upload");
    Ok(Some(StoredUpload { file_name, path }))
}

fn check_format(head: &[u8], original: &str) -> Result<(), UploadError> {
    match image::guess_format(head) {
        Ok(format) if ACCEPTED.contains(&format) => Ok(()),
        _ => Err(UploadError::NotAnImage(original.to_string())),
    }
}

/// `<prefix>-<unix millis>-<random>` plus the original extension, or `.jpg`.
pub fn unique_name(prefix: &str, original: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let random: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("{prefix}-{millis}-{random}{}", extension(original))
}

fn extension(original: &str) -> String {
    Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_else(|| ".jpg".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_name_keeps_extension() {
        let name = unique_name("hero", "Sala Principal.PNG");
        assert!(name.starts_with("hero-"));
        assert!(name.ends_with(".png"));
        assert_eq!(name.matches('-').count(), 2);
    }

    #[test]
    fn unique_name_defaults_to_jpg() {
        assert!(unique_name("img", "sem-extensao").ends_with(".jpg"));
        assert!(unique_name("img", "estranho.j?g").ends_with(".jpg"));
    }

    #[test]
    fn unique_names_differ() {
        assert_ne!(unique_name("img", "a.jpg"), unique_name("img", "a.jpg"));
    }

    #[test]
    fn check_format_accepts_png_and_rejects_text() {
        let png = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
        assert!(check_format(png, "a.png").is_ok());
        assert!(matches!(
            check_format(b"<html><body>hi</body></html>", "x.jpg"),
            Err(UploadError::NotAnImage(_))
        ));
    }

    #[test]
    fn upload_url_is_under_uploads() {
        let upload = StoredUpload {
            file_name: "img-1-2.jpg".to_string(),
            path: PathBuf::from("/tmp/img-1-2.jpg"),
        };
        assert_eq!(upload.url(), "/uploads/img-1-2.jpg");
    }
}
