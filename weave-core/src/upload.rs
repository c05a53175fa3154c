//! Attachment uploads.
//!
//! A batch is all-or-nothing: oversized files are filtered out first (one
//! notice each), the rest upload concurrently, and a single failure discards
//! the whole batch. Split into [`UploadQueue::begin`] / [`UploadQueue::finish`]
//! so a UI can run [`upload_all`] on a background task between the two.

use std::future::Future;
use std::path::{Path, PathBuf};

use futures::future::try_join_all;

use crate::error::UploadError;
use crate::types::{Attachment, Notice};

/// Per-file size limit.
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// A local file waiting to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub name: String,
    pub size: u64,
    pub media_type: String,
    pub local_path: PathBuf,
}

impl PendingFile {
    /// Stats `path` and guesses its media type from the extension.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file metadata cannot be read.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            name,
            size: meta.len(),
            media_type: media_type_for(path).to_owned(),
            local_path: path.to_path_buf(),
        })
    }

    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Default)]
pub struct UploadQueue {
    busy: bool,
    attachments: Vec<Attachment>,
    notices: Vec<Notice>,
}

impl UploadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Hands the pending attachments to the caller, leaving the list empty.
    pub fn take_attachments(&mut self) -> Vec<Attachment> {
        std::mem::take(&mut self.attachments)
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Starts a batch: returns the files to upload and marks the queue busy.
    ///
    /// Returns `None` when a batch is already running or nothing is left after
    /// filtering out non-images and files above [`MAX_FILE_SIZE`].
    pub fn begin(&mut self, files: Vec<PendingFile>) -> Option<Vec<PendingFile>> {
        if self.busy {
            tracing::debug!("upload ignored; a batch is already running");
            return None;
        }
        let mut accepted = Vec::with_capacity(files.len());
        for file in files {
            if !file.is_image() {
                tracing::debug!(name = %file.name, "skipping non-image attachment");
                continue;
            }
            if file.size > MAX_FILE_SIZE {
                let err = UploadError::TooLarge { name: file.name.clone(), limit: MAX_FILE_SIZE };
                self.notices.push(Notice::error(err.to_string()));
                continue;
            }
            accepted.push(file);
        }
        if accepted.is_empty() {
            return None;
        }
        self.busy = true;
        Some(accepted)
    }

    /// Ends the running batch with its outcome. Always clears the busy flag.
    pub fn finish(&mut self, outcome: Result<Vec<Attachment>, UploadError>) {
        self.busy = false;
        match outcome {
            Ok(uploaded) => {
                let count = uploaded.len();
                self.attachments.extend(uploaded);
                self.notices.push(Notice::success(format!("Uploaded {count} file(s)")));
            }
            Err(e) => {
                tracing::error!(error = %e, "upload batch failed");
                self.notices.push(Notice::error("Upload failed"));
            }
        }
    }

    /// Runs a whole batch in place: `begin`, [`upload_all`], `finish`.
    pub async fn upload_batch<F, Fut>(&mut self, files: Vec<PendingFile>, uploader: F)
    where
        F: Fn(PendingFile) -> Fut,
        Fut: Future<Output = Result<String, UploadError>>,
    {
        let Some(accepted) = self.begin(files) else {
            return;
        };
        let outcome = upload_all(accepted, uploader).await;
        self.finish(outcome);
    }
}

/// Uploads every file concurrently. `uploader` returns the remote URL.
///
/// # Errors
///
/// Returns the first [`UploadError`]; no attachments are produced in that case.
pub async fn upload_all<F, Fut>(
    files: Vec<PendingFile>,
    uploader: F,
) -> Result<Vec<Attachment>, UploadError>
where
    F: Fn(PendingFile) -> Fut,
    Fut: Future<Output = Result<String, UploadError>>,
{
    try_join_all(files.into_iter().map(|file| {
        let name = file.name.clone();
        let media_type = file.media_type.clone();
        let local_ref = file.local_path.display().to_string();
        let pending = uploader(file);
        async move {
            let remote_url = pending.await?;
            Ok::<_, UploadError>(Attachment {
                id: uuid::Uuid::new_v4().to_string(),
                name,
                media_type,
                local_ref,
                remote_url,
            })
        }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NoticeLevel;

    fn image(name: &str, size: u64) -> PendingFile {
        PendingFile {
            name: name.to_owned(),
            size,
            media_type: "image/png".to_owned(),
            local_path: PathBuf::from(format!("/tmp/{name}")),
        }
    }

    #[tokio::test]
    async fn oversized_files_are_rejected_and_rest_uploaded() {
        let mut queue = UploadQueue::new();
        queue
            .upload_batch(vec![image("a.png", 10), image("big.png", MAX_FILE_SIZE + 1)], |f| async move {
                Ok(format!("https://cdn/{}", f.name))
            })
            .await;

        assert!(!queue.is_busy());
        let attachments = queue.take_attachments();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].remote_url, "https://cdn/a.png");
        assert_eq!(attachments[0].local_ref, "/tmp/a.png");

        let notices = queue.take_notices();
        assert_eq!(notices.len(), 2);
        assert!(matches!(&notices[0], Notice::Toast { level: NoticeLevel::Error, text } if text.contains("big.png")));
        assert!(matches!(&notices[1], Notice::Toast { level: NoticeLevel::Success, .. }));
    }

    #[tokio::test]
    async fn one_failure_discards_the_batch() {
        let mut queue = UploadQueue::new();
        queue
            .upload_batch(vec![image("ok.png", 1), image("bad.png", 1)], |f| async move {
                if f.name == "bad.png" {
                    Err(UploadError::Failed { name: f.name, reason: "500".into() })
                } else {
                    Ok("https://cdn/ok".into())
                }
            })
            .await;

        assert!(!queue.is_busy());
        assert!(queue.attachments().is_empty());
        assert_eq!(queue.take_notices(), vec![Notice::error("Upload failed")]);
    }

    #[test]
    fn begin_is_refused_while_busy() {
        let mut queue = UploadQueue::new();
        assert!(queue.begin(vec![image("a.png", 1)]).is_some());
        assert!(queue.is_busy());
        assert!(queue.begin(vec![image("b.png", 1)]).is_none());
        queue.finish(Ok(Vec::new()));
        assert!(!queue.is_busy());
    }

    #[test]
    fn non_images_are_skipped() {
        let mut queue = UploadQueue::new();
        let doc = PendingFile { media_type: "application/pdf".into(), ..image("a.pdf", 1) };
        assert!(queue.begin(vec![doc]).is_none());
        assert!(!queue.is_busy());
    }

    #[test]
    fn media_type_from_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("shot.JPG");
        std::fs::write(&path, b"jpeg").unwrap();
        let file = PendingFile::from_path(&path).unwrap();
        assert_eq!(file.media_type, "image/jpeg");
        assert_eq!(file.size, 4);
        assert_eq!(file.name, "shot.JPG");
    }
}
