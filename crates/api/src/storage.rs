//! On-disk storage for uploaded CSV files and upload chunks.
//!
//! Layout:
//!
//! ```text
//! <upload_dir>/<token>_<name>.csv          direct uploads and assembled files
//! <chunk_dir>/<uploadId>/chunk_<index>     received chunks
//! <chunk_dir>/.incoming-<uuid>             chunk body still being received
//! ```
//!
//! Every client-supplied name is checked by `catalog_core::uploads` before
//! it is joined onto a directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use axum::extract::multipart::Field;
use catalog_core::uploads::{
    chunk_file_name, sanitize_file_name, unique_file_name, validate_upload_id,
};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, AppResult};

/// Stored name used when an upload arrives without a file name.
const FALLBACK_FILE_NAME: &str = "upload.csv";

/// Upload and chunk directories. Cheap to clone.
#[derive(Debug, Clone)]
pub struct UploadStorage {
    upload_dir: PathBuf,
    chunk_dir: PathBuf,
}

impl UploadStorage {
    pub fn new(upload_dir: impl Into<PathBuf>, chunk_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            chunk_dir: chunk_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn chunk_dir(&self) -> &Path {
        &self.chunk_dir
    }

    /// Create both directories if they do not exist yet.
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.upload_dir).await?;
        fs::create_dir_all(&self.chunk_dir).await
    }

    /// Collision-free destination for a directly uploaded file.
    pub fn new_upload_path(&self, client_name: Option<&str>) -> AppResult<PathBuf> {
        let name = match client_name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(raw) => sanitize_file_name(raw)?,
            None => FALLBACK_FILE_NAME.to_string(),
        };
        Ok(self
            .upload_dir
            .join(unique_file_name(&uuid::Uuid::new_v4(), &name)))
    }

    /// Scratch path for a chunk body whose `uploadId`/`index` may not have
    /// been read yet.
    pub fn staging_path(&self) -> PathBuf {
        self.chunk_dir
            .join(format!(".incoming-{}", uuid::Uuid::new_v4().simple()))
    }

    /// Directory holding the chunks of one upload.
    pub fn chunk_upload_dir(&self, upload_id: &str) -> AppResult<PathBuf> {
        validate_upload_id(upload_id)?;
        Ok(self.chunk_dir.join(upload_id))
    }

    /// Move a staged chunk body into place as `chunk_<index>`, replacing
    /// an earlier copy of the same index.
    pub async fn commit_chunk(
        &self,
        staged: &Path,
        upload_id: &str,
        index: u32,
    ) -> AppResult<PathBuf> {
        let dir = self.chunk_upload_dir(upload_id)?;
        fs::create_dir_all(&dir).await?;
        let dest = dir.join(chunk_file_name(index));
        fs::rename(staged, &dest).await?;
        Ok(dest)
    }

    /// Remove a file, ignoring one that is already gone.
    pub async fn discard(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path).await {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove file");
            }
        }
    }

    /// Concatenate the chunks of `upload_id` into one file in the upload
    /// directory and remove the chunk directory.
    ///
    /// Chunks are read in index order from 0 and assembly stops at the
    /// first missing index. With `overwrite` the result replaces
    /// `<upload_dir>/<file_name>`; otherwise it gets a collision-free name.
    pub async fn assemble(
        &self,
        upload_id: &str,
        file_name: &str,
        overwrite: bool,
    ) -> AppResult<PathBuf> {
        let dir = self.chunk_upload_dir(upload_id)?;
        let file_name = sanitize_file_name(file_name)?;

        if !fs::try_exists(dir.join(chunk_file_name(0))).await? {
            return Err(AppError::BadRequest(format!(
                "No chunks received for upload '{upload_id}'"
            )));
        }

        let dest = if overwrite {
            self.upload_dir.join(&file_name)
        } else {
            self.upload_dir
                .join(unique_file_name(&uuid::Uuid::new_v4(), &file_name))
        };

        // Assemble beside the destination, then rename over it so readers
        // never see a half-written file.
        let partial = self
            .upload_dir
            .join(format!(".assembling-{}", uuid::Uuid::new_v4().simple()));
        let chunks = match concat_chunks(&dir, &partial).await {
            Ok(chunks) => chunks,
            Err(e) => {
                self.discard(&partial).await;
                return Err(e.into());
            }
        };
        if let Err(e) = fs::rename(&partial, &dest).await {
            self.discard(&partial).await;
            return Err(e.into());
        }

        if let Err(e) = fs::remove_dir_all(&dir).await {
            tracing::warn!(upload_id, error = %e, "Failed to remove chunk directory");
        }

        tracing::info!(upload_id, chunks, dest = %dest.display(), "Assembled chunked upload");
        Ok(dest)
    }
}

/// Append `chunk_0`, `chunk_1`, ... from `dir` to a new file at `dest`.
/// Returns the number of chunks written.
async fn concat_chunks(dir: &Path, dest: &Path) -> std::io::Result<u32> {
    let mut out = File::create(dest).await?;
    let mut index = 0u32;
    loop {
        let mut chunk = match File::open(dir.join(chunk_file_name(index))).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => break,
            Err(e) => return Err(e),
        };
        tokio::io::copy(&mut chunk, &mut out).await?;
        index += 1;
    }
    out.flush().await?;
    out.sync_all().await?;
    Ok(index)
}

/// Stream a multipart field to `dest` without buffering the whole body.
///
/// Returns the number of bytes written. A partially written file is
/// removed on error.
pub async fn write_field(mut field: Field<'_>, dest: &Path) -> AppResult<u64> {
    let mut file = File::create(dest).await?;
    let mut written = 0u64;

    let result: AppResult<()> = async {
        while let Some(bytes) = field
            .chunk()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            file.write_all(&bytes).await?;
            written += bytes.len() as u64;
        }
        file.flush().await?;
        Ok(())
    }
    .await;

    if let Err(e) = result {
        drop(file);
        if let Err(rm) = fs::remove_file(dest).await {
            tracing::warn!(path = %dest.display(), error = %rm, "Failed to remove partial upload");
        }
        return Err(e);
    }
    Ok(written)
}
