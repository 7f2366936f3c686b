use std::io;
use std::path::Path;

use marquee_core::models::UploadDescriptor;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

const DEFAULT_FILENAME: &str = "banner.png";
const DEFAULT_MIME_TYPE: &str = "image/png";

/// An incoming upload spooled to a temporary file.
///
/// The file is unlinked when this value is dropped, whichever way the
/// ingestion that owns it ends.
#[derive(Debug)]
pub struct BufferedUpload {
    file: NamedTempFile,
    filename: Option<String>,
    mime_type: Option<String>,
}

impl BufferedUpload {
    pub fn create_in(
        dir: &Path,
        filename: Option<String>,
        mime_type: Option<String>,
    ) -> io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("marquee-upload-")
            .tempfile_in(dir)?;
        Ok(Self {
            file,
            filename,
            mime_type,
        })
    }

    /// Buffer an in-memory payload, mostly useful in tests
    pub async fn from_bytes(
        dir: &Path,
        filename: Option<String>,
        mime_type: Option<String>,
        data: &[u8],
    ) -> io::Result<Self> {
        let upload = Self::create_in(dir, filename, mime_type)?;
        let mut writer = upload.writer()?;
        writer.write_all(data).await?;
        writer.flush().await?;
        Ok(upload)
    }

    /// Async handle for appending to the buffered file
    pub fn writer(&self) -> io::Result<tokio::fs::File> {
        Ok(tokio::fs::File::from_std(self.file.as_file().try_clone()?))
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Filename and MIME type as declared by the client, with defaults
    /// applied, plus the size actually on disk
    pub async fn inspect(&self) -> io::Result<UploadDescriptor> {
        let size_bytes = tokio::fs::metadata(self.path()).await?.len();
        Ok(UploadDescriptor {
            filename: self
                .filename
                .clone()
                .unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
            mime_type: self
                .mime_type
                .clone()
                .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
            size_bytes,
        })
    }
}
