//! Multipart parsing and validation for banner uploads

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use chrono::{DateTime, NaiveDate};
use marquee_core::models::{BannerMetadata, MAX_ALT_CHARS, MAX_TITLE_CHARS};
use marquee_core::AppError;
use tokio::io::AsyncWriteExt;

use crate::constants::BANNER_FIELD;
use crate::services::BufferedUpload;
use crate::state::UploadConfig;

const DEFAULT_CONTENT_TYPE: &str = "image/png";

/// A parsed upload form: the spooled file plus its display fields
#[derive(Debug)]
pub struct BannerUploadForm {
    pub upload: BufferedUpload,
    pub metadata: BannerMetadata,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err))
    }
}

/// Read the upload form, streaming the `banner` file into a temporary file.
///
/// Only one `banner` field is accepted. Unknown fields are ignored.
pub async fn read_banner_form(
    mut multipart: Multipart,
    config: &UploadConfig,
) -> Result<BannerUploadForm, AppError> {
    let mut upload: Option<BufferedUpload> = None;
    let mut title = None;
    let mut alt = None;
    let mut start_date = None;
    let mut end_date = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            BANNER_FIELD => {
                if upload.is_some() {
                    return Err(AppError::InvalidInput(format!(
                        "Multiple '{}' fields are not allowed",
                        BANNER_FIELD
                    )));
                }

                let content_type = field
                    .content_type()
                    .map(normalize_mime_type)
                    .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
                validate_content_type(&content_type, &config.allowed_content_types)?;

                let filename = field.file_name().map(sanitize_filename).transpose()?;
                let buffered =
                    BufferedUpload::create_in(&config.temp_dir, filename, Some(content_type))?;
                let mut writer = buffered.writer()?;

                let mut size = 0usize;
                while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                    size += chunk.len();
                    validate_file_size(size, config.max_file_size_bytes)?;
                    writer.write_all(&chunk).await?;
                }
                writer.flush().await?;

                if size == 0 {
                    return Err(AppError::InvalidInput("Uploaded file is empty".to_string()));
                }
                upload = Some(buffered);
            }
            "title" => title = Some(field.text().await.map_err(multipart_error)?),
            "alt" => alt = Some(field.text().await.map_err(multipart_error)?),
            "startDate" => start_date = Some(field.text().await.map_err(multipart_error)?),
            "endDate" => end_date = Some(field.text().await.map_err(multipart_error)?),
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    let upload = upload.ok_or_else(|| {
        AppError::InvalidInput(format!("No file uploaded (field '{}')", BANNER_FIELD))
    })?;
    let metadata = parse_banner_fields(title, alt, start_date.as_deref(), end_date.as_deref())?;

    Ok(BannerUploadForm { upload, metadata })
}

/// Turn raw display fields into metadata; blank strings mean absent
pub fn parse_banner_fields(
    title: Option<String>,
    alt: Option<String>,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<BannerMetadata, AppError> {
    let start_date = parse_optional_date("startDate", start_date)?;
    let end_date = parse_optional_date("endDate", end_date)?;
    validate_date_window(start_date, end_date)?;

    let title = non_blank(title);
    let alt_text = non_blank(alt);
    validate_length("Title", title.as_deref(), MAX_TITLE_CHARS)?;
    validate_length("Alt text", alt_text.as_deref(), MAX_ALT_CHARS)?;

    Ok(BannerMetadata {
        title,
        alt_text,
        start_date,
        end_date,
    })
}

fn validate_length(label: &str, value: Option<&str>, max_chars: usize) -> Result<(), AppError> {
    if value.is_some_and(|v| v.chars().count() > max_chars) {
        return Err(AppError::InvalidInput(format!(
            "{} must be at most {} characters",
            label, max_chars
        )));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accepts `YYYY-MM-DD`, or an RFC 3339 timestamp whose date part is used
pub fn parse_optional_date(
    field: &str,
    value: Option<&str>,
) -> Result<Option<NaiveDate>, AppError> {
    let value = match value.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(v) => v,
    };

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(timestamp.date_naive()));
    }

    Err(AppError::InvalidInput(format!(
        "{} must be a date in YYYY-MM-DD format, got '{}'",
        field, value
    )))
}

pub fn validate_date_window(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<(), AppError> {
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if end < start {
            return Err(AppError::InvalidInput(format!(
                "endDate ({}) must not be before startDate ({})",
                end, start
            )));
        }
    }
    Ok(())
}

pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} MB",
            max_size / 1024 / 1024
        )));
    }
    Ok(())
}

/// Strip MIME parameters and lowercase ("Image/PNG; q=1" -> "image/png")
fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_lowercase()
}

pub fn validate_content_type(content_type: &str, allowed_types: &[String]) -> Result<(), AppError> {
    let normalized = normalize_mime_type(content_type);
    if !allowed_types.iter().any(|ct| normalized == ct.to_lowercase()) {
        return Err(AppError::InvalidInput(format!(
            "Invalid content type '{}'. Allowed types: {}",
            normalized,
            allowed_types.join(", ")
        )));
    }
    Ok(())
}

/// Reduce a client filename to its last path segment with safe characters.
/// Rejects a bare `..` segment; dots inside a name are kept.
pub fn sanitize_filename(filename: &str) -> Result<String, AppError> {
    const MAX_FILENAME_LENGTH: usize = 255;

    let filename_only = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);

    if filename_only == ".." {
        return Err(AppError::InvalidInput(
            "Filename contains invalid path traversal".to_string(),
        ));
    }

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches('_').is_empty() {
        return Ok("banner".to_string());
    }

    Ok(sanitized)
}
