//! Multipart form handling for generation requests.

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use deck_core::ClientData;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{ApiError, Result};

/// Largest accepted logo upload.
pub const MAX_LOGO_BYTES: usize = 5 * 1024 * 1024;

/// Image extensions accepted for logos.
pub const ALLOWED_LOGO_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif", "svg"];

/// A logo staged on disk for one request.
#[derive(Debug)]
pub struct StagedLogo {
    path: PathBuf,
}

impl StagedLogo {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn discard(self) {
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            log::warn!("Failed to remove staged logo {}: {}", self.path.display(), e);
        }
    }
}

/// Fields of a direct generation form.
#[derive(Debug, Default)]
pub struct GenerationForm {
    pub brand_name: String,
    pub industry: String,
    pub target_audience: String,
    pub primary_channels: Vec<String>,
    pub key_regions: Vec<String>,
    pub logo: Option<StagedLogo>,
}

impl GenerationForm {
    /// Consume the form, returning client data and the staged logo.
    pub fn into_parts(self) -> (ClientData, Option<StagedLogo>) {
        let data = ClientData::new(self.brand_name, self.industry, self.target_audience)
            .with_channels(self.primary_channels)
            .with_regions(self.key_regions);
        (data, self.logo)
    }
}

fn bad_multipart(e: MultipartError) -> ApiError {
    ApiError::BadRequest(e.body_text())
}

/// Split list fields that arrive either repeated or comma-separated.
fn push_list(list: &mut Vec<String>, value: &str) {
    list.extend(
        value
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string),
    );
}

/// Read every field of a generation form, staging any logo in `upload_dir`.
///
/// A staged logo is discarded again if a later field fails.
pub async fn read_form(multipart: Multipart, upload_dir: &Path) -> Result<GenerationForm> {
    let mut form = GenerationForm::default();
    match read_fields(&mut form, multipart, upload_dir).await {
        Ok(()) => Ok(form),
        Err(e) => {
            if let Some(logo) = form.logo.take() {
                logo.discard().await;
            }
            Err(e)
        }
    }
}

async fn read_fields(
    form: &mut GenerationForm,
    mut multipart: Multipart,
    upload_dir: &Path,
) -> Result<()> {
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.trim_end_matches("[]") {
            "logo" => {
                if let Some(staged) = stage_logo(field, upload_dir).await? {
                    if let Some(previous) = form.logo.replace(staged) {
                        previous.discard().await;
                    }
                }
            }
            "brandName" => form.brand_name = field.text().await.map_err(bad_multipart)?,
            "industry" => form.industry = field.text().await.map_err(bad_multipart)?,
            "targetAudience" => form.target_audience = field.text().await.map_err(bad_multipart)?,
            "primaryChannels" => {
                let value = field.text().await.map_err(bad_multipart)?;
                push_list(&mut form.primary_channels, &value);
            }
            "keyRegions" => {
                let value = field.text().await.map_err(bad_multipart)?;
                push_list(&mut form.key_regions, &value);
            }
            other => log::debug!("Ignoring unknown form field '{}'", other),
        }
    }
    Ok(())
}

async fn stage_logo(field: Field<'_>, upload_dir: &Path) -> Result<Option<StagedLogo>> {
    let Some(file_name) = field.file_name().map(str::to_string) else {
        return Ok(None);
    };
    if file_name.is_empty() {
        return Ok(None);
    }

    let extension = Path::new(&file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if !ALLOWED_LOGO_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ApiError::BadRequest(
            "Only image files (jpeg, jpg, png, gif, svg) are allowed".to_string(),
        ));
    }

    let bytes = field.bytes().await.map_err(bad_multipart)?;
    if bytes.is_empty() {
        return Ok(None);
    }
    if bytes.len() > MAX_LOGO_BYTES {
        return Err(ApiError::PayloadTooLarge(MAX_LOGO_BYTES));
    }

    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to create upload dir: {}", e)))?;
    let path = upload_dir.join(format!("logo-{}.{}", Uuid::new_v4(), extension));
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to stage logo: {}", e)))?;

    log::debug!("Staged logo '{}' at {}", file_name, path.display());
    Ok(Some(StagedLogo { path }))
}
