pub mod outputs;
pub mod script;
pub mod video;
pub mod voice;

use std::path::Path;

use autoreel_core::artifact::{Artifact, ArtifactKind, ArtifactStore};

use crate::error::{AppError, AppResult};

/// Accepted extensions for uploaded scripts.
pub const SCRIPT_EXTENSIONS: &[&str] = &["txt", "md"];

/// File-name prefix of uploaded scripts.
pub const UPLOADED_SCRIPT_PREFIX: &str = "upload";

/// A file field read from a multipart body.
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Validate an uploaded script and store it under a unique name.
pub async fn save_uploaded_script(store: &ArtifactStore, file: &UploadedFile) -> AppResult<Artifact> {
    let path = Path::new(&file.filename);
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if !SCRIPT_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Unsupported script format '.{ext}'. Supported: .txt, .md"
        )));
    }

    let text = std::str::from_utf8(&file.data)
        .map_err(|_| AppError::BadRequest("Script file must be UTF-8 text".into()))?;
    if text.trim().is_empty() {
        return Err(AppError::BadRequest("Script file is empty".into()));
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let saved = store
        .write_prefixed(UPLOADED_SCRIPT_PREFIX, &stem, "", &ext, text.as_bytes())
        .await?;
    tracing::info!(path = %saved.display(), original = %file.filename, "Script uploaded");

    Ok(Artifact::new(ArtifactKind::Script, saved))
}
