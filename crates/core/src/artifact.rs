//! File-backed artifacts and the output directory that holds them.
//!
//! Stages never share in-memory state: each one writes a uniquely named
//! file into the [`ArtifactStore`] and hands the next stage an [`Artifact`]
//! value describing it. [`Artifact::ensure_ready`] is the only check a
//! consumer performs on its input.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

use crate::error::{StageError, StageResult};

/// Maximum length of the human-readable slug embedded in file names.
pub const MAX_SLUG_CHARS: usize = 30;

static UNSAFE_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9 _-]").expect("valid regex"));

// ---------------------------------------------------------------------------
// Artifact hand-off types
// ---------------------------------------------------------------------------

/// What a file produced by a stage contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Script,
    Voice,
    Animation,
    MergedVideo,
}

impl ArtifactKind {
    /// File-name prefix for artifacts of this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Voice => "voice",
            Self::Animation => "animation",
            Self::MergedVideo => "video",
        }
    }
}

/// Optional facts a stage learned about the file it wrote.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArtifactMetadata {
    pub duration_secs: Option<f64>,
    pub size_bytes: Option<u64>,
}

/// A file produced by one stage and consumed by the next.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub metadata: ArtifactMetadata,
}

impl Artifact {
    pub fn new(kind: ArtifactKind, path: PathBuf) -> Self {
        Self {
            kind,
            path,
            metadata: ArtifactMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: ArtifactMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// File name component of [`Artifact::path`].
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Verify this artifact is of the `expected` kind and that its file
    /// exists and is non-empty.
    pub async fn ensure_ready(&self, expected: ArtifactKind) -> StageResult<()> {
        if self.kind != expected {
            return Err(StageError::Validation(format!(
                "expected a {expected:?} artifact, got {:?}",
                self.kind
            )));
        }
        let meta = tokio::fs::metadata(&self.path)
            .await
            .map_err(|e| StageError::io(&self.path, e))?;
        if !meta.is_file() || meta.len() == 0 {
            return Err(StageError::Validation(format!(
                "{} is empty or not a regular file",
                self.path.display()
            )));
        }
        Ok(())
    }

    /// Read the file as UTF-8 text.
    pub async fn read_text(&self) -> StageResult<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| StageError::io(&self.path, e))
    }
}

// ---------------------------------------------------------------------------
// Directory listing entries
// ---------------------------------------------------------------------------

/// One file in the output directory.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactEntry {
    pub name: String,
    pub size_bytes: u64,
    pub modified: Option<DateTime<Utc>>,
    pub extension: String,
}

// ---------------------------------------------------------------------------
// ArtifactStore
// ---------------------------------------------------------------------------

/// The directory all artifacts live in.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> StageResult<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StageError::io(&self.root, e))
    }

    /// Build a unique file name of the form
    /// `<prefix>_<slug>_<qualifier>_<timestamp>_<id>.<ext>`.
    pub fn unique_name(prefix: &str, source: &str, qualifier: &str, ext: &str) -> String {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let id = uuid::Uuid::new_v4().simple().to_string();
        let mut parts = vec![prefix.to_string()];
        let slug = slugify(source);
        if !slug.is_empty() {
            parts.push(slug);
        }
        if !qualifier.is_empty() {
            parts.push(qualifier.to_string());
        }
        parts.push(timestamp.to_string());
        parts.push(id[..8].to_string());
        format!("{}.{ext}", parts.join("_"))
    }

    /// Write `bytes` to a fresh uniquely named file and return its path.
    pub async fn write(
        &self,
        kind: ArtifactKind,
        source: &str,
        qualifier: &str,
        ext: &str,
        bytes: &[u8],
    ) -> StageResult<PathBuf> {
        self.write_prefixed(kind.prefix(), source, qualifier, ext, bytes)
            .await
    }

    /// Like [`ArtifactStore::write`] with an explicit file-name prefix.
    pub async fn write_prefixed(
        &self,
        prefix: &str,
        source: &str,
        qualifier: &str,
        ext: &str,
        bytes: &[u8],
    ) -> StageResult<PathBuf> {
        self.ensure_dir().await?;
        let path = self
            .root
            .join(Self::unique_name(prefix, source, qualifier, ext));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StageError::io(&path, e))?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Artifact written");
        Ok(path)
    }

    /// Reserve a unique path without writing anything (for tools that
    /// create the file themselves).
    pub async fn reserve(
        &self,
        kind: ArtifactKind,
        source: &str,
        qualifier: &str,
        ext: &str,
    ) -> StageResult<PathBuf> {
        self.ensure_dir().await?;
        Ok(self
            .root
            .join(Self::unique_name(kind.prefix(), source, qualifier, ext)))
    }

    /// Enumerate regular files in the directory, sorted by name.
    pub async fn list(&self) -> StageResult<Vec<ArtifactEntry>> {
        self.ensure_dir().await?;
        let mut dir = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| StageError::io(&self.root, e))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| StageError::io(&self.root, e))?
        {
            let meta = match entry.metadata().await {
                Ok(m) if m.is_file() => m,
                _ => continue,
            };
            let path = entry.path();
            entries.push(ArtifactEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                size_bytes: meta.len(),
                modified: meta.modified().ok().map(DateTime::<Utc>::from),
                extension: path
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "unknown".to_string()),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Resolve `file_name` to an existing file inside the directory.
    ///
    /// Rejects anything that is not a single plain path component, and
    /// anything whose canonical location (after following symlinks) is
    /// outside the directory.
    pub async fn resolve(&self, file_name: &str) -> StageResult<PathBuf> {
        validate_file_name(file_name)?;
        let candidate = self.root.join(file_name);

        let canonical_root = tokio::fs::canonicalize(&self.root)
            .await
            .map_err(|e| StageError::io(&self.root, e))?;
        let canonical = tokio::fs::canonicalize(&candidate)
            .await
            .map_err(|e| StageError::io(Path::new(file_name), e))?;

        if !canonical.starts_with(&canonical_root) {
            return Err(StageError::InvalidPath(file_name.to_string()));
        }
        if !canonical.is_file() {
            return Err(StageError::NotFound(file_name.to_string()));
        }
        Ok(canonical)
    }

    /// Delete one file from the directory.
    pub async fn delete(&self, file_name: &str) -> StageResult<()> {
        let path = self.resolve(file_name).await?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| StageError::io(&path, e))?;
        tracing::info!(file = file_name, "Artifact deleted");
        Ok(())
    }
}

/// Accept only a single, normal, non-hidden path component.
pub fn validate_file_name(file_name: &str) -> StageResult<()> {
    let invalid = || StageError::InvalidPath(file_name.to_string());

    if file_name.is_empty()
        || file_name.starts_with('.')
        || file_name.contains('/')
        || file_name.contains('\\')
        || file_name.contains('\0')
    {
        return Err(invalid());
    }

    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(invalid()),
    }
}

/// Reduce arbitrary text to a short file-name-safe slug.
pub fn slugify(source: &str) -> String {
    let cleaned = UNSAFE_SLUG_CHARS.replace_all(source, "");
    cleaned
        .trim()
        .replace(' ', "_")
        .chars()
        .take(MAX_SLUG_CHARS)
        .collect::<String>()
        .trim_end_matches('_')
        .to_string()
}
