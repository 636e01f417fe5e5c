use std::path::{Path, PathBuf};

use thiserror::Error;

/// Where and how a finished plan is exported
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Directory receiving the PDF (and preview)
    pub output_dir: PathBuf,
    /// Directory backing the snapshot store
    pub store_dir: PathBuf,
    /// Also write a PNG preview next to the PDF
    pub preview: bool,
    /// Preview resolution in pixels per millimetre
    pub preview_scale: f32,
    /// Font used for preview text; without it the preview shows bands only
    pub font_path: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            store_dir: PathBuf::from(Self::DEFAULT_STORE_DIR),
            preview: false,
            preview_scale: Self::DEFAULT_PREVIEW_SCALE,
            font_path: None,
        }
    }
}

impl ExportConfig {
    pub const DEFAULT_STORE_DIR: &'static str = ".safety-plan";
    pub const DEFAULT_PREVIEW_SCALE: f32 = 4.0;
    pub const MIN_PREVIEW_SCALE: f32 = 1.0;
    pub const MAX_PREVIEW_SCALE: f32 = 12.0;

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_store_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.store_dir = dir.into();
        self
    }

    pub fn with_preview(mut self, scale: f32, font_path: Option<PathBuf>) -> Self {
        self.preview = true;
        self.preview_scale = Self::sanitize_preview_scale(scale);
        self.font_path = font_path;
        self
    }

    pub fn sanitize_preview_scale(value: f32) -> f32 {
        if value.is_nan() {
            return Self::DEFAULT_PREVIEW_SCALE;
        }
        value.clamp(Self::MIN_PREVIEW_SCALE, Self::MAX_PREVIEW_SCALE)
    }

    /// Checks the paths before anything is written
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_directory(&self.output_dir)?;
        check_directory(&self.store_dir)?;

        if let Some(font) = &self.font_path {
            if !font.is_file() {
                return Err(ConfigError::FontMissing { path: font.clone() });
            }
        }

        let sanitized = Self::sanitize_preview_scale(self.preview_scale);
        if sanitized != self.preview_scale {
            return Err(ConfigError::PreviewScaleOutOfRange {
                value: self.preview_scale,
                min: Self::MIN_PREVIEW_SCALE,
                max: Self::MAX_PREVIEW_SCALE,
            });
        }

        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{path} exists but is not a directory")]
    NotADirectory { path: PathBuf },
    #[error("Preview font {path} does not exist")]
    FontMissing { path: PathBuf },
    #[error("Preview scale {value} is outside {min}..={max} px/mm")]
    PreviewScaleOutOfRange { value: f32, min: f32, max: f32 },
}

// Missing directories are fine, they are created on export.
fn check_directory(path: &Path) -> Result<(), ConfigError> {
    if path.exists() && !path.is_dir() {
        return Err(ConfigError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}
