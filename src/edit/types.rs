//! Core types for background editing.

use crate::error::{BackdropError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format (modern, efficient).
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Attempts to detect format from a MIME type string.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.trim().to_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// Editor provider kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorKind {
    /// Google Gemini image models.
    Gemini,
}

impl std::fmt::Display for EditorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

/// The three background-editing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    /// Strip the background and fill with a plain studio-white backdrop.
    Remove,
    /// Replace the background with a scene described in a text prompt.
    Replace,
    /// Place the subject onto a user-supplied reference backdrop image.
    Composite,
}

impl EditMode {
    /// Stable lowercase name used on the wire and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remove => "remove",
            Self::Replace => "replace",
            Self::Composite => "composite",
        }
    }

    /// Short human description of what the mode needs and does.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Remove => "strip the background, keep the subject on plain white",
            Self::Replace => "describe a new backdrop in text (requires a prompt)",
            Self::Composite => "use a second image as the backdrop (requires a reference image)",
        }
    }

    /// All modes, in display order.
    pub fn all() -> [EditMode; 3] {
        [Self::Remove, Self::Replace, Self::Composite]
    }
}

impl std::fmt::Display for EditMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EditMode {
    type Err = BackdropError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "remove" => Ok(Self::Remove),
            "replace" => Ok(Self::Replace),
            "composite" => Ok(Self::Composite),
            other => Err(BackdropError::InvalidRequest(format!(
                "unknown edit mode '{other}' (expected remove, replace, or composite)"
            ))),
        }
    }
}

/// Metadata about the edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditMetadata {
    /// Model used for the edit.
    pub model: Option<String>,
    /// Edit duration in milliseconds.
    pub duration_ms: Option<u64>,
}

/// A request to edit the background of an image.
#[derive(Debug, Clone)]
pub struct EditRequest {
    /// Raw bytes of the source photo.
    pub image: Vec<u8>,
    /// Which background edit to perform.
    pub mode: EditMode,
    /// Description of the new backdrop. Required by [`EditMode::Replace`].
    pub backdrop_prompt: Option<String>,
    /// Raw bytes of the backdrop image. Required by [`EditMode::Composite`].
    pub reference_image: Option<Vec<u8>>,
}

impl EditRequest {
    /// Creates a new request for the given source image and mode.
    pub fn new(image: Vec<u8>, mode: EditMode) -> Self {
        Self {
            image,
            mode,
            backdrop_prompt: None,
            reference_image: None,
        }
    }

    /// Sets the backdrop description used by [`EditMode::Replace`].
    pub fn with_backdrop_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.backdrop_prompt = Some(prompt.into());
        self
    }

    /// Sets the reference backdrop image used by [`EditMode::Composite`].
    pub fn with_reference_image(mut self, image: Vec<u8>) -> Self {
        self.reference_image = Some(image);
        self
    }

    /// Detected format of the source image, if recognized.
    pub fn source_format(&self) -> Option<ImageFormat> {
        ImageFormat::from_magic_bytes(&self.image)
    }

    /// Detected format of the reference image, if present and recognized.
    pub fn reference_format(&self) -> Option<ImageFormat> {
        self.reference_image
            .as_deref()
            .and_then(ImageFormat::from_magic_bytes)
    }

    /// Checks that the request is internally consistent before any network
    /// call is made.
    ///
    /// Inputs that a mode does not use are rejected rather than silently
    /// ignored, since they signal the caller wanted a different mode.
    pub fn validate(&self) -> Result<()> {
        if self.image.is_empty() {
            return Err(BackdropError::InvalidRequest(
                "source image is empty".into(),
            ));
        }
        if self.source_format().is_none() {
            return Err(BackdropError::InvalidRequest(
                "source image is not a recognized PNG, JPEG, or WebP file".into(),
            ));
        }

        let has_prompt = self
            .backdrop_prompt
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty());

        match self.mode {
            EditMode::Replace => {
                if !has_prompt {
                    return Err(BackdropError::InvalidRequest(
                        "replace mode requires a backdrop description".into(),
                    ));
                }
                if self.reference_image.is_some() {
                    return Err(BackdropError::InvalidRequest(
                        "a reference image is only used by composite mode".into(),
                    ));
                }
            }
            EditMode::Composite => {
                if self.backdrop_prompt.is_some() {
                    return Err(BackdropError::InvalidRequest(
                        "a backdrop description is only used by replace mode".into(),
                    ));
                }
                match self.reference_image.as_deref() {
                    None => {
                        return Err(BackdropError::InvalidRequest(
                            "composite mode requires a reference backdrop image".into(),
                        ));
                    }
                    Some(bytes) if bytes.is_empty() => {
                        return Err(BackdropError::InvalidRequest(
                            "reference image is empty".into(),
                        ));
                    }
                    Some(_) if self.reference_format().is_none() => {
                        return Err(BackdropError::InvalidRequest(
                            "reference image is not a recognized PNG, JPEG, or WebP file".into(),
                        ));
                    }
                    Some(_) => {}
                }
            }
            EditMode::Remove => {
                if self.backdrop_prompt.is_some() {
                    return Err(BackdropError::InvalidRequest(
                        "a backdrop description is only used by replace mode".into(),
                    ));
                }
                if self.reference_image.is_some() {
                    return Err(BackdropError::InvalidRequest(
                        "a reference image is only used by composite mode".into(),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// An edited image with its data and metadata.
#[derive(Debug, Clone)]
#[must_use = "edited image should be saved or processed"]
pub struct EditedImage {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// Image format.
    pub format: ImageFormat,
    /// Provider that produced this image.
    pub provider: EditorKind,
    /// Edit metadata.
    pub metadata: EditMetadata,
}

impl EditedImage {
    /// Creates a new edited image.
    pub fn new(
        data: Vec<u8>,
        format: ImageFormat,
        provider: EditorKind,
        metadata: EditMetadata,
    ) -> Self {
        Self {
            data,
            format,
            provider,
            metadata,
        }
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Saves the image to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }

    /// Encodes the image data as base64.
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Returns the image as a data URL suitable for an `<img src>` or a
    /// download link.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            self.to_base64()
        )
    }
}
