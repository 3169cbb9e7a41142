//! Image editor trait and utilities.

use crate::edit::types::{EditRequest, EditedImage, EditorKind};
use crate::error::Result;
use async_trait::async_trait;

/// Trait for background-editing providers.
#[async_trait]
pub trait ImageEditor: Send + Sync {
    /// Edits the background of an image per the given request.
    async fn edit(&self, request: &EditRequest) -> Result<EditedImage>;

    /// Returns the kind of this editor.
    fn kind(&self) -> EditorKind;

    /// Returns the name of this editor for display.
    fn name(&self) -> &str {
        match self.kind() {
            EditorKind::Gemini => "Gemini (Google)",
        }
    }

    /// Checks if the provider is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}

/// Extension trait for editors with retry logic.
///
/// The plain [`ImageEditor::edit`] call is single-shot; callers opt into
/// retries explicitly.
#[async_trait]
pub trait ImageEditorExt: ImageEditor {
    /// Edits with automatic retries on transient failures.
    async fn edit_with_retries(
        &self,
        request: &EditRequest,
        max_retries: u32,
    ) -> Result<EditedImage> {
        let mut last_error = None;

        for attempt in 0..=max_retries {
            match self.edit(request).await {
                Ok(image) => return Ok(image),
                Err(e) if e.is_retryable() && attempt < max_retries => {
                    let delay = e.retry_after().unwrap_or(std::time::Duration::from_secs(1));
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries,
                        delay_ms = delay.as_millis(),
                        "retrying after transient error: {e}"
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.expect("should have error after retries"))
    }
}

impl<T: ImageEditor + ?Sized> ImageEditorExt for T {}
