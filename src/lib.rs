#![warn(missing_docs)]
//! Backdrop - AI background editing for photos.
//!
//! Upload a photo, pick one of three background-editing modes, and let the
//! Gemini image API produce the edited result: `remove` strips the background
//! to plain studio white, `replace` paints a backdrop described in text, and
//! `composite` places the subject onto a second, user-supplied backdrop image.
//!
//! # Quick Start
//!
//! ```no_run
//! use backdrop::{EditMode, EditRequest, GeminiEditor, ImageEditor};
//!
//! #[tokio::main]
//! async fn main() -> backdrop::Result<()> {
//!     let editor = GeminiEditor::builder().build()?;
//!
//!     let photo = std::fs::read("photo.jpg")?;
//!     let request = EditRequest::new(photo, EditMode::Replace)
//!         .with_backdrop_prompt("a sunlit pine forest");
//!
//!     let edited = editor.edit(&request).await?;
//!     edited.save("edited.png")?;
//!     Ok(())
//! }
//! ```
//!
//! # Surfaces
//!
//! - The library: [`EditRequest`] in, [`EditedImage`] out, via [`ImageEditor`].
//! - The `backdrop` CLI (feature `cli`): `edit`, `modes`, and `serve`.
//! - The browser UI (feature `web`): an embedded single-page app with upload,
//!   mode selection, preview, and download, served by [`web::serve`].

pub mod edit;
mod error;

#[cfg(feature = "web")]
pub mod web;

pub use edit::providers::{GeminiEditor, GeminiEditorBuilder, GeminiModel};
pub use edit::{
    EditMetadata, EditMode, EditRequest, EditedImage, EditorKind, ImageEditor, ImageEditorExt,
    ImageFormat,
};
pub use error::{BackdropError, Result};
