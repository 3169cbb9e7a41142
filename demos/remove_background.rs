//! Background removal demo - puts the subject on a plain white backdrop.
//!
//! Run with: `cargo run --example remove_background -- <photo.png>`
//!
//! Requires `GOOGLE_API_KEY` (or `GEMINI_API_KEY`) in the environment.

use backdrop::{EditMode, EditRequest, GeminiEditor, ImageEditor};

#[tokio::main]
async fn main() -> backdrop::Result<()> {
    let input_path = std::env::args()
        .nth(1)
        .expect("Usage: remove_background <photo.png>");

    let photo = std::fs::read(&input_path)?;

    let editor = GeminiEditor::builder().build()?;

    let request = EditRequest::new(photo, EditMode::Remove);

    let edited = editor.edit(&request).await?;
    edited.save("removed.png")?;
    println!("Edited image saved to removed.png ({} bytes)", edited.size());

    Ok(())
}
