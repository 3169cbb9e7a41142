//! Background replacement demo - paints a backdrop described in text.
//!
//! Run with: `cargo run --example replace_background -- <photo.png> "a beach at sunset"`
//!
//! Requires `GOOGLE_API_KEY` (or `GEMINI_API_KEY`) in the environment.

use backdrop::{EditMode, EditRequest, GeminiEditor, ImageEditor};

#[tokio::main]
async fn main() -> backdrop::Result<()> {
    let mut args = std::env::args().skip(1);
    let input_path = args
        .next()
        .expect("Usage: replace_background <photo.png> <backdrop description>");
    let backdrop_text = args
        .next()
        .expect("Usage: replace_background <photo.png> <backdrop description>");

    let photo = std::fs::read(&input_path)?;

    let editor = GeminiEditor::builder().build()?;

    let request = EditRequest::new(photo, EditMode::Replace).with_backdrop_prompt(backdrop_text);

    let edited = editor.edit(&request).await?;
    edited.save("replaced.png")?;
    println!(
        "Edited image saved to replaced.png ({} bytes)",
        edited.size()
    );

    Ok(())
}
