//! Instruction assembly for background edits.
//!
//! Each mode maps to one fixed text instruction sent alongside the inline
//! image parts. Every instruction pins the foreground subject so the model
//! edits only the background.

use crate::edit::types::{EditMode, EditRequest};

const KEEP_SUBJECT: &str = "Keep the foreground subject exactly as it is: same identity, pose, \
     clothing, colors, and lighting. Preserve fine edge detail such as hair, \
     fur, and semi-transparent areas. Do not add, remove, or restyle anything \
     on the subject itself.";

/// Builds the text instruction for a validated request.
pub(crate) fn instruction_for(request: &EditRequest) -> String {
    match request.mode {
        EditMode::Remove => format!(
            "Remove the background from this photo entirely and replace it \
             with a clean, uniform, pure white studio backdrop. {KEEP_SUBJECT}"
        ),
        EditMode::Replace => {
            let backdrop = request
                .backdrop_prompt
                .as_deref()
                .unwrap_or_default()
                .trim();
            format!(
                "Replace the background of this photo with the following scene: \
                 {backdrop}. Blend the subject naturally into the new backdrop, \
                 matching its light direction, color temperature, and depth of \
                 field. {KEEP_SUBJECT}"
            )
        }
        EditMode::Composite => format!(
            "Two images are provided. Take the foreground subject from the \
             first image and place it onto the backdrop shown in the second \
             image. Match the backdrop's perspective, light direction, and \
             color temperature so the result looks like a single photograph. \
             {KEEP_SUBJECT}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[test]
    fn test_remove_instruction() {
        let request = EditRequest::new(PNG_MAGIC.to_vec(), EditMode::Remove);
        let text = instruction_for(&request);
        assert!(text.contains("white studio backdrop"));
        assert!(text.contains("Keep the foreground subject"));
    }

    #[test]
    fn test_replace_instruction_embeds_prompt() {
        let request = EditRequest::new(PNG_MAGIC.to_vec(), EditMode::Replace)
            .with_backdrop_prompt("  a neon-lit Tokyo alley at night  ");
        let text = instruction_for(&request);
        assert!(text.contains("a neon-lit Tokyo alley at night"));
        // The user text is trimmed before interpolation
        assert!(!text.contains("  a neon-lit"));
    }

    #[test]
    fn test_composite_instruction_references_both_images() {
        let request = EditRequest::new(PNG_MAGIC.to_vec(), EditMode::Composite)
            .with_reference_image(PNG_MAGIC.to_vec());
        let text = instruction_for(&request);
        assert!(text.contains("Two images are provided"));
        assert!(text.contains("second image"));
    }

    #[test]
    fn test_all_instructions_pin_the_subject() {
        let remove = EditRequest::new(PNG_MAGIC.to_vec(), EditMode::Remove);
        let replace = EditRequest::new(PNG_MAGIC.to_vec(), EditMode::Replace)
            .with_backdrop_prompt("a beach");
        let composite = EditRequest::new(PNG_MAGIC.to_vec(), EditMode::Composite)
            .with_reference_image(PNG_MAGIC.to_vec());

        for request in [&remove, &replace, &composite] {
            assert!(instruction_for(request).contains(KEEP_SUBJECT));
        }
    }
}
