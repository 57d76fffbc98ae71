//! Prompt loading and the coordinate prompt.

use std::path::Path;

/// Read a prompt file, trimmed.
///
/// A missing, unreadable or blank file yields `None` with a warning; the
/// caller skips the stage that needed it.
pub fn load_prompt_from_file(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let text = text.trim();
            if text.is_empty() {
                tracing::warn!("Prompt file {} is empty", path.display());
                None
            } else {
                Some(text.to_string())
            }
        }
        Err(e) => {
            tracing::warn!("Could not read prompt file {}: {}", path.display(), e);
            None
        }
    }
}

/// Pick a caller-supplied prompt over the file one.
pub fn resolve_prompt(explicit: Option<&str>, file: &Path) -> Option<String> {
    match explicit.map(str::trim).filter(|p| !p.is_empty()) {
        Some(prompt) => Some(prompt.to_string()),
        None => load_prompt_from_file(file),
    }
}

/// Prompt asking an image model for the main character's pixel position.
pub fn locate_prompt(description: &str) -> String {
    format!(
        "Based on this description of the main character: \"{description}\"\n\n\
         Please identify the main character in this image and provide their X and Y \
         coordinates in JSON format: {{\"x\": <number>, \"y\": <number>}}.\n\n\
         Coordinates should be pixel positions where (0, 0) is the top-left corner. \
         X increases to the right, Y increases downward.\n\n\
         Provide only the JSON with x and y coordinates."
    )
}
