//! Prompt texts for the two answering schemes.

/// Chain-of-thought prompt for direct coordinate answers. The output format
/// matches what [`ResponseResolver`](crate::grounding::response::ResponseResolver)
/// looks for first.
pub fn grounding_prompt(instruction: &str) -> String {
    format!(
        "You are an expert at analysing user-interface screenshots.\n\
         Locate the UI element that the instruction below refers to.\n\n\
         ### Steps\n\
         1. Layout: look at the components on the screen and where they sit relative to each other.\n\
         2. Target: pick the element (button, icon, input field, …) that best matches the instruction \"{instruction}\".\n\
         3. Coordinates: give its bounding box [xmin, ymin, xmax, ymax] as fractions of the image width and height, every value between 0 and 1.\n\n\
         ### Output format\n\
         Thought: <your reasoning>\n\
         BBox: [xmin, ymin, xmax, ymax]\n\n\
         Follow the output format exactly."
    )
}

/// Set-of-mark prompt: the image carries numbered boxes and the model must
/// answer with one of those numbers.
pub fn element_prompt(instruction: &str) -> String {
    format!(
        "I have detected UI elements and marked them with green boxes and ID numbers on this image. \
         Please follow the instruction described as '{instruction}'. \
         Output ONLY the ID number of that element."
    )
}
