use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutParseError {
    #[error(
        "layout text could not be read\nJSON: {json_error}\nrelaxed: {relaxed_error}\npreview: {preview}\nlength: {length}"
    )]
    Unreadable {
        json_error: String,
        relaxed_error: String,
        /// First characters of the trimmed input with control characters escaped.
        preview: String,
        /// Length of the trimmed input, in characters.
        length: usize,
    },

    #[error("layout root must be an array of rows (found {found})")]
    NotAnArray { found: &'static str },
}
