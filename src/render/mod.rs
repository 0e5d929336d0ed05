//! Module containing the `Renderer` interface for constructing the
//! plain text output.

pub mod table;
pub mod text_renderer;

/// A type which is a backend for HTML to text rendering.
pub trait Renderer {
    /// Create an empty renderer with the same width, used to pre-render a
    /// subtree in isolation.
    fn new_sub_renderer(&self) -> Self;

    /// Add some inline text, which is split into words and wrapped at the
    /// renderer's width.
    fn add_inline_text(&mut self, text: &str);

    /// End the current line (if anything is pending on it).
    fn new_line(&mut self);

    /// End the current line and leave one blank line, without compounding
    /// any newlines already emitted.
    fn add_empty_line(&mut self);

    /// End the current line and append `text` verbatim, bypassing the
    /// wrapping.
    fn add_raw_text(&mut self, text: &str);

    /// Consume the renderer, returning the text produced so far.
    fn into_string(self) -> String;
}
