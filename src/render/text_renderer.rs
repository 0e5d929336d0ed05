//! Implementation of the `Renderer` trait.
//!
//! Text is funnelled through a greedy [`LineWrapper`], which measures words
//! in display cells (East Asian wide characters count as two) and owns the
//! blank-line bookkeeping.

use super::Renderer;
use std::iter::repeat;
use unicode_width::UnicodeWidthStr;

/// Default width of the rendered text, in character cells.
pub const DEFAULT_WIDTH: usize = 78;

/// Accumulates whitespace-delimited words into lines no wider than
/// `width` cells.
///
/// A word which alone is wider than the line is never split; it is put on
/// a line of its own.
#[derive(Debug, Clone)]
pub struct LineWrapper {
    width: usize,
    /// Width of the current line so far.
    col: usize,
    /// Newlines emitted since the last word.
    newlines: usize,
    /// Spaces owed before the next word on this line (0 or 1).
    pending_space: usize,
    /// Whether anything has been written yet.
    printed: bool,
}

impl LineWrapper {
    /// Create a wrapper for lines of `width` cells.
    pub fn new(width: usize) -> LineWrapper {
        LineWrapper {
            width,
            col: 0,
            newlines: 0,
            pending_space: 0,
            printed: false,
        }
    }

    /// The wrapping width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Append the words of `text` to `out`, separated by single spaces and
    /// wrapped at the configured width.
    pub fn write(&mut self, out: &mut String, text: &str) {
        html_trace_quiet!("LineWrapper::write({:?}), col={}", text, self.col);
        if self.col == 0 && self.printed {
            // blank line before new paragraph
            self.flush(out);
        }

        self.printed = true;
        self.newlines = 0;

        for word in text.split_whitespace() {
            let w = UnicodeWidthStr::width(word);
            // wrap if line is too long
            if self.col > 0 && self.col + self.pending_space + w > self.width {
                out.push('\n');
                self.col = 0;
                self.pending_space = 0;
            }
            out.extend(repeat(' ').take(self.pending_space));
            out.push_str(word);
            self.col += self.pending_space + w;
            self.pending_space = 1;
        }
    }

    /// End the current line.
    pub fn flush(&mut self, out: &mut String) {
        self.flush_n(out, 1);
    }

    /// Make sure the output ends with `n` newlines, counting the ones
    /// already emitted since the last word.
    pub fn flush_n(&mut self, out: &mut String, n: usize) {
        if self.col == 0 && self.newlines >= n {
            return;
        }

        let n = n.saturating_sub(self.newlines);
        if n < 1 {
            return;
        }

        out.extend(repeat('\n').take(n));

        self.pending_space = 0;
        self.col = 0;
        self.newlines += n;
    }
}

/// A renderer which writes wrapped plain text into a `String`.
#[derive(Debug, Clone)]
pub struct TextRenderer {
    text: String,
    wrapper: LineWrapper,
}

impl TextRenderer {
    /// Construct a new empty TextRenderer.
    pub fn new(width: usize) -> TextRenderer {
        html_trace!("new({})", width);
        TextRenderer {
            text: String::new(),
            wrapper: LineWrapper::new(width),
        }
    }
}

impl Renderer for TextRenderer {
    fn new_sub_renderer(&self) -> Self {
        TextRenderer::new(self.wrapper.width())
    }

    fn add_inline_text(&mut self, text: &str) {
        self.wrapper.write(&mut self.text, text);
    }

    fn new_line(&mut self) {
        self.wrapper.flush(&mut self.text);
    }

    fn add_empty_line(&mut self) {
        self.wrapper.flush_n(&mut self.text, 2);
    }

    fn add_raw_text(&mut self, text: &str) {
        self.wrapper.flush(&mut self.text);
        self.text.push_str(text);
    }

    fn into_string(self) -> String {
        self.text
    }
}
