//! Render HTML as plain text.
//!
//! This crate produces a readable plain text fallback for an HTML document,
//! such as the text part of a multipart email.  Text is wrapped at 78
//! columns (wide characters count double), headings are underlined, links
//! are followed by their target in parentheses and tables can optionally be
//! drawn as ASCII boxes.
//!
//! # Examples
//!
//! ```rust
//! # use html2plain::from_read;
//! let html = b"
//!        <h1>Hi</h1>
//!        <p>Some <b>bold</b> text.</p>";
//! assert_eq!(from_read(&html[..]).unwrap(),
//!            "\
//! **
//! Hi
//! **
//!
//! Some *bold* text.");
//! ```
//!
//! Options are set either directly on [`Options`] or through the builder in
//! [`config`]:
//!
//! ```rust
//! let html = b"<a href=\"https://example.com\">Example</a>";
//! let text = html2plain::config::plain()
//!     .text_only()
//!     .omit_links()
//!     .string_from_read(&html[..])
//!     .unwrap();
//! assert_eq!(text, "Example");
//! ```
//!
//! A simple demonstration program is included as an example:
//!
//! ```sh
//! $ cargo run --example html2plain -- --pretty-tables foo.html
//! [...]
//! ```

#![deny(missing_docs)]

#[macro_use]
mod macros;

pub mod dom;
pub mod render;
mod traverse;

pub use dom::{Element, Node, Tag};
pub use render::table::{Alignment, Borders, TableStyle};
pub use render::text_renderer::DEFAULT_WIDTH;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use markup5ever_rcdom::RcDom;
use regex::Regex;
use render::text_renderer::TextRenderer;
use std::io;
use std::io::Write;
use std::sync::LazyLock;

/// Errors from reading or writing.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The HTML input could not be read.
    #[error("Failed to read HTML input")]
    Parse(#[source] io::Error),
    /// The rendered text could not be written out.
    #[error("Failed to write rendered text")]
    Render(#[source] io::Error),
}

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Rendering options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Draw tables as ASCII boxes instead of running their text together.
    pub pretty_tables: bool,
    /// How pretty tables are drawn; `None` uses [`TableStyle::default()`].
    pub table_style: Option<TableStyle>,
    /// Leave out link targets.  Only effective together with `text_only`.
    pub omit_links: bool,
    /// No bold markers, list bullets or heading dividers.
    pub text_only: bool,
    /// Width to wrap text at, in character cells.
    pub wrap_width: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            pretty_tables: false,
            table_style: None,
            omit_links: false,
            text_only: false,
            wrap_width: DEFAULT_WIDTH,
        }
    }
}

static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\n+").expect("valid blank line regex"));

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Remove a leading UTF-8 byte order mark.
fn strip_bom(input: &[u8]) -> &[u8] {
    input.strip_prefix(UTF8_BOM).unwrap_or(input)
}

/// Reads HTML from `input` and parses it into a [`Node`] tree.
///
/// Any byte sequence is accepted as HTML (invalid UTF-8 is replaced); the
/// only failure is an error reading `input`.
pub fn parse(mut input: impl io::Read) -> Result<Node> {
    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes).map_err(Error::Parse)?;

    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let dom = parse_document(RcDom::default(), opts)
        .from_utf8()
        .read_from(&mut strip_bom(&bytes))
        .map_err(Error::Parse)?;
    Ok(dom::from_rcdom(dom.document.clone()))
}

/// Collapse the raw rendered text: no space after a newline, no more than
/// one blank line in a row, and no surrounding whitespace.
pub(crate) fn normalize(text: &str) -> String {
    let text = text.replace("\n ", "\n");
    BLANK_LINES_RE.replace_all(&text, "\n\n").trim().to_string()
}

/// Render an already parsed document (or any subtree of one) as text.
///
/// Each call is independent, so this may be used from several threads at
/// once.
pub fn from_node(node: &Node, options: &Options) -> String {
    let renderer = TextRenderer::new(options.wrap_width);
    normalize(&traverse::render(node, renderer, options))
}

/// Render `node` and write the text to `out`.
pub fn write_from_node(node: &Node, options: &Options, mut out: impl Write) -> Result<()> {
    out.write_all(from_node(node, options).as_bytes())
        .map_err(Error::Render)
}

/// Reads HTML from `input` and returns it rendered with default options.
pub fn from_read(input: impl io::Read) -> Result<String> {
    from_read_with_options(input, &Options::default())
}

/// Reads HTML from `input` and returns it rendered with `options`.
pub fn from_read_with_options(input: impl io::Read, options: &Options) -> Result<String> {
    let node = parse(input)?;
    Ok(from_node(&node, options))
}

/// Render an HTML string.
pub fn from_string(input: &str, options: &Options) -> Result<String> {
    from_read_with_options(strip_bom(input.as_bytes()), options)
}

pub mod config {
    //! Configure the HTML to text translation using the [`Config`] type,
    //! which can be constructed using one of the functions in this module.

    use super::{from_node, parse, Error, Node, Options, Result, TableStyle};
    use std::io::{Read, Write};

    /// Configure the HTML processing.
    #[derive(Debug, Clone)]
    pub struct Config {
        options: Options,
    }

    impl Config {
        /// The options this configuration renders with.
        pub fn options(&self) -> &Options {
            &self.options
        }

        /// Reads HTML from `input` and returns the rendered text.
        pub fn string_from_read<R: Read>(self, input: R) -> Result<String> {
            let node = parse(input)?;
            Ok(self.string_from_node(&node))
        }

        /// Render an already parsed document.
        pub fn string_from_node(&self, node: &Node) -> String {
            from_node(node, &self.options)
        }

        /// Reads HTML from `input` and writes the rendered text to `out`.
        pub fn write_from_read<R: Read, W: Write>(self, input: R, mut out: W) -> Result<()> {
            let text = self.string_from_read(input)?;
            out.write_all(text.as_bytes()).map_err(Error::Render)
        }

        /// Draw tables as ASCII boxes.
        pub fn pretty_tables(mut self) -> Self {
            self.options.pretty_tables = true;
            self
        }

        /// Draw tables as ASCII boxes in the given style.
        pub fn table_style(mut self, style: TableStyle) -> Self {
            self.options.pretty_tables = true;
            self.options.table_style = Some(style);
            self
        }

        /// Leave out link targets (in combination with `text_only`).
        pub fn omit_links(mut self) -> Self {
            self.options.omit_links = true;
            self
        }

        /// Leave out decoration: bold markers, list bullets and heading
        /// dividers.
        pub fn text_only(mut self) -> Self {
            self.options.text_only = true;
            self
        }

        /// Set the width text is wrapped at.
        pub fn wrap_width(mut self, width: usize) -> Self {
            self.options.wrap_width = width;
            self
        }
    }

    /// Return a Config with the default options.
    pub fn plain() -> Config {
        with_options(Options::default())
    }

    /// Return a Config starting from the given options.
    pub fn with_options(options: Options) -> Config {
        Config { options }
    }
}
