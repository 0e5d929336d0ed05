//! The traversal which turns a [`Node`] tree into text.
//!
//! A [`RenderContext`] holds the state of one output buffer and sends
//! everything it produces through [`RenderContext::emit`] to a
//! [`Renderer`].  Inside `<table>` with pretty tables enabled, cells are
//! collected into a [`TableAccumulator`] instead and drawn as a whole when
//! the table closes.
//!
//! The tree is walked by [`render`] with an explicit stack of [`Task`]s
//! rather than by recursion, so document depth is limited only by memory.
//! Subtrees which must be rendered in isolation (heading and bold text,
//! each child of a table cell) get a fresh context which is parked on top
//! of the current one until the subtree is finished.

use crate::dom::{Element, Node, Tag};
use crate::render::table::{render_table, TableStyle};
use crate::render::Renderer;
use crate::Options;
use unicode_width::UnicodeWidthStr;

/// Cells collected while inside one `<table>`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct TableAccumulator {
    pub header: Vec<String>,
    pub body: Vec<Vec<String>>,
    pub footer: Vec<String>,
    /// Index into `body` of the row currently being filled.
    pub current_row: usize,
    pub in_footer: bool,
}

impl TableAccumulator {
    /// Forget everything; called when any table (including a nested one)
    /// starts.
    pub fn reset(&mut self) {
        *self = TableAccumulator::default();
    }

    pub fn start_row(&mut self) {
        self.body.push(Vec::new());
    }

    pub fn end_row(&mut self) {
        self.current_row += 1;
    }

    pub fn push_header(&mut self, cell: String) {
        self.header.push(cell);
    }

    /// Add a data cell to the footer or to the current row.  A cell with no
    /// row to go into is dropped.
    pub fn push_cell(&mut self, cell: String) {
        if self.in_footer {
            self.footer.push(cell);
            return;
        }
        match self.body.get_mut(self.current_row) {
            Some(row) => row.push(cell),
            None => {
                html_trace!("Dropping table cell outside any row: {:?}", cell);
            }
        }
    }
}

/// The state of one output buffer.
pub(crate) struct RenderContext<'a, R: Renderer> {
    renderer: R,
    options: &'a Options,
    table: TableAccumulator,
    blockquote_depth: usize,
    table_depth: usize,
    in_pre: bool,
    just_closed_div: bool,
    /// Quote marker for the current blockquote depth.  Tracked, but not
    /// prepended to output.
    #[cfg_attr(not(feature = "html_trace"), allow(dead_code))]
    quote_prefix: String,
}

impl<'a, R: Renderer> RenderContext<'a, R> {
    pub fn new(renderer: R, options: &'a Options) -> RenderContext<'a, R> {
        RenderContext {
            renderer,
            options,
            table: TableAccumulator::default(),
            blockquote_depth: 0,
            table_depth: 0,
            in_pre: false,
            just_closed_div: false,
            quote_prefix: String::new(),
        }
    }

    /// A fresh context with the same options and width, writing into its
    /// own buffer.
    fn sub(&self) -> RenderContext<'a, R> {
        html_trace_quiet!("sub()");
        RenderContext::new(self.renderer.new_sub_renderer(), self.options)
    }

    /// The raw text produced so far.
    pub fn into_string(self) -> String {
        self.renderer.into_string()
    }

    fn text(&mut self, text: &str) {
        if self.in_pre {
            self.emit(text);
        } else {
            self.emit(text.trim());
        }
    }

    /// Emit an already rendered heading with its dividers.
    fn heading(&mut self, tag: Tag, text: &str) {
        if self.options.text_only {
            self.emit(&format!("{}\n\n", text));
            return;
        }

        let divider_len = text
            .split('\n')
            .map(|line| UnicodeWidthStr::width(line.trim_end()))
            .max()
            .unwrap_or(0);
        let divider = if tag == Tag::H1 {
            "*".repeat(divider_len)
        } else {
            "-".repeat(divider_len)
        };

        self.emit("\n\n");
        if tag == Tag::H1 {
            self.emit(&divider);
            self.emit("\n");
        }
        self.emit(text);
        self.emit("\n");
        self.emit(&divider);
        self.emit("\n\n");
    }

    fn bold(&mut self, text: &str) {
        if self.options.text_only {
            self.emit(text);
        } else {
            self.emit(&format!("*{}*", text));
        }
    }

    fn enter_blockquote(&mut self) {
        self.blockquote_depth += 1;
        if !self.options.text_only {
            self.quote_prefix = format!("{} ", ">".repeat(self.blockquote_depth));
        }
        html_trace!(
            "blockquote depth {} prefix {:?}",
            self.blockquote_depth,
            self.quote_prefix
        );
        self.emit("\n");
        if self.blockquote_depth == 1 {
            self.emit("\n");
        }
    }

    fn leave_blockquote(&mut self) {
        self.blockquote_depth = self.blockquote_depth.saturating_sub(1);
        if !self.options.text_only {
            self.quote_prefix = ">".repeat(self.blockquote_depth);
        }
        if self.blockquote_depth > 0 {
            self.quote_prefix.push(' ');
        }
        self.emit("\n\n");
    }

    fn leave_div(&mut self) {
        if !self.just_closed_div {
            self.emit("\n");
        }
        self.just_closed_div = true;
    }

    /// Emit the target of a link whose content has been rendered.
    fn link_target(&mut self, el: &Element) {
        let link_text = match el.children.as_slice() {
            [Node::Text(text)] => text.as_str(),
            _ => "",
        };
        let href = el.attr("href").map(normalize_href).unwrap_or("");
        let options = self.options;
        if !href.is_empty()
            && href != link_text
            && (!options.omit_links || !options.text_only)
        {
            self.emit(&format!("({})", href));
        } else {
            self.emit("");
        }
    }

    /// Draw the accumulated table.
    fn finish_table(&mut self) {
        let table = &self.table;
        html_trace!(
            "Rendering table: {} header cells, {} rows, {} footer cells",
            table.header.len(),
            table.body.len(),
            table.footer.len()
        );
        let block = match &self.options.table_style {
            Some(style) => render_table(style, &table.header, &table.body, &table.footer),
            None => render_table(
                &TableStyle::default(),
                &table.header,
                &table.body,
                &table.footer,
            ),
        };
        self.emit(&block);
        self.emit("\n\n");
    }

    /// Write `data` to the output.  Outside tables, `""`, `"\n"` and
    /// `"\n\n"` are line control rather than text.
    fn emit(&mut self, data: &str) {
        if self.table_depth > 0 {
            self.renderer.add_raw_text(data);
            return;
        }
        match data {
            "" => {}
            "\n" => self.renderer.new_line(),
            "\n\n" => self.renderer.add_empty_line(),
            _ => self.renderer.add_inline_text(data),
        }
    }
}

/// Which list a finished table cell goes into.
#[derive(Debug, Clone, Copy)]
enum CellKind {
    Header,
    Data,
}

/// Work to do once an element's children have been rendered.
enum Leave<'a> {
    Div,
    Li,
    /// Close the sub-context and emit its text as bold.
    Bold,
    /// Close the sub-context and emit its text as a heading.
    Heading(Tag),
    Blockquote,
    Link(&'a Element),
    Paragraph,
    Table { pretty: bool },
    Tfoot,
    Tr,
    /// Restore the previous preformatted mode.
    Pre(bool),
    /// Close the context of one child of a table cell and keep its text.
    CellPart,
    /// Join the parts of a table cell into the accumulator.
    Cell(CellKind),
}

/// One step of a render pass.
enum Task<'a> {
    /// Render a node into the current context.
    Visit(&'a Node),
    /// Start a fresh context on top of the current one.
    Isolate,
    Leave(Leave<'a>),
}

/// A render pass: the active context, the contexts waiting for an
/// isolated subtree to finish, and the remaining tasks.
struct RenderPass<'a, R: Renderer> {
    context: RenderContext<'a, R>,
    parked: Vec<RenderContext<'a, R>>,
    /// Parts of the table cells being rendered, innermost last.
    cells: Vec<Vec<String>>,
    tasks: Vec<Task<'a>>,
}

impl<'a, R: Renderer> RenderPass<'a, R> {
    fn isolate(&mut self) {
        let sub = self.context.sub();
        let parent = std::mem::replace(&mut self.context, sub);
        self.parked.push(parent);
    }

    /// Return to the parked context, returning the isolated text.
    fn resume(&mut self) -> String {
        match self.parked.pop() {
            Some(parent) => std::mem::replace(&mut self.context, parent).into_string(),
            None => String::new(),
        }
    }

    /// Queue `children` to be visited in order, followed by `leave`.
    fn descend(&mut self, children: &'a [Node], leave: Option<Leave<'a>>) {
        if let Some(leave) = leave {
            self.tasks.push(Task::Leave(leave));
        }
        self.tasks.extend(children.iter().rev().map(Task::Visit));
    }

    /// Queue each child of a table cell to be rendered independently.
    fn descend_cell(&mut self, children: &'a [Node], kind: CellKind) {
        self.cells.push(Vec::new());
        self.tasks.push(Task::Leave(Leave::Cell(kind)));
        for child in children.iter().rev() {
            self.tasks.push(Task::Leave(Leave::CellPart));
            self.tasks.push(Task::Visit(child));
            self.tasks.push(Task::Isolate);
        }
    }

    fn run(&mut self) {
        while let Some(task) = self.tasks.pop() {
            match task {
                Task::Visit(Node::Document(children)) => self.descend(children, None),
                Task::Visit(Node::Text(text)) => self.context.text(text),
                Task::Visit(Node::Comment(_)) => {}
                Task::Visit(Node::Element(el)) => self.enter(el),
                Task::Isolate => self.isolate(),
                Task::Leave(leave) => self.leave(leave),
            }
        }
    }

    fn enter(&mut self, el: &'a Element) {
        html_trace_quiet!("enter: <{}>", el.name);
        let ctx = &mut self.context;
        ctx.just_closed_div = false;
        let pretty = ctx.options.pretty_tables;

        match el.tag {
            Tag::Br => ctx.emit("\n\n"),
            Tag::H1 | Tag::H2 | Tag::H3 => {
                self.isolate();
                self.descend(&el.children, Some(Leave::Heading(el.tag)));
            }
            Tag::Blockquote => {
                ctx.enter_blockquote();
                self.descend(&el.children, Some(Leave::Blockquote));
            }
            Tag::Div => {
                ctx.renderer.new_line();
                self.descend(&el.children, Some(Leave::Div));
            }
            Tag::Li => {
                if !ctx.options.text_only {
                    ctx.emit("- ");
                }
                self.descend(&el.children, Some(Leave::Li));
            }
            Tag::B | Tag::Strong => {
                self.isolate();
                self.descend(&el.children, Some(Leave::Bold));
            }
            Tag::A => match el.children.as_slice() {
                [Node::Element(img)] if img.tag == Tag::Img => {
                    if let Some(alt) = img.attr("alt").filter(|alt| !alt.is_empty()) {
                        ctx.emit(alt);
                    }
                    ctx.link_target(el);
                }
                children => self.descend(children, Some(Leave::Link(el))),
            },
            Tag::P | Tag::Ul => {
                ctx.emit("\n\n");
                self.descend(&el.children, Some(Leave::Paragraph));
            }
            Tag::Table => {
                ctx.table_depth += 1;
                ctx.emit("\n\n");
                if pretty {
                    ctx.table.reset();
                }
                self.descend(&el.children, Some(Leave::Table { pretty }));
            }
            Tag::Tfoot if pretty => {
                ctx.table.in_footer = true;
                self.descend(&el.children, Some(Leave::Tfoot));
            }
            Tag::Tr if pretty => {
                ctx.table.start_row();
                self.descend(&el.children, Some(Leave::Tr));
            }
            Tag::Th if pretty => self.descend_cell(&el.children, CellKind::Header),
            Tag::Td if pretty => self.descend_cell(&el.children, CellKind::Data),
            Tag::Pre => {
                let was_pre = std::mem::replace(&mut ctx.in_pre, true);
                self.descend(&el.children, Some(Leave::Pre(was_pre)));
            }
            Tag::Style | Tag::Script | Tag::Head => {}
            Tag::Tfoot
            | Tag::Tr
            | Tag::Th
            | Tag::Td
            | Tag::Html
            | Tag::Body
            | Tag::Img
            | Tag::Thead
            | Tag::Tbody
            | Tag::Other => self.descend(&el.children, None),
        }
    }

    fn leave(&mut self, leave: Leave<'a>) {
        match leave {
            Leave::Div => self.context.leave_div(),
            Leave::Li => self.context.emit("\n"),
            Leave::Bold => {
                let text = self.resume();
                self.context.bold(&text);
            }
            Leave::Heading(tag) => {
                let text = self.resume();
                self.context.heading(tag, &text);
            }
            Leave::Blockquote => self.context.leave_blockquote(),
            Leave::Link(el) => self.context.link_target(el),
            Leave::Paragraph => self.context.emit("\n\n"),
            Leave::Table { pretty } => {
                if pretty {
                    self.context.finish_table();
                } else {
                    self.context.emit("\n\n");
                }
                self.context.table_depth = self.context.table_depth.saturating_sub(1);
            }
            Leave::Tfoot => self.context.table.in_footer = false,
            Leave::Tr => self.context.table.end_row(),
            Leave::Pre(was_pre) => self.context.in_pre = was_pre,
            Leave::CellPart => {
                let text = crate::normalize(&self.resume());
                if let Some(parts) = self.cells.last_mut() {
                    parts.push(text);
                }
            }
            Leave::Cell(kind) => {
                let cell = self.cells.pop().unwrap_or_default().join("\n");
                match kind {
                    CellKind::Header => self.context.table.push_header(cell),
                    CellKind::Data => self.context.table.push_cell(cell),
                }
            }
        }
    }
}

/// Render `node` into `renderer`, returning the raw (unnormalised) text.
pub(crate) fn render<R: Renderer>(node: &Node, renderer: R, options: &Options) -> String {
    let mut pass = RenderPass {
        context: RenderContext::new(renderer, options),
        parked: Vec::new(),
        cells: Vec::new(),
        tasks: vec![Task::Visit(node)],
    };
    pass.run();
    pass.context.into_string()
}

/// Trim a link target and drop any `mailto:` scheme.
fn normalize_href(href: &str) -> &str {
    let href = href.trim();
    href.strip_prefix("mailto:").unwrap_or(href)
}
