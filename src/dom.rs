//! The node tree consumed by the renderer.
//!
//! html5ever builds a reference-counted DOM (`markup5ever_rcdom`), which is
//! neither `Send` nor convenient to pattern match on.  It is converted once,
//! up front, into the owned [`Node`] tree defined here; rendering only ever
//! reads it.

use markup5ever_rcdom::{Handle, NodeData};

/// The element names the renderer distinguishes.  Anything else is
/// [`Tag::Other`] and is rendered as a plain container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Tag {
    Html,
    Head,
    Body,
    Div,
    P,
    Ul,
    Li,
    A,
    Img,
    B,
    Strong,
    H1,
    H2,
    H3,
    Blockquote,
    Br,
    Pre,
    Style,
    Script,
    Table,
    Thead,
    Tbody,
    Tfoot,
    Tr,
    Th,
    Td,
    Other,
}

impl Tag {
    /// Look up a tag by element name (ASCII case-insensitive).
    pub fn from_name(name: &str) -> Tag {
        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "html" => Tag::Html,
            "head" => Tag::Head,
            "body" => Tag::Body,
            "div" => Tag::Div,
            "p" => Tag::P,
            "ul" => Tag::Ul,
            "li" => Tag::Li,
            "a" => Tag::A,
            "img" => Tag::Img,
            "b" => Tag::B,
            "strong" => Tag::Strong,
            "h1" => Tag::H1,
            "h2" => Tag::H2,
            "h3" => Tag::H3,
            "blockquote" => Tag::Blockquote,
            "br" => Tag::Br,
            "pre" => Tag::Pre,
            "style" => Tag::Style,
            "script" => Tag::Script,
            "table" => Tag::Table,
            "thead" => Tag::Thead,
            "tbody" => Tag::Tbody,
            "tfoot" => Tag::Tfoot,
            "tr" => Tag::Tr,
            "th" => Tag::Th,
            "td" => Tag::Td,
            _ => Tag::Other,
        }
    }
}

/// An element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// The tag identity used for dispatch.
    pub tag: Tag,
    /// The element's local name as written in the source.
    pub name: String,
    /// Attributes in document order.
    pub attrs: Vec<(String, String)>,
    /// Child nodes in document order.
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element with no attributes.  The tag is looked up from
    /// `name`.
    pub fn new(name: &str, children: Vec<Node>) -> Element {
        Element {
            tag: Tag::from_name(name),
            name: name.to_string(),
            attrs: Vec::new(),
            children,
        }
    }

    /// Add an attribute, returning the element.
    pub fn with_attr(mut self, name: &str, value: &str) -> Element {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    /// Return the value of the first attribute called `name`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl Drop for Element {
    // Take the subtree apart iteratively; the default drop glue recurses
    // once per nesting level.
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(node) = stack.pop() {
            match node {
                Node::Element(mut el) => stack.append(&mut el.children),
                Node::Document(mut children) => stack.append(&mut children),
                Node::Text(_) | Node::Comment(_) => {}
            }
        }
    }
}

/// A node of the parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// The document root.
    Document(Vec<Node>),
    /// An element.
    Element(Element),
    /// A run of character data.
    Text(String),
    /// A comment.  It produces no output, but it still counts as a child of
    /// its parent.
    Comment(String),
}

impl Node {
    /// Convenience constructor for an element node.
    pub fn element(name: &str, children: Vec<Node>) -> Node {
        Node::Element(Element::new(name, children))
    }

    /// Convenience constructor for a text node.
    pub fn text(text: &str) -> Node {
        Node::Text(text.to_string())
    }
}

/// Combines the converted children of a DOM node into its result.
type ResultReducer<R> = dyn FnOnce(Vec<R>) -> Option<R>;

/// The result of converting one DOM node.
enum TreeMapResult<N, R> {
    /// A completed result.
    Finished(R),
    /// Deferred completion - can be turned into a result
    /// once the vector of children are processed.
    PendingChildren {
        children: Vec<N>,
        cons: Box<ResultReducer<R>>,
    },
    /// Nothing (e.g. a doctype).
    Nothing,
}

/// Map a tree bottom-up without recursing, so that arbitrarily deep input
/// cannot exhaust the stack during conversion.
fn tree_map_reduce<N, R, M>(top: N, mut process_node: M) -> Option<R>
where
    N: 'static,
    R: 'static,
    M: FnMut(N) -> TreeMapResult<N, R>,
{
    /// A node partially decoded, waiting for its children to
    /// be processed.
    struct PendingNode<N, R> {
        /// How to make the node once finished
        construct: Box<ResultReducer<R>>,
        /// Children already processed
        children: Vec<R>,
        /// Iterator of child nodes not yet processed
        to_process: std::vec::IntoIter<N>,
    }

    let mut pending_stack = vec![PendingNode {
        // We only expect one child, which we'll just return.
        construct: Box::new(|mut cs: Vec<R>| cs.pop()),
        children: Vec::new(),
        to_process: vec![top].into_iter(),
    }];
    loop {
        let Some(last) = pending_stack.last_mut() else {
            break None;
        };
        if let Some(h) = last.to_process.next() {
            match process_node(h) {
                TreeMapResult::Finished(result) => last.children.push(result),
                TreeMapResult::PendingChildren { children, cons } => {
                    pending_stack.push(PendingNode {
                        construct: cons,
                        children: Vec::new(),
                        to_process: children.into_iter(),
                    });
                }
                TreeMapResult::Nothing => {}
            }
        } else {
            // No more children, so finally construct the parent.
            let Some(completed) = pending_stack.pop() else {
                break None;
            };
            let reduced = (completed.construct)(completed.children);
            match pending_stack.last_mut() {
                Some(parent) => parent.children.extend(reduced),
                // Finished the whole stack!
                None => break reduced,
            }
        }
    }
}

fn pending<F>(handle: &Handle, f: F) -> TreeMapResult<Handle, Node>
where
    F: FnOnce(Vec<Node>) -> Option<Node> + 'static,
{
    TreeMapResult::PendingChildren {
        children: handle.children.borrow().clone(),
        cons: Box::new(f),
    }
}

fn process_dom_node(handle: Handle) -> TreeMapResult<Handle, Node> {
    use TreeMapResult::*;

    match &handle.data {
        NodeData::Document => pending(&handle, |cs| Some(Node::Document(cs))),
        NodeData::Element { name, attrs, .. } => {
            let name: String = String::from(&*name.local);
            let attrs: Vec<(String, String)> = attrs
                .borrow()
                .iter()
                .map(|attr| (String::from(&*attr.name.local), String::from(&*attr.value)))
                .collect();
            pending(&handle, move |children| {
                Some(Node::Element(Element {
                    tag: Tag::from_name(&name),
                    name,
                    attrs,
                    children,
                }))
            })
        }
        NodeData::Text { contents } => Finished(Node::Text(String::from(&**contents.borrow()))),
        NodeData::Comment { contents } => Finished(Node::Comment(String::from(&**contents))),
        NodeData::Doctype { .. } => Nothing,
        NodeData::ProcessingInstruction { .. } => {
            html_trace!("Ignoring processing instruction");
            Nothing
        }
    }
}

/// Convert an html5ever DOM (sub)tree into a [`Node`] tree.
pub fn from_rcdom(handle: Handle) -> Node {
    tree_map_reduce(handle, process_dom_node).unwrap_or(Node::Document(Vec::new()))
}
