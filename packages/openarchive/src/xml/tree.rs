//! Arena-backed mutable XML tree.
//!
//! Elements live in a flat `Vec` and are addressed by [`NodeId`], so a
//! document can keep handles to its live nodes and rewrite their text or
//! attributes in place without walking the tree.

use std::fmt::Write as _;

/// Handle to an element inside an [`XmlTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }
}

/// A processing instruction emitted before the root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingInstruction {
    pub target: String,
    pub data: String,
}

/// A mutable XML document with a single root element.
#[derive(Debug, Clone)]
pub struct XmlTree {
    nodes: Vec<Element>,
    instructions: Vec<ProcessingInstruction>,
}

impl XmlTree {
    /// Create a tree containing only the root element.
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![Element::new(root_name)],
            instructions: Vec::new(),
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of elements in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_processing_instruction(
        &mut self,
        target: impl Into<String>,
        data: impl Into<String>,
    ) {
        self.instructions.push(ProcessingInstruction {
            target: target.into(),
            data: data.into(),
        });
    }

    /// Append a new, empty child element to `parent` and return its handle.
    pub fn append_element(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Element::new(name));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Set an attribute, replacing any existing value with the same name.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        let attributes = &mut self.nodes[node.0].attributes;
        match attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => attributes.push((name.to_string(), value)),
        }
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        self.nodes[node.0].attributes.retain(|(n, _)| n != name);
    }

    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node.0]
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Replace the text content of an element.
    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) {
        self.nodes[node.0].text = Some(text.into());
    }

    #[must_use]
    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.nodes[node.0].text.as_deref()
    }

    #[must_use]
    pub fn name(&self, node: NodeId) -> &str {
        &self.nodes[node.0].name
    }

    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Serialize the document with an XML declaration and two-space indentation.
    #[must_use]
    pub fn to_xml_string(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        for pi in &self.instructions {
            let _ = writeln!(out, "<?{} {}?>", pi.target, pi.data);
        }
        self.write_element(&mut out, self.root(), 0);
        out
    }

    fn write_element(&self, out: &mut String, node: NodeId, depth: usize) {
        let element = &self.nodes[node.0];
        let indent = "  ".repeat(depth);

        out.push_str(&indent);
        out.push('<');
        out.push_str(&element.name);
        for (name, value) in &element.attributes {
            let _ = write!(out, " {name}=\"{}\"", escape(value));
        }

        let text = element.text.as_deref().unwrap_or_default();
        if element.children.is_empty() {
            if text.is_empty() {
                out.push_str("/>\n");
            } else {
                let _ = writeln!(out, ">{}</{}>", escape(text), element.name);
            }
            return;
        }

        out.push_str(">\n");
        if !text.is_empty() {
            let _ = writeln!(out, "{indent}  {}", escape(text));
        }
        for child in &element.children {
            self.write_element(out, *child, depth + 1);
        }
        let _ = writeln!(out, "{indent}</{}>", element.name);
    }
}

/// Escape the five XML special characters.
///
/// # Examples
/// ```
/// use openarchive::xml::escape;
///
/// assert_eq!(escape("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
/// ```
#[must_use]
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
