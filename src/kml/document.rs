// src/kml/document.rs
//! Minimal owned XML tree over `xml-rs` events.
//!
//! Names are kept qualified (prefix, namespace URI, local part) on elements and
//! attributes alike, so `gx:` elements and `kml:id` attributes written by Google
//! Earth survive a load/write cycle unchanged.

use std::borrow::Cow;
use std::io::Write;

use xml::attribute::{ Attribute, OwnedAttribute };
use xml::name::OwnedName;
use xml::namespace::Namespace;
use xml::reader::{ EventReader, ParserConfig, XmlEvent };
use xml::writer::{ EmitterConfig, EventWriter, XmlEvent as WriteEvent };

use super::{ DOCUMENT, FOLDER, NAME, PLACEMARK };
use crate::error::AupError;

#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub name: OwnedName,
    pub attributes: Vec<OwnedAttribute>,
    /// Namespace mappings in scope here, as read. The writer only declares new ones.
    pub namespace: Namespace,
    pub children: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
}

impl Element {
    pub fn local_name(&self) -> &str {
        &self.name.local_name
    }

    /// Qualified attribute lookup: `prefix:local` or bare `local`.
    pub fn attribute(&self, qualified: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| {
                let name = &a.name;
                match &name.prefix {
                    Some(p) => qualified.strip_prefix(p.as_str())
                        .and_then(|rest| rest.strip_prefix(':'))
                        == Some(name.local_name.as_str()),
                    None => qualified == name.local_name,
                }
            })
            .map(|a| a.value.as_str())
    }
}

/// A loaded KML tree plus the namespace its elements are matched in.
#[derive(Clone, Debug)]
pub struct KmlDocument {
    root: Element,
    ns: String,
}

impl KmlDocument {
    /// Lenient load: BOM and leading junk are skipped, blank text dropped.
    pub fn parse(text: &str, namespace: &str) -> Result<Self, AupError> {
        let start = text.find('<').ok_or_else(|| {
            AupError::MalformedDocument(String::from("no markup in template"))
        })?;
        let root = read_tree(&text[start..])?;
        Ok(Self { root, ns: namespace.to_string() })
    }

    pub fn namespace(&self) -> &str {
        &self.ns
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn has_document(&self) -> bool {
        child(&self.root, DOCUMENT, &self.ns).is_some()
    }

    /// `<Document>` under the root, or the root itself when there is none.
    pub fn container(&self) -> &Element {
        child(&self.root, DOCUMENT, &self.ns).unwrap_or(&self.root)
    }

    pub fn container_mut(&mut self) -> &mut Element {
        let ns = &self.ns;
        let root = &mut self.root;
        match root.children.iter().position(|n| is_kml_node(n, DOCUMENT, ns)) {
            Some(i) => match &mut root.children[i] {
                Node::Element(doc) => doc,
                _ => unreachable!("position() only matches elements"),
            },
            None => root,
        }
    }

    /// Rename the `<Document>`; a bare root keeps its (absent) name.
    pub fn set_name(&mut self, name: &str) {
        if !self.has_document() {
            return;
        }
        let ns = self.ns.clone();
        let doc = self.container_mut();
        set_text(doc, NAME, &ns, Node::Text(name.to_string()));
    }

    /// Top-level folders of the container, in order.
    pub fn folders(&self) -> impl Iterator<Item = &Element> {
        children(self.container(), FOLDER, &self.ns)
    }

    /// Placemark names of the first folder called `folder`.
    pub fn placemark_names(&self, folder: &str) -> Vec<String> {
        self.folders()
            .find(|f| text_of_child(f, NAME, &self.ns).as_deref() == Some(folder))
            .map(|f| {
                children(f, PLACEMARK, &self.ns)
                    .filter_map(|pm| text_of_child(pm, NAME, &self.ns))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Pretty-printed, XML-declared UTF-8.
    pub fn to_bytes(&self) -> Result<Vec<u8>, AupError> {
        let mut out = Vec::new();
        let mut writer = EmitterConfig::new()
            .perform_indent(true)
            .write_document_declaration(true)
            .create_writer(&mut out);
        write_element(&mut writer, &self.root)
            .map_err(|e| AupError::Serialize(e.to_string()))?;
        Ok(out)
    }
}

fn read_tree(text: &str) -> Result<Element, AupError> {
    let config = ParserConfig::new().ignore_comments(false);
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    for event in EventReader::new_with_config(text.as_bytes(), config) {
        match event? {
            XmlEvent::StartElement { name, attributes, namespace } => {
                stack.push(Element { name, attributes, namespace, children: Vec::new() });
            }
            XmlEvent::EndElement { .. } => {
                let done = stack.pop().ok_or_else(|| {
                    AupError::MalformedDocument(String::from("unbalanced end tag"))
                })?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Element(done)),
                    None => root = Some(done),
                }
            }
            XmlEvent::Characters(t) => push_node(&mut stack, Node::Text(t)),
            XmlEvent::CData(t) => push_node(&mut stack, Node::CData(t)),
            XmlEvent::Comment(t) => push_node(&mut stack, Node::Comment(t)),
            // declaration, processing instructions, indentation
            _ => {}
        }
    }

    root.ok_or_else(|| AupError::MalformedDocument(String::from("no root element")))
}

// Anything outside the root element is dropped.
fn push_node(stack: &mut [Element], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn write_element<W: Write>(w: &mut EventWriter<W>, e: &Element) -> xml::writer::Result<()> {
    let attributes: Vec<Attribute<'_>> = e.attributes.iter().map(OwnedAttribute::borrow).collect();
    w.write(WriteEvent::StartElement {
        name: e.name.borrow(),
        attributes: Cow::Owned(attributes),
        namespace: Cow::Borrowed(&e.namespace),
    })?;
    for node in &e.children {
        match node {
            Node::Element(c) => write_element(w, c)?,
            Node::Text(t) => w.write(WriteEvent::Characters(t))?,
            Node::CData(t) => w.write(WriteEvent::CData(t))?,
            Node::Comment(t) => w.write(WriteEvent::Comment(t))?,
        }
    }
    w.write(WriteEvent::EndElement { name: Some(e.name.borrow()) })
}

/// `e` is `<local>` in namespace `ns`.
pub fn is_kml(e: &Element, local: &str, ns: &str) -> bool {
    e.name.local_name == local && e.name.namespace.as_deref() == Some(ns)
}

fn is_kml_node(node: &Node, local: &str, ns: &str) -> bool {
    matches!(node, Node::Element(e) if is_kml(e, local, ns))
}

pub fn child<'a>(e: &'a Element, local: &str, ns: &str) -> Option<&'a Element> {
    e.children.iter().find_map(|n| match n {
        Node::Element(c) if is_kml(c, local, ns) => Some(c),
        _ => None,
    })
}

pub fn child_mut<'a>(e: &'a mut Element, local: &str, ns: &str) -> Option<&'a mut Element> {
    e.children.iter_mut().find_map(|n| match n {
        Node::Element(c) if is_kml(c, local, ns) => Some(c),
        _ => None,
    })
}

pub fn children<'a>(e: &'a Element, local: &'a str, ns: &'a str) -> impl Iterator<Item = &'a Element> {
    e.children.iter().filter_map(move |n| match n {
        Node::Element(c) if is_kml(c, local, ns) => Some(c),
        _ => None,
    })
}

/// Text and CDATA content concatenated; `None` when there is none.
pub fn text_of(e: &Element) -> Option<String> {
    let mut out = String::new();
    let mut any = false;
    for node in &e.children {
        match node {
            Node::Text(t) | Node::CData(t) => {
                out.push_str(t);
                any = true;
            }
            _ => {}
        }
    }
    any.then_some(out)
}

pub fn text_of_child(e: &Element, local: &str, ns: &str) -> Option<String> {
    child(e, local, ns).and_then(text_of)
}

/// Empty element with the same namespace and prefix as `parent`.
pub fn new_child_like(parent: &Element, local: &str) -> Element {
    Element {
        name: OwnedName {
            local_name: local.to_string(),
            namespace: parent.name.namespace.clone(),
            prefix: parent.name.prefix.clone(),
        },
        attributes: Vec::new(),
        namespace: Namespace::empty(),
        children: Vec::new(),
    }
}

/// Replace the content of `<local>` under `parent` with `content`,
/// creating the element (first position for `name`, last otherwise).
pub fn set_text(parent: &mut Element, local: &str, ns: &str, content: Node) {
    match child_mut(parent, local, ns) {
        Some(el) => el.children = vec![content],
        None => {
            let mut el = new_child_like(parent, local);
            el.children.push(content);
            if local == NAME {
                parent.children.insert(0, Node::Element(el));
            } else {
                parent.children.push(Node::Element(el));
            }
        }
    }
}
