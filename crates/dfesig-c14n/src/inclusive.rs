#![forbid(unsafe_code)]

//! Inclusive Canonical XML 1.0 (C14N 1.0).
//!
//! Algorithm URI: `http://www.w3.org/TR/2001/REC-xml-c14n-20010315`
//! With comments: `http://www.w3.org/TR/2001/REC-xml-c14n-20010315#WithComments`
//!
//! The canonical form:
//! - writes namespace declarations sorted by prefix (default first)
//! - writes attributes sorted by (namespace-URI, local-name)
//! - expands empty elements into start/end tag pairs
//! - escapes text and attribute values per C14N rules
//! - optionally keeps comments
//!
//! For a document subset, the apex element of each visible subtree receives
//! every namespace in scope at that point and the `xml:*` attributes of its
//! ancestors.

use crate::escape;
use crate::render::{Attr, NsDecl};
use dfesig_core::{ns, Error};
use dfesig_xml::NodeSet;
use roxmltree::{Node, NodeType};
use std::collections::BTreeMap;

/// Namespace bindings already written by the nearest output ancestor,
/// prefix ("" for default) to URI.
type Rendered = BTreeMap<String, String>;

/// Canonicalize a document using Inclusive C14N 1.0.
pub fn canonicalize(
    doc: &roxmltree::Document<'_>,
    with_comments: bool,
    node_set: Option<&NodeSet>,
) -> Result<Vec<u8>, Error> {
    let mut writer = Writer {
        with_comments,
        node_set,
        out: Vec::new(),
    };
    writer.node(doc.root(), &Rendered::new());
    Ok(writer.out)
}

/// Where a node sits relative to the document element.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Level {
    BeforeRoot,
    AfterRoot,
    Nested,
}

fn level(node: &Node<'_, '_>) -> Level {
    let at_top = node
        .parent()
        .is_some_and(|p| p.node_type() == NodeType::Root);
    if !at_top {
        Level::Nested
    } else if node.prev_siblings().any(|s| s.is_element()) {
        Level::AfterRoot
    } else {
        Level::BeforeRoot
    }
}

struct Writer<'a> {
    with_comments: bool,
    node_set: Option<&'a NodeSet>,
    out: Vec<u8>,
}

impl Writer<'_> {
    fn visible(&self, node: &Node<'_, '_>) -> bool {
        self.node_set.map_or(true, |set| set.contains(node))
    }

    fn node(&mut self, node: Node<'_, '_>, rendered: &Rendered) {
        match node.node_type() {
            NodeType::Root => {
                for child in node.children() {
                    self.node(child, rendered);
                }
            }
            NodeType::Element => self.element(node, rendered),
            NodeType::Text => {
                if self.visible(&node) {
                    let text = node.text().unwrap_or("");
                    self.out.extend_from_slice(escape::escape_text(text).as_bytes());
                }
            }
            NodeType::Comment => {
                if self.with_comments && self.visible(&node) {
                    let body = format!("<!--{}-->", node.text().unwrap_or(""));
                    self.top_level(level(&node), &body);
                }
            }
            NodeType::PI => {
                if self.visible(&node) {
                    if let Some(pi) = node.pi() {
                        let body = match pi.value.filter(|v| !v.is_empty()) {
                            Some(value) => {
                                format!("<?{} {}?>", pi.target, escape::escape_pi(value))
                            }
                            None => format!("<?{}?>", pi.target),
                        };
                        self.top_level(level(&node), &body);
                    }
                }
            }
        }
    }

    /// Comments and PIs outside the document element are separated from it
    /// by a single line feed.
    fn top_level(&mut self, level: Level, body: &str) {
        if level == Level::AfterRoot {
            self.out.push(b'\n');
        }
        self.out.extend_from_slice(body.as_bytes());
        if level == Level::BeforeRoot {
            self.out.push(b'\n');
        }
    }

    fn element(&mut self, node: Node<'_, '_>, rendered: &Rendered) {
        if !self.visible(&node) {
            for child in node.children() {
                self.node(child, rendered);
            }
            return;
        }

        let axis = namespace_axis(&node);
        let mut decls: Vec<NsDecl> = axis
            .iter()
            .filter(|(prefix, uri)| rendered.get(*prefix) != Some(*uri))
            .map(|(prefix, uri)| NsDecl {
                prefix: prefix.clone(),
                uri: uri.clone(),
            })
            .collect();

        let mut child_rendered = rendered.clone();
        child_rendered.extend(axis.iter().map(|(p, u)| (p.clone(), u.clone())));

        // The default namespace was undeclared below an output ancestor
        // that binds one.
        let inherited_default = rendered.get("").is_some_and(|uri| !uri.is_empty());
        if inherited_default && !axis.contains_key("") {
            decls.push(NsDecl {
                prefix: String::new(),
                uri: String::new(),
            });
            child_rendered.remove("");
        }
        decls.sort();

        let mut attrs: Vec<Attr> = node
            .attributes()
            .map(|attr| {
                let ns_uri = attr.namespace().unwrap_or("");
                let qualified_name = match attribute_prefix(&node, ns_uri) {
                    Some(prefix) => format!("{prefix}:{}", attr.name()),
                    None => attr.name().to_owned(),
                };
                Attr {
                    ns_uri: ns_uri.to_owned(),
                    local_name: attr.name().to_owned(),
                    qualified_name,
                    value: attr.value().to_owned(),
                }
            })
            .collect();

        if self.node_set.is_some() && self.is_apex(&node) {
            let inherited = inherited_xml_attrs(&node, &attrs);
            attrs.extend(inherited);
        }
        attrs.sort();

        let name = dfesig_xml::document::qualified_name(&node);
        self.out.push(b'<');
        self.out.extend_from_slice(name.as_bytes());
        for decl in &decls {
            decl.write(&mut self.out);
        }
        for attr in &attrs {
            attr.write(&mut self.out);
        }
        self.out.push(b'>');

        for child in node.children() {
            self.node(child, &child_rendered);
        }

        self.out.extend_from_slice(b"</");
        self.out.extend_from_slice(name.as_bytes());
        self.out.push(b'>');
    }

    /// A visible element whose parent element is not in the output.
    fn is_apex(&self, node: &Node<'_, '_>) -> bool {
        node.parent_element().map_or(true, |p| !self.visible(&p))
    }
}

/// All namespaces in scope at `node`, except the implicit `xml` binding.
fn namespace_axis(node: &Node<'_, '_>) -> BTreeMap<String, String> {
    node.namespaces()
        .filter(|n| n.uri() != ns::XML)
        .filter(|n| n.name().is_some() || !n.uri().is_empty())
        .map(|n| (n.name().unwrap_or("").to_owned(), n.uri().to_owned()))
        .collect()
}

/// The prefix bound to `ns_uri` at `node`, for a namespaced attribute.
fn attribute_prefix(node: &Node<'_, '_>, ns_uri: &str) -> Option<String> {
    if ns_uri.is_empty() {
        return None;
    }
    if ns_uri == ns::XML {
        return Some("xml".to_owned());
    }
    node.namespaces()
        .filter(|n| n.uri() == ns_uri)
        .find_map(|n| n.name().map(str::to_owned))
}

/// `xml:*` attributes of the ancestors of an apex element that the element
/// does not override. The nearest ancestor wins.
fn inherited_xml_attrs(node: &Node<'_, '_>, own: &[Attr]) -> Vec<Attr> {
    let mut found: BTreeMap<String, String> = BTreeMap::new();
    for ancestor in node.ancestors().skip(1).filter(|a| a.is_element()) {
        for attr in ancestor.attributes() {
            if attr.namespace() == Some(ns::XML) {
                found
                    .entry(attr.name().to_owned())
                    .or_insert_with(|| attr.value().to_owned());
            }
        }
    }
    found
        .into_iter()
        .filter(|(name, _)| {
            !own.iter()
                .any(|a| a.ns_uri == ns::XML && a.local_name == *name)
        })
        .map(|(name, value)| Attr {
            ns_uri: ns::XML.to_owned(),
            qualified_name: format!("xml:{name}"),
            local_name: name,
            value,
        })
        .collect()
}
