#![forbid(unsafe_code)]

//! Owned XML document with ID attribute registration.

use dfesig_core::Error;

/// Attribute names that always register an element ID.
pub const DEFAULT_ID_ATTRS: [&str; 3] = ["Id", "ID", "id"];

/// An owned XML document.
///
/// The text is kept exactly as received: roxmltree keeps every whitespace
/// text node, and canonicalization depends on that. To work with the tree
/// call [`XmlDocument::parse_doc`], which borrows from the stored text.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    text: String,
    /// ID attribute names registered on top of [`DEFAULT_ID_ATTRS`].
    extra_id_attrs: Vec<String>,
}

impl XmlDocument {
    /// Parse and validate XML from a string, taking ownership.
    pub fn parse(text: String) -> Result<Self, Error> {
        crate::parse(&text)?;
        Ok(Self {
            text,
            extra_id_attrs: Vec::new(),
        })
    }

    /// Get the raw XML text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Register an additional ID attribute name.
    pub fn add_id_attr(&mut self, name: &str) {
        if !self.extra_id_attrs.iter().any(|a| a == name) {
            self.extra_id_attrs.push(name.to_owned());
        }
    }

    /// Parse the stored text into a temporary `roxmltree::Document`.
    pub fn parse_doc(&self) -> Result<roxmltree::Document<'_>, Error> {
        crate::parse(&self.text)
    }

    fn id_attr_names(&self) -> impl Iterator<Item = &str> {
        DEFAULT_ID_ATTRS
            .iter()
            .copied()
            .chain(self.extra_id_attrs.iter().map(String::as_str))
    }

    /// Find the single element carrying `id` in one of the registered ID
    /// attributes.
    ///
    /// Fails with [`Error::ReferenceTargetNotFound`] when no element, or
    /// more than one element, carries the identifier.
    pub fn find_by_id<'a, 'input>(
        &self,
        doc: &'a roxmltree::Document<'input>,
        id: &str,
    ) -> Result<roxmltree::Node<'a, 'input>, Error> {
        let mut matches = doc.descendants().filter(|n| {
            n.is_element() && self.id_attr_names().any(|attr| has_id(n, attr, id))
        });
        let found = matches
            .next()
            .ok_or_else(|| Error::ReferenceTargetNotFound(id.to_owned()))?;
        if matches.next().is_some() {
            return Err(Error::ReferenceTargetNotFound(format!(
                "{id} (identifier is not unique)"
            )));
        }
        Ok(found)
    }
}

/// Whether the ID attribute `name` of `node` equals `id`.
///
/// A prefixed name such as `wsu:Id` is resolved through the namespaces in
/// scope at `node`, so it matches whatever prefix the document binds to the
/// same URI.
fn has_id(node: &roxmltree::Node<'_, '_>, name: &str, id: &str) -> bool {
    match name.split_once(':') {
        Some((prefix, local)) => node
            .lookup_namespace_uri(Some(prefix))
            .is_some_and(|uri| node.attribute((uri, local)) == Some(id)),
        None => node.attribute(name) == Some(id),
    }
}

/// Whether `node` is an element with the given namespace and local name.
pub fn is_element(node: &roxmltree::Node<'_, '_>, ns: &str, local_name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local_name
        && node.tag_name().namespace().unwrap_or("") == ns
}

/// Find the first descendant element with the given namespace and local name.
pub fn find_element<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
    ns: &str,
    local_name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    doc.descendants().find(|n| is_element(n, ns, local_name))
}

/// Find the first child element with the given namespace and local name.
pub fn find_child_element<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
    ns: &str,
    local_name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    parent.children().find(|n| is_element(n, ns, local_name))
}

/// The qualified name (`prefix:local` or `local`) of an element, as written
/// in the source text.
///
/// roxmltree resolves names to (namespace, local) pairs and drops the prefix,
/// so it is recovered from the start tag.
pub fn qualified_name(node: &roxmltree::Node<'_, '_>) -> String {
    let source = node.document().input_text();
    let start = &source[node.range()];
    let qname = start
        .strip_prefix('<')
        .and_then(|rest| {
            rest.split(|c: char| c.is_whitespace() || c == '>' || c == '/')
                .next()
        })
        .filter(|q| !q.is_empty() && q.ends_with(node.tag_name().name()));
    match qname {
        Some(q) => q.to_owned(),
        None => node.tag_name().name().to_owned(),
    }
}
