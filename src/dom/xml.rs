//! XML reading and writing for [`Document`]

use std::borrow::Cow;

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::document::{Document, ElementData, NodeId, NodeKind, XmlDeclaration};
use crate::utils::error::{TableError, TableResult};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Prefix declarations made on one element; the empty prefix is the default
/// namespace and an empty URI undeclares it
type Scope = Vec<(String, String)>;

fn utf8(bytes: &[u8]) -> TableResult<&str> {
    std::str::from_utf8(bytes).map_err(|e| TableError::Xml(e.to_string()))
}

fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, qname),
    }
}

fn lookup<'a>(scopes: &'a [Scope], prefix: &str) -> Option<&'a str> {
    if prefix == "xml" {
        return Some(XML_NAMESPACE);
    }
    scopes
        .iter()
        .rev()
        .flat_map(|scope| scope.iter())
        .find(|(p, _)| p == prefix)
        .map(|(_, uri)| uri.as_str())
        .filter(|uri| !uri.is_empty())
}

/// A prefix that is bound to `uri` and not shadowed by an inner declaration
fn prefix_for<'a>(scopes: &'a [Scope], uri: &str) -> Option<&'a str> {
    scopes
        .iter()
        .rev()
        .flat_map(|scope| scope.iter())
        .filter(|(p, u)| !p.is_empty() && u == uri)
        .map(|(p, _)| p.as_str())
        .find(|p| lookup(scopes, p) == Some(uri))
}

fn declarations(attributes: &indexmap::IndexMap<String, String>) -> Scope {
    attributes
        .iter()
        .filter_map(|(key, value)| {
            if key == "xmlns" {
                Some((String::new(), value.clone()))
            } else {
                key.strip_prefix("xmlns:")
                    .map(|prefix| (prefix.to_string(), value.clone()))
            }
        })
        .collect()
}

fn read_element(start: &BytesStart<'_>, scopes: &mut Vec<Scope>) -> TableResult<ElementData> {
    let qname = utf8(start.name().as_ref())?.to_string();
    let mut attributes = indexmap::IndexMap::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| TableError::Xml(e.to_string()))?;
        let key = utf8(attr.key.as_ref())?.to_string();
        let value = attr.unescape_value()?.into_owned();
        attributes.insert(key, value);
    }
    scopes.push(declarations(&attributes));

    let (prefix, local_name) = split_qname(&qname);
    let namespace = lookup(scopes, prefix.unwrap_or("")).map(str::to_string);
    if prefix.is_some() && namespace.is_none() {
        return Err(TableError::Xml(format!("undeclared namespace prefix in <{}>", qname)));
    }

    Ok(ElementData {
        namespace,
        prefix: prefix.map(str::to_string),
        local_name: local_name.to_string(),
        attributes,
    })
}

impl Document {
    /// Parse an XML string into a document
    pub fn parse(xml: &str) -> TableResult<Document> {
        let mut reader = Reader::from_str(xml);
        let mut doc = Document::new();
        let mut open: Vec<NodeId> = vec![doc.root()];
        let mut scopes: Vec<Scope> = Vec::new();

        loop {
            let parent = *open.last().unwrap_or(&doc.root());
            let event = reader.read_event().map_err(|e| {
                TableError::Xml(format!("at position {}: {}", reader.buffer_position(), e))
            })?;
            match event {
                Event::Start(start) => {
                    let element = read_element(&start, &mut scopes)?;
                    let id = doc.create_node(NodeKind::Element(element));
                    doc.append_child(parent, id)?;
                    open.push(id);
                }
                Event::Empty(start) => {
                    let element = read_element(&start, &mut scopes)?;
                    scopes.pop();
                    let id = doc.create_node(NodeKind::Element(element));
                    doc.append_child(parent, id)?;
                }
                Event::End(_) => {
                    if open.len() <= 1 {
                        return Err(TableError::Xml("unexpected closing tag".to_string()));
                    }
                    open.pop();
                    scopes.pop();
                }
                Event::Text(text) => {
                    let text = text.unescape()?;
                    // Whitespace between top-level nodes is not kept
                    if open.len() == 1 && text.trim().is_empty() {
                        continue;
                    }
                    let id = doc.create_node(NodeKind::Text(text.into_owned()));
                    doc.append_child(parent, id)?;
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data).into_owned();
                    let id = doc.create_node(NodeKind::CData(text));
                    doc.append_child(parent, id)?;
                }
                Event::Comment(comment) => {
                    let text = String::from_utf8_lossy(&comment).into_owned();
                    let id = doc.create_node(NodeKind::Comment(text));
                    doc.append_child(parent, id)?;
                }
                Event::PI(pi) => {
                    let text = String::from_utf8_lossy(&pi).into_owned();
                    let id = doc.create_node(NodeKind::ProcessingInstruction(text));
                    doc.append_child(parent, id)?;
                }
                Event::DocType(doctype) => {
                    let text = String::from_utf8_lossy(&doctype).into_owned();
                    let id = doc.create_node(NodeKind::DocType(text));
                    doc.append_child(parent, id)?;
                }
                Event::Decl(decl) => {
                    let version = String::from_utf8_lossy(&decl.version()?).into_owned();
                    let encoding = decl
                        .encoding()
                        .transpose()
                        .map_err(|e| TableError::Xml(e.to_string()))?
                        .map(|e| String::from_utf8_lossy(&e).into_owned());
                    let standalone = decl
                        .standalone()
                        .transpose()
                        .map_err(|e| TableError::Xml(e.to_string()))?
                        .map(|s| String::from_utf8_lossy(&s).into_owned());
                    doc.declaration = Some(XmlDeclaration {
                        version,
                        encoding,
                        standalone,
                    });
                }
                Event::Eof => break,
            }
        }

        if open.len() > 1 {
            return Err(TableError::Xml("unexpected end of input".to_string()));
        }
        if doc.document_element().is_none() {
            return Err(TableError::Xml("document has no root element".to_string()));
        }
        log::trace!("parsed XML document with {} top-level nodes", doc.children(doc.root()).len());
        Ok(doc)
    }

    /// Serialize the whole document
    pub fn to_xml(&self) -> TableResult<String> {
        let mut writer = Writer::new(Vec::new());
        if let Some(decl) = &self.declaration {
            writer.write_event(Event::Decl(BytesDecl::new(
                &decl.version,
                decl.encoding.as_deref(),
                decl.standalone.as_deref(),
            )))?;
            writer.get_mut().push(b'\n');
        }
        let mut scopes = Vec::new();
        for (i, &child) in self.children(self.root()).iter().enumerate() {
            if i > 0 {
                writer.get_mut().push(b'\n');
            }
            self.write_node(&mut writer, child, &mut scopes)?;
        }
        String::from_utf8(writer.into_inner()).map_err(|e| TableError::Xml(e.to_string()))
    }

    /// Serialize a single node and its subtree
    pub fn node_to_xml(&self, id: NodeId) -> TableResult<String> {
        let mut writer = Writer::new(Vec::new());
        // Seed the scope with the declarations of the node's ancestors
        let mut ancestors = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            if let Some(el) = self.element(node) {
                ancestors.push(declarations(&el.attributes));
            }
            current = self.parent(node);
        }
        ancestors.reverse();
        self.write_node(&mut writer, id, &mut ancestors)?;
        String::from_utf8(writer.into_inner()).map_err(|e| TableError::Xml(e.to_string()))
    }

    fn write_node(
        &self,
        writer: &mut Writer<Vec<u8>>,
        id: NodeId,
        scopes: &mut Vec<Scope>,
    ) -> TableResult<()> {
        let Some(kind) = self.kind(id) else {
            return Ok(());
        };
        match kind {
            NodeKind::Document => {
                for &child in self.children(id) {
                    self.write_node(writer, child, scopes)?;
                }
            }
            NodeKind::Element(el) => self.write_element(writer, id, el, scopes)?,
            NodeKind::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
            NodeKind::CData(text) => {
                writer.write_event(Event::CData(BytesCData::new(text.as_str())))?
            }
            NodeKind::Comment(text) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?
            }
            NodeKind::ProcessingInstruction(text) => {
                writer.write_event(Event::PI(BytesText::from_escaped(text.as_str())))?
            }
            NodeKind::DocType(text) => {
                writer.write_event(Event::DocType(BytesText::from_escaped(text.as_str())))?
            }
        }
        Ok(())
    }

    fn write_element(
        &self,
        writer: &mut Writer<Vec<u8>>,
        id: NodeId,
        el: &ElementData,
        scopes: &mut Vec<Scope>,
    ) -> TableResult<()> {
        let mut scope = declarations(&el.attributes);
        let mut extra: Option<String> = None;

        scopes.push(scope.clone());
        let name: Cow<'_, str> = match (&el.namespace, &el.prefix) {
            (None, Some(prefix)) => format!("{}:{}", prefix, el.local_name).into(),
            (None, None) => {
                if lookup(scopes, "").is_some() {
                    extra = Some(String::new());
                }
                Cow::Borrowed(el.local_name.as_str())
            }
            (Some(uri), prefix) => {
                let own = prefix
                    .as_deref()
                    .filter(|p| lookup(scopes, p) == Some(uri.as_str()));
                if let Some(p) = own {
                    format!("{}:{}", p, el.local_name).into()
                } else if lookup(scopes, "") == Some(uri.as_str()) {
                    Cow::Borrowed(el.local_name.as_str())
                } else if let Some(p) = prefix_for(scopes, uri) {
                    format!("{}:{}", p, el.local_name).into()
                } else {
                    extra = Some(uri.clone());
                    Cow::Borrowed(el.local_name.as_str())
                }
            }
        };
        scopes.pop();

        let mut start = BytesStart::new(name.as_ref());
        for (key, value) in &el.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        if let Some(uri) = &extra {
            start.push_attribute(("xmlns", uri.as_str()));
            scope.push((String::new(), uri.clone()));
        }

        let children = self.children(id);
        if children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        scopes.push(scope);
        for &child in children {
            self.write_node(writer, child, scopes)?;
        }
        scopes.pop();
        writer.write_event(Event::End(BytesEnd::new(name.as_ref())))?;
        Ok(())
    }
}
