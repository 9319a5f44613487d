// SPDX-License-Identifier: MIT OR Apache-2.0

//! The minimal DOM the traversal engine runs against.
//!
//! The engine only ever needs: attribute lookup by expanded name, the ordered
//! list of child elements, direct text content, and the mirror-image mutators.
//! [`Element`] provides exactly that, reading through `xml-rs`'s pull parser
//! and writing through its event writer.

use std::io;

use log::trace;
use xml::reader::XmlEvent;

use crate::{Error, Name, NameRef};

/// One element of a parsed document: name, attributes, child elements, and
/// directly-contained character data.
///
/// Character data is concatenated across text/CDATA nodes; interleaving with
/// child elements is not preserved. The libvirt dialects never rely on mixed
/// content.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Element {
    name: Name,
    attributes: Vec<(Name, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    pub fn new(name: NameRef) -> Self {
        Self {
            name: name.to_owned(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: String::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> NameRef {
        self.name.as_ref()
    }

    pub fn attribute(&self, name: NameRef) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (NameRef, &str)> {
        self.attributes.iter().map(|(n, v)| (n.as_ref(), v.as_str()))
    }

    /// Sets an attribute, replacing any existing value under the same
    /// expanded name.
    pub fn set_attribute(&mut self, name: NameRef, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| n.as_ref() == name) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name.to_owned(), value)),
        }
    }

    #[inline]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Removes and returns the sole child, if there is exactly one.
    pub fn pop_only_child(&mut self) -> Option<Element> {
        if self.children.len() == 1 {
            self.children.pop()
        } else {
            None
        }
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Reads an XML document, returning its root element.
    pub fn read<R: io::Read>(source: R) -> Result<Element, Error> {
        let mut reader = xml::reader::EventReader::new(source);
        let mut stack: Vec<Element> = Vec::new();
        loop {
            match reader.next().map_err(Error::read)? {
                XmlEvent::StartElement {
                    name, attributes, ..
                } => {
                    trace!("reading <{}>, depth {}", &name, stack.len() + 1);
                    let mut element = Element::new(NameRef::from_xml_name(&name.borrow()));
                    for attr in &attributes {
                        element.attributes.push((
                            NameRef::from_xml_name(&attr.name.borrow()).to_owned(),
                            attr.value.clone(),
                        ));
                    }
                    stack.push(element);
                }
                XmlEvent::EndElement { .. } => {
                    // The reader guarantees events are balanced.
                    if let Some(done) = stack.pop() {
                        match stack.last_mut() {
                            Some(parent) => parent.children.push(done),
                            None => {
                                // Root closed; consume the trailing events.
                                loop {
                                    match reader.next().map_err(Error::read)? {
                                        XmlEvent::EndDocument => return Ok(done),
                                        XmlEvent::ProcessingInstruction { .. }
                                        | XmlEvent::Comment(_)
                                        | XmlEvent::Whitespace(_) => {}
                                        o => {
                                            return Err(Error::structural(format!(
                                                "expected end of document, got {:?}",
                                                o
                                            )))
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
                XmlEvent::Characters(s) | XmlEvent::CData(s) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&s);
                    }
                }
                XmlEvent::EndDocument => {
                    return Err(Error::structural("document has no root element"))
                }
                XmlEvent::StartDocument { .. }
                | XmlEvent::ProcessingInstruction { .. }
                | XmlEvent::Comment(_)
                | XmlEvent::Whitespace(_) => {}
            }
        }
    }

    /// Reads the root element of a document enclosed in a string.
    ///
    /// This is simply `read(source.as_bytes())`; it's common enough to merit
    /// a convenience method.
    #[inline]
    pub fn from_str(source: &str) -> Result<Element, Error> {
        Self::read(source.as_bytes())
    }

    /// Writes this element as a complete document.
    pub fn write<W: io::Write>(&self, sink: W) -> Result<(), Error> {
        let mut writer = xml::writer::EventWriter::new(sink);
        self.emit(&mut writer)
    }

    /// Writes this element as a complete document, returning it as a string.
    pub fn to_xml(&self) -> Result<String, Error> {
        let mut out = Vec::new();
        self.write(&mut out)?;
        Ok(String::from_utf8(out).expect("xml-rs produced invalid UTF-8"))
    }

    fn emit<W: io::Write>(&self, writer: &mut xml::writer::EventWriter<W>) -> Result<(), Error> {
        // Prefixes for namespaced attributes must outlive the builder.
        let prefixes: Vec<String> = (0..self.attributes.len()).map(|i| format!("a{}", i)).collect();

        let mut start = xml::writer::XmlEvent::start_element(xml::name::Name {
            local_name: &self.name.local_name,
            namespace: None,
            prefix: None,
        });
        if !self.name.namespace.is_empty() {
            start = start.default_ns(self.name.namespace.as_str());
        }
        for (i, (name, value)) in self.attributes.iter().enumerate() {
            if name.namespace.is_empty() {
                start = start.attr(xml::name::Name::local(&name.local_name), value);
            } else {
                start = start.ns(prefixes[i].as_str(), name.namespace.as_str()).attr(
                    xml::name::Name {
                        local_name: &name.local_name,
                        namespace: None,
                        prefix: Some(&prefixes[i]),
                    },
                    value,
                );
            }
        }
        writer.write(start).map_err(Error::write)?;
        if !self.text.is_empty() {
            writer
                .write(xml::writer::XmlEvent::characters(&self.text))
                .map_err(Error::write)?;
        }
        for child in &self.children {
            child.emit(writer)?;
        }
        writer
            .write(xml::writer::XmlEvent::end_element())
            .map_err(Error::write)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::Builder::new().is_test(true).try_init();
    }

    #[test]
    fn read_tree() {
        init();
        let root = Element::from_str(
            r#"<?xml version="1.0"?>
            <disk type="file" device="disk">
                <source file="/var/lib/images/a.qcow2"/>
                <target dev="hda"/>
                <serial>WD-1234</serial>
            </disk>"#,
        )
        .unwrap();
        assert_eq!(root.name(), NameRef::local("disk"));
        assert_eq!(root.attribute(NameRef::local("type")), Some("file"));
        assert_eq!(root.attribute(NameRef::local("missing")), None);
        assert_eq!(root.children().len(), 3);
        assert_eq!(
            root.children()[0].attribute(NameRef::local("file")),
            Some("/var/lib/images/a.qcow2")
        );
        assert_eq!(root.children()[2].text(), "WD-1234");
    }

    #[test]
    fn bad_xml() {
        init();
        Element::from_str("argh").unwrap_err();
    }

    #[test]
    fn write_round_trip() {
        init();
        let mut root = Element::new(NameRef::local("domain"));
        root.set_attribute(NameRef::local("type"), "kvm");
        let mut name = Element::new(NameRef::local("name"));
        name.set_text("guest01");
        root.push_child(name);

        let doc = root.to_xml().unwrap();
        let reread = Element::from_str(&doc).unwrap();
        assert_eq!(reread, root);
    }

    #[test]
    fn replace_attribute() {
        init();
        let mut e = Element::new(NameRef::local("target"));
        e.set_attribute(NameRef::local("dev"), "hda");
        e.set_attribute(NameRef::local("dev"), "hdb");
        assert_eq!(e.attribute(NameRef::local("dev")), Some("hdb"));
        assert_eq!(e.attributes().count(), 1);
    }
}
