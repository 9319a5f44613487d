// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema-driven marshalling between libvirt-style XML trees and typed
//! configuration records.
//!
//! A schema is a tree of [`schema::Node`] descriptors, built once per
//! composite type and shared across every `load`/`save` call. The
//! deserialization direction ([`de::consume`]) walks a cursor over an
//! already-parsed [`dom::Element`] tree, speculatively matching `Unordered`
//! and `Choice` groups with checkpoint/restore; the serialization direction
//! ([`ser::produce`]) deterministically emits the same shape from a
//! [`slot::Slot`] tree. Domain-level record types tie the two together by
//! implementing [`Composite`].

pub mod composite;
pub mod de;
pub mod dom;
pub mod enums;
mod error;
pub mod leaf;
pub mod schema;
pub mod ser;
pub mod slot;

pub use composite::Composite;
pub use error::{Error, ErrorKind};

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// A reference to an "expanded name": namespace and local name.
///
/// See [Namespaces in XML 1.1 (Second Edition) section 2.1: Basic
/// Concepts](https://www.w3.org/TR/2006/REC-xml-names11-20060816/#concepts).
///
/// Schema descriptors hold the `'static` form; the prefix used in a concrete
/// document is semantically insignificant and never stored.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NameRef<'a> {
    pub namespace: &'a str,
    pub local_name: &'a str,
}

impl<'a> NameRef<'a> {
    /// Shorthand for an unnamespaced name; covers nearly all of the libvirt
    /// vocabulary.
    pub const fn local(local_name: &'a str) -> Self {
        Self {
            namespace: "",
            local_name,
        }
    }

    pub(crate) fn from_xml_name(name: &xml::name::Name<'a>) -> Self {
        Self {
            namespace: match name.namespace {
                // Work around xml-rs's erroneous lack of builtin
                // xmlns:xml="http://www.w3.org/XML/1998/namespace" mapping.
                None if name.prefix == Some("xml") => XML_NS,
                None => "",
                Some(ns) => ns,
            },
            local_name: name.local_name,
        }
    }

    pub fn to_owned(&self) -> Name {
        Name {
            namespace: self.namespace.to_owned(),
            local_name: self.local_name.to_owned(),
        }
    }
}

impl<'a> std::fmt::Display for NameRef<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local_name)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local_name)
        }
    }
}

/// An owned version of an "expanded name"; the borrowed version is [`NameRef`].
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Name {
    pub namespace: String,
    pub local_name: String,
}

impl Name {
    pub fn as_ref(&self) -> NameRef {
        NameRef {
            namespace: &self.namespace,
            local_name: &self.local_name,
        }
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_ref().fmt(f)
    }
}
