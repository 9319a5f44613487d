// SPDX-License-Identifier: MIT OR Apache-2.0

//! Descriptor trees.
//!
//! A schema is an ordinary value: a tree of [`Node`]s built once per
//! composite type and shared behind `Arc`s, so one dialect's descriptor can
//! embed another's wholesale (a snapshot document embeds the full domain
//! descriptor this way). The consume engine ([`crate::de`]) and the produce
//! engine ([`crate::ser`]) are the only interpreters.

use std::sync::Arc;

use crate::leaf::Leaf;
use crate::NameRef;

/// One descriptor in a schema tree.
///
/// Group nodes (`Ordered`, `Unordered`, `Choice`) and quantifiers
/// (`Optional`, `ZeroOrMore`, `OneOrMore`) shape the [`crate::slot::Slot`]
/// the engines exchange; see each variant for the shape it yields.
#[derive(Debug)]
pub enum Node {
    /// An attribute on the enclosing element. Yields `Slot::Scalar`.
    Attribute {
        name: NameRef<'static>,
        leaf: Arc<Leaf>,
    },

    /// A child element. Matching opens the element; `inner` must account for
    /// every child element inside it. Yields whatever `inner` yields.
    Element {
        name: NameRef<'static>,
        inner: Arc<Node>,
    },

    /// The enclosing element's directly-contained text. Yields
    /// `Slot::Scalar`.
    Text { leaf: Arc<Leaf> },

    /// Asserts the enclosing element has no text content; pairs with
    /// `Element` for presence-flag elements like `<readonly/>`. Yields
    /// `Slot::Present`.
    Empty,

    /// Transparent grouping: `inner` matches against the current element
    /// without opening a new one.
    Fragment(Arc<Node>),

    /// Members must match in declaration order. Yields `Slot::Group` with
    /// one entry per member.
    Ordered(Vec<Arc<Node>>),

    /// Members may match in any document order; every member must match
    /// exactly once. Yields `Slot::Group` in declaration order regardless of
    /// the order found.
    Unordered(Vec<Arc<Node>>),

    /// Alternatives tried in declaration order; the first that matches wins,
    /// even if a later one would also match (and match more). Yields
    /// `Slot::Choice` tagged with the winning arm's index.
    Choice(Vec<Arc<Node>>),

    /// Zero or one match. Yields `Slot::Absent` or the inner slot.
    Optional(Arc<Node>),

    /// Any number of matches. Yields `Slot::List`.
    ZeroOrMore(Arc<Node>),

    /// One or more matches. Yields a non-empty `Slot::List`.
    OneOrMore(Arc<Node>),
}

pub fn attribute(name: NameRef<'static>, leaf: Arc<Leaf>) -> Arc<Node> {
    Arc::new(Node::Attribute { name, leaf })
}

pub fn element(name: NameRef<'static>, inner: Arc<Node>) -> Arc<Node> {
    Arc::new(Node::Element { name, inner })
}

pub fn text(leaf: Arc<Leaf>) -> Arc<Node> {
    Arc::new(Node::Text { leaf })
}

pub fn empty() -> Arc<Node> {
    Arc::new(Node::Empty)
}

pub fn fragment(inner: Arc<Node>) -> Arc<Node> {
    Arc::new(Node::Fragment(inner))
}

pub fn ordered(members: Vec<Arc<Node>>) -> Arc<Node> {
    Arc::new(Node::Ordered(members))
}

pub fn unordered(members: Vec<Arc<Node>>) -> Arc<Node> {
    Arc::new(Node::Unordered(members))
}

pub fn choice(arms: Vec<Arc<Node>>) -> Arc<Node> {
    Arc::new(Node::Choice(arms))
}

pub fn optional(inner: Arc<Node>) -> Arc<Node> {
    Arc::new(Node::Optional(inner))
}

pub fn zero_or_more(inner: Arc<Node>) -> Arc<Node> {
    Arc::new(Node::ZeroOrMore(inner))
}

pub fn one_or_more(inner: Arc<Node>) -> Arc<Node> {
    Arc::new(Node::OneOrMore(inner))
}

/// A leaf text element, `element(name, text(leaf))`. The most common shape
/// in the libvirt vocabulary.
pub fn text_element(name: NameRef<'static>, leaf: Arc<Leaf>) -> Arc<Node> {
    element(name, text(leaf))
}

/// An optional presence-flag element, `optional(element(name, empty()))`.
pub fn flag_element(name: NameRef<'static>) -> Arc<Node> {
    optional(element(name, empty()))
}
