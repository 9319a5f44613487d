// SPDX-License-Identifier: MIT OR Apache-2.0

//! The consume engine: matches a descriptor tree against a parsed document,
//! extracting a [`Slot`] tree.
//!
//! Matching is speculative where the schema allows alternatives. The
//! [`Cursor`] is a stack of positions within sibling lists; a checkpoint is
//! a copy of that stack, so backtracking restores position without touching
//! the document itself.

use std::slice;

use log::trace;

use crate::dom::Element;
use crate::leaf::{Leaf, LeafError};
use crate::schema::Node;
use crate::slot::Slot;
use crate::{Error, Name};

/// A position within a document: for each open element, which child comes
/// next.
///
/// The bottom frame is synthetic, treating the root element as the sole
/// member of a sibling list, so matching the root is no different from
/// matching any other element.
pub struct Cursor<'d> {
    frames: Vec<Frame<'d>>,
}

#[derive(Clone, Copy)]
struct Frame<'d> {
    /// The element whose children `siblings` are; `None` only in the bottom
    /// frame.
    owner: Option<&'d Element>,
    siblings: &'d [Element],
    index: usize,
}

/// A saved [`Cursor`] position.
struct Mark<'d> {
    frames: Vec<Frame<'d>>,
}

impl<'d> Cursor<'d> {
    pub fn new(root: &'d Element) -> Self {
        Self {
            frames: vec![Frame {
                owner: None,
                siblings: slice::from_ref(root),
                index: 0,
            }],
        }
    }

    /// The next unconsumed element at the current depth, if any.
    fn current(&self) -> Option<&'d Element> {
        let top = self.frames.last().expect("cursor has a bottom frame");
        top.siblings.get(top.index)
    }

    /// The element whose children the current depth iterates.
    fn owner(&self) -> Option<&'d Element> {
        self.frames.last().expect("cursor has a bottom frame").owner
    }

    fn advance(&mut self) {
        let top = self.frames.last_mut().expect("cursor has a bottom frame");
        top.index += 1;
    }

    fn open(&mut self, element: &'d Element) {
        self.frames.push(Frame {
            owner: Some(element),
            siblings: element.children(),
            index: 0,
        });
    }

    fn close(&mut self) {
        debug_assert!(self.frames.len() > 1);
        self.frames.pop();
    }

    fn mark(&self) -> Mark<'d> {
        Mark {
            frames: self.frames.clone(),
        }
    }

    fn reset(&mut self, mark: &Mark<'d>) {
        self.frames.clear();
        self.frames.extend_from_slice(&mark.frames);
    }

    /// How many sibling elements were consumed at `mark`'s depth since it
    /// was taken. Only meaningful after a successful match, which always
    /// returns to the depth it started at.
    fn consumed_since(&self, mark: &Mark<'d>) -> usize {
        let depth = mark.frames.len() - 1;
        self.frames[depth].index - mark.frames[depth].index
    }

    /// The stack of open element names, for error context.
    fn path(&self) -> Vec<Name> {
        self.frames
            .iter()
            .filter_map(|f| f.owner)
            .map(|e| e.name().to_owned())
            .collect()
    }
}

/// Matches `node` at the cursor's position, advancing it on success.
///
/// On failure the cursor is left wherever matching stopped; enclosing
/// `Optional`/`Choice`/`Unordered` descriptors restore their own checkpoint
/// before proceeding.
pub fn consume<'d>(node: &Node, cur: &mut Cursor<'d>) -> Result<Slot, Error> {
    match node {
        Node::Attribute { name, leaf } => {
            let owner = cur
                .owner()
                .ok_or_else(|| Error::structural("attribute descriptor outside any element"))?;
            match owner.attribute(*name) {
                Some(text) => read_leaf(leaf, text, cur),
                None => Err(Error::structural(format!(
                    "missing attribute {} on <{}>",
                    name,
                    owner.name()
                ))
                .with_path(cur.path())),
            }
        }
        Node::Element { name, inner } => {
            let candidate = cur.current().ok_or_else(|| {
                Error::structural(format!("expected <{}>, found end of element", name))
                    .with_path(cur.path())
            })?;
            if candidate.name() != *name {
                return Err(Error::structural(format!(
                    "expected <{}>, found <{}>",
                    name,
                    candidate.name()
                ))
                .with_path(cur.path()));
            }
            trace!("open <{}>", name);
            cur.open(candidate);
            let slot = consume(inner, cur)?;
            if let Some(extra) = cur.current() {
                return Err(Error::structural(format!(
                    "unexpected <{}> within <{}>",
                    extra.name(),
                    name
                ))
                .with_path(cur.path()));
            }
            cur.close();
            cur.advance();
            trace!("close <{}>", name);
            Ok(slot)
        }
        Node::Text { leaf } => {
            let owner = cur
                .owner()
                .ok_or_else(|| Error::structural("text descriptor outside any element"))?;
            read_leaf(leaf, owner.text(), cur)
        }
        Node::Empty => {
            let owner = cur
                .owner()
                .ok_or_else(|| Error::structural("empty descriptor outside any element"))?;
            if owner.text().trim().is_empty() {
                Ok(Slot::Present)
            } else {
                Err(Error::structural(format!(
                    "unexpected text in <{}>",
                    owner.name()
                ))
                .with_path(cur.path()))
            }
        }
        Node::Fragment(inner) => consume(inner, cur),
        Node::Ordered(members) => {
            let mut slots = Vec::with_capacity(members.len());
            for member in members {
                slots.push(consume(member, cur)?);
            }
            Ok(Slot::Group(slots))
        }
        Node::Unordered(members) => consume_unordered(members, cur),
        Node::Choice(arms) => {
            let start = cur.mark();
            for (i, arm) in arms.iter().enumerate() {
                match consume(arm, cur) {
                    Ok(slot) => {
                        trace!("choice took arm {}", i);
                        return Ok(Slot::choice(i, slot));
                    }
                    Err(_) => cur.reset(&start),
                }
            }
            Err(match cur.current() {
                Some(e) => Error::structural(format!("no alternative matches <{}>", e.name())),
                None => Error::structural("no alternative matches at end of element"),
            }
            .with_path(cur.path()))
        }
        Node::Optional(inner) => {
            let start = cur.mark();
            match consume(inner, cur) {
                Ok(slot) => Ok(slot),
                Err(_) => {
                    cur.reset(&start);
                    Ok(Slot::Absent)
                }
            }
        }
        Node::ZeroOrMore(inner) => {
            let mut items = Vec::new();
            collect_repeats(inner, cur, &mut items);
            Ok(Slot::List(items))
        }
        Node::OneOrMore(inner) => {
            let mut items = vec![consume(inner, cur)?];
            collect_repeats(inner, cur, &mut items);
            Ok(Slot::List(items))
        }
    }
}

fn read_leaf<'d>(leaf: &Leaf, text: &str, cur: &Cursor<'d>) -> Result<Slot, Error> {
    match leaf.read(text) {
        Ok(value) => Ok(Slot::Scalar(value)),
        Err(LeafError::Lexical) => {
            Err(Error::lexical(leaf.name(), text).with_path(cur.path()))
        }
        Err(LeafError::Semantic) => {
            Err(Error::semantic(leaf.name(), text).with_path(cur.path()))
        }
    }
}

/// Matches an unordered group by rounds. Each round tries every unassigned
/// member from the same checkpoint and commits the one consuming the most
/// child elements, ties going to declaration order. This keeps an absent
/// `Optional` member (which succeeds consuming nothing) from shadowing a
/// later member that would consume the element actually present.
fn consume_unordered<'d>(
    members: &[std::sync::Arc<Node>],
    cur: &mut Cursor<'d>,
) -> Result<Slot, Error> {
    let mut assigned: Vec<Option<Slot>> = vec![None; members.len()];
    while assigned.iter().any(Option::is_none) {
        let start = cur.mark();
        let mut best: Option<(usize, Slot, Mark<'d>, usize)> = None;
        for (i, member) in members.iter().enumerate() {
            if assigned[i].is_some() {
                continue;
            }
            cur.reset(&start);
            if let Ok(slot) = consume(member, cur) {
                let score = cur.consumed_since(&start);
                if best.as_ref().map_or(true, |(_, _, _, s)| score > *s) {
                    best = Some((i, slot, cur.mark(), score));
                }
            }
        }
        match best {
            Some((i, slot, end, score)) => {
                trace!("unordered group assigned member {} (consumed {})", i, score);
                assigned[i] = Some(slot);
                cur.reset(&end);
            }
            None => {
                cur.reset(&start);
                return Err(match cur.current() {
                    Some(e) => Error::structural(format!(
                        "no member of unordered group matches <{}>",
                        e.name()
                    )),
                    None => Error::structural(
                        "unordered group has unmatched members at end of element",
                    ),
                }
                .with_path(cur.path()));
            }
        }
    }
    Ok(Slot::Group(assigned.into_iter().flatten().collect()))
}

/// Appends matches of `inner` to `items` until one fails or succeeds without
/// consuming any child element (the latter would otherwise loop forever).
fn collect_repeats<'d>(node: &Node, cur: &mut Cursor<'d>, items: &mut Vec<Slot>) {
    loop {
        let start = cur.mark();
        match consume(node, cur) {
            Ok(slot) => {
                if cur.consumed_since(&start) == 0 {
                    cur.reset(&start);
                    return;
                }
                items.push(slot);
            }
            Err(_) => {
                cur.reset(&start);
                return;
            }
        }
    }
}
