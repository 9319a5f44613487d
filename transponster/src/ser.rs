// SPDX-License-Identifier: MIT OR Apache-2.0

//! The produce engine: emits a document from a descriptor tree and a
//! matching [`Slot`] tree.
//!
//! Serialization is deterministic. There is no speculation and no
//! backtracking: group members emit in declaration order, and a slot whose
//! shape or value the descriptor cannot express fails with
//! [`crate::ErrorKind::InvalidState`] before anything reaches the output
//! element.

use crate::dom::Element;
use crate::leaf::Leaf;
use crate::schema::Node;
use crate::slot::Slot;
use crate::Error;

/// Emits `slot` into `dst` according to `node`. `dst` is the element the
/// descriptor is scoped to; `Element` descriptors append children to it,
/// `Attribute` and `Text` descriptors mutate it directly.
pub fn produce(node: &Node, slot: &Slot, dst: &mut Element) -> Result<(), Error> {
    match node {
        Node::Attribute { name, leaf } => {
            let text = generate_leaf(leaf, slot)?;
            dst.set_attribute(*name, text);
            Ok(())
        }
        Node::Element { name, inner } => {
            let mut child = Element::new(*name);
            produce(inner, slot, &mut child)?;
            dst.push_child(child);
            Ok(())
        }
        Node::Text { leaf } => {
            let text = generate_leaf(leaf, slot)?;
            dst.set_text(text);
            Ok(())
        }
        Node::Empty => match slot {
            Slot::Present => Ok(()),
            s => Err(shape_mismatch("presence flag", s)),
        },
        Node::Fragment(inner) => produce(inner, slot, dst),
        Node::Ordered(members) | Node::Unordered(members) => {
            let slots = match slot {
                Slot::Group(slots) => slots,
                s => return Err(shape_mismatch("group", s)),
            };
            if slots.len() != members.len() {
                return Err(Error::invalid_state(format!(
                    "group has {} members but slot has {}",
                    members.len(),
                    slots.len()
                )));
            }
            for (member, slot) in members.iter().zip(slots) {
                produce(member, slot, dst)?;
            }
            Ok(())
        }
        Node::Choice(arms) => {
            let (arm, value) = match slot {
                Slot::Choice { arm, value } => (*arm, &**value),
                s => return Err(shape_mismatch("choice", s)),
            };
            let descriptor = arms.get(arm).ok_or_else(|| {
                Error::invalid_state(format!(
                    "choice arm {} out of range ({} arms)",
                    arm,
                    arms.len()
                ))
            })?;
            produce(descriptor, value, dst)
        }
        Node::Optional(inner) => match slot {
            Slot::Absent => Ok(()),
            s => produce(inner, s, dst),
        },
        Node::ZeroOrMore(inner) => {
            let items = match slot {
                Slot::List(items) => items,
                s => return Err(shape_mismatch("list", s)),
            };
            for item in items {
                produce(inner, item, dst)?;
            }
            Ok(())
        }
        Node::OneOrMore(inner) => {
            let items = match slot {
                Slot::List(items) if !items.is_empty() => items,
                Slot::List(_) => {
                    return Err(Error::invalid_state("one-or-more list is empty"))
                }
                s => return Err(shape_mismatch("list", s)),
            };
            for item in items {
                produce(inner, item, dst)?;
            }
            Ok(())
        }
    }
}

fn generate_leaf(leaf: &Leaf, slot: &Slot) -> Result<String, Error> {
    let value = match slot {
        Slot::Scalar(value) => value,
        s => return Err(shape_mismatch("scalar", s)),
    };
    leaf.generate(value).ok_or_else(|| {
        Error::invalid_state(format!("value {:?} not valid for {}", value, leaf.name()))
    })
}

fn shape_mismatch(wanted: &str, got: &Slot) -> Error {
    Error::invalid_state(format!("expected {} slot, got {:?}", wanted, got))
}
