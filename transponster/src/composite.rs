// SPDX-License-Identifier: MIT OR Apache-2.0

//! The trait tying a Rust record type to its descriptor.

use std::sync::Arc;

use crate::de::{self, Cursor};
use crate::dom::Element;
use crate::schema::Node;
use crate::ser;
use crate::slot::Slot;
use crate::{Error, NameRef};

/// A typed record marshalled through a descriptor tree.
///
/// Implementations supply three things: the descriptor ([`schema`]), the
/// slot-to-fields conversion ([`assemble`]), and its inverse ([`dissolve`]).
/// The provided [`load`] and [`save`] wire them to the two engines.
///
/// `schema()` must return an `Element` descriptor at its root (possibly
/// wrapped in `Fragment`s); `load` verifies the root tag through it, and
/// `save` relies on it to emit exactly one element.
///
/// [`schema`]: Composite::schema
/// [`assemble`]: Composite::assemble
/// [`dissolve`]: Composite::dissolve
/// [`load`]: Composite::load
/// [`save`]: Composite::save
pub trait Composite: Sized {
    /// The descriptor for this type. Implementations build it once and share
    /// it (typically via `OnceLock`), both across calls and with any other
    /// composite that embeds this one.
    fn schema() -> Arc<Node>;

    /// Converts an extracted slot tree into a record. Fails with an
    /// invalid-state error if the slot's shape doesn't match what
    /// [`Composite::schema`] yields.
    fn assemble(slot: Slot) -> Result<Self, Error>;

    /// Converts this record back into the slot tree [`Composite::schema`]
    /// expects.
    fn dissolve(&self) -> Slot;

    /// Deserializes a record from `root`, requiring every attribute
    /// constraint to hold and every child element to be accounted for.
    fn load(root: &Element) -> Result<Self, Error> {
        let schema = Self::schema();
        let mut cur = Cursor::new(root);
        let slot = de::consume(&schema, &mut cur)?;
        Self::assemble(slot)
    }

    /// Serializes this record as a new element tree.
    fn save(&self) -> Result<Element, Error> {
        let mut holder = Element::new(NameRef::local("#holder"));
        self.save_into(&mut holder)?;
        holder
            .pop_only_child()
            .ok_or_else(|| Error::invalid_state("schema root did not emit a single element"))
    }

    /// Serializes this record, appending its element to `parent`. This is
    /// how one document embeds another, e.g. a snapshot carrying the full
    /// description of the domain it captured.
    fn save_into(&self, parent: &mut Element) -> Result<(), Error> {
        ser::produce(&Self::schema(), &self.dissolve(), parent)
    }
}
