// SPDX-License-Identifier: MIT OR Apache-2.0

//! The value tree the two engines exchange.
//!
//! [`Slot`]'s shape mirrors the descriptor that produced it: group nodes
//! yield `Group`, quantifiers yield `Absent`/`List`, and so on (the mapping
//! is documented on each [`crate::schema::Node`] variant). Composite types
//! destructure a `Slot` into their fields with the checked accessors here,
//! which fail with an invalid-state error rather than panicking when a
//! descriptor and its assemble function drift apart.

use crate::leaf::Value;
use crate::Error;

#[derive(Clone, Debug, PartialEq)]
pub enum Slot {
    /// An `Optional` that didn't match.
    Absent,

    /// A matched `Empty` presence flag.
    Present,

    /// A leaf value from an `Attribute` or `Text` descriptor.
    Scalar(Value),

    /// One entry per member of an `Ordered` or `Unordered` group, in
    /// declaration order.
    Group(Vec<Slot>),

    /// The winning arm of a `Choice` and its value.
    Choice { arm: usize, value: Box<Slot> },

    /// One entry per match of a `ZeroOrMore` or `OneOrMore` descriptor, in
    /// document order.
    List(Vec<Slot>),
}

impl Slot {
    pub fn scalar(value: Value) -> Slot {
        Slot::Scalar(value)
    }

    pub fn choice(arm: usize, value: Slot) -> Slot {
        Slot::Choice {
            arm,
            value: Box::new(value),
        }
    }

    /// `Absent` becomes `None`; everything else becomes `Some`.
    pub fn opt(self) -> Option<Slot> {
        match self {
            Slot::Absent => None,
            s => Some(s),
        }
    }

    pub fn is_present(&self) -> bool {
        !matches!(self, Slot::Absent)
    }

    pub fn into_scalar(self) -> Result<Value, Error> {
        match self {
            Slot::Scalar(v) => Ok(v),
            s => Err(mismatch("scalar", &s)),
        }
    }

    pub fn into_group(self) -> Result<Vec<Slot>, Error> {
        match self {
            Slot::Group(members) => Ok(members),
            s => Err(mismatch("group", &s)),
        }
    }

    pub fn into_choice(self) -> Result<(usize, Slot), Error> {
        match self {
            Slot::Choice { arm, value } => Ok((arm, *value)),
            s => Err(mismatch("choice", &s)),
        }
    }

    pub fn into_list(self) -> Result<Vec<Slot>, Error> {
        match self {
            Slot::List(items) => Ok(items),
            s => Err(mismatch("list", &s)),
        }
    }
}

fn mismatch(wanted: &str, got: &Slot) -> Error {
    Error::invalid_state(format!("expected {} slot, got {:?}", wanted, got))
}
