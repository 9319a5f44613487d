// SPDX-License-Identifier: MIT OR Apache-2.0

//! A representative libvirt-flavored dialect used to exercise the engine:
//! scalar registry rows, wire enums, and composite types for a domain
//! description and a snapshot document that embeds one.

use std::sync::{Arc, OnceLock};

use transponster::leaf::{Leaf, Value};
use transponster::slot::Slot;
use transponster::Error;

pub mod domain;
pub mod snapshot;

/// Declares a registry-row accessor: builds the row on first use and hands
/// out shared references after.
macro_rules! leaf_row {
    ($(#[$meta:meta])* $vis:vis fn $fn_name:ident, $build:expr) => {
        $(#[$meta])*
        $vis fn $fn_name() -> Arc<Leaf> {
            static ROW: OnceLock<Arc<Leaf>> = OnceLock::new();
            ROW.get_or_init(|| Arc::new($build)).clone()
        }
    };
}

/// Declares a wire enum: a Rust enum whose variants map to document tags
/// through an ordered table, plus a registry row over that table.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident, $leaf_name:literal {
            $($variant:ident = $tag:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Eq, PartialEq)]
        $vis enum $name {
            $($variant,)+
        }

        impl $name {
            $vis fn leaf() -> Arc<Leaf> {
                static ROW: OnceLock<Arc<Leaf>> = OnceLock::new();
                ROW.get_or_init(|| {
                    Arc::new(Leaf::enumerated(
                        $leaf_name,
                        transponster::enums::EnumTable::new(&[
                            $(($name::$variant as usize, $tag),)+
                        ]),
                    ))
                })
                .clone()
            }

            $vis fn from_slot(slot: Slot) -> Result<Self, Error> {
                const ALL: &[$name] = &[$($name::$variant),+];
                let value = slot.into_scalar()?;
                value
                    .as_enum()
                    .and_then(|d| ALL.get(d).copied())
                    .ok_or_else(|| {
                        Error::invalid_state(format!(
                            concat!("bad ", $leaf_name, " value {:?}"),
                            value
                        ))
                    })
            }

            $vis fn to_slot(self) -> Slot {
                Slot::Scalar(Value::Enum(self as usize))
            }
        }
    };
}

pub(crate) use {leaf_row, wire_enum};

leaf_row!(
    /// A domain or snapshot name; libvirt accepts nearly anything here.
    pub fn name, Leaf::token("name")
);
leaf_row!(pub fn title, Leaf::token("title"));
leaf_row!(
    pub fn uuid,
    Leaf::pattern("UUID", r"[a-fA-F0-9]{8}\-([a-fA-F0-9]{4}\-){3}[a-fA-F0-9]{12}")
);
leaf_row!(pub fn unsigned_int, Leaf::unsigned("unsigned int", 0, u32::MAX as u64));
leaf_row!(pub fn positive_integer, Leaf::unsigned("positive integer", 1, u32::MAX as u64));
leaf_row!(pub fn unsigned_short, Leaf::unsigned("unsigned short", 0, 65_535));
leaf_row!(
    /// A usable TCP/UDP port.
    pub fn port, Leaf::signed("port", 1, 65_535)
);
leaf_row!(
    /// A port field where -1 means "auto-allocate".
    pub fn port_number, Leaf::signed("port number", -1, 65_535)
);
leaf_row!(
    pub fn mac_addr,
    Leaf::pattern("MAC address", r"[a-fA-F0-9]{2}(:[a-fA-F0-9]{2}){5}")
);
leaf_row!(
    /// A MAC address whose second hex digit marks it unicast.
    pub fn unicast_mac_addr,
    Leaf::pattern("unicast MAC address", r"[a-fA-F0-9][02468aAcCeE](:[a-fA-F0-9]{2}){5}")
);
leaf_row!(
    pub fn disk_target,
    Leaf::pattern("disk target", r"(ioemu:)?(fd|hd|sd|vd|xvd|ubd)[a-zA-Z0-9_]+")
);
leaf_row!(
    pub fn abs_file_path,
    Leaf::pattern("absolute file path", r#"/[a-zA-Z0-9_\.\+\-\\&"{}'<>/%,: ]+"#)
);
leaf_row!(pub fn ipv4_prefix, Leaf::unsigned("IPv4 prefix", 0, 32));
leaf_row!(
    /// A filesystem mode in octal, e.g. "0644".
    pub fn octal_mode, Leaf::pattern("octal mode", "[0-7]+")
);
leaf_row!(pub fn virtual_port_profile, Leaf::max_len("port profile", 39));
leaf_row!(
    /// Snapshot creation time, seconds since the epoch.
    pub fn epoch_seconds,
    Leaf::signed("epoch seconds", -(1 << 53), 1 << 53)
);

/// Pulls the next member out of a destructured group, failing rather than
/// panicking if the schema and the assemble function disagree on arity.
pub(crate) fn take(parts: &mut std::vec::IntoIter<Slot>) -> Result<Slot, Error> {
    parts
        .next()
        .ok_or_else(|| Error::invalid_state("group slot too short"))
}

pub(crate) fn take_text(parts: &mut std::vec::IntoIter<Slot>) -> Result<String, Error> {
    text_of(take(parts)?)
}

pub(crate) fn take_opt_text(
    parts: &mut std::vec::IntoIter<Slot>,
) -> Result<Option<String>, Error> {
    take(parts)?.opt().map(text_of).transpose()
}

pub(crate) fn take_unsigned(parts: &mut std::vec::IntoIter<Slot>) -> Result<u64, Error> {
    unsigned_of(take(parts)?)
}

pub(crate) fn unsigned_of(slot: Slot) -> Result<u64, Error> {
    let value = slot.into_scalar()?;
    value
        .as_unsigned()
        .ok_or_else(|| Error::invalid_state(format!("expected unsigned value, got {:?}", value)))
}

pub(crate) fn signed_of(slot: Slot) -> Result<i64, Error> {
    let value = slot.into_scalar()?;
    value
        .as_signed()
        .ok_or_else(|| Error::invalid_state(format!("expected signed value, got {:?}", value)))
}

pub(crate) fn text_of(slot: Slot) -> Result<String, Error> {
    match slot.into_scalar()? {
        Value::Text(t) => Ok(t),
        v => Err(Error::invalid_state(format!(
            "expected text value, got {:?}",
            v
        ))),
    }
}

pub(crate) fn text_slot(text: &str) -> Slot {
    Slot::Scalar(Value::Text(text.to_owned()))
}

pub(crate) fn opt_slot(opt: Option<Slot>) -> Slot {
    opt.unwrap_or(Slot::Absent)
}
