// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `<domainsnapshot>` document, which may embed a full domain
//! description capturing the configuration at the time the snapshot was
//! taken.

use std::sync::{Arc, OnceLock};

use transponster::leaf::{Leaf, Value};
use transponster::schema::{self, Node};
use transponster::slot::Slot;
use transponster::{Composite, Error, NameRef};

use crate::domain::Domain;
use crate::{
    leaf_row, opt_slot, signed_of, take, take_opt_text, text_slot, wire_enum,
};

wire_enum! {
    /// Where the guest's memory image lives, `<memory snapshot=...>`.
    pub enum MemoryKind, "memory snapshot kind" {
        No = "no",
        Internal = "internal",
        External = "external",
    }
}

leaf_row!(fn description, Leaf::token("description"));
leaf_row!(fn domain_state, Leaf::token("domain state"));

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SnapshotMemory {
    pub kind: MemoryKind,

    /// Image path; only meaningful for [`MemoryKind::External`].
    pub file: Option<String>,
}

impl Composite for SnapshotMemory {
    fn schema() -> Arc<Node> {
        static SCHEMA: OnceLock<Arc<Node>> = OnceLock::new();
        SCHEMA
            .get_or_init(|| {
                schema::element(
                    NameRef::local("memory"),
                    schema::ordered(vec![
                        schema::attribute(NameRef::local("snapshot"), MemoryKind::leaf()),
                        schema::optional(schema::attribute(
                            NameRef::local("file"),
                            crate::abs_file_path(),
                        )),
                    ]),
                )
            })
            .clone()
    }

    fn assemble(slot: Slot) -> Result<Self, Error> {
        let mut parts = slot.into_group()?.into_iter();
        Ok(SnapshotMemory {
            kind: MemoryKind::from_slot(take(&mut parts)?)?,
            file: take_opt_text(&mut parts)?,
        })
    }

    fn dissolve(&self) -> Slot {
        Slot::Group(vec![
            self.kind.to_slot(),
            opt_slot(self.file.as_deref().map(text_slot)),
        ])
    }
}

/// The `<domainsnapshot>` document. Every field is optional; libvirt fills
/// in what the caller omits.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Snapshot {
    pub name: Option<String>,
    pub description: Option<String>,

    /// Guest state at the time of the snapshot, e.g. "running" or "shutoff".
    pub state: Option<String>,

    /// Seconds since the epoch.
    pub creation_time: Option<i64>,
    pub memory: Option<SnapshotMemory>,

    /// The configuration of the domain the snapshot was taken from.
    pub domain: Option<Domain>,
}

impl Composite for Snapshot {
    fn schema() -> Arc<Node> {
        static SCHEMA: OnceLock<Arc<Node>> = OnceLock::new();
        SCHEMA
            .get_or_init(|| {
                schema::element(
                    NameRef::local("domainsnapshot"),
                    schema::unordered(vec![
                        schema::optional(schema::text_element(
                            NameRef::local("name"),
                            crate::name(),
                        )),
                        schema::optional(schema::text_element(
                            NameRef::local("description"),
                            description(),
                        )),
                        schema::optional(schema::text_element(
                            NameRef::local("state"),
                            domain_state(),
                        )),
                        schema::optional(schema::text_element(
                            NameRef::local("creationTime"),
                            crate::epoch_seconds(),
                        )),
                        schema::optional(SnapshotMemory::schema()),
                        schema::optional(Domain::schema()),
                    ]),
                )
            })
            .clone()
    }

    fn assemble(slot: Slot) -> Result<Self, Error> {
        let mut parts = slot.into_group()?.into_iter();
        let name = take_opt_text(&mut parts)?;
        let description = take_opt_text(&mut parts)?;
        let state = take_opt_text(&mut parts)?;
        let creation_time = take(&mut parts)?.opt().map(signed_of).transpose()?;
        let memory = take(&mut parts)?
            .opt()
            .map(SnapshotMemory::assemble)
            .transpose()?;
        let domain = take(&mut parts)?.opt().map(Domain::assemble).transpose()?;
        Ok(Snapshot {
            name,
            description,
            state,
            creation_time,
            memory,
            domain,
        })
    }

    fn dissolve(&self) -> Slot {
        Slot::Group(vec![
            opt_slot(self.name.as_deref().map(text_slot)),
            opt_slot(self.description.as_deref().map(text_slot)),
            opt_slot(self.state.as_deref().map(text_slot)),
            opt_slot(
                self.creation_time
                    .map(|t| Slot::Scalar(Value::Signed(t))),
            ),
            opt_slot(self.memory.as_ref().map(Composite::dissolve)),
            opt_slot(self.domain.as_ref().map(Composite::dissolve)),
        ])
    }
}
