// SPDX-License-Identifier: MIT OR Apache-2.0

//! A subset of the libvirt domain description: the `<domain>` document with
//! disk and network-interface devices.

use std::sync::{Arc, OnceLock};

use transponster::leaf::{Leaf, Value};
use transponster::schema::{self, Node};
use transponster::slot::Slot;
use transponster::{Composite, Error, NameRef};

use crate::{
    leaf_row, opt_slot, take, take_opt_text, take_text, take_unsigned, text_of, text_slot,
    unsigned_of, wire_enum,
};

wire_enum! {
    /// The hypervisor driver, `<domain type=...>`.
    pub enum HvType, "hypervisor type" {
        Qemu = "qemu",
        Kvm = "kvm",
        Xen = "xen",
        Lxc = "lxc",
        Test = "test",
    }
}

wire_enum! {
    pub enum DiskDevice, "disk device" {
        Disk = "disk",
        Cdrom = "cdrom",
        Floppy = "floppy",
        Lun = "lun",
    }
}

wire_enum! {
    pub enum BusType, "bus type" {
        Ide = "ide",
        Scsi = "scsi",
        Virtio = "virtio",
        Usb = "usb",
        Sata = "sata",
    }
}

wire_enum! {
    pub enum OsType, "OS type" {
        Hvm = "hvm",
        Linux = "linux",
        Exe = "exe",
    }
}

wire_enum! {
    pub enum BootDev, "boot device" {
        Hd = "hd",
        Cdrom = "cdrom",
        Network = "network",
        Fd = "fd",
    }
}

wire_enum! {
    /// What to do at start when a disk's backing source is missing.
    pub enum StartupPolicy, "startup policy" {
        Mandatory = "mandatory",
        Requisite = "requisite",
        Optional = "optional",
    }
}

wire_enum! {
    pub enum VcpuPlacement, "vcpu placement" {
        Static = "static",
        Auto = "auto",
    }
}

wire_enum! {
    pub enum DriverCache, "driver cache" {
        Default = "default",
        None = "none",
        Writethrough = "writethrough",
        Writeback = "writeback",
        Directsync = "directsync",
        Unsafe = "unsafe",
    }
}

leaf_row!(fn serial_number, Leaf::token("serial number"));
leaf_row!(fn tap_device, Leaf::token("tap device"));
leaf_row!(fn model_type, Leaf::token("model type"));
leaf_row!(fn driver_name, Leaf::token("driver name"));
leaf_row!(fn driver_format, Leaf::token("driver format"));

/// The `<driver>` line of a disk: which backend opens the image and how.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DiskDriver {
    pub name: String,

    /// Image format, `type=...`, e.g. "raw" or "qcow2".
    pub format: Option<String>,
    pub cache: Option<DriverCache>,
}

impl Composite for DiskDriver {
    fn schema() -> Arc<Node> {
        static SCHEMA: OnceLock<Arc<Node>> = OnceLock::new();
        SCHEMA
            .get_or_init(|| {
                schema::element(
                    NameRef::local("driver"),
                    schema::ordered(vec![
                        schema::attribute(NameRef::local("name"), driver_name()),
                        schema::optional(schema::attribute(
                            NameRef::local("type"),
                            driver_format(),
                        )),
                        schema::optional(schema::attribute(
                            NameRef::local("cache"),
                            DriverCache::leaf(),
                        )),
                    ]),
                )
            })
            .clone()
    }

    fn assemble(slot: Slot) -> Result<Self, Error> {
        let mut parts = slot.into_group()?.into_iter();
        Ok(DiskDriver {
            name: take_text(&mut parts)?,
            format: take_opt_text(&mut parts)?,
            cache: take(&mut parts)?
                .opt()
                .map(DriverCache::from_slot)
                .transpose()?,
        })
    }

    fn dissolve(&self) -> Slot {
        Slot::Group(vec![
            text_slot(&self.name),
            opt_slot(self.format.as_deref().map(text_slot)),
            opt_slot(self.cache.map(DriverCache::to_slot)),
        ])
    }
}

/// `<vcpu>`: the count as text, placement as an attribute.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Vcpu {
    pub placement: Option<VcpuPlacement>,
    pub count: u64,
}

impl Composite for Vcpu {
    fn schema() -> Arc<Node> {
        static SCHEMA: OnceLock<Arc<Node>> = OnceLock::new();
        SCHEMA
            .get_or_init(|| {
                schema::element(
                    NameRef::local("vcpu"),
                    schema::ordered(vec![
                        schema::optional(schema::attribute(
                            NameRef::local("placement"),
                            VcpuPlacement::leaf(),
                        )),
                        schema::text(crate::positive_integer()),
                    ]),
                )
            })
            .clone()
    }

    fn assemble(slot: Slot) -> Result<Self, Error> {
        let mut parts = slot.into_group()?.into_iter();
        Ok(Vcpu {
            placement: take(&mut parts)?
                .opt()
                .map(VcpuPlacement::from_slot)
                .transpose()?,
            count: take_unsigned(&mut parts)?,
        })
    }

    fn dissolve(&self) -> Slot {
        Slot::Group(vec![
            opt_slot(self.placement.map(VcpuPlacement::to_slot)),
            Slot::Scalar(Value::Unsigned(self.count)),
        ])
    }
}

/// What backs a disk: a file in the host filesystem or a host block device.
///
/// Both shapes are a `<source>` element distinguished by attribute; the
/// file-backed arm is declared first and so wins if a document somehow
/// carries both attributes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DiskSource {
    File {
        file: String,
        startup_policy: Option<StartupPolicy>,
    },
    Block {
        dev: String,
    },
}

impl Composite for DiskSource {
    fn schema() -> Arc<Node> {
        static SCHEMA: OnceLock<Arc<Node>> = OnceLock::new();
        SCHEMA
            .get_or_init(|| {
                schema::element(
                    NameRef::local("source"),
                    schema::choice(vec![
                        schema::ordered(vec![
                            schema::attribute(NameRef::local("file"), crate::abs_file_path()),
                            schema::optional(schema::attribute(
                                NameRef::local("startupPolicy"),
                                StartupPolicy::leaf(),
                            )),
                        ]),
                        schema::attribute(NameRef::local("dev"), crate::abs_file_path()),
                    ]),
                )
            })
            .clone()
    }

    fn assemble(slot: Slot) -> Result<Self, Error> {
        let (arm, value) = slot.into_choice()?;
        match arm {
            0 => {
                let mut parts = value.into_group()?.into_iter();
                let file = take_text(&mut parts)?;
                let startup_policy = take(&mut parts)?
                    .opt()
                    .map(StartupPolicy::from_slot)
                    .transpose()?;
                Ok(DiskSource::File {
                    file,
                    startup_policy,
                })
            }
            1 => Ok(DiskSource::Block {
                dev: text_of(value)?,
            }),
            _ => Err(Error::invalid_state(format!("bad source arm {}", arm))),
        }
    }

    fn dissolve(&self) -> Slot {
        match self {
            DiskSource::File {
                file,
                startup_policy,
            } => Slot::choice(
                0,
                Slot::Group(vec![
                    text_slot(file),
                    opt_slot(startup_policy.map(StartupPolicy::to_slot)),
                ]),
            ),
            DiskSource::Block { dev } => Slot::choice(1, text_slot(dev)),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Disk {
    pub device: Option<DiskDevice>,
    pub driver: Option<DiskDriver>,
    pub source: Option<DiskSource>,

    /// `<target dev=...>`, e.g. "vda".
    pub target_dev: String,
    pub bus: Option<BusType>,
    pub boot_order: Option<u64>,
    pub readonly: bool,
    pub serial: Option<String>,
}

impl Composite for Disk {
    fn schema() -> Arc<Node> {
        static SCHEMA: OnceLock<Arc<Node>> = OnceLock::new();
        SCHEMA
            .get_or_init(|| {
                schema::element(
                    NameRef::local("disk"),
                    schema::ordered(vec![
                        schema::optional(schema::attribute(
                            NameRef::local("device"),
                            DiskDevice::leaf(),
                        )),
                        schema::unordered(vec![
                            schema::optional(DiskDriver::schema()),
                            schema::optional(DiskSource::schema()),
                            schema::element(
                                NameRef::local("target"),
                                schema::ordered(vec![
                                    schema::attribute(
                                        NameRef::local("dev"),
                                        crate::disk_target(),
                                    ),
                                    schema::optional(schema::attribute(
                                        NameRef::local("bus"),
                                        BusType::leaf(),
                                    )),
                                ]),
                            ),
                            schema::optional(schema::element(
                                NameRef::local("boot"),
                                schema::attribute(
                                    NameRef::local("order"),
                                    crate::positive_integer(),
                                ),
                            )),
                            schema::flag_element(NameRef::local("readonly")),
                            schema::optional(schema::text_element(
                                NameRef::local("serial"),
                                serial_number(),
                            )),
                        ]),
                    ]),
                )
            })
            .clone()
    }

    fn assemble(slot: Slot) -> Result<Self, Error> {
        let mut parts = slot.into_group()?.into_iter();
        let device = take(&mut parts)?
            .opt()
            .map(DiskDevice::from_slot)
            .transpose()?;
        let mut body = take(&mut parts)?.into_group()?.into_iter();
        let driver = take(&mut body)?
            .opt()
            .map(DiskDriver::assemble)
            .transpose()?;
        let source = take(&mut body)?
            .opt()
            .map(DiskSource::assemble)
            .transpose()?;
        let mut target = take(&mut body)?.into_group()?.into_iter();
        let target_dev = take_text(&mut target)?;
        let bus = take(&mut target)?.opt().map(BusType::from_slot).transpose()?;
        let boot_order = take(&mut body)?.opt().map(unsigned_of).transpose()?;
        let readonly = take(&mut body)?.is_present();
        let serial = take_opt_text(&mut body)?;
        Ok(Disk {
            device,
            driver,
            source,
            target_dev,
            bus,
            boot_order,
            readonly,
            serial,
        })
    }

    fn dissolve(&self) -> Slot {
        Slot::Group(vec![
            opt_slot(self.device.map(DiskDevice::to_slot)),
            Slot::Group(vec![
                opt_slot(self.driver.as_ref().map(Composite::dissolve)),
                opt_slot(self.source.as_ref().map(Composite::dissolve)),
                Slot::Group(vec![
                    text_slot(&self.target_dev),
                    opt_slot(self.bus.map(BusType::to_slot)),
                ]),
                opt_slot(self.boot_order.map(|o| Slot::Scalar(Value::Unsigned(o)))),
                if self.readonly {
                    Slot::Present
                } else {
                    Slot::Absent
                },
                opt_slot(self.serial.as_deref().map(text_slot)),
            ]),
        ])
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Interface {
    /// `<mac address=...>`; must be unicast.
    pub mac: String,

    /// The host-side tap device, `<target dev=...>`.
    pub target_dev: Option<String>,

    /// The emulated NIC model, `<model type=...>`.
    pub model: Option<String>,
}

impl Composite for Interface {
    fn schema() -> Arc<Node> {
        static SCHEMA: OnceLock<Arc<Node>> = OnceLock::new();
        SCHEMA
            .get_or_init(|| {
                schema::element(
                    NameRef::local("interface"),
                    schema::unordered(vec![
                        schema::element(
                            NameRef::local("mac"),
                            schema::attribute(
                                NameRef::local("address"),
                                crate::unicast_mac_addr(),
                            ),
                        ),
                        schema::optional(schema::element(
                            NameRef::local("target"),
                            schema::attribute(NameRef::local("dev"), tap_device()),
                        )),
                        schema::optional(schema::element(
                            NameRef::local("model"),
                            schema::attribute(NameRef::local("type"), model_type()),
                        )),
                    ]),
                )
            })
            .clone()
    }

    fn assemble(slot: Slot) -> Result<Self, Error> {
        let mut parts = slot.into_group()?.into_iter();
        Ok(Interface {
            mac: take_text(&mut parts)?,
            target_dev: take_opt_text(&mut parts)?,
            model: take_opt_text(&mut parts)?,
        })
    }

    fn dissolve(&self) -> Slot {
        Slot::Group(vec![
            text_slot(&self.mac),
            opt_slot(self.target_dev.as_deref().map(text_slot)),
            opt_slot(self.model.as_deref().map(text_slot)),
        ])
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Os {
    pub os_type: OsType,

    /// Boot devices tried in document order.
    pub boot: Vec<BootDev>,
}

impl Composite for Os {
    fn schema() -> Arc<Node> {
        static SCHEMA: OnceLock<Arc<Node>> = OnceLock::new();
        SCHEMA
            .get_or_init(|| {
                schema::element(
                    NameRef::local("os"),
                    schema::ordered(vec![
                        schema::text_element(NameRef::local("type"), OsType::leaf()),
                        schema::zero_or_more(schema::element(
                            NameRef::local("boot"),
                            schema::attribute(NameRef::local("dev"), BootDev::leaf()),
                        )),
                    ]),
                )
            })
            .clone()
    }

    fn assemble(slot: Slot) -> Result<Self, Error> {
        let mut parts = slot.into_group()?.into_iter();
        let os_type = OsType::from_slot(take(&mut parts)?)?;
        let boot = take(&mut parts)?
            .into_list()?
            .into_iter()
            .map(BootDev::from_slot)
            .collect::<Result<_, _>>()?;
        Ok(Os { os_type, boot })
    }

    fn dissolve(&self) -> Slot {
        Slot::Group(vec![
            self.os_type.to_slot(),
            Slot::List(self.boot.iter().map(|b| b.to_slot()).collect()),
        ])
    }
}

/// One entry of `<devices>`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Device {
    Disk(Disk),
    Interface(Interface),
}

impl Device {
    fn from_slot(slot: Slot) -> Result<Self, Error> {
        let (arm, value) = slot.into_choice()?;
        match arm {
            0 => Ok(Device::Disk(Disk::assemble(value)?)),
            1 => Ok(Device::Interface(Interface::assemble(value)?)),
            _ => Err(Error::invalid_state(format!("bad device arm {}", arm))),
        }
    }

    fn to_slot(&self) -> Slot {
        match self {
            Device::Disk(d) => Slot::choice(0, d.dissolve()),
            Device::Interface(i) => Slot::choice(1, i.dissolve()),
        }
    }
}

/// The `<domain>` document.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Domain {
    pub hv_type: HvType,
    pub name: String,
    pub uuid: Option<String>,
    pub title: Option<String>,

    /// `<memory>`, in KiB.
    pub memory_kib: u64,
    pub vcpu: Option<Vcpu>,
    pub os: Os,
    pub devices: Vec<Device>,
}

impl Composite for Domain {
    fn schema() -> Arc<Node> {
        static SCHEMA: OnceLock<Arc<Node>> = OnceLock::new();
        SCHEMA
            .get_or_init(|| {
                schema::element(
                    NameRef::local("domain"),
                    schema::ordered(vec![
                        schema::attribute(NameRef::local("type"), HvType::leaf()),
                        schema::unordered(vec![
                            schema::text_element(NameRef::local("name"), crate::name()),
                            schema::optional(schema::text_element(
                                NameRef::local("uuid"),
                                crate::uuid(),
                            )),
                            schema::optional(schema::text_element(
                                NameRef::local("title"),
                                crate::title(),
                            )),
                            schema::text_element(
                                NameRef::local("memory"),
                                crate::unsigned_int(),
                            ),
                            schema::optional(Vcpu::schema()),
                            Os::schema(),
                            schema::optional(schema::element(
                                NameRef::local("devices"),
                                schema::zero_or_more(schema::choice(vec![
                                    Disk::schema(),
                                    Interface::schema(),
                                ])),
                            )),
                        ]),
                    ]),
                )
            })
            .clone()
    }

    fn assemble(slot: Slot) -> Result<Self, Error> {
        let mut parts = slot.into_group()?.into_iter();
        let hv_type = HvType::from_slot(take(&mut parts)?)?;
        let mut body = take(&mut parts)?.into_group()?.into_iter();
        let name = take_text(&mut body)?;
        let uuid = take_opt_text(&mut body)?;
        let title = take_opt_text(&mut body)?;
        let memory_kib = take_unsigned(&mut body)?;
        let vcpu = take(&mut body)?.opt().map(Vcpu::assemble).transpose()?;
        let os = Os::assemble(take(&mut body)?)?;
        let devices = match take(&mut body)?.opt() {
            Some(list) => list
                .into_list()?
                .into_iter()
                .map(Device::from_slot)
                .collect::<Result<_, _>>()?,
            None => Vec::new(),
        };
        Ok(Domain {
            hv_type,
            name,
            uuid,
            title,
            memory_kib,
            vcpu,
            os,
            devices,
        })
    }

    fn dissolve(&self) -> Slot {
        let devices = if self.devices.is_empty() {
            Slot::Absent
        } else {
            Slot::List(self.devices.iter().map(Device::to_slot).collect())
        };
        Slot::Group(vec![
            self.hv_type.to_slot(),
            Slot::Group(vec![
                text_slot(&self.name),
                opt_slot(self.uuid.as_deref().map(text_slot)),
                opt_slot(self.title.as_deref().map(text_slot)),
                Slot::Scalar(Value::Unsigned(self.memory_kib)),
                opt_slot(self.vcpu.as_ref().map(Composite::dissolve)),
                self.os.dissolve(),
                devices,
            ]),
        ])
    }
}
