// SPDX-License-Identifier: MIT OR Apache-2.0

use assert_matches::assert_matches;
use test_suite::domain::{BusType, Disk, Domain, Os, OsType};
use test_suite::snapshot::SnapshotMemory;
use transponster::dom::Element;
use transponster::{Composite, ErrorKind};

fn init() {
    let _ = env_logger::Builder::new().is_test(true).try_init();
}

#[test]
fn bad_enum_attribute() {
    init();
    let err = Domain::load(
        &Element::from_str(
            r#"<domain type="vmware"><name>x</name><memory>1</memory><os><type>hvm</type></os></domain>"#,
        )
        .unwrap(),
    )
    .unwrap_err();
    assert_matches!(err.kind(), ErrorKind::Semantic { leaf: "hypervisor type", .. });
}

#[test]
fn bad_text_leaf_reports_path() {
    init();
    let err = Os::load(&Element::from_str("<os><type>windows</type></os>").unwrap()).unwrap_err();
    assert_matches!(err.kind(), ErrorKind::Semantic { leaf: "OS type", .. });
    let path: Vec<String> = err.path().iter().map(|n| n.to_string()).collect();
    assert_eq!(path, ["os", "type"]);
}

#[test]
fn bad_snapshot_memory_kind() {
    init();
    let err = SnapshotMemory::load(&Element::from_str(r#"<memory snapshot="maybe"/>"#).unwrap())
        .unwrap_err();
    assert_matches!(err.kind(), ErrorKind::Semantic { .. });
}

#[test]
fn memory_must_be_numeric() {
    init();
    // The failing <memory> member leaves the group unable to assign it,
    // which surfaces as a structural error on the unmatched element.
    let err = Domain::load(
        &Element::from_str(
            r#"<domain type="kvm"><name>x</name><memory>lots</memory><os><type>hvm</type></os></domain>"#,
        )
        .unwrap(),
    )
    .unwrap_err();
    assert_matches!(err.kind(), ErrorKind::Structural(_));
}

#[test]
fn leaf_rows_reject_out_of_range() {
    init();
    assert!(test_suite::port().read("0").is_err());
    assert!(test_suite::port().read("65535").is_ok());
    assert!(test_suite::port_number().read("-1").is_ok());
    assert!(test_suite::port_number().read("-2").is_err());
    assert!(test_suite::unsigned_short().read("65536").is_err());
    assert!(test_suite::ipv4_prefix().read("33").is_err());
    assert!(test_suite::uuid()
        .read("4dea22b3-1d52-d8f3-2516-782e98ab3fa0")
        .is_ok());
    assert!(test_suite::uuid().read("4dea22b3").is_err());
    assert!(test_suite::virtual_port_profile()
        .read("0123456789012345678901234567890123456789")
        .is_err());
    assert!(test_suite::octal_mode().read("0644").is_ok());
    assert!(test_suite::octal_mode().read("0648").is_err());
}

#[test]
fn save_rejects_invalid_target() {
    init();
    let disk = Disk {
        device: None,
        driver: None,
        source: None,
        target_dev: "cd0".to_owned(),
        bus: None,
        boot_order: None,
        readonly: false,
        serial: None,
    };
    let err = disk.save().unwrap_err();
    assert_matches!(err.kind(), ErrorKind::InvalidState(_));
}

#[test]
fn save_rejects_out_of_range_memory() {
    init();
    let domain = Domain {
        hv_type: test_suite::domain::HvType::Kvm,
        name: "x".to_owned(),
        uuid: None,
        title: None,
        memory_kib: u64::MAX,
        vcpu: None,
        os: Os {
            os_type: OsType::Hvm,
            boot: vec![],
        },
        devices: vec![],
    };
    let err = domain.save().unwrap_err();
    assert_matches!(err.kind(), ErrorKind::InvalidState(_));
}

#[test]
fn interface_requires_unicast_mac() {
    init();
    // 53 has an odd second digit, marking a multicast address.
    let err = test_suite::domain::Interface::load(
        &Element::from_str(r#"<interface><mac address="53:54:00:9d:01:aa"/></interface>"#)
            .unwrap(),
    )
    .unwrap_err();
    assert_matches!(err.kind(), ErrorKind::Structural(_));
    let ok = test_suite::domain::Interface::load(
        &Element::from_str(r#"<interface><mac address="52:54:00:9d:01:aa"/></interface>"#)
            .unwrap(),
    )
    .unwrap();
    assert_eq!(ok.mac, "52:54:00:9d:01:aa");
}

#[test]
fn enum_tables_round_trip() {
    init();
    for leaf in [
        test_suite::domain::HvType::leaf(),
        test_suite::domain::DiskDevice::leaf(),
        test_suite::domain::BusType::leaf(),
        test_suite::domain::OsType::leaf(),
        test_suite::domain::BootDev::leaf(),
        test_suite::domain::StartupPolicy::leaf(),
        test_suite::domain::VcpuPlacement::leaf(),
        test_suite::domain::DriverCache::leaf(),
        test_suite::snapshot::MemoryKind::leaf(),
    ] {
        let table = match leaf.kind() {
            transponster::leaf::LeafKind::Enumerated(table) => table,
            k => panic!("{}: not an enumerated row: {:?}", leaf.name(), k),
        };
        for &(discriminant, tag) in table.entries() {
            assert_eq!(
                leaf.read(tag),
                Ok(transponster::leaf::Value::Enum(discriminant)),
                "{}: parse {:?}",
                leaf.name(),
                tag
            );
            assert_eq!(
                leaf.generate(&transponster::leaf::Value::Enum(discriminant)),
                Some(tag.to_owned()),
                "{}: generate {}",
                leaf.name(),
                discriminant
            );
        }
        assert!(leaf.read("no-such-tag").is_err());
    }
}

#[test]
fn bus_values_are_checked() {
    init();
    // An unknown bus on a mandatory-position attribute is a hard failure,
    // but Disk's bus is optional, so the row alone shows the rejection.
    assert_eq!(
        BusType::leaf().read("virtio").unwrap(),
        transponster::leaf::Value::Enum(BusType::Virtio as usize)
    );
    assert!(BusType::leaf().read("nvme").is_err());
}
