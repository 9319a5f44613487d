// SPDX-License-Identifier: MIT OR Apache-2.0

use assert_matches::assert_matches;
use test_suite::domain::{Disk, DiskSource, Domain, Interface, StartupPolicy};
use transponster::dom::Element;
use transponster::{Composite, ErrorKind};

fn init() {
    let _ = env_logger::Builder::new().is_test(true).try_init();
}

fn load_domain(doc: &str) -> Result<Domain, transponster::Error> {
    Domain::load(&Element::from_str(doc).unwrap())
}

#[test]
fn wrong_root_tag() {
    init();
    let err = load_domain("<network><name>x</name></network>").unwrap_err();
    assert_matches!(err.kind(), ErrorKind::Structural(_));
}

#[test]
fn unknown_child_rejected() {
    init();
    let err = load_domain(
        r#"<domain type="kvm">
          <name>x</name>
          <memory>1024</memory>
          <os><type>hvm</type></os>
          <currentMemory>512</currentMemory>
        </domain>"#,
    )
    .unwrap_err();
    assert_matches!(err.kind(), ErrorKind::Structural(_));
}

#[test]
fn missing_mandatory_child() {
    init();
    // No <name>.
    let err = load_domain(
        r#"<domain type="kvm"><memory>1024</memory><os><type>hvm</type></os></domain>"#,
    )
    .unwrap_err();
    assert_matches!(err.kind(), ErrorKind::Structural(_));
}

#[test]
fn missing_mandatory_attribute() {
    init();
    let err = load_domain(
        r#"<domain><name>x</name><memory>1024</memory><os><type>hvm</type></os></domain>"#,
    )
    .unwrap_err();
    assert_matches!(err.kind(), ErrorKind::Structural(_));
}

#[test]
fn duplicate_singleton_child_rejected() {
    init();
    let err = load_domain(
        r#"<domain type="kvm">
          <name>x</name>
          <name>y</name>
          <memory>1024</memory>
          <os><type>hvm</type></os>
        </domain>"#,
    )
    .unwrap_err();
    assert_matches!(err.kind(), ErrorKind::Structural(_));
}

#[test]
fn source_choice_prefers_file_arm() {
    init();
    // Both attributes present: the file-backed arm is declared first and
    // wins, so the dev attribute is simply ignored.
    let disk = Disk::load(
        &Element::from_str(
            r#"<disk><source file="/img/a.qcow2" dev="/dev/vg0/a"/><target dev="vda"/></disk>"#,
        )
        .unwrap(),
    )
    .unwrap();
    assert_eq!(
        disk.source,
        Some(DiskSource::File {
            file: "/img/a.qcow2".to_owned(),
            startup_policy: None,
        })
    );
}

#[test]
fn source_block_arm() {
    init();
    let disk = Disk::load(
        &Element::from_str(r#"<disk><source dev="/dev/vg0/a"/><target dev="sda"/></disk>"#)
            .unwrap(),
    )
    .unwrap();
    assert_eq!(
        disk.source,
        Some(DiskSource::Block {
            dev: "/dev/vg0/a".to_owned(),
        })
    );
}

#[test]
fn readonly_flag() {
    init();
    let doc = r#"<disk><target dev="hda"/><readonly/></disk>"#;
    let disk = Disk::load(&Element::from_str(doc).unwrap()).unwrap();
    assert!(disk.readonly);

    let doc = r#"<disk><target dev="hda"/></disk>"#;
    let disk = Disk::load(&Element::from_str(doc).unwrap()).unwrap();
    assert!(!disk.readonly);

    // A flag element must be empty.
    let doc = r#"<disk><target dev="hda"/><readonly>yes</readonly></disk>"#;
    let err = Disk::load(&Element::from_str(doc).unwrap()).unwrap_err();
    assert_matches!(err.kind(), ErrorKind::Structural(_));
}

#[test]
fn startup_policy_parsed() {
    init();
    let disk = Disk::load(
        &Element::from_str(
            r#"<disk><source file="/img/b.iso" startupPolicy="requisite"/><target dev="hdb"/></disk>"#,
        )
        .unwrap(),
    )
    .unwrap();
    assert_eq!(
        disk.source,
        Some(DiskSource::File {
            file: "/img/b.iso".to_owned(),
            startup_policy: Some(StartupPolicy::Requisite),
        })
    );
}

#[test]
fn empty_devices_element() {
    init();
    let domain = load_domain(
        r#"<domain type="kvm">
          <name>x</name>
          <memory>1024</memory>
          <os><type>hvm</type></os>
          <devices/>
        </domain>"#,
    )
    .unwrap();
    assert!(domain.devices.is_empty());
    // Canonical output drops the empty wrapper.
    let saved = domain.save().unwrap();
    assert!(saved
        .children()
        .iter()
        .all(|c| c.name().local_name != "devices"));
}

#[test]
fn vcpu_attribute_and_text() {
    init();
    use test_suite::domain::{Vcpu, VcpuPlacement};
    let vcpu = Vcpu::load(
        &Element::from_str(r#"<vcpu placement="static">4</vcpu>"#).unwrap(),
    )
    .unwrap();
    assert_eq!(
        vcpu,
        Vcpu {
            placement: Some(VcpuPlacement::Static),
            count: 4,
        }
    );
    let saved = vcpu.save().unwrap();
    assert_eq!(saved.text(), "4");
    assert_eq!(
        saved.attribute(transponster::NameRef::local("placement")),
        Some("static")
    );
}

#[test]
fn target_pattern_precedence() {
    init();
    // The disk-target pattern is tried before the absolute-path pattern;
    // "hda" only ever reaches the first arm, "/dev/sda" falls through to
    // the second.
    let node = transponster::schema::element(
        transponster::NameRef::local("target"),
        transponster::schema::choice(vec![
            transponster::schema::attribute(
                transponster::NameRef::local("dev"),
                test_suite::disk_target(),
            ),
            transponster::schema::attribute(
                transponster::NameRef::local("dev"),
                test_suite::abs_file_path(),
            ),
        ]),
    );
    let arm_for = |doc: &str| {
        let root = Element::from_str(doc).unwrap();
        let mut cur = transponster::de::Cursor::new(&root);
        transponster::de::consume(&node, &mut cur)
            .unwrap()
            .into_choice()
            .unwrap()
            .0
    };
    assert_eq!(arm_for(r#"<target dev="hda"/>"#), 0);
    assert_eq!(arm_for(r#"<target dev="/dev/sda"/>"#), 1);
}

#[test]
fn ordered_children_reject_reversal() {
    init();
    use test_suite::domain::Os;
    // <os> requires <type> before any <boot>.
    Os::load(&Element::from_str(r#"<os><type>hvm</type><boot dev="hd"/></os>"#).unwrap()).unwrap();
    let err = Os::load(&Element::from_str(r#"<os><boot dev="hd"/><type>hvm</type></os>"#).unwrap())
        .unwrap_err();
    assert_matches!(err.kind(), ErrorKind::Structural(_));
}

#[test]
fn interface_target_optional() {
    init();
    let iface = Interface::load(
        &Element::from_str(
            r#"<interface><model type="e1000"/><mac address="52:54:00:00:00:01"/></interface>"#,
        )
        .unwrap(),
    )
    .unwrap();
    assert_eq!(iface.target_dev, None);
    assert_eq!(iface.model.as_deref(), Some("e1000"));
}
