use test_log::test;

use crate::*;

fn source() -> Instance {
    Instance::new("const8").with_port("out", PortDirection::Out, 8)
}

fn adder() -> Instance {
    Instance::new("adder8")
        .with_port("a", PortDirection::In, 8)
        .with_port("b", PortDirection::In, 8)
        .with_port("out", PortDirection::Out, 8)
}

fn simple_netlist() -> Netlist {
    let mut builder = NetlistBuilder::new();
    builder.add_instance("const_a", source());
    builder.add_instance("const_b", source());
    builder.add_instance("adder", adder());
    for bit in 0..8 {
        builder.add_network(
            PinRef::new("const_a", "out", bit),
            vec![PinRef::new("adder", "a", bit)],
        );
        builder.add_network(
            PinRef::new("const_b", "out", bit),
            vec![PinRef::new("adder", "b", bit)],
        );
    }
    builder.build().unwrap()
}

#[test]
fn build_assigns_network_ids_in_insertion_order() {
    let netlist = simple_netlist();
    let ids: Vec<u64> = netlist.networks().map(|(id, _)| id.as_u64()).collect();
    assert_eq!(ids, (0..16).collect::<Vec<_>>());
}

#[test]
fn network_lookup_by_pin() {
    let netlist = simple_netlist();
    let pin = PinRef::new("adder", "a", 3);
    let id = netlist.network_of(&pin).unwrap();
    assert_eq!(netlist.network(id).unwrap().driver(), &PinRef::new("const_a", "out", 3));
    assert_eq!(netlist.network_of(&PinRef::new("adder", "out", 0)), None);
}

#[test]
fn missing_instance_is_rejected() {
    let mut builder = NetlistBuilder::new();
    builder.add_instance("const_a", source());
    builder.add_network(
        PinRef::new("const_a", "out", 0),
        vec![PinRef::new("ghost", "a", 0)],
    );
    let err = builder.build().unwrap_err();
    assert_eq!(
        err,
        NetlistError::MissingInstance {
            pin: PinRef::new("ghost", "a", 0)
        }
    );
}

#[test]
fn missing_port_is_rejected() {
    let mut builder = NetlistBuilder::new();
    builder.add_instance("const_a", source());
    builder.add_instance("adder", adder());
    builder.add_network(
        PinRef::new("const_a", "out", 0),
        vec![PinRef::new("adder", "carry", 0)],
    );
    assert!(matches!(
        builder.build().unwrap_err(),
        NetlistError::MissingPort { .. }
    ));
}

#[test]
fn out_of_range_pin_is_rejected() {
    let mut builder = NetlistBuilder::new();
    builder.add_instance("const_a", source());
    builder.add_instance("adder", adder());
    builder.add_network(
        PinRef::new("const_a", "out", 8),
        vec![PinRef::new("adder", "a", 0)],
    );
    assert_eq!(
        builder.build().unwrap_err(),
        NetlistError::PinIndexOutOfRange {
            pin: PinRef::new("const_a", "out", 8),
            width: 8,
        }
    );
}

#[test]
fn double_connected_pin_is_rejected() {
    let mut builder = NetlistBuilder::new();
    builder.add_instance("const_a", source());
    builder.add_instance("const_b", source());
    builder.add_instance("adder", adder());
    builder.add_network(
        PinRef::new("const_a", "out", 0),
        vec![PinRef::new("adder", "a", 0)],
    );
    builder.add_network(
        PinRef::new("const_b", "out", 0),
        vec![PinRef::new("adder", "a", 0)],
    );
    assert_eq!(
        builder.build().unwrap_err(),
        NetlistError::PinInMultipleNetworks {
            pin: PinRef::new("adder", "a", 0)
        }
    );
}

#[test]
fn driver_on_input_port_is_rejected() {
    let mut builder = NetlistBuilder::new();
    builder.add_instance("adder", adder());
    builder.add_instance("other", adder());
    builder.add_network(
        PinRef::new("adder", "a", 0),
        vec![PinRef::new("other", "b", 0)],
    );
    assert!(matches!(
        builder.build().unwrap_err(),
        NetlistError::DriverOnInputPort { .. }
    ));
}

#[test]
fn sink_on_output_port_is_rejected() {
    let mut builder = NetlistBuilder::new();
    builder.add_instance("const_a", source());
    builder.add_instance("const_b", source());
    builder.add_network(
        PinRef::new("const_a", "out", 0),
        vec![PinRef::new("const_b", "out", 1)],
    );
    assert!(matches!(
        builder.build().unwrap_err(),
        NetlistError::SinkOnOutputPort { .. }
    ));
}

#[test]
fn network_without_sinks_is_rejected() {
    let mut builder = NetlistBuilder::new();
    builder.add_instance("const_a", source());
    builder.add_network(PinRef::new("const_a", "out", 0), vec![]);
    assert!(matches!(
        builder.build().unwrap_err(),
        NetlistError::NoSinks { .. }
    ));
}

#[test]
fn json_round_trip() {
    let netlist = simple_netlist();
    let text = json::to_json(&netlist);
    let decoded = json::from_json(&text).unwrap();
    assert_eq!(
        netlist.instances().collect::<Vec<_>>(),
        decoded.instances().collect::<Vec<_>>()
    );
    let nets: Vec<_> = netlist.networks().collect();
    let decoded_nets: Vec<_> = decoded.networks().collect();
    assert_eq!(nets, decoded_nets);
}

#[test]
fn json_empty_network_is_rejected() {
    let text = r#"{"instances": {}, "networks": [[]]}"#;
    assert!(matches!(
        json::from_json(text),
        Err(json::JsonError::EmptyNetwork { index: 0 })
    ));
}

/// A child netlist with one inverter between its boundary ports.
fn child_netlist() -> Netlist {
    let mut builder = NetlistBuilder::new();
    builder.add_instance(
        INPUT_INSTANCE,
        Instance::new("io").with_port("din", PortDirection::Out, 1),
    );
    builder.add_instance(
        OUTPUT_INSTANCE,
        Instance::new("io").with_port("dout", PortDirection::In, 1),
    );
    builder.add_instance(
        "inv",
        Instance::new("not1")
            .with_port("a", PortDirection::In, 1)
            .with_port("out", PortDirection::Out, 1),
    );
    builder.add_network(
        PinRef::new(INPUT_INSTANCE, "din", 0),
        vec![PinRef::new("inv", "a", 0)],
    );
    builder.add_network(
        PinRef::new("inv", "out", 0),
        vec![PinRef::new(OUTPUT_INSTANCE, "dout", 0)],
    );
    builder.build().unwrap()
}

#[test]
fn flatten_inlines_child_instances_and_splices_networks() {
    let mut builder = NetlistBuilder::new();
    builder.add_instance("const_a", source());
    builder.add_instance(
        "sub",
        Instance::new("child")
            .with_port("din", PortDirection::In, 1)
            .with_port("dout", PortDirection::Out, 1),
    );
    builder.add_instance(
        "sink",
        Instance::new("reg1").with_port("d", PortDirection::In, 1),
    );
    builder.add_network(
        PinRef::new("const_a", "out", 0),
        vec![PinRef::new("sub", "din", 0)],
    );
    builder.add_network(
        PinRef::new("sub", "dout", 0),
        vec![PinRef::new("sink", "d", 0)],
    );
    let parent = builder.build().unwrap();

    let flat = parent
        .flattened(&InstanceId::from("sub"), &child_netlist())
        .unwrap();

    assert!(flat.instance(&InstanceId::from("sub")).is_none());
    assert!(flat.instance(&InstanceId::from("sub.inv")).is_some());

    let into_inv = flat.network_of(&PinRef::new("sub.inv", "a", 0)).unwrap();
    assert_eq!(
        flat.network(into_inv).unwrap().driver(),
        &PinRef::new("const_a", "out", 0)
    );

    let out_of_inv = flat.network_of(&PinRef::new("sink", "d", 0)).unwrap();
    assert_eq!(
        flat.network(out_of_inv).unwrap().driver(),
        &PinRef::new("sub.inv", "out", 0)
    );
}

#[test]
fn flatten_rejects_boundary_feed_through() {
    let mut child_builder = NetlistBuilder::new();
    child_builder.add_instance(
        INPUT_INSTANCE,
        Instance::new("io").with_port("din", PortDirection::Out, 1),
    );
    child_builder.add_instance(
        OUTPUT_INSTANCE,
        Instance::new("io").with_port("dout", PortDirection::In, 1),
    );
    child_builder.add_network(
        PinRef::new(INPUT_INSTANCE, "din", 0),
        vec![PinRef::new(OUTPUT_INSTANCE, "dout", 0)],
    );
    let child = child_builder.build().unwrap();

    let mut builder = NetlistBuilder::new();
    builder.add_instance("const_a", source());
    builder.add_instance(
        "sub",
        Instance::new("child")
            .with_port("din", PortDirection::In, 1)
            .with_port("dout", PortDirection::Out, 1),
    );
    builder.add_instance(
        "sink",
        Instance::new("reg1").with_port("d", PortDirection::In, 1),
    );
    builder.add_network(
        PinRef::new("const_a", "out", 0),
        vec![PinRef::new("sub", "din", 0)],
    );
    builder.add_network(
        PinRef::new("sub", "dout", 0),
        vec![PinRef::new("sink", "d", 0)],
    );
    let parent = builder.build().unwrap();

    assert!(matches!(
        parent.flattened(&InstanceId::from("sub"), &child),
        Err(NetlistError::BoundaryFeedThrough { .. })
    ));
}
