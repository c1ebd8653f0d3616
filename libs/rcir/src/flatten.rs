//! Inlining of hierarchical child netlists.

use std::collections::HashMap;

use crate::{
    InstanceId, Netlist, NetlistBuilder, NetlistError, PinRef, PortName, INPUT_INSTANCE,
    OUTPUT_INSTANCE,
};

fn is_boundary(id: &InstanceId) -> bool {
    id.as_str() == INPUT_INSTANCE || id.as_str() == OUTPUT_INSTANCE
}

pub(crate) fn flattened(
    parent: &Netlist,
    child_id: &InstanceId,
    child: &Netlist,
) -> Result<Netlist, NetlistError> {
    if parent.instance(child_id).is_none() {
        return Err(NetlistError::MissingInstance {
            pin: PinRef::new(child_id.clone(), "", 0),
        });
    }

    let rename = |id: &InstanceId| -> InstanceId {
        InstanceId::from(format!("{}.{}", child_id, id))
    };
    let map_pin = |pin: &PinRef| -> PinRef {
        PinRef {
            instance: rename(&pin.instance),
            port: pin.port.clone(),
            index: pin.index,
        }
    };

    let mut builder = NetlistBuilder::new();
    for (id, instance) in parent.instances() {
        if id != child_id {
            builder.add_instance(id.clone(), instance.clone());
        }
    }
    for (id, instance) in child.instances() {
        if !is_boundary(id) {
            builder.add_instance(rename(id), instance.clone());
        }
    }

    // Child networks crossing the boundary, indexed by boundary pin.
    // An input-boundary net maps an input pin to its internal sinks; an
    // output-boundary net maps an output pin to its internal driver plus
    // any internal sinks it also feeds.
    let mut input_sinks: HashMap<(PortName, usize), Vec<PinRef>> = HashMap::new();
    let mut output_nets: HashMap<(PortName, usize), (PinRef, Vec<PinRef>)> = HashMap::new();

    for (_, network) in child.networks() {
        let driver_is_input = network.driver().instance.as_str() == INPUT_INSTANCE;
        let output_pins: Vec<&PinRef> = network
            .sinks()
            .iter()
            .filter(|pin| pin.instance.as_str() == OUTPUT_INSTANCE)
            .collect();
        let internal_sinks: Vec<PinRef> = network
            .sinks()
            .iter()
            .filter(|pin| !is_boundary(&pin.instance))
            .map(|pin| map_pin(pin))
            .collect();

        if driver_is_input {
            if let Some(feed_through) = output_pins.first() {
                return Err(NetlistError::BoundaryFeedThrough {
                    pin: (*feed_through).clone(),
                });
            }
            input_sinks.insert(
                (network.driver().port.clone(), network.driver().index),
                internal_sinks,
            );
        } else if !output_pins.is_empty() {
            let driver = map_pin(network.driver());
            for pin in output_pins {
                output_nets.insert(
                    (pin.port.clone(), pin.index),
                    (driver.clone(), internal_sinks.clone()),
                );
            }
        } else {
            builder.add_network(map_pin(network.driver()), internal_sinks);
        }
    }

    for (_, network) in parent.networks() {
        let mut sinks = Vec::new();
        for sink in network.sinks() {
            if &sink.instance == child_id {
                // Splice the child's internal sinks for this input pin.
                // Unconnected child inputs drop out of the network.
                if let Some(spliced) = input_sinks.get(&(sink.port.clone(), sink.index)) {
                    sinks.extend(spliced.iter().cloned());
                }
            } else {
                sinks.push(sink.clone());
            }
        }

        let driver = if &network.driver().instance == child_id {
            let key = (network.driver().port.clone(), network.driver().index);
            let (driver, extra_sinks) =
                output_nets
                    .get(&key)
                    .cloned()
                    .ok_or_else(|| NetlistError::BoundaryPinUnbound {
                        pin: network.driver().clone(),
                    })?;
            sinks.extend(extra_sinks);
            driver
        } else {
            network.driver().clone()
        };

        if !sinks.is_empty() {
            builder.add_network(driver, sinks);
        }
    }

    builder.build()
}
