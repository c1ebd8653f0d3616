//! Redstone circuit intermediate representation (RCIR).
//!
//! A flat netlist model: instances with named, typed ports; networks
//! connecting one driver pin to one or more sink pins. Structures here use
//! strings to address instances and ports, which makes the format easy to
//! produce from frontends and easy to round-trip through JSON.
//!
//! Netlists are constructed through a [`NetlistBuilder`] and validated
//! atomically by [`NetlistBuilder::build`]; a [`Netlist`] value is
//! guaranteed to satisfy the model invariants:
//!
//! - every network triple resolves to an existing instance, port, and
//!   in-range pin index;
//! - every pin appears in at most one network;
//! - driver pins sit on output-capable ports, sink pins on input-capable
//!   ports.
//!
//! Hierarchy is the frontend's responsibility: a child netlist exposes its
//! boundary through pseudo-instances named `input` and `output`, and
//! [`Netlist::flattened`] inlines one child into its parent. The engines
//! accept only flat netlists.
#![warn(missing_docs)]

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use arcstr::ArcStr;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub mod json;
pub mod validation;

#[cfg(test)]
pub(crate) mod tests;

pub use validation::NetlistError;

/// The id of the pseudo-instance holding a hierarchical netlist's input
/// boundary ports.
pub const INPUT_INSTANCE: &str = "input";

/// The id of the pseudo-instance holding a hierarchical netlist's output
/// boundary ports.
pub const OUTPUT_INSTANCE: &str = "output";

/// A name identifying one port of an instance.
pub type PortName = ArcStr;

/// An opaque instance identifier.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(ArcStr);

impl InstanceId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl<S: Into<ArcStr>> From<S> for InstanceId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl Display for InstanceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An opaque network identifier.
///
/// Assigned by [`NetlistBuilder::build`] in network insertion order.
#[derive(
    Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct NetworkId(u64);

impl NetworkId {
    /// Returns the raw numeric id.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl Display for NetworkId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "net{}", self.0)
    }
}

/// The electrical role of a single pin.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinRole {
    /// Signal enters the instance here.
    Input,
    /// Signal leaves the instance here.
    Output,
    /// Either, depending on context.
    Bidir,
}

/// The direction of a port.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    /// An input port.
    In,
    /// An output port.
    Out,
    /// A bidirectional port.
    InOut,
}

impl PortDirection {
    /// Returns `true` if a pin on this port may drive a network.
    pub fn admits_driver(self) -> bool {
        matches!(self, PortDirection::Out | PortDirection::InOut)
    }

    /// Returns `true` if a pin on this port may sink a network.
    pub fn admits_sink(self) -> bool {
        matches!(self, PortDirection::In | PortDirection::InOut)
    }

    /// The direction seen from the other side of the boundary.
    pub fn flipped(self) -> PortDirection {
        match self {
            PortDirection::In => PortDirection::Out,
            PortDirection::Out => PortDirection::In,
            PortDirection::InOut => PortDirection::InOut,
        }
    }
}

impl Display for PortDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PortDirection::In => write!(f, "in"),
            PortDirection::Out => write!(f, "out"),
            PortDirection::InOut => write!(f, "inout"),
        }
    }
}

/// A port: one ordered pin sequence of a fixed width and direction.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Port {
    /// The port direction.
    pub direction: PortDirection,
    /// The number of pins in the sequence.
    pub width: usize,
}

impl Port {
    /// Creates a new port.
    pub fn new(direction: PortDirection, width: usize) -> Self {
        Self { direction, width }
    }
}

/// An instance of a library tile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// The library key naming the tile this instance realizes.
    pub lib: ArcStr,
    /// The instance's ports, by name.
    pub ports: IndexMap<PortName, Port>,
}

impl Instance {
    /// Creates an instance of the given library tile with no ports.
    pub fn new(lib: impl Into<ArcStr>) -> Self {
        Self {
            lib: lib.into(),
            ports: IndexMap::new(),
        }
    }

    /// Adds a port, builder-style.
    pub fn with_port(
        mut self,
        name: impl Into<PortName>,
        direction: PortDirection,
        width: usize,
    ) -> Self {
        self.ports.insert(name.into(), Port::new(direction, width));
        self
    }
}

/// A reference to one pin: the `(instance, port, index)` triple.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct PinRef {
    /// The instance the pin belongs to.
    pub instance: InstanceId,
    /// The port the pin belongs to.
    pub port: PortName,
    /// The pin's index within the port.
    pub index: usize,
}

impl PinRef {
    /// Creates a pin reference.
    pub fn new(instance: impl Into<InstanceId>, port: impl Into<PortName>, index: usize) -> Self {
        Self {
            instance: instance.into(),
            port: port.into(),
            index,
        }
    }
}

impl Display for PinRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}[{}]", self.instance, self.port, self.index)
    }
}

/// A set of pins that must be electrically connected: exactly one driver
/// and one or more sinks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    driver: PinRef,
    sinks: Vec<PinRef>,
}

impl Network {
    /// Creates a network from a driver and its sinks.
    pub fn new(driver: PinRef, sinks: Vec<PinRef>) -> Self {
        Self { driver, sinks }
    }

    /// Returns the driver pin.
    pub fn driver(&self) -> &PinRef {
        &self.driver
    }

    /// Returns the sink pins.
    pub fn sinks(&self) -> &[PinRef] {
        &self.sinks
    }

    /// Iterates all pins of the network, driver first.
    pub fn pins(&self) -> impl Iterator<Item = &PinRef> {
        std::iter::once(&self.driver).chain(self.sinks.iter())
    }
}

/// A mutable netlist under construction.
///
/// Invariants are checked only by [`NetlistBuilder::build`], so arbitrary
/// intermediate states are representable.
#[derive(Clone, Debug, Default)]
pub struct NetlistBuilder {
    instances: IndexMap<InstanceId, Instance>,
    networks: Vec<Network>,
}

impl NetlistBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an instance. Re-adding an id replaces the previous instance.
    pub fn add_instance(&mut self, id: impl Into<InstanceId>, instance: Instance) -> InstanceId {
        let id = id.into();
        self.instances.insert(id.clone(), instance);
        id
    }

    /// Adds a network connecting `driver` to `sinks`.
    pub fn add_network(&mut self, driver: PinRef, sinks: Vec<PinRef>) {
        self.networks.push(Network::new(driver, sinks));
    }

    /// Validates the builder contents and freezes them into a [`Netlist`].
    ///
    /// Fails with a [`NetlistError`] naming the first offending triple.
    pub fn build(self) -> Result<Netlist, NetlistError> {
        validation::validate(&self.instances, &self.networks)?;

        let networks: IndexMap<NetworkId, Network> = self
            .networks
            .into_iter()
            .enumerate()
            .map(|(i, network)| (NetworkId(i as u64), network))
            .collect();

        let mut pin_networks = HashMap::new();
        for (&id, network) in &networks {
            for pin in network.pins() {
                pin_networks.insert(pin.clone(), id);
            }
        }

        Ok(Netlist {
            instances: self.instances,
            networks,
            pin_networks,
        })
    }
}

/// A validated, immutable netlist.
#[derive(Clone, Debug)]
pub struct Netlist {
    instances: IndexMap<InstanceId, Instance>,
    networks: IndexMap<NetworkId, Network>,
    pin_networks: HashMap<PinRef, NetworkId>,
}

impl Netlist {
    /// Iterates instances in insertion order.
    pub fn instances(&self) -> impl Iterator<Item = (&InstanceId, &Instance)> {
        self.instances.iter()
    }

    /// Returns the instance with the given id.
    pub fn instance(&self, id: &InstanceId) -> Option<&Instance> {
        self.instances.get(id)
    }

    /// Returns the number of instances.
    pub fn num_instances(&self) -> usize {
        self.instances.len()
    }

    /// Iterates networks in id order.
    pub fn networks(&self) -> impl Iterator<Item = (NetworkId, &Network)> {
        self.networks.iter().map(|(&id, network)| (id, network))
    }

    /// Returns the network with the given id.
    pub fn network(&self, id: NetworkId) -> Option<&Network> {
        self.networks.get(&id)
    }

    /// Returns the unique network containing `pin`, if any.
    pub fn network_of(&self, pin: &PinRef) -> Option<NetworkId> {
        self.pin_networks.get(pin).copied()
    }

    /// Looks up the port a pin reference addresses.
    pub fn port(&self, pin: &PinRef) -> Option<&Port> {
        self.instances.get(&pin.instance)?.ports.get(&pin.port)
    }

    /// Converts this netlist back into a builder.
    pub fn into_builder(self) -> NetlistBuilder {
        NetlistBuilder {
            instances: self.instances,
            networks: self.networks.into_values().collect(),
        }
    }

    /// Inlines the hierarchical child netlist instantiated as `child_id`.
    ///
    /// The child exposes its boundary through pseudo-instances named
    /// [`INPUT_INSTANCE`] and [`OUTPUT_INSTANCE`]; the output ports of
    /// `input` are the child's inputs, and the input ports of `output` are
    /// its outputs. Child instances are renamed to `{child_id}.{name}` and
    /// boundary networks are spliced onto the parent networks touching
    /// `child_id`. A child network running directly from the input boundary
    /// to the output boundary is rejected.
    pub fn flattened(&self, child_id: &InstanceId, child: &Netlist) -> Result<Netlist, NetlistError> {
        flatten::flattened(self, child_id, child)
    }
}

mod flatten;
