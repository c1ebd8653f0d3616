//! Netlist validation.
//!
//! All invariant checks for [`NetlistBuilder::build`](crate::NetlistBuilder::build)
//! live here. Validation is atomic: the first violated invariant aborts the
//! build with an error naming the offending triple.

use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::{span, Level};

use crate::{Instance, InstanceId, Network, PinRef, PortDirection};

/// A violation of the netlist model invariants.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NetlistError {
    /// A network references an instance that does not exist.
    #[error("pin {pin} references a missing instance")]
    MissingInstance {
        /// The offending triple.
        pin: PinRef,
    },
    /// A network references a port that does not exist on its instance.
    #[error("pin {pin} references a missing port")]
    MissingPort {
        /// The offending triple.
        pin: PinRef,
    },
    /// A pin index is out of range for its port's width.
    #[error("pin {pin} is out of range for a port of width {width}")]
    PinIndexOutOfRange {
        /// The offending triple.
        pin: PinRef,
        /// The width of the addressed port.
        width: usize,
    },
    /// The same pin appears in more than one network.
    #[error("pin {pin} appears in more than one network")]
    PinInMultipleNetworks {
        /// The offending triple.
        pin: PinRef,
    },
    /// A network's driver sits on a port that cannot drive.
    #[error("driver pin {pin} sits on a {direction} port")]
    DriverOnInputPort {
        /// The offending triple.
        pin: PinRef,
        /// The direction of the addressed port.
        direction: PortDirection,
    },
    /// A network sink sits on a port that cannot sink.
    #[error("sink pin {pin} sits on a {direction} port")]
    SinkOnOutputPort {
        /// The offending triple.
        pin: PinRef,
        /// The direction of the addressed port.
        direction: PortDirection,
    },
    /// A network has a driver but no sinks.
    #[error("network driven by {driver} has no sinks")]
    NoSinks {
        /// The network's driver pin.
        driver: PinRef,
    },
    /// A child network runs directly from the input boundary to the output
    /// boundary, which flattening does not support.
    #[error("boundary feed-through at {pin} cannot be flattened")]
    BoundaryFeedThrough {
        /// The boundary pin on the output side.
        pin: PinRef,
    },
    /// A parent network is driven by a child output pin that no child
    /// network drives.
    #[error("boundary pin {pin} is not driven inside the child netlist")]
    BoundaryPinUnbound {
        /// The boundary pin with no internal driver.
        pin: PinRef,
    },
}

pub(crate) fn validate(
    instances: &IndexMap<InstanceId, Instance>,
    networks: &[Network],
) -> Result<(), NetlistError> {
    let span = span!(Level::INFO, "validate_netlist", networks = networks.len());
    let _guard = span.enter();

    let mut seen: HashSet<&PinRef> = HashSet::new();
    for network in networks {
        if network.sinks().is_empty() {
            return Err(NetlistError::NoSinks {
                driver: network.driver().clone(),
            });
        }
        for pin in network.pins() {
            let instance = instances
                .get(&pin.instance)
                .ok_or_else(|| NetlistError::MissingInstance { pin: pin.clone() })?;
            let port = instance
                .ports
                .get(&pin.port)
                .ok_or_else(|| NetlistError::MissingPort { pin: pin.clone() })?;
            if pin.index >= port.width {
                return Err(NetlistError::PinIndexOutOfRange {
                    pin: pin.clone(),
                    width: port.width,
                });
            }
            if !seen.insert(pin) {
                return Err(NetlistError::PinInMultipleNetworks { pin: pin.clone() });
            }
        }

        let driver_dir = instances[&network.driver().instance].ports[&network.driver().port]
            .direction;
        if !driver_dir.admits_driver() {
            return Err(NetlistError::DriverOnInputPort {
                pin: network.driver().clone(),
                direction: driver_dir,
            });
        }
        for sink in network.sinks() {
            let sink_dir = instances[&sink.instance].ports[&sink.port].direction;
            if !sink_dir.admits_sink() {
                return Err(NetlistError::SinkOnOutputPort {
                    pin: sink.clone(),
                    direction: sink_dir,
                });
            }
        }
    }

    Ok(())
}
