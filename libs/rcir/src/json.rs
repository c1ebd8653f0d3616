//! JSON exchange format.
//!
//! No wire format is mandated between the frontend and the engines; this
//! schema exists for tests and tooling. The document shape is:
//!
//! ```json
//! {
//!   "instances": {
//!     "adder": {
//!       "lib": "adder8",
//!       "ports": {"a": {"direction": "in", "width": 8}}
//!     }
//!   },
//!   "networks": [
//!     [
//!       {"inst": "adder", "port": "out", "idx": 0},
//!       {"inst": "reg", "port": "d", "idx": 0}
//!     ]
//!   ]
//! }
//! ```
//!
//! The first triple of each network array is the driver.

use arcstr::ArcStr;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Instance, Netlist, NetlistBuilder, NetlistError, PinRef, Port};

/// Errors arising while reading a netlist document.
#[derive(Debug, thiserror::Error)]
pub enum JsonError {
    /// The document is not valid JSON or does not match the schema.
    #[error("malformed netlist document: {0}")]
    Malformed(#[from] serde_json::Error),
    /// A network array is empty.
    #[error("network {index} has no pins")]
    EmptyNetwork {
        /// The position of the offending network in the document.
        index: usize,
    },
    /// The decoded netlist violates the model invariants.
    #[error(transparent)]
    Invalid(#[from] NetlistError),
}

#[derive(Serialize, Deserialize)]
struct NetlistDoc {
    instances: IndexMap<ArcStr, InstanceDoc>,
    networks: Vec<Vec<PinDoc>>,
}

#[derive(Serialize, Deserialize)]
struct InstanceDoc {
    lib: ArcStr,
    ports: IndexMap<ArcStr, Port>,
}

#[derive(Serialize, Deserialize)]
struct PinDoc {
    inst: ArcStr,
    port: ArcStr,
    idx: usize,
}

impl From<&PinRef> for PinDoc {
    fn from(pin: &PinRef) -> Self {
        Self {
            inst: ArcStr::from(pin.instance.as_str()),
            port: pin.port.clone(),
            idx: pin.index,
        }
    }
}

impl From<PinDoc> for PinRef {
    fn from(doc: PinDoc) -> Self {
        PinRef::new(doc.inst, doc.port, doc.idx)
    }
}

/// Serializes `netlist` to a JSON string.
pub fn to_json(netlist: &Netlist) -> String {
    let doc = NetlistDoc {
        instances: netlist
            .instances()
            .map(|(id, instance)| {
                (
                    ArcStr::from(id.as_str()),
                    InstanceDoc {
                        lib: instance.lib.clone(),
                        ports: instance.ports.clone(),
                    },
                )
            })
            .collect(),
        networks: netlist
            .networks()
            .map(|(_, network)| network.pins().map(PinDoc::from).collect())
            .collect(),
    };
    serde_json::to_string_pretty(&doc).expect("netlist documents always serialize")
}

/// Parses and validates a netlist from a JSON string.
pub fn from_json(text: &str) -> Result<Netlist, JsonError> {
    let doc: NetlistDoc = serde_json::from_str(text)?;

    let mut builder = NetlistBuilder::new();
    for (id, instance) in doc.instances {
        let mut inst = Instance::new(instance.lib);
        inst.ports = instance.ports;
        builder.add_instance(id, inst);
    }
    for (index, pins) in doc.networks.into_iter().enumerate() {
        let mut pins = pins.into_iter().map(PinRef::from);
        let driver = pins.next().ok_or(JsonError::EmptyNetwork { index })?;
        builder.add_network(driver, pins.collect());
    }

    Ok(builder.build()?)
}
