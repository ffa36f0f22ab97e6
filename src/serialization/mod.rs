//! Loading and saving topologies.
//!
//! Two formats are supported:
//! - **XML**: the interchange document (`<NeuralNetwork>`, `<Layer>`, `<Connection>`)
//! - **JSON**: the same information as a serde document, handy for configs
//!
//! Both go through the validation of
//! [`TopologyDescriptor::from_rows`](crate::topology::TopologyDescriptor::from_rows),
//! so a loaded topology is always well formed.
//!
//! # Example
//!
//! ```rust,ignore
//! use rustyffn::serialization::{load_network, save_topology};
//!
//! save_topology("net.xml", &topology)?;
//! let mut engine = load_network("net.xml")?;
//! let output = engine.execute(&[0.1, 0.2])?;
//! ```

pub mod json;
pub mod xml;

pub use json::{from_json_str, read_json, to_json_string, write_json, TopologyDocument};
pub use xml::{from_xml_str, read_xml, to_xml_string, write_xml};

use crate::nn::PropagationEngine;
use crate::topology::{TopologyDescriptor, TopologyError};
use quick_xml::events::attributes::AttrError;
use std::num::ParseFloatError;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Errors raised while reading or writing a topology document.
#[derive(Error, Debug)]
pub enum InterchangeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Malformed XML attribute: {0}")]
    XmlAttribute(#[from] AttrError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid number '{value}' in <{element}>: {source}")]
    InvalidNumber {
        element: &'static str,
        value: String,
        source: ParseFloatError,
    },

    #[error("JSON cannot represent {value} at {location}; save the topology as XML instead")]
    NonFiniteValue { location: String, value: f64 },

    #[error("<{element}> must be nested inside <{parent}>")]
    MisplacedElement {
        element: &'static str,
        parent: &'static str,
    },

    #[error("Invalid topology: {0}")]
    Topology(#[from] TopologyError),
}

pub type InterchangeResult<T> = std::result::Result<T, InterchangeError>;

/// On-disk format of a topology document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyFormat {
    Xml,
    Json,
}

impl TopologyFormat {
    /// Picks the format from the file extension: `.json` is JSON, anything
    /// else is XML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => TopologyFormat::Json,
            _ => TopologyFormat::Xml,
        }
    }
}

/// Reads a topology, choosing the format by file extension.
pub fn load_topology<P: AsRef<Path>>(path: P) -> InterchangeResult<TopologyDescriptor> {
    let path = path.as_ref();
    let topology = match TopologyFormat::from_path(path) {
        TopologyFormat::Xml => read_xml(path)?,
        TopologyFormat::Json => read_json(path)?,
    };
    info!(path = %path.display(), sizes = ?topology.layer_sizes(), "Loaded topology");
    Ok(topology)
}

/// Writes a topology, choosing the format by file extension.
pub fn save_topology<P: AsRef<Path>>(path: P, topology: &TopologyDescriptor) -> InterchangeResult<()> {
    let path = path.as_ref();
    match TopologyFormat::from_path(path) {
        TopologyFormat::Xml => write_xml(path, topology)?,
        TopologyFormat::Json => write_json(path, topology)?,
    }
    info!(path = %path.display(), layers = topology.len(), "Saved topology");
    Ok(())
}

/// Reads a topology and builds an engine from it.
pub fn load_network<P: AsRef<Path>>(path: P) -> InterchangeResult<PropagationEngine> {
    Ok(PropagationEngine::from(load_topology(path)?))
}
