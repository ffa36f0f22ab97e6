//! XML interchange format.
//!
//! ```text
//! <NeuralNetwork>
//!   <Layer behaviour="identity">            one per layer, input first
//!     <Neuron>0.0</Neuron>                  one bias per neuron
//!   </Layer>
//!   ...
//!   <Connection>                            one per non-input layer
//!     <Node>                                one row per neuron of the previous layer
//!       <Weight>1.0</Weight>                one weight per neuron of the next layer
//!     </Node>
//!   </Connection>
//! </NeuralNetwork>
//! ```
//!
//! Unknown or missing `behaviour` values read as `logistic`. Other attributes
//! (such as `name`) and unknown elements are ignored.

use super::{InterchangeError, InterchangeResult};
use crate::nn::ActivationKind;
use crate::topology::{LayerSpec, TopologyDescriptor};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::fs;
use std::path::Path;

const NETWORK_ELEMENT: &str = "NeuralNetwork";
const LAYER_ELEMENT: &str = "Layer";
const BEHAVIOUR_ATTRIBUTE: &str = "behaviour";
const NEURON_ELEMENT: &str = "Neuron";
const CONNECTION_ELEMENT: &str = "Connection";
const NODE_ELEMENT: &str = "Node";
const WEIGHT_ELEMENT: &str = "Weight";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    Layer,
    Neuron,
    Connection,
    Node,
    Weight,
    Other,
}

impl Element {
    fn from_name(name: &[u8]) -> Self {
        match name {
            b"Layer" => Element::Layer,
            b"Neuron" => Element::Neuron,
            b"Connection" => Element::Connection,
            b"Node" => Element::Node,
            b"Weight" => Element::Weight,
            _ => Element::Other,
        }
    }
}

/// Collects layers and connection rows while walking the document.
#[derive(Default)]
struct DocumentReader {
    layers: Vec<LayerSpec>,
    connections: Vec<Vec<Vec<f64>>>,
    open: Vec<Element>,
    text: String,
}

impl DocumentReader {
    fn require_parent(&self, parent: Element, element: &'static str, parent_name: &'static str) -> InterchangeResult<()> {
        if self.open.contains(&parent) {
            Ok(())
        } else {
            Err(InterchangeError::MisplacedElement {
                element,
                parent: parent_name,
            })
        }
    }

    fn start(&mut self, element: Element, start: &BytesStart<'_>) -> InterchangeResult<()> {
        self.text.clear();
        match element {
            Element::Layer => {
                let behaviour = match start.try_get_attribute(BEHAVIOUR_ATTRIBUTE)? {
                    Some(attribute) => ActivationKind::from_attribute(&attribute.unescape_value()?),
                    None => ActivationKind::default(),
                };
                self.layers.push(LayerSpec::new(Vec::new(), behaviour));
            }
            Element::Neuron => self.require_parent(Element::Layer, NEURON_ELEMENT, LAYER_ELEMENT)?,
            Element::Connection => self.connections.push(Vec::new()),
            Element::Node => {
                self.require_parent(Element::Connection, NODE_ELEMENT, CONNECTION_ELEMENT)?;
                if let Some(connection) = self.connections.last_mut() {
                    connection.push(Vec::new());
                }
            }
            Element::Weight => self.require_parent(Element::Node, WEIGHT_ELEMENT, NODE_ELEMENT)?,
            Element::Other => {}
        }
        Ok(())
    }

    fn end(&mut self, element: Element) -> InterchangeResult<()> {
        match element {
            Element::Neuron => {
                let bias = parse_number(NEURON_ELEMENT, &self.text)?;
                if let Some(biases) = self.layers.last_mut().and_then(|layer| layer.biases.as_mut()) {
                    biases.push(bias);
                }
            }
            Element::Weight => {
                let weight = parse_number(WEIGHT_ELEMENT, &self.text)?;
                if let Some(node) = self.connections.last_mut().and_then(|connection| connection.last_mut()) {
                    node.push(weight);
                }
            }
            _ => {}
        }
        self.text.clear();
        Ok(())
    }
}

fn parse_number(element: &'static str, text: &str) -> InterchangeResult<f64> {
    let value = text.trim();
    value.parse::<f64>().map_err(|source| InterchangeError::InvalidNumber {
        element,
        value: value.to_string(),
        source,
    })
}

/// Parses an XML document into a validated topology.
///
/// Structural problems are reported as
/// [`InterchangeError::Topology`]: a non-rectangular connection block yields
/// `RaggedMatrix` naming the block, a wrong number of blocks yields
/// `CountMismatch`.
pub fn from_xml_str(xml: &str) -> InterchangeResult<TopologyDescriptor> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut document = DocumentReader::default();
    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let element = Element::from_name(start.name().as_ref());
                document.start(element, &start)?;
                document.open.push(element);
            }
            Event::Empty(start) => {
                let element = Element::from_name(start.name().as_ref());
                document.start(element, &start)?;
                document.end(element)?;
            }
            Event::Text(text) => document.text.push_str(&text.unescape()?),
            Event::CData(data) => document.text.push_str(&String::from_utf8_lossy(&data)),
            Event::End(_) => {
                if let Some(element) = document.open.pop() {
                    document.end(element)?;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(TopologyDescriptor::from_rows(document.layers, document.connections)?)
}

/// Reads and parses an XML file.
pub fn read_xml<P: AsRef<Path>>(path: P) -> InterchangeResult<TopologyDescriptor> {
    let xml = fs::read_to_string(path)?;
    from_xml_str(&xml)
}

fn write_value<W: std::io::Write>(writer: &mut Writer<W>, element: &str, value: f64) -> InterchangeResult<()> {
    writer.write_event(Event::Start(BytesStart::new(element)))?;
    writer.write_event(Event::Text(BytesText::new(&format!("{value:?}"))))?;
    writer.write_event(Event::End(BytesEnd::new(element)))?;
    Ok(())
}

/// Serializes a topology as an indented XML document.
///
/// Numbers use the shortest representation that parses back to the same
/// `f64`, switching to exponent notation for very large or small magnitudes,
/// so a round trip is exact.
pub fn to_xml_string(topology: &TopologyDescriptor) -> InterchangeResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(NETWORK_ELEMENT)))?;

    for layer in topology.layers() {
        let mut start = BytesStart::new(LAYER_ELEMENT);
        start.push_attribute((BEHAVIOUR_ATTRIBUTE, layer.activation().as_str()));
        writer.write_event(Event::Start(start))?;
        for &bias in layer.biases() {
            write_value(&mut writer, NEURON_ELEMENT, bias)?;
        }
        writer.write_event(Event::End(BytesEnd::new(LAYER_ELEMENT)))?;
    }

    for connection in topology.connections() {
        writer.write_event(Event::Start(BytesStart::new(CONNECTION_ELEMENT)))?;
        for row in connection.outer_iter() {
            writer.write_event(Event::Start(BytesStart::new(NODE_ELEMENT)))?;
            for &weight in row {
                write_value(&mut writer, WEIGHT_ELEMENT, weight)?;
            }
            writer.write_event(Event::End(BytesEnd::new(NODE_ELEMENT)))?;
        }
        writer.write_event(Event::End(BytesEnd::new(CONNECTION_ELEMENT)))?;
    }

    writer.write_event(Event::End(BytesEnd::new(NETWORK_ELEMENT)))?;
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

/// Serializes a topology into an XML file.
pub fn write_xml<P: AsRef<Path>>(path: P, topology: &TopologyDescriptor) -> InterchangeResult<()> {
    fs::write(path, to_xml_string(topology)?)?;
    Ok(())
}
