//! GraphML reader for GGI network files.
//!
//! Nodes must carry a `GeneID` data attribute; that value becomes the gene
//! identifier. Directed edges are read as undirected, self loops and parallel
//! edges are collapsed.

use std::collections::HashMap;

use ggibench_common::{GgiBenchError, Result};
use petgraph::graph::NodeIndex;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::graph::GgiNetwork;

/// Name of the node attribute holding the gene identifier.
pub const GENE_ID_ATTRIBUTE: &str = "GeneID";

fn xml_error(e: impl std::fmt::Display) -> GgiBenchError {
    GgiBenchError::Xml(e.to_string())
}

/// Attribute value of an element, unescaped.
fn attribute(element: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(xml_error)?;
        if attr.key.as_ref() == name {
            return Ok(Some(attr.unescape_value().map_err(xml_error)?.into_owned()));
        }
    }
    Ok(None)
}

fn required_attribute(element: &BytesStart<'_>, name: &[u8]) -> Result<String> {
    attribute(element, name)?.ok_or_else(|| {
        GgiBenchError::InvalidNetwork(format!(
            "<{}> without '{}' attribute",
            String::from_utf8_lossy(element.name().as_ref()),
            String::from_utf8_lossy(name)
        ))
    })
}

#[derive(Default)]
struct RawGraph {
    /// `key id` of the gene identifier attribute
    gene_key: Option<String>,
    /// node ids in document order
    nodes: Vec<String>,
    /// node id -> (key id -> value)
    data: HashMap<String, HashMap<String, String>>,
    edges: Vec<(String, String)>,
}

/// Parse a GraphML document into a [`GgiNetwork`].
pub fn parse_graphml(xml: &str) -> Result<GgiNetwork> {
    let raw = read_raw(xml)?;

    let gene_key = raw.gene_key.ok_or_else(|| {
        GgiBenchError::InvalidNetwork(format!("no node attribute named '{GENE_ID_ATTRIBUTE}' declared"))
    })?;

    let mut network = GgiNetwork::new();
    let mut by_node_id: HashMap<&str, NodeIndex> = HashMap::with_capacity(raw.nodes.len());
    for node_id in &raw.nodes {
        let gene = raw
            .data
            .get(node_id)
            .and_then(|values| values.get(&gene_key))
            .map(|g| g.trim())
            .filter(|g| !g.is_empty())
            .ok_or_else(|| {
                GgiBenchError::InvalidNetwork(format!("node '{node_id}' has no {GENE_ID_ATTRIBUTE}"))
            })?;
        let index = network.add_gene(gene)?;
        if by_node_id.insert(node_id.as_str(), index).is_some() {
            return Err(GgiBenchError::InvalidNetwork(format!("duplicate node id '{node_id}'")));
        }
    }

    let mut collapsed = 0usize;
    for (source, target) in &raw.edges {
        let lookup = |id: &String| {
            by_node_id
                .get(id.as_str())
                .copied()
                .ok_or_else(|| GgiBenchError::InvalidNetwork(format!("edge refers to unknown node '{id}'")))
        };
        if !network.add_interaction(lookup(source)?, lookup(target)?) {
            collapsed += 1;
        }
    }

    debug!(
        nodes = network.node_count(),
        edges = network.edge_count(),
        collapsed,
        "GraphML network parsed"
    );
    Ok(network)
}

fn read_raw(xml: &str) -> Result<RawGraph> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut raw = RawGraph::default();
    let mut current_node: Option<String> = None;
    let mut current_key: Option<String> = None;
    let mut text = String::new();

    loop {
        let event = reader.read_event().map_err(xml_error)?;
        let self_closing = matches!(event, Event::Empty(_));
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => match e.name().as_ref() {
                b"key" => {
                    let is_gene_id = attribute(e, b"attr.name")?.as_deref() == Some(GENE_ID_ATTRIBUTE);
                    let applies_to_nodes = matches!(attribute(e, b"for")?.as_deref(), None | Some("node" | "all"));
                    if is_gene_id && applies_to_nodes {
                        raw.gene_key = Some(required_attribute(e, b"id")?);
                    }
                }
                b"node" => {
                    let id = required_attribute(e, b"id")?;
                    raw.nodes.push(id.clone());
                    current_node = (!self_closing).then_some(id);
                }
                b"edge" => {
                    raw.edges.push((required_attribute(e, b"source")?, required_attribute(e, b"target")?));
                }
                b"data" if !self_closing => {
                    current_key = Some(required_attribute(e, b"key")?);
                    text.clear();
                }
                _ => {}
            },
            Event::Text(ref e) => {
                if current_key.is_some() {
                    text.push_str(&e.unescape().map_err(xml_error)?);
                }
            }
            Event::End(ref e) => match e.name().as_ref() {
                b"data" => {
                    if let (Some(node), Some(key)) = (&current_node, current_key.take()) {
                        raw.data.entry(node.clone()).or_default().insert(key, std::mem::take(&mut text));
                    }
                }
                b"node" => current_node = None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn document(nodes: &str, edges: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<graphml xmlns="http://graphml.graphdrawing.org/xmlns">
  <key id="d0" for="node" attr.name="GeneID" attr.type="string"/>
  <key id="d1" for="node" attr.name="Symbol" attr.type="string"/>
  <graph edgedefault="undirected">
    {nodes}
    {edges}
  </graph>
</graphml>"#
        )
    }

    fn node(id: &str, gene: &str) -> String {
        format!(r#"<node id="{id}"><data key="d1">SYM_{gene}</data><data key="d0">{gene}</data></node>"#)
    }

    #[test]
    fn test_parse_nodes_and_edges() {
        let nodes = [node("n0", "7157"), node("n1", "672"), node("n2", "1956")].concat();
        let edges = r#"<edge source="n0" target="n1"/><edge source="n1" target="n2"/>"#;
        let net = parse_graphml(&document(&nodes, edges)).unwrap();
        assert_eq!(net.genes().collect::<Vec<_>>(), vec!["7157", "672", "1956"]);
        assert_eq!(net.edge_count(), 2);
        let (a, b) = (net.node("7157").unwrap(), net.node("672").unwrap());
        assert!(net.has_interaction(a, b));
    }

    #[test]
    fn test_self_loops_and_duplicates_collapsed() {
        let nodes = [node("n0", "A"), node("n1", "B")].concat();
        let edges = r#"<edge source="n0" target="n1"/><edge source="n1" target="n0"/><edge source="n0" target="n0"/>"#;
        let net = parse_graphml(&document(&nodes, edges)).unwrap();
        assert_eq!(net.edge_count(), 1);
    }

    #[test]
    fn test_node_without_gene_id_rejected() {
        let nodes = format!(r#"{}<node id="n1"/>"#, node("n0", "A"));
        let err = parse_graphml(&document(&nodes, "")).unwrap_err();
        assert!(matches!(err, GgiBenchError::InvalidNetwork(ref m) if m.contains("n1")), "{err}");
    }

    #[test]
    fn test_duplicate_gene_id_rejected() {
        let nodes = [node("n0", "A"), node("n1", "A")].concat();
        assert!(matches!(parse_graphml(&document(&nodes, "")), Err(GgiBenchError::InvalidNetwork(_))));
    }

    #[test]
    fn test_unknown_edge_endpoint_rejected() {
        let edges = r#"<edge source="n0" target="missing"/>"#;
        let err = parse_graphml(&document(&node("n0", "A"), edges)).unwrap_err();
        assert!(matches!(err, GgiBenchError::InvalidNetwork(_)));
    }

    #[test]
    fn test_missing_gene_key_rejected() {
        let xml = r#"<graphml><graph><node id="n0"/></graph></graphml>"#;
        assert!(parse_graphml(xml).is_err());
    }

    #[test]
    fn test_malformed_xml() {
        let err = parse_graphml("<graphml><graph><node id=\"n0\"></graph>").unwrap_err();
        assert!(matches!(err, GgiBenchError::Xml(_)));
    }
}
