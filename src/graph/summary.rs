use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::model::{Graph, NodeKind};

pub const SUMMARY_EDGE_LIMIT: usize = 200;
pub const DEFAULT_SUMMARY_CHARS: usize = 6000;

#[derive(Debug, Serialize)]
pub struct SummaryNode<'a> {
    pub id: &'a str,
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub domain: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct SummaryEdge<'a> {
    pub source: &'a str,
    pub target: &'a str,
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub label: &'a str,
    pub strength: u8,
}

/// Projection of a fused graph handed to the question-answering collaborator.
#[derive(Debug, Serialize)]
pub struct GraphSummary<'a> {
    pub nodes: Vec<SummaryNode<'a>>,
    pub edges: Vec<SummaryEdge<'a>>,
    pub insights: &'a [String],
    pub title: &'a str,
}

impl<'a> GraphSummary<'a> {
    pub fn project(graph: &'a Graph) -> Self {
        let nodes = graph
            .nodes
            .iter()
            .map(|node| SummaryNode {
                id: &node.id,
                kind: node.kind.label(),
                name: &node.name,
                description: &node.description,
                domain: node.domain.as_deref(),
            })
            .collect();

        let edges = graph
            .edges
            .iter()
            .take(SUMMARY_EDGE_LIMIT)
            .map(|edge| SummaryEdge {
                source: &edge.source,
                target: &edge.target,
                kind: edge.kind.label(),
                label: &edge.label,
                strength: edge.strength,
            })
            .collect();

        Self {
            nodes,
            edges,
            insights: &graph.insights,
            title: &graph.title,
        }
    }

    pub fn to_bounded_json(&self, limit: usize) -> serde_json::Result<String> {
        let mut json = serde_json::to_string(self)?;
        if let Some((cut, _)) = json.char_indices().nth(limit) {
            json.truncate(cut);
        }
        Ok(json)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub cross_document_edges: usize,
    pub cross_document_nodes: usize,
    pub kind_counts: BTreeMap<NodeKind, usize>,
    pub orphan_count: usize,
    pub average_degree: f32,
}

impl GraphStats {
    pub fn compute(graph: &Graph) -> Self {
        let mut kind_counts = BTreeMap::new();
        for node in &graph.nodes {
            *kind_counts.entry(node.kind.clone()).or_insert(0) += 1;
        }

        let connected = graph
            .edges
            .iter()
            .flat_map(|edge| [edge.source.as_str(), edge.target.as_str()])
            .collect::<HashSet<_>>();
        let orphan_count = graph
            .nodes
            .iter()
            .filter(|node| !connected.contains(node.id.as_str()))
            .count();

        Self {
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            cross_document_edges: graph.cross_document_edge_count(),
            cross_document_nodes: graph.nodes.iter().filter(|node| node.cross_document).count(),
            kind_counts,
            orphan_count,
            average_degree: graph.edge_count() as f32 / graph.node_count().max(1) as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::fuse::{Document, fuse};
    use crate::graph::raw::parse_raw_graph;

    fn sample_graph() -> Graph {
        let documents = vec![
            Document {
                id: "a".to_owned(),
                name: "a.md".to_owned(),
                graph: Some(
                    parse_raw_graph(
                        r#"{"title": "Alpha", "nodes": [
                            {"id": "1", "type": "person", "name": "Ada"},
                            {"id": "2", "type": "concept", "name": "Engines"},
                            {"id": "3", "type": "concept", "name": "Loner"}
                        ], "edges": [{"source": "1", "target": "2", "type": "DEFINES", "label": "designs", "strength": 5}],
                        "insights": ["Ada is central"]}"#,
                    )
                    .unwrap(),
                ),
            },
            Document {
                id: "b".to_owned(),
                name: "b.md".to_owned(),
                graph: Some(
                    parse_raw_graph(
                        r#"{"nodes": [{"id": "9", "type": "person", "name": "ada"}], "edges": []}"#,
                    )
                    .unwrap(),
                ),
            },
        ];
        fuse(&documents).unwrap()
    }

    #[test]
    fn stats_count_kinds_orphans_and_cross_links() {
        let stats = GraphStats::compute(&sample_graph());

        assert_eq!(stats.node_count, 4);
        assert_eq!(stats.edge_count, 2);
        assert_eq!(stats.cross_document_edges, 1);
        assert_eq!(stats.cross_document_nodes, 2);
        assert_eq!(stats.kind_counts.get(&NodeKind::Person), Some(&2));
        assert_eq!(stats.kind_counts.get(&NodeKind::Concept), Some(&2));
        assert_eq!(stats.orphan_count, 1);
        assert!((stats.average_degree - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn summary_uses_extractor_field_names() {
        let graph = sample_graph();
        let json = GraphSummary::project(&graph)
            .to_bounded_json(DEFAULT_SUMMARY_CHARS)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["title"], "Alpha · b.md");
        assert_eq!(value["nodes"][0]["type"], "person");
        assert_eq!(value["edges"][1]["type"], "CROSS_DOCUMENT");
        assert_eq!(value["insights"][0], "[a.md] Ada is central");
    }

    #[test]
    fn summary_is_bounded_in_characters() {
        let graph = sample_graph();
        let json = GraphSummary::project(&graph).to_bounded_json(40).unwrap();
        assert_eq!(json.chars().count(), 40);

        let full = GraphSummary::project(&graph).to_bounded_json(usize::MAX).unwrap();
        assert!(serde_json::from_str::<serde_json::Value>(&full).is_ok());
    }
}
