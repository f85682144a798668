use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info};

use super::model::{Edge, EdgeKind, Graph, Node, NodeKind};
use super::raw::RawGraph;

pub const CROSS_DOCUMENT_LABEL: &str = "same entity";
pub const CROSS_DOCUMENT_STRENGTH: u8 = 4;
const TITLE_SEPARATOR: &str = " · ";

#[derive(Clone, Debug)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub graph: Option<RawGraph>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FuseError {
    #[error("no usable input: every document failed extraction")]
    NoUsableInput,
}

pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

pub fn fuse(documents: &[Document]) -> Result<Graph, FuseError> {
    let usable = documents
        .iter()
        .filter_map(|document| document.graph.as_ref().map(|graph| (document, graph)))
        .collect::<Vec<_>>();

    if usable.is_empty() {
        return Err(FuseError::NoUsableInput);
    }

    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut insights = Vec::new();
    let mut titles = Vec::with_capacity(usable.len());
    let mut dropped_edges = 0usize;

    for (file_index, (document, raw)) in usable.iter().enumerate() {
        let mut id_map: HashMap<&str, String> = HashMap::with_capacity(raw.nodes.len());

        for raw_node in &raw.nodes {
            if id_map.contains_key(raw_node.id.as_str()) {
                continue;
            }

            let id = format!("f{file_index}:{}", raw_node.id);
            id_map.insert(raw_node.id.as_str(), id.clone());
            nodes.push(Node {
                id,
                source_id: raw_node.id.clone(),
                kind: NodeKind::from_label(&raw_node.kind),
                name: raw_node.name.clone(),
                description: raw_node.description.clone(),
                domain: raw_node.domain.clone().filter(|domain| !domain.is_empty()),
                tags: raw_node.tags.clone(),
                file_index,
                file_id: document.id.clone(),
                file_name: document.name.clone(),
                cross_document: false,
            });
        }

        for raw_edge in &raw.edges {
            let (Some(source), Some(target)) = (
                id_map.get(raw_edge.source.as_str()),
                id_map.get(raw_edge.target.as_str()),
            ) else {
                dropped_edges += 1;
                continue;
            };

            edges.push(Edge {
                source: source.clone(),
                target: target.clone(),
                kind: EdgeKind::from_label(&raw_edge.kind),
                label: raw_edge.label.clone(),
                strength: raw_edge.clamped_strength(),
                file_index,
                file_id: document.id.clone(),
                cross_document: false,
            });
        }

        insights.extend(
            raw.insights
                .iter()
                .map(|insight| format!("[{}] {insight}", document.name)),
        );

        let title = raw.title.trim();
        titles.push(if title.is_empty() {
            document.name.clone()
        } else {
            title.to_owned()
        });
    }

    if dropped_edges > 0 {
        debug!(dropped_edges, "pruned edges with dangling endpoints");
    }

    let cross_edges = link_cross_document(&mut nodes);
    let cross_count = cross_edges.len();
    edges.extend(cross_edges);

    info!(
        documents = usable.len(),
        nodes = nodes.len(),
        edges = edges.len(),
        cross_document_edges = cross_count,
        "fused document graphs"
    );

    let graph = Graph {
        title: titles.join(TITLE_SEPARATOR),
        nodes,
        edges,
        insights,
        file_count: usable.len(),
    };
    debug_assert!(graph.is_consistent());
    Ok(graph)
}

/// Marks same-named nodes as cross-document and returns one edge per pair of
/// members from different documents.
fn link_cross_document(nodes: &mut [Node]) -> Vec<Edge> {
    let mut group_by_name: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (index, node) in nodes.iter().enumerate() {
        let key = normalize_name(&node.name);
        if key.is_empty() {
            continue;
        }
        let group = *group_by_name.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[group].push(index);
    }

    let mut edges = Vec::new();

    for group in groups.iter().filter(|group| group.len() >= 2) {
        for &index in group {
            nodes[index].cross_document = true;
        }

        for (position, &first) in group.iter().enumerate() {
            for &second in &group[position + 1..] {
                let (a, b) = (&nodes[first], &nodes[second]);
                if a.file_index == b.file_index {
                    continue;
                }

                edges.push(Edge {
                    source: a.id.clone(),
                    target: b.id.clone(),
                    kind: EdgeKind::CrossDocument,
                    label: CROSS_DOCUMENT_LABEL.to_owned(),
                    strength: CROSS_DOCUMENT_STRENGTH,
                    file_index: a.file_index,
                    file_id: a.file_id.clone(),
                    cross_document: true,
                });
            }
        }
    }

    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::raw::parse_raw_graph;

    fn document(id: &str, json: &str) -> Document {
        Document {
            id: id.to_owned(),
            name: format!("{id}.md"),
            graph: Some(parse_raw_graph(json).unwrap()),
        }
    }

    fn ids(graph: &Graph) -> (Vec<String>, Vec<(String, String, String)>) {
        let nodes = graph.nodes.iter().map(|node| node.id.clone()).collect();
        let edges = graph
            .edges
            .iter()
            .map(|edge| {
                (
                    edge.source.clone(),
                    edge.target.clone(),
                    edge.kind.label().to_owned(),
                )
            })
            .collect();
        (nodes, edges)
    }

    #[test]
    fn same_entity_across_documents_is_linked_once() {
        let documents = vec![
            document(
                "doc0",
                r#"{"title": "Zero", "nodes": [{"id": "a", "type": "organization", "name": "Acme Corp"}], "edges": []}"#,
            ),
            document(
                "doc1",
                r#"{"title": "One", "nodes": [{"id": "x", "type": "organization", "name": "acme corp "}], "edges": []}"#,
            ),
        ];

        let graph = fuse(&documents).unwrap();

        assert!(graph.nodes.iter().all(|node| node.cross_document));
        let cross = graph
            .edges
            .iter()
            .filter(|edge| edge.kind == EdgeKind::CrossDocument)
            .collect::<Vec<_>>();
        assert_eq!(cross.len(), 1);
        assert_eq!(cross[0].source, "f0:a");
        assert_eq!(cross[0].target, "f1:x");
        assert_eq!(cross[0].label, CROSS_DOCUMENT_LABEL);
        assert_eq!(cross[0].strength, CROSS_DOCUMENT_STRENGTH);
        assert!(cross[0].cross_document);
        assert_eq!(graph.title, "Zero · One");
        assert_eq!(graph.file_count, 2);
    }

    #[test]
    fn same_document_duplicates_are_not_linked() {
        let documents = vec![
            document(
                "doc0",
                r#"{"nodes": [{"id": "a", "name": "Acme"}], "edges": []}"#,
            ),
            document(
                "doc1",
                r#"{"nodes": [{"id": "b", "name": "Acme"}, {"id": "c", "name": "ACME"}], "edges": []}"#,
            ),
        ];

        let graph = fuse(&documents).unwrap();

        assert_eq!(graph.cross_document_edge_count(), 2);
        assert!(graph.nodes.iter().all(|node| node.cross_document));
        assert!(
            !graph
                .edges
                .iter()
                .any(|edge| edge.source == "f1:b" && edge.target == "f1:c")
        );
    }

    #[test]
    fn cross_document_count_is_sum_of_document_pair_products() {
        // counts per document: 2, 1, 3 -> 2*1 + 2*3 + 1*3 = 11
        let documents = vec![
            document(
                "d0",
                r#"{"nodes": [{"id": "1", "name": "Hub"}, {"id": "2", "name": "hub"}], "edges": []}"#,
            ),
            document("d1", r#"{"nodes": [{"id": "1", "name": "HUB"}], "edges": []}"#),
            document(
                "d2",
                r#"{"nodes": [{"id": "1", "name": "Hub"}, {"id": "2", "name": " hub"}, {"id": "3", "name": "hub "}], "edges": []}"#,
            ),
        ];

        let graph = fuse(&documents).unwrap();
        assert_eq!(graph.cross_document_edge_count(), 11);
    }

    #[test]
    fn dangling_edges_are_pruned() {
        let documents = vec![document(
            "doc0",
            r#"{"nodes": [{"id": "a", "name": "A"}, {"id": "b", "name": "B"}],
                "edges": [
                    {"source": "a", "target": "b", "type": "CALLS", "label": "calls", "strength": 2},
                    {"source": "a", "target": "ghost", "type": "CALLS", "label": "calls", "strength": 2}
                ]}"#,
        )];

        let graph = fuse(&documents).unwrap();

        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].source, "f0:a");
        assert_eq!(graph.edges[0].target, "f0:b");
        assert_eq!(graph.edges[0].kind, EdgeKind::Calls);
        assert!(graph.is_consistent());
    }

    #[test]
    fn fusion_is_deterministic_for_same_input() {
        let documents = vec![
            document(
                "doc0",
                r#"{"nodes": [{"id": "a", "name": "Acme"}, {"id": "b", "name": "Bolt"}],
                    "edges": [{"source": "a", "target": "b", "type": "RELATED_TO"}]}"#,
            ),
            document(
                "doc1",
                r#"{"nodes": [{"id": "a", "name": "acme"}, {"id": "c", "name": "Bolt"}], "edges": []}"#,
            ),
        ];

        let first = fuse(&documents).unwrap();
        let second = fuse(&documents).unwrap();

        assert_eq!(ids(&first), ids(&second));
        assert_eq!(
            first.cross_document_edge_count(),
            second.cross_document_edge_count()
        );
        assert_eq!(first.cross_document_edge_count(), 2);
    }

    #[test]
    fn failed_documents_are_excluded_and_all_failed_is_an_error() {
        let failed = Document {
            id: "broken".to_owned(),
            name: "broken.pdf".to_owned(),
            graph: None,
        };
        assert_eq!(
            fuse(std::slice::from_ref(&failed)),
            Err(FuseError::NoUsableInput)
        );
        assert_eq!(fuse(&[]), Err(FuseError::NoUsableInput));

        let documents = vec![
            failed,
            document(
                "ok",
                r#"{"nodes": [{"id": "a", "name": "A"}], "edges": [], "insights": ["dense core"]}"#,
            ),
        ];
        let graph = fuse(&documents).unwrap();

        assert_eq!(graph.file_count, 1);
        assert_eq!(graph.nodes[0].id, "f0:a");
        assert_eq!(graph.nodes[0].file_id, "ok");
        assert_eq!(graph.insights, vec!["[ok.md] dense core".to_owned()]);
        assert_eq!(graph.title, "ok.md");
    }

    #[test]
    fn duplicate_raw_ids_keep_node_ids_unique() {
        let documents = vec![document(
            "doc0",
            r#"{"nodes": [{"id": "a", "name": "First"}, {"id": "a", "name": "Second"}], "edges": []}"#,
        )];

        let graph = fuse(&documents).unwrap();
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].name, "First");
        assert!(graph.is_consistent());
    }

    #[test]
    fn unnamed_nodes_are_never_linked() {
        let documents = vec![
            document("d0", r#"{"nodes": [{"id": "a"}, {"id": "b"}], "edges": []}"#),
            document(
                "d1",
                r#"{"nodes": [{"id": "x", "name": "  "}, {"id": "y"}], "edges": []}"#,
            ),
        ];

        let graph = fuse(&documents).unwrap();

        assert_eq!(graph.cross_document_edge_count(), 0);
        assert!(graph.nodes.iter().all(|node| !node.cross_document));
    }
}
