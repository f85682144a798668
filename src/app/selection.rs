use std::collections::HashSet;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::graph::{Graph, NodeKind};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterState {
    pub kind: Option<NodeKind>,
    /// Document id the view is narrowed to.
    pub source: Option<String>,
    pub show_cross_document: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            kind: None,
            source: None,
            show_cross_document: true,
        }
    }
}

impl FilterState {
    pub fn is_active(&self) -> bool {
        self.kind.is_some() || self.source.is_some() || !self.show_cross_document
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibleGraph {
    pub nodes: Vec<usize>,
    pub edges: Vec<usize>,
    node_ids: HashSet<String>,
}

impl VisibleGraph {
    pub fn contains(&self, id: &str) -> bool {
        self.node_ids.contains(id)
    }
}

pub fn visible_subgraph(graph: &Graph, filter: &FilterState) -> VisibleGraph {
    let nodes = graph
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| filter.kind.as_ref().is_none_or(|kind| &node.kind == kind))
        .filter(|(_, node)| {
            filter
                .source
                .as_deref()
                .is_none_or(|source| node.file_id == source)
        })
        .map(|(index, _)| index)
        .collect::<Vec<_>>();

    let node_ids = nodes
        .iter()
        .map(|&index| graph.nodes[index].id.clone())
        .collect::<HashSet<_>>();

    let edges = graph
        .edges
        .iter()
        .enumerate()
        .filter(|(_, edge)| filter.show_cross_document || !edge.kind.is_cross_document())
        .filter(|(_, edge)| node_ids.contains(&edge.source) && node_ids.contains(&edge.target))
        .map(|(index, _)| index)
        .collect();

    VisibleGraph {
        nodes,
        edges,
        node_ids,
    }
}

pub fn neighbors_of(graph: &Graph, id: &str) -> HashSet<String> {
    graph
        .edges
        .iter()
        .filter_map(|edge| {
            if edge.source == id {
                Some(edge.target.clone())
            } else if edge.target == id {
                Some(edge.source.clone())
            } else {
                None
            }
        })
        .collect()
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchHit {
    pub id: String,
    pub score: i64,
}

pub fn search_matches(graph: &Graph, query: &str) -> Vec<SearchHit> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut hits = graph
        .nodes
        .iter()
        .filter_map(|node| {
            fuzzy_match_score(&matcher, &node.name, query).map(|score| SearchHit {
                id: node.id.clone(),
                score,
            })
        })
        .collect::<Vec<_>>();
    hits.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
    hits
}
