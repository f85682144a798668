use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    Person,
    Organization,
    Location,
    Concept,
    Document,
    Obligation,
    Condition,
    Event,
    Claim,
    Framework,
    Function,
    Class,
    Module,
    Variable,
    Import,
    Skill,
    Moc,
    Technique,
    File,
    Other(String),
}

impl NodeKind {
    pub fn label(&self) -> &str {
        match self {
            Self::Person => "person",
            Self::Organization => "organization",
            Self::Location => "location",
            Self::Concept => "concept",
            Self::Document => "document",
            Self::Obligation => "obligation",
            Self::Condition => "condition",
            Self::Event => "event",
            Self::Claim => "claim",
            Self::Framework => "framework",
            Self::Function => "function",
            Self::Class => "class",
            Self::Module => "module",
            Self::Variable => "variable",
            Self::Import => "import",
            Self::Skill => "skill",
            Self::Moc => "moc",
            Self::Technique => "technique",
            Self::File => "file",
            Self::Other(label) => label.as_str(),
        }
    }

    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "person" => Self::Person,
            "organization" => Self::Organization,
            "location" => Self::Location,
            "concept" => Self::Concept,
            "document" => Self::Document,
            "obligation" => Self::Obligation,
            "condition" => Self::Condition,
            "event" => Self::Event,
            "claim" => Self::Claim,
            "framework" => Self::Framework,
            "function" => Self::Function,
            "class" => Self::Class,
            "module" => Self::Module,
            "variable" => Self::Variable,
            "import" => Self::Import,
            "skill" => Self::Skill,
            "moc" => Self::Moc,
            "technique" => Self::Technique,
            "file" => Self::File,
            _ => Self::Other(normalized),
        }
    }
}

impl From<String> for NodeKind {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

impl From<NodeKind> for String {
    fn from(value: NodeKind) -> Self {
        value.label().to_owned()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EdgeKind {
    References,
    ObligatedTo,
    Contradicts,
    Extends,
    Clusters,
    RelatedTo,
    Triggers,
    ConflictsWith,
    Calls,
    Defines,
    Imports,
    CrossDomain,
    /// Synthesized by fusion between same-named nodes of different documents.
    CrossDocument,
    Other(String),
}

impl EdgeKind {
    pub const CROSS_DOCUMENT_LABEL: &'static str = "CROSS_DOCUMENT";

    pub fn label(&self) -> &str {
        match self {
            Self::References => "REFERENCES",
            Self::ObligatedTo => "OBLIGATED_TO",
            Self::Contradicts => "CONTRADICTS",
            Self::Extends => "EXTENDS",
            Self::Clusters => "CLUSTERS",
            Self::RelatedTo => "RELATED_TO",
            Self::Triggers => "TRIGGERS",
            Self::ConflictsWith => "CONFLICTS_WITH",
            Self::Calls => "CALLS",
            Self::Defines => "DEFINES",
            Self::Imports => "IMPORTS",
            Self::CrossDomain => "CROSS_DOMAIN",
            Self::CrossDocument => Self::CROSS_DOCUMENT_LABEL,
            Self::Other(label) => label.as_str(),
        }
    }

    /// Parses an extractor-produced label. Never yields [`EdgeKind::CrossDocument`],
    /// which only fusion may create.
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "REFERENCES" => Self::References,
            "OBLIGATED_TO" => Self::ObligatedTo,
            "CONTRADICTS" => Self::Contradicts,
            "EXTENDS" => Self::Extends,
            "CLUSTERS" => Self::Clusters,
            "RELATED_TO" => Self::RelatedTo,
            "TRIGGERS" => Self::Triggers,
            "CONFLICTS_WITH" => Self::ConflictsWith,
            "CALLS" => Self::Calls,
            "DEFINES" => Self::Defines,
            "IMPORTS" => Self::Imports,
            "CROSS_DOMAIN" => Self::CrossDomain,
            _ => Self::Other(normalized),
        }
    }

    pub fn is_cross_document(&self) -> bool {
        matches!(self, Self::CrossDocument)
    }
}

impl From<String> for EdgeKind {
    fn from(value: String) -> Self {
        // Serialized graphs round-trip the synthesized kind; raw extractor
        // input goes through `RawEdge` and `from_label` instead.
        if value == Self::CROSS_DOCUMENT_LABEL {
            Self::CrossDocument
        } else {
            Self::from_label(&value)
        }
    }
}

impl From<EdgeKind> for String {
    fn from(value: EdgeKind) -> Self {
        value.label().to_owned()
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub source_id: String,
    pub kind: NodeKind,
    pub name: String,
    pub description: String,
    pub domain: Option<String>,
    pub tags: Vec<String>,
    pub file_index: usize,
    pub file_id: String,
    pub file_name: String,
    pub cross_document: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub label: String,
    pub strength: u8,
    pub file_index: usize,
    pub file_id: String,
    pub cross_document: bool,
}

impl Edge {
    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub title: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub insights: Vec<String>,
    pub file_count: usize,
}

impl Graph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn index_by_id(&self) -> HashMap<&str, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.as_str(), index))
            .collect()
    }

    pub fn cross_document_edge_count(&self) -> usize {
        self.edges
            .iter()
            .filter(|edge| edge.kind.is_cross_document())
            .count()
    }

    pub fn sources(&self) -> Vec<(String, String)> {
        let mut seen = HashSet::new();
        self.nodes
            .iter()
            .filter(|node| seen.insert(node.file_id.as_str()))
            .map(|node| (node.file_id.clone(), node.file_name.clone()))
            .collect()
    }

    pub fn is_consistent(&self) -> bool {
        let mut ids = HashSet::with_capacity(self.nodes.len());
        if !self.nodes.iter().all(|node| ids.insert(node.id.as_str())) {
            return false;
        }

        self.edges
            .iter()
            .all(|edge| ids.contains(edge.source.as_str()) && ids.contains(edge.target.as_str()))
    }
}
