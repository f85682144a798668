use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::fuse::{Document, fuse};
use super::model::Graph;
use super::raw::{RawGraph, parse_raw_graph};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceStatus {
    Loaded { nodes: usize, edges: usize },
    Failed(String),
}

#[derive(Clone, Debug)]
pub struct SourceEntry {
    pub id: String,
    pub name: String,
    pub status: SourceStatus,
}

#[derive(Clone, Debug)]
pub struct LoadedSession {
    pub graph: Graph,
    pub sources: Vec<SourceEntry>,
}

fn read_document(path: &Path) -> Result<RawGraph> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_raw_graph(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn load_documents(paths: &[PathBuf]) -> (Vec<Document>, Vec<SourceEntry>) {
    let mut documents = Vec::with_capacity(paths.len());
    let mut sources = Vec::with_capacity(paths.len());

    for path in paths {
        let id = path.display().to_string();
        let name = document_name(path);

        let (graph, status) = match read_document(path) {
            Ok(graph) => {
                info!(document = %name, nodes = graph.nodes.len(), edges = graph.edges.len(), "loaded document graph");
                let status = SourceStatus::Loaded {
                    nodes: graph.nodes.len(),
                    edges: graph.edges.len(),
                };
                (Some(graph), status)
            }
            Err(error) => {
                warn!(document = %name, "document excluded from fusion: {error:#}");
                (None, SourceStatus::Failed(format!("{error:#}")))
            }
        };

        documents.push(Document {
            id: id.clone(),
            name: name.clone(),
            graph,
        });
        sources.push(SourceEntry { id, name, status });
    }

    (documents, sources)
}

pub fn build_session(paths: &[PathBuf]) -> Result<LoadedSession> {
    let (documents, sources) = load_documents(paths);
    let graph = fuse(&documents).with_context(|| {
        format!(
            "all {} document(s) failed to load; check that each file holds an extracted graph",
            paths.len()
        )
    })?;

    Ok(LoadedSession { graph, sources })
}
