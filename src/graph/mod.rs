mod fuse;
mod load;
mod model;
mod raw;
mod summary;

pub use load::{LoadedSession, SourceEntry, SourceStatus, build_session};
pub use model::{EdgeKind, Graph, Node, NodeKind};
pub use summary::{DEFAULT_SUMMARY_CHARS, GraphStats, GraphSummary};

#[cfg(test)]
pub use fuse::{Document, fuse};
#[cfg(test)]
pub use raw::parse_raw_graph;
