//! Edge list loading for interaction networks

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::{ProximityError, Result};
use crate::graph::{CompressedGraph, GraphBuilder};

/// Load an interaction network from an edge list file.
///
/// Each line holds two node identifiers separated by tabs, commas or spaces;
/// further columns (e.g. a confidence score) are ignored. Blank lines and
/// lines starting with `#` are skipped.
pub fn load_edge_list(path: impl AsRef<Path>) -> Result<CompressedGraph> {
    let path = path.as_ref();
    log::info!("Reading edge list: {}", path.display());

    let file = File::open(path)?;
    let builder = read_edges(file, path)?;

    log::info!("Loaded {} proteins from {}", builder.node_count(), path.display());
    builder.build()
}

/// Read edges from any reader into a builder. `origin` is only used in
/// error messages.
pub fn read_edges<R: Read>(reader: R, origin: &Path) -> Result<GraphBuilder> {
    let mut builder = GraphBuilder::with_capacity(1024);
    let mut edge_lines = 0usize;

    for (line_no, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line
            .split(|c: char| c == '\t' || c == ',' || c == ' ')
            .filter(|f| !f.is_empty());

        match (fields.next(), fields.next()) {
            (Some(a), Some(b)) => {
                builder.add_edge(a, b);
                edge_lines += 1;
            }
            _ => {
                return Err(ProximityError::Parse {
                    path: origin.to_path_buf(),
                    line: line_no + 1,
                    reason: "expected two node identifiers".to_string(),
                })
            }
        }
    }

    log::debug!("Read {} edge lines", edge_lines);
    Ok(builder)
}
