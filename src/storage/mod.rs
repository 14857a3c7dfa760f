//! Results persistence module

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::{json, to_string_pretty};

use crate::error::{ProximityError, Result};
use crate::graph::CompressedGraph;
use crate::metrics::{Metric, ScoreMap};
use crate::partition::SeedPartition;
use crate::ranking::{self, DrugScore};

/// `<output_dir>/<metric>_Sj_<label>.txt`
pub fn score_file_path(output_dir: impl AsRef<Path>, metric: Metric, label: &str) -> PathBuf {
    output_dir
        .as_ref()
        .join(format!("{}_Sj_{}.txt", metric.name(), label))
}

/// Write one `score<TAB>identifier` line per node, in identifier order.
///
/// Scores use the shortest representation that parses back to the same
/// `f64`, so the file round-trips exactly.
pub fn write_scores(path: impl AsRef<Path>, scores: &ScoreMap) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    for (id, score) in scores.iter() {
        writeln!(writer, "{}\t{}", score, id)?;
    }
    writer.flush()?;

    log::info!("Wrote {} {} scores to {}", scores.len(), scores.metric, path.display());
    Ok(())
}

/// Parse a score file. Lines are `score<SEP>identifier` with a tab or a
/// comma as separator; blank lines are skipped.
pub fn read_scores(path: impl AsRef<Path>, metric: Metric) -> Result<ScoreMap> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut scores = ScoreMap {
        metric,
        scores: Default::default(),
    };

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let parse_error = |reason: String| ProximityError::Parse {
            path: path.to_path_buf(),
            line: line_no + 1,
            reason,
        };

        let (score, id) = line
            .split_once(|c: char| c == '\t' || c == ',')
            .ok_or_else(|| parse_error("expected score and identifier".to_string()))?;
        let score: f64 = score
            .trim()
            .parse()
            .map_err(|e| parse_error(format!("bad score '{}': {}", score, e)))?;

        scores.scores.insert(id.trim().to_string(), score);
    }

    log::info!(
        "Loaded {} {} scores from {} (neighborhood size {})",
        scores.len(),
        metric,
        path.display(),
        ranking::neighborhood_size(&scores)
    );
    Ok(scores)
}

/// Save a JSON summary of a scoring run
pub fn write_summary(
    path: impl AsRef<Path>,
    label: &str,
    graph: &CompressedGraph,
    partition: &SeedPartition,
    results: &[ScoreMap],
) -> Result<()> {
    let path = path.as_ref();
    let metrics: serde_json::Map<String, serde_json::Value> = results
        .iter()
        .map(|scores| {
            let top: Vec<_> = ranking::ranked(scores)
                .into_iter()
                .take(10)
                .map(|(id, score)| json!({ "id": id, "score": score }))
                .collect();
            (
                scores.metric.name().to_string(),
                json!({
                    "neighborhood_size": ranking::neighborhood_size(scores),
                    "top": top,
                }),
            )
        })
        .collect();

    let summary = json!({
        "label": label,
        "graph": {
            "fingerprint": graph.fingerprint(),
            "node_count": graph.node_count,
            "edge_count": graph.edge_count(),
        },
        "seeds": partition.seed_ids(graph),
        "seed_count": partition.seed_count(),
        "complement_count": partition.complement_count(),
        "metrics": metrics,
    });

    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(&summary)?.as_bytes())?;
    Ok(())
}

/// `<output_dir>/<label>_drug_scores.csv`
pub fn drug_scores_path(output_dir: impl AsRef<Path>, label: &str) -> PathBuf {
    output_dir.as_ref().join(format!("{}_drug_scores.csv", label))
}

/// Write per-drug best scores as CSV: the drug, then a score and target
/// column per metric. Metrics without a scored target are written as `x`.
pub fn write_drug_scores(path: impl AsRef<Path>, metrics: &[Metric], drugs: &[DrugScore]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);

    write!(writer, "drug")?;
    for metric in metrics {
        write!(writer, ",{},{}_target", metric, metric)?;
    }
    writeln!(writer)?;

    for drug in drugs {
        write!(writer, "{}", drug.drug)?;
        for best in &drug.best {
            match best {
                Some((target, score)) => write!(writer, ",{},{}", score, target)?,
                None => write!(writer, ",x,x")?,
            }
        }
        writeln!(writer)?;
    }
    writer.flush()?;

    log::info!("Wrote scores of {} drugs to {}", drugs.len(), path.display());
    Ok(())
}
