//! Drug-target list loading

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::{ProximityError, Result};

/// Targets of each drug, in the order they were listed
pub type DrugTargets = BTreeMap<String, Vec<String>>;

/// Load drug-target pairs, one `drug<SEP>target` pair per line.
///
/// Separators are tabs, commas or spaces; further columns are ignored, as are
/// blank lines and `#` comments. Repeated pairs collapse.
pub fn load_drug_targets(path: impl AsRef<Path>) -> Result<DrugTargets> {
    let path = path.as_ref();
    let targets = read_drug_targets(File::open(path)?, path)?;
    log::info!("Read targets of {} drugs from {}", targets.len(), path.display());
    Ok(targets)
}

pub fn read_drug_targets<R: Read>(reader: R, origin: &Path) -> Result<DrugTargets> {
    let mut targets = DrugTargets::new();

    for (line_no, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line
            .split(|c: char| c == '\t' || c == ',' || c == ' ')
            .filter(|f| !f.is_empty());

        let (drug, target) = match (fields.next(), fields.next()) {
            (Some(drug), Some(target)) => (drug, target),
            _ => {
                return Err(ProximityError::Parse {
                    path: origin.to_path_buf(),
                    line: line_no + 1,
                    reason: "expected drug and target identifiers".to_string(),
                })
            }
        };

        let listed = targets.entry(drug.to_string()).or_default();
        if !listed.iter().any(|t| t == target) {
            listed.push(target.to_string());
        }
    }

    Ok(targets)
}
