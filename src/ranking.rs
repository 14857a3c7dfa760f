//! Ranking helpers over computed scores

use itertools::Itertools;

use crate::data::DrugTargets;
use crate::metrics::ScoreMap;

/// Number of nodes with a positive score, i.e. closer to the seeds than to
/// the rest of the network
pub fn neighborhood_size(scores: &ScoreMap) -> usize {
    scores.iter().filter(|(_, score)| *score > 0.0).count()
}

/// Nodes by descending score; ties keep identifier order
pub fn ranked(scores: &ScoreMap) -> Vec<(&str, f64)> {
    scores
        .iter()
        .sorted_by(|a, b| b.1.total_cmp(&a.1))
        .collect()
}

/// The highest-scoring of a drug's targets.
///
/// Targets without a score are skipped; the first of equally scored targets
/// wins. `None` when no target is scored.
pub fn best_target<'t, S: AsRef<str>>(scores: &ScoreMap, targets: &'t [S]) -> Option<(&'t str, f64)> {
    let mut best: Option<(&str, f64)> = None;
    for target in targets {
        let target = target.as_ref();
        if let Some(score) = scores.get(target) {
            match best {
                Some((_, current)) if score <= current => {}
                _ => best = Some((target, score)),
            }
        }
    }
    best
}

/// Best target of one drug under each scored metric
#[derive(Debug, Clone, PartialEq)]
pub struct DrugScore {
    pub drug: String,
    /// One entry per metric, in the order the score maps were given
    pub best: Vec<Option<(String, f64)>>,
}

/// Score every drug by its best target under each metric.
///
/// Drugs with no scored target under any metric are left out.
pub fn score_drugs(results: &[ScoreMap], drug_targets: &DrugTargets) -> Vec<DrugScore> {
    let drugs: Vec<DrugScore> = drug_targets
        .iter()
        .map(|(drug, targets)| DrugScore {
            drug: drug.clone(),
            best: results
                .iter()
                .map(|scores| best_target(scores, targets).map(|(t, s)| (t.to_string(), s)))
                .collect(),
        })
        .filter(|score| score.best.iter().any(Option::is_some))
        .collect();

    log::info!("Scored {} of {} drugs", drugs.len(), drug_targets.len());
    drugs
}
