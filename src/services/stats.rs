use crate::models::{Outcome, Prediction, Stats};

/// Aggregate won/lost/pending over the full prediction list.
///
/// `void` results count toward none of the three, so the total can be
/// smaller than the number of predictions.
pub fn recompute_stats(predictions: &[Prediction]) -> Stats {
    predictions.iter().fold(Stats::default(), |mut stats, p| {
        match p.result {
            Outcome::Won => stats.won += 1,
            Outcome::Lost => stats.lost += 1,
            Outcome::Pending => stats.pending += 1,
            Outcome::Void => {}
        }
        stats
    })
}
