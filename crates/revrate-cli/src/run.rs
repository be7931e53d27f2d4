//! Sequential batch runner: prompt → call → parse → persist, one
//! (comment, attribute) pair at a time.
//!
//! The remote call is the only suspension point; a fixed courtesy pause
//! follows every call. There are no retries: an errored pair is recorded
//! (DuckDB) or left unscored for a later run (columnar) and the loop
//! moves on.

use std::path::Path;
use std::time::{Duration, Instant};

use revrate_ai::{ChatApi, Rater};
use revrate_core::{Attribute, Comment, RatingRequest, RatingRow, Scale, Verdict};
use revrate_store::{ColumnarSink, DuckSink, StoreError};
use tracing::{info, warn};

/// Knobs for one batch run.
pub struct JobConfig {
    pub product_line: String,
    pub scale: Scale,
    /// Courtesy pause after each remote call.
    pub pause: Duration,
    /// Columnar variant: checkpoint after this many newly scored cells.
    pub checkpoint_every: usize,
}

/// Totals for one run.
#[derive(Debug, Default)]
pub struct RunStats {
    pub scored: usize,
    pub not_applicable: usize,
    pub errored: usize,
    pub skipped: usize,
    pub elapsed_secs: f64,
}

impl RunStats {
    fn tally(&mut self, verdict: &Verdict) {
        match verdict {
            Verdict::Scored { .. } => self.scored += 1,
            Verdict::NotApplicable => self.not_applicable += 1,
            Verdict::Errored { .. } => self.errored += 1,
        }
    }
}

/// Rate every (comment, attribute) pair into the DuckDB sink.
///
/// Rows append one batch per attribute. Errored pairs still append, with a
/// null score and the error text as the raw response.
pub async fn run_duck<A: ChatApi>(
    rater: &Rater<A>,
    sink: &mut DuckSink,
    comments: &[Comment],
    attributes: &[Attribute],
    config: &JobConfig,
) -> Result<RunStats, StoreError> {
    let start = Instant::now();
    let mut stats = RunStats::default();

    for attribute in attributes {
        let attr_start = Instant::now();
        let mut rows = Vec::with_capacity(comments.len());
        for comment in comments {
            let request =
                RatingRequest::new(comment, &config.product_line, attribute, config.scale);
            let result = rater.rate(&request).await;
            stats.tally(&result.verdict);
            rows.push(RatingRow::from_result(comment, &attribute.name, &result));
            tokio::time::sleep(config.pause).await;
        }
        sink.append_batch(&rows)?;
        info!(
            attribute = %attribute.name,
            rated = rows.len(),
            elapsed_secs = attr_start.elapsed().as_secs_f64(),
            "attribute finished"
        );
    }

    stats.elapsed_secs = start.elapsed().as_secs_f64();
    Ok(stats)
}

/// Rate unscored (comment, attribute) cells into the columnar sink.
///
/// Cells that already hold a reply are skipped, so re-running against an
/// existing store processes only the remainder. Errored pairs leave their
/// cell empty for the next run. Checkpoint failures are logged and
/// skipped; only the final export propagates.
pub async fn run_columnar<A: ChatApi>(
    rater: &Rater<A>,
    sink: &mut ColumnarSink,
    comments: &[Comment],
    attributes: &[Attribute],
    checkpoint_dir: &Path,
    config: &JobConfig,
) -> Result<RunStats, StoreError> {
    let start = Instant::now();
    let mut stats = RunStats::default();

    for comment in comments {
        sink.upsert_comment(comment);
    }

    let mut since_checkpoint = 0usize;
    for attribute in attributes {
        let attr_start = Instant::now();
        let mut rated = 0usize;
        for comment in comments {
            if sink.is_scored(&comment.id, &attribute.name) {
                stats.skipped += 1;
                continue;
            }
            let request =
                RatingRequest::new(comment, &config.product_line, attribute, config.scale);
            let result = rater.rate(&request).await;
            stats.tally(&result.verdict);
            if !result.is_errored() {
                sink.record(&comment.id, &attribute.name, &result.raw)?;
                rated += 1;
                since_checkpoint += 1;
                if since_checkpoint >= config.checkpoint_every {
                    since_checkpoint = 0;
                    if let Err(e) = sink.checkpoint(checkpoint_dir) {
                        warn!(error = %e, "checkpoint failed, continuing");
                    }
                }
            }
            tokio::time::sleep(config.pause).await;
        }
        info!(
            attribute = %attribute.name,
            rated,
            elapsed_secs = attr_start.elapsed().as_secs_f64(),
            "attribute finished"
        );
    }

    sink.finish()?;
    stats.elapsed_secs = start.elapsed().as_secs_f64();
    Ok(stats)
}
