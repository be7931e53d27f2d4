//! End-to-end pipeline scenarios against a scripted chat backend.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use revrate_ai::{AiError, ChatApi, ChatMessage, Rater};
use revrate_cli::run::{self, JobConfig};
use revrate_core::{Attribute, AttributeCategory, Comment, Scale};
use revrate_store::{ColumnarSink, DuckSink};

enum Step {
    Reply(&'static str),
    Fail(&'static str),
}

/// Returns one scripted step per call, in order. Panics if called more
/// often than the script allows.
struct ScriptedApi {
    steps: Mutex<Vec<Step>>,
}

impl ScriptedApi {
    fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps),
        }
    }
}

#[async_trait]
impl ChatApi for ScriptedApi {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, AiError> {
        let mut steps = self.steps.lock().unwrap();
        assert!(!steps.is_empty(), "unexpected extra remote call");
        match steps.remove(0) {
            Step::Reply(text) => Ok(text.to_string()),
            Step::Fail(body) => Err(AiError::Server {
                status: 500,
                body: body.into(),
            }),
        }
    }
}

fn job() -> JobConfig {
    JobConfig {
        product_line: "Sympt-X".into(),
        scale: Scale::OneToFive,
        pause: Duration::ZERO,
        checkpoint_every: 20,
    }
}

fn balance() -> Vec<Attribute> {
    vec![Attribute {
        name: "balance".into(),
        category: AttributeCategory::BrandPersonality,
    }]
}

fn one_comment() -> Vec<Comment> {
    vec![Comment {
        id: "c1".into(),
        title: "Love it".into(),
        body: "Works great".into(),
    }]
}

fn two_comments() -> Vec<Comment> {
    vec![
        Comment {
            id: "c1".into(),
            title: "Love it".into(),
            body: "Works great".into(),
        },
        Comment {
            id: "c2".into(),
            title: "Too salty".into(),
            body: "Cannot take it every day".into(),
        },
    ]
}

#[tokio::test]
async fn duck_scored_reply_persists_score_and_reason() {
    let rater = Rater::new(ScriptedApi::new(vec![Step::Reply(
        "[4,Mentions balance positively]",
    )]));
    let mut sink = DuckSink::open_in_memory("comment_score").unwrap();

    let stats = run::run_duck(&rater, &mut sink, &one_comment(), &balance(), &job())
        .await
        .unwrap();
    assert_eq!(stats.scored, 1);

    let rows = sink.scores_for("balance").unwrap();
    assert_eq!(
        rows,
        vec![(
            "Love it".to_string(),
            Some(4),
            "Mentions balance positively".to_string()
        )]
    );
}

#[tokio::test]
async fn duck_sentinel_reply_persists_null_score() {
    let rater = Rater::new(ScriptedApi::new(vec![Step::Reply("[NaN,NaN]")]));
    let mut sink = DuckSink::open_in_memory("comment_score").unwrap();

    let stats = run::run_duck(&rater, &mut sink, &one_comment(), &balance(), &job())
        .await
        .unwrap();
    assert_eq!(stats.not_applicable, 1);

    let rows = sink.scores_for("balance").unwrap();
    assert_eq!(rows, vec![("Love it".to_string(), None, String::new())]);
}

#[tokio::test]
async fn duck_format_violation_persists_errored_row() {
    let rater = Rater::new(ScriptedApi::new(vec![Step::Reply("not a valid reply")]));
    let mut sink = DuckSink::open_in_memory("comment_score").unwrap();

    let stats = run::run_duck(&rater, &mut sink, &one_comment(), &balance(), &job())
        .await
        .unwrap();
    assert_eq!(stats.errored, 1);
    assert_eq!(sink.count().unwrap(), 1);

    let rows = sink.scores_for("balance").unwrap();
    assert_eq!(rows, vec![("Love it".to_string(), None, String::new())]);
}

#[tokio::test]
async fn duck_remote_fault_marks_row_and_continues() {
    let rater = Rater::new(ScriptedApi::new(vec![
        Step::Fail("quota exceeded"),
        Step::Reply("[2,Complains about the taste]"),
    ]));
    let mut sink = DuckSink::open_in_memory("comment_score").unwrap();

    let stats = run::run_duck(&rater, &mut sink, &two_comments(), &balance(), &job())
        .await
        .unwrap();
    assert_eq!(stats.errored, 1);
    assert_eq!(stats.scored, 1);

    let rows = sink.scores_for("balance").unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], ("Love it".to_string(), None, String::new()));
    assert_eq!(
        rows[1],
        (
            "Too salty".to_string(),
            Some(2),
            "Complains about the taste".to_string()
        )
    );
}

#[tokio::test]
async fn columnar_end_to_end_with_final_exports() {
    let tmp = tempfile::TempDir::new().unwrap();
    let store = tmp.path().join("ratings.arrow");
    let attributes = balance();
    let names = vec!["balance".to_string()];

    let rater = Rater::new(ScriptedApi::new(vec![
        Step::Reply("[4,Mentions balance positively]"),
        Step::Reply("[NaN,NaN]"),
    ]));
    let mut sink = ColumnarSink::open(&store, &names, false).unwrap();
    let stats = run::run_columnar(
        &rater,
        &mut sink,
        &two_comments(),
        &attributes,
        &tmp.path().join("temp"),
        &job(),
    )
    .await
    .unwrap();
    assert_eq!(stats.scored, 1);
    assert_eq!(stats.not_applicable, 1);

    for export in sink.export_paths() {
        assert!(export.exists(), "missing export {}", export.display());
    }
    let scores_csv = std::fs::read_to_string(tmp.path().join("ratings_scores.csv")).unwrap();
    assert!(scores_csv.contains("c1,Love it,Works great,4"));

    // The sentinel cell is recorded (scored), not left for retry.
    let reopened = ColumnarSink::open(&store, &names, false).unwrap();
    assert!(reopened.is_scored("c1", "balance"));
    assert!(reopened.is_scored("c2", "balance"));
}

#[tokio::test]
async fn columnar_rerun_skips_scored_cells() {
    let tmp = tempfile::TempDir::new().unwrap();
    let store = tmp.path().join("ratings.arrow");
    let names = vec!["balance".to_string()];

    let rater = Rater::new(ScriptedApi::new(vec![
        Step::Reply("[4,Good]"),
        Step::Reply("[NaN,NaN]"),
    ]));
    let mut sink = ColumnarSink::open(&store, &names, false).unwrap();
    run::run_columnar(
        &rater,
        &mut sink,
        &two_comments(),
        &balance(),
        &tmp.path().join("temp"),
        &job(),
    )
    .await
    .unwrap();

    // Second run: every cell is already scored, so the script stays empty.
    let rater = Rater::new(ScriptedApi::new(Vec::new()));
    let mut sink = ColumnarSink::open(&store, &names, false).unwrap();
    let stats = run::run_columnar(
        &rater,
        &mut sink,
        &two_comments(),
        &balance(),
        &tmp.path().join("temp"),
        &job(),
    )
    .await
    .unwrap();
    assert_eq!(stats.skipped, 2);
    assert_eq!(stats.scored + stats.not_applicable + stats.errored, 0);
}

#[tokio::test]
async fn columnar_errored_cell_is_retried_on_next_run() {
    let tmp = tempfile::TempDir::new().unwrap();
    let store = tmp.path().join("ratings.arrow");
    let names = vec!["balance".to_string()];

    let rater = Rater::new(ScriptedApi::new(vec![Step::Fail("connection reset")]));
    let mut sink = ColumnarSink::open(&store, &names, false).unwrap();
    let stats = run::run_columnar(
        &rater,
        &mut sink,
        &one_comment(),
        &balance(),
        &tmp.path().join("temp"),
        &job(),
    )
    .await
    .unwrap();
    assert_eq!(stats.errored, 1);
    assert!(!sink.is_scored("c1", "balance"));

    let rater = Rater::new(ScriptedApi::new(vec![Step::Reply("[5,Recovered]")]));
    let mut sink = ColumnarSink::open(&store, &names, false).unwrap();
    let stats = run::run_columnar(
        &rater,
        &mut sink,
        &one_comment(),
        &balance(),
        &tmp.path().join("temp"),
        &job(),
    )
    .await
    .unwrap();
    assert_eq!(stats.scored, 1);
    assert!(sink.is_scored("c1", "balance"));
}

#[tokio::test]
async fn columnar_checkpoints_during_long_runs() {
    let tmp = tempfile::TempDir::new().unwrap();
    let store = tmp.path().join("ratings.arrow");
    let checkpoints = tmp.path().join("temp");
    let names = vec!["balance".to_string()];

    let comments: Vec<Comment> = (0..3)
        .map(|i| Comment {
            id: format!("c{i}"),
            title: format!("comment {i}"),
            body: "body".into(),
        })
        .collect();
    let rater = Rater::new(ScriptedApi::new(vec![
        Step::Reply("[3,ok]"),
        Step::Reply("[3,ok]"),
        Step::Reply("[3,ok]"),
    ]));
    let mut sink = ColumnarSink::open(&store, &names, false).unwrap();
    let mut config = job();
    config.checkpoint_every = 2;
    run::run_columnar(&rater, &mut sink, &comments, &balance(), &checkpoints, &config)
        .await
        .unwrap();

    let snapshots: Vec<_> = std::fs::read_dir(&checkpoints).unwrap().collect();
    assert_eq!(snapshots.len(), 1);
}
