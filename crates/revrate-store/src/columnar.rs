//! Columnar sink: wide format, one row per comment, one column per
//! attribute holding the raw model reply.
//!
//! The table lives in memory between snapshots. Periodic checkpoints go to
//! timestamped Arrow IPC files; the final export writes the raw table and a
//! score-only variant, each as Arrow IPC and CSV. A null cell means "not
//! yet scored", so re-opening an existing store resumes exactly the
//! unscored cells.

use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Int64Array, StringArray};
use arrow::csv;
use arrow::ipc::reader::FileReader;
use arrow::ipc::writer::FileWriter;
use arrow::record_batch::RecordBatch;
use chrono::Local;
use revrate_core::schema::wide;
use revrate_core::{Comment, extract_score};
use tracing::info;

use crate::StoreError;

#[derive(Debug)]
pub struct ColumnarSink {
    path: PathBuf,
    schema: Arc<arrow::datatypes::Schema>,
    attributes: Vec<String>,
    ids: Vec<String>,
    titles: Vec<String>,
    bodies: Vec<String>,
    /// cells[column][row], indexed like `attributes`.
    cells: Vec<Vec<Option<String>>>,
    row_index: HashMap<String, usize>,
    attr_index: HashMap<String, usize>,
}

impl ColumnarSink {
    /// Open the store at `path` with a fixed attribute list.
    ///
    /// The attribute → column mapping is validated up front (duplicate,
    /// empty, and reserved names are rejected). An existing file is
    /// reloaded unless `overwrite` is set, in which case it is removed and
    /// the store starts empty.
    pub fn open(path: &Path, attributes: &[String], overwrite: bool) -> Result<Self, StoreError> {
        let schema = Arc::new(wide::raw_schema(attributes)?);
        let mut sink = Self {
            path: path.to_path_buf(),
            schema,
            attributes: attributes.to_vec(),
            ids: Vec::new(),
            titles: Vec::new(),
            bodies: Vec::new(),
            cells: vec![Vec::new(); attributes.len()],
            row_index: HashMap::new(),
            attr_index: attributes
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), i))
                .collect(),
        };
        if overwrite && path.exists() {
            fs::remove_file(path)?;
            info!(path = %path.display(), "removed existing store");
        } else if path.exists() {
            sink.load_existing()?;
        }
        Ok(sink)
    }

    fn load_existing(&mut self) -> Result<(), StoreError> {
        let file = File::open(&self.path)?;
        let reader = FileReader::try_new(file, None)?;

        let file_schema = reader.schema();
        for base in wide::BASE_COLUMNS {
            if file_schema.field_with_name(base).is_err() {
                return Err(StoreError::SchemaMismatch(format!(
                    "missing base column {base} in {}",
                    self.path.display()
                )));
            }
        }
        for field in file_schema.fields() {
            let name = field.name().as_str();
            if !wide::BASE_COLUMNS.contains(&name) && !self.attr_index.contains_key(name) {
                return Err(StoreError::SchemaMismatch(format!(
                    "column {name} in {} is not in the configured attribute list",
                    self.path.display()
                )));
            }
        }

        for batch in reader {
            let batch = batch?;
            let ids = utf8_column(&batch, "id")?;
            let titles = utf8_column(&batch, "title")?;
            let bodies = utf8_column(&batch, "body")?;

            let mut rows = Vec::with_capacity(batch.num_rows());
            for i in 0..batch.num_rows() {
                rows.push(self.upsert_comment(&Comment {
                    id: ids.value(i).to_string(),
                    title: titles.value(i).to_string(),
                    body: bodies.value(i).to_string(),
                }));
            }

            for (attribute, &col) in &self.attr_index {
                let Some(array) = batch.column_by_name(attribute) else {
                    continue;
                };
                let cells = array
                    .as_any()
                    .downcast_ref::<StringArray>()
                    .ok_or_else(|| {
                        StoreError::SchemaMismatch(format!("column {attribute} is not utf8"))
                    })?;
                for (i, &row) in rows.iter().enumerate() {
                    if !cells.is_null(i) {
                        self.cells[col][row] = Some(cells.value(i).to_string());
                    }
                }
            }
        }

        info!(rows = self.ids.len(), path = %self.path.display(), "loaded existing store");
        Ok(())
    }

    /// Register a comment, returning its row. Known ids keep their row.
    pub fn upsert_comment(&mut self, comment: &Comment) -> usize {
        if let Some(&row) = self.row_index.get(&comment.id) {
            return row;
        }
        let row = self.ids.len();
        self.ids.push(comment.id.clone());
        self.titles.push(comment.title.clone());
        self.bodies.push(comment.body.clone());
        for column in &mut self.cells {
            column.push(None);
        }
        self.row_index.insert(comment.id.clone(), row);
        row
    }

    /// Whether the (comment, attribute) cell already holds a reply.
    pub fn is_scored(&self, comment_id: &str, attribute: &str) -> bool {
        match (
            self.row_index.get(comment_id),
            self.attr_index.get(attribute),
        ) {
            (Some(&row), Some(&col)) => self.cells[col][row].is_some(),
            _ => false,
        }
    }

    /// Record the raw reply for a known (comment, attribute) pair.
    pub fn record(&mut self, comment_id: &str, attribute: &str, raw: &str) -> Result<(), StoreError> {
        let col = *self
            .attr_index
            .get(attribute)
            .ok_or_else(|| StoreError::UnknownAttribute(attribute.to_string()))?;
        let row = *self
            .row_index
            .get(comment_id)
            .ok_or_else(|| StoreError::UnknownComment(comment_id.to_string()))?;
        self.cells[col][row] = Some(raw.to_string());
        Ok(())
    }

    /// Number of comment rows.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of filled cells across all attributes.
    pub fn scored_cells(&self) -> usize {
        self.cells
            .iter()
            .map(|column| column.iter().filter(|c| c.is_some()).count())
            .sum()
    }

    /// The raw wide table as a record batch.
    pub fn to_batch(&self) -> Result<RecordBatch, StoreError> {
        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(self.ids.iter())),
            Arc::new(StringArray::from_iter_values(self.titles.iter())),
            Arc::new(StringArray::from_iter_values(self.bodies.iter())),
        ];
        for cells in &self.cells {
            columns.push(Arc::new(StringArray::from_iter(
                cells.iter().map(|c| c.as_deref()),
            )));
        }
        Ok(RecordBatch::try_new(self.schema.clone(), columns)?)
    }

    /// The score-only variant, with the loose extractor applied per cell.
    pub fn to_score_batch(&self) -> Result<RecordBatch, StoreError> {
        let schema = Arc::new(wide::score_schema(&self.attributes)?);
        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(self.ids.iter())),
            Arc::new(StringArray::from_iter_values(self.titles.iter())),
            Arc::new(StringArray::from_iter_values(self.bodies.iter())),
        ];
        for cells in &self.cells {
            columns.push(Arc::new(Int64Array::from_iter(
                cells.iter().map(|c| c.as_deref().and_then(extract_score)),
            )));
        }
        Ok(RecordBatch::try_new(schema, columns)?)
    }

    /// Snapshot the raw table to a timestamped file in `dir`.
    pub fn checkpoint(&self, dir: &Path) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(dir)?;
        let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let path = dir.join(format!("{stamp}.arrow"));
        write_ipc(&path, &self.to_batch()?)?;
        info!(path = %path.display(), rows = self.ids.len(), "checkpoint written");
        Ok(path)
    }

    /// Final full export.
    ///
    /// Writes the raw table to the store path and its CSV sibling, and the
    /// score-only table to `<stem>_scores.arrow` / `<stem>_scores.csv`.
    pub fn finish(&self) -> Result<(), StoreError> {
        let raw = self.to_batch()?;
        let scores = self.to_score_batch()?;
        let [raw_ipc, raw_csv, score_ipc, score_csv] = self.export_paths();
        write_ipc(&raw_ipc, &raw)?;
        write_csv(&raw_csv, &raw)?;
        write_ipc(&score_ipc, &scores)?;
        write_csv(&score_csv, &scores)?;
        info!(
            rows = self.ids.len(),
            cells = self.scored_cells(),
            path = %self.path.display(),
            "final export written"
        );
        Ok(())
    }

    /// Paths written by [`finish`]: raw IPC (the store itself), raw CSV,
    /// score-only IPC, score-only CSV.
    pub fn export_paths(&self) -> [PathBuf; 4] {
        [
            self.path.clone(),
            self.sibling("", "csv"),
            self.sibling("_scores", "arrow"),
            self.sibling("_scores", "csv"),
        ]
    }

    fn sibling(&self, suffix: &str, ext: &str) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("ratings");
        self.path.with_file_name(format!("{stem}{suffix}.{ext}"))
    }
}

fn write_ipc(path: &Path, batch: &RecordBatch) -> Result<(), StoreError> {
    let file = File::create(path)?;
    let mut writer = FileWriter::try_new(file, batch.schema_ref())?;
    writer.write(batch)?;
    writer.finish()?;
    Ok(())
}

fn write_csv(path: &Path, batch: &RecordBatch) -> Result<(), StoreError> {
    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new().with_header(true).build(file);
    writer.write(batch)?;
    Ok(())
}

fn utf8_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, StoreError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| StoreError::SchemaMismatch(format!("missing or non-utf8 column: {name}")))
}
