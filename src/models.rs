//! Data models for the asset pipeline.
//!
//! This module contains the records passed between assets (identifier
//! lists, story rows, word counts, iris rows) and the materialization
//! records that describe what each asset produced.

use crate::error::PipelineResult;
use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::io::{Read, Write};
use std::path::PathBuf;

/// Named asset produced by this pipeline.
///
/// Variants are declared in dependency order; sorting a selection by this
/// order yields a valid execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKey {
    TopstoryIds,
    Topstories,
    MostFrequentWords,
    IrisDataset,
    IrisSetosa,
}

impl AssetKey {
    /// Every asset, in execution order.
    pub const ALL: [AssetKey; 5] = [
        AssetKey::TopstoryIds,
        AssetKey::Topstories,
        AssetKey::MostFrequentWords,
        AssetKey::IrisDataset,
        AssetKey::IrisSetosa,
    ];

    /// Stable snake_case name, also used in reports.
    pub fn name(&self) -> &'static str {
        match self {
            AssetKey::TopstoryIds => "topstory_ids",
            AssetKey::Topstories => "topstories",
            AssetKey::MostFrequentWords => "most_frequent_words",
            AssetKey::IrisDataset => "iris_dataset",
            AssetKey::IrisSetosa => "iris_setosa",
        }
    }

    /// Upstream assets whose artifacts this asset reads.
    pub fn deps(&self) -> &'static [AssetKey] {
        match self {
            AssetKey::TopstoryIds | AssetKey::IrisDataset => &[],
            AssetKey::Topstories => &[AssetKey::TopstoryIds],
            AssetKey::MostFrequentWords => &[AssetKey::Topstories],
            AssetKey::IrisSetosa => &[AssetKey::IrisDataset],
        }
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Ranked story identifiers, in the order the ranking endpoint returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentifierList(pub Vec<u64>);

impl IdentifierList {
    /// Keep the first `limit` identifiers of a ranking.
    pub fn from_ranking(mut ranking: Vec<u64>, limit: usize) -> Self {
        ranking.truncate(limit);
        Self(ranking)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.0.iter().copied()
    }
}

/// One item as returned by the lookup endpoint.
///
/// Only `title` is interpreted; every other field is carried through as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl ItemRecord {
    /// Title text, with a missing title read as the empty string.
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}

/// Ordered story rows, one per fetched identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryTable {
    pub rows: Vec<ItemRecord>,
}

const TITLE_COLUMN: &str = "title";

impl StoryTable {
    pub fn new(rows: Vec<ItemRecord>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over titles in row order.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(ItemRecord::title_or_empty)
    }

    /// Column names: `title` first, then every other field name sorted.
    pub fn columns(&self) -> Vec<String> {
        let others: BTreeSet<&String> = self.rows.iter().flat_map(|r| r.fields.keys()).collect();

        std::iter::once(TITLE_COLUMN.to_string())
            .chain(others.into_iter().filter(|k| *k != TITLE_COLUMN).cloned())
            .collect()
    }

    /// Render every row as display text aligned with [`StoryTable::columns`].
    ///
    /// Strings appear unquoted; this is for previews, not for storage.
    pub fn to_cells(&self) -> (Vec<String>, Vec<Vec<String>>) {
        self.render_cells(display_cell)
    }

    fn render_cells(&self, render: fn(&Value) -> String) -> (Vec<String>, Vec<Vec<String>>) {
        let columns = self.columns();
        let cells = self
            .rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|col| {
                        if col == TITLE_COLUMN {
                            row.title
                                .as_ref()
                                .map(|t| render(&Value::String(t.clone())))
                                .unwrap_or_default()
                        } else {
                            row.fields.get(col).map(render).unwrap_or_default()
                        }
                    })
                    .collect()
            })
            .collect();

        (columns, cells)
    }

    /// Write the table as CSV with a header row.
    ///
    /// Every present value is stored as compact JSON; an absent value is an
    /// empty cell.
    pub fn write_csv<W: Write>(&self, writer: W) -> PipelineResult<()> {
        let (columns, cells) = self.render_cells(Value::to_string);
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(&columns)?;
        for row in &cells {
            csv_writer.write_record(row)?;
        }
        csv_writer.flush().map_err(csv::Error::from)?;

        Ok(())
    }

    /// Read a table previously written by [`StoryTable::write_csv`].
    pub fn read_csv<R: Read>(reader: R) -> PipelineResult<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers = csv_reader.headers()?.clone();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let mut item = ItemRecord::default();

            for (column, cell) in headers.iter().zip(record.iter()) {
                if cell.is_empty() {
                    continue;
                }
                if column == TITLE_COLUMN {
                    item.title = Some(serde_json::from_str(cell)?);
                } else {
                    item.fields.insert(column.to_string(), serde_json::from_str(cell)?);
                }
            }

            rows.push(item);
        }

        Ok(Self { rows })
    }
}

/// Strings unquoted, everything else as compact JSON.
fn display_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Default stopwords excluded from word counts.
pub const DEFAULT_STOPWORDS: [&str; 11] = [
    "a", "the", "an", "of", "to", "in", "for", "and", "with", "on", "is",
];

/// Tokens excluded from frequency analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopwordSet(HashSet<String>);

impl Default for StopwordSet {
    fn default() -> Self {
        Self(DEFAULT_STOPWORDS.iter().map(|w| w.to_string()).collect())
    }
}

impl StopwordSet {
    /// The defaults plus any extra words (lower-cased).
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        set.0
            .extend(extra.into_iter().map(|w| w.as_ref().trim().to_lowercase()));
        set.0.remove("");
        set
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Top tokens with their counts, most frequent first.
///
/// Serialized as a JSON object whose key order follows the table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordFrequencyTable(pub Vec<(String, u64)>);

impl WordFrequencyTable {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, token: &str) -> Option<u64> {
        self.0.iter().find(|(t, _)| t == token).map(|(_, c)| *c)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(t, _)| t.as_str())
    }

    pub fn max_count(&self) -> u64 {
        self.0.iter().map(|(_, c)| *c).max().unwrap_or(0)
    }
}

impl Serialize for WordFrequencyTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (token, count) in &self.0 {
            map.serialize_entry(token, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for WordFrequencyTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = WordFrequencyTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of tokens to counts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((token, count)) = access.next_entry::<String, u64>()? {
                    entries.push((token, count));
                }
                Ok(WordFrequencyTable(entries))
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// One row of the iris dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrisRecord {
    pub sepal_length_cm: f64,
    pub sepal_width_cm: f64,
    pub petal_length_cm: f64,
    pub petal_width_cm: f64,
    pub species: String,
}

impl IrisRecord {
    /// Header row of the iris tables, in field order.
    pub const COLUMNS: [&'static str; 5] = [
        "sepal_length_cm",
        "sepal_width_cm",
        "petal_length_cm",
        "petal_width_cm",
        "species",
    ];
}

/// Value attached to a materialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum MetadataValue {
    Int(u64),
    Text(String),
    Markdown(String),
    Path(PathBuf),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Int(n) => write!(f, "{}", n),
            MetadataValue::Text(s) | MetadataValue::Markdown(s) => write!(f, "{}", s),
            MetadataValue::Path(p) => write!(f, "{}", p.display()),
        }
    }
}

/// Labelled metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub label: String,
    pub value: MetadataValue,
}

/// Record of one asset materialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Materialization {
    /// Which asset was produced.
    pub asset: AssetKey,
    /// When it finished.
    pub materialized_at: DateTime<Utc>,
    /// Files written by the asset.
    pub artifacts: Vec<PathBuf>,
    /// Metadata in insertion order.
    pub metadata: Vec<MetadataEntry>,
}

impl Materialization {
    pub fn new(asset: AssetKey) -> Self {
        Self {
            asset,
            materialized_at: Utc::now(),
            artifacts: Vec::new(),
            metadata: Vec::new(),
        }
    }

    pub fn with_artifact(mut self, path: PathBuf) -> Self {
        self.artifacts.push(path);
        self
    }

    pub fn with_metadata(mut self, label: &str, value: MetadataValue) -> Self {
        self.metadata.push(MetadataEntry {
            label: label.to_string(),
            value,
        });
        self
    }

    /// Look up a metadata value by label.
    pub fn metadata(&self, label: &str) -> Option<&MetadataValue> {
        self.metadata
            .iter()
            .find(|e| e.label == label)
            .map(|e| &e.value)
    }
}

/// Everything one invocation materialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration in seconds.
    pub duration_seconds: f64,
    /// Directory the artifacts were written to.
    pub data_dir: PathBuf,
    /// One entry per asset, in execution order.
    pub materializations: Vec<Materialization>,
}
