//! `iris_dataset` and `iris_setosa`: load the iris CSV and filter a species.

use crate::error::PipelineResult;
use crate::models::{AssetKey, IrisRecord, Materialization, MetadataValue};
use crate::report::generator::PREVIEW_ROWS;
use crate::report::iris_preview;
use crate::source::DatasetSource;
use crate::storage::{ArtifactStore, IRIS_DATASET, IRIS_SETOSA};
use std::path::PathBuf;
use tracing::info;

/// Default location of the iris CSV.
pub const DEFAULT_IRIS_URL: &str = "https://docs.dagster.io/assets/iris.csv";

/// Parse the header-less remote CSV.
pub fn parse_iris_csv(text: &str) -> PipelineResult<Vec<IrisRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// Rows whose species matches exactly.
pub fn filter_species(records: &[IrisRecord], species: &str) -> Vec<IrisRecord> {
    records
        .iter()
        .filter(|r| r.species == species)
        .cloned()
        .collect()
}

fn write_table(store: &ArtifactStore, name: &str, records: &[IrisRecord]) -> PipelineResult<PathBuf> {
    store.write_with(name, |w| {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(w);
        writer.write_record(IrisRecord::COLUMNS)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    })
}

fn read_table(store: &ArtifactStore, name: &str) -> PipelineResult<Vec<IrisRecord>> {
    let mut reader = csv::Reader::from_reader(store.open(name)?);
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

pub async fn load_iris_dataset<D: DatasetSource>(
    source: &D,
    store: &ArtifactStore,
) -> PipelineResult<Materialization> {
    let records = parse_iris_csv(&source.fetch_csv().await?)?;
    info!("Loaded {} iris rows", records.len());

    let path = write_table(store, IRIS_DATASET, &records)?;

    Ok(Materialization::new(AssetKey::IrisDataset)
        .with_artifact(path)
        .with_metadata("num_records", MetadataValue::Int(records.len() as u64))
        .with_metadata(
            "preview",
            MetadataValue::Markdown(iris_preview(&records, PREVIEW_ROWS)),
        ))
}

pub fn materialize_species(store: &ArtifactStore, species: &str) -> PipelineResult<Materialization> {
    let records = read_table(store, IRIS_DATASET)?;
    let kept = filter_species(&records, species);
    info!("Kept {} of {} rows with species {}", kept.len(), records.len(), species);

    let path = write_table(store, IRIS_SETOSA, &kept)?;

    Ok(Materialization::new(AssetKey::IrisSetosa)
        .with_artifact(path)
        .with_metadata("num_records", MetadataValue::Int(kept.len() as u64))
        .with_metadata("species", MetadataValue::Text(species.to_string()))
        .with_metadata("source", MetadataValue::Path(store.path(IRIS_DATASET))))
}
