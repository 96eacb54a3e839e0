use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use futures::StreamExt;
use serde_json::{Map, Value};
use tokio::io::AsyncWrite;

use crate::domain::{utc_date_stamp, CatalogRecord, Column};
use crate::sort::SortDirective;
use crate::{QueryError, ValidationError};

/// Directory used by [`CatalogTable::save_csv`] when none is given.
pub const DEFAULT_OUTPUT_DIR: &str = "satcatalogs";

/// Where a table's rows came from. Only used for default file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    Discos,
    Celestrak,
    Objects,
    External,
}

impl Provenance {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Discos => "discos_catalog",
            Self::Celestrak => "celestrak_catalog",
            Self::Objects => "objects_catalog",
            Self::External => "external",
        }
    }
}

impl Display for Provenance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered rows sharing one column schema.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogTable {
    provenance: Provenance,
    columns: Vec<Column>,
    rows: Vec<CatalogRecord>,
}

impl CatalogTable {
    pub fn new(provenance: Provenance, columns: Vec<Column>, rows: Vec<CatalogRecord>) -> Self {
        Self {
            provenance,
            columns,
            rows,
        }
    }

    pub const fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[CatalogRecord] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<CatalogRecord> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Removes `column` from the schema and clears it in every row.
    pub fn drop_column(&mut self, column: Column) {
        self.columns.retain(|existing| *existing != column);
        for row in &mut self.rows {
            column.clear(row);
        }
    }

    /// Stable sort on one column; rows with an empty cell go last in both directions.
    pub fn sort_by(&mut self, directive: &SortDirective) {
        let column = directive.column;
        self.rows.sort_by(|left, right| {
            let (left, right) = (column.cell(left), column.cell(right));
            match (left.is_empty(), right.is_empty()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => {
                    let ordering = left.compare(&right);
                    if directive.descending {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                }
            }
        });
    }

    /// NORAD ids of every row that has one, in row order.
    pub fn norad_ids(&self) -> Vec<u32> {
        self.rows.iter().filter_map(|row| row.norad_id).collect()
    }

    /// JSON array with one object per row, keyed by column name.
    pub fn to_json(&self) -> Value {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let object: Map<String, Value> = self
                    .columns
                    .iter()
                    .map(|column| (column.as_str().to_owned(), column.cell(row).to_json()))
                    .collect();
                Value::Object(object)
            })
            .collect();
        Value::Array(rows)
    }

    /// `<provenance>_<YYYYMMDD>.csv` for today's UTC date.
    pub fn default_file_name(&self) -> String {
        format!("{}_{}.csv", self.provenance, utc_date_stamp())
    }

    pub async fn write_csv<W>(&self, writer: W) -> Result<(), QueryError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let mut writer = csv_async::AsyncWriter::from_writer(writer);
        writer
            .write_record(self.columns.iter().map(|column| column.as_str()))
            .await?;
        for row in &self.rows {
            writer
                .write_record(self.columns.iter().map(|column| column.cell(row).to_string()))
                .await?;
        }
        writer.flush().await?;
        Ok(())
    }

    /// Writes the table under `dir` (default `satcatalogs/`) and returns the file path.
    pub async fn save_csv(&self, dir: Option<&Path>) -> Result<PathBuf, QueryError> {
        let dir = dir.unwrap_or_else(|| Path::new(DEFAULT_OUTPUT_DIR));
        tokio::fs::create_dir_all(dir).await?;

        let path = dir.join(self.default_file_name());
        let file = tokio::fs::File::create(&path).await?;
        self.write_csv(file).await?;
        tracing::info!(path = %path.display(), rows = self.len(), "saved catalog table");
        Ok(path)
    }

    /// Reloads a table written by [`CatalogTable::write_csv`]. Unknown headers are ignored.
    pub async fn read_csv(path: &Path, provenance: Provenance) -> Result<Self, QueryError> {
        let file = tokio::fs::File::open(path).await?;
        let mut reader = csv_async::AsyncReader::from_reader(file);

        let layout: Vec<Option<Column>> = reader
            .headers()
            .await?
            .iter()
            .map(|header| Column::from_name(header.trim()))
            .collect();
        let columns = layout.iter().flatten().copied().collect();

        let mut rows = Vec::new();
        let mut records = reader.records();
        while let Some(record) = records.next().await {
            let record = record?;
            let mut row = CatalogRecord::default();
            for (column, raw) in layout.iter().zip(record.iter()) {
                if let Some(column) = column {
                    column.assign(&mut row, raw).map_err(|value| {
                        QueryError::Validation(ValidationError::InvalidNoradId { value })
                    })?;
                }
            }
            rows.push(row);
        }

        Ok(Self::new(provenance, columns, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(norad_id: u32, mass: Option<f64>) -> CatalogRecord {
        CatalogRecord {
            norad_id: Some(norad_id),
            mass,
            ..CatalogRecord::default()
        }
    }

    fn table() -> CatalogTable {
        CatalogTable::new(
            Provenance::Discos,
            vec![Column::NoradId, Column::Mass],
            vec![
                row(3, Some(2.0)),
                row(1, None),
                row(2, Some(9.0)),
                row(4, Some(2.0)),
            ],
        )
    }

    #[test]
    fn descending_sort_keeps_empty_cells_last() {
        let mut table = table();
        table.sort_by(&SortDirective::descending(Column::Mass));
        assert_eq!(table.norad_ids(), vec![2, 3, 4, 1]);

        table.sort_by(&SortDirective::ascending(Column::Mass));
        assert_eq!(table.norad_ids(), vec![3, 4, 2, 1]);
    }

    #[test]
    fn dropping_a_column_clears_it() {
        let mut table = table();
        table.drop_column(Column::Mass);
        assert_eq!(table.columns(), &[Column::NoradId]);
        assert!(table.rows().iter().all(|row| row.mass.is_none()));
    }

    #[test]
    fn json_uses_column_names_and_nulls() {
        let json = table().to_json();
        assert_eq!(json[1]["NORAD_ID"], 1);
        assert!(json[1]["MASS"].is_null());
        assert_eq!(json[0]["MASS"], 2.0);
    }

    #[test]
    fn default_file_name_carries_provenance() {
        let name = table().default_file_name();
        assert!(name.starts_with("discos_catalog_"));
        assert!(name.ends_with(".csv"));
    }

    #[tokio::test]
    async fn saved_table_reloads_with_same_rows() {
        let dir = tempfile::tempdir().expect("temp dir");
        let original = table();

        let path = original.save_csv(Some(dir.path())).await.expect("save");
        let contents = tokio::fs::read_to_string(&path).await.expect("read back");
        assert!(contents.starts_with("NORAD_ID,MASS\n3,2\n1,\n"));

        let reloaded = CatalogTable::read_csv(&path, Provenance::External)
            .await
            .expect("reload");
        assert_eq!(reloaded.columns(), original.columns());
        assert_eq!(reloaded.rows(), original.rows());
        assert_eq!(reloaded.provenance(), Provenance::External);
    }
}
