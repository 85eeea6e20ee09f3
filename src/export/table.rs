//! Abundance table export.

use crate::data::AbundanceTable;
use crate::error::Result;
use log::info;
use std::path::Path;

/// Write the table to a CSV file with a `name` index column.
pub fn export_table_csv<P: AsRef<Path>>(table: &AbundanceTable, path: P) -> Result<()> {
    let path = path.as_ref();
    info!(
        "Writing {} samples x {} taxa to {}",
        table.n_samples(),
        table.n_taxa(),
        path.display()
    );
    table.to_csv(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;
    use tempfile::TempDir;

    #[test]
    fn test_export_table_csv() {
        let data = DMatrix::from_row_slice(2, 2, &[0.25, 0.75, 1.0, 0.0]);
        let table = AbundanceTable::new(
            data,
            vec!["S1".into(), "S2".into()],
            vec!["Tobamovirus".into(), "Norovirus GII".into()],
        )
        .unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        export_table_csv(&table, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["name,Tobamovirus,Norovirus GII", "S1,0.25,0.75", "S2,1,0"]);
    }
}
