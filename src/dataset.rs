use crate::records::Row;

use anyhow::{Context, Result, bail};
use std::{io::Read, path::Path};

pub fn read_rows(path: &Path) -> Result<Vec<Row>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening CSV file `{}`", path.display()))?;
    let rows = read_rows_from(file)
        .with_context(|| format!("reading CSV file `{}`", path.display()))?;

    tracing::debug!(path = %path.display(), rows = rows.len(), "loaded dataset");
    Ok(rows)
}

// Short lines are tolerated; their trailing columns are simply absent from the row.
// A line with more fields than the header is rejected.
pub fn read_rows_from<R: Read>(reader: R) -> Result<Vec<Row>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("reading CSV header line")?.clone();

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        // header is line 1
        let record = record.with_context(|| format!("decoding CSV line {}", i + 2))?;
        if record.len() > headers.len() {
            bail!(
                "CSV line {} has {} fields but the header names {}",
                i + 2,
                record.len(),
                headers.len()
            );
        }
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}
