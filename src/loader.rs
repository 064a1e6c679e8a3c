//! CSV loading for record collections and known links
//!
//! Both file kinds are header-less. A record file carries the key in its
//! first column followed by one column per named field; a links file has
//! exactly two columns, (left key, right key).

use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::linkage::{LinkageError, LinkageResult};
use crate::models::{KnownLink, Record, RecordSet};

/// Load a record collection from a CSV file
pub fn load_records(path: &Path, name: &str, columns: &[String]) -> LinkageResult<RecordSet> {
    let file = std::fs::File::open(path)?;
    let set = read_records(file, name, columns)?;
    debug!("Loaded {} records from {}", set.len(), path.display());
    Ok(set)
}

/// Read a record collection from any CSV source
pub fn read_records<R: Read>(input: R, name: &str, columns: &[String]) -> LinkageResult<RecordSet> {
    let expected = columns.len() + 1;
    let mut records = Vec::new();

    for fields in rows(input, name, expected)? {
        let mut fields = fields.into_iter();
        let key = fields.next().unwrap_or_default();
        records.push(Record::new(key, fields.collect()));
    }

    Ok(RecordSet::new(name, columns.to_vec(), records))
}

/// Load known links from a two-column CSV file
pub fn load_links(path: &Path) -> LinkageResult<Vec<KnownLink>> {
    let file = std::fs::File::open(path)?;
    let links = read_links(file, &path.display().to_string())?;
    debug!("Loaded {} known links from {}", links.len(), path.display());
    Ok(links)
}

/// Read known links from any CSV source
pub fn read_links<R: Read>(input: R, name: &str) -> LinkageResult<Vec<KnownLink>> {
    Ok(rows(input, name, 2)?
        .into_iter()
        .map(|mut fields| {
            let right = fields.pop().unwrap_or_default();
            let left = fields.pop().unwrap_or_default();
            KnownLink::new(left, right)
        })
        .collect())
}

/// Parse every row, requiring exactly `expected` columns
fn rows<R: Read>(input: R, name: &str, expected: usize) -> LinkageResult<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let mut out = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() != expected {
            return Err(LinkageError::MalformedRow {
                source_name: name.to_string(),
                row: index + 1,
                expected,
                found: record.len(),
            });
        }
        out.push(record.iter().map(str::to_string).collect());
    }
    Ok(out)
}
