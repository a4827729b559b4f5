use csv::StringRecord;

use crate::convert::types::ConvertError;

/// Split a raw CSV payload into rows. The two header layouts have different
/// column counts, so the reader runs in flexible mode and the per-row counts
/// are checked downstream.
pub fn read_rows(bytes: &[u8]) -> Result<Vec<StringRecord>, ConvertError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record.map_err(|err| ConvertError::Format(format!("unreadable CSV row: {err}")))?);
    }
    Ok(rows)
}
