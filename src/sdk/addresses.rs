use crate::sdk::routing::RoutingError;
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::io::Read;

/// One CSV row. Columns other than `address` are ignored.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AddressRecord {
    pub address: String,
}

/// Reads address records from a CSV with a header row.
///
/// The whole file is rejected on the first malformed record so callers never
/// act on a partial upload.
pub fn read_addresses<R: Read>(reader: R) -> Result<Vec<AddressRecord>, RoutingError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let has_address = rdr.headers()?.iter().any(|h| h == "address");
    if !has_address {
        return Err(RoutingError::MissingAddressColumn);
    }

    let mut records = Vec::new();
    for result in rdr.deserialize::<AddressRecord>() {
        records.push(result?);
    }
    Ok(records)
}
