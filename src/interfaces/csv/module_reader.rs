use crate::domain::module::GatewayModule;
use crate::error::{HubError, Result};
use csv::StringRecord;
use std::io::Read;

/// One data row of the module table.
#[derive(Debug)]
pub enum ModuleRow {
    Parsed(GatewayModule),
    /// A row that does not deserialize, kept verbatim so it can be written back.
    Unparsed { record: StringRecord, error: HubError },
}

/// Reads module records from a CSV source.
///
/// Expects the header `id,type,enabled,installed,load_order,provider,folder,code,notes`.
/// Whitespace around fields is trimmed; empty `provider`/`notes` read as none.
pub struct ModuleReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ModuleReader<R> {
    /// Creates a new `ModuleReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes module records.
    pub fn modules(self) -> impl Iterator<Item = Result<GatewayModule>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(HubError::from))
    }

    /// Like [`modules`](Self::modules), but rows that fail to deserialize are
    /// returned with their raw fields instead of only an error.
    ///
    /// Only I/O failures and an unreadable header are returned as errors.
    pub fn rows(mut self) -> Result<impl Iterator<Item = Result<ModuleRow>>> {
        let headers = self.reader.headers()?.clone();
        Ok(self.reader.into_records().map(move |result| {
            let record = result?;
            Ok(match record.deserialize::<GatewayModule>(Some(&headers)) {
                Ok(module) => ModuleRow::Parsed(module),
                Err(e) => ModuleRow::Unparsed {
                    record,
                    error: e.into(),
                },
            })
        }))
    }
}
