use crate::domain::module::GatewayModule;
use crate::error::Result;
use csv::StringRecord;
use std::io::Write;

/// Column order of the module table.
pub const MODULE_COLUMNS: [&str; 9] = [
    "id",
    "type",
    "enabled",
    "installed",
    "load_order",
    "provider",
    "folder",
    "code",
    "notes",
];

/// Writes module records as CSV, header first.
pub struct ModuleWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ModuleWriter<W> {
    pub fn new(sink: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(sink);
        Self { writer }
    }

    pub fn write_modules<I>(&mut self, modules: I) -> Result<()>
    where
        I: IntoIterator<Item = GatewayModule>,
    {
        self.write_table(modules, &[])
    }

    /// Writes the header, every module, then `raw` rows exactly as they were read.
    pub fn write_table<I>(&mut self, modules: I, raw: &[StringRecord]) -> Result<()>
    where
        I: IntoIterator<Item = GatewayModule>,
    {
        self.writer.write_record(MODULE_COLUMNS)?;
        for module in modules {
            self.writer.serialize(module)?;
        }
        for record in raw {
            self.writer.write_record(record)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::csv::module_reader::ModuleReader;

    #[test]
    fn test_written_modules_read_back() {
        let mut failed = GatewayModule::payment(2, "paypal", 1).with_provider("PayPalProvider");
        failed.disable("config directory missing, \"PayPal/config\"");
        let modules = vec![GatewayModule::payment(1, "stripe", 2), failed];

        let mut buffer = Vec::new();
        ModuleWriter::new(&mut buffer)
            .write_modules(modules.clone())
            .unwrap();

        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(
            text.starts_with("id,type,enabled,installed,load_order,provider,folder,code,notes\n")
        );
        assert!(text.contains("1,payment,true,true,2,,stripe,stripe,\n"));

        let read: Vec<GatewayModule> = ModuleReader::new(buffer.as_slice())
            .modules()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(read, modules);
    }

    #[test]
    fn test_raw_rows_follow_modules() {
        let raw = vec![StringRecord::from(vec![
            "7", "payment", "maybe", "1", "3", "", "Other", "other", "",
        ])];

        let mut buffer = Vec::new();
        ModuleWriter::new(&mut buffer)
            .write_table(vec![GatewayModule::payment(1, "stripe", 1)], &raw)
            .unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "1,payment,true,true,1,,stripe,stripe,");
        assert_eq!(lines[2], "7,payment,maybe,1,3,,Other,other,");
    }

    #[test]
    fn test_header_written_without_rows() {
        let mut buffer = Vec::new();
        ModuleWriter::new(&mut buffer).write_modules(Vec::new()).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            format!("{}\n", MODULE_COLUMNS.join(","))
        );
    }
}
