use crate::domain::module::GatewayModule;
use crate::domain::ports::ModuleSource;
use crate::error::Result;
use crate::infrastructure::in_memory::InMemoryModuleSource;
use crate::interfaces::csv::module_reader::{ModuleReader, ModuleRow};
use crate::interfaces::csv::module_writer::ModuleWriter;
use async_trait::async_trait;
use csv::StringRecord;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Module table backed by a CSV file.
///
/// The file is read once when opened. Every save rewrites the whole file so a
/// disabled module and its note survive a restart. Rows that could not be
/// parsed are written back unchanged after the parsed ones.
#[derive(Clone)]
pub struct CsvModuleSource {
    path: PathBuf,
    modules: InMemoryModuleSource,
    unparsed: Vec<StringRecord>,
}

impl CsvModuleSource {
    /// Opens the module table at `path`.
    ///
    /// Malformed rows are not loaded and a warning is logged, but they are
    /// kept for the next rewrite.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;

        let mut modules = Vec::new();
        let mut unparsed = Vec::new();
        for row in ModuleReader::new(file).rows()? {
            match row? {
                ModuleRow::Parsed(module) => modules.push(module),
                ModuleRow::Unparsed { record, error } => {
                    warn!(
                        path = %path.display(),
                        line = record.position().map(|p| p.line()),
                        %error,
                        "skipping malformed module record"
                    );
                    unparsed.push(record);
                }
            }
        }

        Ok(Self {
            path,
            modules: InMemoryModuleSource::with_modules(modules),
            unparsed,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn rewrite(&self, modules: Vec<GatewayModule>) -> Result<()> {
        let file = File::create(&self.path)?;
        ModuleWriter::new(file).write_table(modules, &self.unparsed)
    }
}

#[async_trait]
impl ModuleSource for CsvModuleSource {
    async fn payment_modules(&self) -> Result<Vec<GatewayModule>> {
        self.modules.payment_modules().await
    }

    async fn save(&self, module: GatewayModule) -> Result<()> {
        self.modules.save(module).await?;
        let all = self.modules.all().await?;
        self.rewrite(all)
    }

    async fn all(&self) -> Result<Vec<GatewayModule>> {
        self.modules.all().await
    }
}
