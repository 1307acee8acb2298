use clap::Parser;
use miette::{IntoDiagnostic, Result};
use payhub::application::loader::{FailurePolicy, ModuleLoader};
use payhub::application::registry::GatewayRegistry;
use payhub::domain::gateway::{GatewayAdapterBox, GatewayConfig};
use payhub::domain::ports::{ModuleSource, ModuleSourceBox};
use payhub::infrastructure::csv_file::CsvModuleSource;
use payhub::infrastructure::fs::FsConfigSource;
use payhub::infrastructure::stub::StubGateway;
use payhub::interfaces::csv::module_writer::ModuleWriter;
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Module table CSV file (id,type,enabled,installed,load_order,provider,folder,code,notes)
    modules: PathBuf,

    /// Directory holding the module folders and their `config/` directories
    #[arg(long, env = "PAYHUB_MODULES_ROOT", default_value = ".")]
    modules_root: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Keep loading the remaining modules after one fails
    #[arg(long)]
    isolate_failures: bool,

    /// Print the registered webhook events instead of the module table
    #[arg(long)]
    events: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let csv_source = CsvModuleSource::open(&cli.modules).into_diagnostic()?;
    let modules: ModuleSourceBox = match cli.db_path {
        Some(db_path) => open_persistent(db_path, csv_source).await?,
        None => Box::new(csv_source),
    };

    let policy = if cli.isolate_failures {
        FailurePolicy::IsolateModule
    } else {
        FailurePolicy::HaltRemaining
    };

    let loader = ModuleLoader::new(modules, Box::new(FsConfigSource::new(&cli.modules_root)))
        .with_policy(policy);

    // Gateways without a native integration get the in-process stub adapter.
    let gateways = GatewayRegistry::new().with_fallback(Box::new(
        |gateway: &str, config: GatewayConfig| {
            Ok(Box::new(StubGateway::new(gateway, config)) as GatewayAdapterBox)
        },
    ));

    let (runtime, report) = loader.load_all(gateways).await.into_diagnostic()?;
    info!(
        gateways = ?runtime.gateways.names(),
        loaded = ?report.loaded(),
        disabled = report.disabled().len(),
        "startup complete"
    );

    let stdout = io::stdout();
    if cli.events {
        let mut writer = csv::Writer::from_writer(stdout.lock());
        writer.write_record(["event", "handler"]).into_diagnostic()?;
        for (key, handler) in runtime.webhooks.entries() {
            writer
                .write_record([key.to_string(), handler.to_string()])
                .into_diagnostic()?;
        }
        writer.flush().into_diagnostic()?;
    } else {
        let all = loader.modules().all().await.into_diagnostic()?;
        let mut writer = ModuleWriter::new(stdout.lock());
        writer.write_modules(all).into_diagnostic()?;
    }

    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
async fn open_persistent(db_path: PathBuf, seed: CsvModuleSource) -> Result<ModuleSourceBox> {
    use payhub::infrastructure::rocksdb::RocksDBStore;
    use std::collections::HashSet;

    let store = RocksDBStore::open(db_path).into_diagnostic()?;

    // Records already in the database win over the CSV seed.
    let known: HashSet<u32> = ModuleSource::all(&store)
        .await
        .into_diagnostic()?
        .into_iter()
        .map(|m| m.id)
        .collect();
    for module in seed.all().await.into_diagnostic()? {
        if !known.contains(&module.id) {
            store.save(module).await.into_diagnostic()?;
        }
    }

    Ok(Box::new(store))
}

#[cfg(not(feature = "storage-rocksdb"))]
async fn open_persistent(_db_path: PathBuf, seed: CsvModuleSource) -> Result<ModuleSourceBox> {
    tracing::warn!(
        "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to the CSV module table."
    );
    Ok(Box::new(seed))
}
