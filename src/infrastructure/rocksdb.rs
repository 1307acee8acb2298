use crate::domain::module::GatewayModule;
use crate::domain::ports::{ModuleSource, RemoteProductStore};
use crate::error::{HubError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing module records.
pub const CF_MODULES: &str = "modules";
/// Column Family for storing product remote identifiers.
pub const CF_REMOTE_PRODUCTS: &str = "remote_products";

/// A persistent store implementation using RocksDB.
///
/// Handles storage for both module records and product remote identifiers
/// using separate Column Families.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_modules = ColumnFamilyDescriptor::new(CF_MODULES, Options::default());
        let cf_remote = ColumnFamilyDescriptor::new(CF_REMOTE_PRODUCTS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_modules, cf_remote])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn missing_cf(name: &str) -> HubError {
        HubError::InternalError(Box::new(std::io::Error::other(format!(
            "{name} column family not found"
        ))))
    }

    fn decode_error(e: serde_json::Error) -> HubError {
        HubError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Deserialization error: {}", e),
        )))
    }

    fn remote_key(product_id: u64, gateway: &str) -> Vec<u8> {
        let mut key = product_id.to_be_bytes().to_vec();
        key.extend_from_slice(gateway.as_bytes());
        key
    }
}

#[async_trait]
impl ModuleSource for RocksDBStore {
    async fn payment_modules(&self) -> Result<Vec<GatewayModule>> {
        let mut modules: Vec<GatewayModule> = ModuleSource::all(self)
            .await?
            .into_iter()
            .filter(|m| m.is_loadable_payment())
            .collect();
        modules.sort_by_key(|m| m.load_order);
        Ok(modules)
    }

    async fn save(&self, module: GatewayModule) -> Result<()> {
        let cf = self
            .db
            .cf_handle(CF_MODULES)
            .ok_or_else(|| Self::missing_cf(CF_MODULES))?;

        let key = module.id.to_be_bytes();
        let value = serde_json::to_vec(&module)?;
        self.db.put_cf(&cf, key, value)?;

        Ok(())
    }

    /// Module records ordered by id.
    async fn all(&self) -> Result<Vec<GatewayModule>> {
        let cf = self
            .db
            .cf_handle(CF_MODULES)
            .ok_or_else(|| Self::missing_cf(CF_MODULES))?;

        let mut modules = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_key, value) = item?;
            modules.push(serde_json::from_slice(&value).map_err(Self::decode_error)?);
        }
        Ok(modules)
    }
}

#[async_trait]
impl RemoteProductStore for RocksDBStore {
    async fn store(&self, product_id: u64, gateway: &str, remote_id: &str) -> Result<()> {
        let cf = self
            .db
            .cf_handle(CF_REMOTE_PRODUCTS)
            .ok_or_else(|| Self::missing_cf(CF_REMOTE_PRODUCTS))?;

        self.db
            .put_cf(&cf, Self::remote_key(product_id, gateway), remote_id.as_bytes())?;
        Ok(())
    }

    async fn get(&self, product_id: u64, gateway: &str) -> Result<Option<String>> {
        let cf = self
            .db
            .cf_handle(CF_REMOTE_PRODUCTS)
            .ok_or_else(|| Self::missing_cf(CF_REMOTE_PRODUCTS))?;

        let result = self.db.get_cf(&cf, Self::remote_key(product_id, gateway))?;
        Ok(result.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    async fn all_for(&self, product_id: u64) -> Result<BTreeMap<String, String>> {
        let cf = self
            .db
            .cf_handle(CF_REMOTE_PRODUCTS)
            .ok_or_else(|| Self::missing_cf(CF_REMOTE_PRODUCTS))?;

        let prefix = product_id.to_be_bytes();
        let mut ids = BTreeMap::new();
        for item in self.db.prefix_iterator_cf(&cf, prefix) {
            let (key, value) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            let gateway = String::from_utf8_lossy(&key[prefix.len()..]).into_owned();
            ids.insert(gateway, String::from_utf8_lossy(&value).into_owned());
        }
        Ok(ids)
    }
}
