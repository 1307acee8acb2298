use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const PAYMENT_MODULE_TYPE: &str = "payment";

/// A persisted module record.
///
/// Payment modules each bundle one or more gateway configurations. The record is
/// read once at startup and only written back when loading fails.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct GatewayModule {
    pub id: u32,
    pub r#type: String,
    #[serde(serialize_with = "serialize_flag", deserialize_with = "deserialize_flag")]
    pub enabled: bool,
    #[serde(serialize_with = "serialize_flag", deserialize_with = "deserialize_flag")]
    pub installed: bool,
    pub load_order: i32,
    /// Name of the initialization hook the module declares, if any.
    pub provider: Option<String>,
    /// Folder holding the module's `config/` directory.
    pub folder: String,
    pub code: String,
    pub notes: Option<String>,
}

fn serialize_flag<S>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_bool(*flag)
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    let raw = match Flag::deserialize(deserializer)? {
        Flag::Bool(flag) => return Ok(flag),
        Flag::Int(value) => value.to_string(),
        Flag::Text(text) => text,
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid boolean flag `{other}`"
        ))),
    }
}

impl GatewayModule {
    pub fn payment(id: u32, code: impl Into<String>, load_order: i32) -> Self {
        let code = code.into();
        Self {
            id,
            r#type: PAYMENT_MODULE_TYPE.to_string(),
            enabled: true,
            installed: true,
            load_order,
            provider: None,
            folder: code.clone(),
            code,
            notes: None,
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    pub fn is_loadable_payment(&self) -> bool {
        self.enabled && self.installed && self.r#type == PAYMENT_MODULE_TYPE
    }

    /// Disables the module and records why.
    pub fn disable(&mut self, reason: impl Into<String>) {
        self.enabled = false;
        self.notes = Some(reason.into());
    }
}

/// Load lifecycle of a module within one process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModuleState {
    /// Installed and enabled, not reached yet.
    #[default]
    Pending,
    Loading,
    Loaded,
    Disabled { reason: String },
}

impl ModuleState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ModuleState::Loaded | ModuleState::Disabled { .. })
    }
}
