use super::types::Contract;
use anyhow::Context;
use serde_json::Value;
use std::path::Path;

/// Serialisation format of a contract document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractFormat {
    Yaml,
    Json,
}

impl ContractFormat {
    /// Infer the format from a file extension; anything but `.json` is read as YAML.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ContractFormat::Json,
            _ => ContractFormat::Yaml,
        }
    }
}

/// Parse contract text into a JSON value, keeping mapping order.
///
/// YAML goes through `serde_yaml::Value` first so non-string mapping keys
/// (unquoted status codes such as `200:`) become string keys instead of
/// failing the parse.
pub fn parse_document(content: &str, format: ContractFormat) -> anyhow::Result<Value> {
    match format {
        ContractFormat::Json => serde_json::from_str(content).context("parsing JSON contract"),
        ContractFormat::Yaml => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(content).context("parsing YAML contract")?;
            serde_json::to_value(yaml).context("converting YAML contract to JSON")
        }
    }
}

/// Load a contract from in-memory text.
pub fn load_contract_from_str(content: &str, format: ContractFormat) -> anyhow::Result<Contract> {
    let document = parse_document(content, format)?;
    Contract::from_value(&document)
}

/// Load a contract from a YAML (`.yaml`/`.yml`) or JSON file.
///
/// # Example
///
/// ```rust,no_run
/// use oaspath::spec::load_contract;
///
/// let contract = load_contract("openapi.yaml")?;
/// println!("{} templates", contract.template_count());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn load_contract(file_path: impl AsRef<Path>) -> anyhow::Result<Contract> {
    let file_path = file_path.as_ref();
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("reading contract {}", file_path.display()))?;
    load_contract_from_str(&content, ContractFormat::from_path(file_path))
        .with_context(|| format!("loading contract {}", file_path.display()))
}
