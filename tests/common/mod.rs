#![allow(dead_code)]

pub mod temp_files {
    use std::io::Write;
    use std::path::PathBuf;

    /// Write `content` to a persisted temp file named `oaspath_test_*.{ext}`.
    ///
    /// The file outlives the handle so loaders and watchers can reopen it;
    /// remove it with [`cleanup_temp_files`].
    pub fn create_temp_contract(content: &str, ext: &str) -> PathBuf {
        let mut file = tempfile::Builder::new()
            .prefix("oaspath_test_")
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        let (_, path) = file.keep().unwrap();
        path
    }

    pub fn create_temp_yaml(content: &str) -> PathBuf {
        create_temp_contract(content, "yaml")
    }

    pub fn create_temp_json(content: &str) -> PathBuf {
        create_temp_contract(content, "json")
    }

    pub fn cleanup_temp_files(paths: &[PathBuf]) {
        for path in paths {
            let _ = std::fs::remove_file(path);
        }
    }
}

pub mod contracts {
    use oaspath::router::PathResolver;
    use oaspath::spec::{load_contract_from_str, ContractFormat};
    use std::sync::Arc;

    /// Build a resolver straight from YAML text.
    pub fn resolver_from_yaml(yaml: &str) -> PathResolver {
        let contract = load_contract_from_str(yaml, ContractFormat::Yaml).unwrap();
        PathResolver::new(Arc::new(contract)).unwrap()
    }

    /// Wrap `paths` (already indented by two spaces) in a minimal document.
    pub fn document(servers: &[&str], paths: &str) -> String {
        let mut doc = String::from("openapi: 3.1.0\ninfo:\n  title: Test\n  version: '1.0'\n");
        if !servers.is_empty() {
            doc.push_str("servers:\n");
            for url in servers {
                doc.push_str(&format!("  - url: '{url}'\n"));
            }
        }
        doc.push_str("paths:\n");
        doc.push_str(paths);
        doc
    }
}
