use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::info;

use crate::utils::AppError;

/// A named fault and the keywords that identify it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultSignature {
    pub label: String,
    /// Stored lowercase
    pub keywords: Vec<String>,
}

impl FaultSignature {
    pub fn new<L, K, I>(label: L, keywords: I) -> Self
    where
        L: Into<String>,
        K: AsRef<str>,
        I: IntoIterator<Item = K>,
    {
        Self {
            label: label.into(),
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
        }
    }
}

/// Read-only table of known fault signatures, kept in insertion order
#[derive(Debug, Clone, Default)]
pub struct SignatureTable {
    signatures: Vec<FaultSignature>,
}

impl SignatureTable {
    pub fn new(signatures: Vec<FaultSignature>) -> Self {
        Self { signatures }
    }

    /// Historical faults shipped with the binary
    pub fn builtin() -> Self {
        Self::new(vec![
            FaultSignature::new(
                "Redis连接池耗尽",
                ["redis connection pool exhausted", "redis pool full"],
            ),
            FaultSignature::new(
                "数据库连接超时",
                ["database connection timeout", "db connect timed out"],
            ),
            FaultSignature::new(
                "2024年10月28日 网络连接异常历史故障匹配验证",
                ["网络连接异常", "故障根因：专线丢包，交换机版本bug"],
            ),
        ])
    }

    /// Parse `{"label": ["keyword", ...], ...}`; key order becomes table order
    pub fn from_json_str(raw: &str) -> Result<Self, AppError> {
        let object: Map<String, Value> = serde_json::from_str(raw)
            .map_err(|e| AppError::internal_error(format!("invalid signature table: {}", e)))?;

        let mut signatures = Vec::with_capacity(object.len());
        for (label, keywords) in object {
            let keywords: Vec<String> = serde_json::from_value(keywords).map_err(|e| {
                AppError::internal_error(format!(
                    "signature '{}' must map to a list of strings: {}",
                    label, e
                ))
            })?;
            signatures.push(FaultSignature::new(label, keywords));
        }
        Ok(Self::new(signatures))
    }

    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AppError::internal_error(format!(
                "cannot read signature table {}: {}",
                path.display(),
                e
            ))
        })?;
        let table = Self::from_json_str(&raw)?;
        info!(path = %path.display(), signatures = table.len(), "Loaded signature table");
        Ok(table)
    }

    /// Load from `path` when given, otherwise fall back to the builtin table
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &FaultSignature> {
        self.signatures.iter()
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn should_lowercase_keywords() {
        let signature = FaultSignature::new("Disk", ["No Space Left", "ENOSPC"]);

        assert_eq!(signature.keywords, vec!["no space left", "enospc"]);
    }

    #[test]
    fn should_ship_three_builtin_signatures() {
        let table = SignatureTable::builtin();

        assert_eq!(table.len(), 3);
        assert_eq!(table.iter().next().unwrap().label, "Redis连接池耗尽");
    }

    #[test]
    fn should_keep_json_key_order() {
        // Arrange
        let raw = r#"{"zeta": ["z"], "alpha": ["A", "b"], "mid": []}"#;

        // Act
        let table = SignatureTable::from_json_str(raw).unwrap();

        // Assert
        let labels: Vec<&str> = table.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["zeta", "alpha", "mid"]);
        assert_eq!(table.iter().nth(1).unwrap().keywords, vec!["a", "b"]);
    }

    #[test]
    fn should_reject_non_list_keywords() {
        let result = SignatureTable::from_json_str(r#"{"bad": "not a list"}"#);

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn should_load_table_from_file() {
        // Arrange
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Kafka lag": ["consumer lag"]}}"#).unwrap();

        // Act
        let table = SignatureTable::load(Some(file.path())).unwrap();

        // Assert
        assert_eq!(table.len(), 1);
        assert_eq!(table.iter().next().unwrap().label, "Kafka lag");
    }

    #[test]
    fn should_fall_back_to_builtin_without_path() {
        let table = SignatureTable::load(None).unwrap();

        assert_eq!(table.len(), SignatureTable::builtin().len());
    }

    #[test]
    fn should_fail_on_missing_file() {
        let result = SignatureTable::load(Some(Path::new("/nonexistent/signatures.json")));

        assert!(result.is_err());
    }
}
