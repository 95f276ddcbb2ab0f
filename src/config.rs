//! 配置模块，负责从JSON文件加载列映射

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::ast::PaymentField;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("配置文件不存在: {}", .0.display())]
    NotFound(PathBuf),

    #[error("无法读取配置文件 {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("无法解析JSON配置文件 {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// 支付字段到存储列表达式的映射
///
/// 默认值对应 SQLite 布局：支付文档以 JSON 形式保存在 `data` 列中。
/// 配置文件中缺少的键保持默认值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub table: String,
    pub id: String,
    pub version: String,
    pub organisation_id: String,
    #[serde(rename = "type")]
    pub payment_type: String,
    pub amount: String,
    pub data: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            table: "payments".to_string(),
            id: "id".to_string(),
            version: "version".to_string(),
            organisation_id: "organisation_id".to_string(),
            payment_type: "json_extract(data, '$.type')".to_string(),
            amount: "json_extract(data, '$.amount')".to_string(),
            data: "data".to_string(),
        }
    }
}

impl ColumnMapping {
    /// 从JSON文件加载列映射
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mapping = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "loaded column mapping");
        Ok(mapping)
    }

    /// 从 `path` 加载列映射，失败时使用默认配置
    pub fn from_json_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_json_file(path).unwrap_or_else(|e| {
            debug!(error = %e, "using default column mapping");
            Self::default()
        })
    }

    /// 可过滤支付字段对应的列表达式
    pub fn column(&self, field: PaymentField) -> &str {
        match field {
            PaymentField::Id => &self.id,
            PaymentField::Type => &self.payment_type,
            PaymentField::Amount => &self.amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_valid_json_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{
            "table": "pymts",
            "amount": "amount_cents"
        }}"#
        )
        .unwrap();

        let mapping = ColumnMapping::from_json_file(file.path()).unwrap();
        assert_eq!(mapping.table, "pymts");
        assert_eq!(mapping.column(PaymentField::Amount), "amount_cents");
        assert_eq!(mapping.column(PaymentField::Id), "id");
        assert_eq!(
            mapping.column(PaymentField::Type),
            "json_extract(data, '$.type')"
        );
    }

    #[test]
    fn test_type_key_is_renamed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"type": "kind"}}"#).unwrap();

        let mapping = ColumnMapping::from_json_file(file.path()).unwrap();
        assert_eq!(mapping.payment_type, "kind");
    }

    #[test]
    fn test_invalid_json_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "invalid json").unwrap();

        let result = ColumnMapping::from_json_file(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("non_existent_file.json");

        let result = ColumnMapping::from_json_file(&path);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
        assert_eq!(
            ColumnMapping::from_json_file_or_default(&path),
            ColumnMapping::default()
        );
    }
}
