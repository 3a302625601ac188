//! Catalog parsing from YAML/JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::schema::validate_catalog_schema;
use crate::types::CriterionRequest;

/// Errors that can occur when loading or querying a catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Catalog does not match schema: {}", .0.join("; "))]
    SchemaViolation(Vec<String>),

    #[error("Catalog validation failed: {0}")]
    ValidationError(String),

    #[error("Unknown criterion: {0}")]
    UnknownCriterion(String),
}

/// One evaluation dimension offered to users.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CriterionDefinition {
    /// Stable identifier (e.g., "criteria_66")
    pub key: String,

    /// Name shown to users and to the LLM
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The set of criteria users can select from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriteriaCatalog {
    /// Version of this catalog (semver)
    pub catalog_version: String,

    /// Human-readable name
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    pub criteria: Vec<CriterionDefinition>,
}

impl CriteriaCatalog {
    /// Parse a catalog from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let value: serde_json::Value = serde_yaml::from_str(yaml)?;
        Self::from_value(value)
    }

    /// Parse a catalog from JSON string.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse a catalog from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse a catalog from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    fn from_value(value: serde_json::Value) -> Result<Self, CatalogError> {
        validate_catalog_schema(&value).map_err(CatalogError::SchemaViolation)?;
        let catalog: CriteriaCatalog = serde_json::from_value(value)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Checks the schema cannot express.
    fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for criterion in &self.criteria {
            if criterion.name.trim().is_empty() {
                return Err(CatalogError::ValidationError(format!(
                    "Criterion {} has a blank name",
                    criterion.key
                )));
            }
            if !seen.insert(criterion.key.as_str()) {
                return Err(CatalogError::ValidationError(format!(
                    "Duplicate criterion key: {}",
                    criterion.key
                )));
            }
        }
        Ok(())
    }

    /// Look up a criterion by key.
    pub fn get(&self, key: &str) -> Option<&CriterionDefinition> {
        self.criteria.iter().find(|c| c.key == key)
    }

    /// Build the ordered request list for a user's selection.
    ///
    /// Requests are numbered 1..N in selection order, matching how the
    /// prompt enumerates them. Repeated keys produce repeated requests.
    pub fn requests_for<S: AsRef<str>>(
        &self,
        selected: &[S],
    ) -> Result<Vec<CriterionRequest>, CatalogError> {
        selected
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let key = key.as_ref();
                let definition = self
                    .get(key)
                    .ok_or_else(|| CatalogError::UnknownCriterion(key.to_string()))?;
                Ok(request_from(definition, i))
            })
            .collect()
    }

    /// Requests for every criterion in catalog order.
    pub fn all_requests(&self) -> Vec<CriterionRequest> {
        self.criteria
            .iter()
            .enumerate()
            .map(|(i, definition)| request_from(definition, i))
            .collect()
    }
}

fn request_from(definition: &CriterionDefinition, position: usize) -> CriterionRequest {
    let request = CriterionRequest::new(definition.key.clone(), definition.name.clone());
    match u32::try_from(position + 1) {
        Ok(number) => request.with_number(number),
        Err(_) => request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
catalog_version: "1.0"
name: "Catálogo Padrão"
criteria:
  - key: criteria_1
    name: "Legibilidade"
  - key: criteria_2
    name: "Tratamento de Erros"
  - key: criteria_66
    name: "Princípios SOLID"
    description: "SRP, OCP, LSP, ISP e DIP"
"#;

    #[test]
    fn test_parse_valid_catalog() {
        let catalog = CriteriaCatalog::from_yaml(CATALOG).unwrap();
        assert_eq!(catalog.name, "Catálogo Padrão");
        assert_eq!(catalog.criteria.len(), 3);
        assert_eq!(
            catalog.get("criteria_66").and_then(|c| c.description.as_deref()),
            Some("SRP, OCP, LSP, ISP e DIP")
        );
    }

    #[test]
    fn test_requests_follow_selection_order() {
        let catalog = CriteriaCatalog::from_yaml(CATALOG).unwrap();
        let requests = catalog.requests_for(&["criteria_66", "criteria_1"]).unwrap();

        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].key, "criteria_66");
        assert_eq!(requests[0].number, Some(1));
        assert_eq!(requests[1].name, "Legibilidade");
        assert_eq!(requests[1].number, Some(2));
    }

    #[test]
    fn test_repeated_selection_kept() {
        let catalog = CriteriaCatalog::from_yaml(CATALOG).unwrap();
        let requests = catalog.requests_for(&["criteria_1", "criteria_1"]).unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].key, requests[1].key);
    }

    #[test]
    fn test_unknown_selection() {
        let catalog = CriteriaCatalog::from_yaml(CATALOG).unwrap();
        let result = catalog.requests_for(&["criteria_999"]);
        assert!(matches!(result, Err(CatalogError::UnknownCriterion(k)) if k == "criteria_999"));
    }

    #[test]
    fn test_all_requests() {
        let catalog = CriteriaCatalog::from_yaml(CATALOG).unwrap();
        let numbers: Vec<Option<u32>> = catalog.all_requests().iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let yaml = r#"
catalog_version: "1.0"
name: "Duplicado"
criteria:
  - key: criteria_1
    name: "Legibilidade"
  - key: criteria_1
    name: "Outro"
"#;
        let result = CriteriaCatalog::from_yaml(yaml);
        assert!(matches!(result, Err(CatalogError::ValidationError(_))));
    }

    #[test]
    fn test_blank_name_rejected() {
        let json = r#"{"catalog_version": "1.0", "name": "X", "criteria": [{"key": "a", "name": "   "}]}"#;
        let result = CriteriaCatalog::from_json(json);
        assert!(matches!(result, Err(CatalogError::ValidationError(_))));
    }

    #[test]
    fn test_schema_violation() {
        let json = r#"{"catalog_version": "1.0", "name": "X", "criteria": []}"#;
        let result = CriteriaCatalog::from_json(json);
        assert!(matches!(result, Err(CatalogError::SchemaViolation(_))));
    }
}
