use serde::{Deserialize, Serialize};

/// What to do when two records share a join key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Use the first record in table order; later ones are reported only.
    #[default]
    #[serde(alias = "first")]
    FirstMatch,
    /// Fail with `EnrichError::DuplicateKey`.
    Error,
}

impl std::fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FirstMatch => write!(f, "first_match"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Field names and defaults for one enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichOptions {
    /// Feature property holding the region name.
    pub join_key_field: String,
    /// Table column holding the region name; `join_key_field` when unset.
    #[serde(default)]
    pub table_key_field: Option<String>,
    /// Table column holding the numeric value.
    pub value_field: String,
    /// Property written into each feature; `value_field` when unset.
    #[serde(default)]
    pub target_field: Option<String>,
    #[serde(default)]
    pub default_value: f64,
    #[serde(default)]
    pub on_duplicate: DuplicatePolicy,
}

impl EnrichOptions {
    pub fn new(join_key_field: impl Into<String>, value_field: impl Into<String>) -> Self {
        Self {
            join_key_field: join_key_field.into(),
            table_key_field: None,
            value_field: value_field.into(),
            target_field: None,
            default_value: 0.0,
            on_duplicate: DuplicatePolicy::FirstMatch,
        }
    }

    pub fn table_key(mut self, column: impl Into<String>) -> Self {
        self.table_key_field = Some(column.into());
        self
    }

    pub fn target(mut self, property: impl Into<String>) -> Self {
        self.target_field = Some(property.into());
        self
    }

    pub fn default_value(mut self, value: f64) -> Self {
        self.default_value = value;
        self
    }

    pub fn on_duplicate(mut self, policy: DuplicatePolicy) -> Self {
        self.on_duplicate = policy;
        self
    }

    pub fn effective_table_key(&self) -> &str {
        self.table_key_field.as_deref().unwrap_or(&self.join_key_field)
    }

    pub fn effective_target(&self) -> &str {
        self.target_field.as_deref().unwrap_or(&self.value_field)
    }
}
