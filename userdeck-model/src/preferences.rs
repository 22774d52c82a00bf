//! Per-view grid preferences, persisted independently of server data.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Density {
    Compact,
    Standard,
    #[default]
    Comfortable,
}

impl Density {
    pub fn as_str(&self) -> &'static str {
        match self {
            Density::Compact => "compact",
            Density::Standard => "standard",
            Density::Comfortable => "comfortable",
        }
    }
}

impl fmt::Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Density {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compact" => Ok(Density::Compact),
            "standard" => Ok(Density::Standard),
            "comfortable" => Ok(Density::Comfortable),
            other => Err(ModelError::InvalidDensity(other.to_string())),
        }
    }
}

/// One entry of the ordered sort model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SortSpec {
    pub field: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub desc: bool,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            desc: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            desc: true,
        }
    }
}

/// Column visibility, sort model and density for one grid view.
///
/// The default is `{columnVisibility:{}, sorting:[], density:'comfortable'}`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct ViewPreferences {
    pub column_visibility: BTreeMap<String, bool>,
    pub sorting: Vec<SortSpec>,
    pub density: Density,
}

impl ViewPreferences {
    /// Columns are visible unless explicitly hidden.
    pub fn is_column_visible(&self, field: &str) -> bool {
        self.column_visibility.get(field).copied().unwrap_or(true)
    }

    pub fn set_column_visible(&mut self, field: impl Into<String>, visible: bool) {
        self.column_visibility.insert(field.into(), visible);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_columns_are_visible() {
        let mut prefs = ViewPreferences::default();
        assert!(prefs.is_column_visible("email"));
        prefs.set_column_visible("email", false);
        assert!(!prefs.is_column_visible("email"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn default_serializes_to_documented_shape() {
        let json = serde_json::to_value(ViewPreferences::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "columnVisibility": {},
                "sorting": [],
                "density": "comfortable"
            })
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_documents_fill_in_defaults() {
        let prefs: ViewPreferences =
            serde_json::from_str(r#"{"density":"compact"}"#).unwrap();
        assert_eq!(prefs.density, Density::Compact);
        assert!(prefs.sorting.is_empty());
    }
}
