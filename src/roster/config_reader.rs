use crate::roster::*;

use serde::{Deserialize, Serialize};
use std::fs;

// ********* Configuration file ***********

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportSettings {
    #[serde(rename = "rowFailurePolicy")]
    pub row_failure_policy: Option<String>,
    #[serde(rename = "nonPersonIndicators")]
    pub non_person_indicators: Option<Vec<String>>,
    #[serde(rename = "placeholderValues")]
    pub placeholder_values: Option<Vec<String>>,
}

impl ImportSettings {
    pub fn row_failure_policy(&self) -> AppResult<RowFailurePolicy> {
        match self.row_failure_policy.as_deref() {
            None | Some("skip") => Ok(RowFailurePolicy::Skip),
            Some("abort") => Ok(RowFailurePolicy::Abort),
            Some(x) => whatever!("unknown row failure policy: {} (expected skip or abort)", x),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(rename = "databasePath")]
    pub database_path: Option<String>,
    #[serde(rename = "mainUser")]
    pub main_user: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    pub import: Option<ImportSettings>,
}

impl RosterConfig {
    /// The import rules, with the defaults for everything the file leaves out.
    pub fn rules(&self) -> AppResult<ImportRules> {
        let defaults = ImportRules::default();
        let settings = self.import.clone().unwrap_or_default();
        let placeholders = match settings.placeholder_values.clone() {
            Some(ps) => ps.iter().map(|p| p.trim().to_lowercase()).collect(),
            None => defaults.placeholders,
        };
        Ok(ImportRules {
            row_failure_policy: settings.row_failure_policy()?,
            non_person_indicators: settings
                .non_person_indicators
                .unwrap_or(defaults.non_person_indicators),
            placeholders,
        })
    }
}

pub fn read_config(path: &str) -> AppResult<RosterConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: RosterConfig =
        serde_json::from_str(&contents).context(ParsingJsonSnafu { path })?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_keys() {
        let js = r#"{
            "databasePath": "/tmp/roster.json",
            "mainUser": "admin",
            "excelWorksheetName": "Sheet2",
            "import": {
                "rowFailurePolicy": "abort",
                "nonPersonIndicators": ["ward"],
                "placeholderValues": [" NA ", "-"]
            }
        }"#;
        let config: RosterConfig = serde_json::from_str(js).unwrap();
        assert_eq!(config.database_path.as_deref(), Some("/tmp/roster.json"));
        assert_eq!(config.main_user.as_deref(), Some("admin"));
        assert_eq!(config.excel_worksheet_name.as_deref(), Some("Sheet2"));

        let rules = config.rules().unwrap();
        assert_eq!(rules.row_failure_policy, RowFailurePolicy::Abort);
        assert_eq!(rules.non_person_indicators, vec!["ward".to_string()]);
        assert_eq!(rules.placeholders, vec!["na".to_string(), "-".to_string()]);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: RosterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.rules().unwrap(), ImportRules::default());
    }

    #[test]
    fn unknown_policy_is_refused() {
        let config = RosterConfig {
            import: Some(ImportSettings {
                row_failure_policy: Some("ignore".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(config.rules().is_err());
    }
}
