/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Analysis service settings.
//! Desktop: optional TOML file, then `STAMP_ANALYZER_*` environment overrides.
//! Web: `?endpoint=...&user=...` on the page URL.

use serde::Deserialize;

use crate::error::AnalyzerError;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/api/stamp-signature/analyze";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub endpoint: String,
    /// Identity forwarded to the service with every document
    pub user_id: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            user_id: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ServiceConfig {
    pub fn from_toml(text: &str) -> Result<Self, AnalyzerError> {
        let config: Self = toml::from_str(text)?;
        if config.timeout_secs == 0 {
            return Err(AnalyzerError::InvalidSetting {
                key: "timeout_secs",
                value: "0".into(),
            });
        }
        Ok(config)
    }

    /// Apply `STAMP_ANALYZER_*` overrides from any key/value source.
    /// Invalid values are skipped, leaving the current setting, and returned.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Vec<AnalyzerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut rejected = Vec::new();

        if let Some(endpoint) = lookup("STAMP_ANALYZER_ENDPOINT").filter(|v| !v.trim().is_empty())
        {
            self.endpoint = endpoint.trim().to_string();
        }
        if let Some(user) = lookup("STAMP_ANALYZER_USER_ID") {
            let user = user.trim();
            self.user_id = (!user.is_empty()).then(|| user.to_string());
        }
        if let Some(raw) = lookup("STAMP_ANALYZER_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.timeout_secs = secs,
                _ => rejected.push(AnalyzerError::InvalidSetting {
                    key: "STAMP_ANALYZER_TIMEOUT_SECS",
                    value: raw,
                }),
            }
        }
        rejected
    }

    fn apply_overrides_logged<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for e in self.apply_overrides(lookup) {
            log::warn!("Ignoring override: {}", e);
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|u| !u.trim().is_empty())
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Result<Self, AnalyzerError> {
        use std::path::PathBuf;

        let path = std::env::var_os("STAMP_ANALYZER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("stamp-analyzer.toml"));

        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path).map_err(|source| AnalyzerError::Io {
                path: path.clone(),
                source,
            })?;
            log::info!("Loaded service config from {}", path.display());
            Self::from_toml(&text)?
        } else {
            Self::default()
        };

        config.apply_overrides_logged(|key| std::env::var(key).ok());
        Ok(config)
    }

    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Result<Self, AnalyzerError> {
        let mut config = Self::default();
        let search = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        let Ok(params) = web_sys::UrlSearchParams::new_with_str(&search) else {
            return Ok(config);
        };
        config.apply_overrides_logged(|key| match key {
            "STAMP_ANALYZER_ENDPOINT" => params.get("endpoint"),
            "STAMP_ANALYZER_USER_ID" => params.get("user"),
            _ => None,
        });
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ServiceConfig::from_toml("user_id = \"officer-7\"\n").unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.user_id(), Some("officer-7"));
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn malformed_toml_is_rejected() {
        let err = ServiceConfig::from_toml("timeout_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, AnalyzerError::Config(_)));
    }

    #[test]
    fn environment_overrides_file() {
        let mut config = ServiceConfig::from_toml(
            "endpoint = \"http://file/analyze\"\nuser_id = \"a\"\ntimeout_secs = 5\n",
        )
        .unwrap();
        let vars = env(&[
            ("STAMP_ANALYZER_ENDPOINT", " https://svc.example/analyze "),
            ("STAMP_ANALYZER_USER_ID", "b"),
            ("STAMP_ANALYZER_TIMEOUT_SECS", "30"),
        ]);
        assert!(config.apply_overrides(|k| vars.get(k).cloned()).is_empty());

        assert_eq!(config.endpoint, "https://svc.example/analyze");
        assert_eq!(config.user_id(), Some("b"));
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn blank_user_override_clears_user() {
        let mut config = ServiceConfig {
            user_id: Some("a".into()),
            ..Default::default()
        };
        let vars = env(&[("STAMP_ANALYZER_USER_ID", "  ")]);
        assert!(config.apply_overrides(|k| vars.get(k).cloned()).is_empty());
        assert_eq!(config.user_id(), None);
    }

    #[test]
    fn bad_timeout_override_keeps_file_settings() {
        let mut config = ServiceConfig::from_toml(
            "endpoint = \"http://file/analyze\"\nuser_id = \"officer-7\"\ntimeout_secs = 45\n",
        )
        .unwrap();
        let vars = env(&[
            ("STAMP_ANALYZER_ENDPOINT", "https://svc.example/analyze"),
            ("STAMP_ANALYZER_TIMEOUT_SECS", "ten"),
        ]);
        let rejected = config.apply_overrides(|k| vars.get(k).cloned());

        assert_eq!(rejected.len(), 1);
        assert!(matches!(
            &rejected[0],
            AnalyzerError::InvalidSetting {
                key: "STAMP_ANALYZER_TIMEOUT_SECS",
                value,
            } if value == "ten"
        ));
        assert_eq!(config.endpoint, "https://svc.example/analyze");
        assert_eq!(config.user_id(), Some("officer-7"));
        assert_eq!(config.timeout_secs, 45);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = ServiceConfig::default();
        let vars = env(&[("STAMP_ANALYZER_TIMEOUT_SECS", "0")]);
        assert_eq!(config.apply_overrides(|k| vars.get(k).cloned()).len(), 1);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);

        let err = ServiceConfig::from_toml("timeout_secs = 0\n").unwrap_err();
        assert!(matches!(
            err,
            AnalyzerError::InvalidSetting {
                key: "timeout_secs",
                ..
            }
        ));
    }
}
