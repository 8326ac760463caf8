//! Environment variable loading with type conversion and defaults,
//! in the same shape the rest of the deployment's tooling uses.

use std::collections::HashMap;
use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnvError {
    #[error("environment variable not found: {var}")]
    NotFound { var: String },
    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

/// Environment configuration loader with an optional prefix and
/// fallback defaults.
pub struct EnvConfigLoader {
    prefix: Option<String>,
    defaults: HashMap<String, String>,
}

impl EnvConfigLoader {
    pub fn new() -> Self {
        Self {
            prefix: None,
            defaults: HashMap::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn default(mut self, var: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(var.into(), value.into());
        self
    }

    pub fn get(&self, var: &str) -> Result<String, EnvError> {
        let full_var = self.make_var_name(var);
        env::var(&full_var).or_else(|_| {
            self.defaults
                .get(var)
                .cloned()
                .ok_or_else(|| EnvError::NotFound { var: full_var.clone() })
        })
    }

    pub fn get_uint(&self, var: &str) -> Result<u64, EnvError> {
        let value = self.get(var)?;
        value.parse().map_err(|e| EnvError::InvalidValue {
            var: self.make_var_name(var),
            reason: format!("not an unsigned integer: {e}"),
        })
    }

    pub fn get_bool(&self, var: &str) -> Result<bool, EnvError> {
        let value = self.get(var)?;
        match value.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(EnvError::InvalidValue {
                var: self.make_var_name(var),
                reason: format!("not a boolean: {value}"),
            }),
        }
    }

    pub fn get_list(&self, var: &str) -> Result<Vec<String>, EnvError> {
        let value = self.get(var)?;
        Ok(value
            .split(':')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect())
    }

    fn make_var_name(&self, var: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}{}", var.to_uppercase()),
            None => var.to_uppercase(),
        }
    }
}

impl Default for EnvConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_default_when_unset() {
        let loader = EnvConfigLoader::new()
            .with_prefix("CLIPPER_TEST_NONEXISTENT_")
            .default("foo", "bar");
        assert_eq!(loader.get("foo").unwrap(), "bar");
    }

    #[test]
    fn parses_bool_variants() {
        std::env::set_var("CLIPPER_TEST_ENV_BOOL_YES", "yes");
        let loader = EnvConfigLoader::new().with_prefix("CLIPPER_TEST_ENV_");
        assert!(loader.get_bool("bool_yes").unwrap());
        std::env::remove_var("CLIPPER_TEST_ENV_BOOL_YES");
    }

    #[test]
    fn splits_search_path_lists() {
        let loader = EnvConfigLoader::new().default("paths", "/a/b:/c/d");
        assert_eq!(loader.get_list("paths").unwrap(), vec!["/a/b", "/c/d"]);
    }
}
