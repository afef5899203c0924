use crate::utils::parse_bool;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigFileError {
    #[error("Invalid line {0} in config file: {1}")]
    InvalidLine(usize, String),

    #[error("Invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Connection values read from a tower-cli style config file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfigFileValues {
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(alias = "oauthtoken")]
    pub oauth_token: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub verify_ssl: Option<bool>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Text(String),
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Flag::Bool(flag)) => Ok(Some(flag)),
        Some(Flag::Text(text)) => parse_bool(&text)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid boolean for verify_ssl: {}", text))),
    }
}

/// Parse a config file body.
///
/// YAML (and therefore JSON) mappings are read directly. Anything that is not
/// a mapping falls back to `key = value` lines, skipping `[section]` headers,
/// blank lines and `#`/`;` comments.
pub fn parse_config(content: &str) -> Result<ConfigFileValues, ConfigFileError> {
    match serde_yaml::from_str::<Value>(content) {
        Ok(Value::Null) => Ok(ConfigFileValues::default()),
        Ok(mapping @ Value::Mapping(_)) => Ok(serde_yaml::from_value(mapping)?),
        Ok(_) | Err(_) => {
            debug!("Config file is not a YAML mapping, reading key=value lines");
            parse_key_values(content)
        }
    }
}

fn parse_key_values(content: &str) -> Result<ConfigFileValues, ConfigFileError> {
    let mut mapping = Mapping::new();

    for (index, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty()
            || line.starts_with('#')
            || line.starts_with(';')
            || (line.starts_with('[') && line.ends_with(']'))
        {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(ConfigFileError::InvalidLine(index + 1, line.to_string()));
        };
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
            .unwrap_or(value);

        mapping.insert(
            Value::String(key.trim().to_string()),
            Value::String(value.to_string()),
        );
    }

    Ok(serde_yaml::from_value(Value::Mapping(mapping))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ini_style() {
        let content = "\
[general]
# tower-cli settings
host = https://tower.example.com
username = admin
password = 'p@ss:word'
verify_ssl = false
format = json
";
        let values = parse_config(content).unwrap();
        assert_eq!(values.host.as_deref(), Some("https://tower.example.com"));
        assert_eq!(values.username.as_deref(), Some("admin"));
        assert_eq!(values.password.as_deref(), Some("p@ss:word"));
        assert_eq!(values.verify_ssl, Some(false));
        assert_eq!(values.oauth_token, None);
    }

    #[test]
    fn test_parse_yaml_strips_inline_comments() {
        let values =
            parse_config("host: tower.example.com  # prod\nverify_ssl: false\n").unwrap();
        assert_eq!(values.host.as_deref(), Some("tower.example.com"));
        assert_eq!(values.verify_ssl, Some(false));
    }

    #[test]
    fn test_parse_yaml_accepts_textual_bools() {
        let values = parse_config("host: tower.local\nverify_ssl: 'no'\n").unwrap();
        assert_eq!(values.verify_ssl, Some(false));
    }

    #[test]
    fn test_parse_json() {
        let values =
            parse_config(r#"{"host": "tower.local", "oauth_token": "abc", "verify_ssl": true}"#)
                .unwrap();
        assert_eq!(values.host.as_deref(), Some("tower.local"));
        assert_eq!(values.oauth_token.as_deref(), Some("abc"));
        assert_eq!(values.verify_ssl, Some(true));
    }

    #[test]
    fn test_parse_empty_file() {
        assert_eq!(parse_config("# nothing here\n").unwrap(), ConfigFileValues::default());
    }

    #[test]
    fn test_parse_rejects_line_without_separator() {
        let err = parse_config("[general]\nhost tower.local").unwrap_err();
        assert!(matches!(err, ConfigFileError::InvalidLine(2, _)));
    }

    #[test]
    fn test_parse_rejects_bad_bool() {
        let err = parse_config("verify_ssl: sometimes").unwrap_err();
        assert!(matches!(err, ConfigFileError::Yaml(_)));

        let err = parse_config("[general]\nverify_ssl = sometimes").unwrap_err();
        assert!(matches!(err, ConfigFileError::Yaml(_)));
    }
}
