use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codec::{BincodeCodec, Codec, JsonCodec};
use crate::error::{ConfigError, ConfigResult};

/// Built-in codec selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    Json,
    Bincode,
}

impl CodecKind {
    pub fn codec(self) -> Box<dyn Codec> {
        match self {
            Self::Json => Box::new(JsonCodec),
            Self::Bincode => Box::new(BincodeCodec),
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Bincode => f.write_str("bincode"),
        }
    }
}

impl FromStr for CodecKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "bincode" => Ok(Self::Bincode),
            _ => Err(ConfigError::UnknownCodec(s.to_string())),
        }
    }
}

/// Codec choice for a [`Registry`](crate::Registry).
///
/// ```toml
/// payload_codec = "json"
/// envelope_codec = "bincode"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Codec for the registered value itself.
    pub payload_codec: CodecKind,
    /// Codec for the `{key, payload}` record.
    pub envelope_codec: CodecKind,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            payload_codec: CodecKind::Json,
            envelope_codec: CodecKind::Bincode,
        }
    }
}

impl RegistryConfig {
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_config() {
        let c = RegistryConfig::default();
        assert_eq!(c.payload_codec, CodecKind::Json);
        assert_eq!(c.envelope_codec, CodecKind::Bincode);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(RegistryConfig::from_toml_str("").unwrap(), RegistryConfig::default());
    }

    #[test]
    fn partial_toml_keeps_other_default() {
        let c = RegistryConfig::from_toml_str(r#"envelope_codec = "json""#).unwrap();
        assert_eq!(c.payload_codec, CodecKind::Json);
        assert_eq!(c.envelope_codec, CodecKind::Json);
    }

    #[test]
    fn unknown_field_rejected() {
        let err = RegistryConfig::from_toml_str(r#"compression = "zstd""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unknown_codec_rejected() {
        let err = RegistryConfig::from_toml_str(r#"payload_codec = "xml""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(matches!("xml".parse::<CodecKind>(), Err(ConfigError::UnknownCodec(_))));
    }

    #[test]
    fn codec_kind_parses_and_displays() {
        assert_eq!("JSON".parse::<CodecKind>().unwrap(), CodecKind::Json);
        assert_eq!("bincode".parse::<CodecKind>().unwrap(), CodecKind::Bincode);
        assert_eq!(CodecKind::Bincode.to_string(), "bincode");
        assert_eq!(CodecKind::Json.codec().name(), "json");
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "payload_codec = \"bincode\"").unwrap();
        writeln!(file, "envelope_codec = \"json\"").unwrap();

        let c = RegistryConfig::load(file.path()).unwrap();
        assert_eq!(c.payload_codec, CodecKind::Bincode);
        assert_eq!(c.envelope_codec, CodecKind::Json);
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RegistryConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
