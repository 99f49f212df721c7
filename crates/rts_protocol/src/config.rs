//! Codec configuration.
//!
//! Loaded from RON like the rest of the game's data files, e.g.
//!
//! ```ron
//! (
//!     max_string_len: 4096,
//!     diagnostic_channel: "network",
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};

/// Default upper bound on a single decoded string, in bytes.
pub const DEFAULT_MAX_STRING_LEN: usize = 64 * 1024;

/// Limits and reporting options for [`crate::codec::OrderCodec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Longest string the decoder will allocate for.
    pub max_string_len: usize,
    /// Channel passed to the diagnostic sink.
    pub diagnostic_channel: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_string_len: DEFAULT_MAX_STRING_LEN,
            diagnostic_channel: "debug".to_string(),
        }
    }
}

impl CodecConfig {
    /// Parse a config from RON text. Missing fields take their defaults.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| ProtocolError::ConfigParse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Load a config from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ProtocolError::Io {
            path: path.display().to_string(),
            source,
        })?;

        ron::from_str(&text).map_err(|e| ProtocolError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CodecConfig::default();
        assert_eq!(config.max_string_len, DEFAULT_MAX_STRING_LEN);
        assert_eq!(config.diagnostic_channel, "debug");
    }

    #[test]
    fn test_parse_full_config() {
        let config =
            CodecConfig::from_ron_str(r#"(max_string_len: 128, diagnostic_channel: "network")"#)
                .unwrap();
        assert_eq!(config.max_string_len, 128);
        assert_eq!(config.diagnostic_channel, "network");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = CodecConfig::from_ron_str("(max_string_len: 10)").unwrap();
        assert_eq!(config.max_string_len, 10);
        assert_eq!(config.diagnostic_channel, "debug");
    }

    #[test]
    fn test_parse_error() {
        let err = CodecConfig::from_ron_str("(max_string_len: \"lots\")").unwrap_err();
        assert!(matches!(err, ProtocolError::ConfigParse { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = CodecConfig::load("/nonexistent/codec.ron").unwrap_err();
        assert!(matches!(err, ProtocolError::Io { .. }));
    }
}
