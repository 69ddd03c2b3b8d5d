use thiserror::Error;

/// Boxed error from an underlying serialization library.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure reported by a [`Codec`](crate::codec::Codec).
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("{codec} encode failed: {source}")]
    Encode {
        codec: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("{codec} decode failed: {source}")]
    Decode {
        codec: &'static str,
        #[source]
        source: BoxError,
    },
}

impl CodecError {
    pub fn encode(codec: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Encode {
            codec,
            source: source.into(),
        }
    }

    pub fn decode(codec: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Decode {
            codec,
            source: source.into(),
        }
    }

    /// Name of the codec that failed.
    pub fn codec(&self) -> &'static str {
        match self {
            Self::Encode { codec, .. } | Self::Decode { codec, .. } => codec,
        }
    }
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Errors produced by registry operations.
///
/// None of these are transient: each one is either a registration mistake or
/// input the registry does not recognize, so retrying never helps.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Nothing is registered under the key.
    #[error("no type registered for key {0:?}")]
    UnknownKey(String),

    /// The key already has a factory.
    #[error("key {0:?} is already registered")]
    DuplicateKey(String),

    /// A factory produced no instance. The key is empty when the factory
    /// failed before a key could be derived.
    #[error("factory for {0:?} returned no value")]
    NilFactoryResult(String),

    /// A factory handed back a value-form instance instead of a boxed one.
    #[error("factory for {0:?} must return a boxed value")]
    FactoryNotIndirect(String),

    #[error("payload codec: {0}")]
    PayloadCodec(#[source] CodecError),

    #[error("envelope codec: {0}")]
    EnvelopeCodec(#[source] CodecError),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors from loading a [`RegistryConfig`](crate::config::RegistryConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown codec {0:?} (expected \"json\" or \"bincode\")")]
    UnknownCodec(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
