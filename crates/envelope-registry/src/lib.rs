//! Polymorphic serialization through a type registry.
//!
//! A producer serializes a value of some registered concrete type into a
//! self-describing blob; a consumer that only knows "this is one of the
//! registered types" recovers the exact type and its data.
//!
//! Every blob is an envelope: a `{key, payload}` record encoded by the
//! envelope codec, where `payload` is the value encoded by the payload codec
//! and `key` names the registered type. By default payloads are JSON and
//! envelopes are bincode.
//!
//! # Key Types
//!
//! - [`Enveloped`] — implemented by registrable types; carries the optional
//!   key override and key prefix
//! - [`Message`] — object-safe view of a registrable value
//! - [`Registry`] — key → factory table plus serialize/deserialize
//! - [`Envelope`] — result handle with the key, value and bytes
//! - [`Codec`] — pluggable payload/envelope codec ([`JsonCodec`], [`BincodeCodec`])
//!
//! # Example
//!
//! ```ignore
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct UserCreated { first_name: String, last_name: String }
//!
//! impl Enveloped for UserCreated {}
//!
//! let mut registry = Registry::new();
//! registry.register_type::<UserCreated>()?;
//!
//! let sent = registry.serialize(UserCreated {
//!     first_name: "John".into(),
//!     last_name: "Doe".into(),
//! })?;
//! let received = registry.deserialize(sent.bytes())?;
//! assert_eq!(received.payload_as::<UserCreated>().unwrap().first_name, "John");
//! ```

pub mod codec;
pub mod config;
pub mod envelope;
pub mod error;
pub mod global;
pub mod key;
pub mod message;
pub mod registry;

pub use codec::{BincodeCodec, Codec, JsonCodec};
pub use config::{CodecKind, RegistryConfig};
pub use envelope::{Envelope, EnvelopeRecord};
pub use error::{
    BoxError, CodecError, CodecResult, ConfigError, ConfigResult, RegistryError, RegistryResult,
};
pub use key::{derive_key, key_of};
pub use message::{direct, indirect, DecodeTarget, Enveloped, Message};
pub use registry::{Factory, Registry, RegistryBuilder};

// Custom codecs implement `Codec` in terms of these types.
pub use erased_serde;
