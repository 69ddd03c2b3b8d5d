use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace};

use crate::codec::{BincodeCodec, Codec, JsonCodec};
use crate::config::RegistryConfig;
use crate::envelope::{Envelope, EnvelopeRecord};
use crate::error::{RegistryError, RegistryResult};
use crate::message::{Enveloped, Message};

/// Produces a fresh instance of one registered type.
pub type Factory = Box<dyn Fn() -> Option<Box<dyn Message>> + Send + Sync>;

/// Configures the codecs of a [`Registry`] before it accepts registrations.
pub struct RegistryBuilder {
    payload_codec: Box<dyn Codec>,
    envelope_codec: Box<dyn Codec>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self {
            payload_codec: Box::new(JsonCodec),
            envelope_codec: Box::new(BincodeCodec),
        }
    }
}

impl RegistryBuilder {
    pub fn payload_codec(mut self, codec: impl Codec + 'static) -> Self {
        self.payload_codec = Box::new(codec);
        self
    }

    pub fn envelope_codec(mut self, codec: impl Codec + 'static) -> Self {
        self.envelope_codec = Box::new(codec);
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            payload_codec: self.payload_codec,
            envelope_codec: self.envelope_codec,
            factories: HashMap::new(),
        }
    }
}

/// Maps envelope keys to factories and runs the two-stage protocol.
///
/// Registration takes `&mut self` and every other operation takes `&self`:
/// register everything up front, then share the registry (for example in an
/// `Arc`) for concurrent serialize/deserialize traffic. Keys cannot be
/// unregistered or replaced.
pub struct Registry {
    payload_codec: Box<dyn Codec>,
    envelope_codec: Box<dyn Codec>,
    factories: HashMap<String, Factory>,
}

impl Registry {
    /// JSON payloads inside bincode envelopes.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn from_config(config: &RegistryConfig) -> Self {
        RegistryBuilder {
            payload_codec: config.payload_codec.codec(),
            envelope_codec: config.envelope_codec.codec(),
        }
        .build()
    }

    /// Register the concrete type of each sample, in order.
    ///
    /// Each type gets a factory producing default instances in the same form
    /// (value or boxed) as its sample. Stops at the first duplicate key;
    /// samples registered before it stay registered.
    pub fn register(&mut self, samples: &[&dyn Message]) -> RegistryResult<()> {
        for sample in samples {
            let key = sample.key();
            let prototype = sample.fresh();
            self.insert(key, Box::new(move || Some(prototype.fresh())))?;
        }
        Ok(())
    }

    /// Register `T` in value form.
    pub fn register_type<T: Enveloped>(&mut self) -> RegistryResult<()> {
        let sample = T::default();
        self.register(&[&sample as &dyn Message])
    }

    /// Register a factory. It is called once here to derive the key and must
    /// return a boxed instance (see [`indirect`](crate::message::indirect)).
    pub fn register_factory<F>(&mut self, factory: F) -> RegistryResult<()>
    where
        F: Fn() -> Option<Box<dyn Message>> + Send + Sync + 'static,
    {
        let sample = factory().ok_or_else(|| RegistryError::NilFactoryResult(String::new()))?;
        let key = sample.key();
        if !sample.is_indirect() {
            return Err(RegistryError::FactoryNotIndirect(key));
        }
        self.insert(key, Box::new(factory))
    }

    /// Register factories in order, stopping at the first failure.
    pub fn register_factories<I>(&mut self, factories: I) -> RegistryResult<()>
    where
        I: IntoIterator<Item = Factory>,
    {
        for factory in factories {
            self.register_factory(factory)?;
        }
        Ok(())
    }

    pub fn is_registered(&self, value: &dyn Message) -> bool {
        self.factories.contains_key(&value.key())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    /// Registered keys in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub fn payload_codec(&self) -> &dyn Codec {
        self.payload_codec.as_ref()
    }

    pub fn envelope_codec(&self) -> &dyn Codec {
        self.envelope_codec.as_ref()
    }

    /// A fresh instance of the type registered under `key`.
    pub fn build(&self, key: &str) -> RegistryResult<Box<dyn Message>> {
        let factory = self
            .factories
            .get(key)
            .ok_or_else(|| RegistryError::UnknownKey(key.to_string()))?;
        factory().ok_or_else(|| RegistryError::NilFactoryResult(key.to_string()))
    }

    pub fn serialize<M: Message>(&self, value: M) -> RegistryResult<Envelope> {
        self.serialize_boxed(Box::new(value))
    }

    /// Encode `value` with the payload codec, wrap it with its key and
    /// encode the record with the envelope codec.
    pub fn serialize_boxed(&self, value: Box<dyn Message>) -> RegistryResult<Envelope> {
        let key = value.key();
        if !self.factories.contains_key(&key) {
            return Err(RegistryError::UnknownKey(key));
        }

        let payload = self
            .payload_codec
            .encode(value.as_serialize())
            .map_err(RegistryError::PayloadCodec)?;
        let record = EnvelopeRecord { key, payload };
        let bytes = self
            .envelope_codec
            .encode(&record)
            .map_err(RegistryError::EnvelopeCodec)?;

        trace!(
            key = %record.key,
            payload_len = record.payload.len(),
            len = bytes.len(),
            "serialized envelope"
        );
        Ok(Envelope::new(record.key, value, bytes))
    }

    /// Decode the envelope record, build a fresh instance for its key and
    /// populate it from the payload.
    pub fn deserialize(&self, bytes: &[u8]) -> RegistryResult<Envelope> {
        let mut record = EnvelopeRecord::default();
        self.envelope_codec
            .decode(bytes, &mut record)
            .map_err(RegistryError::EnvelopeCodec)?;

        let mut value = self.build(&record.key)?;
        self.payload_codec
            .decode(&record.payload, value.as_decode_target())
            .map_err(RegistryError::PayloadCodec)?;

        trace!(key = %record.key, len = bytes.len(), "deserialized envelope");
        Ok(Envelope::new(record.key, value, bytes.to_vec()))
    }

    fn insert(&mut self, key: String, factory: Factory) -> RegistryResult<()> {
        match self.factories.entry(key) {
            Entry::Occupied(entry) => Err(RegistryError::DuplicateKey(entry.key().clone())),
            Entry::Vacant(entry) => {
                debug!(key = %entry.key(), "registered envelope type");
                entry.insert(factory);
                Ok(())
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("Registry")
            .field("payload_codec", &self.payload_codec.name())
            .field("envelope_codec", &self.envelope_codec.name())
            .field("keys", &keys)
            .finish()
    }
}
