use serde::{Deserialize, Serialize};

use crate::message::{Enveloped, Message};

/// The two-field record that crosses the wire: a key and the opaque bytes
/// the payload codec produced for it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeRecord {
    pub key: String,
    pub payload: Vec<u8>,
}

/// Result of [`Registry::serialize`](crate::Registry::serialize) or
/// [`Registry::deserialize`](crate::Registry::deserialize).
///
/// Holds the key, the value (the one passed in, or the rebuilt one) and the
/// complete envelope bytes.
#[derive(Debug)]
pub struct Envelope {
    key: String,
    payload: Box<dyn Message>,
    bytes: Vec<u8>,
}

impl Envelope {
    pub(crate) fn new(key: String, payload: Box<dyn Message>, bytes: Vec<u8>) -> Self {
        Self {
            key,
            payload,
            bytes,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn payload(&self) -> &dyn Message {
        self.payload.as_ref()
    }

    /// The serialized envelope.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Borrow the payload as `T`, in either value or boxed form.
    pub fn payload_as<T: Enveloped>(&self) -> Option<&T> {
        self.payload.value_ref::<T>()
    }

    /// Same as [`payload_as`](Self::payload_as).
    pub fn downcast_ref<T: Enveloped>(&self) -> Option<&T> {
        self.payload_as::<T>()
    }

    /// Take the payload as `T`, unwrapping the boxed form. Hands the envelope
    /// back untouched when the payload is some other type.
    pub fn downcast<T: Enveloped>(self) -> Result<T, Self> {
        let Self {
            key,
            payload,
            bytes,
        } = self;
        payload.into_value::<T>().map_err(|payload| Self {
            key,
            payload,
            bytes,
        })
    }

    pub fn into_payload(self) -> Box<dyn Message> {
        self.payload
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn into_parts(self) -> (String, Box<dyn Message>, Vec<u8>) {
        (self.key, self.payload, self.bytes)
    }
}
