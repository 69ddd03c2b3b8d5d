use bincode::Options;
use serde::de::{DeserializeSeed, Deserializer, Error as _};

use crate::error::{CodecError, CodecResult};
use crate::message::DecodeTarget;

/// Serializes values to bytes and populates instances from bytes.
///
/// A registry holds two codecs: one for the payload and one for the
/// envelope record wrapping it. Implementations must be stateless enough to
/// be shared across threads.
pub trait Codec: Send + Sync {
    /// Short name used in error messages.
    fn name(&self) -> &'static str;

    fn encode(&self, value: &dyn erased_serde::Serialize) -> CodecResult<Vec<u8>>;

    /// Populate `target` in place from `bytes`.
    fn decode(&self, bytes: &[u8], target: &mut dyn DecodeTarget) -> CodecResult<()>;
}

/// JSON via `serde_json`. Default payload codec.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode(&self, value: &dyn erased_serde::Serialize) -> CodecResult<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| CodecError::encode(self.name(), e))
    }

    fn decode(&self, bytes: &[u8], target: &mut dyn DecodeTarget) -> CodecResult<()> {
        let mut de = serde_json::Deserializer::from_slice(bytes);
        {
            let mut erased = <dyn erased_serde::Deserializer>::erase(&mut de);
            target
                .decode_from(&mut erased)
                .map_err(|e| CodecError::decode(self.name(), e))?;
        }
        // Reject trailing data after the value.
        de.end().map_err(|e| CodecError::decode(self.name(), e))
    }
}

/// Bincode with varint integers. Default envelope codec.
#[derive(Clone, Copy, Debug, Default)]
pub struct BincodeCodec;

impl BincodeCodec {
    fn options() -> impl Options {
        bincode::DefaultOptions::new().reject_trailing_bytes()
    }
}

/// Feeds a bincode deserializer into a [`DecodeTarget`] so the options'
/// end-of-input check still runs.
struct TargetSeed<'a> {
    target: &'a mut dyn DecodeTarget,
}

impl<'de> DeserializeSeed<'de> for TargetSeed<'_> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        let mut erased = <dyn erased_serde::Deserializer>::erase(deserializer);
        self.target.decode_from(&mut erased).map_err(D::Error::custom)
    }
}

impl Codec for BincodeCodec {
    fn name(&self) -> &'static str {
        "bincode"
    }

    fn encode(&self, value: &dyn erased_serde::Serialize) -> CodecResult<Vec<u8>> {
        Self::options()
            .serialize(value)
            .map_err(|e| CodecError::encode(self.name(), e))
    }

    fn decode(&self, bytes: &[u8], target: &mut dyn DecodeTarget) -> CodecResult<()> {
        Self::options()
            .deserialize_seed(TargetSeed { target }, bytes)
            .map_err(|e| CodecError::decode(self.name(), e))
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::envelope::EnvelopeRecord;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Reading {
        sensor: String,
        celsius: f64,
    }

    #[test]
    fn json_is_readable() {
        let bytes = JsonCodec
            .encode(&Reading { sensor: "t1".into(), celsius: 21.5 })
            .unwrap();
        assert_eq!(bytes, br#"{"sensor":"t1","celsius":21.5}"#);
    }

    #[test]
    fn json_populates_target() {
        let mut target = Reading::default();
        JsonCodec
            .decode(br#"{"sensor":"t2","celsius":-3.0}"#, &mut target)
            .unwrap();
        assert_eq!(target, Reading { sensor: "t2".into(), celsius: -3.0 });
    }

    #[test]
    fn json_rejects_trailing_data() {
        let mut target = Reading::default();
        let err = JsonCodec
            .decode(br#"{"sensor":"t2","celsius":1.0} extra"#, &mut target)
            .unwrap_err();
        assert!(matches!(err, CodecError::Decode { codec: "json", .. }));
    }

    #[test]
    fn json_reports_malformed_input() {
        let mut target = Reading::default();
        let err = JsonCodec.decode(b"{not json", &mut target).unwrap_err();
        assert_eq!(err.codec(), "json");
    }

    #[test]
    fn bincode_record_layout() {
        let record = EnvelopeRecord {
            key: "k".into(),
            payload: vec![0xAA, 0xBB],
        };
        let bytes = BincodeCodec.encode(&record).unwrap();
        // varint length + "k", varint length + payload
        assert_eq!(bytes, vec![1, b'k', 2, 0xAA, 0xBB]);

        let mut decoded = EnvelopeRecord::default();
        BincodeCodec.decode(&bytes, &mut decoded).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn bincode_reports_truncated_input() {
        let mut decoded = EnvelopeRecord::default();
        let err = BincodeCodec.decode(&[5, b'a'], &mut decoded).unwrap_err();
        assert!(matches!(err, CodecError::Decode { codec: "bincode", .. }));
    }

    #[test]
    fn bincode_rejects_trailing_data() {
        let record = EnvelopeRecord {
            key: "k".into(),
            payload: vec![1],
        };
        let mut bytes = BincodeCodec.encode(&record).unwrap();
        bytes.extend_from_slice(b"junk");

        let mut decoded = EnvelopeRecord::default();
        let err = BincodeCodec.decode(&bytes, &mut decoded).unwrap_err();
        assert!(matches!(err, CodecError::Decode { codec: "bincode", .. }));
    }

    #[test]
    fn codecs_are_object_safe() {
        let codecs: Vec<Box<dyn Codec>> = vec![Box::new(JsonCodec), Box::new(BincodeCodec)];
        for codec in &codecs {
            let reading = Reading { sensor: "x".into(), celsius: 0.5 };
            let bytes = codec.encode(&reading).unwrap();
            let mut back = Reading::default();
            codec.decode(&bytes, &mut back).unwrap();
            assert_eq!(back, reading, "codec {}", codec.name());
        }
    }
}
