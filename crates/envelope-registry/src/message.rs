//! Registrable types and their object-safe view.
//!
//! User types implement [`Enveloped`]; the registry only ever sees them as
//! `dyn Message`, which [`Enveloped`] types get through a blanket impl.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::key;

/// A concrete type that can travel inside an envelope.
///
/// The provided associated functions are opt-in key capabilities. They take
/// no `self`, so the key of a type can never depend on field values.
///
/// ```ignore
/// #[derive(Debug, Default, Serialize, Deserialize)]
/// struct Shipped { order_id: u64 }
///
/// impl Enveloped for Shipped {
///     fn envelope_key_prefix() -> Option<Cow<'static, str>> {
///         Some("evt.".into())
///     }
/// }
/// ```
pub trait Enveloped:
    Serialize + DeserializeOwned + Default + fmt::Debug + Send + Sync + 'static
{
    /// Key override. When this returns `Some`, the string is the key verbatim
    /// and any prefix is ignored.
    fn envelope_key() -> Option<Cow<'static, str>> {
        None
    }

    /// Key prefix, prepended to the qualified type name when there is no
    /// override.
    fn envelope_key_prefix() -> Option<Cow<'static, str>> {
        None
    }

    /// Module-qualified type name the default key is built from.
    ///
    /// The default comes from [`std::any::type_name`], whose output is not
    /// guaranteed to stay the same across compiler versions and also changes
    /// when the type moves between modules. Types whose envelopes are
    /// persisted or exchanged between separately built programs should pin
    /// their key with [`envelope_key`](Self::envelope_key) or override this.
    fn qualified_name() -> String {
        key::qualified_type_name::<Self>()
    }

    /// Whether this is the boxed (pointer) form of a type.
    #[doc(hidden)]
    fn indirect() -> bool {
        false
    }
}

/// `Box<T>` is the pointer form of `T`: same key, same wire shape.
impl<T: Enveloped> Enveloped for Box<T> {
    fn envelope_key() -> Option<Cow<'static, str>> {
        T::envelope_key()
    }

    fn envelope_key_prefix() -> Option<Cow<'static, str>> {
        T::envelope_key_prefix()
    }

    fn qualified_name() -> String {
        T::qualified_name()
    }

    fn indirect() -> bool {
        true
    }
}

/// A mutable instance a codec can populate in place.
pub trait DecodeTarget {
    fn decode_from(
        &mut self,
        de: &mut dyn erased_serde::Deserializer<'_>,
    ) -> Result<(), erased_serde::Error>;
}

impl<T: DeserializeOwned> DecodeTarget for T {
    fn decode_from(
        &mut self,
        de: &mut dyn erased_serde::Deserializer<'_>,
    ) -> Result<(), erased_serde::Error> {
        *self = erased_serde::deserialize(de)?;
        Ok(())
    }
}

/// Type-erased registrable value.
///
/// Implemented for every [`Enveloped`] type; implement it by hand only for
/// types that cannot meet the `Enveloped` bounds.
pub trait Message: Any + Send + Sync + fmt::Debug {
    /// Derived envelope key of this value's type.
    fn key(&self) -> String;

    /// `true` for the boxed form of a type.
    fn is_indirect(&self) -> bool;

    /// A fresh default instance of the same concrete type and form.
    fn fresh(&self) -> Box<dyn Message>;

    fn as_serialize(&self) -> &dyn erased_serde::Serialize;

    fn as_decode_target(&mut self) -> &mut dyn DecodeTarget;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
}

impl<T: Enveloped> Message for T {
    fn key(&self) -> String {
        key::derive_key::<T>()
    }

    fn is_indirect(&self) -> bool {
        T::indirect()
    }

    fn fresh(&self) -> Box<dyn Message> {
        Box::new(T::default())
    }

    fn as_serialize(&self) -> &dyn erased_serde::Serialize {
        self
    }

    fn as_decode_target(&mut self) -> &mut dyn DecodeTarget {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }
}

impl<'a> dyn Message + 'a {
    /// Exact concrete type check; `Box<T>` and `T` are different here.
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Borrow the value as `T` whether it is held in value or boxed form.
    pub fn value_ref<T: Enveloped>(&self) -> Option<&T> {
        let any = self.as_any();
        any.downcast_ref::<T>()
            .or_else(|| any.downcast_ref::<Box<T>>().map(|boxed| &**boxed))
    }
}

impl dyn Message {
    /// Take ownership of the value as `T`, unwrapping the boxed form.
    /// Hands the message back unchanged when it is neither `T` nor `Box<T>`.
    pub fn into_value<T: Enveloped>(self: Box<Self>) -> Result<T, Box<dyn Message>> {
        if self.is::<T>() {
            let any = self.into_any();
            return any
                .downcast::<T>()
                .map(|value| *value)
                .map_err(|_| unreachable!("type checked above"));
        }
        if self.is::<Box<T>>() {
            let any = self.into_any();
            return any
                .downcast::<Box<T>>()
                .map(|value| **value)
                .map_err(|_| unreachable!("type checked above"));
        }
        Err(self)
    }
}

/// Box a value in value form for a registry factory.
pub fn direct<T: Enveloped>(value: T) -> Box<dyn Message> {
    Box::new(value)
}

/// Box a value in pointer form (`Box<T>`), the form factories must return.
pub fn indirect<T: Enveloped>(value: T) -> Box<dyn Message> {
    Box::new(Box::new(value))
}
