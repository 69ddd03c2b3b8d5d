//! Envelope key derivation.
//!
//! A key is decided by the type alone, in this order:
//!
//! 1. [`Enveloped::envelope_key`] if it returns `Some`, verbatim;
//! 2. [`Enveloped::envelope_key_prefix`] followed by the qualified type name;
//! 3. the qualified type name.
//!
//! The qualified type name is the module path of the type with `.` as the
//! separator, e.g. `app.UserCreated` for `app::UserCreated`. `Box<T>` derives
//! the same key as `T`.

use crate::message::{Enveloped, Message};

/// Derive the key for a registrable type.
pub fn derive_key<T: Enveloped>() -> String {
    if let Some(key) = T::envelope_key() {
        return key.into_owned();
    }
    let name = T::qualified_name();
    match T::envelope_key_prefix() {
        Some(prefix) => format!("{prefix}{name}"),
        None => name,
    }
}

/// Derive the key of a type-erased value.
pub fn key_of(value: &dyn Message) -> String {
    value.key()
}

/// Module-qualified name of `T` with `::` replaced by `.`.
///
/// Built on [`std::any::type_name`], so the result is only stable for one
/// compiler version and module layout. See [`Enveloped::qualified_name`].
pub fn qualified_type_name<T: ?Sized>() -> String {
    std::any::type_name::<T>().replace("::", ".")
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::message::{direct, indirect};

    fn here() -> String {
        module_path!().replace("::", ".")
    }

    mod app {
        use super::*;

        #[derive(Debug, Default, Serialize, Deserialize)]
        pub struct UserCreated {
            pub first_name: String,
            pub last_name: String,
        }

        impl Enveloped for UserCreated {}
    }

    mod orders {
        use super::*;

        #[derive(Debug, Default, Serialize, Deserialize)]
        pub struct Shipped {
            pub order_id: u64,
        }

        impl Enveloped for Shipped {
            fn envelope_key_prefix() -> Option<Cow<'static, str>> {
                Some("evt.".into())
            }
        }

        #[derive(Debug, Default, Serialize, Deserialize)]
        pub struct Cancelled;

        impl Enveloped for Cancelled {
            fn envelope_key() -> Option<Cow<'static, str>> {
                Some("order-cancelled".into())
            }

            fn envelope_key_prefix() -> Option<Cow<'static, str>> {
                Some("evt.".into())
            }
        }
    }

    mod billing {
        use super::*;

        #[derive(Debug, Default, Serialize, Deserialize)]
        pub struct Shipped;

        impl Enveloped for Shipped {}
    }

    #[test]
    fn plain_key_is_qualified_name() {
        assert_eq!(
            derive_key::<app::UserCreated>(),
            format!("{}.app.UserCreated", here())
        );
    }

    #[test]
    fn prefix_is_prepended() {
        assert_eq!(
            derive_key::<orders::Shipped>(),
            format!("evt.{}.orders.Shipped", here())
        );
    }

    #[test]
    fn override_wins_over_prefix() {
        assert_eq!(derive_key::<orders::Cancelled>(), "order-cancelled");
    }

    #[test]
    fn same_short_name_in_different_modules() {
        let a = derive_key::<billing::Shipped>();
        let b = orders::Shipped::qualified_name();
        assert_ne!(a, b);
        assert!(a.ends_with(".billing.Shipped"));
    }

    #[test]
    fn boxed_form_derives_same_key() {
        assert_eq!(
            derive_key::<Box<app::UserCreated>>(),
            derive_key::<app::UserCreated>()
        );
        assert_eq!(
            derive_key::<Box<orders::Shipped>>(),
            derive_key::<orders::Shipped>()
        );
        assert_eq!(derive_key::<Box<orders::Cancelled>>(), "order-cancelled");
    }

    #[test]
    fn key_ignores_field_values() {
        let a = direct(orders::Shipped { order_id: 1 });
        let b = indirect(orders::Shipped { order_id: 2 });
        assert_eq!(key_of(a.as_ref()), key_of(b.as_ref()));
        assert_eq!(key_of(a.as_ref()), derive_key::<orders::Shipped>());
    }

    #[test]
    fn generic_arguments_are_qualified_too() {
        let name = qualified_type_name::<Vec<app::UserCreated>>();
        assert!(!name.contains("::"));
        assert!(name.ends_with(".app.UserCreated>"));
    }
}
