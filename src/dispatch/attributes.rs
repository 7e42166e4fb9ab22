use crate::address::Address;
use crate::programs::Base64Bytes;
use crate::view::{Row, title_case};

/// One field of a validated instruction struct, typed for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    Address(Address),
    Bytes(Vec<u8>),
    Plain(String),
    Absent,
}

pub trait IntoAttribute {
    fn to_attribute(&self) -> Attribute;
}

impl IntoAttribute for Address {
    fn to_attribute(&self) -> Attribute {
        Attribute::Address(*self)
    }
}

impl IntoAttribute for Base64Bytes {
    fn to_attribute(&self) -> Attribute {
        Attribute::Bytes(self.0.clone())
    }
}

impl IntoAttribute for String {
    fn to_attribute(&self) -> Attribute {
        Attribute::Plain(self.clone())
    }
}

impl IntoAttribute for serde_json::Value {
    fn to_attribute(&self) -> Attribute {
        match self {
            serde_json::Value::Null => Attribute::Absent,
            serde_json::Value::String(s) => Attribute::Plain(s.clone()),
            other => Attribute::Plain(other.to_string()),
        }
    }
}

impl<T: IntoAttribute> IntoAttribute for Option<T> {
    fn to_attribute(&self) -> Attribute {
        self.as_ref()
            .map_or(Attribute::Absent, IntoAttribute::to_attribute)
    }
}

macro_rules! plain_attribute {
    ($($ty:ty),*) => {
        $(impl IntoAttribute for $ty {
            fn to_attribute(&self) -> Attribute {
                Attribute::Plain(self.to_string())
            }
        })*
    };
}

plain_attribute!(bool, u8, u16, u32, u64, i64);

/// Field list of a validated struct, in declaration order.
pub trait Attributes {
    fn attributes(&self) -> Vec<(&'static str, Attribute)>;
}

/// Declares an info struct that deserializes from a camelCase bag and lists
/// its fields for the generic attribute formatter.
macro_rules! attribute_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($(#[$field_meta:meta])* $field_vis:vis $field:ident : $ty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        $vis struct $name {
            $($(#[$field_meta])* $field_vis $field: $ty),*
        }

        impl $crate::dispatch::attributes::Attributes for $name {
            fn attributes(&self) -> Vec<(&'static str, $crate::dispatch::attributes::Attribute)> {
                vec![$((
                    stringify!($field),
                    $crate::dispatch::attributes::IntoAttribute::to_attribute(&self.$field),
                )),*]
            }
        }
    };
}

pub(crate) use attribute_struct;

/// Address fields become linked rows, byte fields hex rows, the rest plain rows.
pub fn attribute_rows(attributes: &dyn Attributes) -> Vec<Row> {
    attributes
        .attributes()
        .into_iter()
        .filter_map(|(name, attribute)| {
            let label = title_case(name);
            match attribute {
                Attribute::Address(address) => Some(Row::address(label, address)),
                Attribute::Bytes(bytes) => Some(Row::data(label, &bytes)),
                Attribute::Plain(text) => Some(Row::text(label, text)),
                Attribute::Absent => None,
            }
        })
        .collect()
}
