use crate::value::FieldValue;
use std::collections::{BTreeMap, HashMap};

/// A record with named fields.
///
/// Anything that can look a field up by name and enumerate its field names can be
/// batched, counted for a vocabulary, and materialized into arrays.
pub trait Sample {
    fn field(&self, name: &str) -> Option<&FieldValue>;

    fn field_names(&self) -> Vec<&str>;

    fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

/// The default sample type: an ordered map from field name to value.
pub type Record = BTreeMap<String, FieldValue>;

impl Sample for BTreeMap<String, FieldValue> {
    fn field(&self, name: &str) -> Option<&FieldValue> {
        self.get(name)
    }

    fn field_names(&self) -> Vec<&str> {
        self.keys().map(String::as_str).collect()
    }
}

impl Sample for HashMap<String, FieldValue> {
    fn field(&self, name: &str) -> Option<&FieldValue> {
        self.get(name)
    }

    fn field_names(&self) -> Vec<&str> {
        self.keys().map(String::as_str).collect()
    }
}

impl<S: Sample + ?Sized> Sample for &S {
    fn field(&self, name: &str) -> Option<&FieldValue> {
        (**self).field(name)
    }

    fn field_names(&self) -> Vec<&str> {
        (**self).field_names()
    }
}

/// Build a [`Record`] from `name => value` pairs.
///
/// ```
/// use oxidize_text_core::{record, FieldValue};
///
/// let r = record! { "ws" => vec!["a", "b"], "label" => 1 };
/// assert_eq!(r["label"], FieldValue::from(1));
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::Record::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut r = $crate::Record::new();
        $(
            r.insert(::std::string::String::from($name), $crate::FieldValue::from($value));
        )+
        r
    }};
}
