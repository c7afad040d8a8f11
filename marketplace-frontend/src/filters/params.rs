use super::{encode_extra_fields, ExtraFields};

/// A value handed to [`FilterSync::update_params`](super::FilterSync::update_params).
///
/// Absent values, empty strings and empty lists delete the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Absent,
    Text(String),
    List(Vec<String>),
}

impl ParamValue {
    pub fn is_present(&self) -> bool {
        match self {
            ParamValue::Absent => false,
            ParamValue::Text(text) => !text.is_empty(),
            ParamValue::List(items) => !items.is_empty(),
        }
    }

    /// Query-string form; lists join with a comma.
    pub fn serialize(&self) -> Option<String> {
        if !self.is_present() {
            return None;
        }
        match self {
            ParamValue::Absent => None,
            ParamValue::Text(text) => Some(text.clone()),
            ParamValue::List(items) => Some(items.join(",")),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Text(value.clone())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::List(value)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(value: Vec<&str>) -> Self {
        ParamValue::List(value.into_iter().map(str::to_string).collect())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<&ExtraFields> for ParamValue {
    fn from(fields: &ExtraFields) -> Self {
        encode_extra_fields(fields).map_or(ParamValue::Absent, ParamValue::Text)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ParamValue::Absent, Into::into)
    }
}
