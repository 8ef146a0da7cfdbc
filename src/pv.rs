//! EDM local process variables (`LOC\name=type:value`).

use std::fmt;

use crate::error::{EdlError, Result};

/// Initial value of a local PV; the variant picks the EDM type code.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalValue {
    Int(i64),
    Double(f64),
    Str(String),
    Enum { choices: Vec<String>, index: usize },
}

/// A PV that lives only inside the EDM process.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalPv {
    pub name: String,
    pub value: LocalValue,
}

impl LocalPv {
    pub fn new(name: impl Into<String>, value: LocalValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn int(name: impl Into<String>, value: i64) -> Self {
        Self::new(name, LocalValue::Int(value))
    }

    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, LocalValue::Str(value.into()))
    }

    /// Enumerated local PV starting on `value`, which must be one of `choices`.
    pub fn enumerated<I, S>(name: impl Into<String>, choices: I, value: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let choices: Vec<String> = choices.into_iter().map(Into::into).collect();
        let index = choices
            .iter()
            .position(|choice| choice == value)
            .ok_or_else(|| {
                EdlError::validation("value", format!("`{value}` is not one of {choices:?}"))
            })?;
        Ok(Self::new(name, LocalValue::Enum { choices, index }))
    }
}

impl fmt::Display for LocalPv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LOC\\{}=", self.name)?;
        match &self.value {
            LocalValue::Int(value) => write!(f, "i:{value}"),
            LocalValue::Double(value) => write!(f, "d:{value}"),
            LocalValue::Str(value) => write!(f, "s:{value}"),
            LocalValue::Enum { choices, index } => write!(f, "e:{index},{}", choices.join(",")),
        }
    }
}
