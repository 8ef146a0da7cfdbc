use std::fmt;

use indexmap::IndexMap;

use crate::choices::{AlignmentChoice, ColorChoice};
use crate::error::{EdlError, Result};
use crate::font::Font;
use crate::visibility::Visibility;
use crate::widget::Display;

/// Dynamically typed attribute value as stored on a widget.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Unset,
    Int(i64),
    Bool(bool),
    Str(String),
    Color(ColorChoice),
    Alignment(AlignmentChoice),
    Font(Font),
    Visibility(Visibility),
    Displays(Vec<Display>),
}

impl AttrValue {
    fn describe(&self) -> &'static str {
        match self {
            Self::Unset => "nothing",
            Self::Int(_) => "an integer",
            Self::Bool(_) => "a boolean",
            Self::Str(_) => "a string",
            Self::Color(_) => "a color",
            Self::Alignment(_) => "an alignment",
            Self::Font(_) => "a font",
            Self::Visibility(_) => "visibility settings",
            Self::Displays(_) => "a display list",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<ColorChoice> {
        match self {
            Self::Color(color) => Some(*color),
            _ => None,
        }
    }

    pub fn as_alignment(&self) -> Option<AlignmentChoice> {
        match self {
            Self::Alignment(alignment) => Some(*alignment),
            _ => None,
        }
    }

    pub fn as_font(&self) -> Option<&Font> {
        match self {
            Self::Font(font) => Some(font),
            _ => None,
        }
    }

    pub fn as_visibility(&self) -> Option<&Visibility> {
        match self {
            Self::Visibility(visibility) => Some(visibility),
            _ => None,
        }
    }

    pub fn as_displays(&self) -> Option<&[Display]> {
        match self {
            Self::Displays(displays) => Some(displays),
            _ => None,
        }
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<ColorChoice> for AttrValue {
    fn from(value: ColorChoice) -> Self {
        Self::Color(value)
    }
}

impl From<Option<ColorChoice>> for AttrValue {
    fn from(value: Option<ColorChoice>) -> Self {
        value.map_or(Self::Unset, Self::Color)
    }
}

impl From<AlignmentChoice> for AttrValue {
    fn from(value: AlignmentChoice) -> Self {
        Self::Alignment(value)
    }
}

impl From<Font> for AttrValue {
    fn from(value: Font) -> Self {
        Self::Font(value)
    }
}

impl From<Visibility> for AttrValue {
    fn from(value: Visibility) -> Self {
        Self::Visibility(value)
    }
}

impl From<Vec<Display>> for AttrValue {
    fn from(value: Vec<Display>) -> Self {
        Self::Displays(value)
    }
}

/// Declared type of an attribute. `Opt*` types also accept [`AttrValue::Unset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrType {
    Int,
    Bool,
    Str,
    OptStr,
    Color,
    OptColor,
    Alignment,
    Font,
    Visibility,
    Displays,
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Int => "an integer",
            Self::Bool => "a boolean",
            Self::Str | Self::OptStr => "a string",
            Self::Color | Self::OptColor => "a color",
            Self::Alignment => "an alignment",
            Self::Font => "a font",
            Self::Visibility => "visibility settings",
            Self::Displays => "a display list",
        };
        f.write_str(label)
    }
}

impl AttrType {
    /// Convert `value` into this type or explain why it cannot be.
    pub fn coerce(self, field: &str, value: AttrValue) -> Result<AttrValue> {
        let mismatch = |value: &AttrValue| {
            EdlError::validation(field, format!("expected {self}, got {}", value.describe()))
        };

        match (self, value) {
            (Self::OptStr | Self::OptColor, AttrValue::Unset) => Ok(AttrValue::Unset),
            (Self::Int, AttrValue::Int(value)) => Ok(AttrValue::Int(value)),
            (Self::Int, AttrValue::Bool(value)) => Ok(AttrValue::Int(i64::from(value))),
            (Self::Int, AttrValue::Str(raw)) => raw
                .trim()
                .parse::<i64>()
                .map(AttrValue::Int)
                .map_err(|_| EdlError::validation(field, format!("`{raw}` is not an integer"))),
            (Self::Bool, AttrValue::Bool(value)) => Ok(AttrValue::Bool(value)),
            (Self::Bool, AttrValue::Int(value)) => Ok(AttrValue::Bool(value != 0)),
            (Self::Str | Self::OptStr, AttrValue::Str(value)) => Ok(AttrValue::Str(value)),
            (Self::Str | Self::OptStr, AttrValue::Int(value)) => Ok(AttrValue::Str(value.to_string())),
            (Self::Color | Self::OptColor, AttrValue::Color(color)) => Ok(AttrValue::Color(color)),
            (Self::Color | Self::OptColor, AttrValue::Int(index)) => {
                ColorChoice::from_index(index).map(AttrValue::Color)
            }
            (Self::Color | Self::OptColor, AttrValue::Str(raw)) => {
                raw.parse::<ColorChoice>().map(AttrValue::Color)
            }
            (Self::Alignment, AttrValue::Alignment(alignment)) => {
                Ok(AttrValue::Alignment(alignment))
            }
            (Self::Alignment, AttrValue::Str(raw)) => {
                raw.parse::<AlignmentChoice>().map(AttrValue::Alignment)
            }
            (Self::Font, AttrValue::Font(font)) => Ok(AttrValue::Font(font)),
            (Self::Visibility, AttrValue::Visibility(vis)) => Ok(AttrValue::Visibility(vis)),
            (Self::Displays, AttrValue::Displays(displays)) => Ok(AttrValue::Displays(displays)),
            (Self::Displays, AttrValue::Str(path)) => {
                Display::from_edl(path).map(|display| AttrValue::Displays(vec![display]))
            }
            (_, other) => Err(mismatch(&other)),
        }
    }
}

/// Check run on an already coerced value before it is stored.
pub type AttrHook = fn(&AttrValue) -> Result<()>;

/// One declared attribute.
#[derive(Debug, Clone)]
pub struct AttrSpec {
    pub name: &'static str,
    pub ty: AttrType,
    pub default: AttrValue,
    pub hook: Option<AttrHook>,
    pub doc: &'static str,
}

impl AttrSpec {
    pub fn new(name: &'static str, ty: AttrType, default: impl Into<AttrValue>) -> Self {
        Self {
            name,
            ty,
            default: default.into(),
            hook: None,
            doc: "",
        }
    }

    pub fn doc(mut self, doc: &'static str) -> Self {
        self.doc = doc;
        self
    }

    pub fn hook(mut self, hook: AttrHook) -> Self {
        self.hook = Some(hook);
        self
    }
}

/// The full attribute declaration of one widget kind.
#[derive(Debug, Clone)]
pub struct Schema {
    label: &'static str,
    specs: IndexMap<&'static str, AttrSpec>,
}

impl Schema {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            specs: IndexMap::new(),
        }
    }

    /// Declare an attribute, replacing any earlier declaration of the same name.
    pub fn with(mut self, spec: AttrSpec) -> Self {
        self.specs.insert(spec.name, spec);
        self
    }

    /// Change the default of an inherited attribute.
    pub fn with_default(mut self, name: &'static str, default: impl Into<AttrValue>) -> Self {
        if let Some(spec) = self.specs.get_mut(name) {
            spec.default = default.into();
        }
        self
    }

    pub fn with_hook(mut self, name: &'static str, hook: AttrHook) -> Self {
        if let Some(spec) = self.specs.get_mut(name) {
            spec.hook = Some(hook);
        }
        self
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn spec(&self, name: &str) -> Option<&AttrSpec> {
        self.specs.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs.keys().copied()
    }

    pub fn defaults(&self) -> Attributes {
        Attributes {
            values: self
                .specs
                .values()
                .map(|spec| (spec.name, spec.default.clone()))
                .collect(),
        }
    }

    /// Validate `value` for `name`: known attribute, coercible, hook passes.
    pub fn check(&self, name: &str, value: AttrValue) -> Result<(&'static str, AttrValue)> {
        let spec = self.spec(name).ok_or_else(|| EdlError::UnknownAttribute {
            kind: self.label.to_string(),
            attribute: name.to_string(),
        })?;
        let value = spec.ty.coerce(spec.name, value)?;
        if let Some(hook) = spec.hook {
            hook(&value)?;
        }
        Ok((spec.name, value))
    }
}

/// Validated attribute values in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attributes {
    values: IndexMap<&'static str, AttrValue>,
}

impl Attributes {
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &AttrValue)> + '_ {
        self.values.iter().map(|(name, value)| (*name, value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn insert(&mut self, name: &'static str, value: AttrValue) {
        self.values.insert(name, value);
    }
}
