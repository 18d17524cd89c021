//! Icon Normalizer - Raw Declarations To Canonical Icons
//!
//! Validation runs before any file is touched. A declaration either comes
//! out fully canonical or the whole batch stops with `IconError::Validation`.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::IconError;
use crate::sizes::{parse_size, Dimension, ParsedSize, SizeField};

/// An icon exactly as the user wrote it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawIconSpec {
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub size: Option<SizeField>,
    #[serde(default)]
    pub sizes: Option<SizeField>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub ios: Option<Value>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub preserve_filename: Option<bool>,
    #[serde(default)]
    pub preserve_aspect_ratio: Option<bool>,
}

/// Which Apple link an icon feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IosMode {
    /// `apple-touch-icon`, declared as `ios: true`
    Icon,
    /// `apple-touch-startup-image`, declared as `ios: "startup"`
    Startup,
}

impl IosMode {
    /// Truthiness of the declared `ios` value decides whether there is a mode.
    pub fn from_declared(value: Option<&Value>) -> Option<Self> {
        match value? {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) if s == "startup" => Some(Self::Startup),
            Value::Number(n) if n.as_f64().map_or(true, |f| f == 0.0 || f.is_nan()) => None,
            _ => Some(Self::Icon),
        }
    }
}

impl Serialize for IosMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Icon => serializer.serialize_bool(true),
            Self::Startup => serializer.serialize_str("startup"),
        }
    }
}

/// A validated icon, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalIcon {
    pub src: String,
    pub sizes: Vec<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(serialize_with = "serialize_ios")]
    pub ios: Option<IosMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    pub preserve_filename: bool,
    pub preserve_aspect_ratio: bool,
}

fn serialize_ios<S: Serializer>(ios: &Option<IosMode>, serializer: S) -> Result<S::Ok, S::Error> {
    match ios {
        Some(mode) => mode.serialize(serializer),
        None => serializer.serialize_bool(false),
    }
}

impl CanonicalIcon {
    /// Icon with default flags.
    pub fn new(src: impl Into<String>, sizes: Vec<Dimension>) -> Self {
        Self {
            src: src.into(),
            sizes,
            destination: None,
            ios: None,
            color: None,
            purpose: None,
            preserve_filename: false,
            preserve_aspect_ratio: false,
        }
    }
}

/// Validate one declaration and expand its sizes.
pub fn normalize_icon(raw: RawIconSpec) -> Result<CanonicalIcon, IconError> {
    let src = match raw.src {
        Some(src) if !src.is_empty() => src,
        _ => return Err(IconError::validation("Unknown icon source.")),
    };

    let field = match (raw.size, raw.sizes) {
        (Some(size), _) if size.is_truthy() => size,
        (_, Some(sizes)) if sizes.is_truthy() => sizes,
        _ => return Err(IconError::validation(format!("Unknown icon sizes for '{}'.", src))),
    };

    let tokens = field.into_tokens();
    if tokens.is_empty() {
        return Err(IconError::validation(format!("Empty icon sizes for '{}'.", src)));
    }

    let preserve_aspect_ratio = raw.preserve_aspect_ratio.unwrap_or(false);
    let sizes = tokens
        .iter()
        .map(|token| resolve_dimension(parse_size(token), preserve_aspect_ratio, &src))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CanonicalIcon {
        ios: IosMode::from_declared(raw.ios.as_ref()),
        src,
        sizes,
        destination: raw.destination.filter(|d| !d.is_empty()),
        color: raw.color,
        purpose: raw.purpose,
        preserve_filename: raw.preserve_filename.unwrap_or(false),
        preserve_aspect_ratio,
    })
}

/// Square policy first, then range checks. Without aspect-ratio
/// preservation the declared height never matters.
fn resolve_dimension(
    parsed: ParsedSize,
    preserve_aspect_ratio: bool,
    src: &str,
) -> Result<Dimension, IconError> {
    let height = if preserve_aspect_ratio {
        parsed.height
    } else {
        parsed.width
    };

    let width = positive(parsed.width, "width", src)?;
    let height = positive(height, "height", src)?;
    Ok(Dimension::new(width, height))
}

fn positive(value: Option<i64>, axis: &str, src: &str) -> Result<u32, IconError> {
    match value {
        Some(v) if v > 0 => u32::try_from(v).map_err(|_| {
            IconError::validation(format!("Icon {} {} is too large for '{}'.", axis, v, src))
        }),
        Some(v) => Err(IconError::validation(format!(
            "Icon {} must be positive, got {} for '{}'.",
            axis, v, src
        ))),
        None => Err(IconError::validation(format!(
            "Icon {} is not a number for '{}'.",
            axis, src
        ))),
    }
}
