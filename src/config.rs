//! Configuration - Icon Collection Resolver And Render Options

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::IconError;
use crate::validation::{normalize_icon, CanonicalIcon, RawIconSpec};

/// The caller's configuration object.
pub type ConfigMap = Map<String, Value>;

pub const ICON_KEY: &str = "icon";
pub const ICONS_KEY: &str = "icons";
pub const FINGERPRINTS_KEY: &str = "fingerprints";
pub const PUBLIC_PATH_KEY: &str = "publicPath";

/// Icons pulled out of a configuration, plus everything that was left.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedConfig {
    pub icons: Vec<CanonicalIcon>,
    /// The input configuration without `icon` / `icons`. Feeding it back
    /// into `resolve_icons` yields no icons.
    pub residual: ConfigMap,
}

/// Extract and normalize every declared icon, in declaration order.
///
/// `icon` wins over `icons` when it holds a value. A single object is
/// treated as a one-element list.
pub fn resolve_icons(mut config: ConfigMap) -> Result<ResolvedConfig, IconError> {
    let icon = config.remove(ICON_KEY);
    let icons = config.remove(ICONS_KEY);

    let declared = match (icon, icons) {
        (Some(value), _) if is_truthy(&value) => value,
        (_, Some(value)) if is_truthy(&value) => value,
        _ => {
            return Ok(ResolvedConfig {
                icons: Vec::new(),
                residual: config,
            })
        }
    };

    let entries = match declared {
        Value::Array(entries) => entries,
        single => vec![single],
    };

    let icons = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let raw: RawIconSpec = serde_json::from_value(entry).map_err(|e| {
                IconError::validation(format!("Icon #{} is malformed: {}", index, e))
            })?;
            normalize_icon(raw)
        })
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!("resolved {} icon declaration(s)", icons.len());

    Ok(ResolvedConfig {
        icons,
        residual: config,
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0 && !f.is_nan()),
        _ => true,
    }
}

/// When rendition filenames carry a content hash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Fingerprint {
    Off,
    /// Every emitted file is fingerprinted, icons included.
    #[default]
    All,
    /// Only icon renditions are fingerprinted.
    IconsOnly,
    /// Only the manifest file is fingerprinted; icons keep plain names.
    ManifestOnly,
}

impl Fingerprint {
    pub fn applies_to_icons(self) -> bool {
        matches!(self, Self::All | Self::IconsOnly)
    }
}

impl FromStr for Fingerprint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "true" | "on" | "all" => Ok(Self::All),
            "false" | "off" => Ok(Self::Off),
            "icons" => Ok(Self::IconsOnly),
            "manifest" => Ok(Self::ManifestOnly),
            other => Err(format!(
                "Unknown fingerprint mode: {} (expected true / false / icons / manifest)",
                other
            )),
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Off => "false",
            Self::All => "true",
            Self::IconsOnly => "icons",
            Self::ManifestOnly => "manifest",
        })
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Declared {
            Flag(bool),
            Mode(String),
        }

        match Declared::deserialize(deserializer)? {
            Declared::Flag(true) => Ok(Self::All),
            Declared::Flag(false) => Ok(Self::Off),
            Declared::Mode(mode) => mode.parse().map_err(de::Error::custom),
        }
    }
}

/// Everything the render pipeline needs besides the icons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub fingerprint: Fingerprint,
    /// Prefix for public URLs, e.g. `/` or `https://cdn.example.com/`.
    pub public_path: String,
}

impl RenderOptions {
    pub fn new(fingerprint: Fingerprint, public_path: impl Into<String>) -> Self {
        Self {
            fingerprint,
            public_path: public_path.into(),
        }
    }

    /// Read `fingerprints` and `publicPath` from a (residual) configuration.
    pub fn from_config(config: &ConfigMap) -> Result<Self, IconError> {
        let fingerprint = match config.get(FINGERPRINTS_KEY) {
            None | Some(Value::Null) => Fingerprint::default(),
            Some(value) => Fingerprint::deserialize(value)
                .map_err(|e| IconError::validation(format!("Invalid fingerprints: {}", e)))?,
        };

        let public_path = match config.get(PUBLIC_PATH_KEY) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(path)) => path.clone(),
            Some(other) => {
                return Err(IconError::validation(format!(
                    "Invalid publicPath: expected a string, got {}",
                    other
                )))
            }
        };

        Ok(Self {
            fingerprint,
            public_path,
        })
    }
}
