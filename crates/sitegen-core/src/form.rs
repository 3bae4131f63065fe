//! Form values that feed every generation request.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Style and content inputs for the generator.
///
/// Every field defaults to an empty string, so a partial or missing record
/// carried over from a previous step never fails to load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormValues {
    /// CSS library the generated markup should target (e.g. "tailwind")
    pub css_library: String,
    /// Color scheme description
    pub colors: String,
    /// Street address for the map section
    pub map_address: String,
    /// City for the map section
    pub map_city: String,
    /// Free-text notes passed along with each request
    pub additional_info: String,
}

/// A single form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    CssLibrary,
    Colors,
    MapAddress,
    MapCity,
    AdditionalInfo,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::CssLibrary,
        FormField::Colors,
        FormField::MapAddress,
        FormField::MapCity,
        FormField::AdditionalInfo,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::CssLibrary => "cssLibrary",
            Self::Colors => "colors",
            Self::MapAddress => "mapAddress",
            Self::MapCity => "mapCity",
            Self::AdditionalInfo => "additionalInfo",
        }
    }
}

/// Errors that can occur when loading form values.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("Failed to read form file {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to parse form file {path}: {message}")]
    Parse { path: String, message: String },
}

impl FormValues {
    /// Load form values from a JSON or TOML file.
    ///
    /// A missing file yields empty defaults. The format is chosen by extension,
    /// JSON unless the file ends in `.toml`.
    pub fn load(path: &Path) -> Result<Self, FormError> {
        if !path.exists() {
            tracing::debug!("No form file at {}, using empty values", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| FormError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let is_toml = path.extension().and_then(|e| e.to_str()) == Some("toml");
        let parsed = if is_toml {
            toml::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| FormError::Parse {
            path: path.display().to_string(),
            message,
        })
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::CssLibrary => &self.css_library,
            FormField::Colors => &self.colors,
            FormField::MapAddress => &self.map_address,
            FormField::MapCity => &self.map_city,
            FormField::AdditionalInfo => &self.additional_info,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::CssLibrary => self.css_library = value,
            FormField::Colors => self.colors = value,
            FormField::MapAddress => self.map_address = value,
            FormField::MapCity => self.map_city = value,
            FormField::AdditionalInfo => self.additional_info = value,
        }
    }

    /// Apply every field present in `patch`.
    pub fn apply(&mut self, patch: FormPatch) {
        let FormPatch {
            css_library,
            colors,
            map_address,
            map_city,
            additional_info,
        } = patch;

        let updates = [
            (FormField::CssLibrary, css_library),
            (FormField::Colors, colors),
            (FormField::MapAddress, map_address),
            (FormField::MapCity, map_city),
            (FormField::AdditionalInfo, additional_info),
        ];
        for (field, value) in updates {
            if let Some(value) = value {
                self.set(field, value);
            }
        }
    }

    /// One-line `key: "value"` summary shown above the editor.
    pub fn summary(&self) -> String {
        FormField::ALL
            .iter()
            .map(|field| {
                let quoted = serde_json::to_string(self.get(*field))
                    .unwrap_or_else(|_| format!("\"{}\"", self.get(*field)));
                format!("{}: {}", field.key(), quoted)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Partial form update; absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormPatch {
    pub css_library: Option<String>,
    pub colors: Option<String>,
    pub map_address: Option<String>,
    pub map_city: Option<String>,
    pub additional_info: Option<String>,
}
