//! Blocks and their section identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Section identifier of a block.
///
/// The serialized form matches the generator vocabulary (`createNavigation`,
/// `createFooter`, ...), so names round-trip through the browser unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockName {
    /// `<head>` and opening markup of the page
    #[serde(rename = "createHeadInfo")]
    Head,
    #[serde(rename = "createNavigation")]
    Navigation,
    #[serde(rename = "createWelcomeSection")]
    WelcomeSection,
    #[serde(rename = "createMainSection")]
    MainSection,
    #[serde(rename = "createTableSection")]
    TableSection,
    #[serde(rename = "createMap")]
    Map,
    #[serde(rename = "createFooter")]
    Footer,
    /// Trailing block new sections are inserted before
    #[serde(rename = "anchor")]
    Anchor,
}

impl BlockName {
    /// Sections a user can add to the page, in menu order.
    pub const ADDABLE: [BlockName; 6] = [
        BlockName::Navigation,
        BlockName::WelcomeSection,
        BlockName::MainSection,
        BlockName::TableSection,
        BlockName::Map,
        BlockName::Footer,
    ];

    /// Wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Head => "createHeadInfo",
            Self::Navigation => "createNavigation",
            Self::WelcomeSection => "createWelcomeSection",
            Self::MainSection => "createMainSection",
            Self::TableSection => "createTableSection",
            Self::Map => "createMap",
            Self::Footer => "createFooter",
            Self::Anchor => "anchor",
        }
    }

    /// Menu label for the section picker.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Head => "Head",
            Self::Navigation => "Add Navigation",
            Self::WelcomeSection => "Add Welcome",
            Self::MainSection => "Add Main",
            Self::TableSection => "Add Table",
            Self::Map => "Add Map",
            Self::Footer => "Add Footer",
            Self::Anchor => "Document End",
        }
    }

    /// Short description of what the section contains.
    pub fn details(&self) -> &'static str {
        match self {
            Self::Navigation => "Navigation",
            Self::WelcomeSection => "Text | Image",
            Self::MainSection => "Text",
            Self::TableSection => "Table",
            Self::Map => "Text | Map",
            Self::Footer => "Footer",
            Self::Head | Self::Anchor => "Unknown Section",
        }
    }

    /// Whether this section can be requested through add-block.
    pub fn is_addable(&self) -> bool {
        Self::ADDABLE.contains(self)
    }
}

impl fmt::Display for BlockName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unrecognised section identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown block name: {0}")]
pub struct UnknownBlockName(pub String);

impl FromStr for BlockName {
    type Err = UnknownBlockName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = match s.trim() {
            "createHeadInfo" | "head" => Self::Head,
            "createNavigation" | "navigation" => Self::Navigation,
            "createWelcomeSection" | "welcome" => Self::WelcomeSection,
            "createMainSection" | "main" => Self::MainSection,
            "createTableSection" | "table" => Self::TableSection,
            "createMap" | "map" => Self::Map,
            "createFooter" | "footer" => Self::Footer,
            "anchor" => Self::Anchor,
            other => return Err(UnknownBlockName(other.to_string())),
        };
        Ok(name)
    }
}

/// A named HTML fragment with a position in the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Identifier, unique within its document
    pub id: u64,

    /// Section identifier
    pub name: BlockName,

    /// HTML fragment
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_and_short_names() {
        assert_eq!("createFooter".parse::<BlockName>(), Ok(BlockName::Footer));
        assert_eq!("map".parse::<BlockName>(), Ok(BlockName::Map));
        assert!("createSidebar".parse::<BlockName>().is_err());
    }

    #[test]
    fn serializes_with_wire_identifier() {
        let json = serde_json::to_string(&BlockName::WelcomeSection).unwrap();
        assert_eq!(json, "\"createWelcomeSection\"");
    }

    #[test]
    fn only_sections_are_addable() {
        assert!(BlockName::Footer.is_addable());
        assert!(!BlockName::Head.is_addable());
        assert!(!BlockName::Anchor.is_addable());
        assert_eq!(BlockName::Map.details(), "Text | Map");
        assert_eq!(BlockName::Anchor.details(), "Unknown Section");
    }
}
