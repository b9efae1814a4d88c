use std::fmt;

use serde::{Deserialize, Serialize};

/// Conversion direction understood by the conversion service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Markup to shorthand notation.
    #[serde(rename = "xml2nonxml")]
    XmlToNonXml,
    /// Shorthand notation to markup.
    #[serde(rename = "nonxml2xml")]
    NonXmlToXml,
}

impl Direction {
    /// Wire value sent as the `direction` form field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::XmlToNonXml => "xml2nonxml",
            Self::NonXmlToXml => "nonxml2xml",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    Extract,
    Normalize,
    /// Stage A: fragment to shorthand.
    ToShorthand,
    /// Stage B: shorthand back to markup, written as the intermediate output.
    ToMarkup,
    /// Stage C: round-tripped markup to shorthand, written as the primary output.
    RoundTrip,
}

impl Stage {
    /// Name recorded in failure markers.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Extract => "extract",
            Self::Normalize => "normalize",
            Self::ToShorthand => "markup-to-shorthand",
            Self::ToMarkup => "shorthand-to-markup",
            Self::RoundTrip => "roundtrip-check",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of running the pipeline over one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    Success,
    /// The document has no element matching the selector; nothing written.
    SkippedNoFragment,
    Failed { stage: Stage, message: String },
}

impl ConversionOutcome {
    /// Text stored in the failure marker, `"<stage>: <message>"`.
    pub fn marker_text(&self) -> Option<String> {
        match self {
            Self::Failed { stage, message } => Some(format!("{stage}: {message}")),
            Self::Success | Self::SkippedNoFragment => None,
        }
    }
}
