//! Node labels and content-derived styling.
//!
//! Labels are `"<name>, <placetype> / <id>"`; the trailing ID keeps two places
//! with the same name apart. Colours come from hashing the record's date span
//! and placetype, so records sharing either cluster visually and the output is
//! identical from run to run.

use sha2::{Digest, Sha256};

use crate::graph::Attributes;
use crate::record::Record;

/// Placeholder for an absent EDTF date.
const UNKNOWN_DATE: &str = "uuuu";

/// Derive a `#rrggbb` colour from the first six hex digits of SHA-256(`s`).
pub fn hex_colour(s: &str) -> String {
    let hash = format!("{:x}", Sha256::digest(s.as_bytes()));
    format!("#{}", &hash[..6])
}

/// Maps records to graph labels and, optionally, style attributes.
#[derive(Debug, Clone, Copy)]
pub struct Labeler {
    styled: bool,
}

impl Labeler {
    pub fn new(styled: bool) -> Self {
        Self { styled }
    }

    /// Label plus attributes for a record. Attributes are empty when unstyled.
    pub fn label(&self, record: &Record) -> (String, Attributes) {
        let label = format!(
            "{}, {} / {}",
            record.display_name(),
            record.placetype,
            record.id
        );

        let attrs = if self.styled {
            style(record)
        } else {
            Attributes::new()
        };

        (label, attrs)
    }
}

impl Default for Labeler {
    fn default() -> Self {
        Self::new(true)
    }
}

fn style(record: &Record) -> Attributes {
    let dates = format!(
        "{} - {}",
        record.inception.as_deref().unwrap_or(UNKNOWN_DATE),
        record.cessation.as_deref().unwrap_or(UNKNOWN_DATE)
    );

    let mut attrs = Attributes::new();
    attrs.insert("shape".to_string(), "rectangle".to_string());
    attrs.insert("style".to_string(), "filled".to_string());
    attrs.insert("color".to_string(), hex_colour(&record.placetype));
    attrs.insert("fillcolor".to_string(), hex_colour(&dates));
    attrs.insert("fontcolor".to_string(), "#ffffff".to_string());
    attrs
}
