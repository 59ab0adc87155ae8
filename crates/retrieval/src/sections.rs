//! Batch analysis of a report, one question per (section, field) pair.

use crate::answer::StructuredAnswer;
use serde::{Deserialize, Serialize};

/// Answer for one field of a section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAnswer {
    /// Display title, e.g. `Revenue Growth` for `revenue_growth`
    pub field: String,
    pub answer: StructuredAnswer,
}

/// All field answers of one section, in request order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionAnalysis {
    pub section: String,
    pub fields: Vec<FieldAnswer>,
}

/// Turn a snake_case field key into a display title.
///
/// Underscores become spaces; a letter is uppercased when it starts a run of
/// letters and lowercased otherwise, so `r_and_d` reads `R And D`.
pub fn field_title(field: &str) -> String {
    let mut title = String::with_capacity(field.len());
    let mut in_word = false;
    for ch in field.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_alphabetic() {
            if in_word {
                title.extend(ch.to_lowercase());
            } else {
                title.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            title.push(ch);
            in_word = false;
        }
    }
    title
}

/// Question asked for one field of a section
pub fn section_question(field_title: &str, section: &str) -> String {
    format!("What are the {field_title} in the {section} section?")
}
