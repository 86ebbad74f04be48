//! Split one combined completion into its pro, con and moderator sections.
//!
//! The model is asked to emit the three markers in order. Each section runs
//! from its marker to the next known marker or the end of the text, so one
//! missing marker only costs its own section. A marker that starts a line
//! wins over one quoted mid-sentence, so an echoed marker in a preamble is
//! not mistaken for the section itself.

use agora_core::{DebateTurn, Role};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

pub const PRO_MARKER: &str = "===PRO_AGENT===";
pub const CON_MARKER: &str = "===CON_AGENT===";
pub const MODERATOR_MARKER: &str = "===MODERATOR===";

const MARKERS: [&str; 3] = [PRO_MARKER, CON_MARKER, MODERATOR_MARKER];

struct SectionPattern {
    at_line_start: Regex,
    anywhere: Regex,
}

impl SectionPattern {
    fn new(marker: &str) -> Option<Self> {
        let terminators = MARKERS
            .iter()
            .map(|m| regex::escape(m))
            .collect::<Vec<_>>()
            .join("|");
        let body = format!(r"{}(.*?)(?:{terminators}|\z)", regex::escape(marker));

        Some(Self {
            at_line_start: Regex::new(&format!("(?ms)^{body}")).ok()?,
            anywhere: Regex::new(&format!("(?s){body}")).ok()?,
        })
    }

    fn captures<'t>(&self, text: &'t str) -> Option<regex::Captures<'t>> {
        self.at_line_start
            .captures(text)
            .or_else(|| self.anywhere.captures(text))
    }
}

static PRO_SECTION: Lazy<Option<SectionPattern>> = Lazy::new(|| SectionPattern::new(PRO_MARKER));
static CON_SECTION: Lazy<Option<SectionPattern>> = Lazy::new(|| SectionPattern::new(CON_MARKER));
static MODERATOR_SECTION: Lazy<Option<SectionPattern>> =
    Lazy::new(|| SectionPattern::new(MODERATOR_MARKER));

fn pattern_for(role: Role) -> Option<&'static SectionPattern> {
    match role {
        Role::Pro => PRO_SECTION.as_ref(),
        Role::Con => CON_SECTION.as_ref(),
        Role::Moderator => MODERATOR_SECTION.as_ref(),
        Role::User => None,
    }
}

/// Text stored in place of a section that could not be parsed.
#[must_use]
pub fn placeholder(role: Role) -> String {
    format!(
        "[Error: could not parse the {} section of the model response]",
        role.as_str().to_uppercase()
    )
}

/// Trimmed text of the section written for `role`, if present and non-empty.
#[must_use]
pub fn extract_section(text: &str, role: Role) -> Option<String> {
    pattern_for(role)?
        .captures(text)?
        .get(1)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Result of segmenting a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmented {
    pub turn: DebateTurn,
    /// Roles whose section fell back to the placeholder.
    pub missing: Vec<Role>,
}

impl Segmented {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

#[must_use]
pub fn segment(text: &str) -> Segmented {
    let mut missing = Vec::new();
    let mut section = |role: Role| {
        extract_section(text, role).unwrap_or_else(|| {
            warn!("Could not parse the {role} section of the model response");
            missing.push(role);
            placeholder(role)
        })
    };

    let turn = DebateTurn {
        pro: section(Role::Pro),
        con: section(Role::Con),
        moderator: section(Role::Moderator),
    };

    Segmented { turn, missing }
}
