//! Static section templates
//!
//! Every section carries its document title, description line, entry format
//! and footer flag in one record, so nothing is ever derived from the title
//! string at render time.

use crate::domain::plan::{EntryKind, PlanSection};

/// Heading printed at the top of the exported document
pub const DOCUMENT_TITLE: &str = "BAUER LABS SAFETY PLAN";

/// Fixed line appended to sections flagged with a hotline footer
pub const HOTLINE_LINE: &str = "National Crisis Line: 1-800-273-8255 (TALK)";

/// Notice printed at the bottom of every exported page
pub const FOOTER_NOTICE: &str =
    "\u{a9} 2024 BAUER LABS Crisis Response Platform - Confidential Safety Plan";

/// How entries of a section are written into the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFormat {
    /// `"{n}. {text}"`
    Simple,
    /// `"{n}. Name: {name}"` then `"   Contact: {contact}"`
    Contact,
    /// `"{n}. Name: {name}"` then `"   Phone: {phone}"`
    Professional,
}

impl EntryFormat {
    /// Label of the second line for paired formats
    pub fn secondary_label(self) -> Option<&'static str> {
        match self {
            EntryFormat::Simple => None,
            EntryFormat::Contact => Some("Contact"),
            EntryFormat::Professional => Some("Phone"),
        }
    }

    /// Entry shape this format renders
    pub fn entry_kind(self) -> EntryKind {
        match self {
            EntryFormat::Simple => EntryKind::Simple,
            EntryFormat::Contact => EntryKind::Contact,
            EntryFormat::Professional => EntryKind::Professional,
        }
    }
}

/// Compiled-in definition of one plan section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionTemplate {
    pub section: PlanSection,
    /// Title drawn inside the header band
    pub title: &'static str,
    /// Explanatory line drawn below the band
    pub description: &'static str,
    pub format: EntryFormat,
    /// Append [`HOTLINE_LINE`] after the entries
    pub hotline_footer: bool,
    /// Short title shown by the interactive wizard
    pub step_title: &'static str,
    /// Question shown by the interactive wizard
    pub step_prompt: &'static str,
    /// Field labels shown by the wizard for each entry
    pub field_labels: &'static [&'static str],
}

/// Templates in document order
pub static TEMPLATES: [SectionTemplate; 6] = [
    SectionTemplate {
        section: PlanSection::WarningSigns,
        title: "STEP 1: WARNING SIGNS",
        description: "What thoughts, mood, or behavior might indicate a crisis is developing?",
        format: EntryFormat::Simple,
        hotline_footer: false,
        step_title: "Warning Signs",
        step_prompt: "What thoughts, mood, or behavior might indicate a crisis is developing?",
        field_labels: &["Warning Signs"],
    },
    SectionTemplate {
        section: PlanSection::CopingStrategies,
        title: "STEP 2: INTERNAL COPING STRATEGIES",
        description: "Things I can do to take my mind off my problems without contacting another person:",
        format: EntryFormat::Simple,
        hotline_footer: false,
        step_title: "Coping Strategies",
        step_prompt: "What can you do by yourself to take your mind off your problems?",
        field_labels: &["Coping Strategies"],
    },
    SectionTemplate {
        section: PlanSection::SocialSettings,
        title: "STEP 3: PEOPLE AND SOCIAL SETTINGS",
        description: "People and places that provide distraction and support:",
        format: EntryFormat::Simple,
        hotline_footer: false,
        step_title: "People & Places",
        step_prompt: "List people and places that can provide distraction",
        field_labels: &["People & Places"],
    },
    SectionTemplate {
        section: PlanSection::SupportContacts,
        title: "STEP 4: PEOPLE I CAN ASK FOR HELP",
        description: "People I can reach out to when in crisis:",
        format: EntryFormat::Contact,
        hotline_footer: false,
        step_title: "Support Network",
        step_prompt: "Who can you reach out to for help during a crisis?",
        field_labels: &["Name", "Contact"],
    },
    SectionTemplate {
        section: PlanSection::Professionals,
        title: "STEP 5: PROFESSIONALS I CAN CONTACT",
        description: "Professional resources and crisis hotlines:",
        format: EntryFormat::Professional,
        hotline_footer: true,
        step_title: "Professional Help",
        step_prompt: "List medical professionals and crisis hotlines",
        field_labels: &["Name", "Phone"],
    },
    SectionTemplate {
        section: PlanSection::SafetyMeasures,
        title: "STEP 6: MAKING THE ENVIRONMENT SAFER",
        description: "Steps to make my environment safer:",
        format: EntryFormat::Simple,
        hotline_footer: false,
        step_title: "Safety Measures",
        step_prompt: "Steps to make your environment safer",
        field_labels: &["Safety Measures"],
    },
];

/// Template for a section
pub fn template_for(section: PlanSection) -> &'static SectionTemplate {
    // TEMPLATES is indexed in the same order as PlanSection::ALL
    &TEMPLATES[section.step_number() - 1]
}
