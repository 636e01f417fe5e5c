//! Safety plan data model
//!
//! A plan is a fixed set of six sections. Each section holds an ordered list
//! of entries that is seeded when the plan is created and only ever edited
//! in place: entries are never added, removed or reordered.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The six sections of a safety plan, in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanSection {
    WarningSigns,
    CopingStrategies,
    SocialSettings,
    SupportContacts,
    Professionals,
    SafetyMeasures,
}

impl PlanSection {
    /// All sections in their fixed order
    pub const ALL: [PlanSection; 6] = [
        PlanSection::WarningSigns,
        PlanSection::CopingStrategies,
        PlanSection::SocialSettings,
        PlanSection::SupportContacts,
        PlanSection::Professionals,
        PlanSection::SafetyMeasures,
    ];

    /// 1-based step number of this section in the wizard and the document
    pub fn step_number(self) -> usize {
        match self {
            PlanSection::WarningSigns => 1,
            PlanSection::CopingStrategies => 2,
            PlanSection::SocialSettings => 3,
            PlanSection::SupportContacts => 4,
            PlanSection::Professionals => 5,
            PlanSection::SafetyMeasures => 6,
        }
    }

    /// Key used for this section in the persisted JSON snapshot
    pub fn json_key(self) -> &'static str {
        match self {
            PlanSection::WarningSigns => "warningSteps",
            PlanSection::CopingStrategies => "copingStrategies",
            PlanSection::SocialSettings => "socialSettings",
            PlanSection::SupportContacts => "supportContacts",
            PlanSection::Professionals => "professionals",
            PlanSection::SafetyMeasures => "safetyMeasures",
        }
    }

    /// Shape of the entries stored in this section
    pub fn entry_kind(self) -> EntryKind {
        match self {
            PlanSection::SupportContacts => EntryKind::Contact,
            PlanSection::Professionals => EntryKind::Professional,
            _ => EntryKind::Simple,
        }
    }
}

/// Shape of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Simple,
    Contact,
    Professional,
}

/// Free-text line item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleEntry {
    pub id: String,
    pub value: String,
}

/// Person the user can ask for help
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEntry {
    pub id: String,
    pub name: String,
    pub contact: String,
}

/// Professional or agency the user can call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionalEntry {
    pub id: String,
    pub name: String,
    pub phone: String,
}

/// Editable field of a [`ContactEntry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Contact,
}

/// Editable field of a [`ProfessionalEntry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfessionalField {
    Name,
    Phone,
}

/// A single in-place edit, one variant per entry shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryEdit {
    Text(String),
    Contact(ContactField, String),
    Professional(ProfessionalField, String),
}

impl EntryEdit {
    fn kind(&self) -> EntryKind {
        match self {
            EntryEdit::Text(_) => EntryKind::Simple,
            EntryEdit::Contact(..) => EntryKind::Contact,
            EntryEdit::Professional(..) => EntryKind::Professional,
        }
    }
}

/// Read-only view of one entry regardless of its section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRef<'a> {
    Simple(&'a SimpleEntry),
    Contact(&'a ContactEntry),
    Professional(&'a ProfessionalEntry),
}

impl<'a> EntryRef<'a> {
    pub fn kind(&self) -> EntryKind {
        match self {
            EntryRef::Simple(_) => EntryKind::Simple,
            EntryRef::Contact(_) => EntryKind::Contact,
            EntryRef::Professional(_) => EntryKind::Professional,
        }
    }

    pub fn id(&self) -> &'a str {
        match self {
            EntryRef::Simple(e) => &e.id,
            EntryRef::Contact(e) => &e.id,
            EntryRef::Professional(e) => &e.id,
        }
    }

    /// Text of a simple entry, or the name of a paired entry
    pub fn primary(&self) -> &'a str {
        match self {
            EntryRef::Simple(e) => &e.value,
            EntryRef::Contact(e) => &e.name,
            EntryRef::Professional(e) => &e.name,
        }
    }

    /// Second field of a paired entry
    pub fn secondary(&self) -> Option<&'a str> {
        match self {
            EntryRef::Simple(_) => None,
            EntryRef::Contact(e) => Some(&e.contact),
            EntryRef::Professional(e) => Some(&e.phone),
        }
    }
}

/// Errors raised when editing or validating a plan
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("{} has {len} entries, index {index} is out of range", .section.json_key())]
    IndexOutOfRange {
        section: PlanSection,
        index: usize,
        len: usize,
    },
    #[error("{} holds {expected:?} entries, cannot apply a {found:?} edit", .section.json_key())]
    WrongEntryKind {
        section: PlanSection,
        expected: EntryKind,
        found: EntryKind,
    },
    #[error("{} must contain at least one entry", .0.json_key())]
    EmptySection(PlanSection),
}

/// Complete safety plan for one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyPlan {
    pub warning_steps: Vec<SimpleEntry>,
    pub coping_strategies: Vec<SimpleEntry>,
    pub social_settings: Vec<SimpleEntry>,
    pub support_contacts: Vec<ContactEntry>,
    pub professionals: Vec<ProfessionalEntry>,
    pub safety_measures: Vec<SimpleEntry>,
}

impl Default for SafetyPlan {
    fn default() -> Self {
        Self::new()
    }
}

impl SafetyPlan {
    pub const WARNING_SIGN_SLOTS: usize = 3;
    pub const COPING_STRATEGY_SLOTS: usize = 3;
    pub const SOCIAL_SETTING_SLOTS: usize = 2;
    pub const SUPPORT_CONTACT_SLOTS: usize = 2;
    pub const PROFESSIONAL_SLOTS: usize = 1;
    pub const SAFETY_MEASURE_SLOTS: usize = 2;

    /// Creates a fresh plan with empty, pre-seeded entries
    pub fn new() -> Self {
        Self {
            warning_steps: seed_simple(Self::WARNING_SIGN_SLOTS),
            coping_strategies: seed_simple(Self::COPING_STRATEGY_SLOTS),
            social_settings: seed_simple(Self::SOCIAL_SETTING_SLOTS),
            support_contacts: (1..=Self::SUPPORT_CONTACT_SLOTS)
                .map(|i| ContactEntry {
                    id: i.to_string(),
                    name: String::new(),
                    contact: String::new(),
                })
                .collect(),
            professionals: (1..=Self::PROFESSIONAL_SLOTS)
                .map(|i| ProfessionalEntry {
                    id: i.to_string(),
                    name: String::new(),
                    phone: String::new(),
                })
                .collect(),
            safety_measures: seed_simple(Self::SAFETY_MEASURE_SLOTS),
        }
    }

    /// Number of entries in a section
    pub fn entry_count(&self, section: PlanSection) -> usize {
        match section.entry_kind() {
            EntryKind::Simple => self.simple(section).map_or(0, Vec::len),
            EntryKind::Contact => self.support_contacts.len(),
            EntryKind::Professional => self.professionals.len(),
        }
    }

    /// Entries of a section in display order
    pub fn entries(&self, section: PlanSection) -> Vec<EntryRef<'_>> {
        match section {
            PlanSection::SupportContacts => {
                self.support_contacts.iter().map(EntryRef::Contact).collect()
            }
            PlanSection::Professionals => {
                self.professionals.iter().map(EntryRef::Professional).collect()
            }
            _ => self
                .simple(section)
                .map(|entries| entries.iter().map(EntryRef::Simple).collect())
                .unwrap_or_default(),
        }
    }

    /// Replaces the text of a simple entry
    pub fn set_text(
        &mut self,
        section: PlanSection,
        index: usize,
        value: impl Into<String>,
    ) -> Result<(), PlanError> {
        self.apply_edit(section, index, EntryEdit::Text(value.into()))
    }

    /// Replaces one field of a support contact
    pub fn set_contact_field(
        &mut self,
        index: usize,
        field: ContactField,
        value: impl Into<String>,
    ) -> Result<(), PlanError> {
        self.apply_edit(
            PlanSection::SupportContacts,
            index,
            EntryEdit::Contact(field, value.into()),
        )
    }

    /// Replaces one field of a professional
    pub fn set_professional_field(
        &mut self,
        index: usize,
        field: ProfessionalField,
        value: impl Into<String>,
    ) -> Result<(), PlanError> {
        self.apply_edit(
            PlanSection::Professionals,
            index,
            EntryEdit::Professional(field, value.into()),
        )
    }

    /// Applies an edit to the entry at `index` of `section`
    ///
    /// Any string is accepted, including the empty string. The edit kind
    /// must match the section's entry shape.
    pub fn apply_edit(
        &mut self,
        section: PlanSection,
        index: usize,
        edit: EntryEdit,
    ) -> Result<(), PlanError> {
        let expected = section.entry_kind();
        if edit.kind() != expected {
            return Err(PlanError::WrongEntryKind {
                section,
                expected,
                found: edit.kind(),
            });
        }

        let len = self.entry_count(section);
        let out_of_range = PlanError::IndexOutOfRange {
            section,
            index,
            len,
        };

        match edit {
            EntryEdit::Text(value) => {
                let entry = self
                    .simple_mut(section)
                    .and_then(|entries| entries.get_mut(index))
                    .ok_or(out_of_range)?;
                entry.value = value;
            }
            EntryEdit::Contact(field, value) => {
                let entry = self
                    .support_contacts
                    .get_mut(index)
                    .ok_or(out_of_range)?;
                match field {
                    ContactField::Name => entry.name = value,
                    ContactField::Contact => entry.contact = value,
                }
            }
            EntryEdit::Professional(field, value) => {
                let entry = self.professionals.get_mut(index).ok_or(out_of_range)?;
                match field {
                    ProfessionalField::Name => entry.name = value,
                    ProfessionalField::Phone => entry.phone = value,
                }
            }
        }

        Ok(())
    }

    /// Checks that every section still has at least one entry
    ///
    /// Plans built with [`SafetyPlan::new`] always pass; this guards plans
    /// restored from a persisted snapshot.
    pub fn validate(&self) -> Result<(), PlanError> {
        for section in PlanSection::ALL {
            if self.entry_count(section) == 0 {
                return Err(PlanError::EmptySection(section));
            }
        }
        Ok(())
    }

    fn simple(&self, section: PlanSection) -> Option<&Vec<SimpleEntry>> {
        match section {
            PlanSection::WarningSigns => Some(&self.warning_steps),
            PlanSection::CopingStrategies => Some(&self.coping_strategies),
            PlanSection::SocialSettings => Some(&self.social_settings),
            PlanSection::SafetyMeasures => Some(&self.safety_measures),
            PlanSection::SupportContacts | PlanSection::Professionals => None,
        }
    }

    fn simple_mut(&mut self, section: PlanSection) -> Option<&mut Vec<SimpleEntry>> {
        match section {
            PlanSection::WarningSigns => Some(&mut self.warning_steps),
            PlanSection::CopingStrategies => Some(&mut self.coping_strategies),
            PlanSection::SocialSettings => Some(&mut self.social_settings),
            PlanSection::SafetyMeasures => Some(&mut self.safety_measures),
            PlanSection::SupportContacts | PlanSection::Professionals => None,
        }
    }
}

fn seed_simple(count: usize) -> Vec<SimpleEntry> {
    (1..=count)
        .map(|i| SimpleEntry {
            id: i.to_string(),
            value: String::new(),
        })
        .collect()
}
