//! Terminal wizard
//!
//! Walks the user through the six steps, one field at a time. The
//! interaction surface is a trait so the loop can be driven by dialoguer in
//! the binary and by scripted answers in tests.

use chrono::{DateTime, Utc};
use dialoguer::{Input, theme::ColorfulTheme};

use crate::app::controller::{AppError, ExportReport, PlanController, SUCCESS_MESSAGE};
use crate::app::state::{StepEvent, WizardStep};
use crate::domain::plan::{ContactField, EntryEdit, EntryKind, PlanSection, ProfessionalField};
use crate::domain::template::{SectionTemplate, template_for};

/// Typed in place of a value to go back one step
pub const BACK_COMMAND: &str = "/back";
/// Typed in place of a value to leave without exporting
pub const QUIT_COMMAND: &str = "/quit";

/// Answer to a single field prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    Value(String),
    /// Leave the current value unchanged
    Keep,
    Back,
    Cancel,
}

/// Message shown to the user outside of prompts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Warning(String),
    Failure(String),
}

/// How the wizard ended
#[derive(Debug, Clone, PartialEq)]
pub enum WizardOutcome {
    Exported(ExportReport),
    Cancelled,
}

/// Interaction surface used by [`run_wizard`]
pub trait WizardInteraction {
    fn announce_step(&mut self, step: WizardStep, template: &SectionTemplate);
    fn prompt_field(&mut self, label: &str, current: &str) -> PromptResponse;
    fn notify(&mut self, notice: Notice);
}

/// Default interactive implementation backed by `dialoguer`
pub struct DialoguerInteraction<'a> {
    theme: &'a ColorfulTheme,
}

impl<'a> DialoguerInteraction<'a> {
    pub fn new(theme: &'a ColorfulTheme) -> Self {
        Self { theme }
    }
}

impl WizardInteraction for DialoguerInteraction<'_> {
    fn announce_step(&mut self, step: WizardStep, template: &SectionTemplate) {
        println!();
        println!("{}", progress_bar(step, 30));
        println!("Step {}: {}", step.number(), template.step_title);
        println!("{}", template.step_prompt);
        println!("(type {BACK_COMMAND} to go back, {QUIT_COMMAND} to leave without saving)");
    }

    fn prompt_field(&mut self, label: &str, current: &str) -> PromptResponse {
        let mut input = Input::<String>::with_theme(self.theme)
            .with_prompt(label)
            .allow_empty(true);
        if !current.is_empty() {
            input = input.with_initial_text(current);
        }

        let response = match input.interact_text() {
            Ok(value) => value,
            Err(_) => return PromptResponse::Cancel,
        };
        parse_response(&response, current)
    }

    fn notify(&mut self, notice: Notice) {
        match notice {
            Notice::Success(message) => println!("\u{2714} {message}"),
            Notice::Warning(message) => eprintln!("! {message}"),
            Notice::Failure(message) => eprintln!("\u{2718} {message}"),
        }
    }
}

/// Interprets raw input, recognising the wizard commands
pub fn parse_response(raw: &str, current: &str) -> PromptResponse {
    match raw.trim() {
        BACK_COMMAND => PromptResponse::Back,
        QUIT_COMMAND => PromptResponse::Cancel,
        _ if raw == current => PromptResponse::Keep,
        _ => PromptResponse::Value(raw.to_string()),
    }
}

/// Text progress bar for the current step
pub fn progress_bar(step: WizardStep, width: usize) -> String {
    let filled = (step.progress() * width as f32).round() as usize;
    format!(
        "[{}{}] {}/{}",
        "#".repeat(filled),
        "-".repeat(width.saturating_sub(filled)),
        step.number(),
        crate::app::state::STEP_COUNT
    )
}

/// Runs the wizard until the plan is exported or the user quits
///
/// Export failures are reported through [`WizardInteraction::notify`]; the
/// wizard then stays on the last step so the user can try again or quit.
pub fn run_wizard(
    controller: &mut PlanController,
    ui: &mut dyn WizardInteraction,
    clock: impl Fn() -> DateTime<Utc>,
) -> Result<WizardOutcome, AppError> {
    while let Some(step) = controller.current_step() {
        let section = step.section();
        let template = template_for(section);
        ui.announce_step(step, template);

        match collect_step(controller, ui, section, template)? {
            StepResult::Back => {
                controller.retreat();
                continue;
            }
            StepResult::Cancel => return Ok(WizardOutcome::Cancelled),
            StepResult::Done => {}
        }

        match controller.state().primary_action() {
            Some(StepEvent::Finish) => {
                match controller.finish(clock()) {
                    Ok(report) => {
                        if report.overflow {
                            ui.notify(Notice::Warning(
                                "Some entries run past the bottom of the page".to_string(),
                            ));
                        }
                        ui.notify(Notice::Success(SUCCESS_MESSAGE.to_string()));
                        return Ok(WizardOutcome::Exported(report));
                    }
                    Err(err) => {
                        ui.notify(Notice::Failure(format!("Export failed: {err}")));
                    }
                }
            }
            Some(_) => {
                controller.advance();
            }
            None => break,
        }
    }

    Ok(WizardOutcome::Cancelled)
}

enum StepResult {
    Done,
    Back,
    Cancel,
}

fn collect_step(
    controller: &mut PlanController,
    ui: &mut dyn WizardInteraction,
    section: PlanSection,
    template: &SectionTemplate,
) -> Result<StepResult, AppError> {
    // snapshot of (id, field values) so prompts don't hold a borrow of the plan
    let entries: Vec<(String, Vec<String>)> = controller
        .plan()
        .entries(section)
        .iter()
        .map(|entry| {
            let mut values = vec![entry.primary().to_string()];
            values.extend(entry.secondary().map(str::to_string));
            (entry.id().to_string(), values)
        })
        .collect();

    for (index, (id, values)) in entries.iter().enumerate() {
        for (field, current) in values.iter().enumerate() {
            let label = field_label(template, id, index, field);
            match ui.prompt_field(&label, current) {
                PromptResponse::Value(value) => {
                    controller.apply_edit(section, index, edit_for(section, field, value))?;
                }
                PromptResponse::Keep => {}
                PromptResponse::Back => return Ok(StepResult::Back),
                PromptResponse::Cancel => return Ok(StepResult::Cancel),
            }
        }
    }

    Ok(StepResult::Done)
}

fn field_label(template: &SectionTemplate, id: &str, index: usize, field: usize) -> String {
    let name = template.field_labels.get(field).copied().unwrap_or("Value");
    match template.format.secondary_label() {
        None => format!("{name} #{id}"),
        Some(_) => format!("{}. {name}", index + 1),
    }
}

fn edit_for(section: PlanSection, field: usize, value: String) -> EntryEdit {
    match section.entry_kind() {
        EntryKind::Simple => EntryEdit::Text(value),
        EntryKind::Contact if field == 0 => EntryEdit::Contact(ContactField::Name, value),
        EntryKind::Contact => EntryEdit::Contact(ContactField::Contact, value),
        EntryKind::Professional if field == 0 => {
            EntryEdit::Professional(ProfessionalField::Name, value)
        }
        EntryKind::Professional => EntryEdit::Professional(ProfessionalField::Phone, value),
    }
}
