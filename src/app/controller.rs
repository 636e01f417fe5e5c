//! Plan controller and export coordination
//!
//! The controller owns the in-progress plan and the step cursor. Edits are
//! applied in place until the user finishes the last step; from then on the
//! plan is frozen and exported as a JSON snapshot, a PDF and optionally a
//! PNG preview.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::app::state::{StepEvent, StepMachine, WizardState, WizardStep};
use crate::config::{ConfigError, ExportConfig};
use crate::domain::plan::{
    ContactField, EntryEdit, PlanError, PlanSection, ProfessionalField, SafetyPlan,
};
use crate::storage::store::atomic_write;
use crate::storage::{PLAN_KEY, PlanSnapshot, SnapshotStore, StorageError, load_snapshot, save_snapshot};
use crate::ui::layout::{DocumentLayout, LayoutError};
use crate::ui::pdf::{PdfError, render_pdf};
use crate::ui::renderer::{PreviewRenderer, RendererError};

/// Notice shown after a successful export
pub const SUCCESS_MESSAGE: &str = "Safety Plan saved and downloaded successfully!";

/// Application errors that can occur during controller operations
#[derive(Debug, Error)]
pub enum AppError {
    #[error("The plan has been exported and can no longer be edited")]
    PlanFrozen,
    #[error("Export is only available from the last step (currently on step {0})")]
    NotOnLastStep(usize),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("Layout failed: {0}")]
    Layout(#[from] LayoutError),
    #[error("PDF generation failed: {0}")]
    Pdf(#[from] PdfError),
    #[error("Preview rendering failed: {0}")]
    Preview(#[from] RendererError),
    #[error("Saving the plan failed: {0}")]
    Storage(#[from] StorageError),
    #[error("Invalid export configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Outcome of a successful export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub pdf_path: PathBuf,
    pub preview_path: Option<PathBuf>,
    /// Store key the JSON snapshot was written under
    pub snapshot_key: &'static str,
    /// Layout cursor after the last section, in millimetres
    pub final_y: f32,
    /// Section content runs past the bottom of the page
    pub overflow: bool,
}

/// `safety-plan-YYYY-MM-DD.pdf`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("safety-plan-{}.pdf", date.format("%Y-%m-%d"))
}

/// `safety-plan-YYYY-MM-DD.png`
pub fn preview_file_name(date: NaiveDate) -> String {
    format!("safety-plan-{}.png", date.format("%Y-%m-%d"))
}

/// Coordinates plan editing, step navigation and export
pub struct PlanController {
    plan: SafetyPlan,
    state: WizardState,
    config: ExportConfig,
    store: Box<dyn SnapshotStore>,
}

impl PlanController {
    /// Starts a fresh session with an empty, pre-seeded plan
    pub fn new(config: ExportConfig, store: Box<dyn SnapshotStore>) -> Self {
        Self {
            plan: SafetyPlan::new(),
            state: WizardState::default(),
            config,
            store,
        }
    }

    /// Starts a session from the last stored snapshot, if there is one
    pub fn resume(config: ExportConfig, store: Box<dyn SnapshotStore>) -> Result<Self, AppError> {
        let mut controller = Self::new(config, store);
        if let Some(snapshot) = load_snapshot(controller.store.as_ref())? {
            snapshot.data.validate()?;
            tracing::info!(saved_at = %snapshot.timestamp, "resumed plan from snapshot");
            controller.plan = snapshot.data;
        }
        Ok(controller)
    }

    pub fn plan(&self) -> &SafetyPlan {
        &self.plan
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Current step, or `None` once finished
    pub fn current_step(&self) -> Option<WizardStep> {
        self.state.step()
    }

    pub fn set_entry_text(
        &mut self,
        section: PlanSection,
        index: usize,
        value: impl Into<String>,
    ) -> Result<(), AppError> {
        self.apply_edit(section, index, EntryEdit::Text(value.into()))
    }

    pub fn set_contact_field(
        &mut self,
        index: usize,
        field: ContactField,
        value: impl Into<String>,
    ) -> Result<(), AppError> {
        self.apply_edit(
            PlanSection::SupportContacts,
            index,
            EntryEdit::Contact(field, value.into()),
        )
    }

    pub fn set_professional_field(
        &mut self,
        index: usize,
        field: ProfessionalField,
        value: impl Into<String>,
    ) -> Result<(), AppError> {
        self.apply_edit(
            PlanSection::Professionals,
            index,
            EntryEdit::Professional(field, value.into()),
        )
    }

    /// Applies an edit unless the plan is already frozen
    pub fn apply_edit(
        &mut self,
        section: PlanSection,
        index: usize,
        edit: EntryEdit,
    ) -> Result<(), AppError> {
        if self.state.is_finished() {
            return Err(AppError::PlanFrozen);
        }
        self.plan.apply_edit(section, index, edit)?;
        Ok(())
    }

    /// Moves to the next step (clamped at the last one)
    pub fn advance(&mut self) -> WizardState {
        self.state = StepMachine::process_event(self.state, StepEvent::Next);
        self.state
    }

    /// Moves to the previous step (clamped at the first one)
    pub fn retreat(&mut self) -> WizardState {
        self.state = StepMachine::process_event(self.state, StepEvent::Previous);
        self.state
    }

    /// Freezes the plan and exports it
    ///
    /// Writes the JSON snapshot first, so the entered plan is kept even when
    /// the configuration or the output files fail afterwards. Then the PDF
    /// and the optional preview are written. On failure the wizard returns to
    /// the last step so the export can be retried; the error is returned for
    /// the caller to report.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Result<ExportReport, AppError> {
        match self.state {
            WizardState::Finished => return Err(AppError::PlanFrozen),
            WizardState::Editing(step) if !step.is_last() => {
                return Err(AppError::NotOnLastStep(step.number()));
            }
            WizardState::Editing(_) => {}
        }

        let previous = self.state;
        self.state = StepMachine::process_event(self.state, StepEvent::Finish);

        match self.export(now) {
            Ok(report) => Ok(report),
            Err(err) => {
                tracing::error!(error = %err, "export failed");
                self.state = previous;
                Err(err)
            }
        }
    }

    fn export(&mut self, now: DateTime<Utc>) -> Result<ExportReport, AppError> {
        let snapshot = PlanSnapshot::new(now, self.plan.clone());
        save_snapshot(self.store.as_mut(), &snapshot)?;

        self.config.validate()?;

        let layout = DocumentLayout::build(&self.plan)?;
        let overflow = layout.overflows();
        if overflow {
            tracing::warn!(
                final_y = layout.final_y,
                page_height = layout.page.height,
                "plan content runs past the bottom of the page"
            );
        }

        let date = now.date_naive();
        let pdf_path = self.config.output_dir.join(export_file_name(date));
        let pdf = render_pdf(&layout)?;
        write_output(&pdf_path, &pdf)?;

        let preview_path = if self.config.preview {
            let mut renderer = PreviewRenderer::new(self.config.preview_scale);
            if let Some(font_path) = &self.config.font_path {
                renderer = renderer.with_font(PreviewRenderer::load_font(font_path)?);
            }
            let path = self.config.output_dir.join(preview_file_name(date));
            write_output(&path, &renderer.render_png(&layout)?)?;
            Some(path)
        } else {
            None
        };

        tracing::info!(
            pdf = %pdf_path.display(),
            preview = ?preview_path,
            final_y = layout.final_y,
            "exported safety plan"
        );

        Ok(ExportReport {
            pdf_path,
            preview_path,
            snapshot_key: PLAN_KEY,
            final_y: layout.final_y,
            overflow,
        })
    }
}

fn write_output(path: &Path, data: &[u8]) -> Result<(), AppError> {
    atomic_write(path, data).map_err(|source| AppError::Write {
        path: path.to_path_buf(),
        source,
    })
}
