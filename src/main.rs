use anyhow::Context;
use dialoguer::theme::ColorfulTheme;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use safety_plan::app::PlanController;
use safety_plan::config::ExportConfig;
use safety_plan::storage::FileStore;
use safety_plan::ui::prompt::{DialoguerInteraction, WizardOutcome, run_wizard};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "safety_plan=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ExportConfig::default();
    let store = FileStore::new(&config.store_dir);
    let mut controller = PlanController::resume(config, Box::new(store))
        .context("failed to load the previously saved plan")?;

    println!("BAUER LABS Crisis Response Planner");

    let theme = ColorfulTheme::default();
    let mut ui = DialoguerInteraction::new(&theme);
    match run_wizard(&mut controller, &mut ui, chrono::Utc::now)? {
        WizardOutcome::Exported(report) => {
            println!("Saved {}", report.pdf_path.display());
        }
        WizardOutcome::Cancelled => {
            tracing::info!("wizard closed without exporting");
        }
    }

    Ok(())
}
