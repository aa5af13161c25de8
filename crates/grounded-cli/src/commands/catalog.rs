use clap::Subcommand;
use grounded_core::PhaseCatalog;

use super::CmdResult;

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List breathwork patterns, or show one as JSON
    Breathwork {
        /// Pattern key (e.g. "box"); unknown keys show the default pattern
        key: Option<String>,
    },
    /// List meditation techniques, or show one as JSON
    Meditation {
        /// Technique key (e.g. "dynamic"); unknown keys show the generic meditation
        key: Option<String>,
    },
}

pub fn run(action: CatalogAction) -> CmdResult {
    let catalog = PhaseCatalog::new();
    match action {
        CatalogAction::Breathwork { key: None } => {
            for key in catalog.breathwork_keys() {
                let list = catalog.breathwork(key);
                println!("{key}\t{}", list.name());
            }
        }
        CatalogAction::Breathwork { key: Some(key) } => {
            println!("{}", serde_json::to_string_pretty(catalog.breathwork(&key))?);
        }
        CatalogAction::Meditation { key: None } => {
            for key in catalog.meditation_keys() {
                let list = catalog.meditation(key);
                println!("{key}\t{}", list.name());
            }
        }
        CatalogAction::Meditation { key: Some(key) } => {
            println!("{}", serde_json::to_string_pretty(catalog.meditation(&key))?);
        }
    }
    Ok(())
}
