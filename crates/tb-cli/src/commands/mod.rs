pub mod check;
pub mod simulate;
pub mod snapshot;

use std::fs;
use std::path::Path;

use tb_engine::model::CombatantData;
use tb_engine::{Combatant, InMemoryCatalog};
use tracing::debug;

fn read(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))
}

/// Load and validate a JSON skill catalog.
fn load_catalog(path: &Path) -> Result<InMemoryCatalog, String> {
    let catalog = InMemoryCatalog::from_json_str(&read(path)?)
        .map_err(|e| format!("{}: {e}", path.display()))?;
    debug!(path = %path.display(), skills = catalog.len(), "catalog loaded");
    Ok(catalog)
}

/// Load a combatant definition, resolving its skills through the catalog.
fn load_combatant(path: &Path, catalog: &InMemoryCatalog) -> Result<Combatant, String> {
    let data: CombatantData = serde_json::from_str(&read(path)?)
        .map_err(|e| format!("{}: {e}", path.display()))?;
    let combatant =
        Combatant::from_data(data, catalog).map_err(|e| format!("{}: {e}", path.display()))?;
    debug!(path = %path.display(), id = combatant.id(), "combatant loaded");
    Ok(combatant)
}
