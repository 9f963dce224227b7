use std::path::Path;

use tb_engine::Combatant;

pub fn run(catalog: &Path, combatant: &Path) -> Result<(), String> {
    let catalog = super::load_catalog(catalog)?;
    let combatant = super::load_combatant(combatant, &catalog)?;

    let snapshot = combatant.snapshot();
    let restored = Combatant::restore(snapshot.clone(), &catalog).map_err(|e| e.to_string())?;
    if restored.snapshot() != snapshot {
        return Err(format!("snapshot of '{}' does not round-trip", combatant.id()));
    }

    let json = serde_json::to_string_pretty(&snapshot).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}
