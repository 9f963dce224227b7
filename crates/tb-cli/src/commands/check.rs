use std::path::Path;

use colored::Colorize;

pub fn run(catalog: &Path) -> Result<(), String> {
    let issues = tb_engine::validate_catalog_json(&super::read(catalog)?)
        .map_err(|e| format!("{}: {e}", catalog.display()))?;

    let errors = issues.iter().filter(|i| i.is_error).count();
    let warnings = issues.len() - errors;

    for issue in &issues {
        let level = if issue.is_error {
            "error".red().bold()
        } else {
            "warning".yellow().bold()
        };
        println!("  {level}: {}: {}", issue.entity, issue.message);
    }

    if errors > 0 {
        return Err(format!("{errors} error(s), {warnings} warning(s) in {}", catalog.display()));
    }

    println!(
        "  All checks passed for {} {}",
        catalog.display(),
        format!("({warnings} warning(s))").dimmed()
    );
    Ok(())
}
