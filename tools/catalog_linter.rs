/// Catalog Linter: validates catalog data and flags classification hazards.
///
/// Usage: catalog_linter <catalog_dir> [--overlay]
///        catalog_linter --builtin

use prompt_arcade::core::catalog::{Catalog, CatalogSource};
use std::collections::BTreeMap;
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: catalog_linter <catalog_dir> [--overlay]");
        println!("       catalog_linter --builtin");
        println!();
        println!("  --overlay  Lint the directory merged over the built-in catalog");
        process::exit(0);
    }

    let source = if args[1] == "--builtin" {
        match CatalogSource::builtin() {
            Ok(source) => source,
            Err(e) => {
                eprintln!("ERROR: Built-in catalog failed to parse: {}", e);
                process::exit(1);
            }
        }
    } else {
        let overlay = args[2..].iter().any(|a| a == "--overlay");
        match load_dir(Path::new(&args[1]), overlay) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("ERROR: {}", e);
                process::exit(1);
            }
        }
    };

    println!(
        "Loaded {} categories, {} modifier tables, {} skeletons",
        source.categories.len(),
        source.modifier_tables.len(),
        source.skeletons.len()
    );

    let (errors, warnings) = match source.build() {
        Ok(catalog) => (Vec::new(), lint_catalog(&catalog)),
        Err(e) => (vec![e.to_string()], Vec::new()),
    };

    println!("\n=== Catalog Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn load_dir(dir: &Path, overlay: bool) -> Result<CatalogSource, String> {
    if !dir.is_dir() {
        return Err(format!("Path '{}' is not a directory", dir.display()));
    }
    let from_dir = CatalogSource::load_from_dir(dir)
        .map_err(|e| format!("Failed to load {}: {}", dir.display(), e))?;
    if !overlay {
        return Ok(from_dir);
    }
    let mut source =
        CatalogSource::builtin().map_err(|e| format!("Built-in catalog failed to parse: {}", e))?;
    source.merge(from_dir);
    Ok(source)
}

fn lint_catalog(catalog: &Catalog) -> Vec<String> {
    let mut warnings = Vec::new();

    // keyword -> every category declaring it
    let mut owners: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for cat in catalog.categories() {
        for kw in &cat.keywords {
            owners.entry(kw.as_str()).or_default().push(cat.id.as_str());
        }
    }

    for (kw, cats) in &owners {
        if cats.len() > 1 {
            warnings.push(format!(
                "Keyword '{}' is shared by categories {}",
                kw,
                cats.join(", ")
            ));
        }
    }

    // Matching is by substring, so a short keyword also fires inside a
    // longer one belonging to another category.
    for cat in catalog.categories() {
        for kw in &cat.keywords {
            for other in catalog.categories() {
                if other.id == cat.id {
                    continue;
                }
                for other_kw in &other.keywords {
                    if other_kw != kw && other_kw.contains(kw.as_str()) {
                        warnings.push(format!(
                            "Keyword '{}' of '{}' also matches '{}' of '{}'",
                            kw, cat.id, other_kw, other.id
                        ));
                    }
                }
            }
        }
    }

    for cat in catalog.categories() {
        if cat.titles.len() < 2 {
            warnings.push(format!(
                "Category '{}' has only {} title (minimum 2 recommended)",
                cat.id,
                cat.titles.len()
            ));
        }
    }

    for table in catalog.modifier_tables() {
        if table.kind == prompt_arcade::schema::modifier::ModifierKind::Difficulty {
            continue;
        }
        for entry in &table.entries {
            if !catalog.title_transforms().iter().any(|t| t.tag == entry.tag) {
                warnings.push(format!(
                    "{} modifier '{}' has no title transform",
                    table.kind.name(),
                    entry.tag
                ));
            }
        }
    }

    for transform in catalog.title_transforms() {
        let known = catalog
            .modifier_tables()
            .iter()
            .any(|t| t.entries.iter().any(|e| e.tag == transform.tag));
        if !known {
            warnings.push(format!(
                "Title transform for '{}' matches no modifier tag",
                transform.tag
            ));
        }
    }

    warnings
}
