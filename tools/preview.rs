/// Preview: interactive generation shell for testing catalogs.
///
/// Usage: preview [--catalog <dir>] [--seed <n>] [--out <dir>]
///
/// Commands:
///   classify <prompt>    show category, confidence and modifiers
///   generate <prompt>    run the full pipeline
///   title <prompt>       show only the selected title
///   seed <n>             set RNG seed
///   bulk <n> <prompt>    generate n games with title variety stats
///   categories           list catalog categories
///   help                 list commands
///   quit                 exit

use prompt_arcade::core::pipeline::{GameForge, Generation};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut catalog_dir = None;
    let mut out_dir: Option<PathBuf> = None;
    let mut seed: u64 = 42;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_usage();
                return;
            }
            "--catalog" if i + 1 < args.len() => {
                i += 1;
                catalog_dir = Some(args[i].clone());
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            "--out" if i + 1 < args.len() => {
                i += 1;
                out_dir = Some(PathBuf::from(&args[i]));
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut current_seed = seed;
    let mut forge = match build_forge(catalog_dir.as_deref(), current_seed) {
        Ok(forge) => forge,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    println!("Loaded {} categories", forge.catalog().categories().len());
    println!("Seed: {}", seed);
    println!("Type 'help' for commands.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("preview> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd.to_lowercase(), rest.trim()),
            None => (line.to_lowercase(), ""),
        };

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => {
                print_help();
            }
            "classify" => {
                if rest.is_empty() {
                    println!("Usage: classify <prompt>");
                    continue;
                }
                let result = forge.classify(rest);
                println!("  category:   {}", result.category);
                println!(
                    "  confidence: {:.2} ({} keyword hits{})",
                    result.confidence,
                    result.match_count,
                    if result.is_fallback() { ", fallback" } else { "" }
                );
                if result.modifiers.is_empty() {
                    println!("  modifiers:  none");
                } else {
                    let tags: Vec<String> = result.modifiers.iter().map(|m| m.to_string()).collect();
                    println!("  modifiers:  {}", tags.join(", "));
                }
            }
            "generate" => {
                if rest.is_empty() {
                    println!("Usage: generate <prompt>");
                    continue;
                }
                match forge.generate(rest, None) {
                    Ok(generation) => {
                        print_generation(&generation);
                        if let Some(ref dir) = out_dir {
                            save_document(dir, &generation);
                        }
                    }
                    Err(e) => println!("ERROR [{}]: {}", e.kind().as_str(), e),
                }
            }
            "title" => {
                if rest.is_empty() {
                    println!("Usage: title <prompt>");
                    continue;
                }
                match forge.plan(rest, None) {
                    Ok(plan) => println!("{}", plan.choice.title),
                    Err(e) => println!("ERROR [{}]: {}", e.kind().as_str(), e),
                }
            }
            "seed" => {
                let Some(n) = rest.parse::<u64>().ok() else {
                    println!("Usage: seed <n>  (current: {})", current_seed);
                    continue;
                };
                current_seed = n;
                match build_forge(catalog_dir.as_deref(), current_seed) {
                    Ok(f) => {
                        forge = f;
                        println!("Seed set to {}", current_seed);
                    }
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            "bulk" => {
                let (count, prompt) = match rest.split_once(char::is_whitespace) {
                    Some((n, prompt)) => (n.parse::<usize>().ok(), prompt.trim()),
                    None => (None, ""),
                };
                let (Some(count), false) = (count, prompt.is_empty()) else {
                    println!("Usage: bulk <n> <prompt>");
                    continue;
                };
                print_bulk(&forge, count, prompt);
            }
            "categories" | "cats" => {
                for cat in forge.catalog().categories() {
                    let marker = if &cat.id == forge.catalog().fallback() {
                        " (fallback)"
                    } else {
                        ""
                    };
                    println!(
                        "  {}{}: {} keywords, {} titles, skeleton '{}'",
                        cat.id,
                        marker,
                        cat.keywords.len(),
                        cat.titles.len(),
                        cat.skeleton
                    );
                }
            }
            _ => {
                println!("Unknown command: '{}'. Type 'help' for available commands.", cmd);
            }
        }
    }
}

fn build_forge(catalog_dir: Option<&str>, seed: u64) -> Result<GameForge, String> {
    let mut builder = GameForge::builder().seed(seed);
    if let Some(dir) = catalog_dir {
        builder = builder.catalog_dir(dir);
    }
    builder.build().map_err(|e| e.to_string())
}

fn print_generation(generation: &Generation) {
    let game = &generation.game;
    println!("\n--- Generated Game ---");
    println!("  title:      {}", game.title);
    println!("  category:   {}", game.category);
    println!("  confidence: {:.2}", generation.classification.confidence);
    println!("  difficulty: {}", generation.choice.difficulty.name());
    println!("  palette:    {}", game.palette.primary);
    println!("  intro:      {}", generation.choice.intro);
    println!("  seed:       {}", generation.seed);
    println!("  document:   {} bytes", game.document.len());
    println!("--- End ---\n");
}

fn save_document(dir: &Path, generation: &Generation) {
    let path = dir.join(format!(
        "{}-{}.html",
        generation.game.category, generation.seed
    ));
    match std::fs::create_dir_all(dir).and_then(|_| std::fs::write(&path, &generation.game.document)) {
        Ok(()) => println!("Saved {}", path.display()),
        Err(e) => println!("ERROR writing {}: {}", path.display(), e),
    }
}

fn print_bulk(forge: &GameForge, count: usize, prompt: &str) {
    let mut titles: HashMap<String, u32> = HashMap::new();
    let mut palettes: HashMap<String, u32> = HashMap::new();
    let mut errors = 0;

    for _ in 0..count {
        match forge.generate(prompt, None) {
            Ok(g) => {
                *titles.entry(g.game.title).or_insert(0) += 1;
                *palettes.entry(g.game.palette.primary).or_insert(0) += 1;
            }
            Err(_) => errors += 1,
        }
    }

    println!(
        "\n=== Bulk Generation: {} games ({} errors) ===\n",
        count - errors,
        errors
    );
    println!("Unique titles: {} / {}", titles.len(), count - errors);
    println!("Unique palettes: {}", palettes.len());

    let mut title_freq: Vec<(String, u32)> = titles.into_iter().collect();
    title_freq.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    println!("\nTitles:");
    for (title, n) in &title_freq {
        println!("  {}: {}", title, n);
    }
    println!();
}

fn print_usage() {
    println!("Preview: interactive generation shell for testing catalogs.");
    println!();
    println!("Usage: preview [--catalog <dir>] [--seed <n>] [--out <dir>]");
    println!();
    println!("  --catalog <dir>  Catalog directory merged over the built-in data");
    println!("  --seed <n>       Initial RNG seed (default: 42)");
    println!("  --out <dir>      Write generated documents here");
}

fn print_help() {
    println!("Commands:");
    println!("  classify <prompt>   Show category, confidence and modifiers");
    println!("  generate <prompt>   Run the full pipeline");
    println!("  title <prompt>      Show only the selected title");
    println!("  seed <n>            Set RNG seed");
    println!("  bulk <n> <prompt>   Generate n games with title variety statistics");
    println!("  categories          List catalog categories");
    println!("  help                Show this help");
    println!("  quit                Exit");
}
