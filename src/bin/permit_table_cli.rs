//! CLI tool for permit tables - compiles a snapshot and outputs its primitives as JSON
//!
//! Usage:
//!   permit_table_cli <snapshot.json>                        # Output JSON to stdout
//!   permit_table_cli <snapshot.json> -o out.json            # Output JSON to file
//!   permit_table_cli <snapshot.json> -c layout.json         # Override layout constants

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use permit_table::{LayoutConfig, Table};
use std::env;
use std::fs;
use std::io::{self, Write};

const USAGE: &str = "Usage: permit_table_cli <snapshot.json> [-c layout.json] [-o output.json]";

fn read_file(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("{USAGE}");
        std::process::exit(1);
    }

    let input_path = &args[1];
    let mut config_path = None;
    let mut output_path = None;
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "-c" if i + 1 < args.len() => config_path = Some(&args[i + 1]),
            "-o" if i + 1 < args.len() => output_path = Some(&args[i + 1]),
            other => {
                eprintln!("Unexpected argument: {other}");
                eprintln!("{USAGE}");
                std::process::exit(1);
            }
        }
        i += 2;
    }

    // Layout constants
    let config = match config_path {
        Some(path) => match serde_json::from_str::<LayoutConfig>(&read_file(path)) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error parsing layout config: {}", e);
                std::process::exit(1);
            }
        },
        None => LayoutConfig::default(),
    };
    if let Err(e) = config.validate() {
        eprintln!("Error in layout config: {}", e);
        std::process::exit(1);
    }

    // Load and compile
    let table = match Table::from_json(&read_file(input_path), config) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error loading snapshot: {}", e);
            std::process::exit(1);
        }
    };

    // Serialize to JSON
    let json = match serde_json::to_string_pretty(table.primitives()) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error serializing JSON: {}", e);
            std::process::exit(1);
        }
    };

    // Output
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                eprintln!("Error writing {}: {}", path, e);
                std::process::exit(1);
            }
            eprintln!(
                "Written: {} ({} lines, {} text regions)",
                path,
                table.primitives().lines.len(),
                table.primitives().text_regions.len()
            );
        }
        None => {
            io::stdout().write_all(json.as_bytes()).unwrap();
            println!();
        }
    }
}
