//! Corpus round-trip check
//!
//! Parses each file given on the command line, renders it back and reports
//! whether the output is byte-identical. With `--sanitize`, the default
//! sanitizer runs first and the sanitized markup is printed instead.

use markup_rewriter::parser::parse_bytes;
use markup_rewriter::transform::transform_sync;
use markup_rewriter::transformers::{SanitizeOptions, sanitize};
use std::env;
use std::fs;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();
    let sanitize_mode = args.iter().any(|a| a == "--sanitize");
    let files: Vec<&String> = args.iter().skip(1).filter(|a| !a.starts_with("--")).collect();

    if files.is_empty() {
        eprintln!("Usage: {} [--sanitize] <html_file>...", args[0]);
        process::exit(1);
    }

    let mut mismatches = 0;
    for filename in files {
        let html = match fs::read(filename) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file {}: {}", filename, e);
                process::exit(1);
            }
        };

        let tree = match parse_bytes(&html, None) {
            Ok(tree) => tree,
            Err(e) => {
                eprintln!("Error parsing {}: {}", filename, e);
                process::exit(1);
            }
        };

        if sanitize_mode {
            match transform_sync(tree, &[sanitize(SanitizeOptions::default())]) {
                Ok(output) => println!("{}", output),
                Err(e) => {
                    eprintln!("Error sanitizing {}: {}", filename, e);
                    process::exit(1);
                }
            }
            continue;
        }

        let output = match tree.render_sync() {
            Ok(output) => output,
            Err(e) => {
                eprintln!("Error rendering {}: {}", filename, e);
                process::exit(1);
            }
        };

        if output.as_bytes() == html.as_slice() {
            println!("ok       {}", filename);
        } else {
            mismatches += 1;
            println!("mismatch {} ({} -> {} bytes)", filename, html.len(), output.len());
        }
    }

    if mismatches > 0 {
        process::exit(2);
    }
}
