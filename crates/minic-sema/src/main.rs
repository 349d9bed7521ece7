//! MiniC semantic analyzer driver
//!
//! Usage: minic-sema [OPTIONS] <input>
//!
//! Reads a parse-tree dump produced by the MiniC parser, runs the three
//! analysis passes, and prints the symbol table and any semantic errors.

use anyhow::Context;
use clap::Parser;
use minic_sema::{analyze, DiagnosticReporter, ParseTree};
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "minic-sema")]
#[command(version = "0.1.0")]
#[command(about = "Semantic analyzer for the MiniC teaching language", long_about = None)]
struct Args {
    /// Input parse-tree dump file
    #[arg(required = true)]
    input: PathBuf,

    /// Echo the parsed tree back in dump form
    #[arg(long)]
    dump_tree: bool,

    /// Skip the symbol table listing
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let args = Args::parse();

    match run(&args) {
        Ok(clean) => {
            if !clean {
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn run(args: &Args) -> anyhow::Result<bool> {
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let filename = args.input.display().to_string();

    let mut reporter = DiagnosticReporter::new();
    let file_id = reporter.add_file(&filename, &source);

    let tree = match ParseTree::from_sexpr(&source) {
        Ok(tree) => tree,
        Err(e) => {
            reporter.report_error(file_id, &e);
            anyhow::bail!("could not read parse tree from {}", filename);
        }
    };

    if args.dump_tree {
        eprintln!("=== Parse tree ===");
        eprintln!("{}", tree.to_sexpr());
        eprintln!("=== End tree ===\n");
    }

    let analysis = analyze(&tree)?;

    if !args.quiet {
        print!("{}", analysis.scopes);
    }

    for error in &analysis.construction_errors {
        reporter.report_error(file_id, error);
    }
    for name in &analysis.undefined {
        reporter.report_undefined(name);
    }
    for error in &analysis.type_errors {
        reporter.report_type_error(&error.to_string());
    }

    Ok(analysis.is_clean())
}
