mod commands;
mod reader;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use casemap_core::{compile, CompileOutput, DiagnosticSeverity, ValueSetDecl};
use reader::{parse_decl, read_vset_files};

#[derive(Parser)]
#[command(
    name = "casemap",
    version,
    about = "casemap compiler — compile .vset value-set definitions into string-lookup descriptors"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile value-set definitions and output descriptor JSON
    Compile {
        /// Input path (file or directory, defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Write output to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile value-set definitions and report diagnostics only
    Check {
        /// Input path (file or directory, defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format: human (default) or json
        #[arg(long, default_value = "human")]
        format: String,

        /// Exit with a non-zero status if any diagnostic was reported
        #[arg(long)]
        deny_warnings: bool,
    },

    /// Evaluate a compiled lookup against a concrete value
    Lookup {
        /// Input path (file or directory with value-set definitions)
        path: PathBuf,

        /// The integral value to look up
        #[arg(allow_hyphen_values = true)]
        value: String,

        /// Value set to use when the input declares more than one
        #[arg(long)]
        set: Option<String>,

        /// Lookup kind (defaults to "value")
        #[arg(long, default_value = "value")]
        kind: String,

        /// Override the compiled flags separator for this call
        #[arg(long)]
        separator: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compile { path, output } => match run_compile(&path, output.as_deref()) {
            Ok(json) => {
                if output.is_none() {
                    println!("{json}");
                }
            }
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        },
        Commands::Check {
            path,
            format,
            deny_warnings,
        } => match run_check(&path, &format, deny_warnings) {
            Ok((output, failing_count)) => {
                println!("{output}");
                if failing_count > 0 {
                    process::exit(1);
                }
            }
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        },
        Commands::Lookup {
            path,
            value,
            set,
            kind,
            separator,
        } => match commands::lookup::run_lookup(
            &path,
            set.as_deref(),
            &kind,
            &value,
            separator.as_deref(),
        ) {
            Ok(output) => {
                println!("{output}");
            }
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        },
    }
}

/// Load every value-set declaration under a path, paired with its source
/// file for reporting.
pub fn load_declarations(input_path: &Path) -> Result<Vec<(String, ValueSetDecl)>, String> {
    let files = read_vset_files(input_path)?;

    if files.is_empty() {
        return Err(format!(
            "No value-set files (.vset.yaml, .vset.json) found at: {}",
            input_path.display()
        ));
    }

    let mut declarations = Vec::with_capacity(files.len());
    for file in &files {
        let decl = parse_decl(file)?;
        declarations.push((file.path.clone(), decl));
    }

    Ok(declarations)
}

/// Compile every declaration into one batch envelope. Each value set is
/// compiled independently; diagnostics never abort the batch.
fn compile_batch(declarations: &[(String, ValueSetDecl)]) -> Result<CompileOutput, String> {
    let mut batch = CompileOutput::new();
    for (file, decl) in declarations {
        let output = compile(decl).map_err(|e| format!("{file}: {e}"))?;
        batch.merge(output);
    }
    Ok(batch)
}

fn run_compile(input_path: &Path, output_file: Option<&Path>) -> Result<String, String> {
    let declarations = load_declarations(input_path)?;
    let batch = compile_batch(&declarations)?;
    let json = serde_json::to_string_pretty(&batch)
        .map_err(|e| format!("JSON serialization error: {e}"))?;

    if let Some(out_path) = output_file {
        std::fs::write(out_path, &json)
            .map_err(|e| format!("Failed to write {}: {e}", out_path.display()))?;
        return Ok(format!("Written to {}", out_path.display()));
    }

    Ok(json)
}

fn run_check(
    input_path: &Path,
    format: &str,
    deny_warnings: bool,
) -> Result<(String, usize), String> {
    let declarations = load_declarations(input_path)?;
    let set_count = declarations.len();

    // Diagnostics keep their originating file for reporting.
    let mut reported: Vec<(String, casemap_core::Diagnostic)> = Vec::new();
    for (file, decl) in &declarations {
        let output = compile(decl).map_err(|e| format!("{file}: {e}"))?;
        for diagnostic in output.diagnostics {
            reported.push((file.clone(), diagnostic));
        }
    }

    let error_count = reported
        .iter()
        .filter(|(_, d)| d.severity == DiagnosticSeverity::Error)
        .count();
    let warning_count = reported.len() - error_count;
    let failing_count = if deny_warnings {
        reported.len()
    } else {
        error_count
    };

    if format == "json" {
        let diagnostics: Vec<serde_json::Value> = reported
            .iter()
            .map(|(file, d)| {
                serde_json::json!({
                    "file": file,
                    "kind": d.kind,
                    "code": d.code,
                    "severity": d.severity,
                    "location": d.location,
                    "message": d.message,
                })
            })
            .collect();
        let output = serde_json::json!({
            "diagnostics": diagnostics,
            "summary": {
                "errors": error_count,
                "warnings": warning_count,
                "valueSets": set_count,
            }
        });
        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| format!("JSON serialization error: {e}"))?;
        return Ok((json, failing_count));
    }

    // Human-readable format
    let mut lines: Vec<String> = Vec::new();

    for (file, d) in &reported {
        let severity = match d.severity {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
        };
        lines.push(format!(
            "{}: {}[{}] {}: {}",
            file, severity, d.code, d.location, d.message
        ));
    }

    let error_word = if error_count == 1 { "error" } else { "errors" };
    let warning_word = if warning_count == 1 {
        "warning"
    } else {
        "warnings"
    };
    let set_word = if set_count == 1 {
        "value set"
    } else {
        "value sets"
    };
    lines.push(format!(
        "{error_count} {error_word}, {warning_count} {warning_word} in {set_count} {set_word}."
    ));

    Ok((lines.join("\n"), failing_count))
}
