//! The command-line interface for `wgslfmt`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::{fs, io};

use clap::Parser;
use wgslfmt::{format_embedded, format_str, Error, FormatOptions};

#[derive(Parser)]
#[command(version, author, about)]
struct Cli {
    /// files to format: .wgsl, or js/ts files with embedded snippets
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// rewrite the files in place
    #[arg(long)]
    write: bool,
    /// exit non-zero when a file is not formatted, without writing
    #[arg(long, conflicts_with = "write")]
    check: bool,
    /// target line width
    #[arg(long, default_value_t = 80)]
    print_width: usize,
    /// spaces per indentation level
    #[arg(long, default_value_t = 2)]
    indent_width: usize,
}

const EMBEDDED_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "jsx", "ts", "mts", "cts", "tsx"];

fn format_source(path: &Path, source: &str, options: &FormatOptions) -> Result<String, Error> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if EMBEDDED_EXTENSIONS.contains(&ext) => format_embedded(source, options),
        _ => format_str(source, options),
    }
}

fn read(path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let options = FormatOptions {
        print_width: cli.print_width,
        indent_width: cli.indent_width,
    };

    let mut unformatted = false;
    for path in &cli.files {
        let source = match read(path) {
            Ok(source) => source,
            Err(err) => {
                eprintln!("{}: {err}", path.display());
                return ExitCode::from(2);
            }
        };
        let formatted = match format_source(path, &source, &options) {
            Ok(formatted) => formatted,
            Err(err) => {
                eprintln!("{}:", path.display());
                eprintln!("{}", err.render_on(&source));
                return ExitCode::from(2);
            }
        };
        if cli.check {
            if formatted != source {
                println!("{} is not formatted", path.display());
                unformatted = true;
            }
        } else if cli.write {
            if formatted != source {
                if let Err(err) = fs::write(path, &formatted) {
                    eprintln!("{}: {err}", path.display());
                    return ExitCode::from(2);
                }
            }
        } else {
            print!("{formatted}");
        }
    }

    if unformatted {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
