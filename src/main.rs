//! sheetlayout - Render a TOML layout description to an XLSX workbook

mod config;
mod error;
mod layout_file;

use anyhow::Context as _;
use sheetlayout_core::{Context, RecordingSink};
use std::env;
use std::path::{Path, PathBuf};

fn print_usage() {
    eprintln!("Usage: sheetlayout [OPTIONS] <LAYOUT>");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <LAYOUT>                  Layout description (.toml)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --output <FILE>       Output .xlsx (default: layout's path or <LAYOUT>.xlsx)");
    eprintln!("  -c, --config <FILE>       Build config TOML (default: <config dir>/sheetlayout/config.toml)");
    eprintln!("  --strict                  Fail on references to cells that are never placed");
    eprintln!("  --dry-run                 Resolve and place, print cells instead of saving");
    eprintln!("  --open                    Open the file after saving");
    eprintln!("  -h, --help                Print help");
}

struct Options {
    layout: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    strict: bool,
    dry_run: bool,
    open: bool,
}

fn parse_args(args: &[String]) -> Option<Options> {
    let mut layout: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut config: Option<PathBuf> = None;
    let mut strict = false;
    let mut dry_run = false;
    let mut open = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --output requires a file path");
                    std::process::exit(1);
                }
                output = Some(PathBuf::from(&args[i]));
            }
            "-c" | "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a file path");
                    std::process::exit(1);
                }
                config = Some(PathBuf::from(&args[i]));
            }
            "--strict" => strict = true,
            "--dry-run" => dry_run = true,
            "--open" => open = true,
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                print_usage();
                std::process::exit(1);
            }
            _ => {
                if layout.is_none() {
                    layout = Some(PathBuf::from(&args[i]));
                } else {
                    eprintln!("Error: Unexpected argument: {}", args[i]);
                    print_usage();
                    std::process::exit(1);
                }
            }
        }
        i += 1;
    }

    Some(Options {
        layout: layout?,
        output,
        config,
        strict,
        dry_run,
        open,
    })
}

fn default_output(layout: &Path) -> PathBuf {
    layout.with_extension("xlsx")
}

fn run(options: Options) -> anyhow::Result<()> {
    let (mut build_config, warnings) = config::load_config(options.config.as_deref())?;
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }
    if options.strict {
        build_config.strict_references = true;
    }
    if options.open {
        build_config.auto_open = true;
    }

    let layout = layout_file::load_layout(&options.layout)
        .with_context(|| format!("loading {}", options.layout.display()))?;
    let output = options
        .output
        .clone()
        .or_else(|| layout.workbook.path.clone())
        .unwrap_or_else(|| default_output(&options.layout));

    let ctx = Context::with_config(build_config);
    let workbook = layout_file::build_workbook(&layout, &ctx)?.path(&output);

    if options.dry_run {
        let mut sink = RecordingSink::new();
        workbook
            .auto_open(false)
            .write_to_sink(&mut sink, &output)?;
        print!("{}", sink.render());
        return Ok(());
    }

    let written = workbook.write()?;
    println!("Wrote {}", written.display());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    let Some(options) = parse_args(&args) else {
        eprintln!("Error: missing layout file");
        print_usage();
        std::process::exit(1);
    };

    if let Err(e) = run(options) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("sheetlayout")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_args_flags() {
        let options = parse_args(&args(&["--strict", "-o", "out.xlsx", "book.toml"])).unwrap();
        assert_eq!(options.layout, PathBuf::from("book.toml"));
        assert_eq!(options.output, Some(PathBuf::from("out.xlsx")));
        assert!(options.strict);
        assert!(!options.dry_run);
    }

    #[test]
    fn test_parse_args_requires_layout() {
        assert!(parse_args(&args(&["--dry-run"])).is_none());
    }

    #[test]
    fn test_default_output_swaps_extension() {
        assert_eq!(default_output(Path::new("dir/report.toml")), PathBuf::from("dir/report.xlsx"));
    }
}
