use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use clap_stdin::FileOrStdin;

use pascc::compile;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Target {
    /// WebAssembly text format
    Wat,
}

/// Compiles a Pascal-subset source program to a WebAssembly text module.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Source file, or `-` for standard input
    source: FileOrStdin,

    /// Code generation target
    #[arg(long, value_enum, default_value = "wat")]
    target: Target,

    /// Write the module here instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    let Target::Wat = args.target;

    let source = match args.source.contents() {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    match compile(&source) {
        Ok(module) => match args.output {
            Some(path) => {
                if let Err(err) = fs::write(&path, module) {
                    eprintln!("error: cannot write {}: {}", path.display(), err);
                    return ExitCode::FAILURE;
                }
                ExitCode::SUCCESS
            }
            None => {
                print!("{}", module);
                ExitCode::SUCCESS
            }
        },
        Err(err) => {
            for diagnostic in &err.diagnostics {
                eprintln!("{}", diagnostic);
            }
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
