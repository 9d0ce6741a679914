use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use process_simulator::io::FileCoreDumpWriter;
use process_simulator::output::OutputFormat;
use process_simulator::shell::Shell;
use process_simulator::{logger, Scheduler};

/// Simulates process admission, round-robin scheduling and execution.
#[derive(Parser, Debug)]
#[command(name = "process-simulator", version, about)]
struct Cli {
    /// Read commands from this file instead of standard input.
    script: Option<PathBuf>,

    /// Directory that receives `<name>.core` records. Without it each
    /// record is written next to its image.
    #[arg(long)]
    core_dir: Option<PathBuf>,

    /// Rendering for `plist` and `show`.
    #[arg(long, value_enum, default_value = "human")]
    output: OutputFormat,

    /// Diagnostic log level written to stderr.
    #[arg(long, default_value = "warn")]
    log_level: log::LevelFilter,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = logger::init(cli.log_level) {
        eprintln!("error: {err}");
    }

    let writer = match &cli.core_dir {
        Some(directory) => {
            log::info!("writing core dumps under {}", directory.display());
            FileCoreDumpWriter::new(directory)
        }
        None => FileCoreDumpWriter::next_to_image(),
    };

    let mut shell = Shell::new(Scheduler::with_files(writer), cli.output);
    let stdout = io::stdout();
    let stderr = io::stderr();

    let result = match &cli.script {
        Some(path) => File::open(path)
            .and_then(|file| shell.run(BufReader::new(file), &mut stdout.lock(), &mut stderr.lock())),
        None => shell.run(io::stdin().lock(), &mut stdout.lock(), &mut stderr.lock()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}
