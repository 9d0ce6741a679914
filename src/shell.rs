//! Line-oriented command surface over a [`Scheduler`].
//!
//! Each input line is one command: `sub`, `plist`, `show`, `kill`, `run`,
//! `runall` or `exit`. Results go to `out`, complaints go to `err`.

use std::io::{self, BufRead, Write};

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};

use crate::error::ShellError;
use crate::kernel::{ProcessPriority, Scheduler};
use crate::output::{self, OutputFormat};
use crate::status::{self, ProcessStatus};

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_help_flag = true, disable_help_subcommand = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Create a new process from an image file.
    Sub {
        #[arg(allow_negative_numbers = true)]
        user_id: i32,
        #[arg(allow_negative_numbers = true)]
        priority: i64,
        #[arg(allow_negative_numbers = true)]
        max_cpu: i64,
        filename: String,
    },

    /// List all live processes.
    Plist,

    /// Show the full status of one process.
    Show {
        #[arg(allow_negative_numbers = true)]
        pid: i64,
    },

    /// Kill a process.
    Kill {
        #[arg(allow_negative_numbers = true)]
        pid: i64,
    },

    /// Run a single time slice.
    Run,

    /// Run time slices until nothing is left.
    Runall,

    /// Stop reading commands.
    Exit,
}

/// Usage line and argument count of a command.
fn usage_for(command: &str) -> Option<(&'static str, usize)> {
    match command {
        "sub" => Some(("sub <userID> <priority> <max CPU units> <filename>", 4)),
        "plist" => Some(("plist", 0)),
        "show" => Some(("show <PID>", 1)),
        "kill" => Some(("kill <PID>", 1)),
        "run" => Some(("run", 0)),
        "runall" => Some(("runall", 0)),
        "exit" => Some(("exit", 0)),
        _ => None,
    }
}

/// Parses one input line. Blank lines parse to `None`; words past a
/// command's arguments are ignored.
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, ShellError> {
    let mut words = line.split_whitespace().peekable();
    let Some(name) = words.peek().copied() else {
        return Ok(None);
    };

    let (usage, arity) = usage_for(name).ok_or_else(|| ShellError::UnknownCommand {
        name: name.to_string(),
    })?;

    match ShellLine::try_parse_from(words.take(1 + arity)) {
        Ok(line) => Ok(Some(line.command)),
        Err(err) => match err.kind() {
            ErrorKind::ValueValidation | ErrorKind::InvalidValue => Err(ShellError::BadArguments),
            _ => Err(ShellError::Usage { usage }),
        },
    }
}

/// Whether the caller should keep feeding commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Shell {
    scheduler: Scheduler,
    format: OutputFormat,
}

impl Shell {
    pub fn new(scheduler: Scheduler, format: OutputFormat) -> Shell {
        Shell { scheduler, format }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Reads commands until end of input or `exit`.
    pub fn run<R: BufRead, W: Write, E: Write>(&mut self, input: R, out: &mut W, err: &mut E) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            let command = match parse_line(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(ShellError::UnknownCommand { name }) => {
                    log::debug!("ignoring unknown command {}", name);
                    continue;
                }
                Err(parse_err) => {
                    writeln!(err, "{parse_err}")?;
                    continue;
                }
            };

            if self.execute(command, out, err)? == Flow::Exit {
                break;
            }
        }

        Ok(())
    }

    pub fn execute<W: Write, E: Write>(&mut self, command: ShellCommand, out: &mut W, err: &mut E) -> io::Result<Flow> {
        match command {
            ShellCommand::Sub {
                user_id,
                priority,
                max_cpu,
                filename,
            } => {
                let priority = ProcessPriority::from_index(priority);
                // A negative budget means the first instruction already exceeds it.
                let max_cpu = u32::try_from(max_cpu.max(0)).unwrap_or(u32::MAX);
                if self.scheduler.submit(user_id, priority, max_cpu, &filename).is_err() {
                    writeln!(err, "Unable to create new process.")?;
                }
            }
            ShellCommand::Plist => {
                let statuses: Vec<ProcessStatus> = self.scheduler.processes().map(ProcessStatus::from).collect();
                output::emit(out, self.format, &statuses, &status::render_listing(&statuses))?;
            }
            ShellCommand::Show { pid } => match self.scheduler.lookup(pid) {
                Ok(pcb) => {
                    let status = ProcessStatus::from(pcb);
                    output::emit(out, self.format, &status, &status.to_string())?;
                }
                Err(_) => writeln!(err, "Process {pid} not found.")?,
            },
            ShellCommand::Kill { pid } => {
                if !self.scheduler.kill(pid) {
                    writeln!(err, "Process {pid} not found.")?;
                }
            }
            ShellCommand::Run => self.scheduler.tick(),
            ShellCommand::Runall => self.scheduler.run_until_quiescent(),
            ShellCommand::Exit => return Ok(Flow::Exit),
        }

        Ok(Flow::Continue)
    }
}
