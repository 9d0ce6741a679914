/// Errors returned by scheduler operations.
///
/// None of these are fatal to the simulation; the caller decides whether to
/// report them.
#[derive(thiserror::Error, Debug)]
pub enum SimulatorError {
    #[error("Process table is full ({capacity} processes)")]
    TableFull { capacity: usize },

    #[error("Unable to read process image {path}: {source}")]
    ImageUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Process {id} not found")]
    UnknownProcess { id: i64 },
}

/// Errors produced while parsing a command line.
#[derive(thiserror::Error, Debug)]
pub enum ShellError {
    #[error("Usage: {usage}")]
    Usage { usage: &'static str },

    #[error("Bad arguments given: expecting integers")]
    BadArguments,

    #[error("Unknown command: {name}")]
    UnknownCommand { name: String },
}
