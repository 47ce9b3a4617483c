use std::fmt;
use std::process::ExitCode;

use autolink::AutolinkError;

/// Process exit codes, following `sysexits.h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    Ok = 0,
    /// Bad arguments, unknown documents, no vault.
    Usage = 64,
    /// A note's contents could not be used.
    Data = 65,
    Software = 70,
    Io = 71,
    /// `.autolink/settings.json` is invalid.
    Config = 78,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        self as u8
    }

    fn for_autolink(err: &AutolinkError) -> Self {
        match err {
            AutolinkError::Vault(_) => ExitStatus::Usage,
            AutolinkError::FrontMatter(_) => ExitStatus::Data,
            AutolinkError::Serialization(_) => ExitStatus::Config,
            AutolinkError::Corpus(_) | AutolinkError::Io(_) => ExitStatus::Io,
        }
    }
}

/// A failure reported on stderr before exiting with `status`.
#[derive(Debug)]
pub struct CliError {
    message: Option<String>,
    status: ExitStatus,
}

impl CliError {
    pub fn new(message: impl Into<String>, status: ExitStatus) -> Self {
        Self {
            message: Some(message.into()),
            status,
        }
    }

    /// Exits with `status` without printing anything further.
    fn silent(status: ExitStatus) -> Self {
        Self {
            message: None,
            status,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.status.code())
    }

    pub fn print(&self) {
        if let Some(message) = &self.message {
            eprintln!("{message}");
        }
    }
}

impl From<AutolinkError> for CliError {
    fn from(err: AutolinkError) -> Self {
        CliError::new(err.to_string(), ExitStatus::for_autolink(&err))
    }
}

impl From<clap::Error> for CliError {
    fn from(err: clap::Error) -> Self {
        // Help and version requests render to stdout and are not failures.
        if !err.use_stderr() {
            let _ = err.print();
            return CliError::silent(ExitStatus::Ok);
        }
        CliError::new(err.to_string(), ExitStatus::Usage)
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::new(err.to_string(), ExitStatus::Io)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message.as_deref().unwrap_or_default())
    }
}

impl std::error::Error for CliError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_errors_map_to_sysexits() {
        let cases = [
            (AutolinkError::Vault("no vault".into()), 64),
            (AutolinkError::FrontMatter("bad yaml".into()), 65),
            (AutolinkError::Corpus("walk failed".into()), 71),
            (AutolinkError::Serialization("invalid settings".into()), 78),
        ];
        for (err, code) in cases {
            let message = err.to_string();
            let cli = CliError::from(err);
            assert_eq!(cli.status.code(), code);
            assert_eq!(cli.to_string(), message);
        }
    }
}
