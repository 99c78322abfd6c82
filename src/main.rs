/*
 * uioctl Main Entry Point
 *
 * Parses the command line, installs the logger, opens one device session
 * and runs exactly one mode against it:
 * - read:    print `count` words starting at an address
 * - write:   store one word at an address
 * - monitor: print one line per interrupt, once or forever
 * - list:    not implemented, always fails
 *
 * Every failure prints `uioctl: <message>` on stderr and exits with 1.
 */

use std::process::ExitCode;

use uioctl::cli::{self, Command, output};
use uioctl::io::SUPPORTED_REGION;
use uioctl::utils::logger;
use uioctl::{
    DeviceSession, InterruptMonitor, RegisterWindow, RegisterWord, Result, RunMode, UioError,
    ValidationError, read_words, write_word,
};

fn main() -> ExitCode {
    let invocation = match cli::parse_args(std::env::args().skip(1)) {
        Ok(invocation) => invocation,
        Err(err) => return fail(&UioError::from(err)),
    };

    let level = logger::level_for(
        invocation.verbosity,
        std::env::var(logger::LOG_ENV).ok().as_deref(),
    );
    if let Err(err) = logger::init(level) {
        eprintln!("{}: logger unavailable: {}", cli::PROGRAM_NAME, err);
    }

    match run(invocation.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => fail(&err),
    }
}

fn fail(err: &UioError) -> ExitCode {
    eprintln!("{}: {}", cli::PROGRAM_NAME, err);
    ExitCode::FAILURE
}

fn run(command: Command) -> Result<()> {
    log::debug!("mode: {:?}", command.mode());

    match command {
        Command::Help => {
            output::write_text(&mut std::io::stdout().lock(), &cli::usage())
        }
        Command::List => Err(ValidationError::ListingNotImplemented.into()),
        Command::Read { path, address, count } => {
            let length = map_length(address, count)?;
            let session = DeviceSession::open_for_registers(&path, SUPPORTED_REGION, length)?;

            let mut out = std::io::stdout().lock();
            for word in read_words(&session, address, count)? {
                output::write_line(&mut out, &RegisterWord::from(word))?;
            }

            session.close();
            Ok(())
        }
        Command::Write { path, address, value } => {
            let word = value as u32;
            if u64::from(word) != value {
                log::warn!("value 0x{:x} truncated to 0x{:08x}", value, word);
            }

            let length = map_length(address, 1)?;
            let session = DeviceSession::open_for_registers(&path, SUPPORTED_REGION, length)?;
            write_word(&session, address, word)?;
            session.close();
            Ok(())
        }
        Command::Monitor { path, run } => {
            output::write_line(&mut std::io::stdout().lock(), &output::waiting_banner(&path))?;
            let session = DeviceSession::open_for_monitor(&path)?;

            let mut monitor = InterruptMonitor::new(&session);
            let seen = monitor.run(run, |event| {
                output::write_line(&mut std::io::stdout().lock(), event)
            })?;

            if run == RunMode::Once {
                log::info!("stopping after {} interrupt(s)", seen);
            }
            session.close();
            Ok(())
        }
    }
}

/// Smallest region-0 mapping that covers `count` words at `address`
fn map_length(address: usize, count: usize) -> Result<usize> {
    RegisterWindow::new(address, count)
        .end()
        .ok_or_else(|| ValidationError::WindowTooLarge.into())
}
