/*
 * Command Line Front End
 *
 * Turns argv into a validated `Invocation`. All validation that can happen
 * without touching the device happens here: unsupported regions and word
 * widths, malformed numbers, word counts and argument counts are rejected
 * before any file is opened.
 *
 * Options follow getopt("hlmxr:n:w:v"): flags may be clustered (`-xv`),
 * option values may be attached (`-n4`) or separate (`-n 4`), options may
 * appear anywhere and `--` ends option processing.
 */

pub mod number;
pub mod output;

use std::path::PathBuf;

pub use number::parse_number;

use crate::error::ValidationError;
use crate::io::{RegisterWindow, SUPPORTED_REGION, WORD_WIDTH};
use crate::irq::RunMode;

pub const PROGRAM_NAME: &str = "uioctl";

/// The four things uioctl can be asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationMode {
    Read,
    Write,
    List,
    Monitor,
}

/// A fully validated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    List,
    Read {
        path: PathBuf,
        address: usize,
        count: usize,
    },
    /// `value` is kept at full parsed width; it is truncated to one word
    /// (with a warning) when the write is issued.
    Write {
        path: PathBuf,
        address: usize,
        value: u64,
    },
    Monitor {
        path: PathBuf,
        run: RunMode,
    },
}

impl Command {
    /// Mode this command runs in (`None` for help)
    pub fn mode(&self) -> Option<InvocationMode> {
        match self {
            Command::Help => None,
            Command::List => Some(InvocationMode::List),
            Command::Read { .. } => Some(InvocationMode::Read),
            Command::Write { .. } => Some(InvocationMode::Write),
            Command::Monitor { .. } => Some(InvocationMode::Monitor),
        }
    }

    /// Register window touched by a read or write command
    pub fn window(&self) -> Option<RegisterWindow> {
        match self {
            Command::Read { address, count, .. } => Some(RegisterWindow::new(*address, *count)),
            Command::Write { address, .. } => Some(RegisterWindow::new(*address, 1)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: Command,
    /// Number of `-v` flags seen
    pub verbosity: u8,
}

/// Parse program arguments (without argv[0])
pub fn parse_args<I, S>(args: I) -> Result<Invocation, ValidationError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut positionals: Vec<String> = Vec::new();
    let mut verbosity: u8 = 0;
    let mut monitor = false;
    let mut run = RunMode::Forever;
    let mut count: usize = 1;
    let mut options_done = false;

    while let Some(arg) = args.next() {
        if options_done || arg == "-" || !arg.starts_with('-') {
            positionals.push(arg);
            continue;
        }
        if arg == "--" {
            options_done = true;
            continue;
        }

        for (i, opt) in arg[1..].char_indices() {
            match opt {
                'h' => {
                    return Ok(Invocation { command: Command::Help, verbosity });
                }
                'l' => {
                    return Ok(Invocation { command: Command::List, verbosity });
                }
                'm' => monitor = true,
                'x' => {
                    monitor = true;
                    run = RunMode::Once;
                }
                'v' => verbosity = verbosity.saturating_add(1),
                'r' | 'n' | 'w' => {
                    let attached = &arg[1 + i + opt.len_utf8()..];
                    let value = if attached.is_empty() {
                        args.next().ok_or(ValidationError::MissingOptionValue(opt))?
                    } else {
                        attached.to_string()
                    };

                    match opt {
                        'r' => {
                            let region = number("region", &value)?;
                            if region != u64::from(SUPPORTED_REGION) {
                                return Err(ValidationError::UnsupportedRegion(region));
                            }
                        }
                        'w' => {
                            let width = number("width", &value)?;
                            if width != WORD_WIDTH as u64 {
                                return Err(ValidationError::UnsupportedWidth(width));
                            }
                        }
                        _ => {
                            count = to_usize("count", &value, number("count", &value)?)?;
                            if count == 0 {
                                return Err(ValidationError::ZeroCount);
                            }
                        }
                    }
                    // The rest of this argument was the option's value.
                    break;
                }
                other => return Err(ValidationError::UnexpectedOption(format!("-{}", other))),
            }
        }
    }

    let command = if monitor {
        match positionals.as_slice() {
            [path] => Command::Monitor { path: device_path(path)?, run },
            [] => return Err(ValidationError::MissingDevicePath),
            _ => return Err(ValidationError::WrongArgumentCount),
        }
    } else {
        match positionals.as_slice() {
            [] => return Err(ValidationError::MissingDevicePath),
            [path, address] => Command::Read {
                path: device_path(path)?,
                address: address_arg(address)?,
                count,
            },
            [path, address, value] => Command::Write {
                path: device_path(path)?,
                address: address_arg(address)?,
                value: number("value", value)?,
            },
            _ => return Err(ValidationError::WrongArgumentCount),
        }
    };

    if let Some(window) = command.window() {
        if window.end().is_none() {
            return Err(ValidationError::WindowTooLarge);
        }
    }

    Ok(Invocation { command, verbosity })
}

/// Help text
pub fn usage() -> String {
    format!(
        "Usage: {name} [options] [-l] [/dev/uioX [-m] [<addr> [<value>]]]\n\
         \n\
         Functions:\n\
         \x20 monitor (-m) the device for interrupts\n\
         \x20 list (-l) all devices and their mappings\n\
         \x20 read words from <addr>\n\
         \x20 write <value> to <addr> (will zero-pad word width)\n\
         \n\
         Options:\n\
         \x20 -r\tselect the device's memory region to map (default: {region})\n\
         \x20 -w\tword size (in bytes; default: {width})\n\
         \x20 -n\tnumber of words to read (in words; default: 1)\n\
         \x20 -x\texit with success after the first interrupt (implies -m mode)\n\
         \x20 -v\tmore diagnostics on stderr (repeatable; see also {env})\n",
        name = PROGRAM_NAME,
        region = SUPPORTED_REGION,
        width = WORD_WIDTH,
        env = crate::utils::LOG_ENV,
    )
}

fn number(what: &'static str, text: &str) -> Result<u64, ValidationError> {
    parse_number(text).ok_or_else(|| ValidationError::InvalidNumber {
        what,
        text: text.to_string(),
    })
}

fn to_usize(what: &'static str, text: &str, value: u64) -> Result<usize, ValidationError> {
    usize::try_from(value).map_err(|_| ValidationError::InvalidNumber {
        what,
        text: text.to_string(),
    })
}

fn address_arg(text: &str) -> Result<usize, ValidationError> {
    to_usize("address", text, number("address", text)?)
}

fn device_path(text: &str) -> Result<PathBuf, ValidationError> {
    if text.is_empty() {
        return Err(ValidationError::MissingDevicePath);
    }
    Ok(PathBuf::from(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, ValidationError> {
        parse_args(args.iter().copied()).map(|inv| inv.command)
    }

    #[test]
    fn test_two_positionals_read() {
        assert_eq!(
            parse(&["/dev/uio0", "0x10"]),
            Ok(Command::Read { path: "/dev/uio0".into(), address: 0x10, count: 1 })
        );
        assert_eq!(
            parse(&["-n", "4", "/dev/uio0", "8"]),
            Ok(Command::Read { path: "/dev/uio0".into(), address: 8, count: 4 })
        );
        // getopt permutes, so options after positionals still count.
        assert_eq!(
            parse(&["/dev/uio0", "8", "-n0x3"]),
            Ok(Command::Read { path: "/dev/uio0".into(), address: 8, count: 3 })
        );
    }

    #[test]
    fn test_three_positionals_write() {
        let cmd = parse(&["/dev/uio1", "4", "0xdeadbeef"]).unwrap();
        assert_eq!(
            cmd,
            Command::Write { path: "/dev/uio1".into(), address: 4, value: 0xdead_beef }
        );
        assert_eq!(cmd.mode(), Some(InvocationMode::Write));
    }

    #[test]
    fn test_monitor_flags() {
        assert_eq!(
            parse(&["-m", "/dev/uio0"]),
            Ok(Command::Monitor { path: "/dev/uio0".into(), run: RunMode::Forever })
        );
        assert_eq!(
            parse(&["/dev/uio0", "-x"]),
            Ok(Command::Monitor { path: "/dev/uio0".into(), run: RunMode::Once })
        );
        assert_eq!(
            parse(&["-m", "/dev/uio0", "0"]),
            Err(ValidationError::WrongArgumentCount)
        );
    }

    #[test]
    fn test_region_and_width_rejected() {
        assert_eq!(
            parse(&["-r", "1", "/dev/uio0", "0"]),
            Err(ValidationError::UnsupportedRegion(1))
        );
        assert_eq!(
            parse(&["-w8", "/dev/uio0", "0"]),
            Err(ValidationError::UnsupportedWidth(8))
        );
        assert!(parse(&["-r0", "-w", "4", "/dev/uio0", "0"]).is_ok());
    }

    #[test]
    fn test_malformed_numbers_rejected() {
        assert_eq!(
            parse(&["/dev/uio0", "zz"]),
            Err(ValidationError::InvalidNumber { what: "address", text: "zz".into() })
        );
        assert_eq!(parse(&["-n", "0", "/dev/uio0", "0"]), Err(ValidationError::ZeroCount));
        assert_eq!(parse(&["-n"]), Err(ValidationError::MissingOptionValue('n')));
    }

    #[test]
    fn test_help_and_list_short_circuit() {
        assert_eq!(parse(&["-h", "--bogus"]), Ok(Command::Help));
        assert_eq!(parse(&["-l"]), Ok(Command::List));
        assert_eq!(parse(&["-vl"]).map(|c| c.mode()), Ok(Some(InvocationMode::List)));
    }

    #[test]
    fn test_argument_count_errors() {
        assert_eq!(parse(&[]), Err(ValidationError::MissingDevicePath));
        assert_eq!(parse(&["/dev/uio0"]), Err(ValidationError::WrongArgumentCount));
        assert_eq!(
            parse(&["/dev/uio0", "0", "1", "2"]),
            Err(ValidationError::WrongArgumentCount)
        );
        assert_eq!(parse(&["-q"]), Err(ValidationError::UnexpectedOption("-q".into())));
    }

    #[test]
    fn test_verbosity_counts_flags() {
        let inv = parse_args(["-vv", "-v", "/dev/uio0", "0"]).unwrap();
        assert_eq!(inv.verbosity, 3);
    }

    #[test]
    fn test_window_overflow_rejected() {
        let huge = format!("{}", usize::MAX - 3);
        assert_eq!(
            parse(&["-n", "2", "/dev/uio0", huge.as_str()]),
            Err(ValidationError::WindowTooLarge)
        );
    }
}
