//! CLI entry point for the mips241 simulator binary.

use std::collections::BTreeSet;
use std::env;
use std::ffi::{OsStr, OsString};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use mips241_core::{
    boot_program, decode_be_words, disassemble_words, dump_memory, Engine, Machine,
    MachineConfig, MachineError, Status, StdIo,
};
#[cfg(test)]
use tempfile as _;
use tracing_subscriber::EnvFilter;

const USAGE_TEXT: &str = "\
Usage: mips241 <command> [options]

Commands:
  run <image|->      Load a big-endian word image and execute it
  disasm <image>     Print one disassembled line per image word

Options (run):
  -m, --memory <bytes>   Memory capacity in bytes (default: 16 MiB)
  -o, --offset <words>   Word offset to load the image at (default: 0)
  -b, --break <addr>     Pause when pc reaches <addr>; may be repeated
      --dump <file>      Write all of memory to <file> after the run
  -v, --verbose          Log faults and halts to stderr
      --trace            Log every executed instruction to stderr
  -h, --help             Show this help message

Numbers may be decimal or 0x-prefixed hex. RUST_LOG overrides the log level.

Exit status: 0 halted, 2 program fault, 1 setup error.

Examples:
  mips241 run program.mips
  mips241 run program.mips -o 0x10 --dump memory.bin
  mips241 disasm program.mips
";

/// Exit code for a simulation fault.
const EXIT_FAULT: i32 = 2;
/// Exit code for argument, allocation and image errors.
const EXIT_SETUP: i32 = 1;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run(RunArgs),
    Disasm(DisasmArgs),
}

#[derive(Debug, PartialEq, Eq)]
enum ImageSource {
    Path(PathBuf),
    Stdin,
}

#[derive(Debug, PartialEq, Eq)]
struct RunArgs {
    image: ImageSource,
    config: MachineConfig,
    breakpoints: BTreeSet<u32>,
    dump: Option<PathBuf>,
    log_level: LogLevel,
}

#[derive(Debug, PartialEq, Eq)]
struct DisasmArgs {
    image: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum LogLevel {
    #[default]
    Warn,
    Debug,
    Trace,
}

impl LogLevel {
    const fn directive(self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    const fn max_with(self, other: Self) -> Self {
        match (self, other) {
            (Self::Trace, _) | (_, Self::Trace) => Self::Trace,
            (Self::Debug, _) | (_, Self::Debug) => Self::Debug,
            _ => Self::Warn,
        }
    }
}

#[derive(Debug)]
enum ParseResult {
    Command(Command),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    let command_str = first.to_string_lossy().to_string();

    match command_str.as_str() {
        "run" => parse_run_args(args)
            .map(Command::Run)
            .map(ParseResult::Command),
        "disasm" => parse_disasm_args(args)
            .map(Command::Disasm)
            .map(ParseResult::Command),
        other => Err(format!("unknown command: {other}")),
    }
}

fn parse_number(flag: &str, value: Option<&OsStr>) -> Result<u32, String> {
    let value = value.ok_or_else(|| format!("missing value for {flag}"))?;
    let text = value.to_string_lossy();
    let parsed = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse::<u32>(),
    };
    parsed.map_err(|_| format!("invalid number for {flag}: {text}"))
}

#[allow(clippy::while_let_on_iterator)]
fn parse_run_args(mut args: impl Iterator<Item = OsString>) -> Result<RunArgs, String> {
    let mut image: Option<ImageSource> = None;
    let mut config = MachineConfig::default();
    let mut breakpoints = BTreeSet::new();
    let mut dump: Option<PathBuf> = None;
    let mut log_level = LogLevel::default();

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "--verbose" || arg == "-v" {
            log_level = log_level.max_with(LogLevel::Debug);
            continue;
        }

        if arg == "--trace" {
            log_level = LogLevel::Trace;
            continue;
        }

        if arg == "-m" || arg == "--memory" {
            config.memory_bytes = parse_number("--memory", args.next().as_deref())?;
            continue;
        }

        if arg == "-o" || arg == "--offset" {
            config.load_offset = parse_number("--offset", args.next().as_deref())?;
            continue;
        }

        if arg == "-b" || arg == "--break" {
            breakpoints.insert(parse_number("--break", args.next().as_deref())?);
            continue;
        }

        if arg == "--dump" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --dump".to_string())?;
            dump = Some(PathBuf::from(value));
            continue;
        }

        if arg != "-" && arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if image.is_some() {
            return Err("multiple image paths provided".to_string());
        }
        image = Some(if arg == "-" {
            ImageSource::Stdin
        } else {
            ImageSource::Path(PathBuf::from(arg))
        });
    }

    let image = image.ok_or_else(|| "missing image path".to_string())?;
    Ok(RunArgs {
        image,
        config,
        breakpoints,
        dump,
        log_level,
    })
}

fn parse_disasm_args(args: impl Iterator<Item = OsString>) -> Result<DisasmArgs, String> {
    let mut image: Option<PathBuf> = None;

    for arg in args {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if image.is_some() {
            return Err("multiple image paths provided".to_string());
        }
        image = Some(PathBuf::from(arg));
    }

    let image = image.ok_or_else(|| "missing image path".to_string())?;
    Ok(DisasmArgs { image })
}

fn init_logging(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));
    if let Err(error) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
    {
        tracing::debug!(%error, "keeping the existing log subscriber");
    }
}

const fn exit_code(status: Status) -> i32 {
    if status.fault().is_some() {
        EXIT_FAULT
    } else {
        0
    }
}

fn report_status(status: Status) {
    let addr = status.address();
    match status {
        Status::Fault { .. } => eprintln!("{} (address {addr:#010x})", status.describe()),
        Status::Breakpoint { .. } => eprintln!("{} (breakpoint {addr:#010x})", status.describe()),
        Status::Continuing { .. } | Status::Halted { .. } => eprintln!("{}", status.describe()),
    }
}

fn load_machine(args: &RunArgs) -> Result<Machine, i32> {
    let booted = match &args.image {
        ImageSource::Stdin => boot_program(&args.config, io::stdin().lock()),
        ImageSource::Path(path) => File::open(path)
            .map_err(MachineError::from)
            .and_then(|file| boot_program(&args.config, file)),
    };

    booted.map_err(|e| {
        eprintln!("error: failed to load image: {e}");
        EXIT_SETUP
    })
}

fn write_dump(machine: &Machine, path: &Path) {
    let result = File::create(path).and_then(|file| dump_memory(&machine.memory, file));
    if let Err(e) = result {
        tracing::warn!(path = %path.display(), error = %e, "memory dump failed");
        eprintln!("warning: failed to write memory dump {}: {e}", path.display());
    }
}

fn run_program(args: &RunArgs) -> Result<(), i32> {
    init_logging(args.log_level);

    let mut machine = load_machine(args)?;
    let engine = Engine::new();
    let mut io = StdIo::new();

    let status = loop {
        let status = engine.run_until(&mut machine, &mut io, &args.breakpoints);
        if status.is_terminal() {
            break status;
        }
        report_status(status);
        eprint!("{}", machine.arch);
    };

    eprint!("{}", machine.arch);
    report_status(status);

    if let Some(path) = &args.dump {
        write_dump(&machine, path);
    }

    match exit_code(status) {
        0 => Ok(()),
        code => Err(code),
    }
}

fn run_disasm(args: &DisasmArgs) -> Result<(), i32> {
    let words = fs::read(&args.image)
        .map_err(MachineError::from)
        .and_then(|bytes| decode_be_words(&bytes))
        .map_err(|e| {
            eprintln!("error: failed to read image {}: {e}", args.image.display());
            EXIT_SETUP
        })?;

    for row in disassemble_words(&words, 0) {
        println!("{row}");
    }

    Ok(())
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(Command::Run(args))) => match run_program(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Ok(ParseResult::Command(Command::Disasm(args))) => match run_disasm(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
            }
            EXIT_SETUP
        }
    };

    std::process::exit(exit_code);
}
