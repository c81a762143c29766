use std::io::{stderr, stdin, stdout};

use clap::{App, Arg, ArgMatches};
use slog::{info, o, Discard, Drain, Logger};
use slog_term::{FullFormat, TermDecorator};

use ssam::{
    controller::Controller,
    error::{LoadError, ParseError},
    instruction::Register,
    memory::FlatMemory,
    parsing::parse_hex_word,
    report::Origin,
    session::{Session, SessionError, DEFAULT_DUMP_PATH},
};

enum Error {
    Argument { name: &'static str, source: ParseError },
    Binary { path: String, source: std::io::Error },
    Load(LoadError),
    Session(SessionError),
}

impl From<LoadError> for Error {
    fn from(e: LoadError) -> Error {
        Error::Load(e)
    }
}

impl From<SessionError> for Error {
    fn from(e: SessionError) -> Error {
        Error::Session(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Argument { name, source } => write!(f, "invalid {}: {}", name, source),
            Error::Binary { path, source } => {
                write!(f, "specified binary file \"{}\" could not be loaded: {}", path, source)
            }
            Error::Load(e) => write!(f, "{}", e),
            Error::Session(e) => write!(f, "{}", e),
        }
    }
}

fn parse_arguments() -> ArgMatches<'static> {
    App::new("ssam")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Mitja Karhusaari <mitja@karhusaari.me>")
        .about("Interactive simulator for SSAM programs")
        .arg(Arg::with_name("binary")
             .help("Program image of big-endian instruction words")
             .value_name("BINARY")
             .required(true)
             .index(1))
        .arg(Arg::with_name("sp")
             .help("Initial stack pointer, e.g. 0x0100")
             .value_name("SP")
             .required(true)
             .index(2))
        .arg(Arg::with_name("pc")
             .help("Initial program counter, e.g. 0x0000")
             .value_name("PC")
             .required(true)
             .index(3))
        .arg(Arg::with_name("verbose")
             .help("Enables verbose logging")
             .long("verbose")
             .short("v"))
        .arg(Arg::with_name("dump-file")
             .help("File the Q command writes the state to")
             .long("dump-file")
             .value_name("PATH")
             .default_value(DEFAULT_DUMP_PATH))
        .arg(Arg::with_name("cycle-limit")
             .help("Maximum number of cycles the H command runs")
             .long("cycle-limit")
             .value_name("N")
             .validator(|v| v.parse::<u64>().map(|_| ()).map_err(|e| e.to_string())))
        .get_matches()
}

fn hex_argument(args: &ArgMatches, name: &'static str) -> Result<u16, Error> {
    let value = args.value_of(name).unwrap_or_default();

    parse_hex_word(value).map_err(|source| Error::Argument { name, source })
}

fn build_logger(verbose: bool) -> Logger {
    if verbose {
        let decorator = TermDecorator::new().build();
        let drain = FullFormat::new(decorator).build().fuse();
        let drain = slog_async::Async::new(drain).build().fuse();
        Logger::root(drain, o!())
    } else {
        Logger::root(Discard, o!())
    }
}

fn main() {
    let args = parse_arguments();
    let logger = build_logger(args.is_present("verbose"));

    if let Err(e) = run(&args, logger) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &ArgMatches, logger: Logger) -> Result<(), Error> {
    println!("Initializing...");

    let sp = hex_argument(args, "sp")?;
    let pc = hex_argument(args, "pc")?;

    let mut controller = Controller::with_logger(FlatMemory::new(), logger.clone());
    controller.initialize(sp, pc);

    println!(
        "Stack Pointer: 0x{:04x} / Base Pointer: 0x{:04x} / Program Counter: 0x{:04x}",
        controller.register(Register::SP),
        controller.register(Register::BP),
        controller.register(Register::PC),
    );

    let path = args.value_of("binary").unwrap_or_default();
    let image = std::fs::read(path)
        .map_err(|source| Error::Binary { path: path.to_string(), source })?;

    println!("Loading program \"{}\"", path);
    controller.load(&image)?;
    info!(logger, "program loaded"; "path" => path, "size" => image.len());

    println!("Welcome to SSAM VM.");
    println!();

    let cycle_limit = args.value_of("cycle-limit").and_then(|v| v.parse().ok());
    let dump_path = args.value_of("dump-file").unwrap_or(DEFAULT_DUMP_PATH);

    let mut session = Session::new(controller, Origin::new(sp, pc))
        .with_dump_path(dump_path)
        .with_cycle_limit(cycle_limit)
        .with_logger(logger);

    let stdin = stdin();
    session.run(stdin.lock(), &mut stdout(), &mut stderr())?;

    Ok(())
}
