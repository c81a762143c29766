//! Interactive command loop driving a [Controller].
//!
//! Every character of an input line is a command. Commands on a line are executed in order and
//! whitespace between them is ignored.
//!
//! | Command | Effect |
//! |---|---|
//! | `n` | Run one fetch-execute cycle |
//! | `N` | Run one cycle, then print the state |
//! | `H` | Run cycles until the processor halts |
//! | `d` | Print the state |
//! | `Q` | Write the state to the dump file, then quit |
//! | `q` | Quit |
//! | `?` | List the commands |

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use slog::{debug, info, o, Discard, Logger};

use crate::controller::Controller;
use crate::memory::Memory;
use crate::report::{Origin, StateReport};

/// File the state is written to by [Command::DumpAndQuit] unless configured otherwise.
pub const DEFAULT_DUMP_PATH: &str = "dump_log.txt";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Step,
    StepAndReport,
    RunUntilHalt,
    Report,
    DumpAndQuit,
    Quit,
    Help,
}

impl Command {
    pub fn from_char(c: char) -> Option<Command> {
        match c {
            'n' => Some(Command::Step),
            'N' => Some(Command::StepAndReport),
            'H' => Some(Command::RunUntilHalt),
            'd' => Some(Command::Report),
            'Q' => Some(Command::DumpAndQuit),
            'q' => Some(Command::Quit),
            '?' => Some(Command::Help),
            _ => None,
        }
    }
}

/// Whether the session should keep reading commands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Continue,
    Quit,
}

#[derive(Debug)]
pub enum SessionError {
    /// The dump file could not be written.
    Dump {
        path: PathBuf,
        source: io::Error,
    },

    /// Reading commands or writing output failed.
    Io(io::Error),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SessionError::Dump { path, source } => {
                write!(f, "{} could not be written: {}", path.display(), source)
            }
            SessionError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Dump { source, .. } => Some(source),
            SessionError::Io(err) => Some(err),
        }
    }
}

impl From<io::Error> for SessionError {
    fn from(err: io::Error) -> SessionError {
        SessionError::Io(err)
    }
}

pub struct Session<M> {
    controller: Controller<M>,
    origin: Origin,
    dump_path: PathBuf,
    cycle_limit: Option<u64>,
    logger: Logger,
}

impl<M> Session<M>
where
    M: Memory,
{
    /// Create a session around an initialized controller.
    ///
    /// `origin` decides where the stack and program columns of the printed state start.
    pub fn new(controller: Controller<M>, origin: Origin) -> Session<M> {
        Session {
            controller,
            origin,
            dump_path: PathBuf::from(DEFAULT_DUMP_PATH),
            cycle_limit: None,
            logger: Logger::root(Discard, o!()),
        }
    }

    pub fn with_dump_path<P: AsRef<Path>>(mut self, path: P) -> Session<M> {
        self.dump_path = path.as_ref().to_path_buf();
        self
    }

    /// Bound the number of cycles a single `H` command may run.
    pub fn with_cycle_limit(mut self, limit: Option<u64>) -> Session<M> {
        self.cycle_limit = limit;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Session<M> {
        self.logger = logger.new(o!("component" => "session"));
        self
    }

    pub fn controller(&self) -> &Controller<M> {
        &self.controller
    }

    pub fn report(&self) -> StateReport<'_, M> {
        StateReport::new(&self.controller, self.origin)
    }

    /// Executes a single command.
    pub fn execute<O, E>(
        &mut self,
        command: Command,
        out: &mut O,
        err: &mut E,
    ) -> Result<Outcome, SessionError>
    where
        O: Write,
        E: Write,
    {
        debug!(self.logger, "command"; "command" => ?command);

        match command {
            Command::Step => self.controller.step(),
            Command::StepAndReport => {
                self.controller.step();
                self.report().write_to(out)?;
            }
            Command::RunUntilHalt => match self.cycle_limit {
                None => {
                    let cycles = self.controller.run();
                    info!(self.logger, "halted"; "cycles" => cycles);
                }
                Some(limit) => match self.controller.run_for(limit) {
                    Some(cycles) => info!(self.logger, "halted"; "cycles" => cycles),
                    None => writeln!(err, "Error: no halt reached within {} cycles.", limit)?,
                },
            },
            Command::Report => self.report().write_to(out)?,
            Command::DumpAndQuit => {
                self.dump()?;
                return Ok(Outcome::Quit);
            }
            Command::Quit => return Ok(Outcome::Quit),
            Command::Help => {
                writeln!(out, "n  run one fetch-execute cycle")?;
                writeln!(out, "N  run one cycle and print the state")?;
                writeln!(out, "H  run until a halt is reached")?;
                writeln!(out, "d  print the state")?;
                writeln!(out, "Q  write the state to {} and quit", self.dump_path.display())?;
                writeln!(out, "q  quit")?;
                writeln!(out, "?  list the commands")?;
            }
        }

        Ok(Outcome::Continue)
    }

    fn dump(&self) -> Result<(), SessionError> {
        let path = self.dump_path.clone();

        File::create(&path)
            .and_then(|mut file| self.report().write_to(&mut file))
            .map_err(|source| SessionError::Dump { path: path.clone(), source })?;

        info!(self.logger, "state dumped"; "path" => %path.display());

        Ok(())
    }

    /// Executes every command on `line`.
    ///
    /// Unknown characters are reported on `err` and skipped. Processing stops at the first
    /// command that quits.
    pub fn handle_line<O, E>(
        &mut self,
        line: &str,
        out: &mut O,
        err: &mut E,
    ) -> Result<Outcome, SessionError>
    where
        O: Write,
        E: Write,
    {
        for c in line.chars().filter(|c| !c.is_whitespace()) {
            let command = match Command::from_char(c) {
                Some(command) => command,
                None => {
                    writeln!(
                        err,
                        "Error: Unrecognized command \"{}\". Type ? for the list of commands.",
                        c
                    )?;
                    continue;
                }
            };

            if self.execute(command, out, err)? == Outcome::Quit {
                return Ok(Outcome::Quit);
            }
        }

        Ok(Outcome::Continue)
    }

    /// Prompts for and executes lines from `input` until a quit command or end of input.
    pub fn run<I, O, E>(&mut self, input: I, out: &mut O, err: &mut E) -> Result<(), SessionError>
    where
        I: BufRead,
        O: Write,
        E: Write,
    {
        let mut lines = input.lines();

        loop {
            write!(out, "> ")?;
            out.flush()?;

            let line = match lines.next() {
                Some(line) => line?,
                None => return Ok(()),
            };

            if self.handle_line(&line, out, err)? == Outcome::Quit {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Register;
    use crate::memory::FlatMemory;

    fn session(image: &[u8]) -> Session<FlatMemory> {
        let mut controller = Controller::new(FlatMemory::from_image(image).unwrap());
        controller.initialize(0x0100, 0x0000);
        Session::new(controller, Origin::new(0x0100, 0x0000))
    }

    fn handle(session: &mut Session<FlatMemory>, line: &str) -> (Outcome, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let outcome = session.handle_line(line, &mut out, &mut err).unwrap();
        (outcome, String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
    }

    #[test]
    fn test_command_from_char() {
        assert_eq!(Command::from_char('n'), Some(Command::Step));
        assert_eq!(Command::from_char('N'), Some(Command::StepAndReport));
        assert_eq!(Command::from_char('H'), Some(Command::RunUntilHalt));
        assert_eq!(Command::from_char('x'), None);
        assert_eq!(Command::from_char('h'), None);
    }

    #[test]
    fn test_steps_in_order() {
        // LODI R0, 1; LODI R1, 2; HALT
        let mut session = session(&[0x40, 0x01, 0x41, 0x02]);

        let (outcome, out, err) = handle(&mut session, "nn");

        assert_eq!(outcome, Outcome::Continue);
        assert_eq!(out, "");
        assert_eq!(err, "");
        assert_eq!(session.controller().register(Register::R0), 1);
        assert_eq!(session.controller().register(Register::R1), 2);
        assert!(!session.controller().is_halted());
    }

    #[test]
    fn test_step_and_report() {
        let mut session = session(&[0x40, 0x01]);

        let (_, out, _) = handle(&mut session, "N");

        assert!(out.contains(" REGISTERS"));
        assert!(out.contains("R0 : 0x0001"));
        assert!(out.contains("0x0002: 0x0000  <== PC"));
    }

    #[test]
    fn test_unknown_command_is_skipped() {
        let mut session = session(&[0x40, 0x01]);

        let (outcome, _, err) = handle(&mut session, "x n");

        assert_eq!(outcome, Outcome::Continue);
        assert_eq!(err, "Error: Unrecognized command \"x\". Type ? for the list of commands.\n");
        assert_eq!(session.controller().register(Register::R0), 1);
    }

    #[test]
    fn test_quit_stops_processing() {
        let mut session = session(&[0x40, 0x01]);

        let (outcome, _, _) = handle(&mut session, "qn");

        assert_eq!(outcome, Outcome::Quit);
        assert_eq!(session.controller().register(Register::PC), 0);
    }

    #[test]
    fn test_run_until_halt() {
        let mut session = session(&[0x08, 0x00, 0x08, 0x00]);

        let (_, _, err) = handle(&mut session, "H");

        assert_eq!(err, "");
        assert!(session.controller().is_halted());
        assert_eq!(session.controller().register(Register::PC), 6);
    }

    #[test]
    fn test_run_until_halt_with_limit() {
        // ERR; JMP 0
        let mut session = session(&[0x18, 0x00, 0xC0, 0x00]).with_cycle_limit(Some(50));

        let (outcome, _, err) = handle(&mut session, "H");

        assert_eq!(outcome, Outcome::Continue);
        assert_eq!(err, "Error: no halt reached within 50 cycles.\n");
        assert!(session.controller().has_errored());
        assert!(!session.controller().is_halted());
    }

    #[test]
    fn test_dump_and_quit() {
        let name = format!("ssam-session-dump-{}.txt", std::process::id());
        let path = std::env::temp_dir().join(name);
        let mut session = session(&[0x40, 0x01]).with_dump_path(&path);

        let (outcome, out, _) = handle(&mut session, "nQ");

        assert_eq!(outcome, Outcome::Quit);
        assert_eq!(out, "");

        let dumped = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(dumped, format!("{}\n", session.report()));
    }

    #[test]
    fn test_dump_failure() {
        let path = std::env::temp_dir().join("ssam-missing-directory").join("dump.txt");
        let mut session = session(&[]).with_dump_path(&path);

        let result = session.handle_line("Q", &mut Vec::new(), &mut Vec::new());

        match result {
            Err(SessionError::Dump { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_help_lists_every_command() {
        let mut session = session(&[]);

        let (outcome, out, err) = handle(&mut session, "?");

        assert_eq!(outcome, Outcome::Continue);
        assert_eq!(err, "");

        let listed: Vec<char> = out.lines().filter_map(|line| line.chars().next()).collect();
        assert_eq!(listed, vec!['n', 'N', 'H', 'd', 'Q', 'q', '?']);
        assert!(listed.iter().all(|c| Command::from_char(*c).is_some()));
    }

    #[test]
    fn test_run_reads_until_quit() {
        let mut session = session(&[0x40, 0x01, 0x41, 0x02]);
        let input = io::Cursor::new("n\n\nd\nq\nn\n");
        let mut out = Vec::new();
        let mut err = Vec::new();

        session.run(input, &mut out, &mut err).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.matches("> ").count(), 4);
        assert!(out.contains("R0 : 0x0001"));
        assert_eq!(session.controller().register(Register::R1), 0);
    }

    #[test]
    fn test_run_stops_at_end_of_input() {
        let mut session = session(&[0x40, 0x01]);
        let mut out = Vec::new();

        session.run(io::Cursor::new("n"), &mut out, &mut Vec::new()).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "> > ");
        assert_eq!(session.controller().register(Register::R0), 1);
    }
}
