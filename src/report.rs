//! Human readable dumps of the processor state.
//!
//! A [StateReport] renders three columns side by side: the register file, the stack starting
//! at the initial base pointer, and the program starting at the initial program counter. The
//! words at SP and BP are always part of the stack column.
//!
//! ```text
//! [HALT]
//!
//!  REGISTERS                MEMORY                PROGRAM MEMORY
//! ----------------------------------------------------------------------
//! R0 : 0x0000          0x00fe: 0x0000  [BP]       0x0000: 0x4105
//! R1 : 0x0005          0x0100: 0x0000  [SP]       0x0002: 0x0000
//! R2 : 0x0000                                     0x0004: 0x0000  <== PC
//! ```

use std::fmt;
use std::io::{self, Write};

use itertools::{EitherOrBoth, Itertools};

use crate::controller::Controller;
use crate::instruction::Register;
use crate::memory::Memory;

/// Number of program words shown.
pub const PROGRAM_ROWS: usize = 20;

/// Upper bound on the number of stack words shown from the initial base pointer. The words at
/// SP and BP are listed after this window when they fall outside of it.
pub const MAX_STACK_ROWS: usize = 32;

const HEADER: &str = " REGISTERS                MEMORY                PROGRAM MEMORY";
const REGISTER_WIDTH: usize = 21;
const STACK_WIDTH: usize = 27;
const ELISION: &str = "   ...";

/// The addresses the report columns start from, taken from the machine's initial state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Origin {
    /// First stack address shown. This is the initial base pointer.
    pub stack_base: u16,

    /// First program address shown.
    pub program_start: u16,
}

impl Origin {
    /// The origin of a machine initialized with `sp` and `pc`.
    pub fn new(sp: u16, pc: u16) -> Origin {
        Origin {
            stack_base: sp.wrapping_sub(2),
            program_start: pc,
        }
    }
}

/// A snapshot rendering of a [Controller].
pub struct StateReport<'c, M> {
    controller: &'c Controller<M>,
    origin: Origin,
}

impl<'c, M> StateReport<'c, M>
where
    M: Memory,
{
    pub fn new(controller: &'c Controller<M>, origin: Origin) -> StateReport<'c, M> {
        StateReport { controller, origin }
    }

    fn status(&self) -> Option<&'static str> {
        match (self.controller.has_errored(), self.controller.is_halted()) {
            (true, true) => Some("[ERROR]      [HALT]"),
            (true, false) => Some("[ERROR]"),
            (false, true) => Some("[HALT]"),
            (false, false) => None,
        }
    }

    fn register_column(&self) -> Vec<String> {
        self.controller
            .registers()
            .iter()
            .map(|(reg, value)| format!("{:<3}: 0x{:04x}          ", reg, value))
            .collect()
    }

    fn stack_rows(&self) -> usize {
        let sp = self.controller.register(Register::SP);
        let bp = self.controller.register(Register::BP);
        let top = std::cmp::max(sp, bp);

        if top < self.origin.stack_base {
            return 1;
        }

        let rows = (top - self.origin.stack_base) as usize / 2 + 1;
        std::cmp::min(rows, MAX_STACK_ROWS)
    }

    fn in_window(&self, addr: u16) -> bool {
        let distance = addr.wrapping_sub(self.origin.stack_base) as usize;
        distance % 2 == 0 && distance / 2 < self.stack_rows()
    }

    /// Addresses of the stack rows. `None` separates the window starting at the initial base
    /// pointer from the SP and BP rows that fall outside of it.
    fn stack_addresses(&self) -> Vec<Option<u16>> {
        let sp = self.controller.register(Register::SP);
        let bp = self.controller.register(Register::BP);

        let mut addresses: Vec<_> = (0..self.stack_rows())
            .map(|row| Some(self.origin.stack_base.wrapping_add(2 * row as u16)))
            .collect();

        let outside: Vec<u16> = [bp, sp]
            .iter()
            .copied()
            .filter(|addr| !self.in_window(*addr))
            .sorted()
            .dedup()
            .collect();

        if !outside.is_empty() {
            addresses.push(None);
            addresses.extend(outside.into_iter().map(Some));
        }

        addresses
    }

    fn stack_column(&self) -> Vec<String> {
        let sp = self.controller.register(Register::SP);
        let bp = self.controller.register(Register::BP);
        let memory = self.controller.memory();

        self.stack_addresses()
            .into_iter()
            .map(|addr| {
                let addr = match addr {
                    Some(addr) => addr,
                    None => return format!("{:w$}", ELISION, w = STACK_WIDTH),
                };

                let marker = if addr == sp {
                    "  [SP]       "
                } else if addr == bp {
                    "  [BP]       "
                } else {
                    "             "
                };

                format!("0x{:04x}: 0x{:04x}{}", addr, memory.read_word(addr), marker)
            })
            .collect()
    }

    fn program_column(&self) -> Vec<String> {
        let pc = self.controller.register(Register::PC);
        let memory = self.controller.memory();

        (0..PROGRAM_ROWS)
            .map(|row| {
                let addr = self.origin.program_start.wrapping_add(2 * row as u16);
                let cell = format!("0x{:04x}: 0x{:04x}", addr, memory.read_word(addr));

                if addr == pc {
                    cell + "  <== PC"
                } else {
                    cell
                }
            })
            .collect()
    }

    /// Renders the report, one string per line, without line terminators.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if let Some(status) = self.status() {
            lines.push(status.to_string());
            lines.push(String::new());
        }

        lines.push(HEADER.to_string());
        lines.push("-".repeat(70));

        let rows = self
            .register_column()
            .into_iter()
            .zip_longest(self.stack_column())
            .map(|cells| match cells {
                EitherOrBoth::Both(reg, stack) => reg + &stack,
                EitherOrBoth::Left(reg) => format!("{}{:w$}", reg, "", w = STACK_WIDTH),
                EitherOrBoth::Right(stack) => format!("{:w$}{}", "", stack, w = REGISTER_WIDTH),
            })
            .zip_longest(self.program_column())
            .map(|cells| match cells {
                EitherOrBoth::Both(left, program) => left + &program,
                EitherOrBoth::Left(left) => left,
                EitherOrBoth::Right(program) => {
                    format!("{:w$}{}", "", program, w = REGISTER_WIDTH + STACK_WIDTH)
                }
            })
            .map(|row| row.trim_end().to_string());

        lines.extend(rows);
        lines
    }

    /// Writes the report to `sink`, terminating every line with a newline.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        for line in self.lines() {
            writeln!(sink, "{}", line)?;
        }

        sink.flush()
    }
}

impl<'c, M> fmt::Display for StateReport<'c, M>
where
    M: Memory,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.lines().iter().join("\n"))
    }
}
