//! [Controller] for executing SSAM programs.

use std::ops::{Index, IndexMut};

use slog::{debug, o, trace, warn, Discard, Logger};

use crate::error::LoadError;
use crate::instruction::{
    DecodeError, Flow, Instruction, Jump, JumpCondition, Manipulate, Register, Transfer,
};
use crate::memory::Memory;

/// The register file of the SSAM processor.
///
/// Indexed by [Register]. All registers are unsigned 16-bit words.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registers {
    r: [u16; 9],
}

impl Registers {
    /// Iterates over the registers and their values in register file order.
    pub fn iter(&self) -> impl Iterator<Item = (Register, u16)> + '_ {
        Register::ALL.iter().map(move |reg| (*reg, self[*reg]))
    }
}

impl Index<Register> for Registers {
    type Output = u16;

    fn index(&self, reg: Register) -> &u16 {
        &self.r[reg.index()]
    }
}

impl IndexMut<Register> for Registers {
    fn index_mut(&mut self, reg: Register) -> &mut u16 {
        &mut self.r[reg.index()]
    }
}

/// The sticky status flags.
///
/// Both flags are only cleared by [Controller::initialize].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Flags {
    halted: bool,
    errored: bool,
}

impl Flags {
    /// Clears all flags.
    fn zero(&mut self) {
        self.halted = false;
        self.errored = false;
    }

    /// True once a halt instruction has been executed.
    pub fn halted(&self) -> bool {
        self.halted
    }

    /// True once an illegal or fault instruction has been executed.
    pub fn errored(&self) -> bool {
        self.errored
    }
}

/// The controller contains the register file and flags of the SSAM processor and the memory
/// it operates on.
///
/// One cycle is a [fetch](Controller::fetch) followed by an [execute](Controller::execute). An
/// error does not stop the processor; only a halt does.
#[derive(Clone)]
pub struct Controller<M> {
    memory: M,
    registers: Registers,
    flags: Flags,
    logger: Logger,
}

impl<M> Controller<M>
where
    M: Memory,
{
    /// Create a new controller with all registers zeroed.
    ///
    /// [initialize](Controller::initialize) still needs to be called before the first cycle.
    pub fn new(memory: M) -> Controller<M> {
        Controller::with_logger(memory, None::<Logger>)
    }

    /// Create a new controller that logs executed instructions to `logger`.
    pub fn with_logger<L>(memory: M, logger: L) -> Controller<M>
    where
        L: Into<Option<Logger>>,
    {
        let logger = logger
            .into()
            .unwrap_or(Logger::root(Discard, o!()))
            .new(o!("component" => "controller"));

        Controller {
            memory,
            registers: Registers::default(),
            flags: Flags::default(),
            logger,
        }
    }

    /// Resets the registers and clears the flags.
    ///
    /// The base pointer is set two bytes below the stack pointer. Memory is left untouched.
    pub fn initialize(&mut self, sp: u16, pc: u16) {
        self.registers = Registers::default();
        self.registers[Register::SP] = sp;
        self.registers[Register::BP] = sp.wrapping_sub(2);
        self.registers[Register::PC] = pc;
        self.flags.zero();

        debug!(self.logger, "initialized";
            "sp" => format!("0x{:04x}", sp),
            "pc" => format!("0x{:04x}", pc));
    }

    /// Copy a program image into memory starting at address 0.
    pub fn load(&mut self, image: &[u8]) -> Result<(), LoadError> {
        self.memory.load(image)?;

        debug!(self.logger, "loaded program image"; "size" => image.len());

        Ok(())
    }

    /// Reads the word at the program counter into the instruction register and advances the
    /// program counter past it.
    pub fn fetch(&mut self) {
        if self.flags.halted {
            return;
        }

        let pc = self.registers[Register::PC];
        self.registers[Register::IR] = self.memory.read_word(pc);
        self.registers[Register::PC] = pc.wrapping_add(2);
    }

    /// Decodes the instruction register and executes it.
    pub fn execute(&mut self) {
        if self.flags.halted {
            return;
        }

        let word = self.registers[Register::IR];

        match Instruction::decode(word) {
            Ok(ins) => {
                trace!(self.logger, "execute";
                    "word" => format!("0x{:04x}", word),
                    "instruction" => %ins);

                self.emulate(ins);
            }
            Err(err) => {
                warn!(self.logger, "illegal instruction";
                    "word" => format!("0x{:04x}", word),
                    "class" => %err.class);

                self.flags.errored = true;
            }
        }
    }

    /// Runs one fetch-execute cycle.
    pub fn step(&mut self) {
        self.fetch();
        self.execute();
    }

    /// Runs cycles until the processor halts and returns the number of cycles executed.
    ///
    /// Never returns for a program that does not halt.
    pub fn run(&mut self) -> u64 {
        let mut cycles = 0;

        while !self.flags.halted {
            self.step();
            cycles += 1;
        }

        cycles
    }

    /// Runs at most `limit` cycles.
    ///
    /// # Returns
    /// The number of cycles executed if the processor halted, `None` if it was still running
    /// after `limit` cycles.
    pub fn run_for(&mut self, limit: u64) -> Option<u64> {
        let mut cycles = 0;

        while !self.flags.halted {
            if cycles == limit {
                return None;
            }

            self.step();
            cycles += 1;
        }

        Some(cycles)
    }

    pub fn is_halted(&self) -> bool {
        self.flags.halted
    }

    pub fn has_errored(&self) -> bool {
        self.flags.errored
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Returns the value of a register.
    pub fn register(&self, reg: Register) -> u16 {
        self.registers[reg]
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Decodes the word currently held in the instruction register.
    pub fn current_instruction(&self) -> Result<Instruction, DecodeError> {
        Instruction::decode(self.registers[Register::IR])
    }

    fn emulate(&mut self, ins: Instruction) {
        match ins {
            Instruction::Flow(ins) => self.emulate_flow(ins),
            Instruction::Transfer(ins) => self.emulate_transfer(ins),
            Instruction::Manipulate(ins) => self.emulate_manipulate(ins),
            Instruction::Jump(ins) => self.emulate_jump(ins),
        }
    }

    fn emulate_flow(&mut self, ins: Flow) {
        match ins {
            Flow::Halt => {
                debug!(self.logger, "halt reached";
                    "pc" => format!("0x{:04x}", self.registers[Register::PC]));
                self.flags.halted = true;
            }
            Flow::NoOperation => (),
            Flow::Return => {
                let bp = self.registers[Register::BP];
                self.registers[Register::BP] = self.memory.read_word(bp);

                let sp = bp.wrapping_sub(2);
                self.registers[Register::SP] = sp;
                self.registers[Register::PC] = self.memory.read_word(sp);
            }
            Flow::Fault => {
                debug!(self.logger, "error raised";
                    "pc" => format!("0x{:04x}", self.registers[Register::PC]));
                self.flags.errored = true;
            }
        }
    }

    /// Address `offset` bytes away from the value of `base`, wrapping.
    fn indexed(&self, base: Register, offset: i16) -> u16 {
        self.registers[base].wrapping_add(offset as u16)
    }

    fn emulate_transfer(&mut self, ins: Transfer) {
        match ins {
            Transfer::LoadImmediate { dest, value } => {
                self.registers[dest] = value as u16;
            }
            Transfer::LoadAbsolute { dest, address } => {
                self.registers[dest] = self.memory.read_word(address as u16);
            }
            Transfer::LoadIndirect { dest, base } => {
                self.registers[dest] = self.memory.read_word(self.registers[base]);
            }
            Transfer::LoadIndexed { dest, base, offset } => {
                let addr = self.indexed(base, offset);
                self.registers[dest] = self.memory.read_word(addr);
            }
            Transfer::StoreAbsolute { src, address } => {
                self.memory.write_word(address as u16, self.registers[src]);
            }
            Transfer::StoreIndirect { src, base } => {
                self.memory.write_word(self.registers[base], self.registers[src]);
            }
            Transfer::StoreIndexed { src, base, offset } => {
                let addr = self.indexed(base, offset);
                self.memory.write_word(addr, self.registers[src]);
            }
        }
    }

    fn emulate_manipulate(&mut self, ins: Manipulate) {
        let r = &mut self.registers;

        match ins {
            Manipulate::Negate { src } => r[Register::AC] = r[src].wrapping_neg(),
            Manipulate::AddRegister { lhs, rhs } => r[Register::AC] = r[lhs].wrapping_add(r[rhs]),
            Manipulate::AddImmediate { lhs, value } => {
                r[Register::AC] = r[lhs].wrapping_add(value as u16)
            }
            Manipulate::SubtractRegister { lhs, rhs } => {
                r[Register::AC] = r[lhs].wrapping_sub(r[rhs])
            }
            Manipulate::SubtractImmediate { lhs, value } => {
                r[Register::AC] = r[lhs].wrapping_sub(value as u16)
            }
            Manipulate::Move { src, dest } => r[dest] = r[src],
        }
    }

    fn emulate_jump(&mut self, ins: Jump) {
        match ins {
            Jump::Branch { condition, target } => {
                let ac = self.registers[Register::AC];

                let taken = match condition {
                    JumpCondition::Always => true,
                    JumpCondition::Zero => ac == 0,
                    JumpCondition::Negative => (ac as i16) < 0,
                };

                if taken {
                    self.registers[Register::PC] = target;
                }
            }

            Jump::Call { target } => {
                // Push the return address, then the caller's frame pointer.
                let sp = self.registers[Register::SP];
                self.memory.write_word(sp, self.registers[Register::PC]);
                self.registers[Register::PC] = target;

                let sp = sp.wrapping_add(2);
                self.memory.write_word(sp, self.registers[Register::BP]);
                self.registers[Register::BP] = sp;
                self.registers[Register::SP] = sp.wrapping_add(2);
            }
        }
    }
}
