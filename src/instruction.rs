//! Types for representing instructions and their parts.
//!
//! An instruction word is decoded in two levels: the top two bits select a [Class] and the
//! bits below select an operation within that class. The result is one of the closed enums
//! [Flow], [Transfer], [Manipulate] and [Jump], wrapped in an [Instruction], with every operand
//! field already extracted and typed.
//!
//! ```text
//!  15 14 13 12 11 10  9  8  7  6  5  4  3  2  1  0
//! +-----+--------+--------+-----------------------+
//! |class|  sub   |  regA  |  address / immediate  |   transfer, manipulate
//! +-----+--------+--------+--------+--------------+
//! |class|  sub   |  regA  |  regB  |    offset    |   register forms
//! +-----+-----+--+--------+--------+--------------+
//! |class| sub |            target                 |   jump
//! +-----+-----+-----------------------------------+
//! ```

use std::convert::TryFrom;
use std::fmt;

/// The registers of the SSAM processor.
///
/// The first eight can be named by the 3-bit register fields of an instruction. [Register::IR]
/// only holds the most recently fetched word.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Register {
    R0,
    R1,
    R2,
    R3,
    /// Accumulator. Destination of every manipulate instruction except `MOV`.
    AC,
    /// Stack pointer. The stack grows towards higher addresses.
    SP,
    /// Base pointer of the current frame.
    BP,
    /// Program counter, address of the next word to fetch.
    PC,
    /// Instruction register.
    IR,
}

impl Register {
    /// All registers in register file order.
    pub const ALL: [Register; 9] = [
        Register::R0,
        Register::R1,
        Register::R2,
        Register::R3,
        Register::AC,
        Register::SP,
        Register::BP,
        Register::PC,
        Register::IR,
    ];

    /// Returns the register selected by the lowest three bits of `field`.
    pub fn from_field(field: u16) -> Register {
        match field & 0b111 {
            0 => Register::R0,
            1 => Register::R1,
            2 => Register::R2,
            3 => Register::R3,
            4 => Register::AC,
            5 => Register::SP,
            6 => Register::BP,
            _ => Register::PC,
        }
    }

    /// Position in the register file.
    pub fn index(&self) -> usize {
        match self {
            Register::R0 => 0,
            Register::R1 => 1,
            Register::R2 => 2,
            Register::R3 => 3,
            Register::AC => 4,
            Register::SP => 5,
            Register::BP => 6,
            Register::PC => 7,
            Register::IR => 8,
        }
    }

    /// The value of the register field that selects this register.
    ///
    /// [Register::IR] cannot be selected and has no field value.
    pub fn field(&self) -> Option<u16> {
        match self {
            Register::IR => None,
            reg => Some(reg.index() as u16),
        }
    }

    /// Field value used when encoding. [Register::IR] has no field and encodes as `R0`.
    fn encode(&self) -> u16 {
        self.field().unwrap_or(0)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Register::R0 => "R0",
            Register::R1 => "R1",
            Register::R2 => "R2",
            Register::R3 => "R3",
            Register::AC => "AC",
            Register::SP => "SP",
            Register::BP => "BP",
            Register::PC => "PC",
            Register::IR => "IR",
        };

        f.pad(name)
    }
}

/// Interprets an 8-bit immediate field as a two's complement value.
///
/// `0x00..=0x7F` map to `0..=127`, `0x80..=0xFF` map to `-128..=-1`.
pub fn sign_extend_immediate(field: u8) -> i16 {
    field as i8 as i16
}

/// Interprets the lowest five bits of `field` as a two's complement offset.
///
/// `0x00..=0x0F` map to `0..=15`, `0x10..=0x1F` map to `-16..=-1`. Higher bits are ignored.
pub fn sign_extend_offset(field: u8) -> i16 {
    let field = (field & 0x1F) as i16;

    if field & 0x10 != 0 {
        field - 32
    } else {
        field
    }
}

/// The instruction class, selected by bits 15:14.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Class {
    Flow,
    Transfer,
    Manipulate,
    Jump,
}

impl Class {
    /// Returns the class of an instruction word.
    pub fn of(word: u16) -> Class {
        match word >> 14 {
            0b00 => Class::Flow,
            0b01 => Class::Transfer,
            0b10 => Class::Manipulate,
            _ => Class::Jump,
        }
    }

    fn bits(&self) -> u16 {
        match self {
            Class::Flow => 0b00 << 14,
            Class::Transfer => 0b01 << 14,
            Class::Manipulate => 0b10 << 14,
            Class::Jump => 0b11 << 14,
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Class::Flow => write!(f, "flow"),
            Class::Transfer => write!(f, "transfer"),
            Class::Manipulate => write!(f, "manipulate"),
            Class::Jump => write!(f, "jump"),
        }
    }
}

/// Control instructions. Only bits 12:11 are significant.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Stops the processor. (`HALT`)
    Halt,

    /// Does nothing besides the program counter increment of the fetch. (`NOP`)
    NoOperation,

    /// Tears down the current frame and jumps to the saved return address. (`RTN`)
    Return,

    /// Raises the error flag without halting. (`ERR`)
    Fault,
}

/// Moves words between registers and memory.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transfer {
    /// `dest <- immediate`. (`LODI`)
    LoadImmediate { dest: Register, value: i16 },

    /// `dest <- M[address]`. (`LODA`)
    LoadAbsolute { dest: Register, address: u8 },

    /// `dest <- M[base]`. (`LODR`)
    LoadIndirect { dest: Register, base: Register },

    /// `dest <- M[base + offset]`. (`LODRD`)
    LoadIndexed { dest: Register, base: Register, offset: i16 },

    /// `M[address] <- src`. (`STOA`)
    StoreAbsolute { src: Register, address: u8 },

    /// `M[base] <- src`. (`STOR`)
    StoreIndirect { src: Register, base: Register },

    /// `M[base + offset] <- src`. (`STORD`)
    StoreIndexed { src: Register, base: Register, offset: i16 },
}

/// Arithmetic into the accumulator, and register to register moves.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Manipulate {
    /// `AC <- -src`. (`NEG`)
    Negate { src: Register },

    /// `AC <- lhs + rhs`. (`ADDR`)
    AddRegister { lhs: Register, rhs: Register },

    /// `AC <- lhs + value`. (`ADDI`)
    AddImmediate { lhs: Register, value: i16 },

    /// `AC <- lhs - rhs`. (`SUBR`)
    SubtractRegister { lhs: Register, rhs: Register },

    /// `AC <- lhs - value`. (`SUBI`)
    SubtractImmediate { lhs: Register, value: i16 },

    /// `dest <- src`. (`MOV`, source in bits 10:8, destination in bits 7:5)
    Move { src: Register, dest: Register },
}

/// Describes the predicate of a jump.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JumpCondition {
    /// Unconditional jump. (`JMP`)
    Always,

    /// Jump if the accumulator is zero. (`JMPZ`)
    Zero,

    /// Jump if the accumulator is negative as a signed word. (`JMPN`)
    Negative,
}

/// Instructions that set the program counter to a 12-bit target address.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Jump {
    /// Changes the program counter if the condition holds.
    Branch { condition: JumpCondition, target: u16 },

    /// Pushes the return address and a new frame, then jumps. (`CALL`)
    Call { target: u16 },
}

/// A decoded instruction word.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Flow(Flow),
    Transfer(Transfer),
    Manipulate(Manipulate),
    Jump(Jump),
}

/// An instruction word with no defined meaning.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DecodeError {
    /// The offending word.
    pub word: u16,

    /// The class the word belongs to.
    pub class: Class,

    /// The undefined sub-opcode within the class.
    pub sub_opcode: u16,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "illegal {} instruction 0x{:04x} (sub-opcode {:03b})",
            self.class, self.word, self.sub_opcode
        )
    }
}

impl std::error::Error for DecodeError {}

const TARGET_MASK: u16 = 0x0FFF;

fn reg_a(word: u16) -> Register {
    Register::from_field(word >> 8)
}

fn reg_b(word: u16) -> Register {
    Register::from_field(word >> 5)
}

fn low_byte(word: u16) -> u8 {
    (word & 0x00FF) as u8
}

impl Instruction {
    /// Decodes an instruction word.
    ///
    /// # Errors
    /// A [DecodeError] if the sub-opcode is undefined for the word's class.
    pub fn decode(word: u16) -> Result<Instruction, DecodeError> {
        match Class::of(word) {
            Class::Flow => Ok(Instruction::Flow(Self::decode_flow(word))),
            Class::Transfer => Self::decode_transfer(word).map(Instruction::Transfer),
            Class::Manipulate => Self::decode_manipulate(word).map(Instruction::Manipulate),
            Class::Jump => Ok(Instruction::Jump(Self::decode_jump(word))),
        }
    }

    fn decode_flow(word: u16) -> Flow {
        match (word >> 11) & 0b11 {
            0b00 => Flow::Halt,
            0b01 => Flow::NoOperation,
            0b10 => Flow::Return,
            _ => Flow::Fault,
        }
    }

    fn decode_transfer(word: u16) -> Result<Transfer, DecodeError> {
        let sub = (word >> 11) & 0b111;
        let offset = sign_extend_offset(low_byte(word));

        let ins = match sub {
            0b000 => Transfer::LoadImmediate {
                dest: reg_a(word),
                value: sign_extend_immediate(low_byte(word)),
            },
            0b001 => Transfer::LoadAbsolute { dest: reg_a(word), address: low_byte(word) },
            0b010 => Transfer::LoadIndirect { dest: reg_a(word), base: reg_b(word) },
            0b011 => Transfer::LoadIndexed { dest: reg_a(word), base: reg_b(word), offset },
            0b100 => Transfer::StoreAbsolute { src: reg_a(word), address: low_byte(word) },
            0b101 => Transfer::StoreIndirect { src: reg_a(word), base: reg_b(word) },
            0b110 => Transfer::StoreIndexed { src: reg_a(word), base: reg_b(word), offset },
            sub_opcode => return Err(DecodeError { word, class: Class::Transfer, sub_opcode }),
        };

        Ok(ins)
    }

    fn decode_manipulate(word: u16) -> Result<Manipulate, DecodeError> {
        let sub = (word >> 11) & 0b111;
        let value = sign_extend_immediate(low_byte(word));

        let ins = match sub {
            0b000 => Manipulate::Negate { src: reg_a(word) },
            0b001 => Manipulate::AddRegister { lhs: reg_a(word), rhs: reg_b(word) },
            0b010 => Manipulate::AddImmediate { lhs: reg_a(word), value },
            0b011 => Manipulate::SubtractRegister { lhs: reg_a(word), rhs: reg_b(word) },
            0b100 => Manipulate::SubtractImmediate { lhs: reg_a(word), value },
            0b111 => Manipulate::Move { src: reg_a(word), dest: reg_b(word) },
            sub_opcode => return Err(DecodeError { word, class: Class::Manipulate, sub_opcode }),
        };

        Ok(ins)
    }

    fn decode_jump(word: u16) -> Jump {
        let target = word & TARGET_MASK;

        match (word >> 12) & 0b11 {
            0b00 => Jump::Branch { condition: JumpCondition::Always, target },
            0b01 => Jump::Branch { condition: JumpCondition::Zero, target },
            0b10 => Jump::Branch { condition: JumpCondition::Negative, target },
            _ => Jump::Call { target },
        }
    }

    /// Returns the class of the instruction.
    pub fn class(&self) -> Class {
        match self {
            Instruction::Flow(_) => Class::Flow,
            Instruction::Transfer(_) => Class::Transfer,
            Instruction::Manipulate(_) => Class::Manipulate,
            Instruction::Jump(_) => Class::Jump,
        }
    }

    /// Encodes the instruction into its word.
    ///
    /// Fields are truncated to their width: 8-bit immediates, 5-bit offsets and 12-bit targets.
    /// A [Register::IR] operand cannot be named by a register field and encodes as field `000`,
    /// so it decodes back as [Register::R0].
    pub fn encode(&self) -> u16 {
        fn sub(bits: u16) -> u16 {
            bits << 11
        }

        fn a(reg: Register) -> u16 {
            reg.encode() << 8
        }

        fn b(reg: Register) -> u16 {
            reg.encode() << 5
        }

        fn imm(value: i16) -> u16 {
            value as u16 & 0x00FF
        }

        fn off(offset: i16) -> u16 {
            offset as u16 & 0x001F
        }

        let body = match *self {
            Instruction::Flow(Flow::Halt) => sub(0b00),
            Instruction::Flow(Flow::NoOperation) => sub(0b01),
            Instruction::Flow(Flow::Return) => sub(0b10),
            Instruction::Flow(Flow::Fault) => sub(0b11),

            Instruction::Transfer(t) => match t {
                Transfer::LoadImmediate { dest, value } => sub(0b000) | a(dest) | imm(value),
                Transfer::LoadAbsolute { dest, address } => sub(0b001) | a(dest) | address as u16,
                Transfer::LoadIndirect { dest, base } => sub(0b010) | a(dest) | b(base),
                Transfer::LoadIndexed { dest, base, offset } => {
                    sub(0b011) | a(dest) | b(base) | off(offset)
                }
                Transfer::StoreAbsolute { src, address } => sub(0b100) | a(src) | address as u16,
                Transfer::StoreIndirect { src, base } => sub(0b101) | a(src) | b(base),
                Transfer::StoreIndexed { src, base, offset } => {
                    sub(0b110) | a(src) | b(base) | off(offset)
                }
            },

            Instruction::Manipulate(m) => match m {
                Manipulate::Negate { src } => sub(0b000) | a(src),
                Manipulate::AddRegister { lhs, rhs } => sub(0b001) | a(lhs) | b(rhs),
                Manipulate::AddImmediate { lhs, value } => sub(0b010) | a(lhs) | imm(value),
                Manipulate::SubtractRegister { lhs, rhs } => sub(0b011) | a(lhs) | b(rhs),
                Manipulate::SubtractImmediate { lhs, value } => sub(0b100) | a(lhs) | imm(value),
                Manipulate::Move { src, dest } => sub(0b111) | a(src) | b(dest),
            },

            Instruction::Jump(j) => match j {
                Jump::Branch { condition, target } => {
                    let sub = match condition {
                        JumpCondition::Always => 0x0000,
                        JumpCondition::Zero => 0x1000,
                        JumpCondition::Negative => 0x2000,
                    };

                    sub | (target & TARGET_MASK)
                }
                Jump::Call { target } => 0x3000 | (target & TARGET_MASK),
            },
        };

        self.class().bits() | body
    }
}

impl TryFrom<u16> for Instruction {
    type Error = DecodeError;

    fn try_from(word: u16) -> Result<Instruction, DecodeError> {
        Instruction::decode(word)
    }
}

impl From<Instruction> for u16 {
    fn from(ins: Instruction) -> u16 {
        ins.encode()
    }
}

impl From<Flow> for Instruction {
    fn from(ins: Flow) -> Instruction {
        Instruction::Flow(ins)
    }
}

impl From<Transfer> for Instruction {
    fn from(ins: Transfer) -> Instruction {
        Instruction::Transfer(ins)
    }
}

impl From<Manipulate> for Instruction {
    fn from(ins: Manipulate) -> Instruction {
        Instruction::Manipulate(ins)
    }
}

impl From<Jump> for Instruction {
    fn from(ins: Jump) -> Instruction {
        Instruction::Jump(ins)
    }
}

struct Indexed(Register, i16);

impl fmt::Display for Indexed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.1 {
            0 => write!(f, "[{}]", self.0),
            offset if offset < 0 => write!(f, "[{}-{}]", self.0, -offset),
            offset => write!(f, "[{}+{}]", self.0, offset),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Instruction::Flow(Flow::Halt) => write!(f, "HALT"),
            Instruction::Flow(Flow::NoOperation) => write!(f, "NOP"),
            Instruction::Flow(Flow::Return) => write!(f, "RTN"),
            Instruction::Flow(Flow::Fault) => write!(f, "ERR"),

            Instruction::Transfer(t) => match t {
                Transfer::LoadImmediate { dest, value } => write!(f, "LODI {}, {}", dest, value),
                Transfer::LoadAbsolute { dest, address } => {
                    write!(f, "LODA {}, [0x{:02x}]", dest, address)
                }
                Transfer::LoadIndirect { dest, base } => {
                    write!(f, "LODR {}, {}", dest, Indexed(base, 0))
                }
                Transfer::LoadIndexed { dest, base, offset } => {
                    write!(f, "LODRD {}, {}", dest, Indexed(base, offset))
                }
                Transfer::StoreAbsolute { src, address } => {
                    write!(f, "STOA {}, [0x{:02x}]", src, address)
                }
                Transfer::StoreIndirect { src, base } => {
                    write!(f, "STOR {}, {}", src, Indexed(base, 0))
                }
                Transfer::StoreIndexed { src, base, offset } => {
                    write!(f, "STORD {}, {}", src, Indexed(base, offset))
                }
            },

            Instruction::Manipulate(m) => match m {
                Manipulate::Negate { src } => write!(f, "NEG {}", src),
                Manipulate::AddRegister { lhs, rhs } => write!(f, "ADDR {}, {}", lhs, rhs),
                Manipulate::AddImmediate { lhs, value } => write!(f, "ADDI {}, {}", lhs, value),
                Manipulate::SubtractRegister { lhs, rhs } => write!(f, "SUBR {}, {}", lhs, rhs),
                Manipulate::SubtractImmediate { lhs, value } => {
                    write!(f, "SUBI {}, {}", lhs, value)
                }
                Manipulate::Move { src, dest } => write!(f, "MOV {}, {}", src, dest),
            },

            Instruction::Jump(j) => match j {
                Jump::Branch { condition, target } => {
                    let mnemonic = match condition {
                        JumpCondition::Always => "JMP",
                        JumpCondition::Zero => "JMPZ",
                        JumpCondition::Negative => "JMPN",
                    };

                    write!(f, "{} 0x{:04x}", mnemonic, target)
                }
                Jump::Call { target } => write!(f, "CALL 0x{:04x}", target),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::Register::*;

    #[test]
    fn test_sign_extend_immediate_bounds() {
        assert_eq!(sign_extend_immediate(0x00), 0);
        assert_eq!(sign_extend_immediate(0x7F), 127);
        assert_eq!(sign_extend_immediate(0x80), -128);
        assert_eq!(sign_extend_immediate(0xFF), -1);
    }

    #[test]
    fn test_sign_extend_offset_bounds() {
        assert_eq!(sign_extend_offset(0x00), 0);
        assert_eq!(sign_extend_offset(0x0F), 15);
        assert_eq!(sign_extend_offset(0x10), -16);
        assert_eq!(sign_extend_offset(0x1F), -1);
        assert_eq!(sign_extend_offset(0xEF), 15);
    }

    #[test]
    fn test_class_of() {
        assert_eq!(Class::of(0x0000), Class::Flow);
        assert_eq!(Class::of(0x3FFF), Class::Flow);
        assert_eq!(Class::of(0x4000), Class::Transfer);
        assert_eq!(Class::of(0x8000), Class::Manipulate);
        assert_eq!(Class::of(0xFFFF), Class::Jump);
    }

    #[test]
    fn test_decode_flow_ignores_unused_bits() {
        assert_eq!(Instruction::decode(0x0000), Ok(Flow::Halt.into()));
        assert_eq!(Instruction::decode(0x0800), Ok(Flow::NoOperation.into()));
        assert_eq!(Instruction::decode(0x1000), Ok(Flow::Return.into()));
        assert_eq!(Instruction::decode(0x1800), Ok(Flow::Fault.into()));

        assert_eq!(Instruction::decode(0x2000), Ok(Flow::Halt.into()));
        assert_eq!(Instruction::decode(0x0FFF), Ok(Flow::NoOperation.into()));
        assert_eq!(Instruction::decode(0x3FFF), Ok(Flow::Fault.into()));
    }

    #[test]
    fn test_decode_transfer() {
        assert_eq!(
            Instruction::decode(0x4105),
            Ok(Transfer::LoadImmediate { dest: R1, value: 5 }.into()),
        );
        assert_eq!(
            Instruction::decode(0x43FF),
            Ok(Transfer::LoadImmediate { dest: R3, value: -1 }.into()),
        );
        assert_eq!(
            Instruction::decode(0x4A90),
            Ok(Transfer::LoadAbsolute { dest: R2, address: 0x90 }.into()),
        );
        assert_eq!(
            Instruction::decode(0x5040),
            Ok(Transfer::LoadIndirect { dest: R0, base: R2 }.into()),
        );
        assert_eq!(
            Instruction::decode(0x5CDE),
            Ok(Transfer::LoadIndexed { dest: AC, base: BP, offset: -2 }.into()),
        );
        assert_eq!(
            Instruction::decode(0x6110),
            Ok(Transfer::StoreAbsolute { src: R1, address: 0x10 }.into()),
        );
        assert_eq!(
            Instruction::decode(0x6960),
            Ok(Transfer::StoreIndirect { src: R1, base: R3 }.into()),
        );
        assert_eq!(
            Instruction::decode(0x72A4),
            Ok(Transfer::StoreIndexed { src: R2, base: SP, offset: 4 }.into()),
        );
    }

    #[test]
    fn test_decode_manipulate() {
        assert_eq!(Instruction::decode(0x8300), Ok(Manipulate::Negate { src: R3 }.into()));
        assert_eq!(
            Instruction::decode(0x8804),
            Ok(Manipulate::AddRegister { lhs: R0, rhs: R0 }.into()),
        );
        assert_eq!(
            Instruction::decode(0x8960),
            Ok(Manipulate::AddRegister { lhs: R1, rhs: R3 }.into()),
        );
        assert_eq!(
            Instruction::decode(0x9101),
            Ok(Manipulate::AddImmediate { lhs: R1, value: 1 }.into()),
        );
        assert_eq!(
            Instruction::decode(0x9A3F),
            Ok(Manipulate::SubtractRegister { lhs: R2, rhs: R1 }.into()),
        );
        assert_eq!(
            Instruction::decode(0xA080),
            Ok(Manipulate::SubtractImmediate { lhs: R0, value: -128 }.into()),
        );
        assert_eq!(
            Instruction::decode(0xB960),
            Ok(Manipulate::Move { src: R1, dest: R3 }.into()),
        );
    }

    #[test]
    fn test_register_fields_ignore_low_bits() {
        // Bits 4:0 never leak into the second register field.
        for low in 0..0x20 {
            let word = 0x8960 | low;
            let expected = Manipulate::AddRegister { lhs: R1, rhs: R3 };
            assert_eq!(Instruction::decode(word), Ok(expected.into()));

            let word = 0x9960 | low;
            let expected = Manipulate::SubtractRegister { lhs: R1, rhs: R3 };
            assert_eq!(Instruction::decode(word), Ok(expected.into()));
        }
    }

    #[test]
    fn test_decode_jump() {
        assert_eq!(
            Instruction::decode(0xC000),
            Ok(Jump::Branch { condition: JumpCondition::Always, target: 0 }.into()),
        );
        assert_eq!(
            Instruction::decode(0xD123),
            Ok(Jump::Branch { condition: JumpCondition::Zero, target: 0x123 }.into()),
        );
        assert_eq!(
            Instruction::decode(0xEFFF),
            Ok(Jump::Branch { condition: JumpCondition::Negative, target: 0xFFF }.into()),
        );
        assert_eq!(Instruction::decode(0xF040), Ok(Jump::Call { target: 0x040 }.into()));
    }

    #[test]
    fn test_decode_illegal() {
        assert_eq!(
            Instruction::decode(0x7812),
            Err(DecodeError { word: 0x7812, class: Class::Transfer, sub_opcode: 0b111 }),
        );
        assert_eq!(
            Instruction::decode(0xA800),
            Err(DecodeError { word: 0xA800, class: Class::Manipulate, sub_opcode: 0b101 }),
        );
        assert_eq!(
            Instruction::decode(0xB0FF),
            Err(DecodeError { word: 0xB0FF, class: Class::Manipulate, sub_opcode: 0b110 }),
        );
        assert_eq!(
            Instruction::decode(0x7812).unwrap_err().to_string(),
            "illegal transfer instruction 0x7812 (sub-opcode 111)",
        );
    }

    #[test]
    fn test_decode_is_total() {
        let mut illegal = 0;

        for word in 0..=u16::MAX {
            match Instruction::decode(word) {
                Ok(ins) => {
                    assert_eq!(ins.class(), Class::of(word));
                    assert_eq!(Instruction::decode(ins.encode()), Ok(ins));
                }
                Err(err) => {
                    assert_eq!(err.word, word);
                    illegal += 1;
                }
            }
        }

        // Transfer 111, manipulate 101 and 110, 2048 words each.
        assert_eq!(illegal, 3 * 2048);
    }

    #[test]
    fn test_encode_truncates_fields() {
        let ins: Instruction = Jump::Call { target: 0x1040 }.into();
        assert_eq!(ins.encode(), 0xF040);

        let ins: Instruction = Transfer::LoadIndexed { dest: R1, base: R2, offset: -1 }.into();
        assert_eq!(u16::from(ins), 0x595F);
    }

    #[test]
    fn test_encode_instruction_register_operand() {
        let ins: Instruction = Manipulate::Move { src: IR, dest: R1 }.into();
        assert_eq!(ins.encode(), 0xB820);
        assert_eq!(
            Instruction::decode(ins.encode()),
            Ok(Instruction::Manipulate(Manipulate::Move { src: R0, dest: R1 })),
        );

        let ins: Instruction = Transfer::StoreIndirect { src: R3, base: IR }.into();
        assert_eq!(ins.encode(), 0x6B00);
    }

    #[test]
    fn test_display() {
        let cases: Vec<(u16, &str)> = vec![
            (0x0000, "HALT"),
            (0x1000, "RTN"),
            (0x4105, "LODI R1, 5"),
            (0x43FF, "LODI R3, -1"),
            (0x4A90, "LODA R2, [0x90]"),
            (0x5040, "LODR R0, [R2]"),
            (0x5CDE, "LODRD AC, [BP-2]"),
            (0x72A4, "STORD R2, [SP+4]"),
            (0x8960, "ADDR R1, R3"),
            (0xB960, "MOV R1, R3"),
            (0xD123, "JMPZ 0x0123"),
            (0xF040, "CALL 0x0040"),
        ];

        for (word, text) in cases {
            assert_eq!(Instruction::decode(word).unwrap().to_string(), text);
        }
    }
}
