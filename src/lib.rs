//! A crate for simulating SSAM, a small 16-bit accumulator/stack machine.
//!
//! Currently this crate provides the functionality to:
//! - Load raw big-endian program images into a flat 64 KiB [memory](memory::FlatMemory).
//! - Decode, encode and disassemble [instruction words](instruction::Instruction).
//! - Execute programs one fetch-execute cycle at a time with a
//!   [Controller](controller::Controller).
//! - Render the processor state as a [text report](report::StateReport).
//! - Drive a controller from single-letter [commands](session::Session).
//!
//! # Example
//! ```
//! use ssam::{
//!     controller::Controller,
//!     instruction::Register,
//!     memory::FlatMemory,
//! };
//!
//! // LODI R1, -1
//! // ADDI R1, 1
//! // HALT
//! let image = [0x41, 0xFF, 0x91, 0x01, 0x00, 0x00];
//!
//! let memory = FlatMemory::from_image(&image)
//!     .expect("image does not fit into memory");
//!
//! let mut controller = Controller::new(memory);
//! controller.initialize(0x0100, 0x0000);
//! controller.run();
//!
//! assert!(controller.is_halted());
//! assert_eq!(controller.register(Register::AC), 0);
//! ```
//!
//! # Executables
//!
//! ## `ssam`
//!
//! Built with the `ssam` feature. Loads a program image and reads commands from the standard
//! input. See [session] for the list of commands.
//!
//! ```text
//! $ ssam program.bin 0x0100 0x0000
//! Initializing...
//! Stack Pointer: 0x0100 / Base Pointer: 0x00fe / Program Counter: 0x0000
//! Loading program "program.bin"
//! Welcome to SSAM VM.
//!
//! > nnd
//! ```
pub mod error;
pub mod memory;
pub mod instruction;
pub mod controller;
pub mod parsing;
pub mod report;
pub mod session;
