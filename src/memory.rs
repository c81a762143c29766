//! Byte-addressable storage for the SSAM machine.

use crate::error::LoadError;

/// Number of addressable bytes.
pub const MEMORY_SIZE: usize = 0x1_0000;

/// Trait for implementing the memory of a SSAM processor.
///
/// Memory is a trusted component: none of the primitives fail, every 16-bit
/// address is valid. Words are big-endian, the high byte lives at the lower
/// address.
pub trait Memory {
    /// Fetch the byte at `addr`.
    fn read_byte(&self, addr: u16) -> u8;

    /// Overwrite the byte at `addr`.
    fn write_byte(&mut self, addr: u16, value: u8);

    /// Fetch the word whose high byte is at `addr`.
    ///
    /// The low byte is read from `addr + 1`, wrapping to `0x0000` for the word at `0xFFFF`.
    fn read_word(&self, addr: u16) -> u16 {
        u16::from_be_bytes([self.read_byte(addr), self.read_byte(addr.wrapping_add(1))])
    }

    /// Overwrite the word whose high byte is at `addr`.
    fn write_word(&mut self, addr: u16, value: u16) {
        let [high, low] = value.to_be_bytes();
        self.write_byte(addr, high);
        self.write_byte(addr.wrapping_add(1), low);
    }

    /// Copy a program image into memory starting at address 0.
    ///
    /// Bytes past the end of the image keep their previous contents.
    ///
    /// # Errors
    /// [LoadError::ImageTooLarge] if the image does not fit in the address space. Memory is not
    /// modified in that case.
    fn load(&mut self, image: &[u8]) -> Result<(), LoadError> {
        if image.len() > MEMORY_SIZE {
            return Err(LoadError::ImageTooLarge { size: image.len() });
        }

        for (addr, byte) in image.iter().enumerate() {
            self.write_byte(addr as u16, *byte);
        }

        Ok(())
    }
}

/// The full 64 KiB address space backed by a single heap allocation.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatMemory {
    bytes: Box<[u8]>,
}

impl FlatMemory {
    /// Create zeroed memory.
    pub fn new() -> FlatMemory {
        FlatMemory {
            bytes: vec![0; MEMORY_SIZE].into_boxed_slice(),
        }
    }

    /// Create memory with `image` loaded at address 0.
    pub fn from_image(image: &[u8]) -> Result<FlatMemory, LoadError> {
        let mut memory = FlatMemory::new();
        memory.load(image)?;
        Ok(memory)
    }

    /// The raw contents of the whole address space.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..]
    }
}

impl Default for FlatMemory {
    fn default() -> FlatMemory {
        FlatMemory::new()
    }
}

impl Memory for FlatMemory {
    fn read_byte(&self, addr: u16) -> u8 {
        self.bytes[addr as usize]
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        self.bytes[addr as usize] = value;
    }

    fn load(&mut self, image: &[u8]) -> Result<(), LoadError> {
        if image.len() > MEMORY_SIZE {
            return Err(LoadError::ImageTooLarge { size: image.len() });
        }

        self.bytes[..image.len()].copy_from_slice(image);

        Ok(())
    }
}
