//! Public interface: wires the PPU core to the reference memory map and a frame buffer, exposes
//! the CPU-facing register file, and handles savestates.

use crate::bus::VideoBus;
use crate::graphics::RgbaFrameBuffer;
use crate::ppu::registers::Registers;
use crate::ppu::{Ppu, PpuFrameBuffer, PpuMode, DOTS_PER_FRAME};
use bincode::error::{DecodeError, EncodeError};
use bincode::{Decode, Encode};
use jgbppu_common::frontend::{NullSink, PixelSink};
use jgbppu_common::num::U16Ext;
use jgbppu_proc_macros::{EnumDisplay, EnumFromStr};
use std::io::{Read, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaveStateError {
    #[error("Error serializing savestate: {0}")]
    Encode(#[from] EncodeError),
    #[error("Error deserializing savestate: {0}")]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode, EnumDisplay, EnumFromStr)]
pub enum GbPalette {
    BlackAndWhite,
    #[default]
    GreenTint,
    LimeGreen,
}

/// The PPU core plus its collaborators: video memory, the register file, and a shade frame
/// buffer fed from the pixel stream.
///
/// One [`tick_dot`](Self::tick_dot) call is one T-cycle. The memory request coming out of the
/// core is held for a dot and answered on the next call, which is the one-dot read latency the
/// core's fetchers are built around.
#[derive(Debug, Clone, Encode, Decode)]
pub struct PpuSystem {
    ppu: Ppu,
    registers: Registers,
    bus: VideoBus,
    frame_buffer: PpuFrameBuffer,
    last_request: Option<u16>,
    prev_hblank: bool,
    prev_vblank: bool,
}

impl PpuSystem {
    pub fn new() -> Self {
        Self {
            ppu: Ppu::new(),
            registers: Registers::new(),
            bus: VideoBus::new(),
            frame_buffer: PpuFrameBuffer::default(),
            last_request: None,
            prev_hblank: false,
            prev_vblank: false,
        }
    }

    /// Step one T-cycle, mirroring pixels and blanking edges into the given sink as well as the
    /// internal frame buffer.
    pub fn tick_dot_with<S: PixelSink>(&mut self, sink: &mut S) {
        let response = self.last_request.take().map(|addr| self.bus.ppu_read(addr));
        let out = self.ppu.tick_dot(&self.registers, response);
        self.last_request = out.mem_request;

        if let Some(shade) = out.pixel {
            self.frame_buffer.push_pixel(shade);
            sink.push_pixel(shade);
        }

        if out.hblank && !self.prev_hblank {
            sink.horizontal_blank();
        }
        if out.vblank && !self.prev_vblank {
            self.frame_buffer.vertical_blank();
            sink.vertical_blank();
        }
        self.prev_hblank = out.hblank;
        self.prev_vblank = out.vblank;
    }

    /// Step one T-cycle with no external display attached.
    pub fn tick_dot(&mut self) {
        self.tick_dot_with(&mut NullSink);
    }

    /// Run until the in-progress frame completes.
    pub fn run_frame(&mut self) {
        self.ppu.clear_frame_complete();

        // A frame is 70224 dots; the bound only exists so a logic bug cannot hang the caller
        for _ in 0..2 * DOTS_PER_FRAME {
            self.tick_dot();
            if self.ppu.frame_complete() {
                return;
            }
        }
    }

    pub fn read_register(&self, address: u16) -> u8 {
        match address.lsb() {
            0x40 => self.registers.read_lcdc(),
            0x41 => self.registers.read_stat(self.ppu.line(), self.ppu.mode()),
            0x42 => self.registers.scy,
            0x43 => self.registers.scx,
            // LY: line number
            0x44 => self.ppu.line(),
            0x45 => self.registers.lyc,
            0x47 => self.registers.bgp,
            0x48 => self.registers.obp[0],
            0x49 => self.registers.obp[1],
            0x4A => self.registers.wy,
            0x4B => self.registers.wx,
            _ => {
                log::warn!("PPU register read {address:04X}");
                0xFF
            }
        }
    }

    pub fn write_register(&mut self, address: u16, value: u8) {
        log::trace!("PPU register write {address:04X} = {value:02X}");

        match address.lsb() {
            0x40 => self.registers.write_lcdc(value),
            0x41 => self.registers.write_stat(value),
            0x42 => self.registers.scy = value,
            0x43 => self.registers.scx = value,
            // LY, not writable
            0x44 => {}
            0x45 => self.registers.lyc = value,
            0x47 => self.registers.bgp = value,
            0x48 => self.registers.obp[0] = value,
            0x49 => self.registers.obp[1] = value,
            0x4A => self.registers.wy = value,
            0x4B => self.registers.wx = value,
            _ => log::warn!("PPU register write {address:04X} {value:02X}"),
        }
    }

    // CPU-side memory accessors, subject to the PPU's mode locks
    pub fn read_vram(&self, address: u16) -> u8 {
        self.bus.cpu_read_vram(address, self.ppu.mode())
    }

    pub fn write_vram(&mut self, address: u16, value: u8) {
        self.bus.cpu_write_vram(address, value, self.ppu.mode());
    }

    pub fn read_oam(&self, address: u16) -> u8 {
        self.bus.cpu_read_oam(address, self.ppu.mode())
    }

    pub fn write_oam(&mut self, address: u16, value: u8) {
        self.bus.cpu_write_oam(address, value, self.ppu.mode());
    }

    /// Unrestricted accessors, for test setup and OAM-DMA-style writes.
    pub fn bus_mut(&mut self) -> &mut VideoBus {
        &mut self.bus
    }

    pub fn line(&self) -> u8 {
        self.ppu.line()
    }

    pub fn mode(&self) -> PpuMode {
        self.ppu.mode()
    }

    pub fn stat_line(&self) -> bool {
        self.ppu.stat_line(&self.registers)
    }

    pub fn frame_complete(&self) -> bool {
        self.ppu.frame_complete()
    }

    pub fn clear_frame_complete(&mut self) {
        self.ppu.clear_frame_complete()
    }

    pub fn frame_buffer(&self) -> &PpuFrameBuffer {
        &self.frame_buffer
    }

    pub fn render_rgba(&self, palette: GbPalette, out: &mut RgbaFrameBuffer) {
        out.copy_from(&self.frame_buffer, palette);
    }

    pub fn reset(&mut self) {
        self.ppu.reset();
        self.last_request = None;
        self.frame_buffer.vertical_blank();
        self.prev_hblank = false;
        self.prev_vblank = false;
    }

    /// # Errors
    ///
    /// Returns an error if the state cannot be serialized or written.
    pub fn save_state<W: Write>(&self, writer: &mut W) -> Result<(), SaveStateError> {
        bincode::encode_into_std_write(self, writer, bincode_config())?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the state cannot be read or deserialized. `self` is unchanged on
    /// error.
    pub fn load_state<R: Read>(&mut self, reader: &mut R) -> Result<(), SaveStateError> {
        *self = bincode::decode_from_std_read(reader, bincode_config())?;
        Ok(())
    }
}

impl Default for PpuSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn bincode_config() -> impl bincode::config::Config {
    bincode::config::standard()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_file_round_trips_latches() {
        let mut system = PpuSystem::new();

        system.write_register(0xFF40, 0x93);
        system.tick_dot();
        assert_eq!(0x93, system.read_register(0xFF40));

        system.write_register(0xFF43, 0x23);
        system.write_register(0xFF4A, 0x45);
        assert_eq!(0x23, system.read_register(0xFF43));
        assert_eq!(0x45, system.read_register(0xFF4A));

        // LY is read-only
        system.write_register(0xFF44, 0x7F);
        assert_eq!(0x00, system.read_register(0xFF44));

        // Unmapped registers read $FF
        assert_eq!(0xFF, system.read_register(0xFF46));
    }

    #[test]
    fn save_state_round_trips_timing_state() {
        let mut system = PpuSystem::new();
        system.write_register(0xFF42, 0x15);
        for _ in 0..12345 {
            system.tick_dot();
        }

        let mut state = Vec::new();
        system.save_state(&mut state).unwrap();

        let mut restored = PpuSystem::new();
        restored.load_state(&mut state.as_slice()).unwrap();

        assert_eq!(system.line(), restored.line());
        assert_eq!(system.mode(), restored.mode());
        assert_eq!(0x15, restored.read_register(0xFF42));

        // Both continue in lockstep
        for _ in 0..1000 {
            system.tick_dot();
            restored.tick_dot();
        }
        assert_eq!(system.line(), restored.line());
        assert_eq!(system.mode(), restored.mode());
    }

    #[test]
    fn load_state_rejects_garbage() {
        let mut system = PpuSystem::new();
        let result = system.load_state(&mut [0xFF, 0xFF].as_slice());
        assert!(matches!(result, Err(SaveStateError::Decode(_))));
    }
}
