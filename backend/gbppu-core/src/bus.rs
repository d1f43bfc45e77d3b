//! Reference implementation of the PPU's external memory map: VRAM and OAM behind a single read
//! port that answers one dot after an address is presented.
//!
//! The core itself never owns memory — [`crate::ppu::Ppu::tick_dot`] takes last dot's answer and
//! returns this dot's address. The one-dot latency is the embedder's wiring (hold the request
//! for a dot before reading); [`crate::api::PpuSystem`] shows the intended hookup.

use crate::ppu::PpuMode;
use bincode::{Decode, Encode};
use jgbppu_common::boxedarray::BoxedByteArray;

pub const VRAM_LEN: usize = 8 * 1024;
pub const OAM_LEN: usize = 160;

const VRAM_START: u16 = 0x8000;
const VRAM_END: u16 = 0x9FFF;
const OAM_START: u16 = 0xFE00;
const OAM_END: u16 = 0xFE9F;

#[derive(Debug, Clone, Default, Encode, Decode)]
pub struct VideoBus {
    vram: BoxedByteArray<VRAM_LEN>,
    oam: BoxedByteArray<OAM_LEN>,
}

impl VideoBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer a PPU-side read. Addresses outside VRAM and OAM are driven by no one and read $FF.
    pub fn ppu_read(&self, address: u16) -> u8 {
        match address {
            VRAM_START..=VRAM_END => self.vram[(address & 0x1FFF) as usize],
            OAM_START..=OAM_END => self.oam[(address & 0xFF) as usize],
            _ => 0xFF,
        }
    }

    /// CPU-side VRAM read; locked out (reads $FF) while the PPU is drawing.
    pub fn cpu_read_vram(&self, address: u16, mode: PpuMode) -> u8 {
        if cpu_can_access_vram(mode) { self.vram[(address & 0x1FFF) as usize] } else { 0xFF }
    }

    /// CPU-side VRAM write; dropped while the PPU is drawing.
    pub fn cpu_write_vram(&mut self, address: u16, value: u8, mode: PpuMode) {
        if cpu_can_access_vram(mode) {
            self.vram[(address & 0x1FFF) as usize] = value;
        }
    }

    /// CPU-side OAM read; locked out during OAM scan and drawing.
    pub fn cpu_read_oam(&self, address: u16, mode: PpuMode) -> u8 {
        if cpu_can_access_oam(mode) { self.oam[(address & 0xFF) as usize] } else { 0xFF }
    }

    /// CPU-side OAM write; dropped during OAM scan and drawing.
    pub fn cpu_write_oam(&mut self, address: u16, value: u8, mode: PpuMode) {
        if cpu_can_access_oam(mode) {
            self.oam[(address & 0xFF) as usize] = value;
        }
    }

    // DMA-style accessors that bypass the mode locks
    pub fn write_vram(&mut self, address: u16, value: u8) {
        self.vram[(address & 0x1FFF) as usize] = value;
    }

    pub fn write_oam(&mut self, address: u16, value: u8) {
        self.oam[(address & 0xFF) as usize] = value;
    }
}

fn cpu_can_access_vram(mode: PpuMode) -> bool {
    mode != PpuMode::Rendering
}

fn cpu_can_access_oam(mode: PpuMode) -> bool {
    !matches!(mode, PpuMode::ScanningOam | PpuMode::Rendering)
}
