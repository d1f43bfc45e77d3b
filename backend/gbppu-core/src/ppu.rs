//! Game Boy PPU (pixel processing unit) core: the top-level dot scheduler.
//!
//! Owns the LY/X/T counters and the mode state machine, and routes the shared memory port to the
//! OAM scanner in mode 2 and the pixel pipeline in mode 3. All registers are consumed by value
//! each dot; the CPU-facing register file lives with the embedder (see [`crate::api`]).

mod bg_fetcher;
mod fifo;
mod oam_scan;
mod pipeline;
pub mod registers;
mod sprite_fetcher;

use crate::ppu::oam_scan::{OamScanner, SpriteEntry};
use crate::ppu::pipeline::PixelPipeline;
use crate::ppu::registers::Registers;
use bincode::{Decode, Encode};
use jgbppu_common::frontend::{FrameSize, PixelSink};
use jgbppu_proc_macros::{FakeDecode, FakeEncode};
use std::ops::{Deref, DerefMut};

pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 144;

pub const FRAME_BUFFER_LEN: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

pub const FRAME_SIZE: FrameSize =
    FrameSize { width: SCREEN_WIDTH as u32, height: SCREEN_HEIGHT as u32 };

// 144 rendered lines + 10 VBlank lines
pub const LINES_PER_FRAME: u8 = 154;
pub const DOTS_PER_LINE: u16 = 456;
pub const OAM_SCAN_DOTS: u16 = 80;
pub const DOTS_PER_FRAME: u32 = DOTS_PER_LINE as u32 * LINES_PER_FRAME as u32;

pub const MAX_SPRITES_PER_LINE: usize = 10;

pub use oam_scan::OAM_BASE;

/// The rendered frame: one 2-bit shade per pixel, row-major. Fills in raster order through its
/// [`PixelSink`] implementation.
#[derive(Debug, Clone, FakeEncode, FakeDecode)]
pub struct PpuFrameBuffer {
    pixels: Box<[u8; FRAME_BUFFER_LEN]>,
    cursor: usize,
}

impl PpuFrameBuffer {
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.pixels.iter().copied()
    }
}

impl Default for PpuFrameBuffer {
    fn default() -> Self {
        Self { pixels: vec![0; FRAME_BUFFER_LEN].into_boxed_slice().try_into().unwrap(), cursor: 0 }
    }
}

impl Deref for PpuFrameBuffer {
    type Target = [u8; FRAME_BUFFER_LEN];

    fn deref(&self) -> &Self::Target {
        &self.pixels
    }
}

impl DerefMut for PpuFrameBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.pixels
    }
}

impl PixelSink for PpuFrameBuffer {
    fn push_pixel(&mut self, shade: u8) {
        debug_assert!(shade <= 3);

        self.pixels[self.cursor] = shade;
        self.cursor = (self.cursor + 1) % FRAME_BUFFER_LEN;
    }

    fn vertical_blank(&mut self) {
        self.cursor = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum PpuMode {
    // Mode 1
    VBlank,
    // Mode 0
    HBlank,
    // Mode 2
    ScanningOam,
    // Mode 3
    Rendering,
}

impl PpuMode {
    fn to_bits(self) -> u8 {
        match self {
            Self::HBlank => 0,
            Self::VBlank => 1,
            Self::ScanningOam => 2,
            Self::Rendering => 3,
        }
    }
}

/// Everything the scheduler drives out of one dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DotOutputs {
    /// Address to put on the memory port this dot; the answer is expected next dot.
    pub mem_request: Option<u16>,
    /// Palette-resolved 2-bit shade, present on drawing dots that push a pixel.
    pub pixel: Option<u8>,
    /// Level signals, high for the whole of the respective mode.
    pub hblank: bool,
    pub vblank: bool,
}

#[derive(Debug, Clone, Encode, Decode)]
struct State {
    scanline: u8,
    dot: u16,
    x: u8,
    mode: PpuMode,
    wy_latch: bool,
    frame_complete: bool,
}

impl State {
    fn new() -> Self {
        Self {
            scanline: 0,
            dot: 0,
            x: 0,
            mode: PpuMode::ScanningOam,
            wy_latch: false,
            frame_complete: false,
        }
    }
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct Ppu {
    state: State,
    oam_scan: OamScanner,
    sprite_buffer: Vec<SpriteEntry>,
    pipeline: PixelPipeline,
}

impl Ppu {
    pub fn new() -> Self {
        Self {
            state: State::new(),
            oam_scan: OamScanner::new(),
            sprite_buffer: Vec::with_capacity(MAX_SPRITES_PER_LINE),
            pipeline: PixelPipeline::new(),
        }
    }

    /// Reinitialize all counters; mode returns to OAM scan with LY=0 and empty buffers.
    pub fn reset(&mut self) {
        log::debug!("PPU reset on line {} dot {}", self.state.scanline, self.state.dot);

        *self = Self::new();
    }

    /// Step one T-cycle.
    ///
    /// `mem_data` is the memory map's answer to last dot's request, or `None` if the bus was
    /// idle (which reads as $FF wherever a byte was expected). Register values are sampled
    /// combinationally; the mode visible in the outputs is stable for the whole dot.
    pub fn tick_dot(&mut self, registers: &Registers, mem_data: Option<u8>) -> DotOutputs {
        // The window Y condition latches on the first dot where WY hits the current line and
        // stays set for the rest of the frame, even if WY moves
        if !self.state.wy_latch
            && self.state.mode != PpuMode::VBlank
            && self.state.scanline == registers.wy
        {
            log::trace!("WY latch set on line {}", self.state.scanline);
            self.state.wy_latch = true;
        }

        let mode = self.state.mode;
        let mut mem_request = None;
        let mut pixel = None;

        match mode {
            PpuMode::ScanningOam => {
                mem_request = self.oam_scan.step(
                    self.state.dot,
                    self.state.scanline,
                    registers,
                    mem_data,
                    &mut self.sprite_buffer,
                );
            }
            PpuMode::Rendering => {
                // The X byte of OAM entry 39 comes back one dot after the scan window closes;
                // pick it up before the pipeline takes over the port
                let data = if self.oam_scan.has_pending() {
                    self.oam_scan.finish(
                        self.state.scanline,
                        registers,
                        mem_data,
                        &mut self.sprite_buffer,
                    );
                    None
                } else {
                    mem_data
                };

                let out = self.pipeline.tick(
                    self.state.x,
                    self.state.scanline,
                    registers,
                    self.state.wy_latch,
                    &self.sprite_buffer,
                    data,
                );
                mem_request = out.mem_request;
                pixel = out.pixel;

                if pixel.is_some() {
                    if self.state.x == (SCREEN_WIDTH - 1) as u8 {
                        log::trace!(
                            "Line {} finished drawing after dot {}",
                            self.state.scanline,
                            self.state.dot
                        );
                        self.state.mode = PpuMode::HBlank;
                    } else {
                        self.state.x += 1;
                    }
                }
            }
            PpuMode::HBlank | PpuMode::VBlank => {}
        }

        self.advance_counters();

        DotOutputs {
            mem_request,
            pixel,
            hblank: mode == PpuMode::HBlank,
            vblank: mode == PpuMode::VBlank,
        }
    }

    fn advance_counters(&mut self) {
        self.state.dot += 1;

        if self.state.dot == DOTS_PER_LINE {
            self.state.dot = 0;

            if self.state.scanline == LINES_PER_FRAME - 1 {
                self.state.scanline = 0;
                self.enter_oam_scan();
            } else {
                self.state.scanline += 1;

                if self.state.scanline == SCREEN_HEIGHT as u8 {
                    log::trace!("Entering VBlank");
                    self.state.mode = PpuMode::VBlank;
                    self.state.wy_latch = false;
                    self.state.frame_complete = true;
                } else if self.state.scanline < SCREEN_HEIGHT as u8 {
                    self.enter_oam_scan();
                }
            }
        } else if self.state.mode == PpuMode::ScanningOam && self.state.dot == OAM_SCAN_DOTS {
            self.state.mode = PpuMode::Rendering;
            self.pipeline.begin_line();
        }
    }

    fn enter_oam_scan(&mut self) {
        self.state.mode = PpuMode::ScanningOam;
        self.state.x = 0;
        self.sprite_buffer.clear();
        self.oam_scan.begin_line();
    }

    pub fn line(&self) -> u8 {
        self.state.scanline
    }

    pub fn mode(&self) -> PpuMode {
        self.state.mode
    }

    pub fn frame_complete(&self) -> bool {
        self.state.frame_complete
    }

    pub fn clear_frame_complete(&mut self) {
        self.state.frame_complete = false;
    }

    /// The OR-combined STAT condition line: LYC coincidence and the per-mode sources, gated on
    /// their STAT enable bits.
    pub fn stat_line(&self, registers: &Registers) -> bool {
        (registers.lyc_source_enabled() && self.state.scanline == registers.lyc)
            || registers.mode_source_enabled(self.state.mode)
    }
}
