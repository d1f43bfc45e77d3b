//! Types shared between the emulation core and whatever is driving it.

use bincode::{Decode, Encode};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    #[must_use]
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[must_use]
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    #[inline]
    fn default() -> Self {
        Self::BLACK
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

/// A display consuming the PPU's output stream: one palette-resolved 2-bit shade per drawing
/// dot, in raster order, plus blanking notifications.
pub trait PixelSink {
    /// Consume the next pixel in raster order. `shade` is always in `0..=3`.
    fn push_pixel(&mut self, shade: u8);

    /// Called once on each entry into horizontal blanking.
    fn horizontal_blank(&mut self) {}

    /// Called once on each entry into vertical blanking.
    fn vertical_blank(&mut self) {}
}

/// Sink that throws pixels away; useful for stepping the core when no display is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PixelSink for NullSink {
    fn push_pixel(&mut self, _shade: u8) {}
}
