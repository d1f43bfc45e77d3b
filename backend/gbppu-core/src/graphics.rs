//! Conversion from the PPU's 2-bit shades to RGBA colors for display.

use crate::api::GbPalette;
use crate::ppu::{self, PpuFrameBuffer};
use jgbppu_common::frontend::Color;
use jgbppu_proc_macros::{FakeDecode, FakeEncode};
use std::ops::{Deref, DerefMut};

// Linear ramp from white to black
const BW_SHADES: [Color; 4] = [
    Color::rgb(255, 255, 255),
    Color::rgb(170, 170, 170),
    Color::rgb(85, 85, 85),
    Color::rgb(0, 0, 0),
];

// Soft green tint
const GREEN_TINT_SHADES: [Color; 4] = [
    Color::rgb(0xAE, 0xD2, 0x8D),
    Color::rgb(0x75, 0x9C, 0x68),
    Color::rgb(0x40, 0x5E, 0x2D),
    Color::rgb(0x0C, 0x1E, 0x09),
];

// Deep green close to the original DMG LCD
const LIME_GREEN_SHADES: [Color; 4] = [
    Color::rgb(0x80, 0xA6, 0x08),
    Color::rgb(0x5D, 0x7F, 0x07),
    Color::rgb(0x25, 0x5C, 0x1A),
    Color::rgb(0x00, 0x32, 0x00),
];

impl GbPalette {
    fn shades(self) -> &'static [Color; 4] {
        match self {
            Self::BlackAndWhite => &BW_SHADES,
            Self::GreenTint => &GREEN_TINT_SHADES,
            Self::LimeGreen => &LIME_GREEN_SHADES,
        }
    }
}

#[derive(Debug, Clone, FakeEncode, FakeDecode)]
pub struct RgbaFrameBuffer(Box<[Color; ppu::FRAME_BUFFER_LEN]>);

impl RgbaFrameBuffer {
    pub fn copy_from(&mut self, frame: &PpuFrameBuffer, palette: GbPalette) {
        let shades = palette.shades();
        for (i, shade) in frame.iter().enumerate() {
            self.0[i] = shades[shade as usize];
        }
    }
}

impl Default for RgbaFrameBuffer {
    fn default() -> Self {
        Self(vec![Color::default(); ppu::FRAME_BUFFER_LEN].into_boxed_slice().try_into().unwrap())
    }
}

impl Deref for RgbaFrameBuffer {
    type Target = [Color; ppu::FRAME_BUFFER_LEN];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for RgbaFrameBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl AsRef<[Color]> for RgbaFrameBuffer {
    fn as_ref(&self) -> &[Color] {
        self.0.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jgbppu_common::frontend::PixelSink;

    #[test]
    fn shades_map_through_the_selected_palette() {
        let mut ppu_buffer = PpuFrameBuffer::default();
        for shade in [0, 1, 2, 3] {
            ppu_buffer.push_pixel(shade);
        }

        let mut rgba = RgbaFrameBuffer::default();
        rgba.copy_from(&ppu_buffer, GbPalette::BlackAndWhite);

        assert_eq!(Color::rgb(255, 255, 255), rgba[0]);
        assert_eq!(Color::rgb(170, 170, 170), rgba[1]);
        assert_eq!(Color::rgb(85, 85, 85), rgba[2]);
        assert_eq!(Color::rgb(0, 0, 0), rgba[3]);

        rgba.copy_from(&ppu_buffer, GbPalette::LimeGreen);
        assert_eq!(Color::rgb(0x80, 0xA6, 0x08), rgba[0]);
        assert_eq!(Color::rgb(0x00, 0x32, 0x00), rgba[3]);
    }
}
