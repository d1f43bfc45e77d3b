//! Mode 2: scan OAM for sprites overlapping the current scanline.
//!
//! Each of the 40 OAM entries gets two pipelined reads across the 80 scan dots: the Y byte on the
//! even dot, the X byte on the odd dot. A read issued at dot N returns its data at dot N+1, so
//! the final X byte lands one dot into mode 3 and is consumed there before the pipeline takes
//! over the memory port.

use crate::ppu::registers::Registers;
use crate::ppu::{MAX_SPRITES_PER_LINE, OAM_SCAN_DOTS};
use bincode::{Decode, Encode};

pub const OAM_BASE: u16 = 0xFE00;

/// One entry of the per-line sprite buffer: screen X (biased by +8), the index of the OAM slot
/// it came from, and which row of the sprite the current scanline crosses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct SpriteEntry {
    pub x: u8,
    pub oam_index: u8,
    pub row: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
enum PendingRead {
    Y { oam_index: u8 },
    X { oam_index: u8 },
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct OamScanner {
    pending: Option<PendingRead>,
    y_matched: bool,
    matched_row: u8,
}

impl OamScanner {
    pub fn new() -> Self {
        Self { pending: None, y_matched: false, matched_row: 0 }
    }

    pub fn begin_line(&mut self) {
        self.pending = None;
        self.y_matched = false;
        self.matched_row = 0;
    }

    /// Step one scan dot: consume the byte returned for last dot's read, then issue this dot's
    /// read. `dot` must be below [`OAM_SCAN_DOTS`].
    pub fn step(
        &mut self,
        dot: u16,
        scanline: u8,
        registers: &Registers,
        data: Option<u8>,
        sprite_buffer: &mut Vec<SpriteEntry>,
    ) -> Option<u16> {
        debug_assert!(dot < OAM_SCAN_DOTS);

        self.consume(scanline, registers, data, sprite_buffer);

        let oam_index = (dot / 2) as u8;
        let parity = dot & 1;
        self.pending = Some(if parity == 0 {
            PendingRead::Y { oam_index }
        } else {
            PendingRead::X { oam_index }
        });

        Some(OAM_BASE + (u16::from(oam_index) << 2) + parity)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consume the read still in flight when the scan window closed (the X byte of OAM entry 39).
    pub fn finish(
        &mut self,
        scanline: u8,
        registers: &Registers,
        data: Option<u8>,
        sprite_buffer: &mut Vec<SpriteEntry>,
    ) {
        self.consume(scanline, registers, data, sprite_buffer);
    }

    fn consume(
        &mut self,
        scanline: u8,
        registers: &Registers,
        data: Option<u8>,
        sprite_buffer: &mut Vec<SpriteEntry>,
    ) {
        let Some(pending) = self.pending.take() else { return };

        // An undriven bus reads $FF, which can never qualify (a Y of 255 is fully offscreen)
        let byte = data.unwrap_or(0xFF);

        match pending {
            PendingRead::Y { .. } => {
                let y = u16::from(byte);
                let line_plus_16 = u16::from(scanline) + 16;
                let sprite_height = u16::from(registers.sprite_height());

                self.y_matched = y <= line_plus_16 && line_plus_16 < y + sprite_height;
                self.matched_row =
                    if self.y_matched { ((line_plus_16 - y) & 0xF) as u8 } else { 0 };
            }
            PendingRead::X { oam_index } => {
                // X=0 is fully offscreen by definition and never enters the buffer
                if self.y_matched && byte > 0 && sprite_buffer.len() < MAX_SPRITES_PER_LINE {
                    log::trace!(
                        "OAM scan line {scanline}: sprite {oam_index} at X {byte} row {}",
                        self.matched_row
                    );

                    sprite_buffer.push(SpriteEntry {
                        x: byte,
                        oam_index,
                        row: self.matched_row,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeOam([u8; 160]);

    impl FakeOam {
        fn read(&self, addr: u16) -> u8 {
            self.0[(addr - OAM_BASE) as usize]
        }
    }

    fn scan_line(oam: &FakeOam, scanline: u8, registers: &Registers) -> Vec<SpriteEntry> {
        let mut scanner = OamScanner::new();
        let mut buffer = Vec::with_capacity(MAX_SPRITES_PER_LINE);
        let mut response = None;

        scanner.begin_line();
        for dot in 0..OAM_SCAN_DOTS {
            let request = scanner.step(dot, scanline, registers, response, &mut buffer);
            response = request.map(|addr| oam.read(addr));
        }
        scanner.finish(scanline, registers, response, &mut buffer);
        assert!(!scanner.has_pending());

        buffer
    }

    fn oam_with(entries: &[(usize, [u8; 4])]) -> FakeOam {
        let mut oam = FakeOam([0; 160]);
        for &(index, bytes) in entries {
            oam.0[4 * index..4 * index + 4].copy_from_slice(&bytes);
        }
        oam
    }

    #[test]
    fn qualifying_sprite_is_buffered_with_row() {
        let registers = Registers::new();
        // Y=16 means the sprite's top row is scanline 0
        let oam = oam_with(&[(3, [16, 80, 0x2A, 0x00])]);

        let buffer = scan_line(&oam, 0, &registers);
        assert_eq!(vec![SpriteEntry { x: 80, oam_index: 3, row: 0 }], buffer);

        let buffer = scan_line(&oam, 7, &registers);
        assert_eq!(vec![SpriteEntry { x: 80, oam_index: 3, row: 7 }], buffer);

        // Row 8 of an 8x8 sprite is the line below it
        assert!(scan_line(&oam, 8, &registers).is_empty());
    }

    #[test]
    fn x_zero_is_never_buffered() {
        let registers = Registers::new();
        let oam = oam_with(&[(0, [16, 0, 0x00, 0x00])]);

        assert!(scan_line(&oam, 0, &registers).is_empty());
    }

    #[test]
    fn tall_sprites_match_sixteen_rows() {
        let mut registers = Registers::new();
        registers.write_lcdc(0x95); // tall sprite mode
        let oam = oam_with(&[(5, [16, 40, 0x00, 0x00])]);

        let buffer = scan_line(&oam, 15, &registers);
        assert_eq!(vec![SpriteEntry { x: 40, oam_index: 5, row: 15 }], buffer);

        assert!(scan_line(&oam, 16, &registers).is_empty());
    }

    #[test]
    fn buffer_caps_at_ten_sprites() {
        let registers = Registers::new();
        let entries: Vec<(usize, [u8; 4])> =
            (0..12).map(|i| (i, [16, 8 * (i as u8 + 1), 0x00, 0x00])).collect();
        let oam = oam_with(&entries);

        let buffer = scan_line(&oam, 0, &registers);
        assert_eq!(MAX_SPRITES_PER_LINE, buffer.len());
        // OAM order: the first ten entries win
        assert_eq!(9, buffer[9].oam_index);
    }

    #[test]
    fn final_oam_entry_arrives_in_the_epilogue() {
        let registers = Registers::new();
        let oam = oam_with(&[(39, [16, 100, 0x00, 0x00])]);

        let buffer = scan_line(&oam, 0, &registers);
        assert_eq!(vec![SpriteEntry { x: 100, oam_index: 39, row: 0 }], buffer);
    }

    #[test]
    fn partially_offscreen_top_sprite_qualifies() {
        let registers = Registers::new();
        // Y=10: rows 6 and 7 of the sprite cover scanlines 0 and 1
        let oam = oam_with(&[(1, [10, 20, 0x00, 0x00])]);

        let buffer = scan_line(&oam, 0, &registers);
        assert_eq!(vec![SpriteEntry { x: 20, oam_index: 1, row: 6 }], buffer);

        assert!(scan_line(&oam, 2, &registers).is_empty());
    }
}
