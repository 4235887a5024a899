//! WS2812 frame encoding for an SPI data line
//!
//! At 2.4 MHz one SPI bit lasts ~417 ns, so each pixel bit becomes a 3-bit
//! symbol: `110` for a one and `100` for a zero. A run of zero bytes after the
//! frame holds the line low long enough (>50 µs) to latch the colors.

use super::{Color, PixelOrder};

/// SPI clock the encoding is timed for
pub const SPI_CLOCK_HZ: u32 = 2_400_000;

/// Trailing low bytes that latch the frame (~80 µs at 2.4 MHz)
const RESET_BYTES: usize = 24;

/// Encode `count` pixels all showing `color`
pub fn encode_fill(color: Color, count: usize, order: PixelOrder) -> Vec<u8> {
    let pixel = order.arrange(color.rgb());
    let mut out = Vec::with_capacity(count * 9 + RESET_BYTES);
    for _ in 0..count {
        for byte in pixel {
            out.extend_from_slice(&encode_byte(byte));
        }
    }
    out.resize(out.len() + RESET_BYTES, 0);
    out
}

/// Expand one color byte into 24 SPI bits, MSB first
fn encode_byte(byte: u8) -> [u8; 3] {
    let mut bits: u32 = 0;
    for i in (0..8).rev() {
        let symbol = if byte & (1 << i) != 0 { 0b110 } else { 0b100 };
        bits = (bits << 3) | symbol;
    }
    [(bits >> 16) as u8, (bits >> 8) as u8, bits as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_byte_symbols() {
        // 100 100 100 100 100 100 100 100
        assert_eq!(encode_byte(0x00), [0b1001_0010, 0b0100_1001, 0b0010_0100]);
    }

    #[test]
    fn test_full_byte_symbols() {
        // 110 110 110 110 110 110 110 110
        assert_eq!(encode_byte(0xFF), [0b1101_1011, 0b0110_1101, 0b1011_0110]);
    }

    #[test]
    fn test_frame_length_and_latch() {
        let frame = encode_fill(Color::Blue, 2, PixelOrder::Grb);
        assert_eq!(frame.len(), 2 * 9 + RESET_BYTES);
        assert!(frame[18..].iter().all(|b| *b == 0));
        // GRB: green and red are zero, blue is full
        assert_eq!(&frame[6..9], &encode_byte(0xFF));
    }
}
