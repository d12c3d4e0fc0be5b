//! Monochrome framebuffer.
use std::fmt;

use crate::constants::*;

/// Raw pixel grid, row major, `true` for a lit pixel.
pub type DisplayBuffer = [bool; DISPLAY_BUFFER_SIZE];

/// Screen buffer that sprites are drawn to.
///
/// Tracks whether it changed since the last time a renderer consumed it.
pub struct Framebuffer {
    pixels: Box<DisplayBuffer>,
    dirty: bool,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self {
            pixels: Box::new([false; DISPLAY_BUFFER_SIZE]),
            dirty: true,
        }
    }
}

impl Framebuffer {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline(always)]
    fn index(x: usize, y: usize) -> usize {
        (x & DISPLAY_WIDTH_MASK) + (y & DISPLAY_HEIGHT_MASK) * DISPLAY_WIDTH
    }

    pub fn clear(&mut self) {
        self.pixels.fill(false);
        self.dirty = true;
    }

    /// Flip the pixel at the coordinate, wrapping around the screen edges.
    ///
    /// Returns `true` when a lit pixel was erased.
    #[inline]
    pub fn xor_pixel(&mut self, x: usize, y: usize) -> bool {
        let index = Self::index(x, y);
        let old_px = self.pixels[index];
        self.pixels[index] = !old_px;
        self.dirty = true;
        old_px
    }

    /// XOR an 8 pixel wide sprite onto the screen, one byte per row.
    ///
    /// Returns `true` if any lit pixel was erased, which is used for
    /// collision detection.
    pub fn draw_sprite(&mut self, x: usize, y: usize, rows: &[u8]) -> bool {
        let mut is_erased = false;

        for (r, row) in rows.iter().enumerate() {
            // Each row is 8 bits representing the 8 pixels of the sprite.
            for c in 0..SPRITE_WIDTH {
                if (row >> (7 - c)) & 1 != 0 {
                    is_erased |= self.xor_pixel(x + c, y + r);
                }
            }
        }

        // Drawing a sprite with no set bits still refreshes the screen.
        self.dirty = true;

        is_erased
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[Self::index(x, y)]
    }

    pub fn buffer(&self) -> &DisplayBuffer {
        &self.pixels
    }

    /// Whether the pixels changed since the dirty flag was last cleared.
    #[inline(always)]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline(always)]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

impl fmt::Display for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_buffer(&self.pixels, f)
    }
}

/// Render a display buffer as text, one line per row, with `#` for set
/// pixels and `.` for clear ones.
pub fn write_buffer<W: fmt::Write + ?Sized>(buffer: &DisplayBuffer, w: &mut W) -> fmt::Result {
    for row in buffer.chunks(DISPLAY_WIDTH) {
        for px in row {
            w.write_char(if *px { '#' } else { '.' })?;
        }
        w.write_char('\n')?;
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_xor_pixel_collision() {
        let mut fb = Framebuffer::new();
        assert!(!fb.xor_pixel(3, 4));
        assert!(fb.pixel(3, 4));
        assert!(fb.xor_pixel(3, 4));
        assert!(!fb.pixel(3, 4));
    }

    #[test]
    fn test_xor_pixel_wraps() {
        let mut fb = Framebuffer::new();
        fb.xor_pixel(DISPLAY_WIDTH + 1, DISPLAY_HEIGHT + 2);
        assert!(fb.pixel(1, 2));
    }

    #[test]
    fn test_sprite_wraps_horizontally() {
        let mut fb = Framebuffer::new();
        assert!(!fb.draw_sprite(63, 0, &[0xFF]));

        assert!(fb.pixel(63, 0));
        for x in 0..7 {
            assert!(fb.pixel(x, 0), "column {x} should be lit");
        }
        assert!(!fb.pixel(7, 0));
        assert!(!fb.pixel(62, 0));
    }

    #[test]
    fn test_sprite_wraps_vertically() {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(0, 31, &[0x80, 0x80]);
        assert!(fb.pixel(0, 31));
        assert!(fb.pixel(0, 0));
    }

    #[test]
    fn test_zero_bits_do_not_erase() {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(4, 0, &[0b1111_0000]);
        assert!(!fb.draw_sprite(0, 0, &[0b1111_0000]));
        assert!(fb.pixel(0, 0));
        assert!(fb.pixel(4, 0));
    }

    #[test]
    fn test_dirty_flag() {
        let mut fb = Framebuffer::new();
        assert!(fb.is_dirty());
        fb.clear_dirty();
        assert!(!fb.is_dirty());
        fb.xor_pixel(0, 0);
        assert!(fb.is_dirty());
        fb.clear_dirty();
        fb.clear();
        assert!(fb.is_dirty());
    }

    #[test]
    fn test_render_text() {
        let mut fb = Framebuffer::new();
        fb.xor_pixel(1, 0);
        let text = fb.to_string();
        let first = text.lines().next().unwrap();
        assert_eq!(first.len(), DISPLAY_WIDTH);
        assert!(first.starts_with(".#."));
        assert_eq!(text.lines().count(), DISPLAY_HEIGHT);
    }

    #[test]
    fn test_write_buffer_matches_display() {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(62, 31, &[0b1100_0000]);

        let mut text = String::new();
        write_buffer(fb.buffer(), &mut text).unwrap();

        assert_eq!(text, fb.to_string());
        assert!(text.lines().last().unwrap().ends_with("##"));
    }
}
