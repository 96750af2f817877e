use std::ops::Index;

use ndarray::Array2;

use crate::consts::{H, SCREEN_HEIGHT, SCREEN_WIDTH, W};

/// 64x32 monochrome frame buffer.
///
/// Pixels are packed eight to a byte, most significant bit leftmost, giving
/// a `H x W` grid of bytes. Indexing with `(row, byte_col)` yields the packed
/// byte, which is what renderers want; [`DisplayBuffer::pixel`] gives a
/// single pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayBuffer {
    cells: Array2<u8>,
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self {
            cells: Array2::zeros((H, W)),
        }
    }
}

impl Index<(usize, usize)> for DisplayBuffer {
    type Output = u8;
    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.cells[index]
    }
}

impl DisplayBuffer {
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// XOR `sprite` onto the buffer with its top-left corner at `(x, y)`.
    ///
    /// Coordinates wrap per pixel on both axes. Returns true when any set
    /// pixel was turned off by the draw.
    pub fn draw(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let vx = x as usize % SCREEN_WIDTH;
        let vy = y as usize % SCREEN_HEIGHT;
        let bit_off = vx & 7; // vx % 8
        let col_byte = vx >> 3; // vx / 8

        let mut collision = false;
        for (row, &byte) in sprite.iter().enumerate() {
            let y_idx = (vy + row) % H;
            let x0 = col_byte % W;
            let x1 = (col_byte + 1) % W; // next byte (wrap horizontally)

            // Shift the 8-bit sprite line by bit_off across two bytes.
            let shifted = (u16::from(byte) << 8) >> bit_off;
            let [hi, lo] = shifted.to_be_bytes();

            let before0 = self.cells[(y_idx, x0)];
            let before1 = self.cells[(y_idx, x1)];

            self.cells[(y_idx, x0)] ^= hi;
            self.cells[(y_idx, x1)] ^= lo;

            collision |= (before0 & hi != 0) || (before1 & lo != 0);
        }
        collision
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        let byte = self.cells[(y % H, (x % SCREEN_WIDTH) >> 3)];
        byte & (0x80 >> (x & 7)) != 0
    }

    /// Packed bytes of row `y`.
    pub fn row(&self, y: usize) -> [u8; W] {
        let mut out = [0; W];
        for (dst, src) in out.iter_mut().zip(self.cells.row(y % H)) {
            *dst = *src;
        }
        out
    }

    pub fn to_grid(&self) -> [[bool; SCREEN_WIDTH]; SCREEN_HEIGHT] {
        let mut grid = [[false; SCREEN_WIDTH]; SCREEN_HEIGHT];
        for (y, line) in grid.iter_mut().enumerate() {
            for (x, px) in line.iter_mut().enumerate() {
                *px = self.pixel(x, y);
            }
        }
        grid
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|&b| b == 0)
    }
}
