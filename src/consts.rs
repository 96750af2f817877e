/*
*   Memory Map:
*   +---------------+= 0xFFF (4095) End of Chip-8 RAM
*   |               |
*   | 0x200 to 0xFFF|
*   |     Chip-8    |
*   | Program / Data|
*   |     Space     |
*   |               |
*   +---------------+= 0x200 (512) Start of Chip-8 programs
*   | 0x000 to 0x1FF|
*   | Reserved for  |
*   |  interpreter  |
*   +- - - - - - - -+= 0x050 (80) End of font glyphs
*   |  Font glyphs  |
*   +---------------+= 0x000 (0) Start of Chip-8 RAM
*
*/
pub const CHIP8_FONTSET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

pub const FONT_BASE: u16 = 0x000;
pub const GLYPH_HEIGHT: u16 = 5;

pub const RAM_SIZE: usize = 4096;
pub const PROGRAM_START: u16 = 0x200;
pub const MAX_ROM_SIZE: usize = RAM_SIZE - PROGRAM_START as usize; // 0xE00
pub const ADDR_MASK: u16 = 0x0FFF;

pub const STACK_SIZE: usize = 16;
pub const REG_COUNT: usize = 16;
pub const KEY_COUNT: usize = 16;

// Display is 64x32 pixels, packed eight to a byte.
pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;
pub const W: usize = SCREEN_WIDTH / 8;
pub const H: usize = SCREEN_HEIGHT;

pub const TIMER_HZ: u32 = 60;
pub const DEFAULT_CPU_HZ: u32 = 700;

// Instructions shown either side of PC in the debug view
pub const WINDOW: isize = 8;
