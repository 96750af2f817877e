pub mod audio;
pub mod consts;
pub mod cpu;
pub mod decode;
pub mod disasm;
pub mod display;
pub mod errors;
pub mod gfx;
pub mod keypad;
pub mod mem;
pub mod op;
pub mod timers;

mod cpu_tests;

pub use cpu::{Chip8, ExecState, Quirks};
pub use disasm::disassemble;
pub use errors::{ProgramError, ResourceError};
