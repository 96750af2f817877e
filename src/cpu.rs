use log::{debug, info, trace, warn};
use random_number::random;

use crate::consts::{
    ADDR_MASK, CHIP8_FONTSET, FONT_BASE, GLYPH_HEIGHT, KEY_COUNT, MAX_ROM_SIZE, PROGRAM_START,
    REG_COUNT, STACK_SIZE,
};
use crate::decode::decode;
use crate::display::DisplayBuffer;
use crate::errors::{ProgramError, ResourceError};
use crate::keypad::KeypadState;
use crate::mem::Memory;
use crate::op::ChipOp;
use crate::timers::Timers;

/// Where the machine is in its run cycle, as returned by [`Chip8::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecState {
    Running,
    /// Blocked on `LD Vx, K`; holds the destination register.
    AwaitingKey(usize),
    Halted(ProgramError),
}

/// Behaviours that differ between interpreters and that some ROMs rely on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Quirks {
    /// `ADD I, Vx` sets VF when I overflows past 0xFFF.
    pub addi_overflow_flag: bool,
}

#[derive(Clone)]
pub struct Chip8 {
    pub(crate) pc: u16,            // Program counter
    pub(crate) v: [u8; REG_COUNT], // General purpose registers
    pub(crate) i: u16,             // Address register
    pub(crate) sp: usize,          // Stack Pointer
    pub(crate) stack: [u16; STACK_SIZE],
    pub(crate) timers: Timers,
    pub(crate) keypad: KeypadState,
    pub(crate) screen: DisplayBuffer,
    pub(crate) memory: Memory,
    pub(crate) state: ExecState,
    pub(crate) quirks: Quirks,
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_quirks(Quirks::default())
    }

    pub fn with_quirks(quirks: Quirks) -> Self {
        let mut chip = Chip8 {
            pc: PROGRAM_START,
            v: [0; REG_COUNT],
            i: 0,
            sp: 0,
            stack: [0; STACK_SIZE],
            timers: Timers::default(),
            keypad: KeypadState::default(),
            screen: DisplayBuffer::default(),
            memory: Memory::default(),
            state: ExecState::Running,
            quirks,
        };
        chip.load_font();
        chip
    }

    fn load_font(&mut self) {
        let base = FONT_BASE as usize;
        self.memory[base..base + CHIP8_FONTSET.len()].copy_from_slice(&CHIP8_FONTSET);
    }

    /// Copy a ROM image into program space at 0x200.
    ///
    /// Whatever was left in program space beyond the new image is zeroed. An
    /// oversized image is rejected without touching the machine.
    pub fn load(&mut self, rom: &[u8]) -> Result<(), ResourceError> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(ResourceError::RomTooLarge {
                size: rom.len(),
                max: MAX_ROM_SIZE,
            });
        }
        let start = PROGRAM_START as usize;
        let program = &mut self.memory[start..];
        program[..rom.len()].copy_from_slice(rom);
        program[rom.len()..].fill(0);
        info!("loaded {} byte ROM at {PROGRAM_START:#05X}", rom.len());
        Ok(())
    }

    /// Put the machine back to power-on state, keeping the loaded program.
    pub fn reset(&mut self) {
        self.load_font();
        self.pc = PROGRAM_START;
        self.v = [0; REG_COUNT];
        self.i = 0;
        self.sp = 0;
        self.stack = [0; STACK_SIZE];
        self.timers = Timers::default();
        self.keypad.clear();
        self.screen.clear();
        self.state = ExecState::Running;
        info!("machine reset");
    }

    /// Execute one instruction, or poll the pending key wait.
    ///
    /// A halted machine stays halted until [`Chip8::reset`].
    pub fn step(&mut self) -> ExecState {
        match self.state {
            ExecState::Halted(_) => {}
            ExecState::AwaitingKey(x) => {
                if let Some(key) = self.keypad.take_latched() {
                    self.v[x] = key;
                    self.advance();
                    self.state = ExecState::Running;
                    debug!("key {key:X} stored in V{x:X}, resuming at {:#05X}", self.pc);
                }
            }
            ExecState::Running => {
                let pc = self.pc;
                let opcode = decode(self.memory.word(pc));
                trace!("{pc:#05X}: {:04X} {}", opcode.word, opcode.op);
                if let Err(err) = self.run_op(opcode.op) {
                    debug!("halting: {err}");
                    self.state = ExecState::Halted(err);
                }
            }
        }
        self.state
    }

    /// Count both timers down by one. Call at 60 Hz regardless of state.
    pub fn tick_timers(&mut self) {
        self.timers.tick();
    }

    pub fn set_key(&mut self, key: u8, pressed: bool) {
        if key as usize >= KEY_COUNT {
            warn!("ignoring key code {key:#04X}");
            return;
        }
        if self.keypad.set(key, pressed) && self.keypad.is_armed() {
            debug!("key {key:X} pressed while awaiting key");
        }
    }

    pub fn display_snapshot(&self) -> &DisplayBuffer {
        &self.screen
    }

    pub fn sound_active(&self) -> bool {
        self.timers.sound_active()
    }

    pub fn state(&self) -> ExecState {
        self.state
    }

    /// Full in-memory copy of the machine.
    pub fn snapshot(&self) -> Chip8 {
        self.clone()
    }

    pub fn restore(&mut self, snapshot: Chip8) {
        *self = snapshot;
        debug!("restored snapshot at {:#05X}", self.pc);
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    pub fn set_quirks(&mut self, quirks: Quirks) {
        self.quirks = quirks;
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn sp(&self) -> usize {
        self.sp
    }

    pub fn v(&self) -> &[u8; REG_COUNT] {
        &self.v
    }

    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.sp]
    }

    pub fn delay_timer(&self) -> u8 {
        self.timers.delay
    }

    pub fn sound_timer(&self) -> u8 {
        self.timers.sound
    }

    pub fn keys(&self) -> &[bool; KEY_COUNT] {
        self.keypad.keys()
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    #[inline]
    fn advance(&mut self) {
        self.pc = self.pc.wrapping_add(2) & ADDR_MASK;
    }

    #[inline]
    fn skip_if(&mut self, cond: bool) {
        let step = if cond { 4 } else { 2 };
        self.pc = self.pc.wrapping_add(step) & ADDR_MASK;
    }

    /// Apply one operation. On error nothing has been changed.
    pub(crate) fn run_op(&mut self, op: ChipOp) -> Result<(), ProgramError> {
        use ChipOp::*;
        match op {
            Cls => {
                self.screen.clear();
                self.advance();
            }
            Ret => {
                if self.sp == 0 {
                    return Err(ProgramError::StackUnderflow { pc: self.pc });
                }
                self.sp -= 1;
                self.pc = self.stack[self.sp];
            }
            Jp { nnn } => {
                self.pc = nnn & ADDR_MASK;
            }
            Call { nnn } => {
                if self.sp == STACK_SIZE {
                    return Err(ProgramError::StackOverflow { pc: self.pc });
                }
                self.stack[self.sp] = self.pc.wrapping_add(2) & ADDR_MASK;
                self.sp += 1;
                self.pc = nnn & ADDR_MASK;
            }
            Se { x, kk } => self.skip_if(self.v[x] == kk),
            Sne { x, kk } => self.skip_if(self.v[x] != kk),
            Ser { x, y } => self.skip_if(self.v[x] == self.v[y]),
            Sner { x, y } => self.skip_if(self.v[x] != self.v[y]),
            Ld { x, kk } => {
                self.v[x] = kk;
                self.advance();
            }
            Add { x, kk } => {
                self.v[x] = self.v[x].wrapping_add(kk);
                self.advance();
            }
            Ldr { x, y } => {
                self.v[x] = self.v[y];
                self.advance();
            }
            Orr { x, y } => {
                self.v[x] |= self.v[y];
                self.advance();
            }
            Andr { x, y } => {
                self.v[x] &= self.v[y];
                self.advance();
            }
            Xorr { x, y } => {
                self.v[x] ^= self.v[y];
                self.advance();
            }
            Addr { x, y } => {
                let (res, carry) = self.v[x].overflowing_add(self.v[y]);
                self.v[x] = res;
                self.v[0xF] = carry as u8;
                self.advance();
            }
            Subr { x, y } => {
                let (res, borrow) = self.v[x].overflowing_sub(self.v[y]);
                self.v[x] = res;
                self.v[0xF] = !borrow as u8;
                self.advance();
            }
            Shrr { x, .. } => {
                let vx = self.v[x];
                self.v[x] = vx >> 1;
                self.v[0xF] = vx & 0x1;
                self.advance();
            }
            Subnr { x, y } => {
                let (res, borrow) = self.v[y].overflowing_sub(self.v[x]);
                self.v[x] = res;
                self.v[0xF] = !borrow as u8;
                self.advance();
            }
            Shlr { x, .. } => {
                let vx = self.v[x];
                self.v[x] = vx << 1;
                self.v[0xF] = vx >> 7;
                self.advance();
            }
            Ldi { nnn } => {
                self.i = nnn & ADDR_MASK;
                self.advance();
            }
            Jpo { nnn } => {
                self.pc = nnn.wrapping_add(u16::from(self.v[0])) & ADDR_MASK;
            }
            Rnd { x, kk } => {
                let n: u8 = random!();
                self.v[x] = n & kk;
                self.advance();
            }
            Drw { x, y, n } => {
                let mut sprite = [0u8; 15];
                let sprite = &mut sprite[..n as usize];
                for (row, byte) in sprite.iter_mut().enumerate() {
                    *byte = self.memory.at(self.i.wrapping_add(row as u16));
                }
                let collision = self.screen.draw(self.v[x], self.v[y], sprite);
                self.v[0xF] = collision as u8;
                self.advance();
            }
            Skp { x } => self.skip_if(self.keypad.is_pressed(self.v[x] & 0xF)),
            Sknp { x } => self.skip_if(!self.keypad.is_pressed(self.v[x] & 0xF)),
            Ldvd { x } => {
                self.v[x] = self.timers.delay;
                self.advance();
            }
            Ldk { x } => {
                // PC stays on this instruction until a key arrives
                self.keypad.arm();
                self.state = ExecState::AwaitingKey(x);
                debug!("awaiting key for V{x:X} at {:#05X}", self.pc);
            }
            Lddv { x } => {
                self.timers.delay = self.v[x];
                self.advance();
            }
            Ldsv { x } => {
                self.timers.sound = self.v[x];
                self.advance();
            }
            Addi { x } => {
                let sum = self.i + u16::from(self.v[x]);
                if self.quirks.addi_overflow_flag {
                    self.v[0xF] = (sum > ADDR_MASK) as u8;
                }
                self.i = sum & ADDR_MASK;
                self.advance();
            }
            Ldfv { x } => {
                // set I to the 5 line high hex sprite for the lowest nibble in vX
                let digit = u16::from(self.v[x] & 0x0F);
                self.i = FONT_BASE + GLYPH_HEIGHT * digit;
                self.advance();
            }
            Ldbv { x } => {
                let vx = self.v[x];
                *self.memory.at_mut(self.i) = vx / 100;
                *self.memory.at_mut(self.i.wrapping_add(1)) = (vx / 10) % 10;
                *self.memory.at_mut(self.i.wrapping_add(2)) = vx % 10;
                self.advance();
            }
            Ldiv { x } => {
                for (offset, &vx) in self.v[..=x].iter().enumerate() {
                    *self.memory.at_mut(self.i.wrapping_add(offset as u16)) = vx;
                }
                self.advance();
            }
            Ldvi { x } => {
                for (offset, vx) in self.v[..=x].iter_mut().enumerate() {
                    *vx = self.memory.at(self.i.wrapping_add(offset as u16));
                }
                self.advance();
            }
            Unknown(word) => {
                return Err(ProgramError::UnknownOpcode { word, pc: self.pc });
            }
        }
        Ok(())
    }
}
