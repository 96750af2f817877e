/// Faults raised by the running program. Any of these halts the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    #[error("unknown opcode {word:#06X} at {pc:#05X}")]
    UnknownOpcode { word: u16, pc: u16 },

    #[error("stack overflow: CALL at {pc:#05X} with a full call stack")]
    StackOverflow { pc: u16 },

    #[error("stack underflow: RET at {pc:#05X} with an empty call stack")]
    StackUnderflow { pc: u16 },
}

impl ProgramError {
    /// Address of the faulting instruction.
    pub fn pc(&self) -> u16 {
        match *self {
            ProgramError::UnknownOpcode { pc, .. }
            | ProgramError::StackOverflow { pc }
            | ProgramError::StackUnderflow { pc } => pc,
        }
    }
}

/// Host-side failures, raised before anything runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    #[error("ROM is too large ({size} bytes), max size is {max} bytes")]
    RomTooLarge { size: usize, max: usize },
}
