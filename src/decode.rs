use crate::op::ChipOp;

/// Raw operand fields of an instruction word alongside its decoded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeDescriptor {
    pub word: u16,
    pub family: u8,
    pub x: usize,
    pub y: usize,
    pub n: u8,
    pub nn: u8,
    pub nnn: u16,
    pub op: ChipOp,
}

pub fn decode(word: u16) -> OpcodeDescriptor {
    let x = ((word & 0x0F00) >> 8) as usize;
    let y = ((word & 0x00F0) >> 4) as usize;
    let n = (word & 0x000F) as u8;
    let nn = (word & 0x00FF) as u8;
    let nnn = word & 0x0FFF;

    let op = match word & 0xF000 {
        0x0000 => match word {
            0x00E0 => ChipOp::Cls,
            0x00EE => ChipOp::Ret,
            _ => ChipOp::Unknown(word),
        },
        0x1000 => ChipOp::Jp { nnn },
        0x2000 => ChipOp::Call { nnn },
        0x3000 => ChipOp::Se { x, kk: nn },
        0x4000 => ChipOp::Sne { x, kk: nn },
        0x5000 => match n {
            0x0 => ChipOp::Ser { x, y },
            _ => ChipOp::Unknown(word),
        },
        0x6000 => ChipOp::Ld { x, kk: nn },
        0x7000 => ChipOp::Add { x, kk: nn },
        0x8000 => match n {
            0x0 => ChipOp::Ldr { x, y },
            0x1 => ChipOp::Orr { x, y },
            0x2 => ChipOp::Andr { x, y },
            0x3 => ChipOp::Xorr { x, y },
            0x4 => ChipOp::Addr { x, y },
            0x5 => ChipOp::Subr { x, y },
            0x6 => ChipOp::Shrr { x, y },
            0x7 => ChipOp::Subnr { x, y },
            0xE => ChipOp::Shlr { x, y },
            _ => ChipOp::Unknown(word),
        },
        0x9000 => match n {
            0x0 => ChipOp::Sner { x, y },
            _ => ChipOp::Unknown(word),
        },
        0xA000 => ChipOp::Ldi { nnn },
        0xB000 => ChipOp::Jpo { nnn },
        0xC000 => ChipOp::Rnd { x, kk: nn },
        0xD000 => ChipOp::Drw { x, y, n },
        0xE000 => match nn {
            0x9E => ChipOp::Skp { x },
            0xA1 => ChipOp::Sknp { x },
            _ => ChipOp::Unknown(word),
        },
        0xF000 => match nn {
            0x07 => ChipOp::Ldvd { x },
            0x0A => ChipOp::Ldk { x },
            0x15 => ChipOp::Lddv { x },
            0x18 => ChipOp::Ldsv { x },
            0x1E => ChipOp::Addi { x },
            0x29 => ChipOp::Ldfv { x },
            0x33 => ChipOp::Ldbv { x },
            0x55 => ChipOp::Ldiv { x },
            0x65 => ChipOp::Ldvi { x },
            _ => ChipOp::Unknown(word),
        },
        _ => ChipOp::Unknown(word),
    };

    OpcodeDescriptor {
        word,
        family: (word >> 12) as u8,
        x,
        y,
        n,
        nn,
        nnn,
        op,
    }
}
