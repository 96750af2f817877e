#[cfg(test)]
mod tests {
    use crate::consts::{CHIP8_FONTSET, MAX_ROM_SIZE, PROGRAM_START};
    use crate::cpu::{Chip8, ExecState, Quirks};
    use crate::errors::{ProgramError, ResourceError};
    use crate::op::ChipOp;

    /// Machine with `program` loaded at 0x200.
    fn chip_with(program: &[u16]) -> Chip8 {
        let rom: Vec<u8> = program.iter().flat_map(|w| w.to_be_bytes()).collect();
        let mut chip = Chip8::new();
        chip.load(&rom).unwrap();
        chip
    }

    #[test]
    fn test_new_machine() {
        let chip = Chip8::new();
        assert!(chip.pc() == PROGRAM_START);
        assert!(chip.state() == ExecState::Running);
        assert!(chip.memory()[..80] == CHIP8_FONTSET);
        assert!(chip.display_snapshot().is_blank());
    }

    #[test]
    fn test_run_op_cls() {
        let mut chip = chip_with(&[0x00E0]);
        chip.screen.draw(0, 0, &[0xFF]);
        chip.screen.draw(40, 10, &[0x0F]);
        chip.v[0xF] = 1;

        assert!(chip.step() == ExecState::Running);
        assert!(chip.display_snapshot().is_blank());
        assert!(chip.pc() == 0x202);
        assert!(chip.v[0xF] == 1);
    }

    #[test]
    fn test_run_op_ret() {
        let mut chip = Chip8::new();
        chip.stack[0] = 0x206;
        chip.sp = 1;
        chip.pc = 0xABC;

        chip.run_op(ChipOp::Ret).unwrap();
        assert!(chip.sp == 0);
        assert!(chip.pc == 0x206);
    }

    #[test]
    fn test_run_op_jp() {
        let mut chip = chip_with(&[0x1A5F]);
        chip.step();
        assert!(chip.pc() == 0xA5F);
    }

    #[test]
    fn test_run_op_call() {
        let mut chip = chip_with(&[0x2ABC]);
        chip.step();
        assert!(chip.sp() == 1);
        assert!(chip.stack() == [0x202]);
        assert!(chip.pc() == 0xABC);
    }

    #[test]
    fn test_call_ret_round_trip() {
        // 0x200: CALL 0x206 ; 0x202: JP 0x202 ; 0x204: pad ; 0x206: RET
        let mut chip = chip_with(&[0x2206, 0x1202, 0x0000, 0x00EE]);
        chip.step();
        assert!(chip.pc() == 0x206);
        assert!(chip.sp() == 1);
        chip.step();
        assert!(chip.pc() == 0x202);
        assert!(chip.sp() == 0);
    }

    #[test]
    fn test_seventeenth_call_overflows() {
        // CALL 0x200 forever
        let mut chip = chip_with(&[0x2200]);
        for depth in 1..=16 {
            assert!(chip.step() == ExecState::Running);
            assert!(chip.sp() == depth);
        }
        let state = chip.step();
        assert!(state == ExecState::Halted(ProgramError::StackOverflow { pc: 0x200 }));
        assert!(chip.sp() == 16);
        assert!(chip.pc() == 0x200);
    }

    #[test]
    fn test_ret_on_empty_stack_underflows() {
        let mut chip = chip_with(&[0x00EE]);
        let state = chip.step();
        assert!(state == ExecState::Halted(ProgramError::StackUnderflow { pc: 0x200 }));
        assert!(chip.pc() == 0x200);
        assert!(chip.sp() == 0);
    }

    #[test]
    fn test_unknown_opcode_halts_without_effects() {
        let mut chip = chip_with(&[0x6A42, 0xFFFF, 0x6B01]);
        chip.step();
        let before = chip.snapshot();

        let state = chip.step();
        assert!(state == ExecState::Halted(ProgramError::UnknownOpcode { word: 0xFFFF, pc: 0x202 }));
        assert!(chip.pc() == before.pc());
        assert!(chip.v() == before.v());

        // Halted is sticky
        assert!(chip.step() == state);
        assert!(chip.v()[0xB] == 0);
    }

    #[test]
    fn test_halt_reason_formats() {
        let err = ProgramError::UnknownOpcode { word: 0x8128, pc: 0x20A };
        assert_eq!(err.to_string(), "unknown opcode 0x8128 at 0x20A");
        assert_eq!(err.pc(), 0x20A);
    }

    #[test]
    fn test_run_op_se_skip() {
        let mut chip = Chip8::new();
        chip.v[0] = 20;
        chip.run_op(ChipOp::Se { x: 0, kk: 20 }).unwrap();
        assert!(chip.pc == 0x204);
    }

    #[test]
    fn test_run_op_se_no_skip() {
        let mut chip = Chip8::new();
        chip.v[1] = 10;
        chip.run_op(ChipOp::Se { x: 1, kk: 20 }).unwrap();
        assert!(chip.pc == 0x202);
    }

    #[test]
    fn test_run_op_sne() {
        let mut chip = Chip8::new();
        chip.v[0] = 20;
        chip.run_op(ChipOp::Sne { x: 0, kk: 20 }).unwrap();
        assert!(chip.pc == 0x202);
        chip.run_op(ChipOp::Sne { x: 0, kk: 21 }).unwrap();
        assert!(chip.pc == 0x206);
    }

    #[test]
    fn test_run_op_ser_and_sner() {
        let mut chip = Chip8::new();
        chip.v[0] = 20;
        chip.v[1] = 20;
        chip.v[2] = 17;

        chip.run_op(ChipOp::Ser { x: 0, y: 1 }).unwrap();
        assert!(chip.pc == 0x204);
        chip.run_op(ChipOp::Ser { x: 0, y: 2 }).unwrap();
        assert!(chip.pc == 0x206);
        chip.run_op(ChipOp::Sner { x: 0, y: 2 }).unwrap();
        assert!(chip.pc == 0x20A);
        chip.run_op(ChipOp::Sner { x: 0, y: 1 }).unwrap();
        assert!(chip.pc == 0x20C);
    }

    #[test]
    fn test_run_op_ld() {
        let mut chip = chip_with(&[0x62C5]);
        chip.v[2] = 0x12;
        chip.step();
        assert!(chip.v[2] == 0xC5);
        assert!(chip.pc == 0x202);
    }

    #[test]
    fn test_run_op_add_wraps_and_keeps_vf() {
        let mut chip = chip_with(&[0x7302]);
        chip.v[3] = 0xFF;
        chip.v[0xF] = 0xA;
        chip.step();
        assert!(chip.v[3] == 0x01);
        assert!(chip.v[0xF] == 0xA);
        assert!(chip.pc == 0x202);
    }

    #[test]
    fn test_run_op_ldr() {
        let mut chip = Chip8::new();
        chip.v[5] = 0xAB;
        chip.run_op(ChipOp::Ldr { x: 3, y: 5 }).unwrap();
        assert!(chip.v[3] == 0xAB);
    }

    #[test]
    fn test_run_op_bitwise() {
        let mut chip = Chip8::new();
        chip.v[0] = 0b1100;
        chip.v[1] = 0b1010;
        chip.run_op(ChipOp::Orr { x: 0, y: 1 }).unwrap();
        assert!(chip.v[0] == 0b1110);

        chip.v[0] = 0b1100;
        chip.run_op(ChipOp::Andr { x: 0, y: 1 }).unwrap();
        assert!(chip.v[0] == 0b1000);

        chip.v[0] = 0b1100;
        chip.run_op(ChipOp::Xorr { x: 0, y: 1 }).unwrap();
        assert!(chip.v[0] == 0b0110);
        assert!(chip.pc == 0x206);
    }

    #[test]
    fn test_run_op_addr_carry() {
        let mut chip = Chip8::new();
        chip.v[0] = 0xF0;
        chip.v[1] = 0x20;
        chip.run_op(ChipOp::Addr { x: 0, y: 1 }).unwrap();
        assert!(chip.v[0] == 0x10);
        assert!(chip.v[0xF] == 1);

        chip.v[0] = 0x10;
        chip.run_op(ChipOp::Addr { x: 0, y: 1 }).unwrap();
        assert!(chip.v[0] == 0x30);
        assert!(chip.v[0xF] == 0);
    }

    #[test]
    fn test_run_op_subr_borrow() {
        let mut chip = Chip8::new();
        chip.v[0] = 0x10;
        chip.v[1] = 0x20;
        chip.run_op(ChipOp::Subr { x: 0, y: 1 }).unwrap();
        assert!(chip.v[0] == 0xF0);
        assert!(chip.v[0xF] == 0);

        chip.v[0] = 0x20;
        chip.v[1] = 0x10;
        chip.run_op(ChipOp::Subr { x: 0, y: 1 }).unwrap();
        assert!(chip.v[0] == 0x10);
        assert!(chip.v[0xF] == 1);
    }

    #[test]
    fn test_run_op_subnr_borrow() {
        let mut chip = Chip8::new();
        chip.v[0] = 0x20;
        chip.v[1] = 0x10;
        chip.run_op(ChipOp::Subnr { x: 0, y: 1 }).unwrap();
        assert!(chip.v[0] == 0xF0);
        assert!(chip.v[0xF] == 0);

        chip.v[0] = 0x10;
        chip.v[1] = 0x20;
        chip.run_op(ChipOp::Subnr { x: 0, y: 1 }).unwrap();
        assert!(chip.v[0] == 0x10);
        assert!(chip.v[0xF] == 1);
    }

    #[test]
    fn test_run_op_shifts() {
        let mut chip = Chip8::new();
        chip.v[2] = 0b1000_0011;
        chip.run_op(ChipOp::Shrr { x: 2, y: 0 }).unwrap();
        assert!(chip.v[2] == 0b0100_0001);
        assert!(chip.v[0xF] == 1);

        chip.v[2] = 0b1000_0010;
        chip.run_op(ChipOp::Shlr { x: 2, y: 0 }).unwrap();
        assert!(chip.v[2] == 0b0000_0100);
        assert!(chip.v[0xF] == 1);

        chip.v[2] = 0b0100_0000;
        chip.run_op(ChipOp::Shlr { x: 2, y: 0 }).unwrap();
        assert!(chip.v[2] == 0b1000_0000);
        assert!(chip.v[0xF] == 0);
    }

    #[test]
    fn test_flag_wins_when_vf_is_destination() {
        let mut chip = Chip8::new();
        chip.v[0xF] = 0xFF;
        chip.v[1] = 0x01;
        chip.run_op(ChipOp::Addr { x: 0xF, y: 1 }).unwrap();
        assert!(chip.v[0xF] == 1);
    }

    #[test]
    fn test_run_op_ldi_and_jpo() {
        let mut chip = chip_with(&[0xA2C5, 0xB300]);
        chip.v[0] = 0x12;
        chip.step();
        assert!(chip.i() == 0x2C5);
        chip.step();
        assert!(chip.pc() == 0x312);
    }

    #[test]
    fn test_jpo_wraps_to_12_bits() {
        let mut chip = Chip8::new();
        chip.v[0] = 0x02;
        chip.run_op(ChipOp::Jpo { nnn: 0xFFF }).unwrap();
        assert!(chip.pc == 0x001);
    }

    #[test]
    fn test_run_op_rnd_is_masked() {
        let mut chip = Chip8::new();
        for _ in 0..64 {
            chip.run_op(ChipOp::Rnd { x: 4, kk: 0x0F }).unwrap();
            assert!(chip.v[4] & 0xF0 == 0);
        }
        chip.run_op(ChipOp::Rnd { x: 4, kk: 0x00 }).unwrap();
        assert!(chip.v[4] == 0);
    }

    #[test]
    fn test_run_drw_glyph() {
        let mut chip = Chip8::new();
        chip.v[0] = 4;
        chip.v[1] = 1;
        chip.i = 0; // glyph "0" of the font
        chip.run_op(ChipOp::Drw { x: 0, y: 1, n: 5 }).unwrap();
        let screen = chip.display_snapshot();
        assert!(screen[(1, 0)] == 0x0F);
        assert!(screen[(2, 0)] == 0x09);
        assert!(screen[(3, 0)] == 0x09);
        assert!(screen[(4, 0)] == 0x09);
        assert!(screen[(5, 0)] == 0x0F);
        assert!(chip.v[0xF] == 0);
        assert!(chip.pc == 0x202);
    }

    #[test]
    fn test_run_drw_same_sprite_twice_collides() {
        let img_loc = 0x400;
        let mut chip = Chip8::new();
        chip.v[0] = 4;
        chip.v[1] = 1;
        chip.i = img_loc;
        let sprite = [0xFF, 0x81, 0x81, 0x81, 0xFF];
        chip.memory[img_loc as usize..img_loc as usize + 5].copy_from_slice(&sprite);

        // Test first drw has no collision
        chip.run_op(ChipOp::Drw { x: 0, y: 1, n: 5 }).unwrap();
        assert!(chip.v[0xF] == 0);
        assert!(!chip.display_snapshot().is_blank());

        // Same sprite again erases it and reports the collision
        chip.run_op(ChipOp::Drw { x: 0, y: 1, n: 5 }).unwrap();
        assert!(chip.v[0xF] == 1);
        assert!(chip.display_snapshot().is_blank());
        assert!(chip.i == img_loc);
    }

    #[test]
    fn test_run_drw_sprite_read_wraps_memory() {
        let mut chip = Chip8::new();
        chip.i = 0xFFF;
        chip.memory[0xFFF] = 0x80;
        chip.memory[0x000] = 0xF0; // first font byte
        chip.run_op(ChipOp::Drw { x: 0, y: 0, n: 2 }).unwrap();
        assert!(chip.display_snapshot().pixel(0, 0));
        assert!(chip.display_snapshot().pixel(3, 1));
    }

    #[test]
    fn test_run_op_key_skips() {
        let mut chip = Chip8::new();
        chip.v[1] = 0xA;
        chip.run_op(ChipOp::Skp { x: 1 }).unwrap();
        assert!(chip.pc == 0x202);
        chip.run_op(ChipOp::Sknp { x: 1 }).unwrap();
        assert!(chip.pc == 0x206);

        chip.set_key(0xA, true);
        chip.run_op(ChipOp::Skp { x: 1 }).unwrap();
        assert!(chip.pc == 0x20A);
        chip.run_op(ChipOp::Sknp { x: 1 }).unwrap();
        assert!(chip.pc == 0x20C);
    }

    #[test]
    fn test_out_of_range_key_is_ignored() {
        let mut chip = Chip8::new();
        chip.set_key(0x10, true);
        assert!(chip.keys().iter().all(|&k| !k));
    }

    #[test]
    fn test_ldk_blocks_until_key_edge() {
        // LD V5, K ; LD V6, 0x01
        let mut chip = chip_with(&[0xF50A, 0x6601]);
        assert!(chip.step() == ExecState::AwaitingKey(5));

        let before = chip.snapshot();
        for _ in 0..10 {
            assert!(chip.step() == ExecState::AwaitingKey(5));
        }
        assert!(chip.pc() == 0x200);
        assert!(chip.v() == before.v());
        assert!(chip.memory() == before.memory());

        chip.set_key(0xB, true);
        assert!(chip.step() == ExecState::Running);
        assert!(chip.v()[5] == 0xB);
        assert!(chip.pc() == 0x202);

        chip.step();
        assert!(chip.v()[6] == 0x01);
    }

    #[test]
    fn test_ldk_ignores_key_held_before_wait() {
        let mut chip = chip_with(&[0xF00A]);
        chip.set_key(0x3, true);
        chip.step();
        chip.step();
        assert!(chip.state() == ExecState::AwaitingKey(0));

        chip.set_key(0x3, false);
        chip.set_key(0x3, true);
        chip.step();
        assert!(chip.state() == ExecState::Running);
        assert!(chip.v()[0] == 0x3);
    }

    #[test]
    fn test_timers_tick_while_awaiting_key() {
        // LD V0, 0x3C ; LD DT, V0 ; LD V1, K
        let mut chip = chip_with(&[0x603C, 0xF015, 0xF10A]);
        chip.step();
        chip.step();
        chip.step();
        assert!(chip.delay_timer() == 60);
        for _ in 0..60 {
            chip.tick_timers();
            chip.step();
        }
        assert!(chip.delay_timer() == 0);
        assert!(chip.state() == ExecState::AwaitingKey(1));
    }

    #[test]
    fn test_delay_timer_independent_of_steps() {
        // JP 0x200
        let mut chip = chip_with(&[0x1200]);
        chip.timers.delay = 60;
        for n in 0..60 {
            chip.tick_timers();
            for _ in 0..n % 7 {
                chip.step();
            }
        }
        assert!(chip.delay_timer() == 0);
        chip.tick_timers();
        assert!(chip.delay_timer() == 0);
    }

    #[test]
    fn test_run_op_timer_loads() {
        // LD V0, 0x05 ; LD ST, V0 ; LD DT, V0 ; LD V1, DT
        let mut chip = chip_with(&[0x6005, 0xF018, 0xF015, 0xF107]);
        for _ in 0..3 {
            chip.step();
        }
        assert!(chip.sound_active());
        assert!(chip.sound_timer() == 5);
        chip.tick_timers();
        chip.step();
        assert!(chip.v()[1] == 4);
        for _ in 0..4 {
            chip.tick_timers();
        }
        assert!(!chip.sound_active());
    }

    #[test]
    fn test_run_op_addi() {
        let mut chip = Chip8::new();
        chip.i = 0xFFE;
        chip.v[1] = 0x03;
        chip.v[0xF] = 0x7;
        chip.run_op(ChipOp::Addi { x: 1 }).unwrap();
        assert!(chip.i == 0x001);
        assert!(chip.v[0xF] == 0x7);
    }

    #[test]
    fn test_run_op_addi_overflow_flag() {
        let mut chip = Chip8::with_quirks(Quirks {
            addi_overflow_flag: true,
        });
        chip.i = 0xFFE;
        chip.v[1] = 0x03;
        chip.run_op(ChipOp::Addi { x: 1 }).unwrap();
        assert!(chip.i == 0x001);
        assert!(chip.v[0xF] == 1);

        chip.run_op(ChipOp::Addi { x: 1 }).unwrap();
        assert!(chip.i == 0x004);
        assert!(chip.v[0xF] == 0);
    }

    #[test]
    fn test_run_op_ldfv() {
        let mut chip = Chip8::new();
        chip.v[2] = 0x1A; // only the low nibble counts
        chip.run_op(ChipOp::Ldfv { x: 2 }).unwrap();
        assert!(chip.i == 50);
        assert!(chip.memory[50..55] == CHIP8_FONTSET[50..55]);
    }

    #[test]
    fn test_run_op_ldbv() {
        let mut chip = Chip8::new();
        chip.i = 0x300;
        for (value, digits) in [(255u8, [2u8, 5, 5]), (137, [1, 3, 7]), (7, [0, 0, 7])] {
            chip.v[0] = value;
            chip.run_op(ChipOp::Ldbv { x: 0 }).unwrap();
            assert!(chip.memory[0x300..0x303] == digits);
        }
        assert!(chip.i == 0x300);
    }

    #[test]
    fn test_run_op_ldiv_ldvi() {
        let mut chip = Chip8::new();
        chip.i = 0x400;
        chip.v[..4].copy_from_slice(&[1, 2, 3, 4]);
        chip.v[4] = 99;
        chip.run_op(ChipOp::Ldiv { x: 3 }).unwrap();
        assert!(chip.memory[0x400..0x405] == [1, 2, 3, 4, 0]);
        assert!(chip.i == 0x400);

        chip.v = [0; 16];
        chip.run_op(ChipOp::Ldvi { x: 2 }).unwrap();
        assert!(chip.v[..4] == [1, 2, 3, 0]);
        assert!(chip.i == 0x400);
    }

    #[test]
    fn test_load_rejects_oversized_rom() {
        let mut chip = chip_with(&[0x1234]);
        let before = chip.snapshot();
        let rom = vec![0xAA; MAX_ROM_SIZE + 1];
        assert_eq!(rom.len(), 0xE01);

        let res = chip.load(&rom);
        assert!(res == Err(ResourceError::RomTooLarge { size: 0xE01, max: 0xE00 }));
        assert!(chip.memory() == before.memory());
    }

    #[test]
    fn test_load_fills_program_space() {
        let mut chip = Chip8::new();
        chip.load(&vec![0xAA; MAX_ROM_SIZE]).unwrap();
        assert!(chip.memory()[0xFFF] == 0xAA);

        chip.load(&[0x00, 0xE0]).unwrap();
        assert!(chip.memory()[0x200..0x203] == [0x00, 0xE0, 0x00]);
    }

    #[test]
    fn test_reset_keeps_program() {
        // LD V0, 0x2A ; CALL 0x206 ; pad ; LD DT, V0 ; LD V1, K
        let mut chip = chip_with(&[0x602A, 0x2206, 0x0000, 0xF015, 0xF10A]);
        chip.i = 0x234;
        chip.memory[0x10] = 0; // corrupt the font
        for _ in 0..4 {
            chip.step();
        }
        assert!(chip.state() == ExecState::AwaitingKey(1));
        chip.screen.draw(0, 0, &[0xFF]);

        chip.reset();
        assert!(chip.pc() == PROGRAM_START);
        assert!(chip.v() == &[0; 16]);
        assert!(chip.i() == 0);
        assert!(chip.sp() == 0);
        assert!(chip.delay_timer() == 0);
        assert!(chip.state() == ExecState::Running);
        assert!(chip.display_snapshot().is_blank());
        assert!(chip.memory()[..80] == CHIP8_FONTSET);
        assert!(chip.memory()[0x200..0x202] == [0x60, 0x2A]);
    }

    #[test]
    fn test_reset_recovers_from_halt() {
        let mut chip = chip_with(&[0x00EE]);
        assert!(matches!(chip.step(), ExecState::Halted(_)));
        chip.reset();
        assert!(chip.state() == ExecState::Running);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut chip = chip_with(&[0x6001, 0x7001, 0x7001]);
        chip.step();
        let saved = chip.snapshot();
        chip.step();
        chip.step();
        assert!(chip.v()[0] == 3);

        chip.restore(saved);
        assert!(chip.v()[0] == 1);
        assert!(chip.pc() == 0x202);
    }

    #[test]
    fn test_ibm_logo_fragment() {
        // CLS ; LD I, 0x20A ; LD V0, 0x0C ; LD V1, 0x08 ; DRW V0, V1, 0x2
        let mut chip = chip_with(&[0x00E0, 0xA20A, 0x600C, 0x6108, 0xD012, 0xFFFF]);
        for _ in 0..5 {
            assert!(chip.step() == ExecState::Running);
        }
        let screen = chip.display_snapshot();
        assert!(screen[(8, 1)] == 0b00001111);
        assert!(screen[(8, 2)] == 0b11110000);
        assert!(screen[(9, 1)] == 0b00001111);
        assert!(screen[(9, 2)] == 0b11110000);
        assert!(chip.v()[0xF] == 0);
    }
}
