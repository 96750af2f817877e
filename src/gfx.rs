use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Row, Table};
use ratatui::{style::Color, Frame};

use crate::consts::{PROGRAM_START, SCREEN_WIDTH, W, WINDOW};
use crate::cpu::{Chip8, ExecState};
use crate::decode::decode;

fn state_label(state: ExecState) -> String {
    match state {
        ExecState::Running => "running".into(),
        ExecState::AwaitingKey(x) => format!("waiting key -> V{x:X}"),
        ExecState::Halted(err) => format!("halted: {err}"),
    }
}

const KEYPAD_LAYOUT: [[u8; 4]; 4] = [
    [0x1, 0x2, 0x3, 0xC],
    [0x4, 0x5, 0x6, 0xD],
    [0x7, 0x8, 0x9, 0xE],
    [0xA, 0x0, 0xB, 0xF],
];

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn register_table(c8: &Chip8) -> Table<'static> {
    let rows = [
        ("PC", format!("{:#05X}", c8.pc())),
        ("I", format!("{:#05X}", c8.i())),
        ("SP", c8.sp().to_string()),
        ("DT", c8.delay_timer().to_string()),
        ("ST", c8.sound_timer().to_string()),
        ("", state_label(c8.state())),
    ]
    .into_iter()
    .map(|(name, value)| Row::new(vec![name.to_string(), value]));

    Table::new(rows, [Constraint::Length(4), Constraint::Min(12)])
        .header(Row::new(vec!["Reg", "Value"]).style(bold()))
        .block(Block::default().borders(Borders::ALL).title("Registers"))
}

/// V0..VF as a 4x4 grid, one group of four registers per row.
fn v_table(c8: &Chip8) -> Table<'static> {
    let rows = c8.v().chunks(4).enumerate().map(|(g, regs)| {
        let mut cells = vec![format!("V{:X}..V{:X}", g * 4, g * 4 + 3)];
        cells.extend(regs.iter().map(|r| format!("{r:#04X}")));
        Row::new(cells)
    });

    let mut widths = vec![Constraint::Length(9)];
    widths.extend([Constraint::Length(6); 4]);
    Table::new(rows, widths)
        .header(Row::new(vec!["Group", "0", "1", "2", "3"]).style(bold()))
        .block(Block::default().borders(Borders::ALL).title("V Registers"))
}

fn keypad_table(c8: &Chip8) -> Table<'static> {
    let held = Style::default()
        .fg(Color::Black)
        .bg(Color::Green)
        .add_modifier(Modifier::BOLD);
    let keys = c8.keys();

    let rows = KEYPAD_LAYOUT.iter().map(|row| {
        Row::new(row.iter().map(|&key| {
            let style = if keys[key as usize] { held } else { Style::default() };
            Span::styled(format!("{key:X}"), style)
        }))
    });

    Table::new(rows, [Constraint::Length(3); 4])
        .block(Block::default().borders(Borders::ALL).title("Keypad"))
}

/// Instructions in a window of `WINDOW` words either side of PC.
fn code_table(c8: &Chip8) -> Table<'static> {
    let memory = c8.memory();
    let pc = c8.pc() as isize;

    let rows = (-WINDOW..=WINDOW).map(|d| {
        let addr = pc + d * 2;
        let row = if addr < PROGRAM_START as isize || addr as usize + 1 >= memory.len() {
            Row::new(vec!["-".to_string(), "-".into(), "-".into()])
        } else {
            let addr = addr as usize;
            let op = decode(u16::from_be_bytes([memory[addr], memory[addr + 1]])).op;
            Row::new(vec![format!("{addr:#05X}"), op.to_string(), format!("({op:?})")])
        };
        if d == 0 {
            row.style(bold().fg(Color::Green))
        } else {
            row
        }
    });

    let widths = [
        Constraint::Length(7),
        Constraint::Length(16),
        Constraint::Length(9),
    ];
    Table::new(rows, widths).block(Block::default().borders(Borders::ALL).title("Instructions"))
}

/// Side panel: registers, keypad and the code around PC.
pub fn render_chip8_debug(f: &mut Frame, area: Rect, c8: &Chip8) {
    let [regs_area, keys_area, code_area] = Layout::horizontal([
        Constraint::Percentage(45),
        Constraint::Percentage(20),
        Constraint::Percentage(35),
    ])
    .areas(area);
    let [scalar_area, v_area] =
        Layout::vertical([Constraint::Length(9), Constraint::Min(3)]).areas(regs_area);

    f.render_widget(register_table(c8), scalar_area);
    f.render_widget(v_table(c8), v_area);
    f.render_widget(keypad_table(c8), keys_area);
    f.render_widget(code_table(c8), code_area);
}

/// Draw the frame buffer using upper half blocks, two pixel rows per cell.
pub fn view(chip: &Chip8, frame: &mut Frame, debug: bool) {
    let main_area = frame.area();

    let [left_area, right_area] = Layout::horizontal([
        Constraint::Length(SCREEN_WIDTH as u16 + 2),
        Constraint::Percentage(60),
    ])
    .areas(main_area);

    let outer_left_block = Block::bordered().title("vip8");
    let inner_left = outer_left_block.inner(left_area);

    frame.render_widget(outer_left_block, left_area);
    if debug {
        render_chip8_debug(frame, right_area, chip);
    }

    let screen = chip.display_snapshot();
    let buf = frame.buffer_mut();
    for y in 0..16 {
        for x in 0..W {
            let mut fg = screen[(y * 2, x)];
            let mut bg = screen[((y * 2) + 1, x)];

            let x_buf = (x * 8) as u16 + inner_left.x;
            let y_buf = y as u16 + inner_left.y;

            for bit in 0..8 {
                if let Some(cell) = buf.cell_mut((x_buf + (7 - bit), y_buf)) {
                    cell.set_symbol("▀");
                    cell.set_fg(Color::Black);
                    cell.set_bg(Color::Black);
                    if fg & 0x1 == 0x1 {
                        cell.set_fg(Color::Blue);
                    }
                    if bg & 0x1 == 0x1 {
                        cell.set_bg(Color::Blue);
                    }
                }
                fg >>= 1;
                bg >>= 1;
            }
        }
    }
}
