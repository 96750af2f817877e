use clap::Parser;
use color_eyre::eyre::{eyre, WrapErr};
use colored::Colorize;
use log::{error, info, warn};
use ratatui::backend::Backend;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::Terminal;

use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use vip8::audio::Beeper;
use vip8::consts::{DEFAULT_CPU_HZ, KEY_COUNT, PROGRAM_START, TIMER_HZ};
use vip8::op::ChipOp;
use vip8::timers::Clock;
use vip8::{disassemble, gfx, Chip8, ExecState, Quirks};

/// Hold time for a key when the terminal never reports its release.
const RELEASE_AFTER: Duration = Duration::from_millis(150);

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// ROM image to run
    #[arg(short, long)]
    rom: PathBuf,
    /// Show registers, keypad and code around PC
    #[arg(short, long)]
    debug: bool,
    /// Instructions executed per second
    #[arg(long, default_value_t = DEFAULT_CPU_HZ, value_parser = clap::value_parser!(u32).range(1..))]
    hz: u32,
    /// ADD I, Vx sets VF when I overflows
    #[arg(long)]
    addi_overflow: bool,
    /// Print a listing of the ROM and exit
    #[arg(long)]
    disassemble: bool,
}

#[derive(Debug, Default)]
struct Model {
    running_state: RunningState,
}

#[derive(Debug, Default, PartialEq, Eq)]
enum RunningState {
    #[default]
    Running,
    Done,
}

#[derive(Clone, Copy, PartialEq)]
pub enum Message {
    KeyDown(u8), // 0x0..=0xF
    KeyUp(u8),
    Quit,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let args = Args::parse();

    let rom = fs::read(&args.rom)
        .wrap_err_with(|| format!("Failed to read rom {}", args.rom.display()))?;

    let mut chip = Chip8::with_quirks(Quirks {
        addi_overflow_flag: args.addi_overflow,
    });
    chip.load(&rom)?;

    if args.disassemble {
        print_listing(&chip, rom.len());
        return Ok(());
    }

    run(chip, &args)
}

fn print_listing(chip: &Chip8, rom_len: usize) {
    let start = PROGRAM_START as usize;
    let end = start + rom_len;
    for line in disassemble(&chip.memory()[..end], start) {
        let text = line.op.to_string();
        let mnemonic = match line.op {
            ChipOp::Unknown(_) => text.red(),
            _ => text.bold(),
        };
        println!(
            "{}  {}  {}",
            format!("{:#05X}", line.addr).dimmed(),
            format!("{:04X}", line.word).yellow(),
            mnemonic
        );
    }
}

fn run(mut chip: Chip8, args: &Args) -> color_eyre::Result<()> {
    tui::install_panic_hook();
    let (mut terminal, reports_release) = tui::init_terminal()?;
    if !reports_release {
        info!("terminal does not report key releases, releasing after {RELEASE_AFTER:?}");
    }

    let result = drive(&mut chip, &mut terminal, args, reports_release);
    tui::restore_terminal()?;
    result?;

    match chip.state() {
        ExecState::Halted(err) => Err(eyre!(err).wrap_err("ROM halted")),
        _ => Ok(()),
    }
}

/// Main loop. Returns on Esc or once the machine halts.
fn drive<B: Backend>(
    chip: &mut Chip8,
    terminal: &mut Terminal<B>,
    args: &Args,
    reports_release: bool,
) -> color_eyre::Result<()> {
    let mut model = Model::default();
    let mut releases = (!reports_release).then(KeyReleases::default);

    let mut beeper = match Beeper::new() {
        Ok(beeper) => Some(beeper),
        Err(err) => {
            warn!("audio disabled: {err}");
            None
        }
    };

    let (input_tx, input_rx) = mpsc::channel::<Message>();
    thread::spawn(move || loop {
        // Handle events and map to a Message
        let message = match event::read() {
            Ok(Event::Key(key)) => handle_key(key),
            Ok(_) => None,
            Err(err) => {
                error!("input thread stopped: {err}");
                break;
            }
        };
        if let Some(message) = message {
            if input_tx.send(message).is_err() {
                break;
            }
        }
    });

    let start = Instant::now();
    let mut cpu_clock = Clock::new(args.hz, start);
    let mut timer_clock = Clock::new(TIMER_HZ, start);
    info!("running at {} instructions/s", cpu_clock.hz());

    while model.running_state != RunningState::Done {
        let now = Instant::now();

        // Run input
        while let Ok(message) = input_rx.try_recv() {
            match message {
                Message::KeyDown(key) => {
                    chip.set_key(key, true);
                    if let Some(releases) = releases.as_mut() {
                        releases.pressed(key, now);
                    }
                }
                Message::KeyUp(key) => chip.set_key(key, false),
                Message::Quit => {}
            }
            update(&mut model, message);
        }
        if let Some(releases) = releases.as_mut() {
            for key in releases.due(now) {
                chip.set_key(key, false);
            }
        }

        if run_steps(chip, cpu_clock.due(now)) {
            model.running_state = RunningState::Done;
        }

        let ticks = timer_clock.due(now);
        for _ in 0..ticks {
            chip.tick_timers();
        }

        // Timer clock doubles as the frame clock
        if ticks > 0 || model.running_state == RunningState::Done {
            terminal.draw(|f| gfx::view(chip, f, args.debug))?;
        }

        // Play sounds
        if let Some(Err(err)) = beeper.as_mut().map(|b| b.set(chip.sound_active())) {
            warn!("audio disabled: {err}");
            beeper = None;
        }

        let now = Instant::now();
        let idle = cpu_clock.until_next(now).min(timer_clock.until_next(now));
        thread::sleep(idle.min(Duration::from_millis(2)));
    }
    Ok(())
}

/// Execute up to `count` instructions. Returns true once the machine halts.
fn run_steps(chip: &mut Chip8, count: u32) -> bool {
    (0..count).any(|_| matches!(chip.step(), ExecState::Halted(_)))
}

/// Synthesized key releases for terminals that only report presses.
///
/// Every press (including auto-repeat) pushes the key's release deadline out
/// by `RELEASE_AFTER`.
#[derive(Debug, Default)]
struct KeyReleases {
    deadlines: [Option<Instant>; KEY_COUNT],
}

impl KeyReleases {
    fn pressed(&mut self, key: u8, now: Instant) {
        self.deadlines[key as usize & 0xF] = Some(now + RELEASE_AFTER);
    }

    /// Keys whose deadline has passed, in key order. Each is reported once.
    fn due(&mut self, now: Instant) -> Vec<u8> {
        let mut keys = Vec::new();
        for (key, deadline) in self.deadlines.iter_mut().enumerate() {
            if deadline.is_some_and(|at| at <= now) {
                *deadline = None;
                keys.push(key as u8);
            }
        }
        keys
    }
}

fn chip8_key_of_char(c: char) -> Option<u8> {
    match c.to_ascii_lowercase() {
        '1' => Some(0x1),
        '2' => Some(0x2),
        '3' => Some(0x3),
        '4' => Some(0xC),
        'q' => Some(0x4),
        'w' => Some(0x5),
        'e' => Some(0x6),
        'r' => Some(0xD),
        'a' => Some(0x7),
        's' => Some(0x8),
        'd' => Some(0x9),
        'f' => Some(0xE),
        'z' => Some(0xA),
        'x' => Some(0x0),
        'c' => Some(0xB),
        'v' => Some(0xF),
        _ => None,
    }
}

fn handle_key(key: event::KeyEvent) -> Option<Message> {
    match key.code {
        KeyCode::Char(c) => {
            let k = chip8_key_of_char(c)?;
            match key.kind {
                KeyEventKind::Press | KeyEventKind::Repeat => Some(Message::KeyDown(k)),
                KeyEventKind::Release => Some(Message::KeyUp(k)),
            }
        }
        KeyCode::Esc => Some(Message::Quit),
        _ => None,
    }
}

fn update(model: &mut Model, msg: Message) {
    if let Message::Quit = msg {
        model.running_state = RunningState::Done;
    }
}

mod tui {
    use ratatui::{
        backend::{Backend, CrosstermBackend},
        crossterm::{
            event::{
                KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
            },
            terminal::{
                disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement,
                EnterAlternateScreen, LeaveAlternateScreen,
            },
            ExecutableCommand,
        },
        Terminal,
    };
    use std::{io::stdout, panic};

    /// Enter raw mode and the alternate screen. The flag is true when the
    /// terminal will report key releases.
    pub fn init_terminal() -> color_eyre::Result<(Terminal<impl Backend>, bool)> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        let reports_release = supports_keyboard_enhancement().unwrap_or(false)
            && stdout()
                .execute(PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                        | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES,
                ))
                .is_ok();
        let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        Ok((terminal, reports_release))
    }

    pub fn restore_terminal() -> color_eyre::Result<()> {
        let _ = stdout().execute(PopKeyboardEnhancementFlags);
        stdout().execute(LeaveAlternateScreen)?;
        disable_raw_mode()?;
        Ok(())
    }

    pub fn install_panic_hook() {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = stdout().execute(PopKeyboardEnhancementFlags);
            let _ = stdout().execute(LeaveAlternateScreen);
            let _ = disable_raw_mode();
            original_hook(panic_info);
        }));
    }
}
