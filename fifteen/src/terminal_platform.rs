use super::{palette_rgb, tile_text, Storage};

use game::{
    draw::{SCREEN_H, SCREEN_W},
    InputFlags,
    Surface,
    INPUT_CONFIRM,
    INPUT_DELAY,
    INPUT_DOWN,
    INPUT_LEFT,
    INPUT_QUICK_SLIDE,
    INPUT_RIGHT,
    INPUT_START,
    INPUT_UP,
};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

use std::{
    io::{self, Stdout, Write},
    thread,
    time::{Duration, Instant},
};

/// The handheld refreshes at about 59.73 Hz.
const FRAME_NANOS: u64 = 16_742_706;

const NEEDED_COLS: u16 = SCREEN_W as u16 * 2;
const NEEDED_ROWS: u16 = SCREEN_H as u16;

#[derive(Debug, thiserror::Error)]
pub enum E {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error(
        "the terminal is {}x{}, but the game needs at least {}x{}",
        .cols, .rows, NEEDED_COLS, NEEDED_ROWS
    )]
    TooSmall { cols: u16, rows: u16 },
}

struct Terminal {
    out: Stdout,
}

impl Terminal {
    fn begin() -> Result<Self, E> {
        let (cols, rows) = terminal::size()?;
        if cols < NEEDED_COLS || rows < NEEDED_ROWS {
            return Err(E::TooSmall { cols, rows });
        }

        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        Ok(Self { out })
    }

    fn end(&mut self) -> Result<(), E> {
        execute!(
            self.out,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()?;

        Ok(())
    }

    fn present(&mut self, surface: &Surface) -> Result<(), E> {
        if !surface.is_display_on() {
            queue!(self.out, ResetColor, Clear(ClearType::All))?;
            self.out.flush()?;
            return Ok(());
        }

        for at in Surface::all_xy() {
            if at.x == 0 {
                queue!(self.out, cursor::MoveTo(0, u16::from(at.y)))?;
            }

            let (fg, bg) = palette_rgb(surface.palette_at(at));

            queue!(
                self.out,
                SetForegroundColor(colour(fg)),
                SetBackgroundColor(colour(bg)),
                Print(tile_text(surface.tile_at(at)))
            )?;
        }

        queue!(self.out, ResetColor)?;
        self.out.flush()?;

        Ok(())
    }
}

fn colour([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb { r, g, b }
}

/// Terminals tell us when a key goes down, and repeat that while it is held,
/// but never when it comes back up. So each press counts as held for long
/// enough to outlast the game's input cooldown, which turns one press into
/// one action.
const LATCH_FRAMES: u8 = INPUT_DELAY + 1;

#[derive(Default)]
struct Keys {
    frames_left: [u8; 8],
}

impl Keys {
    /// Drains pending key events without blocking. `None` means quit.
    fn poll(&mut self) -> Result<Option<InputFlags>, E> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(KeyEvent { code, modifiers, .. }) = event::read()? {
                if is_quit(code, modifiers) {
                    return Ok(None);
                }

                if let Some(flag) = input_flag(code) {
                    self.press(flag);
                }
            }
        }

        Ok(Some(self.tick()))
    }

    fn press(&mut self, flag: InputFlags) {
        self.frames_left[flag.trailing_zeros() as usize] = LATCH_FRAMES;
    }

    /// The buttons still held this frame.
    fn tick(&mut self) -> InputFlags {
        let mut input_flags = 0;
        for (bit, frames_left) in self.frames_left.iter_mut().enumerate() {
            if *frames_left > 0 {
                *frames_left -= 1;
                input_flags |= 1 << bit;
            }
        }

        input_flags
    }
}

fn is_quit(code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => true,
        KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn input_flag(code: KeyCode) -> Option<InputFlags> {
    use KeyCode::*;

    let flag = match code {
        Up | Char('w') | Char('W') => INPUT_UP,
        Down | Char('s') | Char('S') => INPUT_DOWN,
        Left | Char('a') | Char('A') => INPUT_LEFT,
        Right | Char('d') | Char('D') => INPUT_RIGHT,
        Char(' ') | Char('z') | Char('Z') => INPUT_CONFIRM,
        Tab | Char('x') | Char('X') => INPUT_QUICK_SLIDE,
        Enter => INPUT_START,
        _ => return None,
    };

    Some(flag)
}

fn run(terminal: &mut Terminal) -> Result<(), E> {
    let mut state = game::State::default();
    let mut commands = Storage(Vec::with_capacity(1024));
    let mut surface = Surface::default();
    let mut keys = Keys::default();

    let frame = Duration::from_nanos(FRAME_NANOS);
    let mut next_frame = Instant::now();

    while let Some(input_flags) = keys.poll()? {
        game::update(&mut state, &mut commands, input_flags);

        if !commands.0.is_empty() {
            surface.apply_all(commands.0.iter());
            terminal.present(&surface)?;
        }

        next_frame += frame;
        let now = Instant::now();
        if next_frame > now {
            thread::sleep(next_frame - now);
        } else {
            // We fell behind, so don't try to catch up with a burst of frames.
            next_frame = now;
        }
    }

    log::info!("quit after {} moves", state.session().move_count());

    Ok(())
}

/// The game's own error wins. A failure to restore the terminal is only
/// returned when the game itself finished cleanly.
fn first_error(ran: Result<(), E>, restored: Result<(), E>) -> Result<(), E> {
    match (ran, restored) {
        (Err(e), Err(restore_error)) => {
            log::error!("could not restore the terminal: {}", restore_error);
            Err(e)
        },
        (ran, restored) => ran.and(restored),
    }
}

pub fn inner_main() -> Result<(), E> {
    let mut terminal = Terminal::begin()?;

    let ran = run(&mut terminal);

    // Put the terminal back before anyone reports `ran`.
    let restored = terminal.end();

    first_error(ran, restored)
}
