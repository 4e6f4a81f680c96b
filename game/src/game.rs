#![deny(unused)]

macro_rules! compile_time_assert {
    ($assertion: expr) => {{
        #[allow(unknown_lints, eq_op)]
        // Based on the const_assert macro from static_assertions;
        const _: [(); 0 - !{$assertion} as usize] = [];
    }}
}

pub trait ClearableStorage<A> {
    fn clear(&mut self);

    fn push(&mut self, a: A);
}

pub type Seed = [u8; 16];

pub type Xs = [core::num::Wrapping<u32>; 4];

fn xorshift(xs: &mut Xs) -> u32 {
    let mut t = xs[3];

    xs[3] = xs[2];
    xs[2] = xs[1];
    xs[1] = xs[0];

    t ^= t << 11;
    t ^= t >> 8;
    xs[0] = t ^ xs[0] ^ (xs[0] >> 19);

    xs[0].0
}

fn xs_u32(xs: &mut Xs, min: u32, one_past_max: u32) -> u32 {
    (xorshift(xs) % (one_past_max - min)) + min
}

/// The next pseudo-random byte.
pub fn xs_u8(xs: &mut Xs) -> u8 {
    (xorshift(xs) >> 24) as u8
}

pub fn xs_from_seed(mut seed: Seed) -> Xs {
    // 0 doesn't work as a seed, so use this one instead.
    if seed == [0; 16] {
        seed = 0xBAD_5EED_u128.to_le_bytes();
    }

    macro_rules! wrap {
        ($i0: literal, $i1: literal, $i2: literal, $i3: literal) => {
            core::num::Wrapping(
                u32::from_le_bytes([
                    seed[$i0],
                    seed[$i1],
                    seed[$i2],
                    seed[$i3],
                ])
            )
        }
    }

    [
        wrap!( 0,  1,  2,  3),
        wrap!( 4,  5,  6,  7),
        wrap!( 8,  9, 10, 11),
        wrap!(12, 13, 14, 15),
    ]
}

/// Frames counted while waiting for the player to press Start. This is all
/// the entropy the shuffle gets, so only about 16 bits of it, and a player
/// with steady hands can land on the same board twice.
pub type SeedCounter = u16;

/// A counter only fills the first word of the state, and xorshift takes a few
/// rounds to spread that out, so we throw those rounds away.
const SEED_COUNTER_WARM_UP_ROUNDS: u8 = 64;

pub fn xs_from_seed_counter(counter: SeedCounter) -> Xs {
    let mut rng = xs_from_seed(u128::from(counter).to_le_bytes());

    for _ in 0..SEED_COUNTER_WARM_UP_ROUNDS {
        xorshift(&mut rng);
    }

    rng
}

mod checked {
    pub trait AddOne: Sized {
        fn checked_add_one(&self) -> Option<Self>;
    }

    pub trait SubOne: Sized {
        fn checked_sub_one(&self) -> Option<Self>;
    }
}
use checked::{AddOne, SubOne};

pub mod board;

pub use board::{
    Board,
    Cell,
    CellsChanged,
    Coord,
    Dir,
    MoveOutcome,
    TileValue,
    EMPTY,
};

#[cfg(test)]
mod board_tests;

pub mod draw;

pub use draw::{
    Command,
    CursorMode,
    Palette,
    Surface,
};

/// Which buttons are held down right now. Level, not edge: the controller
/// does its own debouncing.
pub type InputFlags = u8;

pub const INPUT_UP: InputFlags          = 0b0000_0001;
pub const INPUT_DOWN: InputFlags        = 0b0000_0010;
pub const INPUT_LEFT: InputFlags        = 0b0000_0100;
pub const INPUT_RIGHT: InputFlags       = 0b0000_1000;
pub const INPUT_CONFIRM: InputFlags     = 0b0001_0000;
pub const INPUT_QUICK_SLIDE: InputFlags = 0b0010_0000;
pub const INPUT_START: InputFlags       = 0b0100_0000;

pub const INPUT_DIRECTIONS: InputFlags = INPUT_UP | INPUT_DOWN | INPUT_LEFT | INPUT_RIGHT;

// 64k moves ought to be enough for anybody!
pub type MoveCount = u16;

/// In frames.
pub type Cooldown = u8;

/// How many frames input is ignored for after the player does something.
pub const INPUT_DELAY: Cooldown = 6;

/// In frames.
pub type AnimationTimer = u8;

pub const WIN_FLASH_CYCLES: u8 = 6;
pub const WIN_FLASH_HOLD_FRAMES: AnimationTimer = 20;

/// Everything about one attempt at the puzzle. A fresh one is made every time
/// a game starts.
#[derive(Clone, Debug, Default)]
pub struct Session {
    board: Board,
    cursor: Cell,
    move_count: MoveCount,
    won: bool,
    input_cooldown: Cooldown,
}

impl Session {
    /// A shuffled board seeded from `seed_counter`, with the cursor in the top
    /// left.
    pub fn new(seed_counter: SeedCounter) -> Self {
        let mut rng = xs_from_seed_counter(seed_counter);

        let mut board = Board::solved();
        board::shuffle(&mut board, &mut rng);

        Self {
            board,
            ..<_>::default()
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cursor(&self) -> Cell {
        self.cursor
    }

    pub fn move_count(&self) -> MoveCount {
        self.move_count
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    /// Slides the tile at `cell` into the empty cell if they are neighbours,
    /// counting the move. Otherwise nothing changes.
    pub fn try_move(&mut self, cell: Cell) -> MoveOutcome {
        let outcome = self.board.try_slide(cell);

        if let MoveOutcome::Moved(changed) = outcome {
            self.move_count = self.move_count.saturating_add(1);

            log::debug!(
                "slid {} from {:?} to {:?}, {} moves",
                self.board.value_at(changed.old_empty),
                changed.new_empty,
                changed.old_empty,
                self.move_count
            );
        }

        outcome
    }

    /// Every held direction is applied, so holding two gives a diagonal step.
    /// Directions that would leave the grid are ignored.
    fn move_cursor(&mut self, input_flags: InputFlags) {
        let cursor = &mut self.cursor;

        if INPUT_UP & input_flags != 0 {
            if let Some(row) = cursor.row.checked_sub_one() {
                cursor.row = row;
            }
        }
        if INPUT_DOWN & input_flags != 0 {
            if let Some(row) = cursor.row.checked_add_one() {
                cursor.row = row;
            }
        }
        if INPUT_LEFT & input_flags != 0 {
            if let Some(col) = cursor.col.checked_sub_one() {
                cursor.col = col;
            }
        }
        if INPUT_RIGHT & input_flags != 0 {
            if let Some(col) = cursor.col.checked_add_one() {
                cursor.col = col;
            }
        }

        log::trace!("cursor at {:?}", self.cursor);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StartButton {
    AwaitingPress,
    AwaitingRelease,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WinStage {
    Flashing { step: u8, frames_left: AnimationTimer },
    Waiting(StartButton),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// Nothing has been drawn yet.
    Boot,
    Title(StartButton),
    Playing,
    Won(WinStage),
}

impl Default for Phase {
    fn default() -> Self {
        Self::Boot
    }
}

#[derive(Debug, Default)]
pub struct State {
    phase: Phase,
    session: Session,
    seed_counter: SeedCounter,
}

impl State {
    pub fn session(&self) -> &Session {
        &self.session
    }
}

fn start_session(state: &mut State, commands: &mut dyn ClearableStorage<Command>) {
    use draw::*;

    compile_time_assert!(GRID_X + GRID_W < SCREEN_W);
    compile_time_assert!(GRID_Y + GRID_H < SCREEN_H);
    compile_time_assert!(HUD_Y < SCREEN_H);

    state.session = Session::new(state.seed_counter);

    log::info!("new game, seed counter {}", state.seed_counter);

    let session = &state.session;

    commands.push(Command::DisplayOff);

    clear_screen(commands, Palette::Ui);
    draw_border(commands);
    draw_board(commands, &session.board);
    draw_hud(commands, session.move_count);
    draw_cursor(commands, &session.board, session.cursor, CursorMode::Shown);

    commands.push(Command::DisplayOn);

    state.phase = Phase::Playing;
}

fn slide_at_cursor(session: &mut Session, commands: &mut dyn ClearableStorage<Command>) {
    let cursor = session.cursor;

    if session.board.value_at(cursor) == EMPTY {
        return;
    }

    if let MoveOutcome::Moved(changed) = session.try_move(cursor) {
        draw::draw_cell(commands, &session.board, changed.old_empty);
        draw::draw_cell(commands, &session.board, changed.new_empty);
        draw::draw_hud(commands, session.move_count);
        // Redrawing the cell wiped the cursor's corners.
        draw::draw_cursor(commands, &session.board, cursor, CursorMode::Shown);

        if session.board.is_solved() {
            session.won = true;
        }
    }
}

fn update_playing(state: &mut State, commands: &mut dyn ClearableStorage<Command>, input_flags: InputFlags) {
    let session = &mut state.session;

    if session.input_cooldown > 0 {
        session.input_cooldown -= 1;
        return;
    }

    if INPUT_DIRECTIONS & input_flags != 0 {
        draw::draw_cursor(commands, &session.board, session.cursor, CursorMode::Hidden);
        session.move_cursor(input_flags);
        draw::draw_cursor(commands, &session.board, session.cursor, CursorMode::Shown);

        session.input_cooldown = INPUT_DELAY;
    }

    // Confirm and quick-slide do the same thing. If both are held the second
    // finds the cursor on the now empty cell and does nothing.
    for &button in [INPUT_CONFIRM, INPUT_QUICK_SLIDE].iter() {
        if button & input_flags != 0 {
            slide_at_cursor(session, commands);

            session.input_cooldown = INPUT_DELAY;
        }
    }

    if session.won {
        log::info!("solved in {} moves", session.move_count);

        draw::draw_win_flash(commands, &session.board, 0);
        state.phase = Phase::Won(WinStage::Flashing {
            step: 0,
            frames_left: WIN_FLASH_HOLD_FRAMES,
        });
    }
}

/// Advances the game by one frame. Call it once per display refresh, then
/// apply whatever ended up in `commands` to the display. Commands are changes,
/// not a full frame, so the display must keep what it was given before.
pub fn update(
    state: &mut State,
    commands: &mut dyn ClearableStorage<Command>,
    input_flags: InputFlags,
) {
    use Phase::*;
    use StartButton::*;

    commands.clear();

    let start_held = INPUT_START & input_flags != 0;

    match state.phase {
        Boot => {
            draw::draw_title(commands);
            commands.push(Command::DisplayOn);

            state.seed_counter = 0;
            state.phase = Title(AwaitingPress);
        },
        Title(AwaitingPress) => {
            state.seed_counter = state.seed_counter.wrapping_add(1);

            if start_held {
                state.phase = Title(AwaitingRelease);
            }
        },
        Title(AwaitingRelease) | Won(WinStage::Waiting(AwaitingRelease)) => {
            if !start_held {
                start_session(state, commands);
            }
        },
        Playing => {
            update_playing(state, commands, input_flags);
        },
        Won(WinStage::Flashing { step, frames_left }) => {
            let frames_left = frames_left.saturating_sub(1);

            state.phase = if frames_left > 0 {
                Won(WinStage::Flashing { step, frames_left })
            } else {
                let step = step + 1;

                if step < WIN_FLASH_CYCLES {
                    draw::draw_win_flash(commands, &state.session.board, step);

                    Won(WinStage::Flashing {
                        step,
                        frames_left: WIN_FLASH_HOLD_FRAMES,
                    })
                } else {
                    Won(WinStage::Waiting(AwaitingPress))
                }
            };
        },
        Won(WinStage::Waiting(AwaitingPress)) => {
            // Only the title screen counts frames, so every replay reuses
            // the title's seed.
            if start_held {
                state.phase = Won(WinStage::Waiting(AwaitingRelease));
            }
        },
    }

    debug_assert!(state.session.board.is_valid(), "{:?}", state.session.board);
}

#[cfg(test)]
mod update_tests;
