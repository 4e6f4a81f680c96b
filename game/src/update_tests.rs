use super::*;
use draw::{cell_origin, ScreenXY, CELL_H, CELL_W, HUD_Y, MOVE_COUNT_X};

#[derive(Default)]
struct Storage(Vec<Command>);

impl ClearableStorage<Command> for Storage {
    fn clear(&mut self) {
        self.0.clear();
    }

    fn push(&mut self, command: Command) {
        self.0.push(command);
    }
}

#[derive(Default)]
struct Harness {
    state: State,
    commands: Storage,
    surface: Surface,
}

impl Harness {
    fn tick(&mut self, input_flags: InputFlags) {
        update(&mut self.state, &mut self.commands, input_flags);
        self.surface.apply_all(self.commands.0.iter());
    }

    fn ticks(&mut self, count: u16, input_flags: InputFlags) {
        for _ in 0..count {
            self.tick(input_flags);
        }
    }

    /// Waits out any cooldown, then holds `input_flags` for one frame.
    fn press(&mut self, input_flags: InputFlags) {
        self.ticks(u16::from(self.state.session.input_cooldown), 0);
        self.tick(input_flags);
    }

    fn session(&self) -> &Session {
        &self.state.session
    }

    fn centre_tile(&self, cell: Cell) -> draw::TileIndex {
        self.surface.tile_at(cell_origin(cell) + xy(1, 1))
    }

    fn centre_palette(&self, cell: Cell) -> Palette {
        self.surface.palette_at(cell_origin(cell) + xy(1, 1))
    }

    fn corner_palette(&self, cell: Cell) -> Palette {
        self.surface.palette_at(cell_origin(cell))
    }
}

fn xy(x: u8, y: u8) -> ScreenXY {
    ScreenXY { x, y }
}

fn cell(row: u8, col: u8) -> Cell {
    use core::convert::TryFrom;
    Cell {
        row: Coord::try_from(row).expect("row out of range"),
        col: Coord::try_from(col).expect("col out of range"),
    }
}

/// Goes through the title screen, then swaps in `board` and `cursor` and
/// redraws them.
fn playing_harness(board: Board, cursor: Cell) -> Harness {
    let mut harness = Harness::default();
    harness.tick(0);
    harness.tick(INPUT_START);
    harness.tick(0);
    assert_eq!(harness.state.phase, Phase::Playing);

    harness.state.session.board = board;
    harness.state.session.cursor = cursor;

    let mut storage = Storage::default();
    draw::draw_board(&mut storage, &harness.state.session.board);
    draw::draw_cursor(&mut storage, &harness.state.session.board, cursor, CursorMode::Shown);
    harness.surface.apply_all(storage.0.iter());

    harness
}

/// Solved apart from 15 being one step to the right, with the empty cell
/// at (3, 2).
fn one_move_from_solved() -> Board {
    let mut board = Board::solved();
    assert!(board.try_slide(cell(3, 2)).moved().is_some());
    board
}

fn within_cell(at: ScreenXY, cell: Cell) -> bool {
    let origin = cell_origin(cell);
    at.x >= origin.x && at.x < origin.x + CELL_W
    && at.y >= origin.y && at.y < origin.y + CELL_H
}

fn written_xy(command: &Command) -> Option<ScreenXY> {
    match *command {
        Command::Tile(at, _) | Command::Palette(at, _) => Some(at),
        Command::DisplayOn | Command::DisplayOff => None,
    }
}

#[test]
fn the_first_frame_draws_the_title_and_turns_the_display_on() {
    let mut harness = Harness::default();

    harness.tick(0);

    assert!(harness.surface.is_display_on());
    assert_eq!(harness.state.phase, Phase::Title(StartButton::AwaitingPress));
    assert_eq!(harness.surface.tile_at(xy(7, 5)), draw::digit_tile(1));
    assert_eq!(harness.surface.tile_at(xy(9, 5)), draw::digit_tile(5));
    assert_eq!(harness.surface.tile_at(xy(9, 9)), draw::T_EMPTY_CELL);
    assert_eq!(harness.surface.palette_at(xy(0, 0)), Palette::Text);
}

#[test]
fn the_title_screen_counts_frames_until_start_is_pressed() {
    let mut harness = Harness::default();
    harness.tick(0);

    harness.ticks(10, INPUT_UP | INPUT_CONFIRM);
    assert_eq!(harness.state.seed_counter, 10);
    assert_eq!(harness.state.phase, Phase::Title(StartButton::AwaitingPress));

    harness.tick(INPUT_START);
    assert_eq!(harness.state.seed_counter, 11);
    assert_eq!(harness.state.phase, Phase::Title(StartButton::AwaitingRelease));

    // Holding start doesn't count.
    harness.ticks(30, INPUT_START);
    assert_eq!(harness.state.seed_counter, 11);
    assert_eq!(harness.state.phase, Phase::Title(StartButton::AwaitingRelease));

    harness.tick(0);
    assert_eq!(harness.state.phase, Phase::Playing);
    assert_eq!(harness.session().board(), Session::new(11).board());
}

#[test]
fn starting_a_game_redraws_everything_with_the_display_off() {
    let mut harness = Harness::default();
    harness.tick(0);
    harness.tick(INPUT_START);
    harness.tick(0);

    let commands = &harness.commands.0;
    assert_eq!(commands.first(), Some(&Command::DisplayOff));
    assert_eq!(commands.last(), Some(&Command::DisplayOn));
    assert!(harness.surface.is_display_on());

    let session = harness.session();
    assert_eq!(session.move_count(), 0);
    assert_eq!(session.cursor(), Cell::ZERO);
    assert!(!session.is_won());
    assert!(session.board().is_valid());
    assert!(!session.board().is_solved());

    for cell in Cell::all() {
        let value = session.board().value_at(cell);
        let expected_tile = match value {
            EMPTY => draw::T_EMPTY_CELL,
            1..=9 => draw::T_NUM_START + value - 1,
            _ => draw::T_NUM10_L + (value - 10) * 2,
        };
        assert_eq!(harness.centre_tile(cell), expected_tile, "{:?}", cell);
        assert_eq!(harness.centre_palette(cell), draw::palette_for(value), "{:?}", cell);
    }

    // The title sits inside the grid's area, so the off-grid palette is what
    // tells the two screens apart.
    assert_eq!(harness.surface.palette_at(xy(0, 0)), Palette::Ui);
    assert_eq!(harness.surface.tile_at(xy(0, 0)), draw::T_BLANK);
    assert_eq!(harness.surface.tile_at(xy(3, 2)), draw::T_BORDER_TL);
    assert_eq!(harness.surface.tile_at(xy(MOVE_COUNT_X + 2, HUD_Y)), draw::T_DIGIT_ZERO);
    assert_eq!(harness.surface.palette_at(xy(MOVE_COUNT_X, HUD_Y)), Palette::Text);
    assert_eq!(harness.corner_palette(Cell::ZERO), Palette::CURSOR);
}

#[test]
fn directions_move_the_cursor_one_cell_per_cooldown() {
    let mut harness = playing_harness(Board::solved(), Cell::ZERO);

    harness.tick(INPUT_RIGHT);
    assert_eq!(harness.session().cursor(), cell(0, 1));

    // Still held, but cooling down.
    harness.ticks(u16::from(INPUT_DELAY), INPUT_RIGHT);
    assert_eq!(harness.session().cursor(), cell(0, 1));

    harness.tick(INPUT_RIGHT);
    assert_eq!(harness.session().cursor(), cell(0, 2));
}

#[test]
fn the_cursor_stays_on_the_grid() {
    let mut harness = playing_harness(Board::solved(), Cell::ZERO);

    harness.press(INPUT_UP);
    harness.press(INPUT_LEFT);
    assert_eq!(harness.session().cursor(), Cell::ZERO);

    for _ in 0..10 {
        harness.press(INPUT_DOWN);
        harness.press(INPUT_RIGHT);
    }
    assert_eq!(harness.session().cursor(), Cell::MAX);
    assert_eq!(harness.corner_palette(Cell::MAX), Palette::CURSOR);
}

#[test]
fn two_held_directions_move_the_cursor_diagonally() {
    let mut harness = playing_harness(Board::solved(), Cell::ZERO);

    harness.tick(INPUT_DOWN | INPUT_RIGHT);

    assert_eq!(harness.session().cursor(), cell(1, 1));
}

#[test]
fn moving_the_cursor_restores_the_palette_it_left_behind() {
    let mut harness = playing_harness(one_move_from_solved(), cell(3, 1));

    harness.tick(INPUT_RIGHT);

    assert_eq!(harness.session().cursor(), cell(3, 2));
    assert_eq!(harness.corner_palette(cell(3, 1)), Palette::Purple);
    assert_eq!(harness.corner_palette(cell(3, 2)), Palette::CURSOR);

    harness.press(INPUT_RIGHT);

    // (3, 2) is the empty cell, so it goes back to the empty palette.
    assert_eq!(harness.corner_palette(cell(3, 2)), Palette::Empty);
    assert_eq!(harness.corner_palette(cell(3, 3)), Palette::CURSOR);

    // Only the corners of the two cells were touched.
    let commands = &harness.commands.0;
    assert_eq!(commands.len(), 8);
    for command in commands.iter() {
        let at = written_xy(command).expect("only palette writes");
        assert!(within_cell(at, cell(3, 2)) || within_cell(at, cell(3, 3)), "{:?}", at);
    }
}

#[test]
fn confirm_slides_the_tile_under_the_cursor_and_redraws_only_what_changed() {
    let mut harness = playing_harness(Board::solved(), cell(3, 2));

    harness.tick(INPUT_CONFIRM);

    let session = harness.session();
    assert_eq!(session.move_count(), 1);
    assert_eq!(session.board().value_at(cell(3, 3)), 15);
    assert_eq!(session.board().empty(), cell(3, 2));
    assert!(!session.is_won());
    assert_eq!(harness.state.phase, Phase::Playing);

    assert_eq!(harness.centre_tile(cell(3, 3)), draw::T_NUM10_L + 10);
    assert_eq!(harness.centre_tile(cell(3, 2)), draw::T_EMPTY_CELL);
    assert_eq!(harness.centre_palette(cell(3, 2)), Palette::Empty);
    assert_eq!(harness.corner_palette(cell(3, 2)), Palette::CURSOR);
    assert_eq!(harness.surface.tile_at(xy(MOVE_COUNT_X + 2, HUD_Y)), draw::digit_tile(1));

    for command in harness.commands.0.iter() {
        let at = written_xy(command).expect("no display toggling mid game");
        assert!(
            within_cell(at, cell(3, 2)) || within_cell(at, cell(3, 3)) || at.y == HUD_Y,
            "{:?}",
            at
        );
    }
}

#[test]
fn confirm_on_a_tile_that_is_not_next_to_the_gap_does_nothing_but_cool_down() {
    let mut harness = playing_harness(Board::solved(), Cell::ZERO);

    harness.tick(INPUT_CONFIRM);

    assert_eq!(harness.session().board(), &Board::solved());
    assert_eq!(harness.session().move_count(), 0);
    assert_eq!(harness.session().input_cooldown, INPUT_DELAY);
    assert!(harness.commands.0.is_empty());
}

#[test]
fn confirm_on_the_empty_cell_does_nothing() {
    let mut harness = playing_harness(Board::solved(), Cell::MAX);

    harness.tick(INPUT_CONFIRM);

    assert_eq!(harness.session().board(), &Board::solved());
    assert_eq!(harness.session().move_count(), 0);
}

#[test]
fn quick_slide_moves_tiles_just_like_confirm() {
    let mut harness = playing_harness(Board::solved(), cell(2, 3));

    harness.tick(INPUT_QUICK_SLIDE);

    assert_eq!(harness.session().move_count(), 1);
    assert_eq!(harness.session().board().value_at(cell(3, 3)), 12);
    assert_eq!(harness.session().board().empty(), cell(2, 3));
}

#[test]
fn confirm_and_quick_slide_together_only_move_once() {
    let mut harness = playing_harness(Board::solved(), cell(3, 2));

    harness.tick(INPUT_CONFIRM | INPUT_QUICK_SLIDE);

    assert_eq!(harness.session().move_count(), 1);
}

#[test]
fn sliding_back_and_forth_counts_every_move() {
    let mut harness = playing_harness(Board::solved(), cell(3, 2));

    harness.press(INPUT_CONFIRM);
    harness.press(INPUT_RIGHT);
    harness.press(INPUT_CONFIRM);

    assert_eq!(harness.session().move_count(), 2);
    assert_eq!(harness.session().board(), &Board::solved());
    assert_eq!(harness.surface.tile_at(xy(MOVE_COUNT_X + 2, HUD_Y)), draw::digit_tile(2));
}

#[test]
fn solving_the_puzzle_flashes_the_board_then_waits_for_start() {
    let mut harness = playing_harness(one_move_from_solved(), cell(3, 3));

    harness.tick(INPUT_CONFIRM);

    assert!(harness.session().is_won());
    assert!(harness.session().board().is_solved());
    assert_eq!(harness.session().move_count(), 1);
    for cell in Cell::all() {
        assert_eq!(harness.centre_palette(cell), Palette::WIN_FLASH, "{:?}", cell);
    }

    let hold = u16::from(WIN_FLASH_HOLD_FRAMES);

    // Input is ignored while flashing.
    harness.ticks(hold - 1, INPUT_START | INPUT_CONFIRM | INPUT_LEFT);
    assert_eq!(harness.centre_palette(Cell::ZERO), Palette::WIN_FLASH);
    assert_eq!(harness.session().cursor(), cell(3, 3));

    harness.tick(0);
    for cell in Cell::all() {
        assert_eq!(
            harness.centre_palette(cell),
            draw::palette_for(harness.session().board().value_at(cell)),
            "{:?}",
            cell
        );
    }

    let remaining = u16::from(WIN_FLASH_CYCLES) * hold - hold;
    harness.ticks(remaining - 1, INPUT_START);
    assert!(matches!(harness.state.phase, Phase::Won(WinStage::Flashing { .. })));

    harness.tick(INPUT_START);
    assert_eq!(harness.state.phase, Phase::Won(WinStage::Waiting(StartButton::AwaitingPress)));

    // The animation ends on the normal palettes.
    assert_eq!(harness.centre_palette(cell(0, 0)), Palette::Blue);
    assert_eq!(harness.centre_palette(cell(3, 3)), Palette::Empty);
}

#[test]
fn start_after_a_win_replays_the_board_the_title_screen_seeded() {
    let mut harness = playing_harness(one_move_from_solved(), cell(3, 3));
    let title_seed_counter = harness.state.seed_counter;

    harness.tick(INPUT_CONFIRM);
    harness.ticks(u16::from(WIN_FLASH_CYCLES) * u16::from(WIN_FLASH_HOLD_FRAMES), 0);
    assert_eq!(harness.state.phase, Phase::Won(WinStage::Waiting(StartButton::AwaitingPress)));

    // Idling on the win screen does not feed the seed.
    harness.ticks(100, 0);
    assert_eq!(harness.state.seed_counter, title_seed_counter);

    harness.tick(INPUT_START);
    assert_eq!(harness.state.phase, Phase::Won(WinStage::Waiting(StartButton::AwaitingRelease)));

    harness.ticks(3, INPUT_START);
    assert_eq!(harness.state.phase, Phase::Won(WinStage::Waiting(StartButton::AwaitingRelease)));

    harness.tick(0);
    assert_eq!(harness.state.phase, Phase::Playing);
    assert_eq!(harness.state.seed_counter, title_seed_counter);

    let session = harness.session();
    assert_eq!(session.board(), Session::new(title_seed_counter).board());
    assert_eq!(session.move_count(), 0);
    assert_eq!(session.cursor(), Cell::ZERO);
    assert!(!session.is_won());
    assert_eq!(harness.commands.0.last(), Some(&Command::DisplayOn));
}

#[test]
fn random_play_through_the_controller_keeps_the_board_valid() {
    let mut rng = xs_from_seed([9; 16]);
    let mut harness = playing_harness(Session::new(77).board().clone(), Cell::ZERO);

    const BUTTONS: [InputFlags; 6] = [
        INPUT_UP,
        INPUT_DOWN,
        INPUT_LEFT,
        INPUT_RIGHT,
        INPUT_CONFIRM,
        INPUT_QUICK_SLIDE,
    ];

    let mut last_count = 0;
    for _ in 0..5000 {
        let button = BUTTONS[xs_u32(&mut rng, 0, BUTTONS.len() as u32) as usize];
        harness.tick(button);

        let session = harness.session();
        assert!(session.board().is_valid());
        assert!(session.move_count() >= last_count);
        last_count = session.move_count();

        if harness.state.phase != Phase::Playing {
            break;
        }
    }

    assert!(last_count > 0);
}
