#![deny(unused)]

use crate::{
    board::{Board, Cell, Coord, TileValue, EMPTY},
    ClearableStorage,
    MoveCount,
};

/// The visible background is 20x18 tiles.
pub const SCREEN_W: ScreenCount = 20;
pub const SCREEN_H: ScreenCount = 18;

// An amount of screen tiles, which are usually arranged in a line.
pub type ScreenCount = u8;

pub type ScreenX = ScreenCount;
pub type ScreenY = ScreenCount;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScreenXY {
    pub x: ScreenX,
    pub y: ScreenY,
}

impl core::ops::Add for ScreenXY {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

/// Where the top left tile of cell (0, 0) goes.
pub const GRID_X: ScreenX = 4;
pub const GRID_Y: ScreenY = 3;

/// Each puzzle cell is drawn as a 3x3 block of tiles.
pub const CELL_W: ScreenCount = 3;
pub const CELL_H: ScreenCount = 3;

pub const GRID_W: ScreenCount = Coord::COUNT * CELL_W;
pub const GRID_H: ScreenCount = Coord::COUNT * CELL_H;

pub const HUD_Y: ScreenY = GRID_Y + GRID_H + 2;
pub const HUD_W: ScreenCount = 8;
pub const MOVE_COUNT_X: ScreenX = GRID_X + 1;

/// The widest move count the HUD can show.
pub const MOVE_COUNT_DISPLAY_MAX: MoveCount = 999;

/// An index into the tile patterns loaded into video memory.
pub type TileIndex = u8;

pub const T_BLANK: TileIndex = 0;
pub const T_BORDER_TL: TileIndex = 1;
pub const T_BORDER_T: TileIndex = 2;
pub const T_BORDER_TR: TileIndex = 3;
pub const T_BORDER_L: TileIndex = 4;
pub const T_BORDER_R: TileIndex = 5;
pub const T_BORDER_BL: TileIndex = 6;
pub const T_BORDER_B: TileIndex = 7;
pub const T_BORDER_BR: TileIndex = 8;
pub const T_CELL_BG: TileIndex = 9;
/// Digits 1 to 9 are `T_NUM_START` to `T_NUM_START + 8`.
pub const T_NUM_START: TileIndex = 10;
/// 10 to 15 are drawn with pairs of tiles starting here: tens half, then ones
/// half. The ones half of "10" doubles as the digit 0.
pub const T_NUM10_L: TileIndex = 19;
pub const T_DIGIT_ZERO: TileIndex = T_NUM10_L + 1;
pub const T_EMPTY_CELL: TileIndex = 31;
pub const T_TILE_TL: TileIndex = 32;
pub const T_TILE_T: TileIndex = 33;
pub const T_TILE_TR: TileIndex = 34;
pub const T_TILE_L: TileIndex = 35;
pub const T_TILE_R: TileIndex = 36;
pub const T_TILE_BL: TileIndex = 37;
pub const T_TILE_B: TileIndex = 38;
pub const T_TILE_BR: TileIndex = 39;

pub const TILE_COUNT: TileIndex = 40;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Palette {
    Ui = 0,
    Blue = 1,
    Green = 2,
    Orange = 3,
    Purple = 4,
    Empty = 5,
    Gold = 6,
    Text = 7,
}

impl Default for Palette {
    fn default() -> Self {
        Self::Ui
    }
}

impl Palette {
    pub const COUNT: usize = 8;

    pub const CURSOR: Palette = Palette::Gold;
    pub const WIN_FLASH: Palette = Palette::Gold;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Five bits per channel, as the handheld stores them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb555 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb555 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scaled up to eight bits per channel, for hosts that want that.
    pub fn to_rgb888(self) -> [u8; 3] {
        fn widen(channel: u8) -> u8 {
            ((u16::from(channel & 0x1F) * 255) / 31) as u8
        }

        [widen(self.r), widen(self.g), widen(self.b)]
    }
}

pub type PaletteColours = [Rgb555; 4];

const fn rgb(r: u8, g: u8, b: u8) -> Rgb555 {
    Rgb555::new(r, g, b)
}

/// Indexed by `Palette`. Colour 0 is the lightest shade, colour 3 the darkest.
pub const PALETTES: [PaletteColours; Palette::COUNT] = [
    // Ui
    [rgb(31, 31, 31), rgb(16, 20, 28), rgb(6, 10, 18), rgb(0, 0, 0)],
    // Blue
    [rgb(20, 24, 31), rgb(4, 8, 24), rgb(12, 16, 28), rgb(0, 0, 4)],
    // Green
    [rgb(20, 31, 20), rgb(4, 20, 4), rgb(12, 24, 12), rgb(0, 4, 0)],
    // Orange
    [rgb(31, 24, 20), rgb(24, 8, 4), rgb(28, 16, 12), rgb(4, 0, 0)],
    // Purple
    [rgb(28, 20, 31), rgb(16, 4, 24), rgb(22, 12, 28), rgb(4, 0, 4)],
    // Empty
    [rgb(8, 8, 12), rgb(4, 4, 8), rgb(2, 2, 4), rgb(0, 0, 0)],
    // Gold
    [rgb(31, 31, 16), rgb(24, 20, 0), rgb(16, 12, 0), rgb(0, 0, 0)],
    // Text
    [rgb(31, 31, 31), rgb(20, 20, 20), rgb(10, 10, 10), rgb(0, 0, 0)],
];

/// Which palette a cell holding `value` is normally drawn with.
pub fn palette_for(value: TileValue) -> Palette {
    match value {
        EMPTY => Palette::Empty,
        1..=4 => Palette::Blue,
        5..=8 => Palette::Green,
        9..=12 => Palette::Orange,
        _ => Palette::Purple,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Write into the tilemap plane.
    Tile(ScreenXY, TileIndex),
    /// Write into the attribute plane.
    Palette(ScreenXY, Palette),
    DisplayOn,
    DisplayOff,
}

type Plane<A> = [[A; SCREEN_W as usize]; SCREEN_H as usize];

/// The state of the display, built up from `Command`s. Platforms draw this
/// every frame, so anything not overwritten stays on screen.
#[derive(Clone, Debug)]
pub struct Surface {
    tiles: Plane<TileIndex>,
    palettes: Plane<Palette>,
    display_on: bool,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            tiles: [[T_BLANK; SCREEN_W as usize]; SCREEN_H as usize],
            palettes: [[Palette::Ui; SCREEN_W as usize]; SCREEN_H as usize],
            display_on: false,
        }
    }
}

impl Surface {
    pub fn apply(&mut self, command: &Command) {
        match *command {
            Command::Tile(xy, tile) => {
                if let Some(slot) = self.tiles
                    .get_mut(xy.y as usize)
                    .and_then(|row| row.get_mut(xy.x as usize)) {
                    *slot = tile;
                } else {
                    debug_assert!(false, "tile write off screen: {:?}", xy);
                }
            },
            Command::Palette(xy, palette) => {
                if let Some(slot) = self.palettes
                    .get_mut(xy.y as usize)
                    .and_then(|row| row.get_mut(xy.x as usize)) {
                    *slot = palette;
                } else {
                    debug_assert!(false, "palette write off screen: {:?}", xy);
                }
            },
            Command::DisplayOn => self.display_on = true,
            Command::DisplayOff => self.display_on = false,
        }
    }

    pub fn apply_all<'commands>(
        &mut self,
        commands: impl IntoIterator<Item = &'commands Command>
    ) {
        for command in commands {
            self.apply(command);
        }
    }

    /// Off screen reads as blank.
    pub fn tile_at(&self, xy: ScreenXY) -> TileIndex {
        self.tiles
            .get(xy.y as usize)
            .and_then(|row| row.get(xy.x as usize))
            .copied()
            .unwrap_or(T_BLANK)
    }

    /// Off screen reads as the UI palette, like a freshly cleared screen.
    pub fn palette_at(&self, xy: ScreenXY) -> Palette {
        self.palettes
            .get(xy.y as usize)
            .and_then(|row| row.get(xy.x as usize))
            .copied()
            .unwrap_or(Palette::Ui)
    }

    pub fn is_display_on(&self) -> bool {
        self.display_on
    }

    /// Every screen position, row by row.
    pub fn all_xy() -> impl Iterator<Item = ScreenXY> {
        (0..SCREEN_H).flat_map(|y| (0..SCREEN_W).map(move |x| ScreenXY { x, y }))
    }
}

/// The screen position of the top left tile of `cell`.
pub fn cell_origin(cell: Cell) -> ScreenXY {
    ScreenXY {
        x: GRID_X + u8::from(cell.col) * CELL_W,
        y: GRID_Y + u8::from(cell.row) * CELL_H,
    }
}

fn xy(x: ScreenX, y: ScreenY) -> ScreenXY {
    ScreenXY { x, y }
}

fn set_tile(commands: &mut dyn ClearableStorage<Command>, xy: ScreenXY, tile: TileIndex) {
    commands.push(Command::Tile(xy, tile));
}

fn set_palette(commands: &mut dyn ClearableStorage<Command>, xy: ScreenXY, palette: Palette) {
    commands.push(Command::Palette(xy, palette));
}

fn fill_cell_palette(
    commands: &mut dyn ClearableStorage<Command>,
    cell: Cell,
    palette: Palette,
) {
    let origin = cell_origin(cell);
    for dy in 0..CELL_H {
        for dx in 0..CELL_W {
            set_palette(commands, origin + xy(dx, dy), palette);
        }
    }
}

/// The glyph for a single decimal digit. Anything past 9 is drawn blank.
pub fn digit_tile(digit: u8) -> TileIndex {
    match digit {
        0 => T_DIGIT_ZERO,
        1..=9 => T_NUM_START + digit - 1,
        _ => T_BLANK,
    }
}

pub fn draw_cell(commands: &mut dyn ClearableStorage<Command>, board: &Board, cell: Cell) {
    let value = board.value_at(cell);
    let origin = cell_origin(cell);

    fill_cell_palette(commands, cell, palette_for(value));

    if value == EMPTY {
        for dy in 0..CELL_H {
            for dx in 0..CELL_W {
                set_tile(commands, origin + xy(dx, dy), T_EMPTY_CELL);
            }
        }
        return;
    }

    set_tile(commands, origin + xy(0, 0), T_TILE_TL);
    set_tile(commands, origin + xy(1, 0), T_TILE_T);
    set_tile(commands, origin + xy(2, 0), T_TILE_TR);
    set_tile(commands, origin + xy(0, 1), T_TILE_L);
    set_tile(commands, origin + xy(2, 1), T_TILE_R);
    set_tile(commands, origin + xy(0, 2), T_TILE_BL);
    set_tile(commands, origin + xy(1, 2), T_TILE_B);
    set_tile(commands, origin + xy(2, 2), T_TILE_BR);

    if value <= 9 {
        set_tile(commands, origin + xy(1, 1), T_NUM_START + value - 1);
    } else {
        // Two digits don't fit in the centre tile, so they take over the
        // right edge as well.
        let pair_base = T_NUM10_L + (value - 10) * 2;
        set_tile(commands, origin + xy(1, 1), pair_base);
        set_tile(commands, origin + xy(2, 1), pair_base + 1);
    }
}

pub fn draw_board(commands: &mut dyn ClearableStorage<Command>, board: &Board) {
    for cell in Cell::all() {
        draw_cell(commands, board, cell);
    }
}

pub fn draw_border(commands: &mut dyn ClearableStorage<Command>) {
    let x1 = GRID_X - 1;
    let y1 = GRID_Y - 1;
    let x2 = GRID_X + GRID_W;
    let y2 = GRID_Y + GRID_H;

    for x in x1..=x2 {
        set_palette(commands, xy(x, y1), Palette::Ui);
        set_palette(commands, xy(x, y2), Palette::Ui);
    }
    for y in y1..=y2 {
        set_palette(commands, xy(x1, y), Palette::Ui);
        set_palette(commands, xy(x2, y), Palette::Ui);
    }

    set_tile(commands, xy(x1, y1), T_BORDER_TL);
    set_tile(commands, xy(x2, y1), T_BORDER_TR);
    set_tile(commands, xy(x1, y2), T_BORDER_BL);
    set_tile(commands, xy(x2, y2), T_BORDER_BR);

    for x in x1 + 1..x2 {
        set_tile(commands, xy(x, y1), T_BORDER_T);
        set_tile(commands, xy(x, y2), T_BORDER_B);
    }

    for y in y1 + 1..y2 {
        set_tile(commands, xy(x1, y), T_BORDER_L);
        set_tile(commands, xy(x2, y), T_BORDER_R);
    }
}

/// A number right-aligned in a 3 digit field, with leading blanks.
pub fn put_number(commands: &mut dyn ClearableStorage<Command>, at: ScreenXY, number: MoveCount) {
    let number = core::cmp::min(number, MOVE_COUNT_DISPLAY_MAX);
    let hundreds = (number / 100) as u8;
    let tens = ((number / 10) % 10) as u8;
    let ones = (number % 10) as u8;

    let (first, second) = if hundreds > 0 {
        (digit_tile(hundreds), digit_tile(tens))
    } else if tens > 0 {
        (T_BLANK, digit_tile(tens))
    } else {
        (T_BLANK, T_BLANK)
    };

    set_tile(commands, at, first);
    set_tile(commands, at + xy(1, 0), second);
    set_tile(commands, at + xy(2, 0), digit_tile(ones));
}

pub fn draw_hud(commands: &mut dyn ClearableStorage<Command>, move_count: MoveCount) {
    for x in GRID_X..GRID_X + HUD_W {
        set_palette(commands, xy(x, HUD_Y), Palette::Text);
    }

    // There's no font for a "MOVES" label, so just the number.
    put_number(commands, xy(MOVE_COUNT_X, HUD_Y), move_count);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorMode {
    Shown,
    Hidden,
}

/// The cursor is drawn by recolouring the four corner tiles of a cell.
/// Hiding it puts back the palette the cell's current value calls for.
pub fn draw_cursor(
    commands: &mut dyn ClearableStorage<Command>,
    board: &Board,
    cell: Cell,
    mode: CursorMode,
) {
    let origin = cell_origin(cell);

    let palette = match mode {
        CursorMode::Shown => Palette::CURSOR,
        CursorMode::Hidden => palette_for(board.value_at(cell)),
    };

    set_palette(commands, origin, palette);
    set_palette(commands, origin + xy(CELL_W - 1, 0), palette);
    set_palette(commands, origin + xy(0, CELL_H - 1), palette);
    set_palette(commands, origin + xy(CELL_W - 1, CELL_H - 1), palette);
}

/// One step of the win animation. Even steps paint the whole board in the
/// flash palette, odd steps put the normal palettes back.
pub fn draw_win_flash(commands: &mut dyn ClearableStorage<Command>, board: &Board, step: u8) {
    for cell in Cell::all() {
        let palette = if step & 1 == 1 {
            palette_for(board.value_at(cell))
        } else {
            Palette::WIN_FLASH
        };

        fill_cell_palette(commands, cell, palette);
    }
}

pub fn clear_screen(commands: &mut dyn ClearableStorage<Command>, palette: Palette) {
    for at in Surface::all_xy() {
        set_tile(commands, at, T_BLANK);
        set_palette(commands, at, palette);
    }
}

pub fn draw_title(commands: &mut dyn ClearableStorage<Command>) {
    clear_screen(commands, Palette::Text);

    // "15"
    set_tile(commands, xy(7, 5), digit_tile(1));
    set_tile(commands, xy(9, 5), digit_tile(5));

    // A little 2x2 puzzle: 1, 2, 3 and a gap.
    set_tile(commands, xy(7, 7), T_TILE_TL);
    set_tile(commands, xy(8, 7), T_TILE_T);
    set_tile(commands, xy(9, 7), T_TILE_T);
    set_tile(commands, xy(10, 7), T_TILE_TR);

    set_tile(commands, xy(7, 8), T_TILE_L);
    set_tile(commands, xy(8, 8), digit_tile(1));
    set_tile(commands, xy(9, 8), digit_tile(2));
    set_tile(commands, xy(10, 8), T_TILE_R);

    set_tile(commands, xy(7, 9), T_TILE_L);
    set_tile(commands, xy(8, 9), digit_tile(3));
    set_tile(commands, xy(9, 9), T_EMPTY_CELL);
    set_tile(commands, xy(10, 9), T_TILE_R);

    set_tile(commands, xy(7, 10), T_TILE_BL);
    set_tile(commands, xy(8, 10), T_TILE_B);
    set_tile(commands, xy(9, 10), T_TILE_B);
    set_tile(commands, xy(10, 10), T_TILE_BR);

    set_palette(commands, xy(8, 8), palette_for(1));
    set_palette(commands, xy(9, 8), palette_for(5));
    set_palette(commands, xy(8, 9), palette_for(9));
    set_palette(commands, xy(9, 9), palette_for(EMPTY));
}
