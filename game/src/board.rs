use crate::{
    checked::{AddOne, SubOne},
    xs_u8,
    Xs,
};

// An amount of cells, which are usually arranged in a line.
pub type Count = u8;

/// 0 is the empty cell, 1 through 15 are the numbered tiles.
pub type TileValue = u8;

pub const EMPTY: TileValue = 0;

pub const CELL_COUNT: Count = Coord::COUNT * Coord::COUNT;

/// A row or column index on the 4x4 grid. Being an enum, a `Coord` can't be
/// out of bounds, so nothing downstream needs to check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Coord {
    Zero,
    One,
    Two,
    Three,
}

impl Coord {
    pub const COUNT: Count = 4;

    pub const ALL: [Coord; Self::COUNT as usize] = [
        Coord::Zero,
        Coord::One,
        Coord::Two,
        Coord::Three,
    ];

    pub const ZERO: Coord = Coord::Zero;
    pub const MAX: Coord = Coord::Three;

    #[allow(unused)] // desired in tests
    pub fn from_rng(rng: &mut Xs) -> Self {
        Self::ALL[crate::xs_u32(rng, 0, Self::ALL.len() as u32) as usize]
    }
}

impl Default for Coord {
    fn default() -> Self {
        Self::Zero
    }
}

impl From<Coord> for u8 {
    fn from(coord: Coord) -> u8 {
        coord as u8
    }
}

impl From<Coord> for usize {
    fn from(coord: Coord) -> Self {
        Self::from(u8::from(coord))
    }
}

impl core::convert::TryFrom<u8> for Coord {
    type Error = ();

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Self::ALL.get(byte as usize).copied().ok_or(())
    }
}

impl AddOne for Coord {
    fn checked_add_one(&self) -> Option<Self> {
        use core::convert::TryFrom;
        Self::try_from(u8::from(*self) + 1).ok()
    }
}

impl SubOne for Coord {
    fn checked_sub_one(&self) -> Option<Self> {
        use core::convert::TryFrom;
        u8::from(*self)
            .checked_sub(1)
            .and_then(|byte| Self::try_from(byte).ok())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: Coord,
    pub col: Coord,
}

impl Cell {
    pub const ZERO: Cell = Cell { row: Coord::ZERO, col: Coord::ZERO };
    pub const MAX: Cell = Cell { row: Coord::MAX, col: Coord::MAX };

    /// Row-major, which is also the order the tiles are numbered in.
    pub fn all() -> impl Iterator<Item = Cell> {
        Coord::ALL.iter()
            .flat_map(|&row|
                Coord::ALL.iter()
                    .map(move |&col| Cell { row, col })
            )
    }

    pub fn index(self) -> usize {
        usize::from(self.row) * Coord::COUNT as usize + usize::from(self.col)
    }

    #[allow(unused)] // desired in tests
    pub fn from_rng(rng: &mut Xs) -> Self {
        Self {
            row: Coord::from_rng(rng),
            col: Coord::from_rng(rng),
        }
    }

    pub fn is_adjacent_to(self, other: Cell) -> bool {
        manhattan_distance(self, other) == 1
    }

    pub fn step(self, dir: Dir) -> Option<Cell> {
        use Dir::*;
        match dir {
            Up => self.row.checked_sub_one().map(|row| Cell { row, ..self }),
            Down => self.row.checked_add_one().map(|row| Cell { row, ..self }),
            Left => self.col.checked_sub_one().map(|col| Cell { col, ..self }),
            Right => self.col.checked_add_one().map(|col| Cell { col, ..self }),
        }
    }
}

pub fn manhattan_distance(a: Cell, b: Cell) -> Count {
    let a_row = u8::from(a.row);
    let a_col = u8::from(a.col);
    let b_row = u8::from(b.row);
    let b_col = u8::from(b.col);

    (if a_row > b_row { a_row - b_row } else { b_row - a_row })
    + (if a_col > b_col { a_col - b_col } else { b_col - a_col })
}

/// A direction the empty cell travels in. That is, `Up` pulls the tile above
/// the empty cell down into it.
///
/// The discriminants are the 2-bit codes the shuffle draws. Opposite
/// directions are paired so that their codes XOR to 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Dir {
    Up = 0b00,
    Down = 0b01,
    Left = 0b10,
    Right = 0b11,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    /// Only the low two bits are used.
    pub fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 0b11) as usize]
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn opposite(self) -> Self {
        Self::from_bits(self.code() ^ 1)
    }

    pub fn reverses(self, previous: Dir) -> bool {
        self.code() ^ previous.code() == 1
    }
}

/// The two cells whose contents changed after a slide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellsChanged {
    /// Where the empty cell was. It now holds the slid tile.
    pub old_empty: Cell,
    /// Where the slid tile was. It is now empty.
    pub new_empty: Cell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved(CellsChanged),
    NoOp,
}

impl MoveOutcome {
    pub fn moved(self) -> Option<CellsChanged> {
        match self {
            MoveOutcome::Moved(changed) => Some(changed),
            MoveOutcome::NoOp => None,
        }
    }
}

type Values = [[TileValue; Coord::COUNT as usize]; Coord::COUNT as usize];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    values: Values,
    // Denormalized from `values`. Every method that moves the 0 updates this
    // before returning.
    empty: Cell,
}

impl Default for Board {
    fn default() -> Self {
        Self::solved()
    }
}

impl Board {
    pub fn solved() -> Self {
        let mut board = Self {
            values: [[EMPTY; Coord::COUNT as usize]; Coord::COUNT as usize],
            empty: Cell::MAX,
        };
        board.reset();
        board
    }

    /// Tiles numbered 1 to 15 left-to-right, top-to-bottom, with the empty cell
    /// in the bottom right.
    pub fn reset(&mut self) {
        for cell in Cell::all() {
            let value = if cell == Cell::MAX {
                EMPTY
            } else {
                cell.index() as TileValue + 1
            };
            self.values[usize::from(cell.row)][usize::from(cell.col)] = value;
        }
        self.empty = Cell::MAX;
    }

    pub fn value_at(&self, cell: Cell) -> TileValue {
        self.values[usize::from(cell.row)][usize::from(cell.col)]
    }

    /// Raw write. Callers are responsible for keeping `empty` in sync, which
    /// is why this is not public.
    pub(crate) fn set_value(&mut self, cell: Cell, value: TileValue) {
        debug_assert!(value < CELL_COUNT, "{}", value);
        self.values[usize::from(cell.row)][usize::from(cell.col)] = value;
    }

    pub fn empty(&self) -> Cell {
        self.empty
    }

    /// Builds a board from row-major values. Returns `None` unless the values
    /// are a permutation of 0 to 15.
    pub fn from_values(values: Values) -> Option<Self> {
        let empty = Cell::all().find(|cell| {
            values[usize::from(cell.row)][usize::from(cell.col)] == EMPTY
        })?;

        let board = Self { values, empty };

        if board.is_valid() {
            Some(board)
        } else {
            None
        }
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    /// Each of 0 through 15 appears exactly once, and `empty` points at the 0.
    pub fn is_valid(&self) -> bool {
        let mut seen = [false; CELL_COUNT as usize];

        for cell in Cell::all() {
            let value = self.value_at(cell);
            match seen.get_mut(value as usize) {
                Some(seen_already) if !*seen_already => {
                    *seen_already = true;
                },
                _ => return false,
            }
        }

        self.value_at(self.empty) == EMPTY
    }

    /// Values 1 to 15 in row-major order, followed by the empty cell.
    pub fn is_solved(&self) -> bool {
        let mut expected: TileValue = 1;
        for cell in Cell::all() {
            let value = self.value_at(cell);
            if cell == Cell::MAX {
                if value != EMPTY {
                    return false;
                }
            } else {
                if value != expected {
                    return false;
                }
                expected += 1;
            }
        }

        true
    }

    /// Slides the tile at `from` into the empty cell, if they are orthogonal
    /// neighbours. Anything else, including `from` being the empty cell
    /// itself, is a `NoOp`.
    pub fn try_slide(&mut self, from: Cell) -> MoveOutcome {
        if !from.is_adjacent_to(self.empty) {
            return MoveOutcome::NoOp;
        }

        let old_empty = self.empty;

        self.set_value(old_empty, self.value_at(from));
        self.set_value(from, EMPTY);
        self.empty = from;

        debug_assert!(self.is_valid(), "{:?}", self);

        MoveOutcome::Moved(CellsChanged {
            old_empty,
            new_empty: from,
        })
    }

    /// Moves the empty cell one step in `dir`, if it stays on the board.
    pub fn move_empty(&mut self, dir: Dir) -> MoveOutcome {
        match self.empty.step(dir) {
            Some(from) => self.try_slide(from),
            None => MoveOutcome::NoOp,
        }
    }
}

/// How many directions the shuffle draws. Draws that would leave the board or
/// undo the previous step are skipped but still count towards this.
pub const SHUFFLE_ATTEMPTS: u8 = 200;

/// Scrambles `board` by walking the empty cell around at random, which keeps
/// the result reachable from wherever the board started. Returns the
/// directions that were actually applied, in order.
pub fn shuffle(board: &mut Board, rng: &mut Xs) -> Vec<Dir> {
    let mut applied = Vec::with_capacity(SHUFFLE_ATTEMPTS as usize);
    let mut last_dir: Option<Dir> = None;

    for _ in 0..SHUFFLE_ATTEMPTS {
        let dir = Dir::from_bits(xs_u8(rng));

        if let Some(last) = last_dir {
            if dir.reverses(last) {
                continue;
            }
        }

        if let MoveOutcome::Moved(_) = board.move_empty(dir) {
            applied.push(dir);
            last_dir = Some(dir);
        }
    }

    log::debug!(
        "shuffle applied {} of {} draws, empty cell ended at {:?}",
        applied.len(),
        SHUFFLE_ATTEMPTS,
        board.empty()
    );

    applied
}
