#![deny(unused)]

use game::{
    draw::{TileIndex, PALETTES},
    Palette,
};

struct Storage<A>(Vec<A>);

impl <A> game::ClearableStorage<A> for Storage<A> {
    fn clear(&mut self) {
        self.0.clear();
    }

    fn push(&mut self, a: A) {
        self.0.push(a);
    }
}

/// Every tile is two characters wide so that cells come out roughly square
/// on a terminal.
fn tile_text(tile: TileIndex) -> &'static str {
    use game::draw::*;

    const DIGITS: [&str; 9] = ["1 ", "2 ", "3 ", "4 ", "5 ", "6 ", "7 ", "8 ", "9 "];
    // Tens half then ones half, for 10 to 15. The ones half of 10 is also
    // the plain 0 digit.
    const PAIRS: [&str; 12] = [
        " 1", "0 ",
        " 1", "1 ",
        " 1", "2 ",
        " 1", "3 ",
        " 1", "4 ",
        " 1", "5 ",
    ];

    match tile {
        T_BLANK | T_CELL_BG | T_EMPTY_CELL => "  ",
        T_BORDER_TL | T_TILE_TL => "┌─",
        T_BORDER_T | T_TILE_T | T_BORDER_B | T_TILE_B => "──",
        T_BORDER_TR | T_TILE_TR => "─┐",
        T_BORDER_L | T_TILE_L => "│ ",
        T_BORDER_R | T_TILE_R => " │",
        T_BORDER_BL | T_TILE_BL => "└─",
        T_BORDER_BR | T_TILE_BR => "─┘",
        _ if tile >= T_NUM_START && tile < T_NUM10_L => {
            DIGITS[usize::from(tile - T_NUM_START)]
        },
        _ if tile >= T_NUM10_L && tile < T_EMPTY_CELL => {
            PAIRS[usize::from(tile - T_NUM10_L)]
        },
        _ => {
            log::warn!("no glyph for tile {}", tile);
            "??"
        },
    }
}

/// Foreground and background for a palette, as 8 bit RGB.
fn palette_rgb(palette: Palette) -> ([u8; 3], [u8; 3]) {
    let colours = PALETTES[palette.index()];

    (colours[1].to_rgb888(), colours[0].to_rgb888())
}

fn init_logging() {
    // Anything chattier than warnings would draw over the terminal front end.
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn")
    ).init();
}

#[cfg(not(any(feature = "platform-terminal", feature = "platform-macroquad")))]
core::compile_error!("You must specify one of \"platform-terminal\" or \"platform-macroquad\"");

#[cfg(all(feature = "platform-terminal", feature = "platform-macroquad"))]
core::compile_error!("You must specify only one of \"platform-terminal\" or \"platform-macroquad\". Try --no-default-features");

#[cfg(feature = "platform-terminal")]
mod terminal_platform;

#[cfg(feature = "platform-terminal")]
fn main() {
    init_logging();

    if let Err(e) = terminal_platform::inner_main() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

/// If we do the obvious thing,
/// ```rust
/// #[cfg(feature = "platform-macroquad")]
/// #[macroquad::main("Fifteen")]
/// async fn main() {
///     //...
/// }
/// ```
/// then we get an error saying "custom attribute panicked".
#[cfg(feature = "platform-macroquad")]
macro_rules! macroquad_wrapper_macro {
    () => {
        #[macroquad::main("Fifteen")]
        async fn main() {
            init_logging();

            macroquad_platform::inner_main().await;
        }
    }
}

#[cfg(feature = "platform-macroquad")]
macroquad_wrapper_macro!();

#[cfg(feature = "platform-macroquad")]
mod macroquad_platform;
