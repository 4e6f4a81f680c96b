use super::{palette_rgb, tile_text, Storage};

use game::{
    draw::{self, ScreenXY, TileIndex, SCREEN_H, SCREEN_W},
    InputFlags,
    Surface,
    INPUT_CONFIRM,
    INPUT_DOWN,
    INPUT_LEFT,
    INPUT_QUICK_SLIDE,
    INPUT_RIGHT,
    INPUT_START,
    INPUT_UP,
};

use macroquad::prelude::{
    clear_background,
    draw_line,
    draw_rectangle,
    draw_text,
    is_key_down,
    next_frame,
    screen_height,
    screen_width,
    Color,
    KeyCode,
    BLACK,
};

fn input_flags() -> InputFlags {
    let bindings: [(InputFlags, &[KeyCode]); 7] = [
        (INPUT_UP, &[KeyCode::Up, KeyCode::W]),
        (INPUT_DOWN, &[KeyCode::Down, KeyCode::S]),
        (INPUT_LEFT, &[KeyCode::Left, KeyCode::A]),
        (INPUT_RIGHT, &[KeyCode::Right, KeyCode::D]),
        (INPUT_CONFIRM, &[KeyCode::Space, KeyCode::Z]),
        (INPUT_QUICK_SLIDE, &[KeyCode::Tab, KeyCode::X]),
        (INPUT_START, &[KeyCode::Enter]),
    ];

    let mut input_flags = 0;
    for (flag, keys) in bindings.iter() {
        if keys.iter().any(|&key| is_key_down(key)) {
            input_flags |= flag;
        }
    }

    input_flags
}

fn colour([r, g, b]: [u8; 3]) -> Color {
    Color::from_rgba(r, g, b, 255)
}

struct Edges {
    top: bool,
    bottom: bool,
    left: bool,
    right: bool,
}

/// The sides of a tile that get an outline. Most fonts macroquad can load
/// lack box drawing characters, so the frame pieces are drawn as lines.
fn edges(tile: TileIndex) -> Edges {
    use draw::*;

    let (top, bottom, left, right) = match tile {
        T_BORDER_TL | T_TILE_TL => (true, false, true, false),
        T_BORDER_T | T_TILE_T => (true, false, false, false),
        T_BORDER_TR | T_TILE_TR => (true, false, false, true),
        T_BORDER_L | T_TILE_L => (false, false, true, false),
        T_BORDER_R | T_TILE_R => (false, false, false, true),
        T_BORDER_BL | T_TILE_BL => (false, true, true, false),
        T_BORDER_B | T_TILE_B => (false, true, false, false),
        T_BORDER_BR | T_TILE_BR => (false, true, false, true),
        _ => (false, false, false, false),
    };

    Edges { top, bottom, left, right }
}

fn draw_tile(surface: &Surface, at: ScreenXY, side: f32) {
    let tile = surface.tile_at(at);
    let (fg, bg) = palette_rgb(surface.palette_at(at));
    let fg = colour(fg);

    let x = f32::from(at.x) * side;
    let y = f32::from(at.y) * side;

    draw_rectangle(x, y, side, side, colour(bg));

    let thickness = (side / 8.).max(1.);
    let Edges { top, bottom, left, right } = edges(tile);
    if top {
        draw_line(x, y, x + side, y, thickness, fg);
    }
    if bottom {
        draw_line(x, y + side, x + side, y + side, thickness, fg);
    }
    if left {
        draw_line(x, y, x, y + side, thickness, fg);
    }
    if right {
        draw_line(x + side, y, x + side, y + side, thickness, fg);
    }

    let text = tile_text(tile).trim();
    if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        draw_text(text, x + side * 0.25, y + side * 0.8, side, fg);
    }
}

pub async fn inner_main() {
    let mut state = game::State::default();
    let mut commands = Storage(Vec::with_capacity(1024));
    let mut surface = Surface::default();

    loop {
        if is_key_down(KeyCode::Escape) {
            break;
        }

        game::update(&mut state, &mut commands, input_flags());

        surface.apply_all(commands.0.iter());

        clear_background(BLACK);

        if surface.is_display_on() {
            let side = (screen_width() / f32::from(SCREEN_W))
                .min(screen_height() / f32::from(SCREEN_H))
                .floor();

            for at in Surface::all_xy() {
                draw_tile(&surface, at, side);
            }
        }

        next_frame().await
    }

    log::info!("quit after {} moves", state.session().move_count());
}
