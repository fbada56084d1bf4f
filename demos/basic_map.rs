use macroquad::prelude::*;
use macroquad_tmx::TiledMap;

const SCROLL_SPEED: f32 = 120.0;

fn window_conf() -> Conf {
    Conf {
        window_title: "Basic Map".into(),
        window_width: 960,
        window_height: 720,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let map = TiledMap::load("assets/map.tmx").expect("Failed to load map");
    let mut scroll = Vec2::ZERO;

    loop {
        clear_background(BLACK);

        let view = vec2(screen_width(), screen_height());
        let dt = get_frame_time();
        if is_key_down(KeyCode::Right) {
            scroll.x += SCROLL_SPEED * dt;
        }
        if is_key_down(KeyCode::Left) {
            scroll.x -= SCROLL_SPEED * dt;
        }
        if is_key_down(KeyCode::Down) {
            scroll.y += SCROLL_SPEED * dt;
        }
        if is_key_down(KeyCode::Up) {
            scroll.y -= SCROLL_SPEED * dt;
        }
        let max = vec2(map.width() as f32, map.height() as f32) - view;
        scroll = scroll.clamp(Vec2::ZERO, max.max(Vec2::ZERO));

        map.draw(0.0, 0.0, scroll.x, scroll.y, view.x, view.y);

        // hovered tile, in map pixels
        let (mx, my) = mouse_position();
        let px = (scroll.x + mx) as i32;
        let py = (scroll.y + my) as i32;
        let terrain = map.property_or(px, py, "terrain", "-").unwrap_or("off map");
        let solid = map.property_bool(px, py, "solid", false).unwrap_or(false);

        draw_text(
            &format!("({px}, {py}) terrain: {terrain} solid: {solid}"),
            20.0,
            30.0,
            28.0,
            WHITE,
        );
        draw_text(
            &format!("FPS: {}", get_fps()),
            screen_width() - 135.0,
            30.0,
            28.0,
            RED,
        );

        next_frame().await;
    }
}
