use anyhow::{Context, Result};

use pixelet::logging::{init_logging, LoggingConfig};
use pixelet::{Color, Key, Quad, Rect, Shape, Triangle, Window};

const STEP: f32 = 4.0;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());
    log::info!("pixelet-demo {}", pixelet::VERSION);

    let mut window = Window::open(100.0, 100.0, 800.0, 600.0, "pixelet demo")
        .context("failed to open the demo window")?;
    window.set_background(Color::rgb(24.0, 24.0, 32.0));
    window.set_size_limits(320.0, 240.0, -1.0, -1.0);

    window.on_key_press(|key| log::debug!("key pressed: {key}"));

    let mut triangle: Triangle = Triangle::with_points((400.0, 80.0), (300.0, 260.0), (500.0, 260.0));
    triangle.set_fill(Color::rgb(240.0, 96.0, 64.0));

    let mut rect: Rect = Rect::new();
    rect.set_position(80.0, 340.0);
    rect.set_size(200.0, 120.0);
    rect.set_fill(Color::rgba(64.0, 160.0, 240.0, 200.0));

    let mut quad: Quad = Quad::with_corners((520.0, 330.0), (720.0, 360.0), (690.0, 520.0), (540.0, 480.0));
    quad.set_fill(Color::rgb(120.0, 220.0, 120.0));

    let mut origin = (80.0, 340.0);

    while window.poll_and_swap() {
        let frame = window.input_frame();
        if frame.key_pressed(Key::Escape) {
            window.close();
            break;
        }

        let input = window.input();
        let (dx, dy) = (
            axis(input.key_down(Key::ArrowLeft), input.key_down(Key::ArrowRight)),
            axis(input.key_down(Key::ArrowUp), input.key_down(Key::ArrowDown)),
        );
        if dx != 0.0 || dy != 0.0 {
            origin = (origin.0 + dx * STEP, origin.1 + dy * STEP);
            rect.set_position(origin.0, origin.1);
        }

        if let Some(fps) = window.frame_time().and_then(|t| t.fps) {
            log::info!("fps: {fps}");
        }

        window.render(|canvas| {
            triangle.draw(canvas)?;
            rect.draw(canvas)?;
            quad.draw(canvas)?;

            // Immediate mode: a status strip and a marker over the rect.
            let width = canvas.viewport().width;
            canvas.fill(Color::rgba(255.0, 255.0, 255.0, 48.0));
            canvas.rect(0.0, 0.0, width, 20.0)?;
            canvas.fill(Color::rgb(255.0, 220.0, 0.0));
            canvas.triangle(
                (origin.0 + 100.0, origin.1 - 24.0),
                (origin.0 + 88.0, origin.1 - 8.0),
                (origin.0 + 112.0, origin.1 - 8.0),
            )?;
            Ok(())
        })?;
    }

    log::info!("bye");
    Ok(())
}

fn axis(negative: bool, positive: bool) -> f32 {
    match (negative, positive) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    }
}
