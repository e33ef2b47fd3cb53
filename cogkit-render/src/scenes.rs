use crate::render::{
    ACCENT, CORRECT, FOREGROUND, INCORRECT, MUTED, SceneRenderer, SkiaRenderer,
};
use anyhow::Result;
use cogkit_core::{Point, SessionState};
use cogkit_tasks::clock::Hand;
use cogkit_tasks::maze::CellState;
use cogkit_tasks::nback::Feedback;
use cogkit_tasks::{ClockScene, MazeScene, NBackScene, TrailScene};

const WALL: [u8; 4] = [30, 30, 40, 255];
const FLOOR: [u8; 4] = [235, 235, 235, 255];

fn xy(p: Point) -> (f32, f32) {
    (p.x as f32, p.y as f32)
}

impl SceneRenderer<MazeScene> for SkiaRenderer {
    fn render_scene(&mut self, scene: &MazeScene) -> Result<()> {
        let cell = scene.cell_size as f32;
        for (y, row) in scene.grid.rows().enumerate() {
            for (x, state) in row.iter().enumerate() {
                let color = match state {
                    CellState::Wall => WALL,
                    CellState::Path => FLOOR,
                };
                self.fill_rect(x as f32 * cell, y as f32 * cell, cell, cell, color);
            }
        }

        let exit_color = if scene.state == SessionState::Completed {
            ACCENT
        } else {
            CORRECT
        };
        self.fill_rect(
            scene.exit.x as f32 * cell,
            scene.exit.y as f32 * cell,
            cell,
            cell,
            exit_color,
        );

        let half = cell / 2.0;
        self.fill_circle(
            scene.player.x as f32 * cell + half,
            scene.player.y as f32 * cell + half,
            half * 0.7,
            ACCENT,
        );

        if !scene.state.is_idle() {
            let h = (cell * 0.6).max(8.0);
            let w = self.width() as f32;
            self.draw_number(scene.elapsed_secs, (w - h * 2.0, h), h, INCORRECT);
        }
        Ok(())
    }
}

impl SceneRenderer<NBackScene> for SkiaRenderer {
    fn render_scene(&mut self, scene: &NBackScene) -> Result<()> {
        let (w, h) = (self.width() as f32, self.height() as f32);

        if let Some(feedback) = scene.feedback {
            let color = match feedback {
                Feedback::Correct => CORRECT,
                Feedback::Incorrect => INCORRECT,
            };
            self.fill_rect(0.0, 0.0, w, 6.0, color);
            self.fill_rect(0.0, h - 6.0, w, 6.0, color);
            self.fill_rect(0.0, 0.0, 6.0, h, color);
            self.fill_rect(w - 6.0, 0.0, 6.0, h, color);
        }

        if let Some(symbol) = scene.symbol {
            self.blit_symbol(symbol, self.center());
        }

        // Progress bar along the bottom.
        if scene.length > 0 {
            let shown = scene.index.map_or(0, |i| i + 1);
            let frac = match scene.state {
                SessionState::Completed => 1.0,
                _ => shown as f32 / scene.length as f32,
            };
            self.fill_rect(20.0, h - 24.0, w - 40.0, 6.0, MUTED);
            self.fill_rect(20.0, h - 24.0, (w - 40.0) * frac, 6.0, FOREGROUND);
        }

        self.draw_number(scene.n as u64, (30.0, 30.0), 24.0, MUTED);
        Ok(())
    }
}

impl SceneRenderer<ClockScene> for SkiaRenderer {
    fn render_scene(&mut self, scene: &ClockScene) -> Result<()> {
        let (cx, cy) = xy(scene.center);
        let radius = scene.size as f32 / 2.0 - 10.0;
        let dial = if scene.submitted { ACCENT } else { FOREGROUND };

        self.stroke_circle(cx, cy, radius, 3.0, dial);
        for mark in 0..12 {
            let a = (mark as f32 * 30.0).to_radians();
            let (s, c) = a.sin_cos();
            let inner = if mark % 3 == 0 { 0.82 } else { 0.9 };
            self.line(
                (cx + s * radius * inner, cy - c * radius * inner),
                (cx + s * radius, cy - c * radius),
                if mark % 3 == 0 { 4.0 } else { 2.0 },
                dial,
            );
        }

        let hands = [
            (Hand::Hour, scene.hour_angle, scene.hour_length, 8.0),
            (Hand::Minute, scene.minute_angle, scene.minute_length, 4.0),
        ];
        for (hand, angle, length, width) in hands {
            let (s, c) = (angle as f32).to_radians().sin_cos();
            let tip = (cx + s * length as f32, cy - c * length as f32);
            let color = if scene.captured == Some(hand) {
                ACCENT
            } else {
                FOREGROUND
            };
            self.line((cx, cy), tip, width, color);
        }
        self.fill_circle(cx, cy, 6.0, INCORRECT);
        Ok(())
    }
}

impl SceneRenderer<TrailScene> for SkiaRenderer {
    fn render_scene(&mut self, scene: &TrailScene) -> Result<()> {
        for line in &scene.lines {
            let color = if line.is_error { INCORRECT } else { MUTED };
            self.line(xy(line.start), xy(line.end), 4.0, color);
        }
        if let Some((from, to)) = scene.drag {
            self.line(xy(from), xy(to), 3.0, ACCENT);
        }

        let r = scene.dot_radius as f32;
        for dot in &scene.dots.dots {
            let (x, y) = xy(dot.position);
            let fill = if dot.id < scene.current_index
                || (dot.id == scene.current_index && !scene.state.is_idle())
            {
                CORRECT
            } else if dot.id == scene.current_index {
                ACCENT
            } else {
                FOREGROUND
            };
            self.fill_circle(x, y, r, fill);
            self.draw_number(dot.id as u64, (x, y), r * 0.9, [0, 0, 0, 255]);
        }
        Ok(())
    }
}
