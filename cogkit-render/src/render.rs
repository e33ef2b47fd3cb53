use anyhow::{Result, anyhow};
use cogkit_tasks::nback::Symbol;
use cogkit_timing::{HighPrecisionTimer, Timer};
use std::time::Duration;
use tiny_skia::{
    Color, FillRule, LineCap, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, Transform,
};

pub const BACKGROUND: [u8; 4] = [0, 0, 0, 255];
pub const FOREGROUND: [u8; 4] = [255, 255, 255, 255];
pub const CORRECT: [u8; 4] = [40, 200, 80, 255];
pub const INCORRECT: [u8; 4] = [220, 50, 50, 255];
pub const ACCENT: [u8; 4] = [60, 120, 255, 255];
pub const MUTED: [u8; 4] = [90, 90, 90, 255];

const SYMBOL_SIZE: f32 = 120.0;

#[derive(Debug)]
pub struct FrameStats {
    pub clear: Duration,
    pub draw: Duration,
    pub copy: Duration,
    pub total: Duration,
}

/// Draws one scene snapshot onto the renderer's canvas.
pub trait SceneRenderer<S> {
    fn render_scene(&mut self, scene: &S) -> Result<()>;
}

pub struct SkiaRenderer {
    width: u32,
    height: u32,
    center: (f32, f32),
    pub(crate) canvas: Pixmap,
    /// Pre-rendered n-back symbols, indexed like `Symbol::ALPHABET`.
    symbol_cache: Vec<Pixmap>,
}

pub(crate) fn paint(color: [u8; 4]) -> Paint<'static> {
    let mut p = Paint::default();
    p.set_color(Color::from_rgba8(color[0], color[1], color[2], color[3]));
    p.anti_alias = true;
    p
}

pub(crate) fn symbol_index(symbol: Symbol) -> usize {
    match symbol {
        Symbol::Circle => 0,
        Symbol::Square => 1,
        Symbol::Triangle => 2,
    }
}

impl SkiaRenderer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let canvas = Pixmap::new(width, height)
            .ok_or_else(|| anyhow!("cannot allocate {width}x{height} canvas"))?;
        let mut renderer = SkiaRenderer {
            width,
            height,
            center: (width as f32 / 2.0, height as f32 / 2.0),
            canvas,
            symbol_cache: Vec::with_capacity(Symbol::ALPHABET.len()),
        };
        renderer.cache_symbols()?;
        Ok(renderer)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn center(&self) -> (f32, f32) {
        self.center
    }

    pub fn canvas(&self) -> &Pixmap {
        &self.canvas
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) -> Result<()> {
        self.canvas = Pixmap::new(new_width, new_height)
            .ok_or_else(|| anyhow!("cannot allocate {new_width}x{new_height} canvas"))?;
        self.width = new_width;
        self.height = new_height;
        self.center = (new_width as f32 / 2.0, new_height as f32 / 2.0);
        Ok(())
    }

    fn cache_symbols(&mut self) -> Result<()> {
        for symbol in Symbol::ALPHABET {
            let pixmap = Self::render_symbol_to_pixmap(symbol)?;
            self.symbol_cache.push(pixmap);
        }
        Ok(())
    }

    fn render_symbol_to_pixmap(symbol: Symbol) -> Result<Pixmap> {
        let size = SYMBOL_SIZE.ceil() as u32;
        let mut pixmap = Pixmap::new(size, size).ok_or_else(|| anyhow!("symbol pixmap"))?;
        let s = SYMBOL_SIZE;
        let inset = s * 0.1;
        let p = paint(FOREGROUND);

        match symbol {
            Symbol::Circle => {
                let path = PathBuilder::from_circle(s / 2.0, s / 2.0, s / 2.0 - inset)
                    .ok_or_else(|| anyhow!("circle path"))?;
                pixmap.fill_path(&path, &p, FillRule::Winding, Transform::identity(), None);
            }
            Symbol::Square => {
                let rect = Rect::from_xywh(inset, inset, s - 2.0 * inset, s - 2.0 * inset)
                    .ok_or_else(|| anyhow!("square rect"))?;
                pixmap.fill_rect(rect, &p, Transform::identity(), None);
            }
            Symbol::Triangle => {
                let mut pb = PathBuilder::new();
                pb.move_to(s / 2.0, inset);
                pb.line_to(s - inset, s - inset);
                pb.line_to(inset, s - inset);
                pb.close();
                let path = pb.finish().ok_or_else(|| anyhow!("triangle path"))?;
                pixmap.fill_path(&path, &p, FillRule::Winding, Transform::identity(), None);
            }
        }
        Ok(pixmap)
    }

    /// Blit a cached symbol centred on `pos`.
    pub(crate) fn blit_symbol(&mut self, symbol: Symbol, pos: (f32, f32)) {
        let pm = &self.symbol_cache[symbol_index(symbol)];
        let x = (pos.0 - pm.width() as f32 * 0.5).round() as i32;
        let y = (pos.1 - pm.height() as f32 * 0.5).round() as i32;
        self.canvas.draw_pixmap(
            x,
            y,
            pm.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    pub(crate) fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: [u8; 4]) {
        if let Some(rect) = Rect::from_xywh(x, y, w, h) {
            let mut p = paint(color);
            p.anti_alias = false;
            self.canvas.fill_rect(rect, &p, Transform::identity(), None);
        }
    }

    pub(crate) fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: [u8; 4]) {
        if let Some(path) = PathBuilder::from_circle(cx, cy, r) {
            self.canvas
                .fill_path(&path, &paint(color), FillRule::Winding, Transform::identity(), None);
        }
    }

    pub(crate) fn stroke_circle(&mut self, cx: f32, cy: f32, r: f32, width: f32, color: [u8; 4]) {
        if let Some(path) = PathBuilder::from_circle(cx, cy, r) {
            let stroke = Stroke {
                width,
                ..Stroke::default()
            };
            self.canvas
                .stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
        }
    }

    pub(crate) fn line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: [u8; 4]) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.0, from.1);
        pb.line_to(to.0, to.1);
        if let Some(path) = pb.finish() {
            let stroke = Stroke {
                width,
                line_cap: LineCap::Round,
                ..Stroke::default()
            };
            self.canvas
                .stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
        }
    }

    /// Clear, draw `scene`, copy the canvas into the RGBA `frame_buffer`.
    pub fn render_frame<S>(
        &mut self,
        scene: &S,
        frame_buffer: &mut [u8],
        timer: &mut HighPrecisionTimer,
    ) -> Result<FrameStats>
    where
        Self: SceneRenderer<S>,
    {
        let t_clear = {
            let t = timer.now();
            self.canvas.fill(Color::from_rgba8(
                BACKGROUND[0],
                BACKGROUND[1],
                BACKGROUND[2],
                BACKGROUND[3],
            ));
            timer.elapsed(t)
        };

        let t_draw = {
            let t = timer.now();
            self.render_scene(scene)?;
            timer.elapsed(t)
        };

        let t_copy = {
            let t = timer.now();
            let data = self.canvas.data();
            if frame_buffer.len() != data.len() {
                return Err(anyhow!(
                    "frame buffer holds {} bytes, canvas {}",
                    frame_buffer.len(),
                    data.len()
                ));
            }
            frame_buffer.copy_from_slice(data);
            timer.elapsed(t)
        };

        let total = t_clear + t_draw + t_copy;
        timer.record_frame(total);
        Ok(FrameStats {
            clear: t_clear,
            draw: t_draw,
            copy: t_copy,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_are_cached_once_each() {
        let r = SkiaRenderer::new(200, 200).unwrap();
        assert_eq!(r.symbol_cache.len(), 3);
        for pm in &r.symbol_cache {
            assert_eq!(pm.width(), SYMBOL_SIZE as u32);
        }
    }

    #[test]
    fn zero_sized_canvas_is_an_error() {
        assert!(SkiaRenderer::new(0, 10).is_err());
    }

    #[test]
    fn resize_recenters() {
        let mut r = SkiaRenderer::new(100, 100).unwrap();
        r.resize(300, 200).unwrap();
        assert_eq!(r.center(), (150.0, 100.0));
        assert_eq!(r.canvas().width(), 300);
    }
}
