//! Растеризатор с покрытием (anti-aliasing) поверх `RgbaImage`
//!
//! Фигуры задаются в пиксельных координатах с плавающей точкой; каждая отрисовка
//! смешивает цвет заливки с пикселем пропорционально покрытию.

use std::f32::consts::{FRAC_PI_2, PI};

use image::{Rgba, RgbaImage};

use crate::paint::Paint;

/// Фигура для заливки или обрезки
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rect { x: f32, y: f32, w: f32, h: f32 },
    RoundedRect { x: f32, y: f32, w: f32, h: f32, radius: f32 },
    Circle { cx: f32, cy: f32, radius: f32 },
}

impl Shape {
    /// Скруглённый прямоугольник; радиус ограничен половиной меньшей стороны
    pub fn rounded(x: f32, y: f32, w: f32, h: f32, radius: f32) -> Self {
        let radius = radius.max(0.0).min(w / 2.0).min(h / 2.0);
        Shape::RoundedRect { x, y, w, h, radius }
    }

    /// Ограничивающий прямоугольник (x0, y0, x1, y1)
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        match *self {
            Shape::Rect { x, y, w, h } | Shape::RoundedRect { x, y, w, h, .. } => (x, y, x + w, y + h),
            Shape::Circle { cx, cy, radius } => (cx - radius, cy - radius, cx + radius, cy + radius),
        }
    }

    /// Знаковое расстояние до границы (отрицательное внутри)
    pub fn signed_distance(&self, px: f32, py: f32) -> f32 {
        match *self {
            Shape::Rect { x, y, w, h } => rounded_rect_distance(px, py, x, y, w, h, 0.0),
            Shape::RoundedRect { x, y, w, h, radius } => rounded_rect_distance(px, py, x, y, w, h, radius),
            Shape::Circle { cx, cy, radius } => ((px - cx).powi(2) + (py - cy).powi(2)).sqrt() - radius,
        }
    }

    /// Длина контура
    pub fn perimeter(&self) -> f32 {
        match *self {
            Shape::Rect { w, h, .. } => 2.0 * (w + h),
            Shape::RoundedRect { w, h, radius, .. } => 2.0 * (w + h - 4.0 * radius) + 2.0 * PI * radius,
            Shape::Circle { radius, .. } => 2.0 * PI * radius,
        }
    }

    /// Положение ближайшей точки контура, измеренное вдоль контура по часовой
    /// стрелке от верхнего левого края верхней стороны
    pub fn contour_position(&self, px: f32, py: f32) -> f32 {
        match *self {
            Shape::Rect { x, y, w, h } => rounded_rect_position(px, py, x, y, w, h, 0.0),
            Shape::RoundedRect { x, y, w, h, radius } => rounded_rect_position(px, py, x, y, w, h, radius),
            Shape::Circle { cx, cy, radius } => {
                let angle = (py - cy).atan2(px - cx);
                radius * (angle + FRAC_PI_2).rem_euclid(2.0 * PI)
            }
        }
    }

    /// Доля пикселя (x, y), покрытая фигурой
    pub fn coverage(&self, x: u32, y: u32) -> f32 {
        match *self {
            // Для прямоугольника считаем площадь пересечения точно, чтобы соседние
            // модули стыковались без швов.
            Shape::Rect { x: rx, y: ry, w, h } => {
                let (px, py) = (x as f32, y as f32);
                let cover_x = (px + 1.0).min(rx + w) - px.max(rx);
                let cover_y = (py + 1.0).min(ry + h) - py.max(ry);
                (cover_x.clamp(0.0, 1.0)) * (cover_y.clamp(0.0, 1.0))
            }
            _ => (0.5 - self.signed_distance(x as f32 + 0.5, y as f32 + 0.5)).clamp(0.0, 1.0),
        }
    }
}

fn rounded_rect_distance(px: f32, py: f32, x: f32, y: f32, w: f32, h: f32, radius: f32) -> f32 {
    let (hw, hh) = (w / 2.0, h / 2.0);
    let qx = (px - (x + hw)).abs() - (hw - radius);
    let qy = (py - (y + hh)).abs() - (hh - radius);
    let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
    let inside = qx.max(qy).min(0.0);
    outside + inside - radius
}

fn rounded_rect_position(px: f32, py: f32, x: f32, y: f32, w: f32, h: f32, radius: f32) -> f32 {
    let (left, right) = (x + radius, x + w - radius);
    let (top, bottom) = (y + radius, y + h - radius);
    let (edge_w, edge_h) = (right - left, bottom - top);
    let arc = FRAC_PI_2 * radius;
    let inside_x = (left..=right).contains(&px);
    let inside_y = (top..=bottom).contains(&py);

    if !inside_x && !inside_y {
        // угол: позиция по дуге вокруг центра скругления
        let cx = if px < left { left } else { right };
        let cy = if py < top { top } else { bottom };
        let angle = (py - cy).atan2(px - cx);
        return match (px < left, py < top) {
            (false, true) => edge_w + radius * (angle + FRAC_PI_2),
            (false, false) => edge_w + arc + edge_h + radius * angle,
            (true, false) => 2.0 * edge_w + edge_h + 2.0 * arc + radius * (angle - FRAC_PI_2),
            (true, true) => 2.0 * (edge_w + edge_h) + 3.0 * arc + radius * (angle + PI),
        };
    }

    let side = if inside_x && inside_y {
        // внутри: ближайшая сторона
        let distances = [py - y, x + w - px, y + h - py, px - x];
        (0..4).fold(0, |best, i| if distances[i] < distances[best] { i } else { best })
    } else if inside_x {
        if py < top { 0 } else { 2 }
    } else if px > right {
        1
    } else {
        3
    };

    match side {
        0 => px - left,
        1 => edge_w + arc + (py - top),
        2 => edge_w + edge_h + 2.0 * arc + (right - px),
        _ => 2.0 * edge_w + edge_h + 3.0 * arc + (bottom - py),
    }
}

/// Поверхность рисования, выделяемая заново на каждый рендер
pub struct Surface {
    image: RgbaImage,
}

impl Surface {
    pub fn new(width: u32, height: u32, background: Rgba<u8>) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, background),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Заливка фигуры
    pub fn fill(&mut self, shape: &Shape, paint: &Paint) {
        self.cover(shape.bounds(), 0.0, paint, |x, y| shape.coverage(x, y));
    }

    /// Замещение пикселей цветом (вместе с альфой) по покрытию фигуры.
    /// В отличие от `fill`, прозрачный цвет действительно стирает нарисованное.
    pub fn erase(&mut self, shape: &Shape, color: Rgba<u8>) {
        let (x0, y0, x1, y1) = shape.bounds();
        let start_x = x0.floor().max(0.0) as u32;
        let start_y = y0.floor().max(0.0) as u32;
        let end_x = (x1.ceil().max(0.0) as u32).min(self.width());
        let end_y = (y1.ceil().max(0.0) as u32).min(self.height());

        for y in start_y..end_y {
            for x in start_x..end_x {
                let c = shape.coverage(x, y);
                if c > 0.0 {
                    let px = self.image.get_pixel_mut(x, y);
                    for i in 0..4 {
                        let v = px.0[i] as f32 + (color.0[i] as f32 - px.0[i] as f32) * c;
                        px.0[i] = v.round().clamp(0.0, 255.0) as u8;
                    }
                }
            }
        }
    }

    /// Обводка скруглённого прямоугольника линией толщины `line_width`,
    /// центрированной на контуре
    pub fn stroke(&mut self, shape: &Shape, line_width: f32, paint: &Paint) {
        let half = line_width / 2.0;
        self.cover(shape.bounds(), half, paint, |x, y| {
            let d = shape.signed_distance(x as f32 + 0.5, y as f32 + 0.5);
            (0.5 - (d.abs() - half)).clamp(0.0, 1.0)
        });
    }

    /// Пунктирная обводка: штрихи длины `dash` через промежутки `gap` вдоль контура
    pub fn stroke_dashed(&mut self, shape: &Shape, line_width: f32, dash: f32, gap: f32, paint: &Paint) {
        let period = dash + gap;
        if dash <= 0.0 || gap <= 0.0 {
            self.stroke(shape, line_width, paint);
            return;
        }
        let half = line_width / 2.0;
        self.cover(shape.bounds(), half, paint, |x, y| {
            let (cx, cy) = (x as f32 + 0.5, y as f32 + 0.5);
            let d = shape.signed_distance(cx, cy);
            let across = (0.5 - (d.abs() - half)).clamp(0.0, 1.0);
            if across <= 0.0 {
                return 0.0;
            }
            let m = shape.contour_position(cx, cy).rem_euclid(period);
            let outside = if m < dash { -m.min(dash - m) } else { (m - dash).min(period - m) };
            across * (0.5 - outside).clamp(0.0, 1.0)
        });
    }

    /// Наложение изображения с левым верхним углом в (`left`, `top`), обрезанного фигурой
    pub fn draw_image_clipped(&mut self, src: &RgbaImage, left: i64, top: i64, clip: &Shape) {
        for (sx, sy, pixel) in src.enumerate_pixels() {
            let (x, y) = (left + sx as i64, top + sy as i64);
            if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
                continue;
            }
            let coverage = clip.coverage(x as u32, y as u32);
            if coverage > 0.0 {
                blend(self.image.get_pixel_mut(x as u32, y as u32), *pixel, coverage);
            }
        }
    }

    /// Наложение изображения без обрезки
    pub fn draw_image(&mut self, src: &RgbaImage, left: i64, top: i64) {
        let clip = Shape::Rect {
            x: left as f32,
            y: top as f32,
            w: src.width() as f32,
            h: src.height() as f32,
        };
        self.draw_image_clipped(src, left, top, &clip);
    }

    fn cover<F>(&mut self, bounds: (f32, f32, f32, f32), pad: f32, paint: &Paint, coverage: F)
    where
        F: Fn(u32, u32) -> f32,
    {
        let (x0, y0, x1, y1) = bounds;
        let max_x = self.width() as f32;
        let max_y = self.height() as f32;
        let start_x = (x0 - pad - 1.0).floor().clamp(0.0, max_x) as u32;
        let start_y = (y0 - pad - 1.0).floor().clamp(0.0, max_y) as u32;
        let end_x = (x1 + pad + 1.0).ceil().clamp(0.0, max_x) as u32;
        let end_y = (y1 + pad + 1.0).ceil().clamp(0.0, max_y) as u32;

        for y in start_y..end_y {
            for x in start_x..end_x {
                let c = coverage(x, y);
                if c > 0.0 {
                    let color = paint.sample(x as f32 + 0.5, y as f32 + 0.5);
                    blend(self.image.get_pixel_mut(x, y), color, c);
                }
            }
        }
    }
}

/// Source-over смешивание с учётом покрытия
pub fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>, coverage: f32) {
    let sa = (src.0[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    if sa >= 1.0 {
        *dst = src;
        return;
    }

    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let mut out = [0u8; 4];
    for i in 0..3 {
        let sc = src.0[i] as f32;
        let dc = dst.0[i] as f32;
        let v = (sc * sa + dc * da * (1.0 - sa)) / out_a;
        out[i] = v.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    *dst = Rgba(out);
}
