//! Источник заливки: сплошной цвет или линейный градиент
//!
//! Один и тот же `Paint` используется для модулей тела, «глаз» и обводки рамки.

use image::Rgba;

use crate::style::StyleConfig;

/// Линейный градиент между двумя точками холста
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearGradient {
    pub start: (f32, f32),
    pub end: (f32, f32),
    pub from: Rgba<u8>,
    pub to: Rgba<u8>,
}

impl LinearGradient {
    /// Цвет в точке: проекция на ось градиента, зажатая в [0, 1]
    pub fn sample(&self, x: f32, y: f32) -> Rgba<u8> {
        let (dx, dy) = (self.end.0 - self.start.0, self.end.1 - self.start.1);
        let length_sq = dx * dx + dy * dy;
        let t = if length_sq <= f32::EPSILON {
            0.0
        } else {
            (((x - self.start.0) * dx + (y - self.start.1) * dy) / length_sq).clamp(0.0, 1.0)
        };
        lerp(self.from, self.to, t)
    }
}

/// Заливка
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Solid(Rgba<u8>),
    Linear(LinearGradient),
}

impl Paint {
    pub fn sample(&self, x: f32, y: f32) -> Rgba<u8> {
        match self {
            Paint::Solid(color) => *color,
            Paint::Linear(gradient) => gradient.sample(x, y),
        }
    }
}

/// Заливка модулей для холста `width × height`: градиент идёт из угла в угол
pub fn resolve(style: &StyleConfig, width: u32, height: u32) -> Paint {
    if !style.gradient_enabled {
        return Paint::Solid(style.foreground.to_rgba());
    }

    Paint::Linear(LinearGradient {
        start: (0.0, 0.0),
        end: (width as f32, height as f32),
        from: style.gradient_from.to_rgba(),
        to: style.gradient_to.to_rgba(),
    })
}

fn lerp(a: Rgba<u8>, b: Rgba<u8>, t: f32) -> Rgba<u8> {
    let mut out = [0u8; 4];
    for (i, slot) in out.iter_mut().enumerate() {
        let v = a.0[i] as f32 + (b.0[i] as f32 - a.0[i] as f32) * t;
        *slot = v.round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;

    #[test]
    fn test_flat_color_when_disabled() {
        let style = StyleConfig {
            foreground: Color::rgb(10, 20, 30),
            gradient_from: Color::rgb(255, 0, 0),
            ..StyleConfig::default()
        };
        assert_eq!(resolve(&style, 100, 100), Paint::Solid(Rgba([10, 20, 30, 255])));
    }

    #[test]
    fn test_gradient_corners() {
        let style = StyleConfig {
            gradient_enabled: true,
            gradient_from: Color::rgb(255, 0, 0),
            gradient_to: Color::rgb(0, 0, 255),
            ..StyleConfig::default()
        };
        let paint = resolve(&style, 400, 460);
        assert_eq!(paint.sample(0.0, 0.0), Rgba([255, 0, 0, 255]));
        assert_eq!(paint.sample(400.0, 460.0), Rgba([0, 0, 255, 255]));

        let mid = paint.sample(200.0, 230.0);
        assert!((mid.0[0] as i32 - 128).abs() <= 1);
        assert!((mid.0[2] as i32 - 128).abs() <= 1);

        // outside the axis clamps to the end colors
        assert_eq!(paint.sample(-50.0, -50.0), Rgba([255, 0, 0, 255]));
    }
}
