//! Pixel geometry of a styled symbol.
//!
//! Cell size is derived from the symbol side only, so the caption band below the
//! matrix adds canvas height instead of shrinking the modules.

/// Height of the caption band, in module units
pub const LABEL_UNITS: u32 = 4;

/// Side of a finder pattern, in modules
pub const FINDER_SIZE: usize = 7;

/// Caption band below the symbol
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelBand {
    pub top: f32,
    pub height: f32,
}

/// Derived layout for one render
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPlan {
    pub module_count: usize,
    pub margin: u32,
    /// Pixels per module
    pub cell_size: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    /// Side of the square symbol area (matrix + quiet zone)
    pub symbol_size: f32,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub label: Option<LabelBand>,
}

/// Lay out an `N`-module matrix with `margin` quiet-zone modules on an `output_size` px symbol.
pub fn plan(module_count: usize, margin: u32, output_size: u32, reserve_label: bool) -> RenderPlan {
    let symbol_size = output_size as f32;
    let units = module_count as f32 + 2.0 * margin as f32;
    let cell_size = symbol_size / units;
    let offset = margin as f32 * cell_size;

    let label = reserve_label.then(|| LabelBand {
        top: symbol_size,
        height: LABEL_UNITS as f32 * cell_size,
    });
    let canvas_height = match label {
        Some(band) => (band.top + band.height).round() as u32,
        None => output_size,
    };

    RenderPlan {
        module_count,
        margin,
        cell_size,
        offset_x: offset,
        offset_y: offset,
        symbol_size,
        canvas_width: output_size,
        canvas_height,
        label,
    }
}

impl RenderPlan {
    /// Top-left pixel corner of a module
    pub fn module_origin(&self, row: usize, col: usize) -> (f32, f32) {
        (
            self.offset_x + col as f32 * self.cell_size,
            self.offset_y + row as f32 * self.cell_size,
        )
    }

    /// Side of the matrix itself, without the quiet zone
    pub fn matrix_extent(&self) -> f32 {
        self.module_count as f32 * self.cell_size
    }

    /// Center of the symbol area
    pub fn symbol_center(&self) -> (f32, f32) {
        (self.symbol_size / 2.0, self.symbol_size / 2.0)
    }

    pub fn is_eye(&self, row: usize, col: usize) -> bool {
        is_eye_module(row, col, self.module_count)
    }
}

/// True for modules of the three finder patterns (top-left, top-right, bottom-left).
/// The bottom-right corner has no finder pattern.
pub fn is_eye_module(row: usize, col: usize, module_count: usize) -> bool {
    let far = module_count.saturating_sub(FINDER_SIZE);
    let top_left = row < FINDER_SIZE && col < FINDER_SIZE;
    let top_right = row < FINDER_SIZE && col >= far;
    let bottom_left = row >= far && col < FINDER_SIZE;
    top_left || top_right || bottom_left
}
