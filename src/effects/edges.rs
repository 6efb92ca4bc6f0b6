use rayon::prelude::*;

use crate::foundation::color::hsv_to_rgb;
use crate::foundation::math::clamp_u8;
use crate::foundation::raster::Raster;
use crate::layers::params::{ParamDescriptor, ParamValues, Params};

pub const EDGE_THRESHOLD: &str = "threshold";
pub const EDGE_BLACKOUT: &str = "blackoutBackground";
pub const EDGE_TRANSPARENT: &str = "transparentBackground";

/// 3x3 gradient operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GradientOperator {
    Sobel,
    Prewitt,
}

impl GradientOperator {
    /// Horizontal kernel, row-major; the vertical kernel is its transpose.
    fn kernel_x(self) -> [[f32; 3]; 3] {
        match self {
            Self::Sobel => [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]],
            Self::Prewitt => [[-1.0, 0.0, 1.0], [-1.0, 0.0, 1.0], [-1.0, 0.0, 1.0]],
        }
    }
}

/// Per-pixel gradient of the channel mean.
#[derive(Clone, Debug)]
pub struct GradientField {
    width: u32,
    gx: Vec<f32>,
    gy: Vec<f32>,
}

impl GradientField {
    /// Convolve `src` with `op`, clamping out-of-bounds neighbours to the border.
    pub fn compute(src: &Raster, op: GradientOperator) -> Self {
        let (w, h) = src.dimensions();
        let n = (w as usize) * (h as usize);
        if n == 0 {
            return Self {
                width: w,
                gx: Vec::new(),
                gy: Vec::new(),
            };
        }

        let luma: Vec<f32> = src
            .data()
            .chunks_exact(4)
            .map(|p| (f32::from(p[0]) + f32::from(p[1]) + f32::from(p[2])) / 3.0)
            .collect();
        let kx = op.kernel_x();
        let at = |x: i64, y: i64| -> f32 {
            let cx = x.clamp(0, i64::from(w) - 1) as usize;
            let cy = y.clamp(0, i64::from(h) - 1) as usize;
            luma[cy * (w as usize) + cx]
        };

        let (gx, gy): (Vec<f32>, Vec<f32>) = (0..n)
            .into_par_iter()
            .map(|i| {
                let x = (i % w as usize) as i64;
                let y = (i / w as usize) as i64;
                let mut sx = 0.0f32;
                let mut sy = 0.0f32;
                for (ky, row) in kx.iter().enumerate() {
                    for (kxi, &k) in row.iter().enumerate() {
                        let dx = kxi as i64 - 1;
                        let dy = ky as i64 - 1;
                        sx += k * at(x + dx, y + dy);
                        // Transposed kernel for the vertical component.
                        sy += kx[kxi][ky] * at(x + dx, y + dy);
                    }
                }
                (sx, sy)
            })
            .unzip();

        Self { width: w, gx, gy }
    }

    fn idx(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    pub fn magnitude(&self, x: u32, y: u32) -> f32 {
        let i = self.idx(x, y);
        (self.gx[i] * self.gx[i] + self.gy[i] * self.gy[i]).sqrt()
    }

    /// Gradient direction in radians, `atan2(gy, gx)`.
    pub fn direction(&self, x: u32, y: u32) -> f32 {
        let i = self.idx(x, y);
        self.gy[i].atan2(self.gx[i])
    }
}

/// How edge and background pixels are painted.
#[derive(Clone, Copy, Debug)]
struct EdgeStyle {
    operator: GradientOperator,
    coloured_directions: bool,
}

fn edge_pass(raster: &mut Raster, params: &ParamValues, style: EdgeStyle) {
    if raster.is_empty() {
        return;
    }
    let threshold = params.number(EDGE_THRESHOLD, 100.0).max(0.0);
    let blackout = params.flag(EDGE_BLACKOUT, false);
    let transparent = params.flag(EDGE_TRANSPARENT, false);

    let field = GradientField::compute(raster, style.operator);
    let width = raster.width();
    let row_bytes = (width as usize) * 4;

    raster
        .data_mut()
        .par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let (x, y) = (x as u32, y as u32);
                if field.magnitude(x, y) > threshold {
                    let rgb = if style.coloured_directions {
                        let deg = field.direction(x, y).to_degrees();
                        let (r, g, b) = hsv_to_rgb(deg, 1.0, 1.0);
                        [clamp_u8(r), clamp_u8(g), clamp_u8(b)]
                    } else {
                        [255, 255, 255]
                    };
                    px.copy_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
                } else if transparent {
                    px.copy_from_slice(&[0, 0, 0, 0]);
                } else if blackout {
                    px.copy_from_slice(&[0, 0, 0, 255]);
                }
            }
        });
}

pub fn sobel_edges(raster: &mut Raster, params: &ParamValues) {
    edge_pass(
        raster,
        params,
        EdgeStyle {
            operator: GradientOperator::Sobel,
            coloured_directions: false,
        },
    );
}

pub fn sobel_edges_coloured_directions(raster: &mut Raster, params: &ParamValues) {
    edge_pass(
        raster,
        params,
        EdgeStyle {
            operator: GradientOperator::Sobel,
            coloured_directions: true,
        },
    );
}

pub fn prewitt_edges(raster: &mut Raster, params: &ParamValues) {
    edge_pass(
        raster,
        params,
        EdgeStyle {
            operator: GradientOperator::Prewitt,
            coloured_directions: false,
        },
    );
}

pub fn prewitt_edges_coloured_directions(raster: &mut Raster, params: &ParamValues) {
    edge_pass(
        raster,
        params,
        EdgeStyle {
            operator: GradientOperator::Prewitt,
            coloured_directions: true,
        },
    );
}

/// Shared by all four edge effects.
pub fn edges_schema() -> Params {
    Params::new()
        .with(EDGE_THRESHOLD, ParamDescriptor::number(100.0, 0.0, 255.0, 1.0))
        .with(EDGE_BLACKOUT, ParamDescriptor::flag(false))
        .with(EDGE_TRANSPARENT, ParamDescriptor::flag(false))
}

#[cfg(test)]
#[path = "../../tests/unit/effects/edges.rs"]
mod tests;
