//! PNG previews of generated grids
//!
//! Debug visualisation only. Each renderer maps one cell to one pixel.

use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};

use crate::biomes::Biome;
use crate::erosion::RiverPath;
use crate::error::Result;
use crate::grid::Grid;
use crate::structures::{PlacedStructures, StructureKind};
use crate::world::WorldData;

const RIVER_COLOR: Rgb<u8> = Rgb([60, 110, 220]);
const BACKGROUND: Rgb<u8> = Rgb([40, 40, 40]);

pub fn render_biomes(biomes: &Grid<Biome>) -> RgbImage {
    ImageBuffer::from_fn(biomes.width() as u32, biomes.height() as u32, |x, y| {
        Rgb(biomes.get(x as usize, y as usize).color())
    })
}

/// Hillshaded elevation: water below 0.3 in blue, land from green through
/// rock to snow, lit from the upper left.
pub fn render_elevation(elevation: &Grid<f32>) -> RgbImage {
    let (width, height) = (elevation.width(), elevation.height());

    let light = {
        let (x, y, z) = (-0.7f32, -0.7f32, 0.5f32);
        let len = (x * x + y * y + z * z).sqrt();
        (x / len, y / len, z / len)
    };

    ImageBuffer::from_fn(width as u32, height as u32, |px, py| {
        let (x, y) = (px as usize, py as usize);
        let h = *elevation.get(x, y);

        let h_left = if x > 0 { *elevation.get(x - 1, y) } else { h };
        let h_right = if x + 1 < width { *elevation.get(x + 1, y) } else { h };
        let h_up = if y > 0 { *elevation.get(x, y - 1) } else { h };
        let h_down = if y + 1 < height { *elevation.get(x, y + 1) } else { h };

        // Exaggerate relief so [0, 1] terrain shows shading
        let scale = 8.0;
        let nx = (h_left - h_right) * scale;
        let ny = (h_up - h_down) * scale;
        let nlen = (nx * nx + ny * ny + 1.0).sqrt();
        let diffuse = ((nx * light.0 + ny * light.1 + light.2) / nlen).max(0.0);
        let lighting = (0.3 + 0.7 * diffuse).min(1.0);

        let base = if h < 0.3 {
            let depth = ((0.3 - h) / 0.3).clamp(0.0, 1.0);
            return Rgb([30, (150.0 - depth * 100.0) as u8, (200.0 - depth * 120.0) as u8]);
        } else if h < 0.5 {
            [80.0, 140.0, 60.0]
        } else if h < 0.8 {
            let t = (h - 0.5) / 0.3;
            [80.0 + t * 80.0, 140.0 - t * 20.0, 60.0 + t * 80.0]
        } else {
            [240.0, 240.0, 245.0]
        };

        Rgb([
            (base[0] * lighting) as u8,
            (base[1] * lighting) as u8,
            (base[2] * lighting) as u8,
        ])
    })
}

/// Walls dark, open floor light.
pub fn render_mask(mask: &Grid<bool>) -> RgbImage {
    ImageBuffer::from_fn(mask.width() as u32, mask.height() as u32, |x, y| {
        if *mask.get(x as usize, y as usize) {
            Rgb([50, 45, 40])
        } else {
            Rgb([200, 190, 170])
        }
    })
}

pub fn draw_rivers(img: &mut RgbImage, rivers: &[RiverPath]) {
    for river in rivers {
        for &(x, y) in &river.cells {
            img.put_pixel(x as u32, y as u32, RIVER_COLOR);
        }
    }
}

/// Mark each structure with a small plus.
pub fn draw_structures(img: &mut RgbImage, structures: &PlacedStructures) {
    for s in structures.iter() {
        let color = match s.kind {
            StructureKind::City => Rgb([220, 40, 40]),
            StructureKind::MountainKeep => Rgb([120, 40, 160]),
            StructureKind::Lighthouse => Rgb([250, 220, 60]),
        };
        for (dx, dy) in [(0i64, 0i64), (-1, 0), (1, 0), (0, -1), (0, 1)] {
            let x = s.x as i64 + dx;
            let y = s.y as i64 + dy;
            if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
                img.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

/// Biome map with rivers and structures drawn on top.
pub fn render_world(world: &WorldData) -> RgbImage {
    let mut img = render_biomes(&world.biomes);
    draw_rivers(&mut img, &world.rivers);
    draw_structures(&mut img, &world.structures);
    img
}

/// Tile equally sized images into a `cols`-wide sheet with a 4px gutter.
pub fn compose_sheet(images: &[RgbImage], cols: usize) -> RgbImage {
    let Some(first) = images.first() else {
        return ImageBuffer::from_pixel(1, 1, BACKGROUND);
    };
    let cols = cols.max(1);
    let rows = images.len().div_ceil(cols);
    let gutter = 4u32;
    let (cell_w, cell_h) = (first.width() + gutter, first.height() + gutter);

    let mut sheet = ImageBuffer::from_pixel(
        cell_w * cols as u32 + gutter,
        cell_h * rows as u32 + gutter,
        BACKGROUND,
    );
    for (idx, img) in images.iter().enumerate() {
        let x0 = gutter + (idx % cols) as u32 * cell_w;
        let y0 = gutter + (idx / cols) as u32 * cell_h;
        image::imageops::replace(&mut sheet, img, x0 as i64, y0 as i64);
    }
    sheet
}

pub fn save_png(img: &RgbImage, path: impl AsRef<Path>) -> Result<()> {
    img.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_biome_colors() {
        let biomes = Grid::from_fn(2, 1, |x, _| if x == 0 { Biome::Ocean } else { Biome::Snow });
        let img = render_biomes(&biomes);
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(img.get_pixel(0, 0).0, Biome::Ocean.color());
        assert_eq!(img.get_pixel(1, 0).0, Biome::Snow.color());
    }

    #[test]
    fn test_elevation_dimensions() {
        let elevation = Grid::from_fn(7, 3, |x, _| x as f32 / 6.0);
        assert_eq!(render_elevation(&elevation).dimensions(), (7, 3));
    }

    #[test]
    fn test_sheet_layout() {
        let tile = ImageBuffer::from_pixel(10, 5, Rgb([1, 2, 3]));
        let sheet = compose_sheet(&[tile.clone(), tile.clone(), tile], 2);
        assert_eq!(sheet.dimensions(), (2 * 14 + 4, 2 * 9 + 4));
        assert_eq!(sheet.get_pixel(4, 4).0, [1, 2, 3]);
        assert_eq!(sheet.get_pixel(0, 0).0, BACKGROUND.0);
    }

    #[test]
    fn test_structures_clipped_at_edge() {
        use crate::structures::{Structure, StructureAttributes};
        let mut img = ImageBuffer::from_pixel(3, 3, BACKGROUND);
        let placed = PlacedStructures {
            cities: vec![Structure {
                kind: StructureKind::City,
                x: 0,
                y: 0,
                attributes: StructureAttributes { elevation: 0.5, biome: Biome::Grassland },
            }],
            pois: Vec::new(),
        };
        draw_structures(&mut img, &placed);
        assert_eq!(img.get_pixel(0, 0).0, [220, 40, 40]);
        assert_eq!(img.get_pixel(2, 2).0, BACKGROUND.0);
    }
}
