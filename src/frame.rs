use std::path::Path;

use anyhow::Context;
use glam::{Vec2, Vec4};
use image::RgbaImage;
use rayon::prelude::*;

use crate::{scene::DistanceEstimator, shader::PixelShader};

/// Tex-space coordinate of the center of pixel `(x, y)`.
pub fn tex_coord(x: u32, y: u32, resolution: Vec2) -> Vec2 {
    Vec2::new(
        (x as f32 + 0.5) / resolution.x,
        (y as f32 + 0.5) / resolution.y,
    )
}

pub fn convert_rgba(color: Vec4) -> [u8; 4] {
    let c = color.clamp(Vec4::ZERO, Vec4::ONE) * 255.0;
    [c.x as u8, c.y as u8, c.z as u8, c.w as u8]
}

/// Shade every pixel of a `width` x `height` frame, rows in parallel.
pub fn render<E>(shader: &PixelShader, scene: &E, width: u32, height: u32) -> RgbaImage
where
    E: DistanceEstimator + Sync + ?Sized,
{
    let now = std::time::Instant::now();
    let resolution = Vec2::new(width as f32, height as f32);
    let mut img = RgbaImage::new(width, height);

    img.par_chunks_mut(4 * width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
                let coord = tex_coord(x as u32, y as u32, resolution);
                pixel.copy_from_slice(&convert_rgba(shader.shade(scene, coord)));
            }
        });

    tracing::debug!(width, height, elapsed = ?now.elapsed(), "cpu frame rendered");
    img
}

pub fn save_png(img: &RgbaImage, path: &Path) -> anyhow::Result<()> {
    img.save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("failed to write frame to {}", path.display()))?;
    tracing::info!(path = %path.display(), "frame exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const CLEAR: [u8; 4] = [0, 0, 0, 0];

    #[test]
    fn tex_coord_samples_pixel_centers() {
        let resolution = Vec2::new(4.0, 2.0);
        assert_eq!(tex_coord(0, 0, resolution), Vec2::new(0.125, 0.25));
        assert_eq!(tex_coord(3, 1, resolution), Vec2::new(0.875, 0.75));
    }

    #[test]
    fn convert_rgba_clamps() {
        assert_eq!(convert_rgba(Vec4::new(1.0, 0.0, 0.0, 1.0)), RED);
        assert_eq!(convert_rgba(Vec4::new(2.0, -1.0, 0.5, 0.0)), [255, 0, 127, 0]);
    }

    #[test]
    fn renders_sphere_in_the_middle() {
        let img = render(&PixelShader::default(), &Scene::default(), 9, 9);
        assert_eq!(img.dimensions(), (9, 9));
        assert_eq!(img.get_pixel(4, 4).0, RED);
        assert_eq!(img.get_pixel(0, 4).0, RED);
        assert_eq!(img.get_pixel(4, 8).0, RED);
        for (x, y) in [(0, 0), (8, 0), (0, 8), (8, 8)] {
            assert_eq!(img.get_pixel(x, y).0, CLEAR, "pixel ({x}, {y})");
        }
    }

    #[test]
    fn render_is_deterministic() {
        let shader = PixelShader::default();
        let scene = Scene::default();
        let first = render(&shader, &scene, 33, 21);
        let second = render(&shader, &scene, 33, 21);
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn rendered_image_is_symmetric() {
        let img = render(&PixelShader::default(), &Scene::default(), 16, 16);
        for y in 0..16 {
            for x in 0..16 {
                assert_eq!(img.get_pixel(x, y), img.get_pixel(15 - x, y));
                assert_eq!(img.get_pixel(x, y), img.get_pixel(x, 15 - y));
            }
        }
    }

    #[test]
    fn save_png_round_trips_pixels() {
        let img = render(&PixelShader::default(), &Scene::default(), 5, 5);
        let path = std::env::temp_dir().join(format!("sdf_raymarch_{}.png", std::process::id()));
        save_png(&img, &path).unwrap();
        let loaded = image::open(&path).unwrap().into_rgba8();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.as_raw(), img.as_raw());
    }
}
