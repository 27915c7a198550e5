use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use glam::Vec3;

use crate::{camera::Camera, shader::PixelShader};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Sphere trace in a fragment shader.
    Gpu,
    /// Sphere trace on the CPU and display the result as a texture.
    Cpu,
}

/// Render a signed distance field scene by sphere tracing.
#[derive(Debug, Parser)]
#[command(version)]
pub struct Args {
    #[arg(long, value_enum, default_value_t = Backend::Gpu)]
    pub backend: Backend,

    #[arg(long, default_value_t = 800, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    #[arg(long, default_value_t = 800, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,

    /// Vertical field of view in degrees, in (0, 180).
    #[arg(long, default_value_t = Camera::DEFAULT_FOV_DEGREES, value_parser = parse_fov)]
    pub fov: f32,

    /// Distance of the eye from the origin along +z.
    #[arg(long, default_value_t = Camera::DEFAULT_EYE.z, allow_negative_numbers = true)]
    pub eye_z: f32,

    /// Render one frame on the CPU into this PNG file instead of opening a window.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

fn parse_fov(s: &str) -> Result<f32, String> {
    let fov: f32 = s.parse().map_err(|e| format!("`{s}` is not a number: {e}"))?;
    if fov > 0.0 && fov < 180.0 {
        Ok(fov)
    } else {
        Err(format!("field of view must be in (0, 180), got {fov}"))
    }
}

/// Validated settings for one run. Passed by value; the host copies it into
/// its own state and applies changes between frames.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub backend: Backend,
    pub width: u32,
    pub height: u32,
    pub camera: Camera,
    pub output: Option<PathBuf>,
}

impl RenderConfig {
    pub fn pixel_shader(&self) -> PixelShader {
        PixelShader::with_camera(self.camera)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Gpu,
            width: 800,
            height: 800,
            camera: Camera::default(),
            output: None,
        }
    }
}

impl From<Args> for RenderConfig {
    fn from(args: Args) -> Self {
        Self {
            backend: args.backend,
            width: args.width,
            height: args.height,
            camera: Camera::new(Vec3::new(0.0, 0.0, args.eye_z), args.fov),
            output: args.output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<RenderConfig, clap::Error> {
        Args::try_parse_from(std::iter::once("sdf_raymarch").chain(args.iter().copied()))
            .map(RenderConfig::from)
    }

    #[test]
    fn defaults_match_reference_setup() {
        let config = parse(&[]).unwrap();
        assert_eq!(config, RenderConfig::default());
        assert_eq!(config.pixel_shader(), PixelShader::default());
    }

    #[test]
    fn parses_all_options() {
        let config = parse(&[
            "--backend", "cpu", "--width", "320", "--height", "240", "--fov", "60",
            "--eye-z", "8.5", "--output", "frame.png",
        ])
        .unwrap();
        assert_eq!(config.backend, Backend::Cpu);
        assert_eq!((config.width, config.height), (320, 240));
        assert_eq!(config.camera, Camera::new(Vec3::new(0.0, 0.0, 8.5), 60.0));
        assert_eq!(config.output, Some(PathBuf::from("frame.png")));
    }

    #[test]
    fn rejects_degenerate_fov() {
        for fov in ["0", "180", "-10", "abc"] {
            assert!(parse(&["--fov", fov]).is_err(), "fov {fov} accepted");
        }
    }

    #[test]
    fn rejects_zero_sized_frame() {
        assert!(parse(&["--width", "0"]).is_err());
        assert!(parse(&["--height", "0"]).is_err());
    }
}
