pub mod application;
pub mod camera;
pub mod config;
pub mod frame;
pub mod march;
pub mod ray;
pub mod renderer;
pub mod scene;
pub mod shader;
pub mod texture;
pub mod util;
