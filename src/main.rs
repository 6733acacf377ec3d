use anyhow::Result;
use clerestory::glam::Vec3;
use clerestory::{AppConfig, Volume};

fn main() -> Result<()> {
    env_logger::init();

    let config = AppConfig::new()
        .title("Clerestory")
        .size(1920, 1080)
        .fov_y(45.0)
        .volume(Volume::new(
            Vec3::new(-10.0, -2.0, -10.0),
            Vec3::new(10.0, 6.0, 10.0),
        ));

    clerestory::run(config)?;
    Ok(())
}
