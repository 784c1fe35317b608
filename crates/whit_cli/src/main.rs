use anyhow::{Context, Result};
use clap::Parser;
use std::time::Instant;
use whit_tracer::FrameBuffer;

mod cli;
mod config;
mod scene;

use cli::Args;
use config::RenderSettings;

/// Load the settings file, then apply command line overrides.
fn resolve_settings(args: &Args) -> Result<RenderSettings> {
    let mut settings = match &args.config {
        Some(path) => RenderSettings::load(path)?,
        None => RenderSettings::default(),
    };

    if let Some(width) = args.width {
        settings.viewport.width = width;
    }
    if let Some(height) = args.height {
        settings.viewport.height = height;
    }
    if let Some(frames) = args.frames {
        settings.frames = frames;
    }
    settings.accumulate |= args.accumulate;

    settings.validate()?;
    Ok(settings)
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    let settings = resolve_settings(&args)?;
    if args.print_config {
        println!("{}", settings.to_json()?);
        return Ok(());
    }

    let viewport = settings.viewport;
    log::info!(
        "Rendering {}x{} (aspect {:.3}), {} frame(s), max depth {}",
        viewport.width,
        viewport.height,
        viewport.aspect_ratio(),
        settings.frames,
        settings.world.max_bounce_depth
    );

    let start = Instant::now();
    let world = scene::demo_world(settings.world).context("Failed to build demo scene")?;
    log::info!("Scene ready in {:?}", start.elapsed());

    let camera = settings.camera.build(viewport);
    let mut frame = FrameBuffer::new(viewport.width, viewport.height);
    frame.set_accumulate(settings.accumulate);
    if settings.frames > 1 && !frame.is_accumulating() {
        log::warn!("Accumulation is off, only the last of {} frames is kept", settings.frames);
    }

    let start = Instant::now();
    for _ in 0..settings.frames {
        frame.render(&world, &camera);
    }
    let elapsed = start.elapsed();
    log::info!(
        "Rendered {} frame(s) in {:?} ({:?} per frame)",
        settings.frames,
        elapsed,
        elapsed / settings.frames
    );

    image::save_buffer(
        &args.output,
        frame.as_bytes(),
        frame.width(),
        frame.height(),
        image::ColorType::Rgba8,
    )
    .with_context(|| format!("Failed to write {}", args.output.display()))?;
    log::info!("Saved {}", args.output.display());

    Ok(())
}
