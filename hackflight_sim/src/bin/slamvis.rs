//! Simple 3D SLAM visualization demo.
//!
//! Drops one random obstacle per frame around a fixed vehicle until the
//! viewer goes away or Ctrl-C is pressed.
//!
//! The Rerun viewer does not report being closed, so closing its window
//! leaves this program running. Stop it with Ctrl-C, or bound the run with
//! `--frames N`.

use clap::Parser;
use hackflight_core::{SceneDisplay, SlamVisualizer, VisualizerConfig};
use hackflight_env::Interrupt;
use hackflight_sim::cli::{init_tracing, VisArgs};
use hackflight_sim::{AnimationConfig, ObstacleAnimator, SceneExport};
use tracing::info;

#[cfg(feature = "visualization")]
fn open_display(args: &VisArgs) -> anyhow::Result<Box<dyn SceneDisplay>> {
    use hackflight_core::RerunDisplay;
    
    let display = match &args.save {
        Some(path) => {
            info!("Recording to {}", path);
            RerunDisplay::new_to_file("hackflight_slamvis", path)?
        }
        None => RerunDisplay::new("hackflight_slamvis")?,
    };
    Ok(Box::new(display))
}

#[cfg(not(feature = "visualization"))]
fn open_display(args: &VisArgs) -> anyhow::Result<Box<dyn SceneDisplay>> {
    tracing::warn!("Rerun visualization not available (compile with --features visualization); running headless");
    if args.save.is_some() {
        tracing::warn!("--save ignored without the visualization feature");
    }
    Ok(Box::new(hackflight_core::HeadlessDisplay::new()))
}

fn main() -> anyhow::Result<()> {
    let args = VisArgs::parse();
    init_tracing(args.verbose);
    
    let interrupt = Interrupt::install()?;
    
    let config = VisualizerConfig {
        map_size_cm: args.map_size,
        obstacle_size_cm: args.obstacle_size,
        vehicle_size_cm: args.vehicle_size,
    };
    let mut vis = SlamVisualizer::new(config, open_display(&args)?)?.with_interrupt(interrupt);
    
    let mut animator = ObstacleAnimator::new(
        AnimationConfig {
            map_size_cm: args.map_size,
            max_frames: args.frames,
            ..Default::default()
        },
        args.seed,
    );
    let frames = animator.run(&mut vis);
    info!("Stopped after {} frames with {} obstacles", frames, vis.scene().obstacle_count());
    
    if let Some(path) = &args.export {
        SceneExport::from_visualizer(&vis, args.seed).write_to_file(path)?;
        info!("Exported scene to {}", path);
    }
    
    Ok(())
}
