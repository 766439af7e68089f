//! Segmentation viewer: scripted headless session
//!
//! Usage: `segview [config.ron]`

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seg_frontend::demo::{scripted_session, synthetic_image};
use seg_frontend::{AppConfig, Viewer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load(&path)?,
        None => AppConfig::default(),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting segmentation viewer");

    let mut viewer = Viewer::new(&config);
    for (index, actions) in scripted_session(synthetic_image()?).into_iter().enumerate() {
        for action in actions {
            viewer.queue_action(action);
        }
        let summary = viewer.frame()?;

        let renderer = viewer.renderer();
        let camera = renderer.camera();
        let visible = renderer
            .scene()
            .meshes()
            .iter()
            .filter(|actor| actor.is_drawn())
            .count();
        tracing::info!(
            "Frame {}: {} actions ({} failed), mesh={:?}, view={:?}, painted={}, surfaces={}/{}, focal={}",
            index,
            summary.actions,
            summary.failed_actions,
            summary.plan.mesh,
            summary.plan.view,
            summary.painted,
            visible,
            renderer.scene().meshes().len(),
            camera.focal_point
        );
    }

    if let Some(frame) = viewer.renderer().host().last_frame() {
        tracing::info!(
            "Last frame: {} line vertices, {} surfaces, {} triangles",
            frame.lines.len(),
            frame.surfaces.len(),
            frame.triangle_count()
        );
    }
    tracing::info!(
        "Session finished after {} frames ({} painted)",
        viewer.frame_count(),
        viewer.renderer().host().paint_count()
    );
    Ok(())
}
