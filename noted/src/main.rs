#![warn(clippy::pedantic)]

//! Renders canvas files to PNG, one image per file, pages stacked top to bottom.
//! Paths that don't exist yet are created as blank canvases first.

mod settings;

use anyhow::Result as AnyResult;
use noted_core::{Canvas, DrawTarget};

/// Shows through the gaps between pages.
const DESK: noted_core::color::Color = noted_core::color::Color::rgba(0x60, 0x64, 0x6B, 0xFF);

/// Open (or create) a canvas, and render it next to the source with a `.png` extension.
fn process(path: &std::path::Path, settings: &settings::Settings) -> AnyResult<std::path::PathBuf> {
    let mut canvas = if path.exists() {
        Canvas::open(path)?
    } else {
        log::info!("{path:?} not found, creating a blank canvas");
        let canvas = Canvas::new();
        canvas.save(path)?;
        canvas
    };
    canvas.set_settings(settings.canvas);

    let out = path.with_extension("png");
    render(&canvas, settings.width)?.save_png(&out)?;
    Ok(out)
}

/// Draw the whole canvas at `width` pixels per page.
fn render(canvas: &Canvas, width: u32) -> AnyResult<tiny_skia::Pixmap> {
    #[allow(clippy::cast_precision_loss)]
    let scale = width as f32;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let height = (canvas.height() * scale).ceil().max(1.0) as u32;
    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| anyhow::anyhow!("can't allocate a {width}x{height} image"))?;
    pixmap.fill(DESK.into());
    canvas.draw(&mut DrawTarget::new(pixmap.as_mut(), scale));
    Ok(pixmap)
}

fn main() -> AnyResult<()> {
    let has_term = std::io::IsTerminal::is_terminal(&std::io::stdin());
    // Log to a terminal, if available. Else, log to "log.out" in the working directory.
    if has_term {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        let _ = simple_logging::log_to_file("log.out", log::LevelFilter::Debug);
    }

    let settings = settings::Settings::load();

    let succeeded = {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};
        // Args are a simple list of paths to render.
        // Paths are OSStrings, let the system handle character encoding restrictions.
        let paths: Vec<std::path::PathBuf> = std::env::args_os().skip(1).map(Into::into).collect();
        if paths.is_empty() {
            log::warn!("No canvas files given.");
        }
        paths
            .into_par_iter()
            .map(|path| match process(&path, &settings) {
                Ok(out) => {
                    log::info!("rendered {path:?} to {out:?}");
                    true
                }
                Err(e) => {
                    log::error!("failed to render {path:?}: {e:#}");
                    false
                }
            })
            // Count, rather than short-circuit, so every file gets its turn.
            .filter(|ok| !ok)
            .count()
            == 0
    };
    if !succeeded {
        anyhow::bail!("some canvases failed to render");
    }
    Ok(())
}
