//! Demo: render each pattern as the custom appearance of a rectangle
//! annotation, one per page of a generated document.

use std::env;
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

use annot_canvas_rust::{
    convert, CircularHatch, Document, FilledRectangle, GradientCircleGrid, Pattern, Rect,
    RectangleAnnotation, RendererResult, Size, TriangleTessellation, Viewer,
};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        log::error!("{err}");
        process::exit(1);
    }
}

fn run() -> RendererResult<()> {
    let output = env::args()
        .nth(1)
        .unwrap_or_else(|| "annotated.pdf".to_string());

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default();
    log::info!("tessellation seed: {seed}");

    let annot_size = Size::new(600.0, 600.0);
    let patterns: Vec<(&str, Box<dyn Pattern>)> = vec![
        ("filled rectangle", Box::new(FilledRectangle::default())),
        (
            "gradient circle grid",
            Box::new(GradientCircleGrid::default()),
        ),
        ("circular hatch", Box::new(CircularHatch::default())),
        (
            "triangle tessellation",
            Box::new(TriangleTessellation::new(seed)),
        ),
    ];
    let page_count = patterns.len() as u32;

    let mut viewer = Viewer::new();
    viewer.annotation_manager_mut().set_current_user("demo");
    viewer.on_document_loaded(move |_document, manager| {
        for (index, (name, pattern)) in patterns.iter().enumerate() {
            let appearance = convert(pattern.as_ref(), annot_size);
            let mut annotation = RectangleAnnotation::new(
                index as u32 + 1,
                Rect::new(0.0, 0.0, annot_size.width, annot_size.height),
            );
            annotation.add_custom_appearance(appearance);
            let id = manager.add_annotation(annotation);
            if let Err(err) = manager.redraw_annotation(id) {
                log::warn!("could not redraw {name}: {err}");
                continue;
            }
            log::info!("attached {name} to page {}", index + 1);
        }
    });

    viewer.load_document(Document::new(Size::new(612.0, 792.0), page_count)?);
    viewer.save(&output)?;
    log::info!("wrote {output}");
    Ok(())
}
