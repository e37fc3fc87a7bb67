//! PDF export of the mounted grade card.
//!
//! The card's SVG is rasterized with resvg/tiny-skia and the bitmap is placed
//! on a single portrait page with printpdf. Jobs run on a worker thread over
//! an owned copy of the report model.

use crate::config::ExportSettings;
use crate::logo::sha256_hex;
use crate::report::ReportModel;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::thread::JoinHandle;
use uuid::Uuid;

/// DPI used to give the embedded bitmap its native size before scaling.
const IMAGE_DPI: f32 = 300.0;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("rasterization failed: {0}")]
    Render(String),
    #[error("pdf generation failed: {0}")]
    Pdf(String),
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("export worker stopped unexpectedly")]
    WorkerPanicked,
}

/// `Notas 2do  B` -> `Notas_2do_B_notas.pdf`.
pub fn export_file_name(title: &str) -> String {
    let mut out = String::with_capacity(title.len() + 10);
    let mut in_space = false;
    for ch in title.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        match ch {
            '/' | '\\' | '\0' => out.push('_'),
            _ => out.push(ch),
        }
    }
    out.push_str("_notas.pdf");
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub x_mm: f32,
    /// Distance from the top edge of the page.
    pub top_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
}

/// Fits an image of the given aspect inside the page minus margins, centered
/// horizontally and anchored at the top margin.
pub fn fit_on_page(settings: &ExportSettings, image_w: f32, image_h: f32) -> Placement {
    let max_w = settings.page_width_mm - 2.0 * settings.margin_mm;
    let max_h = settings.page_height_mm - 2.0 * settings.margin_mm;
    let mut width = max_w;
    let mut height = image_h * width / image_w.max(1.0);
    if height > max_h {
        height = max_h;
        width = image_w * height / image_h.max(1.0);
    }
    Placement {
        x_mm: (settings.page_width_mm - width) / 2.0,
        top_mm: settings.margin_mm,
        width_mm: width,
        height_mm: height,
    }
}

fn font_db() -> Arc<usvg::fontdb::Database> {
    static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            tracing::debug!(faces = db.len(), "loaded system fonts");
            Arc::new(db)
        })
        .clone()
}

pub fn rasterize(svg: &str, scale: f32) -> Result<tiny_skia::Pixmap, ExportError> {
    let mut opt = usvg::Options::default();
    opt.fontdb = font_db();
    let tree = usvg::Tree::from_str(svg, &opt)
        .map_err(|e| ExportError::Render(format!("SVG parsing failed: {e}")))?;

    let px_w = (tree.size().width() * scale).ceil() as u32;
    let px_h = (tree.size().height() * scale).ceil() as u32;
    let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1))
        .ok_or_else(|| ExportError::Render("failed to create pixmap".to_string()))?;
    pixmap.fill(tiny_skia::Color::WHITE);
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap)
}

/// Flattens premultiplied RGBA onto white.
fn flatten_rgb(pixmap: &tiny_skia::Pixmap) -> Vec<u8> {
    let mut rgb = Vec::with_capacity((pixmap.width() * pixmap.height() * 3) as usize);
    for px in pixmap.data().chunks_exact(4) {
        let inv = 255 - u16::from(px[3]);
        for c in &px[..3] {
            rgb.push((u16::from(*c) + inv).min(255) as u8);
        }
    }
    rgb
}

pub fn render_pdf(model: &ReportModel, settings: &ExportSettings) -> Result<Vec<u8>, ExportError> {
    let pixmap = rasterize(&model.render_svg(), settings.raster_scale)?;
    let (px_w, px_h) = (pixmap.width(), pixmap.height());
    let placement = fit_on_page(settings, px_w as f32, px_h as f32);

    let (doc, page, layer) = printpdf::PdfDocument::new(
        model.title.as_str(),
        printpdf::Mm(settings.page_width_mm),
        printpdf::Mm(settings.page_height_mm),
        "Report",
    );
    let current_layer = doc.get_page(page).get_layer(layer);

    let buffer = printpdf::image_crate::RgbImage::from_raw(px_w, px_h, flatten_rgb(&pixmap))
        .ok_or_else(|| ExportError::Pdf("raster buffer size mismatch".to_string()))?;
    let image = printpdf::Image::from_dynamic_image(&printpdf::image_crate::DynamicImage::ImageRgb8(
        buffer,
    ));

    let native_w_mm = px_w as f32 / IMAGE_DPI * 25.4;
    let native_h_mm = px_h as f32 / IMAGE_DPI * 25.4;
    // PDF origin is the bottom-left corner.
    let bottom_mm = settings.page_height_mm - placement.top_mm - placement.height_mm;
    image.add_to_layer(
        current_layer,
        printpdf::ImageTransform {
            translate_x: Some(printpdf::Mm(placement.x_mm)),
            translate_y: Some(printpdf::Mm(bottom_mm)),
            scale_x: Some(placement.width_mm / native_w_mm),
            scale_y: Some(placement.height_mm / native_h_mm),
            dpi: Some(IMAGE_DPI),
            ..Default::default()
        },
    );

    doc.save_to_bytes()
        .map_err(|e| ExportError::Pdf(format!("PDF save failed: {e}")))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOutcome {
    pub path: String,
    pub file_name: String,
    pub bytes: usize,
    pub sha256: String,
    pub exported_at: String,
    pub placement: Placement,
}

fn write_pdf(
    model: &ReportModel,
    settings: &ExportSettings,
    out_dir: &Path,
    file_name: &str,
) -> Result<ExportOutcome, ExportError> {
    let pdf = render_pdf(model, settings)?;
    std::fs::create_dir_all(out_dir).map_err(|source| ExportError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;
    let path = out_dir.join(file_name);
    std::fs::write(&path, &pdf).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;

    let (w, h) = model.size();
    Ok(ExportOutcome {
        path: path.to_string_lossy().to_string(),
        file_name: file_name.to_string(),
        bytes: pdf.len(),
        sha256: sha256_hex(&pdf),
        exported_at: chrono::Utc::now().to_rfc3339(),
        placement: fit_on_page(settings, w, h),
    })
}

/// One in-flight export.
pub struct ExportJob {
    pub id: Uuid,
    pub file_name: String,
    handle: JoinHandle<Result<ExportOutcome, ExportError>>,
}

impl ExportJob {
    pub fn spawn(model: ReportModel, settings: ExportSettings, out_dir: PathBuf) -> Self {
        let id = Uuid::new_v4();
        let file_name = export_file_name(&model.title);
        let name = file_name.clone();
        let handle = std::thread::spawn(move || {
            let started = std::time::Instant::now();
            let res = write_pdf(&model, &settings, &out_dir, &name);
            match &res {
                Ok(o) => tracing::info!(
                    job = %id,
                    path = %o.path,
                    bytes = o.bytes,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "export finished"
                ),
                Err(e) => tracing::error!(job = %id, error = %e, "export failed"),
            }
            res
        });
        Self {
            id,
            file_name,
            handle,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn wait(self) -> Result<ExportOutcome, ExportError> {
        self.handle
            .join()
            .unwrap_or(Err(ExportError::WorkerPanicked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{build, ReportConfig};
    use crate::roster::StudentEntry;

    #[test]
    fn file_name_replaces_whitespace_runs() {
        assert_eq!(
            export_file_name("Práctica de Matemáticas"),
            "Práctica_de_Matemáticas_notas.pdf"
        );
        assert_eq!(export_file_name("A \t B"), "A_B_notas.pdf");
        assert_eq!(export_file_name(" x "), "_x__notas.pdf");
        assert_eq!(export_file_name(""), "_notas.pdf");
    }

    #[test]
    fn file_name_never_escapes_the_export_dir() {
        assert_eq!(export_file_name("../etc/x"), ".._etc_x_notas.pdf");
        assert_eq!(export_file_name("a\\b"), "a_b_notas.pdf");
    }

    #[test]
    fn wide_image_fills_printable_width() {
        let s = ExportSettings::default();
        let p = fit_on_page(&s, 1344.0, 672.0);
        assert!((p.width_mm - 190.0).abs() < 1e-4);
        assert!((p.height_mm - 95.0).abs() < 1e-4);
        assert!((p.x_mm - 10.0).abs() < 1e-4);
        assert_eq!(p.top_mm, 10.0);
    }

    #[test]
    fn tall_image_is_scaled_down_and_centered() {
        let s = ExportSettings::default();
        let p = fit_on_page(&s, 100.0, 1000.0);
        assert!((p.height_mm - 277.0).abs() < 1e-3);
        assert!((p.width_mm - 27.7).abs() < 1e-3);
        assert!((p.x_mm - (210.0 - 27.7) / 2.0).abs() < 1e-3);
    }

    #[test]
    fn rasterize_scales_pixmap() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="20"><rect width="10" height="20" fill="#000"/></svg>"##;
        let pm = rasterize(svg, 2.0).expect("rasterize");
        assert_eq!((pm.width(), pm.height()), (20, 40));
        let rgb = flatten_rgb(&pm);
        assert_eq!(rgb.len(), 20 * 40 * 3);
        assert_eq!(&rgb[..3], &[0, 0, 0]);
    }

    #[test]
    fn rasterize_rejects_garbage() {
        assert!(matches!(rasterize("not svg", 1.0), Err(ExportError::Render(_))));
    }

    #[test]
    fn job_writes_pdf_file() {
        let dir = std::env::temp_dir().join(format!("gradecardd-export-unit-{}", Uuid::new_v4()));
        let cfg = ReportConfig {
            title: "Prueba Uno".into(),
            students: vec![StudentEntry {
                name: "Ana".into(),
                grade: Some(18),
            }],
            ..ReportConfig::default()
        };
        let settings = ExportSettings {
            raster_scale: 1.0,
            ..ExportSettings::default()
        };
        let job = ExportJob::spawn(build(&cfg), settings, dir.clone());
        assert_eq!(job.file_name, "Prueba_Uno_notas.pdf");
        let outcome = job.wait().expect("export");
        let bytes = std::fs::read(&outcome.path).expect("read pdf");
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(bytes.len(), outcome.bytes);
        let _ = std::fs::remove_dir_all(dir);
    }
}
