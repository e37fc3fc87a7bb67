//! Grade card: the report view built from a report configuration, and its
//! SVG rendering (the document the export step rasterizes).

use crate::grading::{self, Band, GradeScale, LegendEntry};
use crate::logo::Logo;
use crate::roster::StudentEntry;
use serde::Serialize;
use std::fmt::Write;

pub const DEFAULT_TITLE: &str = "Práctica de Matemáticas";
pub const DEFAULT_SUBTITLE: &str = "Semilleros 2 - Primera Evaluación";
pub const LOGO_PLACEHOLDER: &str = "Tu Logo";

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub title: String,
    pub subtitle: String,
    pub scale: GradeScale,
    pub logo: Option<Logo>,
    /// Id-less roster snapshot pushed by the session after every mutation.
    pub students: Vec<StudentEntry>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            subtitle: DEFAULT_SUBTITLE.to_string(),
            scale: GradeScale::default(),
            logo: None,
            students: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub position: usize,
    pub name: String,
    pub grade: Option<i64>,
    pub badge: String,
    pub band: Band,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum LogoSlot {
    Image {
        #[serde(rename = "dataUrl")]
        data_url: String,
    },
    Placeholder {
        text: &'static str,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportModel {
    pub title: String,
    pub subtitle: String,
    pub scale: GradeScale,
    pub logo: LogoSlot,
    pub rows: Vec<ReportRow>,
    pub total: usize,
    pub legend: &'static [LegendEntry],
}

pub fn build(config: &ReportConfig) -> ReportModel {
    let rows = config
        .students
        .iter()
        .enumerate()
        .map(|(i, s)| ReportRow {
            position: i + 1,
            name: s.name.clone(),
            grade: s.grade,
            badge: grading::card_badge(config.scale, s.grade()),
            band: grading::classify(config.scale, s.grade()),
        })
        .collect::<Vec<_>>();
    let logo = match &config.logo {
        Some(l) => LogoSlot::Image {
            data_url: l.data_url.clone(),
        },
        None => LogoSlot::Placeholder {
            text: LOGO_PLACEHOLDER,
        },
    };
    ReportModel {
        title: config.title.clone(),
        subtitle: config.subtitle.clone(),
        scale: config.scale,
        logo,
        total: rows.len(),
        rows,
        legend: grading::legend(config.scale),
    }
}

const CARD_WIDTH: f32 = 672.0;
const PAD: f32 = 24.0;
const HEADER_HEIGHT: f32 = 128.0;
const LOGO_SIZE: f32 = 80.0;
const TABLE_HEAD_HEIGHT: f32 = 44.0;
const ROW_HEIGHT: f32 = 56.0;
const GRADE_COL_WIDTH: f32 = 180.0;
const FOOTER_HEIGHT: f32 = 76.0;

const NAVY: &str = "#1e2a4a";
const GOLD: &str = "#d9ac26";
const GOLD_LIGHT: &str = "#e8cd7d";
const BORDER: &str = "#e2e8f0";
const MUTED: &str = "#f1f5f9";
const MUTED_TEXT: &str = "#64748b";
const FOREGROUND: &str = "#0f172a";

impl ReportModel {
    /// Card size in CSS pixels.
    pub fn size(&self) -> (f32, f32) {
        let table = TABLE_HEAD_HEIGHT + ROW_HEIGHT * self.rows.len() as f32;
        (
            CARD_WIDTH,
            HEADER_HEIGHT + PAD + table + FOOTER_HEIGHT + PAD,
        )
    }

    /// Renders the card. Output depends only on the model.
    pub fn render_svg(&self) -> String {
        let (w, h) = self.size();
        let mut svg = String::with_capacity(4096 + self.rows.len() * 512);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">"
        );
        let _ = write!(
            svg,
            "<rect width=\"{w}\" height=\"{h}\" rx=\"12\" fill=\"#ffffff\" stroke=\"{BORDER}\"/>"
        );
        self.render_header(&mut svg);
        let table_bottom = self.render_table(&mut svg);
        self.render_footer(&mut svg, table_bottom + PAD);
        svg.push_str("</svg>");
        svg
    }

    fn render_header(&self, svg: &mut String) {
        let _ = write!(
            svg,
            "<path d=\"M12,0 H{r} A12,12 0 0 1 {w},12 V{HEADER_HEIGHT} H0 V12 A12,12 0 0 1 12,0 Z\" fill=\"{NAVY}\"/>",
            r = CARD_WIDTH - 12.0,
            w = CARD_WIDTH,
        );
        // gold accent along the bottom edge of the banner
        let _ = write!(
            svg,
            "<defs><linearGradient id=\"accent\" x1=\"0\" x2=\"1\" y1=\"0\" y2=\"0\">\
             <stop offset=\"0\" stop-color=\"{GOLD}\" stop-opacity=\"0\"/>\
             <stop offset=\"0.5\" stop-color=\"{GOLD}\" stop-opacity=\"0.6\"/>\
             <stop offset=\"1\" stop-color=\"{GOLD}\" stop-opacity=\"0\"/>\
             </linearGradient></defs>\
             <rect x=\"0\" y=\"{y}\" width=\"{CARD_WIDTH}\" height=\"4\" fill=\"url(#accent)\"/>",
            y = HEADER_HEIGHT - 4.0,
        );

        match &self.logo {
            LogoSlot::Image { data_url } => {
                let _ = write!(
                    svg,
                    "<rect x=\"{PAD}\" y=\"{PAD}\" width=\"{LOGO_SIZE}\" height=\"{LOGO_SIZE}\" rx=\"8\" fill=\"#ffffff\"/>\
                     <image x=\"{PAD}\" y=\"{PAD}\" width=\"{LOGO_SIZE}\" height=\"{LOGO_SIZE}\" preserveAspectRatio=\"xMidYMid meet\" href=\"{}\"/>",
                    escape_xml(data_url),
                );
            }
            LogoSlot::Placeholder { text } => {
                let cx = PAD + LOGO_SIZE / 2.0;
                let cy = PAD + LOGO_SIZE / 2.0 + 4.0;
                let _ = write!(
                    svg,
                    "<rect x=\"{PAD}\" y=\"{PAD}\" width=\"{LOGO_SIZE}\" height=\"{LOGO_SIZE}\" rx=\"8\" fill=\"#ffffff\" fill-opacity=\"0.1\" stroke=\"{GOLD}\" stroke-opacity=\"0.4\" stroke-width=\"2\"/>\
                     <text x=\"{cx}\" y=\"{cy}\" font-size=\"12\" font-weight=\"500\" fill=\"{GOLD}\" fill-opacity=\"0.6\" text-anchor=\"middle\" font-family=\"sans-serif\">{}</text>",
                    escape_xml(text),
                );
            }
        }

        let tx = PAD + LOGO_SIZE + PAD;
        let _ = write!(
            svg,
            "<text x=\"{tx}\" y=\"{ty}\" font-size=\"24\" font-weight=\"700\" fill=\"#ffffff\" font-family=\"serif\">{}</text>\
             <text x=\"{tx}\" y=\"{sy}\" font-size=\"16\" font-weight=\"300\" fill=\"{GOLD_LIGHT}\" font-family=\"sans-serif\">{}</text>",
            escape_xml(&self.title),
            escape_xml(&self.subtitle),
            ty = PAD + 28.0,
            sy = PAD + 56.0,
        );
    }

    /// Returns the y coordinate of the table's bottom edge.
    fn render_table(&self, svg: &mut String) -> f32 {
        let x = PAD;
        let top = HEADER_HEIGHT + PAD;
        let width = CARD_WIDTH - 2.0 * PAD;
        let split = x + width - GRADE_COL_WIDTH;
        let grade_center = split + GRADE_COL_WIDTH / 2.0;
        let height = TABLE_HEAD_HEIGHT + ROW_HEIGHT * self.rows.len() as f32;

        let _ = write!(
            svg,
            "<rect x=\"{x}\" y=\"{top}\" width=\"{width}\" height=\"{TABLE_HEAD_HEIGHT}\" fill=\"{MUTED}\"/>\
             <text x=\"{nx}\" y=\"{hy}\" font-size=\"14\" font-weight=\"600\" letter-spacing=\"1\" fill=\"{NAVY}\" font-family=\"sans-serif\">ESTUDIANTE</text>\
             <text x=\"{grade_center}\" y=\"{hy}\" font-size=\"14\" font-weight=\"600\" letter-spacing=\"1\" fill=\"{NAVY}\" text-anchor=\"middle\" font-family=\"sans-serif\">CALIFICACIÓN</text>",
            nx = x + 20.0,
            hy = top + 27.0,
        );

        for (i, row) in self.rows.iter().enumerate() {
            let ry = top + TABLE_HEAD_HEIGHT + ROW_HEIGHT * i as f32;
            let _ = write!(
                svg,
                "<line x1=\"{x}\" y1=\"{ry}\" x2=\"{x2}\" y2=\"{ry}\" stroke=\"{BORDER}\"/>\
                 <text x=\"{nx}\" y=\"{ty}\" font-size=\"16\" font-weight=\"500\" fill=\"{FOREGROUND}\" font-family=\"sans-serif\">{}</text>",
                escape_xml(&row.name),
                x2 = x + width,
                nx = x + 20.0,
                ty = ry + 33.0,
            );
            let badge_w = badge_width(&row.badge);
            let _ = write!(
                svg,
                "<rect x=\"{bx}\" y=\"{by}\" width=\"{badge_w}\" height=\"28\" rx=\"14\" fill=\"{bg}\"/>\
                 <text x=\"{grade_center}\" y=\"{ty}\" font-size=\"14\" font-weight=\"600\" fill=\"{fg}\" text-anchor=\"middle\" font-family=\"sans-serif\">{}</text>",
                escape_xml(&row.badge),
                bx = grade_center - badge_w / 2.0,
                by = ry + 14.0,
                bg = row.band.background,
                fg = row.band.color,
                ty = ry + 33.0,
            );
        }

        let _ = write!(
            svg,
            "<line x1=\"{split}\" y1=\"{top}\" x2=\"{split}\" y2=\"{bottom}\" stroke=\"{BORDER}\"/>\
             <rect x=\"{x}\" y=\"{top}\" width=\"{width}\" height=\"{height}\" rx=\"8\" fill=\"none\" stroke=\"{BORDER}\"/>",
            bottom = top + height,
        );
        top + height
    }

    fn render_footer(&self, svg: &mut String, top: f32) {
        let x = PAD;
        let width = CARD_WIDTH - 2.0 * PAD;
        let _ = write!(
            svg,
            "<line x1=\"{x}\" y1=\"{top}\" x2=\"{x2}\" y2=\"{top}\" stroke=\"{BORDER}\"/>\
             <text x=\"{x}\" y=\"{ty}\" font-size=\"14\" fill=\"{MUTED_TEXT}\" font-family=\"sans-serif\">Total de estudiantes: <tspan font-weight=\"600\" fill=\"{FOREGROUND}\">{}</tspan></text>",
            self.total,
            x2 = x + width,
            ty = top + 28.0,
        );

        let ly = top + 56.0;
        let mut lx = x;
        for entry in self.legend {
            let caption = entry.caption();
            let _ = write!(
                svg,
                "<circle cx=\"{cx}\" cy=\"{cy}\" r=\"4\" fill=\"{}\"/>\
                 <text x=\"{tx}\" y=\"{ly}\" font-size=\"12\" fill=\"{MUTED_TEXT}\" font-family=\"sans-serif\">{}</text>",
                entry.dot_color,
                escape_xml(&caption),
                cx = lx + 4.0,
                cy = ly - 4.0,
                tx = lx + 14.0,
            );
            lx += 14.0 + caption.chars().count() as f32 * 6.5 + 16.0;
        }
    }
}

fn badge_width(text: &str) -> f32 {
    text.chars().count() as f32 * 8.5 + 24.0
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
