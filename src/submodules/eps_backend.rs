//! Encapsulated PostScript output for plotters.
//!
//! Drawing happens in pixel coordinates; the document scales them to points
//! at `72 / dpi` so a figure keeps its physical size in both PNG and EPS.

use std::path::{Path, PathBuf};

use plotters_backend::{
    text_anchor::{HPos, VPos},
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend, DrawingErrorKind, FontStyle, FontTransform,
};

type EpsResult = Result<(), DrawingErrorKind<std::io::Error>>;

const FONT_REGULAR: &str = "/Helvetica-L1";
const FONT_BOLD: &str = "/Helvetica-Bold-L1";
// Average Helvetica advance width, in em.
const AVG_CHAR_WIDTH: f64 = 0.55;

pub struct EpsBackend {
    path: PathBuf,
    size: (u32, u32),
    scale: f64,
    body: String,
    saved: bool,
}

impl EpsBackend {
    pub fn new<P: AsRef<Path>>(path: P, size: (u32, u32), dpi: f64) -> Self {
        EpsBackend {
            path: path.as_ref().to_path_buf(),
            size,
            scale: 72.0 / dpi,
            body: String::new(),
            saved: false,
        }
    }

    fn emit(&mut self, line: &str) {
        self.body.push_str(line);
        self.body.push('\n');
    }

    fn ps_point(&self, (x, y): BackendCoord) -> (i32, i32) {
        (x, self.size.1 as i32 - y)
    }

    /// Sets color and line width; returns false when the color is fully transparent.
    fn set_style(&mut self, color: BackendColor, width: u32) -> bool {
        if color.alpha <= 0.0 {
            return false;
        }
        let (r, g, b) = blend_on_white(color);
        self.emit(&format!("{:.4} {:.4} {:.4} setrgbcolor {} setlinewidth", r, g, b, width.max(1)));
        true
    }

    fn trace<I: IntoIterator<Item = BackendCoord>>(&mut self, points: I) -> usize {
        let mut count = 0;
        let mut path = String::from("newpath");
        for point in points {
            let (x, y) = self.ps_point(point);
            let op = if count == 0 { "moveto" } else { "lineto" };
            path.push_str(&format!(" {} {} {}", x, y, op));
            count += 1;
        }
        if count > 0 {
            self.emit(&path);
        }
        count
    }

    pub fn document(&self) -> String {
        let (w, h) = self.size;
        let bbox = ((w as f64 * self.scale).ceil() as u32, (h as f64 * self.scale).ceil() as u32);
        let mut doc = String::new();
        doc.push_str("%!PS-Adobe-3.0 EPSF-3.0\n");
        doc.push_str(&format!("%%BoundingBox: 0 0 {} {}\n", bbox.0, bbox.1));
        doc.push_str("%%Creator: sod-compare\n");
        doc.push_str("%%Pages: 1\n");
        doc.push_str("%%EndComments\n");
        doc.push_str("%%BeginProlog\n");
        doc.push_str("/reencode { findfont dup length dict begin { 1 index /FID ne { def } { pop pop } ifelse } forall /Encoding ISOLatin1Encoding def currentdict end definefont pop } bind def\n");
        doc.push_str(&format!("{} /Helvetica reencode\n", FONT_REGULAR));
        doc.push_str(&format!("{} /Helvetica-Bold reencode\n", FONT_BOLD));
        doc.push_str("%%EndProlog\n");
        doc.push_str("%%Page: 1 1\n");
        doc.push_str("gsave\n");
        doc.push_str(&format!("{:.6} {:.6} scale\n", self.scale, self.scale));
        doc.push_str("1 setlinejoin 1 setlinecap\n");
        doc.push_str(&self.body);
        doc.push_str("grestore\n");
        doc.push_str("showpage\n");
        doc.push_str("%%EOF\n");
        doc
    }
}

fn blend_on_white(color: BackendColor) -> (f64, f64, f64) {
    let alpha = color.alpha.clamp(0.0, 1.0);
    let blend = |c: u8| 1.0 - alpha * (1.0 - c as f64 / 255.0);
    (blend(color.rgb.0), blend(color.rgb.1), blend(color.rgb.2))
}

/// PostScript string literal in ISO Latin-1.
fn ps_string(text: &str) -> String {
    let mut out = String::from("(");
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            '\u{a0}'..='\u{ff}' => out.push_str(&format!("\\{:03o}", c as u32)),
            _ => out.push('?'),
        }
    }
    out.push(')');
    out
}

impl DrawingBackend for EpsBackend {
    type ErrorType = std::io::Error;

    fn get_size(&self) -> (u32, u32) {
        self.size
    }

    fn ensure_prepared(&mut self) -> EpsResult {
        Ok(())
    }

    fn present(&mut self) -> EpsResult {
        std::fs::write(&self.path, self.document()).map_err(DrawingErrorKind::DrawingError)?;
        self.saved = true;
        Ok(())
    }

    fn draw_pixel(&mut self, point: BackendCoord, color: BackendColor) -> EpsResult {
        if self.set_style(color, 1) {
            let (x, y) = self.ps_point(point);
            self.emit(&format!("{} {} 1 1 rectfill", x, y - 1));
        }
        Ok(())
    }

    fn draw_line<S: BackendStyle>(&mut self, from: BackendCoord, to: BackendCoord, style: &S) -> EpsResult {
        if self.set_style(style.color(), style.stroke_width()) {
            self.trace([from, to]);
            self.emit("stroke");
        }
        Ok(())
    }

    fn draw_rect<S: BackendStyle>(&mut self, upper_left: BackendCoord, bottom_right: BackendCoord, style: &S, fill: bool) -> EpsResult {
        if self.set_style(style.color(), style.stroke_width()) {
            let (x0, y0) = self.ps_point((upper_left.0, bottom_right.1));
            let (w, h) = (bottom_right.0 - upper_left.0, bottom_right.1 - upper_left.1);
            let op = if fill { "rectfill" } else { "rectstroke" };
            self.emit(&format!("{} {} {} {} {}", x0, y0, w, h, op));
        }
        Ok(())
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(&mut self, path: I, style: &S) -> EpsResult {
        if self.set_style(style.color(), style.stroke_width()) && self.trace(path) > 0 {
            self.emit("stroke");
        }
        Ok(())
    }

    fn draw_circle<S: BackendStyle>(&mut self, center: BackendCoord, radius: u32, style: &S, fill: bool) -> EpsResult {
        if self.set_style(style.color(), style.stroke_width()) {
            let (x, y) = self.ps_point(center);
            let op = if fill { "fill" } else { "stroke" };
            self.emit(&format!("newpath {} {} {} 0 360 arc closepath {}", x, y, radius, op));
        }
        Ok(())
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(&mut self, vert: I, style: &S) -> EpsResult {
        if self.set_style(style.color(), style.stroke_width()) && self.trace(vert) > 0 {
            self.emit("closepath fill");
        }
        Ok(())
    }

    fn draw_text<TStyle: BackendTextStyle>(&mut self, text: &str, style: &TStyle, pos: BackendCoord) -> EpsResult {
        if text.is_empty() || !self.set_style(style.color(), 1) {
            return Ok(());
        }
        let size = style.size();
        let font = match style.style() {
            FontStyle::Bold => FONT_BOLD,
            _ => FONT_REGULAR,
        };
        // plotters rotates clockwise on a y-down canvas
        let rotation = match style.transform() {
            FontTransform::None => 0,
            FontTransform::Rotate90 => -90,
            FontTransform::Rotate180 => 180,
            FontTransform::Rotate270 => 90,
        };
        let anchor = style.anchor();
        let h_factor = match anchor.h_pos {
            HPos::Left => 0.0,
            HPos::Center => -0.5,
            HPos::Right => -1.0,
        };
        let baseline = match anchor.v_pos {
            VPos::Top => -0.75 * size,
            VPos::Center => -0.35 * size,
            VPos::Bottom => 0.2 * size,
        };
        let (x, y) = self.ps_point(pos);
        self.emit(&format!(
            "gsave {} {} translate {} rotate {} findfont {:.2} scalefont setfont {} dup stringwidth pop {} mul {:.2} moveto show grestore",
            x,
            y,
            rotation,
            font,
            size,
            ps_string(text),
            h_factor,
            baseline
        ));
        Ok(())
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(&self, text: &str, style: &TStyle) -> Result<(u32, u32), DrawingErrorKind<Self::ErrorType>> {
        let size = style.size();
        let width = (text.chars().count() as f64 * AVG_CHAR_WIDTH * size).ceil() as u32;
        let height = size.ceil() as u32;
        Ok(match style.transform() {
            FontTransform::Rotate90 | FontTransform::Rotate270 => (height, width),
            _ => (width, height),
        })
    }
}

impl Drop for EpsBackend {
    fn drop(&mut self) {
        if !self.saved {
            log::warn!("{} was never presented, not written", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotters::prelude::*;
    use tempfile::tempdir;

    #[test]
    fn test_ps_string_escapes() {
        assert_eq!(ps_string("a(b)c\\"), "(a\\(b\\)c\\\\)");
        assert_eq!(ps_string("×10^6"), "(\\32710^6)");
        assert_eq!(ps_string("日"), "(?)");
    }

    #[test]
    fn test_blend_on_white() {
        let (r, g, b) = blend_on_white(BackendColor { alpha: 0.5, rgb: (0, 255, 0) });
        assert!((r - 0.5).abs() < 1e-12);
        assert!((g - 1.0).abs() < 1e-12);
        assert!((b - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_document_header_and_scale() {
        let dir = tempdir().unwrap();
        let backend = EpsBackend::new(dir.path().join("empty.eps"), (700, 900), 100.0);
        let doc = backend.document();
        assert!(doc.starts_with("%!PS-Adobe-3.0 EPSF-3.0\n"));
        assert!(doc.contains("%%BoundingBox: 0 0 504 648\n"));
        assert!(doc.contains("0.720000 0.720000 scale"));
        assert!(doc.ends_with("%%EOF\n"));
    }

    #[test]
    fn test_draw_primitives_flip_y() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prims.eps");
        let mut backend = EpsBackend::new(&path, (100, 50), 72.0);
        backend.draw_line((0, 0), (10, 10), &Color::stroke_width(&BLACK, 1)).unwrap();
        backend.draw_circle((20, 20), 3, &RED.filled(), true).unwrap();
        backend.draw_rect((1, 2), (11, 12), &Color::stroke_width(&BLUE, 1), false).unwrap();
        backend.draw_line((0, 0), (5, 5), &Color::stroke_width(&TRANSPARENT, 1)).unwrap();
        backend.present().unwrap();

        let doc = std::fs::read_to_string(&path).unwrap();
        assert!(doc.contains("newpath 0 50 moveto 10 40 lineto\nstroke"));
        assert!(doc.contains("newpath 20 30 3 0 360 arc closepath fill"));
        assert!(doc.contains("1 38 10 10 rectstroke"));
        assert_eq!(doc.matches("\nstroke\n").count(), 1);
    }

    #[test]
    fn test_unpresented_backend_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.eps");
        {
            let mut backend = EpsBackend::new(&path, (100, 50), 72.0);
            backend.draw_line((0, 0), (10, 10), &Color::stroke_width(&BLACK, 1)).unwrap();
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_chart_renders_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chart.eps");
        {
            let root = EpsBackend::new(&path, (300, 200), 100.0).into_drawing_area();
            root.fill(&WHITE).unwrap();
            let mut chart = ChartBuilder::on(&root)
                .margin(5)
                .x_label_area_size(30)
                .y_label_area_size(30)
                .build_cartesian_2d(0.0..1.0, 0.0..1.0)
                .unwrap();
            chart.configure_mesh().x_desc("x").draw().unwrap();
            chart.draw_series(LineSeries::new(vec![(0.0, 0.0), (1.0, 1.0)], &RED)).unwrap();
            root.present().unwrap();
        }
        let doc = std::fs::read_to_string(&path).unwrap();
        assert!(doc.contains("show grestore"));
        assert!(doc.contains("1.0000 0.0000 0.0000 setrgbcolor"));
    }
}
