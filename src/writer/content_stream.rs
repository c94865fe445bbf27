//! Content stream builder.
//!
//! Emits graphics and text operators per ISO 32000-1:2008 Sections 8-9
//! through a fluent interface. Numbers are written without trailing
//! zeros to keep streams compact.

use std::fmt::Write;

/// Magic constant for approximating a quarter circle with a Bézier.
const CIRCLE_KAPPA: f32 = 0.552_284_8;

/// Fluent builder for page content.
#[derive(Debug, Clone, Default)]
pub struct ContentStreamBuilder {
    buf: String,
}

impl ContentStreamBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    fn op(&mut self, text: &str) -> &mut Self {
        self.buf.push_str(text);
        self.buf.push('\n');
        self
    }

    /// Save graphics state (q).
    pub fn save_state(&mut self) -> &mut Self {
        self.op("q")
    }

    /// Restore graphics state (Q).
    pub fn restore_state(&mut self) -> &mut Self {
        self.op("Q")
    }

    /// Select a named graphics state (gs).
    pub fn set_ext_gstate(&mut self, name: &str) -> &mut Self {
        let line = format!("/{} gs", name);
        self.op(&line)
    }

    /// Set RGB fill color (rg).
    pub fn set_fill_rgb(&mut self, r: f32, g: f32, b: f32) -> &mut Self {
        let line = format!("{} {} {} rg", num(r), num(g), num(b));
        self.op(&line)
    }

    /// Set RGB stroke color (RG).
    pub fn set_stroke_rgb(&mut self, r: f32, g: f32, b: f32) -> &mut Self {
        let line = format!("{} {} {} RG", num(r), num(g), num(b));
        self.op(&line)
    }

    /// Set line width (w).
    pub fn set_line_width(&mut self, width: f32) -> &mut Self {
        let line = format!("{} w", num(width));
        self.op(&line)
    }

    /// Append a rectangle to the path (re).
    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        let line = format!("{} {} {} {} re", num(x), num(y), num(width), num(height));
        self.op(&line)
    }

    /// Move to (m).
    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        let line = format!("{} {} m", num(x), num(y));
        self.op(&line)
    }

    /// Cubic Bézier (c).
    #[allow(clippy::too_many_arguments)]
    pub fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) -> &mut Self {
        let line = format!(
            "{} {} {} {} {} {} c",
            num(x1),
            num(y1),
            num(x2),
            num(y2),
            num(x3),
            num(y3)
        );
        self.op(&line)
    }

    /// Append a full circle to the path as four Bézier quarters.
    pub fn circle(&mut self, cx: f32, cy: f32, r: f32) -> &mut Self {
        let k = CIRCLE_KAPPA * r;
        self.move_to(cx + r, cy);
        self.curve_to(cx + r, cy + k, cx + k, cy + r, cx, cy + r);
        self.curve_to(cx - k, cy + r, cx - r, cy + k, cx - r, cy);
        self.curve_to(cx - r, cy - k, cx - k, cy - r, cx, cy - r);
        self.curve_to(cx + k, cy - r, cx + r, cy - k, cx + r, cy);
        self.op("h")
    }

    /// Fill the current path (f).
    pub fn fill(&mut self) -> &mut Self {
        self.op("f")
    }

    /// Stroke the current path (S).
    pub fn stroke(&mut self) -> &mut Self {
        self.op("S")
    }

    /// Fill and stroke the current path (B).
    pub fn fill_stroke(&mut self) -> &mut Self {
        self.op("B")
    }

    /// Begin a text object (BT).
    pub fn begin_text(&mut self) -> &mut Self {
        self.op("BT")
    }

    /// End a text object (ET).
    pub fn end_text(&mut self) -> &mut Self {
        self.op("ET")
    }

    /// Select font and size (Tf).
    pub fn set_font(&mut self, name: &str, size: f32) -> &mut Self {
        let line = format!("/{} {} Tf", name, num(size));
        self.op(&line)
    }

    /// Move the text position (Td).
    pub fn move_text(&mut self, tx: f32, ty: f32) -> &mut Self {
        let line = format!("{} {} Td", num(tx), num(ty));
        self.op(&line)
    }

    /// Show a text string (Tj), escaping as needed.
    pub fn show_text(&mut self, text: &str) -> &mut Self {
        let mut line = String::with_capacity(text.len() + 8);
        line.push('(');
        for b in text.bytes() {
            match b {
                b'\\' => line.push_str(r"\\"),
                b'(' => line.push_str(r"\("),
                b')' => line.push_str(r"\)"),
                0x20..=0x7E => line.push(b as char),
                other => {
                    let _ = write!(line, "\\{:03o}", other);
                },
            }
        }
        line.push_str(") Tj");
        self.op(&line)
    }

    /// Concatenate a matrix onto the CTM (cm).
    #[allow(clippy::too_many_arguments)]
    pub fn transform(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> &mut Self {
        let line = format!(
            "{} {} {} {} {} {} cm",
            num(a),
            num(b),
            num(c),
            num(d),
            num(e),
            num(f)
        );
        self.op(&line)
    }

    /// Paint a named XObject (Do).
    pub fn paint_xobject(&mut self, name: &str) -> &mut Self {
        let line = format!("/{} Do", name);
        self.op(&line)
    }

    /// Finish and return the stream bytes.
    pub fn build(&self) -> Vec<u8> {
        self.buf.as_bytes().to_vec()
    }

    /// True when nothing has been emitted.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// Format a number without trailing zeros.
fn num(v: f32) -> String {
    if v == v.trunc() && v.abs() < 1e9 {
        format!("{}", v as i64)
    } else {
        let s = format!("{:.3}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
