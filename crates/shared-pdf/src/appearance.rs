//! Appearance streams for widgets this crate creates or fills
//!
//! Every appearance is a Form XObject whose BBox spans the widget rect, so
//! flattening can place it with a plain translation.

use crate::text::escape_content_string;
use lopdf::{Dictionary, Object, Stream};

/// Resource name for the standard font used in appearances and `/DA`
pub const FONT_RESOURCE: &str = "Helv";
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Bezier control offset for a quarter circle of radius 1
const KAPPA: f64 = 0.5523;

pub fn helvetica() -> Dictionary {
    let mut font_dict = Dictionary::new();
    font_dict.set("Type", Object::Name(b"Font".to_vec()));
    font_dict.set("Subtype", Object::Name(b"Type1".to_vec()));
    font_dict.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    font_dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
    font_dict
}

/// Default appearance string for variable-text fields
pub fn default_appearance(font_size: Option<f64>) -> String {
    // Size 0 asks the viewer to auto-fit
    format!("/{} {} Tf 0 g", FONT_RESOURCE, font_size.unwrap_or(0.0))
}

fn form_xobject(width: f64, height: f64, content: String, resources: Option<Dictionary>) -> Stream {
    let content_bytes = content.into_bytes();
    let mut stream_dict = Dictionary::new();
    stream_dict.set("Type", Object::Name(b"XObject".to_vec()));
    stream_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    stream_dict.set("FormType", Object::Integer(1));
    stream_dict.set(
        "BBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(width as f32),
            Object::Real(height as f32),
        ]),
    );
    if let Some(resources) = resources {
        stream_dict.set("Resources", Object::Dictionary(resources));
    }
    stream_dict.set("Length", Object::Integer(content_bytes.len() as i64));
    Stream::new(stream_dict, content_bytes)
}

/// Filled-in text, one line per input line for multiline fields
pub fn text_appearance(
    width: f64,
    height: f64,
    text: &str,
    font_size: Option<f64>,
    multiline: bool,
) -> Stream {
    let font_size = font_size
        .filter(|size| *size > 0.0)
        .unwrap_or_else(|| (height * 0.7).clamp(6.0, DEFAULT_FONT_SIZE));
    let leading = font_size * 1.15;

    let mut body = String::new();
    if multiline {
        let top = height - 2.0 - font_size;
        body.push_str(&format!("2 {} Td\n", top));
        for (i, line) in text.lines().enumerate() {
            if i > 0 {
                body.push_str(&format!("0 -{} Td\n", leading));
            }
            body.push_str(&format!("({}) Tj\n", escape_content_string(line)));
        }
    } else {
        let baseline = ((height - font_size) / 2.0).max(1.0) + font_size * 0.2;
        body.push_str(&format!(
            "2 {} Td\n({}) Tj\n",
            baseline,
            escape_content_string(text)
        ));
    }

    let content = format!(
        "/Tx BMC\n\
q\n\
1 1 {w} {h} re W n\n\
BT\n\
/{font} {fs} Tf\n\
0 g\n\
{body}ET\n\
Q\n\
EMC",
        w = (width - 2.0).max(0.0),
        h = (height - 2.0).max(0.0),
        font = FONT_RESOURCE,
        fs = font_size,
        body = body,
    );

    let mut fonts = Dictionary::new();
    fonts.set(FONT_RESOURCE, Object::Dictionary(helvetica()));
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));

    form_xobject(width, height, content, Some(resources))
}

/// Checked state: bordered box with a check mark
pub fn checkbox_on(width: f64, height: f64) -> Stream {
    let content = format!(
        "q\n\
0 0 0 RG\n\
1 w\n\
0.5 0.5 {w2} {h2} re S\n\
{lw} w\n\
{x1} {y1} m\n\
{x2} {y2} l\n\
{x3} {y3} l\n\
S\n\
Q",
        w2 = width - 1.0,
        h2 = height - 1.0,
        lw = (width.min(height) * 0.1).max(1.0),
        x1 = width * 0.2,
        y1 = height * 0.5,
        x2 = width * 0.4,
        y2 = height * 0.25,
        x3 = width * 0.8,
        y3 = height * 0.8,
    );
    form_xobject(width, height, content, None)
}

/// Unchecked state: the empty box
pub fn checkbox_off(width: f64, height: f64) -> Stream {
    let content = format!(
        "q\n0 0 0 RG\n1 w\n0.5 0.5 {} {} re S\nQ",
        width - 1.0,
        height - 1.0
    );
    form_xobject(width, height, content, None)
}

fn circle_path(cx: f64, cy: f64, r: f64) -> String {
    let k = r * KAPPA;
    format!(
        "{x0} {cy} m\n\
{x0} {a} {b} {y1} {cx} {y1} c\n\
{c} {y1} {x1} {a} {x1} {cy} c\n\
{x1} {d} {c} {y0} {cx} {y0} c\n\
{b} {y0} {x0} {d} {x0} {cy} c\n",
        x0 = cx - r,
        x1 = cx + r,
        y0 = cy - r,
        y1 = cy + r,
        a = cy + k,
        b = cx - k,
        c = cx + k,
        d = cy - k,
        cx = cx,
        cy = cy,
    )
}

/// Radio state; `selected` adds the inner dot
pub fn radio(width: f64, height: f64, selected: bool) -> Stream {
    let r = (width.min(height) / 2.0 - 0.5).max(0.5);
    let (cx, cy) = (width / 2.0, height / 2.0);
    let mut content = format!("q\n0 0 0 RG\n1 w\n{}S\n", circle_path(cx, cy, r));
    if selected {
        content.push_str(&format!("0 g\n{}f\n", circle_path(cx, cy, r * 0.5)));
    }
    content.push('Q');
    form_xobject(width, height, content, None)
}

/// Signature placeholder: light fill with a border
pub fn signature_placeholder(width: f64, height: f64) -> Stream {
    let content = format!(
        "q\n\
0.9 0.95 1 rg\n\
0 0 {w} {h} re f\n\
0.2 0.4 0.8 RG\n\
1 w\n\
0.5 0.5 {w2} {h2} re S\n\
Q",
        w = width,
        h = height,
        w2 = width - 1.0,
        h2 = height - 1.0,
    );
    form_xobject(width, height, content, None)
}
