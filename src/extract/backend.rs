//! Page access abstraction.
//!
//! [`PageSource`] is everything the conversion pipeline needs from a PDF
//! document: page count, viewports, positioned text runs, a paint trace
//! and a page rasterization. [`LopdfBackend`] implements it on `lopdf`.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};
use unicode_normalization::UnicodeNormalization;

use super::glyph::{GlyphRun, Transform, Viewport};
use super::images::{Bitmap, PaintOp};
use super::raster::PageCanvas;
use crate::detect::sniff_bytes;
use crate::error::{Error, Result};

/// US Letter in points, used when a page has no usable MediaBox.
const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// Glyph advance used when a font carries no width table (thousandths of an em).
const DEFAULT_GLYPH_WIDTH: f32 = 500.0;

/// TJ adjustments wider than this (thousandths of an em) read as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 250.0;

/// How deep to follow `/Parent` links when looking for inherited attributes.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Source of per-page content for the conversion pipeline. Pages are 1-indexed.
pub trait PageSource {
    fn page_count(&self) -> u32;

    /// Viewport of a page rendered at `scale`.
    fn viewport(&self, page: u32, scale: f32) -> Result<Viewport>;

    /// Positioned text runs in content order.
    fn text_content(&self, page: u32) -> Result<Vec<GlyphRun>>;

    /// Ordered paint-operation trace.
    fn operator_list(&self, page: u32) -> Result<Vec<PaintOp>>;

    /// Rasterize the page into a bitmap covering `viewport`.
    fn rasterize(&self, page: u32, viewport: &Viewport) -> Result<Bitmap>;
}

/// Fallback text decoding: UTF-16BE with BOM, then UTF-8, then Latin-1.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return decode_utf16be(rest);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn decode_utf16be(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn resolve<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

fn resolve_dict<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Dictionary> {
    match resolve(doc, obj) {
        Object::Dictionary(d) => Some(d),
        Object::Stream(s) => Some(&s.dict),
        _ => None,
    }
}

/// Width table of a simple font.
#[derive(Debug, Clone, Default)]
struct FontMetrics {
    first_char: u32,
    widths: Vec<f32>,
    /// Type0 fonts use two-byte codes.
    two_byte: bool,
}

impl FontMetrics {
    fn from_dict(doc: &LopdfDocument, font: &Dictionary) -> Self {
        let two_byte = font
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .is_some_and(|n| n == b"Type0");
        let first_char = font
            .get(b"FirstChar")
            .ok()
            .and_then(|o| number(resolve(doc, o)))
            .map(|n| n.max(0.0) as u32)
            .unwrap_or(0);
        let widths = match font.get(b"Widths").map(|o| resolve(doc, o)) {
            Ok(Object::Array(arr)) => arr
                .iter()
                .map(|o| number(resolve(doc, o)).unwrap_or(DEFAULT_GLYPH_WIDTH))
                .collect(),
            _ => Vec::new(),
        };
        Self {
            first_char,
            widths,
            two_byte,
        }
    }

    fn glyph_width(&self, code: u32) -> f32 {
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .unwrap_or(DEFAULT_GLYPH_WIDTH)
    }

    fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.two_byte {
            bytes
                .chunks(2)
                .map(|c| c.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32))
                .collect()
        } else {
            bytes.iter().map(|&b| b as u32).collect()
        }
    }

    fn decode(&self, bytes: &[u8]) -> String {
        if self.two_byte {
            decode_utf16be(bytes)
        } else {
            decode_text_simple(bytes)
        }
    }
}

/// Text state between BT and ET plus the parameters that persist across them.
#[derive(Debug, Clone)]
struct TextState {
    matrix: Transform,
    line_matrix: Transform,
    font: FontMetrics,
    font_size: f32,
    leading: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scale: f32,
    rise: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            matrix: Transform::IDENTITY,
            line_matrix: Transform::IDENTITY,
            font: FontMetrics::default(),
            font_size: 0.0,
            leading: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            rise: 0.0,
        }
    }
}

impl TextState {
    fn begin(&mut self) {
        self.matrix = Transform::IDENTITY;
        self.line_matrix = Transform::IDENTITY;
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Transform::translation(tx, ty).then(&self.line_matrix);
        self.matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    /// Horizontal advance of a string in unscaled text space.
    fn advance(&self, bytes: &[u8]) -> f32 {
        self.font
            .codes(bytes)
            .into_iter()
            .map(|code| {
                let mut w = self.font.glyph_width(code) / 1000.0 * self.font_size + self.char_spacing;
                if code == 32 && !self.font.two_byte {
                    w += self.word_spacing;
                }
                w * self.horizontal_scale
            })
            .sum()
    }

    /// Render matrix for a glyph run starting at the current text position.
    fn run_matrix(&self, ctm: &Transform) -> Transform {
        Transform::new(
            self.font_size * self.horizontal_scale,
            0.0,
            0.0,
            self.font_size,
            0.0,
            self.rise,
        )
        .then(&self.matrix)
        .then(ctm)
    }

    fn advance_matrix(&mut self, tx: f32) {
        self.matrix = Transform::translation(tx, 0.0).then(&self.matrix);
    }
}

/// Everything one pass over a content stream produces.
#[derive(Debug, Default)]
struct PageTrace {
    runs: Vec<GlyphRun>,
    ops: Vec<PaintOp>,
    /// Image XObjects painted, with the CTM in force at the time.
    image_draws: Vec<(Vec<u8>, Transform)>,
}

impl PageTrace {
    fn push_run(&mut self, text: String, state: &TextState, ctm: &Transform, advance: f32) {
        let matrix = state.run_matrix(ctm);
        let page_space = Transform::IDENTITY.then(&state.matrix).then(ctm);
        let width = advance * page_space.font_size();
        let height = matrix.vertical_scale();
        let text: String = text.nfc().collect();
        self.runs.push(GlyphRun::new(text, matrix, width, height));
    }
}

/// [`PageSource`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
    pages: BTreeMap<u32, ObjectId>,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::load_bytes(&data)
    }

    /// Load from an in-memory buffer. Non-PDF input is rejected up front.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        sniff_bytes(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(Self::from_document(doc))
    }

    /// Wrap an already-loaded document.
    pub fn from_document(doc: LopdfDocument) -> Self {
        let pages = doc.get_pages();
        Self { doc, pages }
    }

    /// Direct access to the underlying document.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    /// PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Title from the Info dictionary, if any.
    pub fn title(&self) -> Option<String> {
        let info = self.doc.trailer.get(b"Info").ok()?;
        let info = resolve_dict(&self.doc, info)?;
        match info.get(b"Title").ok().map(|o| resolve(&self.doc, o)) {
            Some(Object::String(bytes, _)) => Some(decode_text_simple(bytes)),
            _ => None,
        }
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.pages
            .get(&page)
            .copied()
            .ok_or(Error::PageOutOfRange(page, self.pages.len() as u32))
    }

    /// Look up a page attribute, following `/Parent` for inherited ones.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut dict = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(value) = dict.get(key) {
                return Some(resolve(&self.doc, value));
            }
            let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
            dict = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn page_size(&self, page_id: ObjectId) -> (f32, f32) {
        let media_box = match self.inherited(page_id, b"MediaBox") {
            Some(Object::Array(arr)) if arr.len() >= 4 => arr
                .iter()
                .map(|o| number(resolve(&self.doc, o)))
                .collect::<Option<Vec<f32>>>(),
            _ => None,
        };
        match media_box {
            Some(b) if (b[2] - b[0]).abs() > 0.0 && (b[3] - b[1]).abs() > 0.0 => {
                ((b[2] - b[0]).abs(), (b[3] - b[1]).abs())
            }
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    fn resources(&self, page_id: ObjectId) -> Option<&Dictionary> {
        let res = self.inherited(page_id, b"Resources")?;
        resolve_dict(&self.doc, res)
    }

    fn fonts(&self, page_id: ObjectId) -> BTreeMap<Vec<u8>, FontMetrics> {
        let mut fonts = BTreeMap::new();
        let Some(font_dict) = self
            .resources(page_id)
            .and_then(|r| r.get(b"Font").ok())
            .and_then(|f| resolve_dict(&self.doc, f))
        else {
            return fonts;
        };
        for (name, obj) in font_dict.iter() {
            if let Some(font) = resolve_dict(&self.doc, obj) {
                fonts.insert(name.clone(), FontMetrics::from_dict(&self.doc, font));
            }
        }
        fonts
    }

    fn xobject(&self, page_id: ObjectId, name: &[u8]) -> Option<&Stream> {
        let xobjects = self
            .resources(page_id)
            .and_then(|r| r.get(b"XObject").ok())
            .and_then(|x| resolve_dict(&self.doc, x))?;
        match resolve(&self.doc, xobjects.get(name).ok()?) {
            Object::Stream(s) => Some(s),
            _ => None,
        }
    }

    fn trace(&self, page: u32) -> Result<PageTrace> {
        let page_id = self.page_id(page)?;
        let content = self.doc.get_page_content(page_id)?;
        let operations = lopdf::content::Content::decode(&content)?.operations;
        let fonts = self.fonts(page_id);

        let mut trace = PageTrace::default();
        let mut ctm = Transform::IDENTITY;
        let mut stack: Vec<Transform> = Vec::new();
        let mut text = TextState::default();

        for op in &operations {
            let nums: Vec<f32> = op.operands.iter().filter_map(number).collect();
            match op.operator.as_str() {
                "q" => stack.push(ctm),
                "Q" => ctm = stack.pop().unwrap_or(Transform::IDENTITY),
                "cm" if nums.len() == 6 => {
                    let m = Transform::new(nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]);
                    ctm = m.then(&ctm);
                }
                "BT" => text.begin(),
                "Tf" => {
                    if let Some(Object::Name(name)) = op.operands.first() {
                        text.font = fonts.get(name).cloned().unwrap_or_default();
                    }
                    if let Some(size) = op.operands.get(1).and_then(number) {
                        text.font_size = size;
                    }
                }
                "TL" if !nums.is_empty() => text.leading = nums[0],
                "Tc" if !nums.is_empty() => text.char_spacing = nums[0],
                "Tw" if !nums.is_empty() => text.word_spacing = nums[0],
                "Tz" if !nums.is_empty() => text.horizontal_scale = nums[0] / 100.0,
                "Ts" if !nums.is_empty() => text.rise = nums[0],
                "Td" if nums.len() == 2 => text.move_line(nums[0], nums[1]),
                "TD" if nums.len() == 2 => {
                    text.leading = -nums[1];
                    text.move_line(nums[0], nums[1]);
                }
                "Tm" if nums.len() == 6 => {
                    text.line_matrix =
                        Transform::new(nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]);
                    text.matrix = text.line_matrix;
                }
                "T*" => text.next_line(),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = op.operands.first() {
                        show_string(&mut trace, &mut text, &ctm, bytes);
                    }
                }
                "'" => {
                    text.next_line();
                    if let Some(Object::String(bytes, _)) = op.operands.first() {
                        show_string(&mut trace, &mut text, &ctm, bytes);
                    }
                }
                "\"" => {
                    if let (Some(aw), Some(ac)) = (
                        op.operands.first().and_then(number),
                        op.operands.get(1).and_then(number),
                    ) {
                        text.word_spacing = aw;
                        text.char_spacing = ac;
                    }
                    text.next_line();
                    if let Some(Object::String(bytes, _)) = op.operands.get(2) {
                        show_string(&mut trace, &mut text, &ctm, bytes);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = op.operands.first() {
                        show_array(&mut trace, &mut text, &ctm, items);
                    }
                }
                "Do" => {
                    if let Some(Object::Name(name)) = op.operands.first() {
                        self.paint_xobject(page_id, name, &ctm, &mut trace);
                    }
                }
                "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" => trace.ops.push(PaintOp::FillPath),
                "S" | "s" => trace.ops.push(PaintOp::StrokePath),
                _ => {}
            }
        }

        log::debug!(
            "Page {}: {} text runs, {} paint ops",
            page,
            trace.runs.len(),
            trace.ops.len()
        );
        Ok(trace)
    }

    fn paint_xobject(&self, page_id: ObjectId, name: &[u8], ctm: &Transform, trace: &mut PageTrace) {
        let label = String::from_utf8_lossy(name).to_string();
        let subtype = self
            .xobject(page_id, name)
            .and_then(|s| s.dict.get(b"Subtype").ok())
            .and_then(|o| o.as_name().ok());
        match subtype {
            Some(b"Image") => {
                trace.ops.push(PaintOp::PaintImageXObject { name: label });
                trace.image_draws.push((name.to_vec(), *ctm));
            }
            Some(b"Form") => trace.ops.push(PaintOp::PaintFormXObject { name: label }),
            _ => log::debug!("Ignoring unknown XObject /{}", label),
        }
    }

    /// Decode an image XObject into pixels, when its encoding is one we handle.
    fn decode_image(&self, stream: &Stream) -> Option<image::RgbaImage> {
        if filter_names(&stream.dict).iter().any(|f| f == "DCTDecode") {
            return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
                .ok()
                .map(|img| img.to_rgba8());
        }

        let dim = |key: &[u8]| {
            stream
                .dict
                .get(key)
                .ok()
                .and_then(|o| number(resolve(&self.doc, o)))
                .map(|n| n as u32)
        };
        let (width, height) = (dim(b"Width")?, dim(b"Height")?);
        if dim(b"BitsPerComponent").unwrap_or(8) != 8 {
            return None;
        }
        let color_space = match stream.dict.get(b"ColorSpace").map(|o| resolve(&self.doc, o)) {
            Ok(Object::Name(n)) => n.clone(),
            _ => b"DeviceRGB".to_vec(),
        };
        let data = stream.decompressed_content().unwrap_or_else(|_| stream.content.clone());

        let dynamic = match color_space.as_slice() {
            b"DeviceGray" => image::GrayImage::from_raw(width, height, data)
                .map(image::DynamicImage::ImageLuma8),
            b"DeviceRGB" => {
                image::RgbImage::from_raw(width, height, data).map(image::DynamicImage::ImageRgb8)
            }
            _ => None,
        };
        dynamic.map(|img| img.to_rgba8())
    }
}

fn filter_names(dict: &Dictionary) -> Vec<String> {
    match dict.get(b"Filter") {
        Ok(Object::Name(n)) => vec![String::from_utf8_lossy(n).to_string()],
        Ok(Object::Array(arr)) => arr
            .iter()
            .filter_map(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .collect(),
        _ => Vec::new(),
    }
}

fn show_string(trace: &mut PageTrace, text: &mut TextState, ctm: &Transform, bytes: &[u8]) {
    let advance = text.advance(bytes);
    trace.push_run(text.font.decode(bytes), text, ctm, advance);
    trace.ops.push(PaintOp::ShowText);
    text.advance_matrix(advance);
}

/// `TJ`: one run for the whole array; large negative kerns become spaces.
fn show_array(trace: &mut PageTrace, text: &mut TextState, ctm: &Transform, items: &[Object]) {
    let start = text.clone();
    let mut content = String::new();
    let mut advance = 0.0;

    for item in items {
        match item {
            Object::String(bytes, _) => {
                content.push_str(&text.font.decode(bytes));
                advance += text.advance(bytes);
            }
            other => {
                if let Some(adjust) = number(other) {
                    if -adjust > TJ_SPACE_THRESHOLD && !content.ends_with(' ') {
                        content.push(' ');
                    }
                    advance -= adjust / 1000.0 * text.font_size * text.horizontal_scale;
                }
            }
        }
    }

    if !content.is_empty() {
        trace.push_run(content, &start, ctm, advance);
        trace.ops.push(PaintOp::ShowText);
    }
    text.advance_matrix(advance);
}

impl PageSource for LopdfBackend {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn viewport(&self, page: u32, scale: f32) -> Result<Viewport> {
        let (width, height) = self.page_size(self.page_id(page)?);
        Ok(Viewport::for_page(width, height, scale))
    }

    fn text_content(&self, page: u32) -> Result<Vec<GlyphRun>> {
        Ok(self.trace(page)?.runs)
    }

    fn operator_list(&self, page: u32) -> Result<Vec<PaintOp>> {
        Ok(self.trace(page)?.ops)
    }

    fn rasterize(&self, page: u32, viewport: &Viewport) -> Result<Bitmap> {
        let page_id = self.page_id(page)?;
        let trace = self.trace(page)?;
        let mut canvas = PageCanvas::new(*viewport)?;

        for (name, ctm) in &trace.image_draws {
            let decoded = self.xobject(page_id, name).and_then(|s| self.decode_image(s));
            match decoded {
                Some(img) => canvas.draw_image(&img, ctm),
                None => log::debug!(
                    "Page {}: image /{} uses an unsupported encoding, left blank",
                    page,
                    String::from_utf8_lossy(name)
                ),
            }
        }

        Ok(canvas.into_bitmap())
    }
}
