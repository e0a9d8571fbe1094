//! PowerPoint (`.pptx`) writer.
//!
//! Produces a minimal OOXML package: one master, one blank layout, one
//! theme and a slide part per [`SlideSpec`]. Embedded images are stored
//! once per distinct buffer under `ppt/media/`; remote images are linked.

use std::fmt::Write as _;
use std::io::{Cursor, Seek, Write};

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::escape::escape;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::presentation::{
    BackgroundImage, Crop, Frame, ImageBox, PresentationSpec, Shape, SlideSpec, TextBox,
    SLIDE_HEIGHT_IN, SLIDE_WIDTH_IN,
};
use crate::error::{Error, Result};
use crate::model::{Alignment, ImagePayload, ImageSource, VerticalAlign};

const EMU_PER_INCH: f32 = 914_400.0;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

fn emu(inches: f32) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

/// `presentation_<unix millis>.pptx`
pub fn default_file_name() -> String {
    file_name_at(Utc::now())
}

pub fn file_name_at(time: DateTime<Utc>) -> String {
    format!("presentation_{}.pptx", time.timestamp_millis())
}

/// Write `spec` as a `.pptx` package.
pub fn write_pptx<W: Write + Seek>(spec: &PresentationSpec, writer: W) -> Result<W> {
    if spec.slides.is_empty() {
        return Err(Error::EmptyInput("No slides to export".to_string()));
    }
    let package = Package::build(spec);

    let mut zip = ZipWriter::new(writer);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, bytes) in &package.parts {
        zip.start_file(name.as_str(), options)?;
        zip.write_all(bytes)?;
    }
    Ok(zip.finish()?)
}

/// Render `spec` into memory, so a failure never leaves a partial file.
pub fn to_pptx_bytes(spec: &PresentationSpec) -> Result<Vec<u8>> {
    let cursor = write_pptx(spec, Cursor::new(Vec::new()))?;
    Ok(cursor.into_inner())
}

/// Media parts shared across the package.
#[derive(Default)]
struct MediaStore {
    entries: Vec<(ImagePayload, String)>,
}

impl MediaStore {
    /// Package path of `payload`, adding it on first use.
    fn path_for(&mut self, payload: &ImagePayload) -> String {
        if let Some((_, path)) = self.entries.iter().find(|(p, _)| p.shares_buffer(payload)) {
            return path.clone();
        }
        let path = format!(
            "ppt/media/image{}.{}",
            self.entries.len() + 1,
            payload.extension()
        );
        self.entries.push((payload.clone(), path.clone()));
        path
    }
}

/// Relationships of one slide part.
struct SlideRels {
    entries: Vec<String>,
}

impl SlideRels {
    fn new() -> Self {
        let layout = format!(
            r#"<Relationship Id="rId1" Type="{}/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>"#,
            REL_BASE
        );
        Self {
            entries: vec![layout],
        }
    }

    /// Add an image relationship; returns its id and whether it is linked.
    fn image(&mut self, source: &ImageSource, media: &mut MediaStore) -> (String, bool) {
        let id = format!("rId{}", self.entries.len() + 1);
        let (target, external) = match source {
            ImageSource::Embedded(payload) => {
                let path = media.path_for(payload);
                (format!("../{}", path.trim_start_matches("ppt/")), false)
            }
            ImageSource::Remote { url } => (url.clone(), true),
        };
        let mode = if external { r#" TargetMode="External""# } else { "" };
        self.entries.push(format!(
            r#"<Relationship Id="{}" Type="{}/image" Target="{}"{}/>"#,
            id,
            REL_BASE,
            escape(target.as_str()),
            mode
        ));
        (id, external)
    }

    fn to_xml(&self) -> String {
        format!(
            r#"{}<Relationships xmlns="{}">{}</Relationships>"#,
            XML_DECL,
            NS_REL,
            self.entries.concat()
        )
    }
}

/// All parts of the package, in write order.
struct Package {
    parts: Vec<(String, Vec<u8>)>,
}

impl Package {
    fn build(spec: &PresentationSpec) -> Self {
        let mut parts = Vec::new();
        let mut media = MediaStore::default();
        let count = spec.slides.len();

        let mut slide_parts = Vec::with_capacity(count * 2);
        for (index, slide) in spec.slides.iter().enumerate() {
            let number = index + 1;
            let mut rels = SlideRels::new();
            let xml = slide_xml(slide, &mut rels, &mut media);
            slide_parts.push((format!("ppt/slides/slide{}.xml", number), xml.into_bytes()));
            slide_parts.push((
                format!("ppt/slides/_rels/slide{}.xml.rels", number),
                rels.to_xml().into_bytes(),
            ));
        }

        parts.push(("[Content_Types].xml".to_string(), content_types(count).into_bytes()));
        parts.push(("_rels/.rels".to_string(), root_rels().into_bytes()));
        parts.push(("docProps/core.xml".to_string(), core_xml(spec).into_bytes()));
        parts.push(("docProps/app.xml".to_string(), app_xml(count).into_bytes()));
        parts.push(("ppt/presentation.xml".to_string(), presentation_xml(count).into_bytes()));
        parts.push((
            "ppt/_rels/presentation.xml.rels".to_string(),
            presentation_rels(count).into_bytes(),
        ));
        parts.push((
            "ppt/slideMasters/slideMaster1.xml".to_string(),
            SLIDE_MASTER.as_bytes().to_vec(),
        ));
        parts.push((
            "ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(),
            SLIDE_MASTER_RELS.as_bytes().to_vec(),
        ));
        parts.push((
            "ppt/slideLayouts/slideLayout1.xml".to_string(),
            SLIDE_LAYOUT.as_bytes().to_vec(),
        ));
        parts.push((
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels".to_string(),
            SLIDE_LAYOUT_RELS.as_bytes().to_vec(),
        ));
        parts.push(("ppt/theme/theme1.xml".to_string(), THEME.as_bytes().to_vec()));
        parts.extend(slide_parts);
        for (payload, path) in media.entries {
            parts.push((path, payload.bytes().to_vec()));
        }

        log::debug!("pptx package with {} slides, {} parts", count, parts.len());
        Self { parts }
    }
}

fn content_types(slides: usize) -> String {
    let mut xml = format!(
        r#"{}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        XML_DECL
    );
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    xml.push_str(r#"<Default Extension="png" ContentType="image/png"/>"#);
    xml.push_str(r#"<Default Extension="jpg" ContentType="image/jpeg"/>"#);
    xml.push_str(r#"<Default Extension="gif" ContentType="image/gif"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#);
    for n in 1..=slides {
        let _ = write!(
            xml,
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
            n
        );
    }
    xml.push_str(r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#);
    xml.push_str(r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#);
    xml.push_str("</Types>");
    xml
}

fn root_rels() -> String {
    format!(
        concat!(
            r#"{}<Relationships xmlns="{}">"#,
            r#"<Relationship Id="rId1" Type="{}/officeDocument" Target="ppt/presentation.xml"/>"#,
            r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#,
            r#"<Relationship Id="rId3" Type="{}/extended-properties" Target="docProps/app.xml"/>"#,
            "</Relationships>"
        ),
        XML_DECL, NS_REL, REL_BASE, REL_BASE
    )
}

fn core_xml(spec: &PresentationSpec) -> String {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let props = &spec.properties;
    format!(
        concat!(
            r#"{}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<dc:title>{}</dc:title><dc:subject>{}</dc:subject><dc:creator>{}</dc:creator>",
            "<cp:lastModifiedBy>{}</cp:lastModifiedBy><cp:revision>1</cp:revision>",
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>"#,
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{}</dcterms:modified>"#,
            "</cp:coreProperties>"
        ),
        XML_DECL,
        escape(props.title.as_str()),
        escape(props.subject.as_str()),
        escape(props.author.as_str()),
        escape(props.author.as_str()),
        now,
        now
    )
}

fn app_xml(slides: usize) -> String {
    format!(
        concat!(
            r#"{}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">"#,
            "<Application>pdfdeck</Application><Slides>{}</Slides><PresentationFormat>On-screen Show (16:9)</PresentationFormat>",
            "</Properties>"
        ),
        XML_DECL, slides
    )
}

fn presentation_xml(slides: usize) -> String {
    let mut ids = String::new();
    for n in 0..slides {
        let _ = write!(ids, r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + n, n + 2);
    }
    format!(
        concat!(
            r#"{}<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">"#,
            r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
            "<p:sldIdLst>{}</p:sldIdLst>",
            r#"<p:sldSz cx="{}" cy="{}"/><p:notesSz cx="6858000" cy="9144000"/>"#,
            "</p:presentation>"
        ),
        XML_DECL,
        NS_A,
        NS_R,
        NS_P,
        ids,
        emu(SLIDE_WIDTH_IN),
        emu(SLIDE_HEIGHT_IN)
    )
}

fn presentation_rels(slides: usize) -> String {
    let mut xml = format!(r#"{}<Relationships xmlns="{}">"#, XML_DECL, NS_REL);
    let _ = write!(
        xml,
        r#"<Relationship Id="rId1" Type="{}/slideMaster" Target="slideMasters/slideMaster1.xml"/>"#,
        REL_BASE
    );
    for n in 1..=slides {
        let _ = write!(
            xml,
            r#"<Relationship Id="rId{}" Type="{}/slide" Target="slides/slide{}.xml"/>"#,
            n + 1,
            REL_BASE,
            n
        );
    }
    let _ = write!(
        xml,
        r#"<Relationship Id="rId{}" Type="{}/theme" Target="theme/theme1.xml"/>"#,
        slides + 2,
        REL_BASE
    );
    xml.push_str("</Relationships>");
    xml
}

fn slide_xml(slide: &SlideSpec, rels: &mut SlideRels, media: &mut MediaStore) -> String {
    let mut tree = String::new();
    let mut next_id = 2u32;

    if let Some(background) = &slide.background_image {
        let (rel, external) = rels.image(&background.source, media);
        tree.push_str(&background_pic(background, &rel, external, next_id));
        next_id += 1;
    }

    for shape in &slide.shapes {
        let xml = match shape {
            Shape::Text(text) => text_shape(text, next_id),
            Shape::Image(image) => {
                let (rel, external) = rels.image(&image.source, media);
                image_shape(image, &rel, external, next_id)
            }
        };
        tree.push_str(&xml);
        next_id += 1;
    }

    format!(
        concat!(
            r#"{}<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld>"#,
            r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
            r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
            r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
            "{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"
        ),
        XML_DECL,
        NS_A,
        NS_R,
        NS_P,
        slide.background.to_srgb(),
        tree
    )
}

fn xfrm(frame: &Frame) -> String {
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        emu(frame.x),
        emu(frame.y),
        emu(frame.w.max(0.0)),
        emu(frame.h.max(0.0))
    )
}

fn text_shape(text: &TextBox, id: u32) -> String {
    let align = match text.align {
        Alignment::Left => "l",
        Alignment::Center => "ctr",
        Alignment::Right => "r",
    };
    let anchor = match text.valign {
        VerticalAlign::Top => "t",
        VerticalAlign::Middle => "ctr",
        VerticalAlign::Bottom => "b",
    };
    let size = (text.font_pt * 100.0).round().max(100.0) as u32;
    let bold = if text.bold { r#" b="1""# } else { "" };
    let color = text.color.to_srgb();

    let mut paragraphs = String::new();
    for line in text.text.split('\n') {
        let line = line.trim_end_matches('\r');
        let _ = write!(paragraphs, r#"<a:p><a:pPr algn="{}"/>"#, align);
        if line.is_empty() {
            let _ = write!(paragraphs, r#"<a:endParaRPr lang="en-US" sz="{}" dirty="0"/>"#, size);
        } else {
            let _ = write!(
                paragraphs,
                r#"<a:r><a:rPr lang="en-US" sz="{}"{} dirty="0"><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:rPr><a:t>{}</a:t></a:r>"#,
                size,
                bold,
                color,
                escape(line)
            );
        }
        paragraphs.push_str("</a:p>");
    }

    format!(
        concat!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Text {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#,
            r#"<p:spPr>{xfrm}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#,
            r#"<p:txBody><a:bodyPr wrap="square" rtlCol="0" anchor="{anchor}"><a:normAutofit/></a:bodyPr><a:lstStyle/>{paragraphs}</p:txBody>"#,
            "</p:sp>"
        ),
        id = id,
        xfrm = xfrm(&text.frame),
        anchor = anchor,
        paragraphs = paragraphs
    )
}

fn blip(rel: &str, external: bool, extra: &str) -> String {
    let attr = if external { "r:link" } else { "r:embed" };
    if extra.is_empty() {
        format!(r#"<a:blip {}="{}"/>"#, attr, rel)
    } else {
        format!(r#"<a:blip {}="{}">{}</a:blip>"#, attr, rel, extra)
    }
}

fn src_rect(crop: &Option<Crop>) -> String {
    let pct = |f: f32| (f.clamp(0.0, 1.0) * 100_000.0).round() as i64;
    match crop {
        Some(c) => format!(
            r#"<a:srcRect l="{}" t="{}" r="{}" b="{}"/>"#,
            pct(c.left),
            pct(c.top),
            pct(c.right),
            pct(c.bottom)
        ),
        None => String::new(),
    }
}

fn picture(id: u32, name: &str, blip: &str, src_rect: &str, frame: &Frame) -> String {
    format!(
        concat!(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="{}" name="{} {}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#,
            r#"<p:blipFill>{}{}<a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
            r#"<p:spPr>{}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#
        ),
        id,
        name,
        id,
        blip,
        src_rect,
        xfrm(frame)
    )
}

fn image_shape(image: &ImageBox, rel: &str, external: bool, id: u32) -> String {
    picture(
        id,
        "Image",
        &blip(rel, external, ""),
        &src_rect(&image.crop),
        &image.frame,
    )
}

fn background_pic(background: &BackgroundImage, rel: &str, external: bool, id: u32) -> String {
    let alpha = 100u32.saturating_sub(background.transparency as u32) * 1000;
    let extra = format!(r#"<a:alphaModFix amt="{}"/>"#, alpha);
    picture(
        id,
        "Background",
        &blip(rel, external, &extra),
        "",
        &Frame::full_slide(),
    )
}

const SLIDE_MASTER: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
    r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#,
    r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr></p:spTree></p:cSld>"#,
    r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
    r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
    r#"<p:txStyles><p:titleStyle/><p:bodyStyle/><p:otherStyle/></p:txStyles>"#,
    "</p:sldMaster>"
);

const SLIDE_MASTER_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="../theme/theme1.xml"/>"#,
    "</Relationships>"
);

const SLIDE_LAYOUT: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="blank" preserve="1">"#,
    r#"<p:cSld name="Blank"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr></p:spTree></p:cSld>"#,
    r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#
);

const SLIDE_LAYOUT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/>"#,
    "</Relationships>"
);

const THEME: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements>"#,
    r#"<a:clrScheme name="Office">"#,
    r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
    r#"<a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>"#,
    r#"<a:accent1><a:srgbClr val="4472C4"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2>"#,
    r#"<a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4>"#,
    r#"<a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6>"#,
    r#"<a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme>"#,
    r#"<a:fontScheme name="Office">"#,
    r#"<a:majorFont><a:latin typeface="Arial"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
    r#"<a:minorFont><a:latin typeface="Arial"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme>"#,
    r#"<a:fmtScheme name="Office">"#,
    r#"<a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst>"#,
    r#"<a:lnStyleLst><a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst>"#,
    r#"<a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst>"#,
    r#"<a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst>"#,
    r#"</a:fmtScheme></a:themeElements></a:theme>"#
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::presentation::PresentationProperties;
    use crate::model::Color;
    use std::io::Read;

    fn text_box(text: &str) -> Shape {
        Shape::Text(TextBox {
            frame: Frame::new(1.0, 1.0, 4.0, 1.0),
            text: text.to_string(),
            font_pt: 12.0,
            bold: true,
            align: Alignment::Center,
            valign: VerticalAlign::Top,
            color: Color::rgb(0x36, 0x36, 0x36),
        })
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        out
    }

    fn spec(shapes: Vec<Shape>) -> PresentationSpec {
        PresentationSpec {
            properties: PresentationProperties::default(),
            slides: vec![SlideSpec {
                background: Color::rgb(0xf0, 0xf0, 0xf0),
                background_image: None,
                shapes,
            }],
        }
    }

    #[test]
    fn test_emu() {
        assert_eq!(emu(1.0), 914_400);
        assert_eq!(emu(SLIDE_WIDTH_IN), 9_144_000);
        assert_eq!(emu(SLIDE_HEIGHT_IN), 5_143_500);
    }

    #[test]
    fn test_file_name() {
        let time = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        assert_eq!(file_name_at(time), "presentation_1700000000123.pptx");
        assert!(default_file_name().starts_with("presentation_"));
    }

    #[test]
    fn test_empty_spec_rejected() {
        let empty = PresentationSpec {
            properties: PresentationProperties::default(),
            slides: vec![],
        };
        assert!(matches!(to_pptx_bytes(&empty), Err(Error::EmptyInput(_))));
    }

    #[test]
    fn test_text_is_escaped_and_split() {
        let bytes = to_pptx_bytes(&spec(vec![text_box("A & <B>\nsecond")])).unwrap();
        let slide = read_part(&bytes, "ppt/slides/slide1.xml");
        assert!(slide.contains("A &amp; &lt;B&gt;"));
        assert_eq!(slide.matches("<a:p>").count(), 2);
        assert!(slide.contains(r#"algn="ctr""#));
        assert!(slide.contains(r#"sz="1200" b="1""#));
        assert!(slide.contains(r#"<a:srgbClr val="F0F0F0"/>"#));
    }

    #[test]
    fn test_shared_payload_stored_once() {
        let payload = ImagePayload::png(2, 2, vec![137u8, 80, 78, 71]);
        let image = |x| {
            Shape::Image(ImageBox {
                frame: Frame::new(x, 0.0, 1.0, 1.0),
                source: ImageSource::Embedded(payload.clone()),
                crop: None,
            })
        };
        let bytes = to_pptx_bytes(&spec(vec![image(0.0), image(2.0)])).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let media: Vec<&str> = archive
            .file_names()
            .filter(|n| n.starts_with("ppt/media/"))
            .collect();
        assert_eq!(media, vec!["ppt/media/image1.png"]);

        let rels = read_part(&bytes, "ppt/slides/_rels/slide1.xml.rels");
        assert_eq!(rels.matches("../media/image1.png").count(), 2);
    }

    #[test]
    fn test_remote_image_is_linked() {
        let shape = Shape::Image(ImageBox {
            frame: Frame::new(0.0, 0.0, 3.0, 2.0),
            source: ImageSource::remote("https://example.com/a.jpg?x=1&y=2"),
            crop: Some(Crop {
                left: 0.25,
                right: 0.25,
                ..Crop::default()
            }),
        });
        let mut with_bg = spec(vec![shape]);
        with_bg.slides[0].background_image = Some(BackgroundImage {
            source: ImageSource::remote("https://example.com/bg.jpg"),
            transparency: 30,
        });
        let bytes = to_pptx_bytes(&with_bg).unwrap();

        let rels = read_part(&bytes, "ppt/slides/_rels/slide1.xml.rels");
        assert!(rels.contains(r#"TargetMode="External""#));
        assert!(rels.contains("x=1&amp;y=2"));

        let slide = read_part(&bytes, "ppt/slides/slide1.xml");
        assert!(slide.contains(r#"r:link="rId2""#));
        assert!(slide.contains(r#"<a:alphaModFix amt="70000"/>"#));
        assert!(slide.contains(r#"<a:srcRect l="25000" t="0" r="25000" b="0"/>"#));
    }

    #[test]
    fn test_package_parts() {
        let bytes = to_pptx_bytes(&spec(vec![text_box("x")])).unwrap();
        let types = read_part(&bytes, "[Content_Types].xml");
        assert!(types.contains("/ppt/slides/slide1.xml"));
        let presentation = read_part(&bytes, "ppt/presentation.xml");
        assert!(presentation.contains(r#"<p:sldSz cx="9144000" cy="5143500"/>"#));
        let core = read_part(&bytes, "docProps/core.xml");
        assert!(core.contains("<dc:creator>Doc Converter</dc:creator>"));
        assert!(core.contains("<dc:title>Generated Presentation</dc:title>"));
    }
}
