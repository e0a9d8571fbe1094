//! Export of edited decks and text documents.

mod common;

use std::io::{Cursor, Read};

use chrono::NaiveDate;
use common::{sample_page, PdfFixture};
use pdfdeck::export::{
    export_text, to_json, to_pptx_bytes, DocumentBranding, DocumentFormat, ExportOptions,
    JsonFormat, LayoutSlide, PresentationSpec, SlideLayout,
};
use pdfdeck::{deck_to_pptx, Color, Editor, ImageSource, KindFilter, Pdfdeck, PageSource};

fn read_part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut xml = String::new();
    part.read_to_string(&mut xml).unwrap();
    xml
}

fn part_names(bytes: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    archive.file_names().map(str::to_string).collect()
}

#[test]
fn test_text_and_image_card_export() {
    let pdf = PdfFixture::new().page(sample_page()).to_bytes();
    let mut editor: Editor = Pdfdeck::new().open_bytes(&pdf).unwrap();

    let text = editor.library().filter(KindFilter::Text).next().unwrap().id;
    let image = editor.library().filter(KindFilter::Image).next().unwrap().id;
    editor.add_element_to_slide(text).unwrap();
    editor.add_element_to_slide(image).unwrap();

    let bytes = deck_to_pptx(editor.deck()).unwrap();
    let slide = read_part(&bytes, "ppt/slides/slide1.xml");
    assert_eq!(slide.matches("<p:sp>").count(), 1);
    assert_eq!(slide.matches("<p:pic>").count(), 1);
    assert!(slide.contains("Hello world"));

    let media: Vec<_> = part_names(&bytes)
        .into_iter()
        .filter(|n| n.starts_with("ppt/media/"))
        .collect();
    assert_eq!(media.len(), 1);
}

#[test]
fn test_blank_slides_and_backgrounds() {
    let mut editor = Editor::default();
    editor.add_slide();
    editor.set_background(Color::rgb(0x10, 0x20, 0x30));
    editor.add_slide();
    editor.set_background_image(Some(ImageSource::remote("https://example.com/bg.jpg")));

    let bytes = deck_to_pptx(editor.deck()).unwrap();
    assert!(read_part(&bytes, "ppt/slides/slide1.xml").contains("102030"));
    let second = read_part(&bytes, "ppt/slides/slide2.xml");
    assert_eq!(second.matches("<p:pic>").count(), 1);
    assert!(second.contains(r#"alphaModFix amt="70000""#));
    let rels = read_part(&bytes, "ppt/slides/_rels/slide2.xml.rels");
    assert!(rels.contains(r#"TargetMode="External""#));
}

#[test]
fn test_layout_deck_round_trip_through_json() {
    let json = r#"[
        {"title": "Welcome", "content": "Overview", "layout": "title"},
        {"title": "Photos", "content": "Left side", "layout": "imageLeft",
         "image": {"type": "remote", "url": "https://example.com/a.png"}}
    ]"#;
    let slides: Vec<LayoutSlide> = serde_json::from_str(json).unwrap();
    assert_eq!(slides[1].layout, SlideLayout::ImageLeft);

    let spec = PresentationSpec::from_layouts(&slides, &ExportOptions::default()).unwrap();
    assert_eq!(spec.shape_count(), 5);
    let bytes = to_pptx_bytes(&spec).unwrap();
    let names = part_names(&bytes);
    assert!(names.contains(&"ppt/slides/slide2.xml".to_string()));
    assert!(read_part(&bytes, "ppt/slides/slide1.xml").contains("Welcome"));
}

#[test]
fn test_library_json() {
    let pdf = PdfFixture::new().page(sample_page()).to_bytes();
    let editor = Pdfdeck::new().open_bytes(&pdf).unwrap();
    let json = to_json(editor.library(), JsonFormat::Compact).unwrap();
    assert!(json.contains(r#""type":"text""#));
    assert!(json.contains(r#""content":"Hello world""#));
    assert!(json.contains(r#""type":"image""#));
}

#[test]
fn test_text_documents() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
    let branding = DocumentBranding::default();

    for format in DocumentFormat::ALL {
        let file = export_text("Notes from the meeting", format, &branding, date).unwrap();
        assert!(file.filename.ends_with(format.extension()));
        assert!(!file.bytes.is_empty());
    }

    let pdf = export_text("Line one\nLine two", DocumentFormat::Pdf, &branding, date).unwrap();
    let backend = pdfdeck::LopdfBackend::load_bytes(&pdf.bytes).unwrap();
    assert_eq!(backend.page_count(), 1);

    assert!(export_text("   ", DocumentFormat::Txt, &branding, date).is_err());
}
