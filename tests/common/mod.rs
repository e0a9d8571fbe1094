//! PDF fixtures built in memory with lopdf.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// A small multi-page PDF under construction.
#[derive(Default)]
pub struct PdfFixture {
    pages: Vec<Vec<Operation>>,
    title: Option<String>,
}

impl PdfFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Add a page drawing `ops`.
    pub fn page(mut self, ops: Vec<Operation>) -> Self {
        self.pages.push(ops);
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 2,
                "Height" => 2,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            vec![255u8, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 0],
        ));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
            "XObject" => dictionary! { "Im1" => image_id },
        });

        let mut kids = Vec::new();
        for ops in &self.pages {
            let content = Content {
                operations: ops.clone(),
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        if let Some(title) = &self.title {
            let info_id = doc.add_object(dictionary! {
                "Title" => Object::string_literal(title.as_bytes().to_vec()),
            });
            doc.trailer.set("Info", info_id);
        }

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }
}

/// Show `text` at PDF coordinates `(x, y)` in 16pt Helvetica.
pub fn text_at(x: i64, y: i64, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 16.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(text)]),
        Operation::new("ET", vec![]),
    ]
}

/// Paint the fixture image into a `size` square at `(x, y)`.
pub fn image_at(x: i64, y: i64, size: i64) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![size.into(), 0.into(), 0.into(), size.into(), x.into(), y.into()],
        ),
        Operation::new("Do", vec!["Im1".into()]),
        Operation::new("Q", vec![]),
    ]
}

/// A page with two adjacent runs on one line, one run further down and
/// one painted image.
pub fn sample_page() -> Vec<Operation> {
    let mut ops = Vec::new();
    // "Hello" is 40pt wide at 16pt, so "world" starts 5pt after it.
    ops.extend(text_at(72, 692, "Hello"));
    ops.extend(text_at(117, 692, "world"));
    ops.extend(text_at(72, 592, "Second"));
    ops.extend(image_at(100, 100, 200));
    ops
}
