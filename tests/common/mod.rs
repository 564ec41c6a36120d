//! Shared helpers for integration tests
#![allow(dead_code)]

use std::io::Cursor;

use consent_pdf::{ImageEncoding, Prompter, SignatureImage};
use lopdf::content::Content;
use lopdf::{Document, Object};

/// A small transparent PNG with one stroke, like a canvas export
pub fn signature_png() -> Vec<u8> {
    let mut img = image::RgbaImage::from_pixel(40, 8, image::Rgba([0, 0, 0, 0]));
    for x in 4..36 {
        img.put_pixel(x, 4, image::Rgba([0, 0, 0, 255]));
    }
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageOutputFormat::Png)
        .expect("encode test png");
    buf
}

pub fn signature() -> SignatureImage {
    SignatureImage::Present {
        bytes: signature_png(),
        encoding: ImageEncoding::Png,
    }
}

/// Answers every confirmation the same way and records what was shown
#[derive(Default)]
pub struct ScriptedPrompter {
    pub answer: bool,
    pub confirms: Vec<String>,
    pub notices: Vec<String>,
}

impl ScriptedPrompter {
    pub fn accepting() -> Self {
        Self {
            answer: true,
            ..Default::default()
        }
    }

    pub fn declining() -> Self {
        Self::default()
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, message: &str) -> bool {
        self.confirms.push(message.to_string());
        self.answer
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}

/// Every string shown with `Tj`, page by page
pub fn shown_text(bytes: &[u8]) -> Vec<Vec<String>> {
    let doc = Document::load_mem(bytes).expect("load pdf");
    doc.get_pages()
        .values()
        .map(|page_id| {
            let content = Content::decode(&doc.get_page_content(*page_id).expect("content"))
                .expect("decode content");
            content
                .operations
                .iter()
                .filter(|op| op.operator == "Tj")
                .filter_map(|op| op.operands.first().and_then(|o| o.as_str().ok()))
                .map(|s| String::from_utf8_lossy(s).into_owned())
                .collect()
        })
        .collect()
}

/// Names of image XObjects drawn with `Do`, page by page
pub fn drawn_images(bytes: &[u8]) -> Vec<Vec<String>> {
    let doc = Document::load_mem(bytes).expect("load pdf");
    doc.get_pages()
        .values()
        .map(|page_id| {
            let content = Content::decode(&doc.get_page_content(*page_id).expect("content"))
                .expect("decode content");
            content
                .operations
                .iter()
                .filter(|op| op.operator == "Do")
                .filter_map(|op| op.operands.first().and_then(|o| o.as_name().ok()))
                .map(|s| String::from_utf8_lossy(s).into_owned())
                .collect()
        })
        .collect()
}

pub fn embedded_rgb_images(bytes: &[u8]) -> usize {
    let doc = Document::load_mem(bytes).expect("load pdf");
    doc.objects
        .values()
        .filter(|o| match o {
            Object::Stream(s) => {
                s.dict.get(b"ColorSpace").and_then(|c| c.as_name()).ok() == Some(&b"DeviceRGB"[..])
            }
            _ => false,
        })
        .count()
}
