//! PDF writer: turns painted pages into a document with lopdf.
//!
//! Text uses the standard Helvetica faces with WinAnsiEncoding, so no font
//! program is embedded. Signatures become Flate-compressed RGB image
//! XObjects with an alpha soft mask when the source has transparency.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::config::PageLayout;
use crate::rendering::paint::{PaintCommand, PaintedPage, SignatureSlot};
use crate::rendering::text::{win_ansi_code, FontStyle, MM_PER_PT};
use crate::signature::SignatureImage;
use crate::{Error, Result};

/// Stroke width of table rules, in points
const RULE_WIDTH_PT: f32 = 0.57;

/// Signature images available to image commands
#[derive(Debug, Clone, Copy)]
pub struct SignatureImages<'a> {
    pub patient: &'a SignatureImage,
    pub witness: &'a SignatureImage,
}

impl<'a> SignatureImages<'a> {
    fn get(&self, slot: SignatureSlot) -> &'a SignatureImage {
        match slot {
            SignatureSlot::Patient => self.patient,
            SignatureSlot::Witness => self.witness,
        }
    }
}

fn pt(mm: f64) -> f32 {
    (mm / MM_PER_PT) as f32
}

/// Encode text for a WinAnsiEncoding simple font
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_code).collect()
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn font_dict(style: FontStyle) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => style.base_font(),
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Decode a signature and add it as an image XObject
fn add_image_xobject(doc: &mut Document, sig: &SignatureImage) -> Result<ObjectId> {
    let (bytes, encoding) = match sig {
        SignatureImage::Present { bytes, encoding } => (bytes, encoding),
        SignatureImage::Absent => {
            return Err(Error::RenderFailure(
                "image command refers to an absent signature".into(),
            ))
        }
    };
    let img = image::load_from_memory_with_format(bytes, encoding.image_format())?.to_rgba8();
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::RenderFailure("signature image is empty".into()));
    }

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    for pixel in img.pixels() {
        let [r, g, b, a] = pixel.0;
        rgb.extend_from_slice(&[r, g, b]);
        alpha.push(a);
    }

    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    };
    if alpha.iter().any(|&a| a != u8::MAX) {
        let smask_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            deflate(&alpha)?,
        ));
        dict.set("SMask", Object::Reference(smask_id));
    }

    log::debug!("embedded {}x{} signature image", width, height);
    Ok(doc.add_object(Stream::new(dict, deflate(&rgb)?)))
}

fn image_name(slot: SignatureSlot) -> &'static str {
    match slot {
        SignatureSlot::Patient => "ImPatient",
        SignatureSlot::Witness => "ImWitness",
    }
}

fn page_operations(page: &PaintedPage, layout: &PageLayout) -> Vec<Operation> {
    let flip = |y: f64| pt(layout.page_height - y);
    let mut ops = vec![Operation::new("w", vec![Object::Real(RULE_WIDTH_PT)])];

    for cmd in &page.commands {
        match cmd {
            PaintCommand::Text {
                x,
                y,
                text,
                style,
                size,
            } => {
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![
                        Object::Name(style.resource_name().as_bytes().to_vec()),
                        Object::Real(*size as f32),
                    ],
                ));
                ops.push(Operation::new(
                    "Td",
                    vec![Object::Real(pt(*x)), Object::Real(flip(*y))],
                ));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(win_ansi(text), StringFormat::Literal)],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
            PaintCommand::Rule { x1, y1, x2, y2 } => {
                ops.push(Operation::new(
                    "m",
                    vec![Object::Real(pt(*x1)), Object::Real(flip(*y1))],
                ));
                ops.push(Operation::new(
                    "l",
                    vec![Object::Real(pt(*x2)), Object::Real(flip(*y2))],
                ));
                ops.push(Operation::new("S", vec![]));
            }
            PaintCommand::Image {
                x,
                y,
                width,
                height,
                slot,
            } => {
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new(
                    "cm",
                    vec![
                        Object::Real(pt(*width)),
                        Object::Real(0.0),
                        Object::Real(0.0),
                        Object::Real(pt(*height)),
                        Object::Real(pt(*x)),
                        Object::Real(flip(*y + *height)),
                    ],
                ));
                ops.push(Operation::new(
                    "Do",
                    vec![Object::Name(image_name(*slot).as_bytes().to_vec())],
                ));
                ops.push(Operation::new("Q", vec![]));
            }
        }
    }

    ops
}

/// Serialize painted pages into PDF bytes
pub fn write_pdf(
    pages: &[PaintedPage],
    layout: &PageLayout,
    images: SignatureImages<'_>,
    title: &str,
) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for style in [FontStyle::Regular, FontStyle::Bold] {
        let id = doc.add_object(font_dict(style));
        fonts.set(style.resource_name(), Object::Reference(id));
    }

    // each signature is embedded once and shared by every page that shows it
    let mut xobjects: Vec<(SignatureSlot, ObjectId)> = Vec::new();
    for slot in pages.iter().flat_map(|p| p.images()) {
        if !xobjects.iter().any(|(s, _)| *s == slot) {
            let id = add_image_xobject(&mut doc, images.get(slot))?;
            xobjects.push((slot, id));
        }
    }

    let mut resources = dictionary! { "Font" => fonts };
    if !xobjects.is_empty() {
        let mut xobject_dict = Dictionary::new();
        for (slot, id) in &xobjects {
            xobject_dict.set(image_name(*slot), Object::Reference(*id));
        }
        resources.set("XObject", xobject_dict);
    }
    let resources_id = doc.add_object(resources);

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: page_operations(page, layout),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(pt(layout.page_width)),
                Object::Real(pt(layout.page_height)),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(title),
        "Producer" => Object::string_literal(concat!("consent-pdf ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}
