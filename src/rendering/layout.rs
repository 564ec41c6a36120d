//! Layout of the consent document.
//!
//! Producers here are pure: they turn the form into a flat list of
//! `LayoutCommand`s without knowing where anything lands. `paginate` is the
//! only place that tracks the vertical cursor and starts new pages.

use crate::config::{ConsentConfig, PageLayout, TableGeometry};
use crate::form::PatientFormData;
use crate::rendering::paint::{PaintCommand, PaintedPage, SignatureSlot};
use crate::rendering::text::{reflow, FontStyle};

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutCommand {
    /// Draw one line of text with its baseline at the cursor
    Line {
        x: f64,
        text: String,
        style: FontStyle,
        size: f64,
    },
    /// Move the cursor down
    Advance(f64),
    /// Start a new page if the cursor is below `page_height - threshold`
    BreakIfBelow { threshold: f64 },
    /// Commands positioned relative to the cursor, kept on one page.
    /// The cursor moves down by `height` afterwards.
    Block {
        height: f64,
        commands: Vec<PaintCommand>,
    },
}

/// Content of one table cell below its label
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Signature(SignatureSlot),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub label: String,
    pub value: CellValue,
}

/// The three two-column rows of the signature table
#[derive(Debug, Clone, PartialEq)]
pub struct TableSpec {
    pub rows: [[TableCell; 2]; 3],
}

/// Which signatures will be embedded as images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignaturePresence {
    pub patient: bool,
    pub witness: bool,
}

fn value_or_placeholder(value: &str, placeholder: &str) -> CellValue {
    if value.trim().is_empty() {
        CellValue::Text(placeholder.to_string())
    } else {
        CellValue::Text(value.to_string())
    }
}

fn signature_or_placeholder(present: bool, slot: SignatureSlot, placeholder: &str) -> CellValue {
    if present {
        CellValue::Signature(slot)
    } else {
        CellValue::Text(placeholder.to_string())
    }
}

/// Fill the table from the form. Both "Date" cells show the visit date.
pub fn table_spec(
    config: &ConsentConfig,
    data: &PatientFormData,
    signatures: SignaturePresence,
) -> TableSpec {
    let labels = &config.text.labels;
    let blank = config.text.placeholder.as_str();
    let cell = |label: &str, value: CellValue| TableCell {
        label: label.to_string(),
        value,
    };

    TableSpec {
        rows: [
            [
                cell(&labels.patient_name, value_or_placeholder(&data.name, blank)),
                cell(&labels.date_of_birth, value_or_placeholder(&data.date_of_birth, blank)),
            ],
            [
                cell(
                    &labels.patient_signature,
                    signature_or_placeholder(signatures.patient, SignatureSlot::Patient, blank),
                ),
                cell(&labels.date, value_or_placeholder(&data.visit_date, blank)),
            ],
            [
                cell(
                    &labels.witness_signature,
                    signature_or_placeholder(signatures.witness, SignatureSlot::Witness, blank),
                ),
                cell(&labels.date, value_or_placeholder(&data.visit_date, blank)),
            ],
        ],
    }
}

/// Draw commands for the table with its top edge at y = 0
pub fn table_commands(spec: &TableSpec, geom: &TableGeometry) -> Vec<PaintCommand> {
    let mut cmds = Vec::new();
    let height = geom.height();

    // top edge plus the bottom of every row
    for i in 0..=TableGeometry::ROWS {
        let y = geom.row_height * i as f64;
        cmds.push(PaintCommand::Rule {
            x1: geom.left,
            y1: y,
            x2: geom.right,
            y2: y,
        });
    }
    cmds.push(PaintCommand::Rule {
        x1: geom.column_split,
        y1: 0.0,
        x2: geom.column_split,
        y2: height,
    });

    for (r, row) in spec.rows.iter().enumerate() {
        let row_top = geom.row_height * r as f64;
        for (c, cell) in row.iter().enumerate() {
            let x = if c == 0 { geom.left } else { geom.column_split } + geom.cell_inset;
            cmds.push(PaintCommand::Text {
                x,
                y: row_top + geom.label_offset,
                text: cell.label.clone(),
                style: FontStyle::Regular,
                size: geom.font_size,
            });
            match &cell.value {
                CellValue::Text(text) => cmds.push(PaintCommand::Text {
                    x,
                    y: row_top + geom.value_offset,
                    text: text.clone(),
                    style: FontStyle::Regular,
                    size: geom.font_size,
                }),
                CellValue::Signature(slot) => cmds.push(PaintCommand::Image {
                    x,
                    y: row_top + geom.signature_offset,
                    width: geom.signature_width,
                    height: geom.signature_height,
                    slot: *slot,
                }),
            }
        }
    }

    cmds
}

fn header_commands(config: &ConsentConfig, doctor: &str) -> Vec<LayoutCommand> {
    let layout = &config.layout;
    let mut cmds = Vec::new();
    for (i, line) in config.clinic.header_lines(doctor).into_iter().enumerate() {
        if i > 0 {
            cmds.push(LayoutCommand::Advance(layout.header_pitch));
        }
        cmds.push(LayoutCommand::Line {
            x: layout.left_margin,
            text: line,
            style: FontStyle::Bold,
            size: layout.header_font_size,
        });
    }
    cmds
}

/// One `Line` + `Advance` pair per reflowed line
pub fn paragraph_commands(text: &str, layout: &PageLayout) -> Vec<LayoutCommand> {
    reflow(text, layout.column_width, layout.body_font_size, FontStyle::Regular)
        .into_iter()
        .flat_map(|line| {
            [
                LayoutCommand::Line {
                    x: layout.left_margin,
                    text: line,
                    style: FontStyle::Regular,
                    size: layout.body_font_size,
                },
                LayoutCommand::Advance(layout.line_pitch),
            ]
        })
        .collect()
}

/// Full command list for one consent document
pub fn compose(
    config: &ConsentConfig,
    data: &PatientFormData,
    signatures: SignaturePresence,
) -> Vec<LayoutCommand> {
    let layout = &config.layout;
    let mut cmds = header_commands(config, &data.doctor_name);

    cmds.push(LayoutCommand::Advance(layout.title_gap));
    cmds.push(LayoutCommand::Line {
        x: layout.left_margin,
        text: config.text.title.clone(),
        style: FontStyle::Bold,
        size: layout.title_font_size,
    });
    cmds.push(LayoutCommand::Advance(layout.body_gap));

    let paragraphs = config.text.paragraphs_for(&data.doctor_name);
    for (i, para) in paragraphs.iter().enumerate() {
        if i > 0 {
            cmds.push(LayoutCommand::Advance(layout.paragraph_gap));
        }
        cmds.extend(paragraph_commands(para, layout));
    }

    cmds.push(LayoutCommand::Advance(layout.table_gap));
    cmds.push(LayoutCommand::BreakIfBelow {
        threshold: layout.bottom_threshold,
    });
    let spec = table_spec(config, data, signatures);
    cmds.push(LayoutCommand::Block {
        height: layout.table.height(),
        commands: table_commands(&spec, &layout.table),
    });

    cmds
}

/// Execute layout commands against the page geometry
pub fn paginate(commands: &[LayoutCommand], layout: &PageLayout) -> Vec<PaintedPage> {
    let mut pages = Vec::new();
    let mut page = PaintedPage::new();
    let mut y = layout.top_margin;

    for cmd in commands {
        match cmd {
            LayoutCommand::Line {
                x,
                text,
                style,
                size,
            } => page.push(PaintCommand::Text {
                x: *x,
                y,
                text: text.clone(),
                style: *style,
                size: *size,
            }),
            LayoutCommand::Advance(dy) => y += dy,
            LayoutCommand::BreakIfBelow { threshold } => {
                if y > layout.page_height - threshold {
                    log::debug!(
                        "cursor at {:.1}mm is past {:.1}mm; starting page {}",
                        y,
                        layout.page_height - threshold,
                        pages.len() + 2
                    );
                    pages.push(std::mem::take(&mut page));
                    y = layout.top_margin;
                }
            }
            LayoutCommand::Block { height, commands } => {
                for c in commands {
                    page.push(c.translated(y));
                }
                y += height;
            }
        }
    }

    pages.push(page);
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> PatientFormData {
        PatientFormData {
            name: "Jane Doe".into(),
            date_of_birth: "2000-01-01".into(),
            visit_date: "2024-05-01".into(),
            doctor_name: "Dr. Chelsea Elwood".into(),
        }
    }

    #[test]
    fn header_and_title_follow_fixed_pitch() {
        let cfg = ConsentConfig::default();
        let pages = paginate(&compose(&cfg, &jane(), SignaturePresence::default()), &cfg.layout);
        let page = &pages[0];
        assert_eq!(page.text_y("Dr. Chelsea Elwood Inc."), Some(20.0));
        assert_eq!(page.text_y("Fairmont Obstetrics & Gynecology"), Some(24.0));
        assert_eq!(page.text_y("Phone: 604-878-8050 Fax: 604-875-8099"), Some(32.0));
        assert_eq!(
            page.text_y("Patient Consent Form for Use of AI Scribe Technology"),
            Some(44.0)
        );
    }

    #[test]
    fn pagination_is_checked_once_right_before_the_table() {
        let cfg = ConsentConfig::default();
        let cmds = compose(&cfg, &jane(), SignaturePresence::default());
        let checks: Vec<usize> = cmds
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, LayoutCommand::BreakIfBelow { .. }))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(checks.len(), 1);
        assert!(matches!(cmds[checks[0] + 1], LayoutCommand::Block { .. }));
        assert_eq!(checks[0] + 2, cmds.len());
    }

    #[test]
    fn default_document_fits_one_page() {
        let cfg = ConsentConfig::default();
        let pages = paginate(&compose(&cfg, &jane(), SignaturePresence::default()), &cfg.layout);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].rules(), 5);
    }

    #[test]
    fn table_moves_to_a_new_page_when_near_the_bottom() {
        let mut cfg = ConsentConfig::default();
        cfg.layout.page_height = 180.0;
        let pages = paginate(&compose(&cfg, &jane(), SignaturePresence::default()), &cfg.layout);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].rules(), 0);
        assert_eq!(pages[1].rules(), 5);
        // whole table on the second page, starting at the top margin
        assert_eq!(pages[1].text_y("Patient Name:"), Some(cfg.layout.top_margin + 4.0));
        assert!(pages[1].contains_text("Witness Signature:"));
        assert!(!pages[0].contains_text("Patient Name:"));
    }

    #[test]
    fn blank_fields_render_placeholders() {
        let cfg = ConsentConfig::default();
        let spec = table_spec(&cfg, &PatientFormData::default(), SignaturePresence::default());
        for row in &spec.rows {
            for cell in row {
                assert_eq!(cell.value, CellValue::Text("_________________".into()));
            }
        }
    }

    #[test]
    fn present_signatures_become_images() {
        let cfg = ConsentConfig::default();
        let spec = table_spec(
            &cfg,
            &jane(),
            SignaturePresence {
                patient: true,
                witness: false,
            },
        );
        assert_eq!(spec.rows[1][0].value, CellValue::Signature(SignatureSlot::Patient));
        assert_eq!(spec.rows[2][0].value, CellValue::Text("_________________".into()));
        assert_eq!(spec.rows[1][1].value, CellValue::Text("2024-05-01".into()));
        assert_eq!(spec.rows[2][1].value, spec.rows[1][1].value);
    }

    #[test]
    fn table_geometry_matches_the_form() {
        let cfg = ConsentConfig::default();
        let spec = table_spec(
            &cfg,
            &jane(),
            SignaturePresence {
                patient: true,
                witness: true,
            },
        );
        let cmds = table_commands(&spec, &cfg.layout.table);
        assert!(cmds.contains(&PaintCommand::Rule {
            x1: 110.0,
            y1: 0.0,
            x2: 110.0,
            y2: 45.0
        }));
        assert!(cmds.contains(&PaintCommand::Image {
            x: 22.0,
            y: 21.0,
            width: 60.0,
            height: 12.0,
            slot: SignatureSlot::Patient
        }));
        assert!(cmds.contains(&PaintCommand::Text {
            x: 112.0,
            y: 10.0,
            text: "2000-01-01".into(),
            style: FontStyle::Regular,
            size: 10.0
        }));
    }

    #[test]
    fn paragraphs_use_the_current_doctor() {
        let cfg = ConsentConfig::default();
        let mut data = jane();
        data.doctor_name = "Dr. Stephanie Rhone".into();
        let cmds = compose(&cfg, &data, SignaturePresence::default());
        let body: String = cmds
            .iter()
            .filter_map(|c| match c {
                LayoutCommand::Line { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" ");
        assert!(body.contains("Dr. Stephanie Rhone"));
        assert!(!body.contains("Elwood"));
    }
}
