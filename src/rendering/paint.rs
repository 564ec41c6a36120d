//! Positioned drawing commands, one list per page. Coordinates are
//! millimetres from the top-left page corner.

use crate::rendering::text::FontStyle;

/// Which captured signature an image command refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureSlot {
    Patient,
    Witness,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    /// Text with its baseline at `y`
    Text {
        x: f64,
        y: f64,
        text: String,
        style: FontStyle,
        size: f64,
    },
    /// Straight ruled line
    Rule { x1: f64, y1: f64, x2: f64, y2: f64 },
    /// Signature image with its top-left corner at (`x`, `y`)
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        slot: SignatureSlot,
    },
}

impl PaintCommand {
    /// Shift a command drawn relative to a block origin down by `dy`
    pub fn translated(&self, dy: f64) -> PaintCommand {
        let mut cmd = self.clone();
        match &mut cmd {
            PaintCommand::Text { y, .. } | PaintCommand::Image { y, .. } => *y += dy,
            PaintCommand::Rule { y1, y2, .. } => {
                *y1 += dy;
                *y2 += dy;
            }
        }
        cmd
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaintedPage {
    pub commands: Vec<PaintCommand>,
}

impl PaintedPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: PaintCommand) {
        self.commands.push(cmd);
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            PaintCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t == needle)
    }

    /// Baseline of the first text command equal to `needle`
    pub fn text_y(&self, needle: &str) -> Option<f64> {
        self.commands.iter().find_map(|c| match c {
            PaintCommand::Text { text, y, .. } if text == needle => Some(*y),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = SignatureSlot> + '_ {
        self.commands.iter().filter_map(|c| match c {
            PaintCommand::Image { slot, .. } => Some(*slot),
            _ => None,
        })
    }

    pub fn rules(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, PaintCommand::Rule { .. }))
            .count()
    }
}
