//! Notation configuration
//!
//! An explicit configuration value is built once at startup and handed to
//! every notation that needs it. Nothing here is global mutable state; the
//! shared default is an immutable lazily-built value.

use crate::error::{NotationError, Result};
use crate::models::{Color, Pen};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Engine resolution in dots per inch
pub const DPI: f64 = 360.0;

/// Logical DPI assumed when the host does not report one
pub const DEFAULT_LOGICAL_DPI: f64 = 96.0;

/// Default configuration shared by notations built without an explicit one
pub static DEFAULT_CONFIGURATION: Lazy<NotationConfiguration> = Lazy::new(NotationConfiguration::default);

/// Which modifier accompanied a cursor key nudge
#[repr(u8)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde_repr::Serialize_repr, serde_repr::Deserialize_repr,
)]
pub enum NudgeStep {
    /// Plain cursor key
    #[default]
    Normal = 0,

    /// Ctrl held
    Coarse = 1,

    /// Alt held
    Fine = 2,
}

impl TryFrom<u8> for NudgeStep {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(NudgeStep::Normal),
            1 => Ok(NudgeStep::Coarse),
            2 => Ok(NudgeStep::Fine),
            other => Err(other),
        }
    }
}

/// Rendering and input configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct NotationConfiguration {
    /// Page background fill
    pub page_color: Color,

    /// Outer page frame color
    pub border_color: Color,

    /// Outer page frame stroke width
    pub border_width: f64,

    /// Inner (margin) frame color, drawn when the score shows page borders
    pub frame_margin_color: Color,

    /// Frame drawn around selected elements
    pub selection_color: Color,

    /// Rubber-band rectangle drawn while dragging
    pub drag_rect_color: Color,

    /// Cursor key nudge distance, in spatium units
    pub nudge_step: f64,

    /// Ctrl + cursor key nudge distance, in spatium units
    pub nudge_step10: f64,

    /// Alt + cursor key nudge distance, in spatium units
    pub nudge_step50: f64,

    /// Engine DPI divided by the screen's logical DPI
    pub pixel_ratio: f64,
}

impl Default for NotationConfiguration {
    fn default() -> Self {
        Self {
            page_color: Color::WHITE,
            border_color: Color::rgba(0, 0, 0, 102),
            border_width: 1.0,
            frame_margin_color: Color::rgb(0x59, 0x99, 0xdb),
            selection_color: Color::rgb(0x00, 0x65, 0xbf),
            drag_rect_color: Color::rgba(0x00, 0x65, 0xbf, 0x80),
            nudge_step: 0.1,
            nudge_step10: 1.0,
            nudge_step50: 0.01,
            pixel_ratio: DPI / DEFAULT_LOGICAL_DPI,
        }
    }
}

impl NotationConfiguration {
    /// Parse from JSON; missing fields take their default value
    pub fn from_json(json: &str) -> Result<Self> {
        let config: NotationConfiguration = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Recompute the pixel ratio for a screen with the given logical DPI
    pub fn with_logical_dpi(mut self, logical_dpi: f64) -> Result<Self> {
        if !(logical_dpi > 0.0) {
            return Err(NotationError::ConfigValue {
                field: "logicalDpi",
                reason: format!("must be positive, got {}", logical_dpi),
            });
        }
        self.pixel_ratio = DPI / logical_dpi;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.border_width >= 0.0) {
            return Err(NotationError::ConfigValue {
                field: "borderWidth",
                reason: format!("must not be negative, got {}", self.border_width),
            });
        }
        if !(self.pixel_ratio > 0.0) {
            return Err(NotationError::ConfigValue {
                field: "pixelRatio",
                reason: format!("must be positive, got {}", self.pixel_ratio),
            });
        }
        for (field, step) in [
            ("nudgeStep", self.nudge_step),
            ("nudgeStep10", self.nudge_step10),
            ("nudgeStep50", self.nudge_step50),
        ] {
            if !(step >= 0.0) {
                return Err(NotationError::ConfigValue {
                    field,
                    reason: format!("must not be negative, got {}", step),
                });
            }
        }
        Ok(())
    }

    /// Nudge distance in spatium units for the given step
    pub fn nudge_distance(&self, step: NudgeStep) -> f64 {
        match step {
            NudgeStep::Normal => self.nudge_step,
            NudgeStep::Coarse => self.nudge_step10,
            NudgeStep::Fine => self.nudge_step50,
        }
    }

    pub fn border_pen(&self) -> Pen {
        Pen::new(self.border_color, self.border_width)
    }

    pub fn frame_margin_pen(&self) -> Pen {
        Pen::cosmetic(self.frame_margin_color)
    }
}
