use std::fmt;
use std::str::FromStr;

use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

/// Bar colours, one per statistic in drawing order (sum, mean).
pub const BAR_PALETTE: [RGBColor; 2] = [
    RGBColor(31, 119, 180),  // Blue
    RGBColor(255, 127, 14),  // Orange
];

pub fn bar_color(index: usize) -> RGBColor {
    BAR_PALETTE[index % BAR_PALETTE.len()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartTheme {
    #[default]
    Light,
    Dark,
}

impl ChartTheme {
    pub fn background(&self) -> RGBColor {
        match self {
            ChartTheme::Light => RGBColor(255, 255, 255),
            ChartTheme::Dark => RGBColor(20, 20, 20),
        }
    }

    pub fn text(&self) -> RGBColor {
        match self {
            ChartTheme::Light => RGBColor(30, 30, 30),
            ChartTheme::Dark => RGBColor(220, 220, 220),
        }
    }

    pub fn grid(&self) -> RGBColor {
        match self {
            ChartTheme::Light => RGBColor(225, 225, 225),
            ChartTheme::Dark => RGBColor(60, 60, 60),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChartTheme::Light => "light",
            ChartTheme::Dark => "dark",
        }
    }
}

impl fmt::Display for ChartTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ChartTheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ChartTheme::Light),
            "dark" => Ok(ChartTheme::Dark),
            other => Err(format!("unknown chart theme: {other}")),
        }
    }
}
