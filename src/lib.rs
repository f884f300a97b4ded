// Library exports for agrichart

pub mod data;
pub mod parser;
pub mod vars;

pub mod ir;
pub mod resolve;
pub mod transform;
pub mod render;
pub mod runtime;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum ChartKind {
    #[serde(rename = "bar")]
    #[default]
    Bar,
    #[serde(rename = "line")]
    Line,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default, rename = "type")]
    pub kind: ChartKind,
}

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            kind: ChartKind::Bar,
        }
    }
}
