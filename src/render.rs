use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::prelude::*;

use crate::ir::SeriesEntry;
use crate::parser::ast::Labels;
use crate::{ChartKind, RenderOptions};

/// Render a shaped series as a PNG chart
pub fn render_series(
    entries: &[SeriesEntry],
    options: &RenderOptions,
    labels: &Labels,
) -> Result<Vec<u8>> {
    if entries.is_empty() {
        anyhow::bail!("Cannot render a chart with no series entries");
    }

    let mut canvas = Canvas::new(options.width, options.height, labels.title.clone());
    match options.kind {
        ChartKind::Bar => canvas.draw_bars(entries, labels)?,
        ChartKind::Line => canvas.draw_line(entries, labels)?,
    }
    canvas.encode_png()
}

/// Drawing surface backed by an RGB buffer
struct Canvas {
    buffer: Vec<u8>,
    width: u32,
    height: u32,
    title: Option<String>,
}

impl Canvas {
    fn new(width: u32, height: u32, title: Option<String>) -> Self {
        let buffer = vec![0u8; (width * height * 3) as usize];
        Canvas {
            buffer,
            width,
            height,
            title,
        }
    }

    /// Categorical bars, one per entry, labeled by entry name
    fn draw_bars(&mut self, entries: &[SeriesEntry], labels: &Labels) -> Result<()> {
        let names: Vec<String> = entries.iter().map(|e| e.name.clone()).collect();
        let values: Vec<f64> = entries.iter().map(|e| e.value).collect();

        // Bars grow from the zero baseline
        let mut y_data = values.clone();
        y_data.push(0.0);
        let y_range = padded_range(&y_data);
        let x_range = 0.0..(entries.len() as f64);

        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&WHITE).context("Failed to fill background")?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(self.title.as_deref().unwrap_or(""), ("sans-serif", 20))
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, y_range)
            .context("Failed to build chart")?;

        let label_for = |x: &f64| -> String {
            let idx = *x as usize;
            names.get(idx).cloned().unwrap_or_default()
        };
        let mut mesh = chart.configure_mesh();
        mesh.x_labels(names.len()).x_label_formatter(&label_for);
        if let Some(x) = &labels.x {
            mesh.x_desc(x.clone());
        }
        if let Some(y) = &labels.y {
            mesh.y_desc(y.clone());
        }
        mesh.draw().context("Failed to draw mesh")?;

        let bar_width = 0.8;
        for (idx, &value) in values.iter().enumerate() {
            let x_center = idx as f64 + 0.5;
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [
                        (x_center - bar_width / 2.0, 0.0),
                        (x_center + bar_width / 2.0, value),
                    ],
                    BLUE.filled(),
                )))
                .context("Failed to draw bar")?;
        }

        root.present().context("Failed to present drawing")?;
        Ok(())
    }

    /// Sequential line through the entries (time-series cards)
    fn draw_line(&mut self, entries: &[SeriesEntry], labels: &Labels) -> Result<()> {
        let names: Vec<String> = entries.iter().map(|e| e.name.clone()).collect();
        let points: Vec<(f64, f64)> = entries
            .iter()
            .enumerate()
            .map(|(idx, e)| (idx as f64, e.value))
            .collect();

        let y_data: Vec<f64> = points.iter().map(|&(_, y)| y).collect();
        let y_range = padded_range(&y_data);
        let x_max = (entries.len().saturating_sub(1)) as f64;
        let x_range = if x_max == 0.0 { -1.0..1.0 } else { 0.0..x_max };

        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&WHITE).context("Failed to fill background")?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(self.title.as_deref().unwrap_or(""), ("sans-serif", 20))
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, y_range)
            .context("Failed to build chart")?;

        let label_for = |x: &f64| -> String {
            if x.fract() != 0.0 || *x < 0.0 {
                return String::new();
            }
            names.get(*x as usize).cloned().unwrap_or_default()
        };
        let mut mesh = chart.configure_mesh();
        mesh.x_labels(names.len()).x_label_formatter(&label_for);
        if let Some(x) = &labels.x {
            mesh.x_desc(x.clone());
        }
        if let Some(y) = &labels.y {
            mesh.y_desc(y.clone());
        }
        mesh.draw().context("Failed to draw mesh")?;

        chart
            .draw_series(LineSeries::new(points, BLUE.stroke_width(2)))
            .context("Failed to draw line series")?;

        root.present().context("Failed to present drawing")?;
        Ok(())
    }

    /// Encode the canvas as PNG bytes
    fn encode_png(self) -> Result<Vec<u8>> {
        let mut png_bytes = Vec::new();
        {
            let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
            encoder
                .write_image(
                    &self.buffer,
                    self.width,
                    self.height,
                    image::ColorType::Rgb8,
                )
                .context("Failed to encode PNG")?;
        }
        Ok(png_bytes)
    }
}

/// Data range with 5% padding; a degenerate range widens by 1 on each side
fn padded_range(data: &[f64]) -> std::ops::Range<f64> {
    let min = data.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        (min - 1.0)..(max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding)..(max + padding)
    }
}
