//! Visualization utilities for TSP runs.
//!
//! Generates SVG plots of routes and of the length-vs-generation history,
//! with optional PNG conversion.

use crate::error::{Error, Result};
use crate::instance::CityTable;
use crate::statistics::RunStatistics;
use crate::tour::Tour;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
#[cfg(not(feature = "resvg"))]
use std::process::Command;
#[cfg(feature = "resvg")]
use resvg::usvg;
#[cfg(feature = "resvg")]
use resvg::render;
#[cfg(feature = "resvg")]
use resvg::FitTo;
#[cfg(feature = "resvg")]
use resvg::tiny_skia::{Pixmap, Transform};
#[cfg(feature = "resvg")]
use resvg::usvg::TreeParsing;

/// Receives a route whenever the search wants it drawn
pub trait RouteRenderer {
    fn render_route(
        &mut self,
        tour: &Tour,
        cities: &CityTable,
        generation: usize,
        output_dir: &Path,
    ) -> Result<()>;
}

/// Renderer that draws nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRender;

impl RouteRenderer for NoRender {
    fn render_route(&mut self, _: &Tour, _: &CityTable, _: usize, _: &Path) -> Result<()> {
        Ok(())
    }
}

/// Image format for rendered routes
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Svg,
    Png,
}

/// SVG visualization generator
pub struct Visualizer {
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
    /// Margin
    pub margin: f64,
    /// City marker radius
    pub node_radius: f64,
    /// Format used by [`RouteRenderer::render_route`]
    pub format: ImageFormat,
}

impl Default for Visualizer {
    fn default() -> Self {
        Visualizer {
            width: 800.0,
            height: 800.0,
            margin: 50.0,
            node_radius: 4.0,
            format: ImageFormat::Svg,
        }
    }
}

impl Visualizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(format: ImageFormat) -> Self {
        Visualizer {
            format,
            ..Self::default()
        }
    }

    /// File name used for the route drawn at `generation`
    pub fn route_file_name(generation: usize, format: ImageFormat) -> String {
        match format {
            ImageFormat::Svg => format!("route_gen_{}.svg", generation),
            ImageFormat::Png => format!("route_gen_{}.png", generation),
        }
    }

    /// Generate SVG of a closed route
    pub fn generate_route_svg(&self, cities: &CityTable, tour: &Tour, generation: usize) -> String {
        let mut svg = String::new();

        let (min_x, max_x, min_y, max_y) = cities.bounds();

        let scale_x = (self.width - 2.0 * self.margin) / (max_x - min_x).max(1e-9);
        let scale_y = (self.height - 2.0 * self.margin) / (max_y - min_y).max(1e-9);
        let scale = scale_x.min(scale_y);

        svg.push_str(&format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
    .city {{ fill: #e74c3c; stroke: #c0392b; stroke-width: 1; }}
    .start {{ fill: #2ecc71; stroke: #27ae60; stroke-width: 2; }}
    .end {{ fill: #f1c40f; stroke: #d4ac0d; stroke-width: 2; }}
    .edge {{ stroke: #2980b9; stroke-width: 2; fill: none; }}
    .label {{ font-family: Arial; font-size: 10px; fill: #2c3e50; }}
    .title {{ font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }}
</style>
<rect width="100%" height="100%" fill="#ffffff"/>
"##,
            self.width, self.height, self.width, self.height
        ));

        svg.push_str(&format!(
            r##"<text x="{}" y="25" class="title">Best route at generation {} | Length: {:.2}</text>
"##,
            self.margin,
            generation,
            cities.tour_length(tour.genes())
        ));

        let transform = |x: f64, y: f64| -> (f64, f64) {
            let tx = self.margin + (x - min_x) * scale;
            let ty = self.height - self.margin - (y - min_y) * scale;
            (tx, ty)
        };

        let genes = tour.genes();
        if genes.len() > 1 {
            let mut points = String::new();
            for &city in genes.iter().chain(genes.first()) {
                let c = cities.city(city);
                let (x, y) = transform(c.x, c.y);
                points.push_str(&format!("{:.2},{:.2} ", x, y));
            }
            svg.push_str(&format!(
                r##"<polyline points="{}" class="edge"/>
"##,
                points.trim_end()
            ));
        }

        for (index, city) in cities.cities().iter().enumerate() {
            let (x, y) = transform(city.x, city.y);
            svg.push_str(&format!(
                r##"<circle cx="{:.2}" cy="{:.2}" r="{}" class="city"/>
"##,
                x, y, self.node_radius
            ));
            if cities.len() <= 100 {
                svg.push_str(&format!(
                    r##"<text x="{:.2}" y="{:.2}" class="label" text-anchor="middle">{}</text>
"##,
                    x,
                    y - self.node_radius - 3.0,
                    index
                ));
            }
        }

        for (city, class) in [(tour.first(), "start"), (tour.last(), "end")] {
            if let Some(city) = city {
                let c = cities.city(city);
                let (x, y) = transform(c.x, c.y);
                svg.push_str(&format!(
                    r##"<circle cx="{:.2}" cy="{:.2}" r="{}" class="{}"/>
"##,
                    x,
                    y,
                    self.node_radius * 1.75,
                    class
                ));
            }
        }

        let legend_x = self.margin;
        let legend_y = self.height - 30.0;
        svg.push_str(&format!(
            r##"
<circle cx="{start_x}" cy="{marker_y}" r="6" class="start"/>
<text x="{start_label_x}" y="{label_y}" class="label">Start</text>
<circle cx="{end_x}" cy="{marker_y}" r="6" class="end"/>
<text x="{end_label_x}" y="{label_y}" class="label">End</text>
"##,
            start_x = legend_x + 7.0,
            start_label_x = legend_x + 20.0,
            end_x = legend_x + 77.0,
            end_label_x = legend_x + 90.0,
            marker_y = legend_y + 7.0,
            label_y = legend_y + 11.0,
        ));

        svg.push_str("</svg>");

        svg
    }

    /// Generate the length-vs-generation chart (best in blue, mean in red)
    pub fn generate_convergence_svg(&self, statistics: &RunStatistics) -> String {
        let best = statistics.best_lengths();
        let mean = statistics.mean_lengths();
        let mut svg = String::new();

        let width = self.width;
        let height = self.height * 0.75;
        let margin = 60.0;

        svg.push_str(&format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
    .best {{ stroke: #2980b9; stroke-width: 2; fill: none; }}
    .mean {{ stroke: #e74c3c; stroke-width: 1.5; fill: none; }}
    .axis {{ stroke: #2c3e50; stroke-width: 1; }}
    .label {{ font-family: Arial; font-size: 12px; fill: #2c3e50; }}
    .title {{ font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }}
</style>
<rect width="100%" height="100%" fill="#ffffff"/>
<text x="{}" y="25" class="title">Length vs generation</text>
"##,
            width, height, width, height, margin
        ));

        let plot_width = width - 2.0 * margin;
        let plot_height = height - 2.0 * margin;

        let y_max = best
            .iter()
            .chain(mean.iter())
            .cloned()
            .fold(0.0, f64::max)
            .max(1e-9);
        let y_min = best
            .iter()
            .chain(mean.iter())
            .cloned()
            .fold(f64::INFINITY, f64::min)
            .min(y_max);
        let y_span = (y_max - y_min).max(1e-9);
        let x_span = (best.len().saturating_sub(1)).max(1) as f64;

        let to_xy = |i: usize, v: f64| -> (f64, f64) {
            let x = margin + i as f64 / x_span * plot_width;
            let y = height - margin - (v - y_min) / y_span * plot_height;
            (x, y)
        };

        let left = margin;
        let right = width - margin;
        let top = margin;
        let bottom = height - margin;
        svg.push_str(&format!(
            r##"<line x1="{left}" y1="{bottom}" x2="{right}" y2="{bottom}" class="axis"/>
<line x1="{left}" y1="{top}" x2="{left}" y2="{bottom}" class="axis"/>
<text x="5" y="{max_label_y}" class="label">{y_max:.2}</text>
<text x="5" y="{bottom}" class="label">{y_min:.2}</text>
<text x="{right}" y="{gen_label_y}" class="label" text-anchor="end">{last_gen}</text>
"##,
            max_label_y = top + 4.0,
            gen_label_y = bottom + 18.0,
            last_gen = best.len().saturating_sub(1),
        ));

        for (series, class) in [(&mean, "mean"), (&best, "best")] {
            if series.is_empty() {
                continue;
            }
            let mut path = String::new();
            for (i, &v) in series.iter().enumerate() {
                let (x, y) = to_xy(i, v);
                if i == 0 {
                    path.push_str(&format!("M {:.2} {:.2}", x, y));
                } else {
                    path.push_str(&format!(" L {:.2} {:.2}", x, y));
                }
            }
            svg.push_str(&format!("<path d=\"{}\" class=\"{}\"/>\n", path, class));
        }

        let legend_x = width - margin - 170.0;
        svg.push_str(&format!(
            r##"<line x1="{legend_x}" y1="{best_y}" x2="{line_end}" y2="{best_y}" class="best"/>
<text x="{text_x}" y="{best_text_y}" class="label">Shortest length</text>
<line x1="{legend_x}" y1="{mean_y}" x2="{line_end}" y2="{mean_y}" class="mean"/>
<text x="{text_x}" y="{mean_text_y}" class="label">Average length</text>
"##,
            line_end = legend_x + 25.0,
            text_x = legend_x + 30.0,
            best_y = margin,
            best_text_y = margin + 4.0,
            mean_y = margin + 18.0,
            mean_text_y = margin + 22.0,
        ));

        svg.push_str("</svg>");

        svg
    }

    /// Save SVG to file
    pub fn save_svg<P: AsRef<Path>>(&self, svg: &str, path: P) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(svg.as_bytes())?;
        Ok(())
    }

    /// Save SVG as PNG.
    /// Uses resvg when the feature is enabled, otherwise tries `rsvg-convert`,
    /// then `magick convert`, then `inkscape`.
    pub fn save_png<P: AsRef<Path>>(&self, svg: &str, path: P) -> Result<()> {
        Self::svg_to_png_file(svg, path.as_ref())
    }

    /// Render an SVG string directly to PNG file using resvg.
    #[cfg(feature = "resvg")]
    pub fn svg_to_png_file(svg: &str, out: &Path) -> Result<()> {
        let opt = usvg::Options::default();
        let rtree = usvg::Tree::from_str(svg, &opt)
            .map_err(|e| Error::Render(format!("usvg parse error: {}", e)))?;
        let (w, h) = svg_canvas_size(svg);
        let mut pixmap = Pixmap::new(w, h)
            .ok_or_else(|| Error::Render("failed to create pixmap".to_string()))?;
        render(&rtree, FitTo::Original, Transform::default(), pixmap.as_mut())
            .ok_or_else(|| Error::Render("resvg render failed".to_string()))?;
        pixmap
            .save_png(out)
            .map_err(|e| Error::Render(format!("save_png failed: {}", e)))?;
        Ok(())
    }

    /// Render an SVG string to PNG through an external converter.
    #[cfg(not(feature = "resvg"))]
    pub fn svg_to_png_file(svg: &str, out: &Path) -> Result<()> {
        let tmp = out.with_extension("svg.tmp");
        std::fs::write(&tmp, svg)?;
        let converted = run_converters(&tmp, out);
        let _ = std::fs::remove_file(&tmp);

        if converted {
            Ok(())
        } else {
            Err(Error::Render(
                "no SVG->PNG converter succeeded (tried rsvg-convert, magick, inkscape)"
                    .to_string(),
            ))
        }
    }

    /// Write `svg` as `path`, converting to PNG when `format` asks for it.
    ///
    /// A failed PNG conversion falls back to writing the SVG next to it.
    /// Returns the path actually written.
    pub fn write_image(&self, svg: &str, path: &Path, format: ImageFormat) -> Result<PathBuf> {
        match format {
            ImageFormat::Svg => {
                let path = path.with_extension("svg");
                self.save_svg(svg, &path)?;
                Ok(path)
            }
            ImageFormat::Png => {
                let png_path = path.with_extension("png");
                match self.save_png(svg, &png_path) {
                    Ok(()) => Ok(png_path),
                    Err(e) => {
                        let svg_path = path.with_extension("svg");
                        log::warn!(
                            "PNG conversion failed ({}), saving {} instead",
                            e,
                            svg_path.display()
                        );
                        self.save_svg(svg, &svg_path)?;
                        Ok(svg_path)
                    }
                }
            }
        }
    }

    /// Write the convergence chart into `output_dir`
    pub fn save_convergence_chart(
        &self,
        statistics: &RunStatistics,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let svg = self.generate_convergence_svg(statistics);
        self.write_image(&svg, &output_dir.join("length_vs_generation"), self.format)
    }
}

impl RouteRenderer for Visualizer {
    fn render_route(
        &mut self,
        tour: &Tour,
        cities: &CityTable,
        generation: usize,
        output_dir: &Path,
    ) -> Result<()> {
        let svg = self.generate_route_svg(cities, tour, generation);
        let path = output_dir.join(Self::route_file_name(generation, self.format));
        let written = self.write_image(&svg, &path, self.format)?;
        log::debug!("render: generation {} -> {}", generation, written.display());
        Ok(())
    }
}

#[cfg(feature = "resvg")]
fn svg_canvas_size(svg: &str) -> (u32, u32) {
    let mut w = 800u32;
    let mut h = 800u32;
    if let Some(cap) = svg.split_once("width=\"") {
        if let Some(rest) = cap.1.split_once('"') {
            if let Ok(v) = rest.0.parse::<f64>() {
                w = v as u32;
            }
        }
    }
    if let Some(cap) = svg.split_once("height=\"") {
        if let Some(rest) = cap.1.split_once('"') {
            if let Ok(v) = rest.0.parse::<f64>() {
                h = v as u32;
            }
        }
    }
    (w.max(1), h.max(1))
}

#[cfg(not(feature = "resvg"))]
fn run_converters(svg_path: &Path, out: &Path) -> bool {
    let svg_arg = svg_path.to_string_lossy().to_string();
    let out_arg = out.to_string_lossy().to_string();

    let attempts: [(&str, Vec<&str>); 3] = [
        ("rsvg-convert", vec!["-o", &out_arg, &svg_arg]),
        ("magick", vec!["convert", &svg_arg, &out_arg]),
        (
            "inkscape",
            vec![&svg_arg, "--export-type=png", "--export-filename", &out_arg],
        ),
    ];

    for (program, args) in attempts.iter() {
        if let Ok(status) = Command::new(program).args(args).status() {
            if status.success() {
                return true;
            }
        }
    }

    false
}
