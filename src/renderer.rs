// src/renderer.rs

//! Chart planning and drawing.
//!
//! Each pass first plans its charts from the [`AggregationIndex`] (which
//! swimmers and events qualify, which points go where) and then rasterizes
//! the plans with `plotters` into `image` buffers. Planning is pure; only
//! drawing touches fonts and the filesystem.

use crate::analyzer::{AggregationIndex, DateAxis};
use crate::animation::{ensure_parent, SequenceSet};
use crate::cli::RenderConfig;
use crate::error::{ReportError, ReportResult};
use crate::interpolate::fill_gaps;
use crate::model::{EventKey, SwimmerKey};
use crate::sanitize::safe_filename;
use image::RgbImage;
use indicatif::{ProgressBar, ProgressStyle};
use palette::{FromColor, Lch, Srgb};
use plotters::coord::Shift;
use plotters::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::error::Error;
use std::ops::Range;
use std::path::Path;
use tracing::{debug, info};

const MAX_DATE_LABELS: usize = 16;
const GOLDEN_ANGLE: f32 = 137.507_76;

/// One swimmer's times in one event, on the shared date axis.
#[derive(Debug, Clone, PartialEq)]
pub struct SwimmerChart {
    pub swimmer: SwimmerKey,
    pub event: EventKey,
    /// Observed `(axis position, time)` pairs in date order.
    pub points: Vec<(usize, f64)>,
    /// The event's `(best, worst)` times.
    pub y_range: (f64, f64),
}

impl SwimmerChart {
    pub fn title(&self) -> String {
        format!("{} {}", self.swimmer, self.event)
    }

    pub fn file_stem(&self) -> String {
        safe_filename(&format!(
            "{}_{}_{}_{}",
            self.swimmer.last, self.swimmer.first, self.event.distance, self.event.stroke
        ))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventSeries {
    pub swimmer: SwimmerKey,
    pub observed: Vec<(usize, f64)>,
    /// One value per axis position, gaps filled by [`fill_gaps`].
    pub dense: Vec<f64>,
}

/// Every qualifying swimmer of one event, in alphabetical order.
#[derive(Debug, Clone, PartialEq)]
pub struct EventChart {
    pub event: EventKey,
    pub y_range: (f64, f64),
    pub series: Vec<EventSeries>,
}

impl EventChart {
    pub fn title(&self) -> String {
        self.event.to_string()
    }
}

pub fn event_file_stem(event: &EventKey) -> String {
    safe_filename(&format!("{}_{}", event.distance, event.stroke))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub swimmer_charts: usize,
    pub event_charts: usize,
    pub animations: usize,
    pub frames: usize,
}

/// Trend charts for every (swimmer, event) pair with enough dates,
/// swimmers in alphabetical order.
pub fn plan_swimmer_charts(index: &AggregationIndex, config: &RenderConfig) -> Vec<SwimmerChart> {
    let axis = index.axis();
    let mut charts = Vec::new();

    for (swimmer, events) in index.by_swimmer().iter() {
        for (event, series) in events {
            if series.len() < config.min_swimmer_dates {
                debug!(%swimmer, %event, dates = series.len(), "too few dates for trend chart");
                continue;
            }
            let Some(bounds) = index.bounds(event) else {
                continue;
            };
            charts.push(SwimmerChart {
                swimmer: swimmer.clone(),
                event: *event,
                points: axis.points(series),
                y_range: (bounds.best, bounds.worst),
            });
        }
    }
    charts
}

/// Comparison charts for every event with at least one qualifying swimmer.
pub fn plan_event_charts(index: &AggregationIndex, config: &RenderConfig) -> Vec<EventChart> {
    let axis = index.axis();
    let mut charts = Vec::new();

    for (event, swimmers) in index.by_event().iter() {
        let Some(bounds) = index.bounds(event) else {
            continue;
        };
        let mut series = Vec::new();
        for (swimmer, times) in swimmers {
            let aligned = axis.align(times);
            let observed = aligned.iter().flatten().count();
            if observed < config.min_event_points {
                debug!(%swimmer, %event, observed, "too few points for comparison");
                continue;
            }
            let Some(dense) = fill_gaps(&aligned) else {
                debug!(%swimmer, %event, "series cannot be interpolated");
                continue;
            };
            series.push(EventSeries {
                swimmer: swimmer.clone(),
                observed: axis.points(times),
                dense,
            });
        }
        if series.is_empty() {
            debug!(%event, "no swimmer qualifies for comparison");
            continue;
        }
        charts.push(EventChart { event: *event, y_range: (bounds.best, bounds.worst), series });
    }
    charts
}

/// Runs every enabled pass and writes its artifacts under
/// `config.output_dir`.
pub fn render_report(index: &AggregationIndex, config: &RenderConfig) -> ReportResult<RenderSummary> {
    config.validate()?;
    let mut summary = RenderSummary::default();

    if config.swimmer_charts || config.animations {
        render_swimmer_pass(index, config, &mut summary)?;
    }
    if config.event_charts {
        render_event_pass(index, config, &mut summary)?;
    }

    info!(
        swimmer_charts = summary.swimmer_charts,
        event_charts = summary.event_charts,
        animations = summary.animations,
        frames = summary.frames,
        "report written to {}",
        config.output_dir.display()
    );
    Ok(summary)
}

fn render_swimmer_pass(
    index: &AggregationIndex,
    config: &RenderConfig,
    summary: &mut RenderSummary,
) -> ReportResult<()> {
    let charts = plan_swimmer_charts(index, config);
    let mut sequences = SequenceSet::new(config.animations_dir(), config.frame_delay_ms, config.gif_speed);
    let swimmers_dir = config.swimmers_dir();

    let bar = progress_bar(charts.len(), "Rendering swimmer charts", config.show_progress);
    for chart in &charts {
        let image = rasterize(config.width, config.height, |root| {
            draw_swimmer_chart(root, chart, index.axis())
        })?;
        if config.swimmer_charts {
            let path = swimmers_dir.join(format!("{}.png", chart.file_stem()));
            save_png(&image, &path)?;
            summary.swimmer_charts += 1;
        }
        if config.animations {
            sequences.append(chart.event, &image)?;
            summary.frames += 1;
        }
        bar.inc(1);
    }
    bar.finish_with_message("Swimmer charts complete");

    summary.animations = sequences.finish_all()?.len();
    Ok(())
}

fn render_event_pass(
    index: &AggregationIndex,
    config: &RenderConfig,
    summary: &mut RenderSummary,
) -> ReportResult<()> {
    let charts = plan_event_charts(index, config);
    let events_dir = config.events_dir();

    let bar = progress_bar(charts.len(), "Rendering event charts", config.show_progress);
    for chart in &charts {
        let colors = swimmer_colors(chart.series.len());
        let image = rasterize(config.width, config.height, |root| {
            draw_event_chart(root, chart, index.axis(), &colors)
        })?;
        let path = events_dir.join(format!("{}.png", event_file_stem(&chart.event)));
        save_png(&image, &path)?;
        summary.event_charts += 1;
        bar.inc(1);
    }
    bar.finish_with_message("Event charts complete");
    Ok(())
}

fn progress_bar(len: usize, message: &'static str, visible: bool) -> ProgressBar {
    let bar = if visible { ProgressBar::new(len as u64) } else { ProgressBar::hidden() };
    let style = ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar.set_message(message);
    bar
}

/// Draws into an in-memory RGB buffer and hands it back as an image.
fn rasterize<F>(width: u32, height: u32, draw: F) -> ReportResult<RgbImage>
where
    F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> Result<(), Box<dyn Error>>,
{
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw(&root).map_err(|e| ReportError::Plot(e.to_string()))?;
        root.present().map_err(|e| ReportError::Plot(e.to_string()))?;
    }
    RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| ReportError::Plot("raster buffer has the wrong size".to_string()))
}

fn save_png(image: &RgbImage, path: &Path) -> ReportResult<()> {
    ensure_parent(path)?;
    image.save(path)?;
    debug!(path = %path.display(), "wrote chart");
    Ok(())
}

fn draw_swimmer_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &SwimmerChart,
    axis: &DateAxis,
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let mut ctx = ChartBuilder::on(root)
        .caption(chart.title(), ("sans-serif", 32).into_font())
        .margin(20)
        .x_label_area_size(90)
        .y_label_area_size(70)
        .build_cartesian_2d(x_axis_range(axis), y_axis_range(chart.y_range))?;

    ctx.configure_mesh()
        .x_labels(axis.len().min(MAX_DATE_LABELS))
        .x_label_formatter(&|x| date_label(axis, *x))
        .x_label_style(("sans-serif", 12).into_font().transform(FontTransform::Rotate90))
        .y_label_formatter(&|y| format!("{:.2}", y))
        .y_desc("Time (s)")
        .draw()?;

    let points: Vec<(f64, f64)> = chart.points.iter().map(|&(x, y)| (x as f64, y)).collect();
    ctx.draw_series(LineSeries::new(points.iter().copied(), BLUE.stroke_width(2)))?;
    ctx.draw_series(points.iter().map(|&(x, y)| {
        EmptyElement::at((x, y))
            + Circle::new((0, 0), 4, BLUE.filled())
            + Text::new(time_label(y), (6, -16), ("sans-serif", 14).into_font())
    }))?;

    Ok(())
}

fn draw_event_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &EventChart,
    axis: &DateAxis,
    colors: &[RGBColor],
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let mut ctx = ChartBuilder::on(root)
        .caption(chart.title(), ("sans-serif", 32).into_font())
        .margin(20)
        .x_label_area_size(90)
        .y_label_area_size(70)
        .build_cartesian_2d(x_axis_range(axis), y_axis_range(chart.y_range))?;

    ctx.configure_mesh()
        .x_labels(axis.len().min(MAX_DATE_LABELS))
        .x_label_formatter(&|x| date_label(axis, *x))
        .x_label_style(("sans-serif", 12).into_font().transform(FontTransform::Rotate90))
        .y_label_formatter(&|y| format!("{:.2}", y))
        .y_desc("Time (s)")
        .draw()?;

    for (series, &color) in chart.series.iter().zip(colors) {
        // Reconstructed values: dashed, thin.
        ctx.draw_series(DashedLineSeries::new(
            series.dense.iter().enumerate().map(|(x, y)| (x as f64, *y)),
            8,
            6,
            color.stroke_width(1),
        ))?;

        // Observed swims: solid line with filled markers.
        let observed: Vec<(f64, f64)> = series.observed.iter().map(|&(x, y)| (x as f64, y)).collect();
        ctx.draw_series(LineSeries::new(observed.iter().copied(), color.stroke_width(2)))?
            .label(series.swimmer.legend_label())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        ctx.draw_series(observed.iter().map(|&p| Circle::new(p, 5, color.filled())))?;
    }

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

fn x_axis_range(axis: &DateAxis) -> Range<f64> {
    -0.5..(axis.len().max(1) as f64 - 0.5)
}

/// The event's `best..worst`, widened when both are equal so the axis is
/// never empty.
fn y_axis_range((best, worst): (f64, f64)) -> Range<f64> {
    if worst - best < 1e-9 {
        (best - 0.5)..(worst + 0.5)
    } else {
        best..worst
    }
}

/// Point annotation: finals times are recorded to hundredths.
fn time_label(time: f64) -> String {
    format!("{:.2}", time)
}

/// Date at an axis position; empty between positions.
fn date_label(axis: &DateAxis, x: f64) -> String {
    let rounded = x.round();
    if rounded < 0.0 || (x - rounded).abs() > 1e-6 {
        return String::new();
    }
    axis.date_at(rounded as usize)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Distinct, stable colors for the swimmers of one chart.
pub fn swimmer_colors(count: usize) -> Vec<RGBColor> {
    let mut rng = StdRng::seed_from_u64(42); // Seed for deterministic colors
    let start = rng.gen_range(0.0f32..360.0f32);
    (0..count)
        .map(|i| {
            let hue = (start + i as f32 * GOLDEN_ANGLE) % 360.0;
            let color = Lch::new(55.0f32, 75.0f32, hue);
            let srgb: Srgb<f32> = Srgb::from_color(color);
            let (r, g, b) = srgb.into_components();
            RGBColor((r * 255.0f32) as u8, (g * 255.0f32) as u8, (b * 255.0f32) as u8)
        })
        .collect()
}
