// src/cli.rs

use crate::error::{ReportError, ReportResult};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory searched recursively for meet files (zip archives included)
    #[arg(short, long)]
    pub dir: PathBuf,

    /// Directory to write charts and animations into
    #[arg(short, long, default_value = "images")]
    pub output: PathBuf,

    /// Width of the output images in pixels
    #[arg(long, default_value_t = 1024)]
    pub width: u32,

    /// Height of the output images in pixels
    #[arg(long, default_value_t = 768)]
    pub height: u32,

    /// Skip the per-swimmer trend charts
    #[arg(long)]
    pub no_swimmer_charts: bool,

    /// Skip the per-event comparison charts
    #[arg(long)]
    pub no_event_charts: bool,

    /// Skip the per-event animated sequences
    #[arg(long)]
    pub no_animations: bool,

    /// Dates a swimmer needs in an event before a trend chart is drawn
    #[arg(long, default_value_t = 2)]
    pub min_swimmer_dates: usize,

    /// Observed dates a swimmer needs to appear on an event comparison chart
    #[arg(long, default_value_t = 2)]
    pub min_event_points: usize,

    /// Delay between animation frames, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub frame_delay_ms: u32,

    /// GIF quantizer speed, 1 (best quality) to 30 (fastest)
    #[arg(long, default_value_t = 10)]
    pub gif_speed: i32,

    /// Hide progress bars
    #[arg(short, long)]
    pub quiet: bool,
}

/// Everything the renderer needs to know about one run.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub output_dir: PathBuf,
    pub width: u32,
    pub height: u32,
    pub swimmer_charts: bool,
    pub event_charts: bool,
    pub animations: bool,
    /// A (swimmer, event) trend chart needs at least this many dates.
    pub min_swimmer_dates: usize,
    /// A swimmer joins an event comparison with at least this many
    /// observed axis positions.
    pub min_event_points: usize,
    pub frame_delay_ms: u32,
    pub gif_speed: i32,
    pub show_progress: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("images"),
            width: 1024,
            height: 768,
            swimmer_charts: true,
            event_charts: true,
            animations: true,
            min_swimmer_dates: 2,
            min_event_points: 2,
            frame_delay_ms: 1000,
            gif_speed: 10,
            show_progress: true,
        }
    }
}

impl From<&Args> for RenderConfig {
    fn from(args: &Args) -> Self {
        Self {
            output_dir: args.output.clone(),
            width: args.width,
            height: args.height,
            swimmer_charts: !args.no_swimmer_charts,
            event_charts: !args.no_event_charts,
            animations: !args.no_animations,
            min_swimmer_dates: args.min_swimmer_dates,
            min_event_points: args.min_event_points,
            frame_delay_ms: args.frame_delay_ms,
            gif_speed: args.gif_speed,
            show_progress: !args.quiet,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> ReportResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ReportError::InvalidConfig(format!(
                "image size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.min_swimmer_dates < 1 || self.min_event_points < 1 {
            return Err(ReportError::InvalidConfig(
                "observation thresholds must be at least 1".to_string(),
            ));
        }
        if !(1..=30).contains(&self.gif_speed) {
            return Err(ReportError::InvalidConfig(format!(
                "gif speed must be within 1..=30, got {}",
                self.gif_speed
            )));
        }
        Ok(())
    }

    pub fn swimmers_dir(&self) -> PathBuf {
        self.output_dir.join("swimmers")
    }

    pub fn events_dir(&self) -> PathBuf {
        self.output_dir.join("events")
    }

    pub fn animations_dir(&self) -> PathBuf {
        self.output_dir.join("animations")
    }
}
