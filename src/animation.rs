// src/animation.rs

use crate::error::{ReportError, ReportResult};
use crate::model::EventKey;
use gif::{Encoder, Frame, Repeat};
use image::RgbImage;
use std::collections::btree_map::{BTreeMap, Entry};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// An open animated GIF that frames are streamed into.
///
/// The file is only complete after [`AnimationSequence::finish`], which
/// consumes the handle, writes the trailer and flushes the file.
pub struct AnimationSequence {
    path: PathBuf,
    encoder: Encoder<BufWriter<File>>,
    width: u16,
    height: u16,
    /// Frame delay in hundredths of a second.
    delay: u16,
    speed: i32,
    frames: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationSummary {
    pub path: PathBuf,
    pub frames: usize,
}

impl AnimationSequence {
    pub fn create(path: &Path, width: u32, height: u32, delay_ms: u32, speed: i32) -> ReportResult<Self> {
        let (Ok(gif_width), Ok(gif_height)) = (u16::try_from(width), u16::try_from(height)) else {
            return Err(ReportError::InvalidConfig(format!(
                "animation frames are limited to 65535x65535, got {}x{}",
                width, height
            )));
        };
        ensure_parent(path)?;
        let file = File::create(path).map_err(|e| ReportError::io(path, e))?;
        let mut encoder = Encoder::new(BufWriter::new(file), gif_width, gif_height, &[])
            .map_err(|e| gif_error(path, e))?;
        encoder.set_repeat(Repeat::Infinite).map_err(|e| gif_error(path, e))?;
        debug!(path = %path.display(), "opened animation");
        Ok(Self {
            path: path.to_path_buf(),
            encoder,
            width: gif_width,
            height: gif_height,
            delay: u16::try_from(delay_ms / 10).unwrap_or(u16::MAX),
            speed,
            frames: 0,
        })
    }

    pub fn push(&mut self, image: &RgbImage) -> ReportResult<()> {
        if image.width() != u32::from(self.width) || image.height() != u32::from(self.height) {
            return Err(ReportError::InvalidConfig(format!(
                "frame is {}x{} but {} expects {}x{}",
                image.width(),
                image.height(),
                self.path.display(),
                self.width,
                self.height
            )));
        }
        let mut frame = Frame::from_rgb_speed(self.width, self.height, image.as_raw(), self.speed);
        frame.delay = self.delay;
        self.encoder.write_frame(&frame).map_err(|e| gif_error(&self.path, e))?;
        self.frames += 1;
        Ok(())
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn finish(self) -> ReportResult<AnimationSummary> {
        let AnimationSequence { path, encoder, frames, .. } = self;
        let mut writer = encoder.into_inner().map_err(|e| ReportError::io(&path, e))?;
        writer.flush().map_err(|e| ReportError::io(&path, e))?;
        writer.get_ref().sync_all().map_err(|e| ReportError::io(&path, e))?;
        info!(path = %path.display(), frames, "finished animation");
        Ok(AnimationSummary { path, frames })
    }
}

fn gif_error(path: &Path, source: gif::EncodingError) -> ReportError {
    ReportError::Gif { path: path.to_path_buf(), source }
}

/// One lazily opened [`AnimationSequence`] per event.
pub struct SequenceSet {
    dir: PathBuf,
    delay_ms: u32,
    speed: i32,
    open: BTreeMap<EventKey, AnimationSequence>,
}

impl SequenceSet {
    pub fn new(dir: impl Into<PathBuf>, delay_ms: u32, speed: i32) -> Self {
        Self { dir: dir.into(), delay_ms, speed, open: BTreeMap::new() }
    }

    pub fn path_for(&self, event: &EventKey) -> PathBuf {
        self.dir.join(format!("{}.gif", crate::renderer::event_file_stem(event)))
    }

    /// Appends a frame to the event's sequence, opening it on first use.
    /// The first frame fixes the sequence's dimensions.
    pub fn append(&mut self, event: EventKey, frame: &RgbImage) -> ReportResult<()> {
        let path = self.path_for(&event);
        let sequence = match self.open.entry(event) {
            Entry::Occupied(open) => open.into_mut(),
            Entry::Vacant(slot) => slot.insert(AnimationSequence::create(
                &path,
                frame.width(),
                frame.height(),
                self.delay_ms,
                self.speed,
            )?),
        };
        sequence.push(frame)
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Finalizes every open sequence, in event order.
    pub fn finish_all(self) -> ReportResult<Vec<AnimationSummary>> {
        self.open.into_values().map(AnimationSequence::finish).collect()
    }
}

/// Creates the parent directory of `path` if it is missing.
pub(crate) fn ensure_parent(path: &Path) -> ReportResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| ReportError::io(parent, e))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Stroke;
    use image::codecs::gif::GifDecoder;
    use image::{AnimationDecoder, Rgb};
    use std::io::BufReader;

    fn solid(width: u32, height: u32, shade: u8) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([shade, shade, 255 - shade]))
    }

    fn decoded_frames(path: &Path) -> usize {
        let reader = BufReader::new(File::open(path).unwrap());
        let decoder = GifDecoder::new(reader).unwrap();
        decoder.into_frames().collect_frames().unwrap().len()
    }

    #[test]
    fn sequence_writes_all_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/anim.gif");
        let mut sequence = AnimationSequence::create(&path, 16, 8, 200, 30).unwrap();
        for shade in [0u8, 100, 200] {
            sequence.push(&solid(16, 8, shade)).unwrap();
        }
        let summary = sequence.finish().unwrap();
        assert_eq!(summary.frames, 3);
        assert_eq!(decoded_frames(&path), 3);
    }

    #[test]
    fn finish_writes_trailer_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.gif");
        let mut sequence = AnimationSequence::create(&path, 4, 4, 100, 30).unwrap();
        sequence.push(&solid(4, 4, 50)).unwrap();
        sequence.finish().unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"GIF89a"));
        assert_eq!(bytes.last(), Some(&0x3B));
    }

    #[test]
    fn finish_reports_unwritable_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.gif");
        let mut sequence = AnimationSequence::create(&path, 4, 4, 100, 30).unwrap();
        sequence.push(&solid(4, 4, 50)).unwrap();
        // Swap the destination for a read-only handle so the trailer and
        // flush cannot reach the disk.
        let read_only = File::open(&path).unwrap();
        sequence.encoder = Encoder::new(BufWriter::new(read_only), 4, 4, &[]).unwrap();
        assert!(matches!(sequence.finish(), Err(ReportError::Io { .. })));
    }

    #[test]
    fn frame_size_must_match_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let mut sequence = AnimationSequence::create(&dir.path().join("a.gif"), 8, 8, 100, 30).unwrap();
        assert!(matches!(sequence.push(&solid(4, 8, 0)), Err(ReportError::InvalidConfig(_))));
        assert_eq!(sequence.frames(), 0);
    }

    #[test]
    fn set_opens_one_sequence_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let free = EventKey::new(100, Stroke::Freestyle);
        let back = EventKey::new(50, Stroke::Backstroke);

        let mut set = SequenceSet::new(dir.path().join("animations"), 100, 30);
        assert!(set.is_empty());
        set.append(free, &solid(8, 8, 10)).unwrap();
        set.append(back, &solid(8, 8, 20)).unwrap();
        set.append(free, &solid(8, 8, 30)).unwrap();
        assert_eq!(set.len(), 2);

        let summaries = set.finish_all().unwrap();
        let frames: Vec<usize> = summaries.iter().map(|s| s.frames).collect();
        // event order: 50 Backstroke before 100 Freestyle
        assert_eq!(frames, vec![1, 2]);
        assert!(summaries[1].path.ends_with("animations/100_Freestyle.gif"));
        assert_eq!(decoded_frames(&summaries[1].path), 2);
    }
}
