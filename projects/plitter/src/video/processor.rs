use crate::video::VideoReader;
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use opencv::core::Mat;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    pub frames_read: usize,
    pub sampled_frames: usize,
    pub duration: Duration,
}

/// Receives each sampled frame.
pub trait FrameProcessor {
    /// `frame_index` is 1-based.
    fn process(&mut self, frame_index: usize, frame: Mat) -> Result<()>;
}

/// Blanket implementation so any closure with the right signature
/// automatically implements FrameProcessor.
impl<F> FrameProcessor for F
where
    F: FnMut(usize, Mat) -> Result<()>,
{
    fn process(&mut self, frame_index: usize, frame: Mat) -> Result<()> {
        self(frame_index, frame)
    }
}

pub struct VideoSession<'a> {
    pub reader: &'a mut dyn VideoReader,
    pub pb: ProgressBar,
    pub start_time: Instant,
    pub frames_read: usize,
    pub sampled_frames: usize,
}

impl<'a> VideoSession<'a> {
    pub fn new(reader: &'a mut dyn VideoReader) -> Result<Self> {
        let total_frames = reader.frame_count()?;

        let pb = ProgressBar::new(total_frames as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec:.1.yellow} fps, {eta})")?
                .progress_chars("#>-"),
        );

        Ok(Self {
            reader,
            pb,
            start_time: Instant::now(),
            frames_read: 0,
            sampled_frames: 0,
        })
    }
}

/// Walks the stream once, handing every `sample_interval`-th frame
/// (indices `interval, 2*interval, ...`) to `processor`. Other frames are skipped
/// without decoding when the reader supports it. An interval of 0 is treated as 1.
pub fn process_sampled<P>(
    reader: &mut dyn VideoReader,
    sample_interval: usize,
    mut processor: P,
) -> Result<ProcessingStats>
where
    P: FrameProcessor,
{
    let interval = sample_interval.max(1);
    let mut session = VideoSession::new(reader)?;

    loop {
        let frame_index = session.frames_read + 1;
        if frame_index % interval == 0 {
            match session.reader.next_frame()? {
                Some(frame) => {
                    processor.process(frame_index, frame)?;
                    session.sampled_frames += 1;
                }
                None => break,
            }
        } else if !session.reader.skip_frame()? {
            break;
        }
        session.frames_read = frame_index;
        session.pb.inc(1);
    }

    session.pb.finish_with_message("Done");

    Ok(ProcessingStats {
        frames_read: session.frames_read,
        sampled_frames: session.sampled_frames,
        duration: session.start_time.elapsed(),
    })
}
