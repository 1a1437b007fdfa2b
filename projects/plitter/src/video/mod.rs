pub mod opencv_reader;
pub mod processor;

use anyhow::Result;
use opencv::core::Mat;

/// Single forward pass over a decoded video stream.
pub trait VideoReader {
    /// Frame count reported by the container. May be an estimate.
    fn frame_count(&self) -> Result<usize>;
    /// Decodes the next frame. `Ok(None)` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<Mat>>;

    /// Advances past one frame without handing it out. Returns `false` at end of stream.
    fn skip_frame(&mut self) -> Result<bool> {
        Ok(self.next_frame()?.is_some())
    }
}
