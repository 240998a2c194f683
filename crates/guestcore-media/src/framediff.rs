//! Frame-difference row uploads.
//!
//! Playback redraws only the raster rows that changed between consecutive
//! frames. The uploader keeps the previously presented RGB frame, compares
//! row bytes, and hands back the changed rows already converted to the
//! BGRA layout the presentation surface wants.

use crate::bitmap::Frame;

/// One changed raster row, ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowUpload {
    /// Row index within the frame.
    pub y: u32,
    /// Row pixels as B, G, R, A with alpha fixed at 255.
    pub bgra: Vec<u8>,
}

/// Tracks the previously uploaded frame and yields changed rows.
#[derive(Debug, Default)]
pub struct FrameUploader {
    width: u32,
    height: u32,
    previous: Vec<u8>,
    force_full: bool,
}

impl FrameUploader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the next update uploads every row regardless of content.
    pub fn force_full(&mut self) {
        self.force_full = true;
    }

    /// Compare against the previous frame and return the changed rows.
    ///
    /// The first frame, a dimension change, and a pending [`force_full`]
    /// request each upload all rows. Changed rows replace their previous
    /// copy so the next comparison starts from this frame.
    ///
    /// [`force_full`]: FrameUploader::force_full
    pub fn update(&mut self, frame: &Frame) -> Vec<RowUpload> {
        let full = self.force_full
            || self.width != frame.width()
            || self.height != frame.height();
        if full {
            self.width = frame.width();
            self.height = frame.height();
            self.previous = frame.data().to_vec();
            self.force_full = false;
            return (0..self.height)
                .map(|y| RowUpload {
                    y,
                    bgra: rgb_row_to_bgra(self.row(frame, y)),
                })
                .collect();
        }

        let row_bytes = frame.width() as usize * 3;
        let mut uploads = Vec::new();
        for y in 0..frame.height() {
            let range = y as usize * row_bytes..(y as usize + 1) * row_bytes;
            let row = &frame.data()[range.clone()];
            if row != &self.previous[range.clone()] {
                self.previous[range].copy_from_slice(row);
                uploads.push(RowUpload {
                    y,
                    bgra: rgb_row_to_bgra(row),
                });
            }
        }
        uploads
    }

    fn row<'a>(&self, frame: &'a Frame, y: u32) -> &'a [u8] {
        let row_bytes = frame.width() as usize * 3;
        &frame.data()[y as usize * row_bytes..(y as usize + 1) * row_bytes]
    }
}

/// Convert one RGB row to BGRA with opaque alpha.
pub fn rgb_row_to_bgra(row: &[u8]) -> Vec<u8> {
    debug_assert_eq!(row.len() % 3, 0);
    let mut out = Vec::with_capacity(row.len() / 3 * 4);
    for pixel in row.chunks_exact(3) {
        out.extend_from_slice(&[pixel[2], pixel[1], pixel[0], 255]);
    }
    out
}
