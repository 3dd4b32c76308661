//! Frame ranges for animated transfers.
//!
//! Animation files record the range they were captured over. Pasting or
//! re-capturing a sub-range goes through [`clamp_range`] so that every
//! range operation is validated before any curve is touched.

use serde::{Deserialize, Serialize};

use crate::util::{Error, Result};

/// Frame number. Hosts allow sub-frame keys, so frames are not integral.
pub type Frame = f64;

/// Inclusive frame range with `start <= end`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(Frame, Frame)", into = "(Frame, Frame)")]
pub struct FrameRange {
    start: Frame,
    end: Frame,
}

impl FrameRange {
    /// Create a range, rejecting `start > end`.
    pub fn new(start: Frame, end: Frame) -> Result<Self> {
        if start > end || start.is_nan() || end.is_nan() {
            return Err(Error::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Single-frame range.
    pub fn at(frame: Frame) -> Self {
        Self { start: frame, end: frame }
    }

    #[inline]
    pub fn start(&self) -> Frame {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Frame {
        self.end
    }

    /// Span in frames (`end - start`).
    #[inline]
    pub fn length(&self) -> Frame {
        self.end - self.start
    }

    #[inline]
    pub fn contains(&self, frame: Frame) -> bool {
        frame >= self.start && frame <= self.end
    }

    /// True if the two ranges share at least one frame (touching ends count).
    pub fn overlaps(&self, other: &FrameRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Smallest range covering both.
    pub fn union(&self, other: &FrameRange) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Same range moved by `offset` frames.
    pub fn offset(&self, offset: Frame) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

impl TryFrom<(Frame, Frame)> for FrameRange {
    type Error = Error;

    fn try_from((start, end): (Frame, Frame)) -> Result<Self> {
        Self::new(start, end)
    }
}

impl From<FrameRange> for (Frame, Frame) {
    fn from(range: FrameRange) -> Self {
        (range.start, range.end)
    }
}

/// Clamp `selected` to `captured`.
///
/// Fails with [`Error::OutOfBounds`] when the ranges do not overlap at all;
/// otherwise returns the intersection.
pub fn clamp_range(selected: FrameRange, captured: FrameRange) -> Result<FrameRange> {
    if !selected.overlaps(&captured) {
        return Err(Error::OutOfBounds {
            start: selected.start,
            end: selected.end,
            captured_start: captured.start,
            captured_end: captured.end,
        });
    }

    Ok(FrameRange {
        start: selected.start.max(captured.start),
        end: selected.end.min(captured.end),
    })
}
