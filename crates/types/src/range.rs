//! Numeric ranges: textual array-slice descriptors.
//!
//! The wire form is `min[:max](,min[:max])*`, one entry per array
//! dimension. A bare `min` selects the single element `(min, min)`; the
//! colon form requires `min < max` strictly, which is how an explicit
//! single-element selection (`"3"`) stays distinguishable from the
//! malformed `"3:3"`. Do not relax that check.

use std::fmt;
use std::str::FromStr;

use crate::status::StatusCode;

/// Upper bound on the textual form. Anything at or above this length is
/// rejected before parsing starts.
pub const MAX_RANGE_TEXT_LENGTH: usize = 1024;

/// Inclusive bounds for one array dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimension {
    pub min: u32,
    pub max: u32,
}

impl Dimension {
    /// Number of elements selected in this dimension.
    pub fn extent(self) -> usize {
        (self.max - self.min) as usize + 1
    }
}

/// A parsed slice descriptor: one [`Dimension`] per array dimension.
///
/// Never empty; an empty textual range is a parse error, and callers treat
/// "no range given" as the absence of a `NumericRange` altogether.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericRange {
    dimensions: Vec<Dimension>,
}

impl NumericRange {
    /// Parses the textual form.
    ///
    /// Errors: `BAD_INTERNAL_ERROR` when the text exceeds
    /// [`MAX_RANGE_TEXT_LENGTH`], `BAD_INDEX_RANGE_INVALID` for every
    /// syntactic or semantic failure (empty input, non-digits, `min > max`,
    /// `min == max` in colon form, trailing characters).
    pub fn parse(text: &str) -> Result<NumericRange, StatusCode> {
        if text.len() >= MAX_RANGE_TEXT_LENGTH {
            return Err(StatusCode::BAD_INTERNAL_ERROR);
        }
        if text.is_empty() {
            return Err(StatusCode::BAD_INDEX_RANGE_INVALID);
        }

        let bytes = text.as_bytes();
        let mut pos = 0;
        // Three dimensions cover almost every real matrix; the vector
        // doubles from there if a request goes deeper.
        let mut dimensions = Vec::with_capacity(3);
        loop {
            let min = parse_u32(bytes, &mut pos)?;
            let max = if pos < bytes.len() && bytes[pos] == b':' {
                pos += 1;
                let max = parse_u32(bytes, &mut pos)?;
                if min >= max {
                    return Err(StatusCode::BAD_INDEX_RANGE_INVALID);
                }
                max
            } else {
                min
            };
            dimensions.push(Dimension { min, max });

            if pos == bytes.len() {
                break;
            }
            if bytes[pos] != b',' {
                return Err(StatusCode::BAD_INDEX_RANGE_INVALID);
            }
            pos += 1;
            if pos == bytes.len() {
                // Trailing comma
                return Err(StatusCode::BAD_INDEX_RANGE_INVALID);
            }
        }

        Ok(NumericRange { dimensions })
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Total number of elements in the selected hyper-rectangle.
    pub fn element_count(&self) -> usize {
        self.dimensions.iter().map(|d| d.extent()).product()
    }
}

impl FromStr for NumericRange {
    type Err = StatusCode;

    fn from_str(s: &str) -> Result<NumericRange, StatusCode> {
        NumericRange::parse(s)
    }
}

impl fmt::Display for NumericRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.dimensions.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if d.min == d.max {
                write!(f, "{}", d.min)?;
            } else {
                write!(f, "{}:{}", d.min, d.max)?;
            }
        }
        Ok(())
    }
}

fn parse_u32(bytes: &[u8], pos: &mut usize) -> Result<u32, StatusCode> {
    let start = *pos;
    let mut value: u32 = 0;
    while *pos < bytes.len() && bytes[*pos].is_ascii_digit() {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add((bytes[*pos] - b'0') as u32))
            .ok_or(StatusCode::BAD_INDEX_RANGE_INVALID)?;
        *pos += 1;
    }
    if *pos == start {
        return Err(StatusCode::BAD_INDEX_RANGE_INVALID);
    }
    Ok(value)
}

/// Row-major flat offsets of the hyper-rectangle `range_dims` inside an
/// array of shape `array_extents`.
///
/// Both slices must have the same length and the range must already be
/// bounds-checked against the extents; this is pure index arithmetic, an
/// odometer that increments the innermost dimension first.
pub(crate) struct RangeOffsets<'a> {
    range: &'a [Dimension],
    strides: Vec<usize>,
    counters: Vec<u32>,
    done: bool,
}

impl<'a> RangeOffsets<'a> {
    pub(crate) fn new(range: &'a [Dimension], array_extents: &[u32]) -> RangeOffsets<'a> {
        debug_assert_eq!(range.len(), array_extents.len());
        let mut strides = vec![1usize; array_extents.len()];
        for i in (0..array_extents.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * array_extents[i + 1] as usize;
        }
        RangeOffsets {
            range,
            strides,
            counters: range.iter().map(|d| d.min).collect(),
            done: range.is_empty(),
        }
    }
}

impl Iterator for RangeOffsets<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.done {
            return None;
        }
        let offset = self
            .counters
            .iter()
            .zip(&self.strides)
            .map(|(&c, &s)| c as usize * s)
            .sum();

        // Advance the odometer, innermost dimension first.
        let mut dim = self.counters.len();
        loop {
            if dim == 0 {
                self.done = true;
                break;
            }
            dim -= 1;
            if self.counters[dim] < self.range[dim].max {
                self.counters[dim] += 1;
                break;
            }
            self.counters[dim] = self.range[dim].min;
        }
        Some(offset)
    }
}
