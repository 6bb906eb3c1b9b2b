//! Error and warning types shared by the render pipeline

use thiserror::Error;

/// A recoverable problem noticed while rendering a map.
///
/// Warnings never abort a render; they are collected per map and returned
/// next to the composited image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub message: String,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Per-map warning accumulator. Every pushed warning is also logged.
#[derive(Debug, Default, Clone)]
pub struct Warnings {
    items: Vec<Warning>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        let warning = Warning::new(message);
        log::warn!("{}", warning.message);
        self.items.push(warning);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.items
    }
}

/// Fatal precondition violations. Any of these aborts the current map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// Direction value outside the legacy 0..=255 range
    #[error("'{id}' has direction {value}, expected 0..=255")]
    InvalidDirection { id: String, value: i64 },
    /// Infantry sub-cell outside 0..=4
    #[error("'{id}' has sub-cell {value}, expected 0..=4")]
    InvalidSubcell { id: String, value: i64 },
    /// Frame index the asset never declares
    #[error("'{id}' requests frame {frame} but its asset has {frame_count} frames")]
    FrameOutOfRange { id: String, frame: usize, frame_count: usize },
    /// The rebuilt flag of a base structure was read before resolution
    #[error("rebuilt state of base structure '{id}' read before resolution")]
    UnresolvedRebuilt { id: String },
    /// Destination buffer does not match the map's pixel size
    #[error(
        "canvas is {actual_w}x{actual_h}, map needs {expected_w}x{expected_h}",
        expected_w = .expected.0,
        expected_h = .expected.1,
        actual_w = .actual.0,
        actual_h = .actual.1
    )]
    CanvasSize { expected: (u32, u32), actual: (u32, u32) },
    /// Radar scale of zero
    #[error("invalid radar scale {0}")]
    InvalidRadarScale(u32),
}

/// Result type alias for render operations.
pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_accumulate_in_order() {
        let mut warnings = Warnings::new();
        warnings.push("first");
        warnings.push(String::from("second"));

        let items = warnings.into_vec();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].message, "first");
        assert_eq!(items[1].message, "second");
    }

    #[test]
    fn test_frame_out_of_range_message() {
        let err =
            RenderError::FrameOutOfRange { id: "MTNK".to_string(), frame: 40, frame_count: 32 };
        assert_eq!(err.to_string(), "'MTNK' requests frame 40 but its asset has 32 frames");
    }

    #[test]
    fn test_canvas_size_message() {
        let err = RenderError::CanvasSize { expected: (48, 48), actual: (10, 12) };
        assert_eq!(err.to_string(), "canvas is 10x12, map needs 48x48");
    }
}
