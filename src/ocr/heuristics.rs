//! Spatial heuristics over OCR detections.
//!
//! Reconstructs reading order from word boxes and measures where on the
//! screen a detection sits. The verifier uses these to glue split clock
//! fragments back together and to tell status-bar text from content.

use super::OcrDetection;

/// Sort word detections into reading order.
///
/// Detections whose top edge is within `line_tolerance` pixels of the
/// first detection of the current line join that line; anything further
/// down starts a new line. Inside a line, left to right.
pub fn reading_order(detections: &[OcrDetection], line_tolerance: f32) -> Vec<&OcrDetection> {
    let mut by_top: Vec<&OcrDetection> = detections.iter().collect();
    by_top.sort_by(|a, b| a.bounding_box.min_y().total_cmp(&b.bounding_box.min_y()));

    let mut lines: Vec<Vec<&OcrDetection>> = Vec::new();
    let mut line_start = f32::NEG_INFINITY;
    for detection in by_top {
        let top = detection.bounding_box.min_y();
        match lines.last_mut() {
            Some(line) if (top - line_start).abs() <= line_tolerance => line.push(detection),
            _ => {
                line_start = top;
                lines.push(vec![detection]);
            }
        }
    }

    lines
        .into_iter()
        .flat_map(|mut line| {
            line.sort_by(|a, b| a.bounding_box.min_x().total_cmp(&b.bounding_box.min_x()));
            line
        })
        .collect()
}

/// Vertical position of `y` as a fraction of `image_height`.
///
/// `None` when the geometry is degenerate (zero or non-finite height).
pub fn relative_y(y: f32, image_height: f32) -> Option<f32> {
    if image_height > 0.0 && image_height.is_finite() {
        Some(y / image_height)
    } else {
        None
    }
}

/// Non-empty, trimmed lines of OCR text.
pub fn text_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::BoundingBox;

    fn word(text: &str, x: f32, y: f32) -> OcrDetection {
        OcrDetection::new(text, BoundingBox::from_rect(x, y, 20.0, 30.0))
    }

    #[test]
    fn groups_lines_then_orders_left_to_right() {
        let words = vec![
            word("37", 60.0, 14.0),
            word("Subscribed", 10.0, 400.0),
            word("1", 10.0, 12.0),
            word(":", 40.0, 18.0),
        ];
        let ordered: Vec<&str> = reading_order(&words, 10.0)
            .into_iter()
            .map(|d| d.text.as_str())
            .collect();
        assert_eq!(ordered, vec!["1", ":", "37", "Subscribed"]);
    }

    #[test]
    fn drift_beyond_tolerance_starts_new_line() {
        let words = vec![word("b", 10.0, 25.0), word("a", 50.0, 10.0)];
        let ordered: Vec<&str> = reading_order(&words, 10.0)
            .into_iter()
            .map(|d| d.text.as_str())
            .collect();
        assert_eq!(ordered, vec!["a", "b"]);
    }

    #[test]
    fn relative_y_guards_zero_height() {
        assert_eq!(relative_y(50.0, 100.0), Some(0.5));
        assert_eq!(relative_y(50.0, 0.0), None);
    }

    #[test]
    fn text_lines_skip_blank() {
        let lines: Vec<&str> = text_lines("  Follow \n\n Message\n").collect();
        assert_eq!(lines, vec!["Follow", "Message"]);
    }
}
