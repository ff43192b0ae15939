//! Position trust for timestamp detections.
//!
//! Phone status bars and desktop taskbars render the system clock at the
//! very top or bottom of the screen. Numbers in between are usually video
//! durations or post times.

use crate::config::ScoringPolicy;
use crate::ocr::heuristics::relative_y;
use crate::ocr::OcrDetection;

/// `policy.position_bonus` when the detection's vertical center is inside
/// the top or bottom status-bar band, otherwise 0. Degenerate geometry
/// scores 0.
pub fn position_score(detection: &OcrDetection, image_height: f32, policy: &ScoringPolicy) -> f32 {
    let Some(fraction) = relative_y(detection.bounding_box.center_y(), image_height) else {
        return 0.0;
    };
    if fraction <= policy.status_bar_band || fraction >= 1.0 - policy.status_bar_band {
        policy.position_bonus
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::BoundingBox;

    fn at(y: f32) -> OcrDetection {
        OcrDetection::new("14:37", BoundingBox::from_rect(0.0, y, 60.0, 20.0))
    }

    #[test]
    fn bands_score_two() {
        let policy = ScoringPolicy::default();
        assert_eq!(position_score(&at(10.0), 1000.0, &policy), 2.0);
        assert_eq!(position_score(&at(940.0), 1000.0, &policy), 2.0);
    }

    #[test]
    fn content_scores_zero() {
        let policy = ScoringPolicy::default();
        assert_eq!(position_score(&at(490.0), 1000.0, &policy), 0.0);
        // center at 0.16
        assert_eq!(position_score(&at(150.0), 1000.0, &policy), 0.0);
    }

    #[test]
    fn band_edges_are_inclusive() {
        let policy = ScoringPolicy::default();
        // center exactly 0.15 and 0.85
        assert_eq!(position_score(&at(140.0), 1000.0, &policy), 2.0);
        assert_eq!(position_score(&at(840.0), 1000.0, &policy), 2.0);
    }

    #[test]
    fn zero_height_is_neutral() {
        let policy = ScoringPolicy::default();
        assert_eq!(position_score(&at(10.0), 0.0, &policy), 0.0);
    }
}
