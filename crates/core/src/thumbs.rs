//! Thumbnail path helpers.

use crate::clip::ClipTime;

/// Optimistic thumbnail path tried before asking the appliance for a
/// generated URI: `/remote/{camera}{secs}{millis}.jpg` with the
/// millisecond component zero-padded to three digits.
pub fn fallback_thumbnail_path(camera_name: &str, time: ClipTime) -> String {
    format!(
        "/remote/{}{}{:03}.jpg",
        camera_name, time.epoch_secs, time.millis
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_millis_to_three_digits() {
        let path = fallback_thumbnail_path("Driveway", ClipTime::new(1_650_000_000, 7));
        assert_eq!(path, "/remote/Driveway1650000000007.jpg");
    }

    #[test]
    fn keeps_three_digit_millis() {
        let path = fallback_thumbnail_path("Driveway", ClipTime::new(1_650_000_000, 987));
        assert_eq!(path, "/remote/Driveway1650000000987.jpg");
    }
}
