use crate::shared::region::Region;

/// Picks the region with the largest area, the closest face in practice.
///
/// Ties go to the earliest region in detector order. Returns `None` when
/// nothing was detected.
pub fn select_target(regions: &[Region]) -> Option<&Region> {
    regions.iter().fold(None, |best: Option<&Region>, r| match best {
        Some(b) if b.area() >= r.area() => Some(b),
        _ => Some(r),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_has_no_target() {
        assert!(select_target(&[]).is_none());
    }

    #[test]
    fn test_single_region_is_selected() {
        let regions = [Region::new(10, 10, 40, 40)];
        assert_eq!(select_target(&regions), Some(&regions[0]));
    }

    #[test]
    fn test_largest_area_wins() {
        let regions = [
            Region::new(0, 0, 40, 40),
            Region::new(100, 50, 80, 60),
            Region::new(200, 10, 50, 50),
        ];
        assert_eq!(select_target(&regions), Some(&regions[1]));
    }

    #[test]
    fn test_area_not_width_decides() {
        // Wide but short loses to narrow but tall.
        let regions = [Region::new(0, 0, 100, 10), Region::new(150, 0, 30, 40)];
        assert_eq!(select_target(&regions), Some(&regions[1]));
    }

    #[test]
    fn test_tie_goes_to_first_in_detector_order() {
        let regions = [
            Region::new(0, 0, 20, 20),
            Region::new(50, 0, 40, 40),
            Region::new(150, 0, 40, 40),
            Region::new(250, 0, 80, 20),
        ];
        let chosen = select_target(&regions).unwrap();
        assert_eq!(chosen.x, 50);
    }
}
