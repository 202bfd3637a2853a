/// Fixed-cadence transmission schedule.
///
/// Fires when at least `interval` blocks separate `current_height` from the
/// marker. A firing advances the marker by exactly `interval`, so a late
/// cycle never shifts the ones after it, and the caller persists the new
/// marker whether or not the send that follows succeeds. A non-positive
/// interval never fires.
pub fn maybe_transmit(current_height: i64, last_marker_height: i64, interval: i64) -> (bool, i64) {
    if interval <= 0 {
        return (false, last_marker_height);
    }
    let elapsed = current_height.saturating_sub(last_marker_height);
    if elapsed >= interval {
        (true, last_marker_height.saturating_add(interval))
    } else {
        (false, last_marker_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_due() {
        assert_eq!(maybe_transmit(1099, 100, 1000), (false, 100));
    }

    #[test]
    fn test_due_exactly_at_interval() {
        assert_eq!(maybe_transmit(1100, 100, 1000), (true, 1100));
    }

    #[test]
    fn test_late_cycle_keeps_cadence() {
        // fired late at 1350: marker still lands on the grid
        assert_eq!(maybe_transmit(1350, 100, 1000), (true, 1100));
        assert_eq!(maybe_transmit(1351, 1100, 1000), (false, 1100));
        assert_eq!(maybe_transmit(2100, 1100, 1000), (true, 2100));
    }

    #[test]
    fn test_non_positive_interval_never_fires() {
        assert_eq!(maybe_transmit(5000, 0, 0), (false, 0));
        assert_eq!(maybe_transmit(5000, 0, -10), (false, 0));
    }
}
