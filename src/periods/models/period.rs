use serde::Serialize;

/// Length of a minting period: a year averaged over a leap cycle, divided by
/// twelve. 30.45 days.
pub const STANDARD_PERIOD_DURATION: i64 = 24 * 60 * 60 * (365 * 3 + 366 * 2) / 60;
pub const FIRST_PERIOD_START: i64 = 1_522_501_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub offset: i64,
    pub start: i64,
    pub end: i64,
}

impl Period {
    pub fn at_offset(offset: i64) -> Self {
        let start = FIRST_PERIOD_START + offset * STANDARD_PERIOD_DURATION;

        Self {
            offset,
            start,
            end: start + STANDARD_PERIOD_DURATION,
        }
    }

    pub fn containing(timestamp: i64) -> Self {
        Self::at_offset((timestamp - FIRST_PERIOD_START).div_euclid(STANDARD_PERIOD_DURATION))
    }

    pub fn previous(&self) -> Self {
        Self::at_offset(self.offset - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_thirty_and_a_half_days() {
        assert_eq!(STANDARD_PERIOD_DURATION, 2_630_880);
        assert_eq!(STANDARD_PERIOD_DURATION as f64 / 86_400.0, 30.45);
    }

    #[test]
    fn periods_are_contiguous() {
        let first = Period::at_offset(0);
        let second = Period::at_offset(1);

        assert_eq!(first.start, FIRST_PERIOD_START);
        assert_eq!(first.end, second.start);
        assert_eq!(second.previous(), first);
    }

    #[test]
    fn containing_uses_half_open_bounds() {
        let period = Period::at_offset(80);

        assert_eq!(Period::containing(period.start), period);
        assert_eq!(Period::containing(period.end - 1), period);
        assert_eq!(Period::containing(period.end).offset, 81);
        assert_eq!(Period::containing(FIRST_PERIOD_START - 1).offset, -1);
    }

    #[test]
    fn scaled_start_still_maps_to_its_period() {
        // Nodes created mid-period get a receipt whose start is later than the period's.
        let period = Period::at_offset(79);

        assert_eq!(Period::containing(period.start + 1_000_000), period);
    }
}
