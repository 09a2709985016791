// ── Fan schedule slot visibility ──
//
// A UI shows slot 1 unconditionally and slots 2-4 only once they hold
// a schedule. Pure functions over the current fan configuration;
// callers recompute after every snapshot replacement or slot mutation.

use crate::command::SLOT_RANGE;
use crate::model::FanConfig;

/// A slot counts as configured when either of its times is present and
/// not the `"00:00"` sentinel.
pub fn slot_is_configured(cfg: &FanConfig, slot: u8) -> bool {
    let (on, off) = cfg.slot_times(slot);
    on.is_some_and(|t| !t.is_unset()) || off.is_some_and(|t| !t.is_unset())
}

/// The slots a schedule editor should show right now.
pub fn configured_slots(cfg: &FanConfig) -> Vec<u8> {
    SLOT_RANGE
        .filter(|&slot| slot == 1 || slot_is_configured(cfg, slot))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::TimeOfDay;

    fn slot2(on: Option<&str>, off: Option<&str>) -> FanConfig {
        let mut cfg = FanConfig::default();
        cfg.time_on2 = on.map(|s| s.parse::<TimeOfDay>().unwrap());
        cfg.time_off2 = off.map(|s| s.parse::<TimeOfDay>().unwrap());
        cfg
    }

    #[test]
    fn sentinel_pair_hides_slot() {
        assert!(!slot_is_configured(&slot2(Some("00:00"), Some("00:00")), 2));
    }

    #[test]
    fn any_real_time_shows_slot() {
        assert!(slot_is_configured(&slot2(Some("06:00"), Some("00:00")), 2));
        assert!(slot_is_configured(&slot2(None, Some("18:30")), 2));
    }

    #[test]
    fn absent_times_hide_slot() {
        assert!(!slot_is_configured(&FanConfig::default(), 2));
    }

    #[test]
    fn slot_one_is_always_listed() {
        assert_eq!(configured_slots(&FanConfig::default()), vec![1]);

        let mut cfg = slot2(Some("06:00"), None);
        cfg.time_on4 = "20:00".parse().ok();
        assert_eq!(configured_slots(&cfg), vec![1, 2, 4]);
    }
}
