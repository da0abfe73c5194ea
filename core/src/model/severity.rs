use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::log_entry::LogEntry;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// No entry for the day.
    None,
    Green,
    Yellow,
    Orange,
    Red,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Tier::None => "none",
            Tier::Green => "green",
            Tier::Yellow => "yellow",
            Tier::Orange => "orange",
            Tier::Red => "red",
        };
        f.write_str(label)
    }
}

/// Which conditions put a day into a tier. Flags combine with OR; a set with
/// every flag off never matches.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FactorSet {
    #[serde(default)]
    pub seizure: bool,
    #[serde(default)]
    pub night_wakings: bool,
    #[serde(default)]
    pub early_wakeup: bool,
}

impl FactorSet {
    pub fn matches(&self, entry: &LogEntry) -> bool {
        (self.seizure && entry.had_seizure)
            || (self.night_wakings && entry.woke_up_at_night)
            || (self.early_wakeup && entry.is_early_wakeup)
    }

    pub fn is_empty(&self) -> bool {
        !(self.seizure || self.night_wakings || self.early_wakeup)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeverityFactors {
    pub red: FactorSet,
    pub orange: FactorSet,
    pub yellow: FactorSet,
}

// Checked in this order; the first tier whose factor set matches wins.
const PRIORITY: [Tier; 3] = [Tier::Red, Tier::Orange, Tier::Yellow];

impl SeverityFactors {
    fn for_tier(&self, tier: Tier) -> Option<&FactorSet> {
        match tier {
            Tier::Red => Some(&self.red),
            Tier::Orange => Some(&self.orange),
            Tier::Yellow => Some(&self.yellow),
            Tier::Green | Tier::None => None,
        }
    }
}

pub fn classify(entry: Option<&LogEntry>, factors: &SeverityFactors) -> Tier {
    let Some(entry) = entry else {
        return Tier::None;
    };

    PRIORITY
        .into_iter()
        .find(|tier| {
            factors
                .for_tier(*tier)
                .map(|set| set.matches(entry))
                .unwrap_or(false)
        })
        .unwrap_or(Tier::Green)
}

impl LogEntry {
    pub fn tier(&self, factors: &SeverityFactors) -> Tier {
        classify(Some(self), factors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(seizure: bool, wakings: bool, early: bool) -> LogEntry {
        let mut e = LogEntry::new(NaiveDate::from_ymd_opt(2025, 2, 10).unwrap());
        e.had_seizure = seizure;
        e.woke_up_at_night = wakings;
        e.is_early_wakeup = early;
        e
    }

    fn set(bits: u8) -> FactorSet {
        FactorSet {
            seizure: bits & 0b100 != 0,
            night_wakings: bits & 0b010 != 0,
            early_wakeup: bits & 0b001 != 0,
        }
    }

    #[test]
    fn test_absent_entry_is_none() {
        assert_eq!(classify(None, &SeverityFactors::default()), Tier::None);
    }

    #[test]
    fn test_seizure_is_red_regardless_of_lower_tiers() {
        let factors = SeverityFactors {
            red: set(0b100),
            orange: set(0b111),
            yellow: set(0b111),
        };
        assert_eq!(classify(Some(&entry(true, true, true)), &factors), Tier::Red);
        assert_eq!(classify(Some(&entry(true, false, false)), &factors), Tier::Red);
    }

    #[test]
    fn test_no_match_is_green() {
        let factors = SeverityFactors {
            red: set(0b100),
            orange: set(0b010),
            yellow: set(0b001),
        };
        assert_eq!(classify(Some(&entry(false, false, false)), &factors), Tier::Green);
        assert_eq!(classify(Some(&entry(false, true, true)), &factors), Tier::Orange);
        assert_eq!(classify(Some(&entry(false, false, true)), &factors), Tier::Yellow);
    }

    #[test]
    fn test_disabled_sets_never_match() {
        let factors = SeverityFactors::default();
        assert_eq!(classify(Some(&entry(true, true, true)), &factors), Tier::Green);
    }

    #[test]
    fn test_classify_follows_priority_for_every_combination() {
        for flags in 0u8..8 {
            let e = entry(flags & 0b100 != 0, flags & 0b010 != 0, flags & 0b001 != 0);
            for red in 0u8..8 {
                for orange in 0u8..8 {
                    for yellow in 0u8..8 {
                        let factors = SeverityFactors {
                            red: set(red),
                            orange: set(orange),
                            yellow: set(yellow),
                        };
                        let expected = if red & flags != 0 {
                            Tier::Red
                        } else if orange & flags != 0 {
                            Tier::Orange
                        } else if yellow & flags != 0 {
                            Tier::Yellow
                        } else {
                            Tier::Green
                        };
                        assert_eq!(classify(Some(&e), &factors), expected);
                        assert_eq!(e.tier(&factors), expected);
                    }
                }
            }
        }
    }
}
