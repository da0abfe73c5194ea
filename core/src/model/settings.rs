use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::severity::{FactorSet, SeverityFactors};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MedicationTemplate {
    pub id: Uuid,
    pub name: String,
    pub dosage: String,
}

/// The single settings record.
///
/// Carries no container-level `#[serde(default)]`: fields missing from an
/// older stored blob are filled in by merge-on-read before decoding.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub target_wakeup_time: String,
    pub morning_reminder: String,
    pub evening_reminder: String,
    pub notifications_enabled: bool,
    pub medications: Vec<MedicationTemplate>,
    pub note_tags: Vec<String>,
    pub trigger_tags: Vec<String>,
    pub red_day_factors: FactorSet,
    pub orange_day_factors: FactorSet,
    pub yellow_day_factors: FactorSet,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            target_wakeup_time: "07:00".to_string(),
            morning_reminder: "08:00".to_string(),
            evening_reminder: "20:00".to_string(),
            notifications_enabled: false,
            medications: Vec::new(),
            note_tags: Vec::new(),
            trigger_tags: Vec::new(),
            red_day_factors: FactorSet {
                seizure: true,
                night_wakings: false,
                early_wakeup: false,
            },
            orange_day_factors: FactorSet {
                seizure: false,
                night_wakings: true,
                early_wakeup: false,
            },
            yellow_day_factors: FactorSet {
                seizure: false,
                night_wakings: false,
                early_wakeup: true,
            },
        }
    }
}

impl AppSettings {
    pub fn severity_factors(&self) -> SeverityFactors {
        SeverityFactors {
            red: self.red_day_factors,
            orange: self.orange_day_factors,
            yellow: self.yellow_day_factors,
        }
    }

    pub fn add_medication(&mut self, name: &str, dosage: &str) -> &MedicationTemplate {
        self.medications.push(MedicationTemplate {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            dosage: dosage.trim().to_string(),
        });
        let last = self.medications.len() - 1;
        &self.medications[last]
    }

    /// Removes templates whose id or (case-insensitive) name matches `key`.
    /// Returns how many were removed.
    pub fn remove_medication(&mut self, key: &str) -> usize {
        let before = self.medications.len();
        let id = Uuid::parse_str(key).ok();
        self.medications.retain(|m| {
            Some(m.id) != id && !m.name.eq_ignore_ascii_case(key.trim())
        });
        before - self.medications.len()
    }

    pub fn medication(&self, name: &str) -> Option<&MedicationTemplate> {
        self.medications
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn add_note_tag(&mut self, tag: &str) -> bool {
        push_tag(&mut self.note_tags, tag)
    }

    pub fn add_trigger_tag(&mut self, tag: &str) -> bool {
        push_tag(&mut self.trigger_tags, tag)
    }
}

fn push_tag(tags: &mut Vec<String>, tag: &str) -> bool {
    let tag = tag.trim().trim_start_matches('#');
    if tag.is_empty() {
        return false;
    }
    let tag = format!("#{}", tag);
    if tags.contains(&tag) {
        return false;
    }
    tags.push(tag);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_medication_templates() {
        let mut settings = AppSettings::default();
        let id = settings.add_medication(" Depakine ", "300 mg").id;
        settings.add_medication("Keppra", "250mg");

        assert_eq!(settings.medication("depakine").map(|m| m.dosage.as_str()), Some("300 mg"));
        assert_eq!(settings.remove_medication(&id.to_string()), 1);
        assert_eq!(settings.remove_medication("KEPPRA"), 1);
        assert!(settings.medications.is_empty());
    }

    #[test]
    fn test_tags_are_normalized_and_deduplicated() {
        let mut settings = AppSettings::default();
        assert!(settings.add_trigger_tag("fever"));
        assert!(!settings.add_trigger_tag("#fever"));
        assert!(!settings.add_trigger_tag("  "));
        assert!(settings.add_note_tag("#travel"));
        assert_eq!(settings.trigger_tags, vec!["#fever"]);
        assert_eq!(settings.note_tags, vec!["#travel"]);
    }
}
