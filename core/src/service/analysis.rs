use crate::error::AnalysisError;
use crate::model::log_entry::{LogEntry, Medication};

pub const NOT_ENOUGH_DATA: &str =
    "Not enough data to analyze. Please choose a period that contains entries.";

/// A remote text generator. Implementations must not touch local state.
pub trait Analyst {
    fn analyze(&self, prompt: &str) -> Result<String, AnalysisError>;
}

/// Runs one analysis over `logs` (oldest first). An empty slice never reaches
/// the analyst.
pub fn request_analysis<A: Analyst + ?Sized>(
    analyst: &A,
    logs: &[LogEntry],
) -> Result<String, AnalysisError> {
    if logs.is_empty() {
        return Ok(NOT_ENOUGH_DATA.to_string());
    }
    let text = analyst.analyze(&build_prompt(logs))?;
    if text.trim().is_empty() {
        return Err(AnalysisError::EmptyResponse);
    }
    Ok(text)
}

pub fn build_prompt(logs: &[LogEntry]) -> String {
    let mut prompt = String::from(
        "You are an empathetic assistant helping a caregiver review the sleep and \
         seizure diary of a child with epilepsy. Give a short, structured, easy to \
         read overview. Do not give medical advice or diagnoses, and stress that \
         the information should be shown to the treating doctor.\n\n",
    );
    prompt.push_str(&format_logs(logs));
    prompt.push_str(
        "\nYour answer should include:\n\
         1. Summary: how many days were analyzed and how many had an early wakeup or a seizure.\n\
         2. Night wakings: on which days they happened and whether they relate to other factors or notes.\n\
         3. Seizures: timing, and any triggers mentioned.\n\
         4. Trends: whether early wakeups, night wakings or seizures became more or less frequent.\n\
         5. Key observations from the notes, if any.\n\
         6. Recommendation: a reminder to discuss the results with a doctor.\n",
    );
    prompt
}

fn format_logs(logs: &[LogEntry]) -> String {
    let (Some(first), Some(last)) = (logs.first(), logs.last()) else {
        return "No data to analyze.\n".to_string();
    };

    let mut out = format!(
        "Diary entries from {} to {}:\n\n",
        first.date.min(last.date),
        first.date.max(last.date)
    );
    for log in logs {
        out.push_str(&format!("Date: {}\n", log.date));
        out.push_str(&format!("- Went to bed: {}\n", log.bedtime));
        out.push_str(&format!("- Woke up: {}\n", log.wakeup_time));
        out.push_str(&format!("- Night wakings: {}\n", describe_wakings(log)));
        let wakeup = if log.is_early_wakeup { "early" } else { "normal" };
        out.push_str(&format!("- Wakeup: {}\n", wakeup));
        out.push_str(&format!("- Seizures: {}\n", describe_seizures(log)));
        out.push_str(&format!("- Morning medication: {}\n", describe_medication(&log.morning_meds)));
        out.push_str(&format!("- Evening medication: {}\n", describe_medication(&log.evening_meds)));
        out.push_str(&format!("- Notes: {}\n", log.notes.as_deref().unwrap_or("none")));
        if let Some(trigger) = &log.trigger {
            out.push_str(&format!("- Possible trigger: {}\n", trigger));
        }
        out.push('\n');
    }
    out
}

fn describe_wakings(log: &LogEntry) -> String {
    if log.night_waking_count() == 0 {
        return "did not wake up".to_string();
    }
    let spans: Vec<String> = log
        .night_wakings
        .iter()
        .map(|w| format!("(woke at {}, back to sleep at {})", w.wake_time, w.back_to_sleep_time))
        .collect();
    format!("{} time(s): {}", log.night_wakings.len(), spans.join("; "))
}

fn describe_seizures(log: &LogEntry) -> String {
    if log.seizure_count() == 0 {
        return "none".to_string();
    }
    let spans: Vec<String> = log
        .seizures
        .iter()
        .map(|s| format!("{}-{}", s.start_time, s.end_time))
        .collect();
    format!("{} ({})", log.seizures.len(), spans.join(", "))
}

fn describe_medication(med: &Medication) -> String {
    if med.is_empty() {
        "none".to_string()
    } else {
        format!("{} ({})", med.name, med.dosage)
    }
}
