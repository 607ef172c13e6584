//! Tabular and JSON exports of completed tests.

use cogex_core::{ParticipantProfile, ScoreSummary, Stimulus, TrialLog};
use serde::Serialize;

/// Shown in the response column for trials that timed out.
pub const NO_RESPONSE: &str = "No Response";

const LEADING: &[&str] = &["trial"];
const TRAILING: &[&str] = &[
    "label",
    "expected",
    "response",
    "correct",
    "timed_out",
    "reaction_time_s",
];

/// One header row, then one row per trial in trial order.
pub fn to_csv<S: Stimulus>(log: &TrialLog<S>) -> String {
    let header: Vec<&str> = LEADING
        .iter()
        .chain(S::COLUMNS)
        .chain(TRAILING)
        .copied()
        .collect();
    let mut out = String::new();
    push_row(&mut out, header);

    for record in log {
        let mut row = vec![(record.index + 1).to_string()];
        row.extend(record.stimulus.column_values());
        row.push(record.label.clone());
        row.push(record.expected.clone());
        row.push(record.response.clone().unwrap_or_else(|| NO_RESPONSE.to_string()));
        row.push(record.correct().to_string());
        row.push(record.timed_out().to_string());
        row.push(
            record
                .reaction_time_secs()
                .map(|secs| format!("{secs:.3}"))
                .unwrap_or_default(),
        );
        push_row(&mut out, row);
    }
    out
}

fn push_row<I>(out: &mut String, fields: I)
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, field.as_ref());
    }
    out.push('\n');
}

fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

#[derive(Serialize)]
struct Results<'a> {
    participant: Option<&'a ParticipantProfile>,
    scores: &'a [ScoreSummary],
}

/// The results bundle: participant profile plus every test summary.
pub fn to_json(
    profile: Option<&ParticipantProfile>,
    summaries: &[ScoreSummary],
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&Results {
        participant: profile,
        scores: summaries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogex_core::{InkColor, StroopStimulus, TrialRecord};

    #[test]
    fn one_row_per_trial_with_header() {
        let mut log = TrialLog::new();
        log.push(TrialRecord::answered(
            0,
            StroopStimulus::incongruent(InkColor::Red, InkColor::Green),
            "GREEN".into(),
            1_250_000_000,
            true,
        ));
        log.push(TrialRecord::timeout(1, StroopStimulus::congruent(InkColor::Blue)));

        let csv = to_csv(&log);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            [
                "trial,word,font_color,condition,label,expected,response,correct,timed_out,reaction_time_s",
                "1,RED,green,Incongruent,Incongruent,green,GREEN,true,false,1.250",
                "2,BLUE,blue,Congruent,Congruent,blue,No Response,false,true,",
            ]
        );
    }

    #[test]
    fn fields_with_separators_are_quoted() {
        let mut out = String::new();
        push_row(&mut out, ["a,b", "say \"hi\"", "plain"]);
        assert_eq!(out, "\"a,b\",\"say \"\"hi\"\"\",plain\n");
    }

    #[test]
    fn results_bundle_tags_each_summary() {
        let json = to_json(None, &[]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["participant"], serde_json::Value::Null);
        assert_eq!(value["scores"], serde_json::json!([]));
    }
}
