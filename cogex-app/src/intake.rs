//! Line-by-line consent and demographics form.

use anyhow::{Context, Result};
use cogex_core::{Intake, ParticipantProfile};
use serde_json::{Map, Value};
use std::sync::mpsc::Receiver;

struct Field {
    key: &'static str,
    prompt: &'static str,
    /// Empty for free text.
    options: &'static [&'static str],
}

const FIELDS: &[Field] = &[
    Field { key: "name", prompt: "Name", options: &[] },
    Field { key: "age", prompt: "Age group", options: &["18-25", "26-35", "36-45", "46-55", "56+"] },
    Field { key: "gender", prompt: "Gender", options: &["Male", "Female", "Other"] },
    Field { key: "hometown", prompt: "Hometown", options: &[] },
    Field { key: "current_city", prompt: "Current city", options: &[] },
    Field { key: "mother_language", prompt: "Mother language", options: &[] },
    Field {
        key: "academic",
        prompt: "Academic qualification",
        options: &["Pursuing UG", "Pursuing PG", "Completed UG", "Completed PG"],
    },
    Field { key: "service", prompt: "Service status", options: &["Employed", "Not Employed", "Retired"] },
    Field { key: "handedness", prompt: "Handedness", options: &["Right", "Left", "Ambidextrous"] },
    Field { key: "device", prompt: "Device", options: &["Laptop", "Desktop", "Mobile", "Tablet"] },
    Field { key: "vision", prompt: "Vision", options: &["Normal", "Corrected to Normal"] },
];

/// Accepts a 1-based option number or the option text, ignoring case.
fn choose(options: &[&'static str], answer: &str) -> Option<&'static str> {
    let answer = answer.trim();
    if let Ok(n) = answer.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| options.get(i)).copied();
    }
    options.iter().find(|o| o.eq_ignore_ascii_case(answer)).copied()
}

fn yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

fn next_line(lines: &Receiver<String>) -> Result<String> {
    lines.recv().context("input closed during intake")
}

fn ask_field(lines: &Receiver<String>, field: &Field) -> Result<String> {
    loop {
        println!("{}:", field.prompt);
        if field.options.is_empty() {
            let answer = next_line(lines)?;
            let answer = answer.trim();
            if !answer.is_empty() {
                return Ok(answer.to_string());
            }
        } else {
            for (i, option) in field.options.iter().enumerate() {
                println!("  {}) {}", i + 1, option);
            }
            if let Some(choice) = choose(field.options, &next_line(lines)?) {
                return Ok(choice.to_string());
            }
        }
        println!("Please answer again.");
    }
}

fn ask_yes_no(lines: &Receiver<String>, prompt: &str) -> Result<bool> {
    loop {
        println!("{prompt} [y/n]");
        if let Some(answer) = yes_no(&next_line(lines)?) {
            return Ok(answer);
        }
    }
}

/// Assembles the profile from raw answers; option fields carry their
/// serialized names, so serde does the enum mapping.
fn profile_from(mut answers: Map<String, Value>, prior_exposure: bool) -> Result<ParticipantProfile> {
    answers.insert("prior_exposure".into(), Value::Bool(prior_exposure));
    serde_json::from_value(Value::Object(answers)).context("intake answers do not form a profile")
}

pub fn collect(lines: &Receiver<String>) -> Result<Intake> {
    println!("=== PARTICIPANT INFORMATION ===");
    let mut answers = Map::new();
    for field in FIELDS {
        answers.insert(field.key.into(), Value::String(ask_field(lines, field)?));
    }
    let prior_exposure = ask_yes_no(lines, "Have you taken cognitive tests like these before?")?;
    let profile = profile_from(answers, prior_exposure)?;

    println!();
    println!("Your responses are used for academic research only and stored without");
    println!("any identifying information beyond what you entered above.");
    let consent = ask_yes_no(lines, "Do you consent to participate?")?;
    Ok(Intake { consent, profile })
}
