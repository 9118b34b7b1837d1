//! Missing-input checklist, evaluated before any completion call.

use std::fmt;

/// A required input the user has not supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingInput {
    Resume,
    JobDescription,
    ApiKey,
}

impl MissingInput {
    pub fn label(self) -> &'static str {
        match self {
            MissingInput::Resume => "resume",
            MissingInput::JobDescription => "job description",
            MissingInput::ApiKey => "OpenAI API key",
        }
    }
}

impl fmt::Display for MissingInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Every missing item, in checklist order. Blank strings count as missing.
pub fn missing_inputs(
    resume_present: bool,
    job_description: &str,
    api_key: &str,
) -> Vec<MissingInput> {
    let mut missing = Vec::new();
    if !resume_present {
        missing.push(MissingInput::Resume);
    }
    if job_description.trim().is_empty() {
        missing.push(MissingInput::JobDescription);
    }
    if api_key.trim().is_empty() {
        missing.push(MissingInput::ApiKey);
    }
    missing
}

/// The single combined warning: `Please provide: resume, OpenAI API key`.
pub fn missing_message(missing: &[MissingInput]) -> String {
    let labels: Vec<&str> = missing.iter().map(|m| m.label()).collect();
    format!("Please provide: {}", labels.join(", "))
}
