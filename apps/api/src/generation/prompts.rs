// Prompt templates and per-task completion parameters.

/// Résumé and job description are each cut to this many characters before
/// interpolation.
pub const MAX_INPUT_CHARS: usize = 3000;

pub const COVER_LETTER_INSTRUCTION: &str =
    "Write a cover letter based on this resume and job description.";

pub const RESUME_UPDATE_INSTRUCTION: &str = "Update the resume based on the job description, \
    highlighting relevant skills and experiences.";

/// One completion call the pipeline can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionTask {
    CoverLetter,
    ResumeUpdate,
}

impl CompletionTask {
    pub fn instruction(self) -> &'static str {
        match self {
            CompletionTask::CoverLetter => COVER_LETTER_INSTRUCTION,
            CompletionTask::ResumeUpdate => RESUME_UPDATE_INSTRUCTION,
        }
    }

    /// Closing line the model continues from.
    pub fn heading(self) -> &'static str {
        match self {
            CompletionTask::CoverLetter => "Cover Letter:",
            CompletionTask::ResumeUpdate => "Updated Resume:",
        }
    }

    pub fn max_tokens(self) -> u32 {
        match self {
            CompletionTask::CoverLetter => 500,
            CompletionTask::ResumeUpdate => 600,
        }
    }

    pub fn temperature(self) -> f32 {
        match self {
            CompletionTask::CoverLetter => 0.7,
            CompletionTask::ResumeUpdate => 0.6,
        }
    }

    /// Prefix for user-facing failure messages.
    pub fn failure_label(self) -> &'static str {
        match self {
            CompletionTask::CoverLetter => "Error generating cover letter",
            CompletionTask::ResumeUpdate => "Error updating resume",
        }
    }
}

/// Returns the first `max_chars` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Builds the prompt for `task`:
///
/// ```text
/// {instruction}
///
/// Resume:
/// {first 3000 chars of resume}
///
/// Job Description:
/// {first 3000 chars of job description}
///
/// {heading}
/// ```
pub fn build_prompt(task: CompletionTask, resume_text: &str, job_description: &str) -> String {
    format!(
        "{instruction}\n\nResume:\n{resume}\n\nJob Description:\n{job_description}\n\n{heading}\n",
        instruction = task.instruction(),
        resume = truncate_chars(resume_text, MAX_INPUT_CHARS),
        job_description = truncate_chars(job_description, MAX_INPUT_CHARS),
        heading = task.heading(),
    )
}
