// Cover letter / résumé generation.
// Completion calls go through the `TextCompleter` in AppState, never direct HTTP.

pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod validation;
