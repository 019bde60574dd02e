use std::fmt;

/// A malformed-input finding. Never aborts extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub context: String,
    pub message: String,
    pub offending_text: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {:?}", self.context, self.message, self.offending_text)
    }
}

/// Per-document diagnostic log, threaded through one extraction call.
#[derive(Debug, Default)]
pub struct Diagnostics {
    context: String,
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new(context: &str) -> Self {
        Diagnostics {
            context: context.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn report(&mut self, message: impl Into<String>, offending_text: &str) {
        self.entries.push(Diagnostic {
            context: self.context.clone(),
            message: message.into(),
            offending_text: offending_text.to_string(),
        });
    }

    #[allow(dead_code)]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}
