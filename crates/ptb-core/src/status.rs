/// Status shown before the admin sets anything (and after every restart).
pub const UNKNOWN_STATUS: &str = "неизвестен";

/// Process-lifetime presence status. Any text is accepted, including empty.
#[derive(Clone, Debug)]
pub struct StatusRegister {
    text: String,
}

impl Default for StatusRegister {
    fn default() -> Self {
        Self {
            text: UNKNOWN_STATUS.to_string(),
        }
    }
}

impl StatusRegister {
    pub fn get(&self) -> &str {
        &self.text
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn is_known(&self) -> bool {
        self.text != UNKNOWN_STATUS
    }
}
