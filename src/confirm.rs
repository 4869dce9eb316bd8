/// Two-step gate for destructive actions: one pending target at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pending: Option<String>,
}

impl DeleteConfirmation {
    /// Records the target and opens the prompt. Replaces any earlier target.
    pub fn request(&mut self, id: impl Into<String>) {
        self.pending = Some(id.into());
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Clears the slot and hands back the target to delete, if any.
    pub fn confirm(&mut self) -> Option<String> {
        self.pending.take()
    }
}
