use std::collections::HashMap;

/// Stack of alias frames mapping short names to fully-qualified names.
///
/// One frame is active per source file, with a nested frame per callable
/// body so that `use` declarations inside a body never leak out.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<HashMap<String, String>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_scope(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.frames.pop();
    }

    /// Registers an alias in the innermost scope.
    pub fn add(&mut self, short: impl Into<String>, qualified: impl Into<String>) {
        debug_assert!(!self.frames.is_empty(), "no active scope");
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(short.into(), qualified.into());
        }
    }

    /// Looks an alias up, innermost scope first.
    pub fn lookup(&self, short: &str) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(short))
            .map(String::as_str)
    }
}
