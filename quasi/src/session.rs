/// The parser handle every render call runs under.
///
/// A session only carries what the parser needs to label its diagnostics:
/// the file id errors point at and a display name. It holds no trees, so one
/// session can serve any number of independent calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    name: String,
    file_id: usize,
}

impl Session {
    pub fn new(name: impl Into<String>, file_id: usize) -> Self {
        Session {
            name: name.into(),
            file_id,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_id(&self) -> usize {
        self.file_id
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new("<template>", 0)
    }
}
