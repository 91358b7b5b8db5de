use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug)]
pub enum FileName {
    Real(PathBuf),
    Anon(usize),
}

impl From<PathBuf> for FileName {
    fn from(path: PathBuf) -> Self {
        FileName::Real(path)
    }
}

impl std::fmt::Display for FileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileName::Real(path) => write!(f, "{}", path.display()),
            FileName::Anon(id) => write!(f, "<anonymous-{}>", id),
        }
    }
}

#[derive(Debug)]
pub struct SourceFile {
    pub name: FileName,
    pub content: String,
}

impl SourceFile {
    pub fn new(name: impl Into<FileName>, content: String) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            content,
        })
    }

    /// A source with no backing file, e.g. text passed to `compile_source`.
    pub fn anonymous(content: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: FileName::Anon(0),
            content: content.into(),
        })
    }
}
