/// Language Domain Module
///
/// Defines the source languages Codereptile knows how to visualize.

/// Parse modes selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Cpp,
    Python,
}

impl Language {
    /// Get the display name of the language.
    pub fn name(&self) -> &'static str {
        match self {
            Language::Cpp => "C++",
            Language::Python => "Python",
        }
    }

    /// Default translation-unit extensions scanned for this language.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Cpp => &["cpp"],
            Language::Python => &["py"],
        }
    }

    /// Python parsing is stubbed out.
    pub fn is_implemented(&self) -> bool {
        matches!(self, Language::Cpp)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
