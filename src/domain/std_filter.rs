/// Standard-library filter.
///
/// Top-level declarations pulled in from system headers would swamp the
/// picture; any cursor whose file path contains one of these fragments is
/// dropped before reduction.

pub const STANDARD_HEADER_FRAGMENTS: &[&str] = &[
    // libstdc++ and libc++ extensionless headers (<iostream>, <vector>, ...)
    "include/c++/",
    "gcc",
    "bits",
    "assert.h",
    "ctype.h",
    "errno.h",
    "locale.h",
    "math.h",
    "stddef.h",
    "stdlib.h",
    "setjmp.h",
    "signal.h",
    "stdarg.h",
    "__stddef_max_align_t.h",
    "stdio.h",
    "stdint.h",
    "sched.h",
    "pthread.h",
    "string.h",
    "time.h",
    "wchar.h",
    "wctype.h",
    "fenv.h",
    "inttypes.h",
    "uchar.h",
    "libintl.h",
];

#[derive(Debug, Clone)]
pub struct StandardHeaderFilter {
    fragments: Vec<String>,
}

impl Default for StandardHeaderFilter {
    fn default() -> Self {
        Self {
            fragments: STANDARD_HEADER_FRAGMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl StandardHeaderFilter {
    /// Default fragments plus user-supplied ones.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut filter = Self::default();
        filter.fragments.extend(extra.into_iter().map(Into::into));
        filter
    }

    pub fn is_standard(&self, file: &str) -> bool {
        !file.is_empty() && self.fragments.iter().any(|f| file.contains(f.as_str()))
    }
}
