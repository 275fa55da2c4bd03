use std::fmt;
use std::str::FromStr;

/// Which files discovery picks up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Only `README.md` files (any case), at any depth.
    #[default]
    ReadmeOnly,
    /// Every `*.md` file, at any depth.
    AllMarkdown,
}

impl Mode {
    /// Glob matched against the root-relative path of each file.
    pub fn include_glob(&self) -> &'static str {
        match self {
            Mode::ReadmeOnly => "**/README.md",
            Mode::AllMarkdown => "**/*.md",
        }
    }

    pub fn case_insensitive(&self) -> bool {
        matches!(self, Mode::ReadmeOnly)
    }

    /// Short identifier, also accepted by `--mode`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::ReadmeOnly => "readme",
            Mode::AllMarkdown => "all",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::ReadmeOnly => "README files",
            Mode::AllMarkdown => "All Markdown",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Mode::ReadmeOnly => Mode::AllMarkdown,
            Mode::AllMarkdown => Mode::ReadmeOnly,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "readme" => Ok(Mode::ReadmeOnly),
            "all" | "markdown" => Ok(Mode::AllMarkdown),
            other => Err(format!("unknown mode '{}' (expected 'readme' or 'all')", other)),
        }
    }
}
