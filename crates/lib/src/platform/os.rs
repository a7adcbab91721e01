use std::fmt;

/// Host operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  MacOs,
  Windows,
  /// Any other Unix-like host (BSDs, illumos, ...).
  OtherUnix,
}

impl Os {
  /// Detect the current operating system at runtime
  ///
  /// Returns `None` if the host is neither Windows nor Unix-like.
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::MacOs),
      "windows" => Some(Self::Windows),
      _ if std::env::consts::FAMILY == "unix" => Some(Self::OtherUnix),
      _ => None,
    }
  }

  pub fn is_windows_family(&self) -> bool {
    matches!(self, Self::Windows)
  }

  /// Returns the lowercase string identifier for this OS
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "darwin",
      Self::Windows => "windows",
      Self::OtherUnix => "unix",
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
