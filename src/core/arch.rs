//! Host architecture and platform detection.

use std::fmt;
use std::str::FromStr;

/// CPU token written as `target_cpu` in `args.gn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetCpu {
    X64,
    Arm64,
}

impl TargetCpu {
    /// GN spelling of this CPU.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetCpu::X64 => "x64",
            TargetCpu::Arm64 => "arm64",
        }
    }

    /// Map a machine architecture string (as reported by `uname -m` or
    /// `std::env::consts::ARCH`) to a GN CPU token.
    pub fn parse_machine(machine: &str) -> Option<TargetCpu> {
        match machine.trim().to_lowercase().as_str() {
            "x86_64" | "amd64" => Some(TargetCpu::X64),
            "arm64" | "aarch64" => Some(TargetCpu::Arm64),
            _ => None,
        }
    }

    /// Map a machine string, falling back to `x64` for unknown ones.
    ///
    /// The second value is the warning to show when the fallback was taken.
    pub fn detect_machine(machine: &str) -> (TargetCpu, Option<String>) {
        match TargetCpu::parse_machine(machine) {
            Some(cpu) => (cpu, None),
            None => (
                TargetCpu::X64,
                Some(format!("Unknown architecture `{}`, defaulting to x64", machine)),
            ),
        }
    }

    /// Like [`TargetCpu::parse_machine`], but unknown architectures fall back
    /// to `x64` with a logged warning instead of failing.
    pub fn from_machine(machine: &str) -> TargetCpu {
        let (cpu, warning) = TargetCpu::detect_machine(machine);
        if let Some(warning) = warning {
            tracing::warn!("{}", warning);
        }
        cpu
    }

    /// CPU of the machine running macbuild.
    pub fn host() -> TargetCpu {
        TargetCpu::from_machine(std::env::consts::ARCH)
    }
}

impl fmt::Display for TargetCpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetCpu {
    type Err = String;

    /// Accepts GN tokens as well as machine names (`x86_64`, `aarch64`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "x64" => Ok(TargetCpu::X64),
            other => TargetCpu::parse_machine(other).ok_or_else(|| {
                format!("unknown target cpu '{}'; expected 'x64' or 'arm64'", s)
            }),
        }
    }
}

/// Host operating system family, as far as tool lookup cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Mac,
    Linux,
    Windows,
}

impl HostOs {
    pub fn current() -> HostOs {
        match std::env::consts::OS {
            "windows" => HostOs::Windows,
            "macos" => HostOs::Mac,
            _ => HostOs::Linux,
        }
    }

    /// Directory under `buildtools/` that holds this host's binaries.
    pub fn buildtools_dir(&self) -> &'static str {
        match self {
            HostOs::Mac => "mac",
            HostOs::Linux => "linux64",
            HostOs::Windows => "win",
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, HostOs::Windows)
    }
}
