//! Host platform detection
//!
//! Every platform-dependent decision in the crate (artifact selection,
//! archive format, config tuning, terminal strategy) keys off the single
//! tag resolved here.

/// Host operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    MacOs,
    Linux,
    Windows,
    Unknown,
}

/// Normalized CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86_64,
    Arm64,
    Unknown,
}

/// Canonical (OS, architecture) tag for the host.
///
/// `Unknown` combinations degrade to the macOS/x86_64 release entry in
/// every downstream table rather than erroring, so artifact selection
/// always produces some result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformTag {
    MacOsArm64,
    MacOsX86_64,
    LinuxArm64,
    LinuxX86_64,
    WindowsX86_64,
    Unknown,
}

impl PlatformTag {
    pub fn os(&self) -> Os {
        match self {
            PlatformTag::MacOsArm64 | PlatformTag::MacOsX86_64 => Os::MacOs,
            PlatformTag::LinuxArm64 | PlatformTag::LinuxX86_64 => Os::Linux,
            PlatformTag::WindowsX86_64 => Os::Windows,
            PlatformTag::Unknown => Os::Unknown,
        }
    }

    pub fn arch(&self) -> Arch {
        match self {
            PlatformTag::MacOsArm64 | PlatformTag::LinuxArm64 => Arch::Arm64,
            PlatformTag::MacOsX86_64 | PlatformTag::LinuxX86_64 | PlatformTag::WindowsX86_64 => {
                Arch::X86_64
            }
            PlatformTag::Unknown => Arch::Unknown,
        }
    }

    /// Suffix appended to executable names on this platform.
    pub fn exe_suffix(&self) -> &'static str {
        match self.os() {
            Os::Windows => ".exe",
            _ => "",
        }
    }

    pub fn describe(&self) -> String {
        let os = match self.os() {
            Os::MacOs => "macOS",
            Os::Linux => "Linux",
            Os::Windows => "Windows",
            Os::Unknown => "unknown OS",
        };
        let arch = match self.arch() {
            Arch::X86_64 => "x86_64",
            Arch::Arm64 => "arm64",
            Arch::Unknown => "unknown arch",
        };
        format!("{os} ({arch})")
    }
}

/// Resolve the tag for the running process.
pub fn resolve_platform() -> PlatformTag {
    resolve(std::env::consts::OS, std::env::consts::ARCH)
}

/// Pure resolution from raw OS and machine strings. Never fails.
pub fn resolve(os: &str, machine: &str) -> PlatformTag {
    let arch = normalize_arch(machine);
    match (os, arch) {
        ("macos", Arch::Arm64) => PlatformTag::MacOsArm64,
        ("macos", _) => PlatformTag::MacOsX86_64,
        ("linux", Arch::Arm64) => PlatformTag::LinuxArm64,
        ("linux", _) => PlatformTag::LinuxX86_64,
        ("windows", _) => PlatformTag::WindowsX86_64,
        _ => PlatformTag::Unknown,
    }
}

/// Collapse machine-string aliases into the two architectures we ship for.
pub fn normalize_arch(machine: &str) -> Arch {
    match machine.to_lowercase().as_str() {
        "x86_64" | "amd64" | "i386" | "i686" => Arch::X86_64,
        "arm64" | "aarch64" => Arch::Arm64,
        _ => Arch::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_arch_aliases() {
        assert_eq!(normalize_arch("x86_64"), Arch::X86_64);
        assert_eq!(normalize_arch("amd64"), Arch::X86_64);
        assert_eq!(normalize_arch("i386"), Arch::X86_64);
        assert_eq!(normalize_arch("i686"), Arch::X86_64);
        assert_eq!(normalize_arch("arm64"), Arch::Arm64);
        assert_eq!(normalize_arch("aarch64"), Arch::Arm64);
        assert_eq!(normalize_arch("AARCH64"), Arch::Arm64);
        assert_eq!(normalize_arch("riscv64"), Arch::Unknown);
    }

    #[test]
    fn test_resolve_known_pairs() {
        assert_eq!(resolve("macos", "arm64"), PlatformTag::MacOsArm64);
        assert_eq!(resolve("macos", "x86_64"), PlatformTag::MacOsX86_64);
        assert_eq!(resolve("linux", "aarch64"), PlatformTag::LinuxArm64);
        assert_eq!(resolve("linux", "amd64"), PlatformTag::LinuxX86_64);
        assert_eq!(resolve("windows", "x86_64"), PlatformTag::WindowsX86_64);
    }

    #[test]
    fn test_resolve_never_fails() {
        // Odd inputs still resolve to something usable downstream.
        assert_eq!(resolve("macos", "riscv64"), PlatformTag::MacOsX86_64);
        assert_eq!(resolve("linux", "mips"), PlatformTag::LinuxX86_64);
        assert_eq!(resolve("windows", "arm64"), PlatformTag::WindowsX86_64);
        assert_eq!(resolve("freebsd", "x86_64"), PlatformTag::Unknown);
    }

    #[test]
    fn test_exe_suffix() {
        assert_eq!(PlatformTag::WindowsX86_64.exe_suffix(), ".exe");
        assert_eq!(PlatformTag::LinuxX86_64.exe_suffix(), "");
        assert_eq!(PlatformTag::MacOsArm64.exe_suffix(), "");
    }
}
