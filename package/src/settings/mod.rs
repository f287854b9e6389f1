//! Toolchain settings
//!
//! Describes the environment a build runs in: operating system, architecture,
//! build type, compiler and C++ language standard. The validator checks these
//! and the toolchain generator materializes them.

use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// C++ language standard revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Standard {
    Cpp98,
    Cpp11,
    Cpp14,
    Cpp17,
    Cpp20,
    Cpp23,
}

impl Standard {
    pub fn number(&self) -> &'static str {
        match self {
            Standard::Cpp98 => "98",
            Standard::Cpp11 => "11",
            Standard::Cpp14 => "14",
            Standard::Cpp17 => "17",
            Standard::Cpp20 => "20",
            Standard::Cpp23 => "23",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "98" => Some(Standard::Cpp98),
            "11" => Some(Standard::Cpp11),
            "14" => Some(Standard::Cpp14),
            "17" => Some(Standard::Cpp17),
            "20" => Some(Standard::Cpp20),
            "23" => Some(Standard::Cpp23),
            _ => None,
        }
    }
}

/// `cppstd` setting, e.g. `20` or `gnu20`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CppStd {
    pub standard: Standard,
    /// GNU extensions enabled
    pub gnu: bool,
}

impl CppStd {
    pub fn new(standard: Standard) -> Self {
        Self {
            standard,
            gnu: false,
        }
    }

    pub fn gnu(standard: Standard) -> Self {
        Self {
            standard,
            gnu: true,
        }
    }
}

impl FromStr for CppStd {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (gnu, number) = match s.strip_prefix("gnu") {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let standard = Standard::parse(number)
            .ok_or_else(|| Error::InvalidSetting(format!("unknown cppstd '{}'", s)))?;
        Ok(Self { standard, gnu })
    }
}

impl fmt::Display for CppStd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.gnu {
            write!(f, "gnu")?;
        }
        write!(f, "{}", self.standard.number())
    }
}

/// Build configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum BuildType {
    Debug,
    #[default]
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
            BuildType::MinSizeRel => "MinSizeRel",
        }
    }
}

impl FromStr for BuildType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(BuildType::Debug),
            "release" => Ok(BuildType::Release),
            "relwithdebinfo" => Ok(BuildType::RelWithDebInfo),
            "minsizerel" => Ok(BuildType::MinSizeRel),
            _ => Err(Error::InvalidSetting(format!("unknown build_type '{}'", s))),
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compiler family
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum CompilerKind {
    Gcc,
    Clang,
    AppleClang,
    Msvc,
    Other(String),
}

impl FromStr for CompilerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "gcc" => CompilerKind::Gcc,
            "clang" => CompilerKind::Clang,
            "apple-clang" => CompilerKind::AppleClang,
            "msvc" => CompilerKind::Msvc,
            "" => return Err(Error::InvalidSetting("empty compiler name".to_string())),
            other => CompilerKind::Other(other.to_string()),
        })
    }
}

impl fmt::Display for CompilerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompilerKind::Gcc => write!(f, "gcc"),
            CompilerKind::Clang => write!(f, "clang"),
            CompilerKind::AppleClang => write!(f, "apple-clang"),
            CompilerKind::Msvc => write!(f, "msvc"),
            CompilerKind::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Active compiler
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Compiler {
    pub kind: CompilerKind,
    pub version: String,
}

impl Compiler {
    pub fn new(kind: CompilerKind, version: impl Into<String>) -> Self {
        Self {
            kind,
            version: version.into(),
        }
    }

    /// Leading numeric component of the version
    pub fn major_version(&self) -> Option<u32> {
        self.version.split('.').next()?.parse().ok()
    }

    /// Standard the compiler uses when none is requested
    pub fn default_cppstd(&self) -> Option<CppStd> {
        let major = self.major_version()?;
        let standard = match self.kind {
            CompilerKind::Gcc if major < 5 => Standard::Cpp98,
            CompilerKind::Gcc if major < 11 => Standard::Cpp14,
            CompilerKind::Gcc => Standard::Cpp17,
            CompilerKind::Clang if major < 6 => Standard::Cpp98,
            CompilerKind::Clang if major < 16 => Standard::Cpp14,
            CompilerKind::Clang => Standard::Cpp17,
            CompilerKind::AppleClang => Standard::Cpp98,
            CompilerKind::Msvc if major < 190 => return None,
            CompilerKind::Msvc => return Some(CppStd::new(Standard::Cpp14)),
            CompilerKind::Other(_) => return None,
        };
        Some(CppStd::gnu(standard))
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.version)
    }
}

/// Environment the recipe is configured for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub os: String,
    pub arch: String,
    pub build_type: BuildType,
    pub compiler: Compiler,
    /// Explicit language standard; the compiler default applies when unset
    pub cppstd: Option<CppStd>,
}

impl Settings {
    pub fn new(compiler: Compiler) -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            build_type: BuildType::default(),
            compiler,
            cppstd: None,
        }
    }

    pub fn with_cppstd(mut self, cppstd: CppStd) -> Self {
        self.cppstd = Some(cppstd);
        self
    }

    pub fn with_build_type(mut self, build_type: BuildType) -> Self {
        self.build_type = build_type;
        self
    }

    /// Explicit standard, or the compiler's default
    pub fn effective_cppstd(&self) -> Option<CppStd> {
        self.cppstd.or_else(|| self.compiler.default_cppstd())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cppstd() {
        assert_eq!("20".parse::<CppStd>().unwrap(), CppStd::new(Standard::Cpp20));
        assert_eq!("gnu17".parse::<CppStd>().unwrap(), CppStd::gnu(Standard::Cpp17));
        assert!("21".parse::<CppStd>().is_err());
        assert_eq!(CppStd::gnu(Standard::Cpp20).to_string(), "gnu20");
    }

    #[test]
    fn test_standard_ordering() {
        assert!(Standard::Cpp98 < Standard::Cpp11);
        assert!(Standard::Cpp17 < Standard::Cpp20);
    }

    #[test]
    fn test_default_cppstd() {
        let gcc = Compiler::new(CompilerKind::Gcc, "13.2");
        assert_eq!(gcc.default_cppstd(), Some(CppStd::gnu(Standard::Cpp17)));

        let old_gcc = Compiler::new(CompilerKind::Gcc, "9");
        assert_eq!(old_gcc.default_cppstd(), Some(CppStd::gnu(Standard::Cpp14)));

        let msvc = Compiler::new(CompilerKind::Msvc, "193");
        assert_eq!(msvc.default_cppstd(), Some(CppStd::new(Standard::Cpp14)));

        let old_msvc = Compiler::new(CompilerKind::Msvc, "180");
        assert_eq!(old_msvc.default_cppstd(), None);

        let unknown = Compiler::new(CompilerKind::Other("icx".to_string()), "2024");
        assert_eq!(unknown.default_cppstd(), None);
    }

    #[test]
    fn test_parse_build_type() {
        assert_eq!("release".parse::<BuildType>().unwrap(), BuildType::Release);
        assert_eq!(
            "RelWithDebInfo".parse::<BuildType>().unwrap(),
            BuildType::RelWithDebInfo
        );
        assert!("fast".parse::<BuildType>().is_err());
    }

    #[test]
    fn test_effective_cppstd_prefers_explicit() {
        let settings = Settings::new(Compiler::new(CompilerKind::Gcc, "13"))
            .with_cppstd(CppStd::new(Standard::Cpp20));
        assert_eq!(settings.effective_cppstd(), Some(CppStd::new(Standard::Cpp20)));
    }
}
