//! Output folder conventions

use crate::settings::BuildType;
use std::path::PathBuf;

/// Decides where generated files go
pub trait Layout {
    fn build_folder(&self) -> PathBuf;
    fn generators_folder(&self) -> PathBuf;
}

/// The usual CMake project layout
///
/// Single-config generators get one folder per build type; multi-config
/// generators share `build`.
#[derive(Debug, Clone)]
pub struct CMakeLayout {
    root: PathBuf,
    build_type: BuildType,
    multi_config: bool,
}

impl CMakeLayout {
    pub fn new(root: impl Into<PathBuf>, build_type: BuildType) -> Self {
        Self {
            root: root.into(),
            build_type,
            multi_config: false,
        }
    }

    pub fn multi_config(mut self, multi_config: bool) -> Self {
        self.multi_config = multi_config;
        self
    }
}

impl Layout for CMakeLayout {
    fn build_folder(&self) -> PathBuf {
        let build = self.root.join("build");
        if self.multi_config {
            build
        } else {
            build.join(self.build_type.as_str())
        }
    }

    fn generators_folder(&self) -> PathBuf {
        self.build_folder().join("generators")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_config() {
        let layout = CMakeLayout::new("/src/covent", BuildType::Debug);
        assert_eq!(layout.build_folder(), PathBuf::from("/src/covent/build/Debug"));
        assert_eq!(
            layout.generators_folder(),
            PathBuf::from("/src/covent/build/Debug/generators")
        );
    }

    #[test]
    fn test_multi_config() {
        let layout = CMakeLayout::new("/src/covent", BuildType::Release).multi_config(true);
        assert_eq!(
            layout.generators_folder(),
            PathBuf::from("/src/covent/build/generators")
        );
    }
}
