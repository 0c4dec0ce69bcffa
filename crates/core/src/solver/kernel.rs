//! Update kernel source
//!
//! The GPU backend compiles its update rule from WGSL at startup. The
//! built-in kernel is embedded in the library; a run may instead point at an
//! external file with the same bindings (for experimenting with the stencil
//! without rebuilding).

use crate::error::{Result, SimError};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Built-in WGSL kernel
pub const BUILTIN_KERNEL: &str = include_str!("shaders/wave_update.wgsl");

/// Entry point every kernel must define
pub const KERNEL_ENTRY_POINT: &str = "main";

/// Workgroup edge length declared by the kernel (`@workgroup_size(16, 16)`)
pub const WORKGROUP_SIZE: u32 = 16;

/// Where the WGSL update kernel comes from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum KernelSource {
    /// The kernel compiled into the library
    #[default]
    Builtin,
    /// A WGSL file read at startup
    File(PathBuf),
}

impl KernelSource {
    /// Kernel source from an optional configured path
    #[must_use]
    pub fn from_path(path: Option<&Path>) -> Self {
        path.map_or(Self::Builtin, |p| Self::File(p.to_path_buf()))
    }

    /// Read the WGSL text
    ///
    /// # Errors
    ///
    /// Returns `SimError::KernelSource` if the file cannot be read.
    pub fn load(&self) -> Result<Cow<'static, str>> {
        match self {
            Self::Builtin => Ok(Cow::Borrowed(BUILTIN_KERNEL)),
            Self::File(path) => std::fs::read_to_string(path)
                .map(Cow::Owned)
                .map_err(|source| SimError::KernelSource {
                    path: path.clone(),
                    source,
                }),
        }
    }

    /// Label for logs
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Builtin => "built-in".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_kernel_declares_bindings() {
        let source = KernelSource::Builtin.load().unwrap();
        assert!(source.contains("fn main"));
        assert!(source.contains("@workgroup_size(16, 16)"));
        for binding in 0..5 {
            assert!(source.contains(&format!("@binding({binding})")));
        }
    }

    #[test]
    fn test_missing_kernel_file() {
        let kernel = KernelSource::from_path(Some(Path::new("/nonexistent/kernel.wgsl")));
        let err = kernel.load().unwrap_err();
        assert!(matches!(err, SimError::KernelSource { .. }));
        assert!(err.to_string().contains("kernel.wgsl"));
    }

    #[test]
    fn test_from_path_none_is_builtin() {
        assert_eq!(KernelSource::from_path(None), KernelSource::Builtin);
        assert_eq!(KernelSource::Builtin.describe(), "built-in");
    }
}
