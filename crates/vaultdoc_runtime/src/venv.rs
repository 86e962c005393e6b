//! Isolated-environment (venv) layout and isolation detection.
//!
//! Plain path arithmetic; the workflow verifier runs the commands and decides
//! what to assert.

use std::path::{Path, PathBuf};
use vaultdoc_protocol::EnvPart;

/// Directory name the documentation uses: `python -m venv venv`
pub const DEFAULT_VENV_NAME: &str = "venv";

/// Documented activation commands, shown when not running isolated
pub const ACTIVATION_HINTS: [&str; 2] = [
    "python -m venv venv",
    "source venv/bin/activate  # On Windows: venv\\Scripts\\activate",
];

/// Platform-specific paths inside a venv root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenvLayout {
    root: PathBuf,
}

impl VenvLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bin_dir(&self) -> PathBuf {
        if cfg!(windows) {
            self.root.join("Scripts")
        } else {
            self.root.join("bin")
        }
    }

    pub fn interpreter(&self) -> PathBuf {
        if cfg!(windows) {
            self.bin_dir().join("python.exe")
        } else {
            self.bin_dir().join("python")
        }
    }

    pub fn installer(&self) -> PathBuf {
        if cfg!(windows) {
            self.bin_dir().join("pip.exe")
        } else {
            self.bin_dir().join("pip")
        }
    }

    pub fn activation_script(&self) -> PathBuf {
        if cfg!(windows) {
            self.bin_dir().join("activate.bat")
        } else {
            self.bin_dir().join("activate")
        }
    }

    pub fn part(&self, part: EnvPart) -> PathBuf {
        match part {
            EnvPart::Root => self.root.clone(),
            EnvPart::Interpreter => self.interpreter(),
            EnvPart::Installer => self.installer(),
            EnvPart::ActivationScript => self.activation_script(),
        }
    }

    /// Parts that do not exist on disk
    pub fn missing(&self, parts: &[EnvPart]) -> Vec<PathBuf> {
        parts
            .iter()
            .map(|p| self.part(*p))
            .filter(|p| !p.exists())
            .collect()
    }
}

/// Isolation signal for an interpreter, taken as explicit inputs rather than
/// read from the current process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IsolationSignal {
    /// Value of `VIRTUAL_ENV` in the caller's environment
    pub virtual_env: Option<PathBuf>,
    pub prefix: Option<String>,
    pub base_prefix: Option<String>,
    /// Legacy virtualenv marker (`sys.real_prefix`)
    pub real_prefix: bool,
}

impl IsolationSignal {
    pub fn is_isolated(&self) -> bool {
        if self.real_prefix {
            return true;
        }
        if let (Some(prefix), Some(base)) = (&self.prefix, &self.base_prefix) {
            if prefix != base {
                return true;
            }
        }
        self.virtual_env.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = VenvLayout::new("/tmp/work/venv");
        let python = layout.interpreter();
        assert!(python.starts_with("/tmp/work/venv"));
        assert!(python.to_string_lossy().contains("python"));
        assert!(layout.installer().to_string_lossy().contains("pip"));
        assert!(layout
            .activation_script()
            .to_string_lossy()
            .contains("activate"));
        assert_eq!(layout.part(EnvPart::Root), PathBuf::from("/tmp/work/venv"));
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_layout_uses_bin() {
        let layout = VenvLayout::new("venv");
        assert_eq!(layout.interpreter(), PathBuf::from("venv/bin/python"));
        assert_eq!(layout.installer(), PathBuf::from("venv/bin/pip"));
        assert_eq!(layout.activation_script(), PathBuf::from("venv/bin/activate"));
    }

    #[test]
    fn test_missing_parts_on_empty_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let layout = VenvLayout::new(dir.path().join("venv"));
        let missing = layout.missing(&[EnvPart::Root, EnvPart::Interpreter]);
        assert_eq!(missing.len(), 2);

        std::fs::create_dir_all(layout.bin_dir()).unwrap();
        let missing = layout.missing(&[EnvPart::Root, EnvPart::Interpreter]);
        assert_eq!(missing, vec![layout.interpreter()]);
    }

    #[test]
    fn test_isolation_signal() {
        assert!(!IsolationSignal::default().is_isolated());

        let same_prefix = IsolationSignal {
            prefix: Some("/usr".to_string()),
            base_prefix: Some("/usr".to_string()),
            ..Default::default()
        };
        assert!(!same_prefix.is_isolated());

        let venv = IsolationSignal {
            prefix: Some("/work/venv".to_string()),
            base_prefix: Some("/usr".to_string()),
            ..Default::default()
        };
        assert!(venv.is_isolated());

        let legacy = IsolationSignal {
            real_prefix: true,
            ..Default::default()
        };
        assert!(legacy.is_isolated());

        let env_only = IsolationSignal {
            virtual_env: Some(PathBuf::from("/work/venv")),
            ..Default::default()
        };
        assert!(env_only.is_isolated());
    }
}
