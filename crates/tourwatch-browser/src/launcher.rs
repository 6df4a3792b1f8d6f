use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use tempfile::TempDir;

/// User agent presented to the booking site. The stock headless UA gets the
/// booking widget served differently, so a desktop Chrome string is spoofed.
const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

const WINDOW_SIZE: &str = "1920,1080";

/// Manages headless Chrome process lifecycle.
pub struct ChromeLauncher {
    custom_path: Option<PathBuf>,
    debugging_port: u16,
}

impl ChromeLauncher {
    /// Create a launcher, optionally pinned to an explicit Chrome binary.
    pub fn new(custom_path: Option<PathBuf>) -> Self {
        Self {
            custom_path,
            debugging_port: 9222,
        }
    }

    pub fn debugging_port(&self) -> u16 {
        self.debugging_port
    }

    /// Spawn a headless Chrome with a throwaway profile.
    pub fn launch(&self) -> Result<ChromeProcess> {
        let binary = self.resolve_binary()?;
        let profile_dir = tempfile::tempdir().map_err(Error::Io)?;
        self.spawn_with_profile(&binary, profile_dir)
    }

    fn spawn_with_profile(&self, binary: &Path, profile_dir: TempDir) -> Result<ChromeProcess> {
        let args = self.build_args(profile_dir.path());

        tracing::debug!("Launching {} with {} args", binary.display(), args.len());

        // If the spawn fails, dropping the TempDir removes the profile; it
        // is only detached from cleanup once Chrome actually owns it.
        let child = Command::new(binary)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Browser(format!("Failed to launch Chrome: {}", e)))?;

        Ok(ChromeProcess {
            child,
            profile_dir: profile_dir.keep(),
            debugging_port: self.debugging_port,
        })
    }

    /// Chrome arguments for an undetected headless session.
    fn build_args(&self, profile_dir: &Path) -> Vec<String> {
        vec![
            format!("--remote-debugging-port={}", self.debugging_port),
            "--headless=new".to_string(),
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
            // The site hides the booking widget from obvious automation.
            "--disable-blink-features=AutomationControlled".to_string(),
            format!("--user-agent={}", USER_AGENT),
            format!("--window-size={}", WINDOW_SIZE),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            format!("--user-data-dir={}", profile_dir.display()),
            "about:blank".to_string(),
        ]
    }

    /// Find the Chrome binary: explicit path first, then platform defaults.
    fn resolve_binary(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.custom_path {
            return validate_binary(path);
        }

        for path in Self::default_paths() {
            if let Ok(valid) = validate_binary(&path) {
                return Ok(valid);
            }
        }

        Err(Error::Browser(format!(
            "Chrome not found. Checked: {}. Use --chrome-path to specify location.",
            Self::default_paths()
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }

    fn default_paths() -> Vec<PathBuf> {
        #[cfg(target_os = "macos")]
        return vec![
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
        ];

        #[cfg(target_os = "linux")]
        return vec![
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/usr/bin/chromium"),
            PathBuf::from("/usr/bin/chromium-browser"),
        ];

        #[cfg(target_os = "windows")]
        return vec![
            PathBuf::from(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
            PathBuf::from(r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe"),
        ];

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        return vec![];
    }
}

fn validate_binary(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(Error::Browser(format!(
            "Chrome not found at: {}",
            path.display()
        )));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata = std::fs::metadata(path).map_err(Error::Io)?;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(Error::Browser(format!(
                "Chrome binary not executable: {}",
                path.display()
            )));
        }
    }

    Ok(path.to_path_buf())
}

/// A running Chrome owned by one check. Kill removes the throwaway profile.
pub struct ChromeProcess {
    child: Child,
    profile_dir: PathBuf,
    debugging_port: u16,
}

impl ChromeProcess {
    pub fn debugging_port(&self) -> u16 {
        self.debugging_port
    }

    /// Terminate Chrome and clean up its profile directory.
    pub fn kill(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        if self.profile_dir.exists() {
            let _ = std::fs::remove_dir_all(&self.profile_dir);
        }
    }
}

impl Drop for ChromeProcess {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launcher_builds_headless_args() {
        let launcher = ChromeLauncher::new(None);
        let profile = PathBuf::from("/tmp/profile");

        let args = launcher.build_args(&profile);

        assert!(args.contains(&"--remote-debugging-port=9222".to_string()));
        assert!(args.contains(&"--headless=new".to_string()));
        assert!(args.contains(&"--no-sandbox".to_string()));
        assert!(args.contains(&"--disable-dev-shm-usage".to_string()));
        assert!(args.contains(&"--disable-blink-features=AutomationControlled".to_string()));
        assert!(args.contains(&"--window-size=1920,1080".to_string()));
        assert!(args.iter().any(|a| a.starts_with("--user-agent=Mozilla/5.0")));
        assert!(args.iter().any(|a| a.starts_with("--user-data-dir=")));
    }

    #[test]
    fn test_resolve_binary_fails_for_missing_custom_path() {
        let launcher = ChromeLauncher::new(Some(PathBuf::from("/nonexistent/chrome")));
        let result = launcher.resolve_binary();

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_failed_spawn_removes_profile_dir() {
        let launcher = ChromeLauncher::new(None);
        let profile = tempfile::tempdir().unwrap();
        let profile_path = profile.path().to_path_buf();

        let result = launcher.spawn_with_profile(Path::new("/nonexistent/chrome"), profile);

        assert!(result.is_err());
        assert!(!profile_path.exists());
    }

    #[test]
    fn test_resolve_binary_accepts_executable_custom_path() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        let path = temp.path();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        let launcher = ChromeLauncher::new(Some(path.to_path_buf()));
        assert_eq!(launcher.resolve_binary().unwrap(), path);
    }
}
