// ABOUTME: Fake tool directories used as the verifier's search path.
// ABOUTME: Each tool is an empty executable file.

use std::path::Path;
use tempfile::TempDir;

pub const ALL_TOOLS: [&str; 4] = ["docker", "docker-compose", "curl", "jq"];

pub fn install(dir: &Path, name: &str) {
    let path = dir.join(name);
    std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}

/// A directory holding the named tools.
pub fn bin_dir(tools: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for tool in tools {
        install(dir.path(), tool);
    }
    dir
}
