use aim_schema::ArtifactId;
use dirs::home_dir;
use std::path::{Path, PathBuf};

/// Default install directory (`~/Applications`), or None if the user's home cannot be resolved.
pub fn default_install_dir() -> Option<PathBuf> {
    home_dir().map(|h| h.join("Applications"))
}

/// Registry document: <install_dir>/registry.json
pub fn registry_path(install_dir: &Path) -> PathBuf {
    install_dir.join("registry.json")
}

/// Optional settings file: <install_dir>/aim.toml
pub fn config_path(install_dir: &Path) -> PathBuf {
    install_dir.join("aim.toml")
}

/// Default artifact location: <install_dir>/<owner>_<project>.AppImage
pub fn default_artifact_path(install_dir: &Path, id: &ArtifactId) -> PathBuf {
    install_dir.join(id.default_file_name())
}

/// Sibling file a download is streamed into before it replaces `dest`.
pub fn partial_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!("{name}.part"))
}

/// Extract the filename from a URL.
pub fn filename_from_url(url: &str) -> &str {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    without_query.split('/').next_back().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let dir = Path::new("/home/u/Applications");
        let id = ArtifactId::parse("acme/tool").unwrap();
        assert_eq!(registry_path(dir), dir.join("registry.json"));
        assert_eq!(config_path(dir), dir.join("aim.toml"));
        assert_eq!(
            default_artifact_path(dir, &id),
            dir.join("acme_tool.AppImage")
        );
        assert_eq!(
            partial_path(&dir.join("acme_tool.AppImage")),
            dir.join("acme_tool.AppImage.part")
        );
    }

    #[test]
    fn test_filename_from_url() {
        assert_eq!(
            filename_from_url("https://github.com/acme/tool/releases/download/v2/tool.AppImage"),
            "tool.AppImage"
        );
        assert_eq!(filename_from_url("https://x/tool.AppImage?raw=1"), "tool.AppImage");
        assert_eq!(filename_from_url(""), "");
    }
}
