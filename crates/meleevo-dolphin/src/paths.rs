use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

/// Name of the controller pipe Dolphin is configured to read.
pub const PAD_PIPE_NAME: &str = "meleevo";

/// Candidate Dolphin user directories for this platform, relative to `$HOME`.
#[cfg(target_os = "macos")]
const CANDIDATES: &[&str] = &["Library/Application Support/Dolphin"];
#[cfg(not(target_os = "macos"))]
const CANDIDATES: &[&str] = &[".local/share/dolphin-emu", ".dolphin-emu"];

/// Locates the Dolphin user directory, if one has been created on this
/// machine by running the emulator at least once.
///
/// Returns `None` when no candidate directory exists; the trainer treats that
/// as "nothing to train against" and exits cleanly.
#[must_use]
pub fn find_dolphin_dir() -> Option<PathBuf> {
    let home = PathBuf::from(env::var_os("HOME")?);
    find_dolphin_dir_in(&home)
}

fn find_dolphin_dir_in(home: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|candidate| home.join(candidate))
        .find(|path| path.is_dir())
}

/// Writes the watched-address list where Dolphin's MemoryWatcher expects it.
///
/// The file is one address per line, written once before training starts.
pub fn write_locations(dolphin_dir: &Path, locations: &[String]) -> io::Result<()> {
    let dir = dolphin_dir.join("MemoryWatcher");
    fs::create_dir_all(&dir)?;
    fs::write(dir.join("Locations.txt"), locations.join("\n"))
}

/// Path of the controller command pipe under the Dolphin user directory.
#[must_use]
pub fn pad_pipe_path(dolphin_dir: &Path) -> PathBuf {
    dolphin_dir.join("Pipes").join(PAD_PIPE_NAME)
}

/// Path of the memory watcher socket under the Dolphin user directory.
#[must_use]
pub fn watcher_socket_path(dolphin_dir: &Path) -> PathBuf {
    dolphin_dir.join("MemoryWatcher").join("MemoryWatcher")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locations_file_is_newline_joined() {
        let dir = env::temp_dir().join(format!("meleevo-paths-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let locations = vec!["00479D60".to_owned(), "00479D30".to_owned()];
        write_locations(&dir, &locations).unwrap();
        let written = fs::read_to_string(dir.join("MemoryWatcher/Locations.txt")).unwrap();
        assert_eq!(written, "00479D60\n00479D30");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn discovery_finds_a_platform_candidate_under_home() {
        let home = env::temp_dir().join(format!("meleevo-home-{}", std::process::id()));
        let dolphin = home.join(CANDIDATES[0]);
        fs::create_dir_all(&dolphin).unwrap();
        assert_eq!(find_dolphin_dir_in(&home), Some(dolphin));
        fs::remove_dir_all(&home).unwrap();
    }

    #[test]
    fn discovery_returns_none_for_an_empty_home() {
        let home = env::temp_dir().join(format!("meleevo-empty-home-{}", std::process::id()));
        fs::create_dir_all(&home).unwrap();
        assert_eq!(find_dolphin_dir_in(&home), None);
        fs::remove_dir_all(&home).unwrap();
    }

    #[test]
    fn channel_paths_live_under_the_user_dir() {
        let dir = Path::new("/tmp/dolphin");
        assert_eq!(
            pad_pipe_path(dir),
            Path::new("/tmp/dolphin/Pipes/meleevo")
        );
        assert_eq!(
            watcher_socket_path(dir),
            Path::new("/tmp/dolphin/MemoryWatcher/MemoryWatcher")
        );
    }
}
