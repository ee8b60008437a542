use std::path::PathBuf;

/// The daemon binary is installed next to the cli.
pub fn to_daemon_path(mut path: PathBuf) -> PathBuf {
    path.set_file_name("screentime-daemon");
    #[cfg(windows)]
    {
        path.set_extension("exe");
    }
    path
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::to_daemon_path;

    #[test]
    fn test_daemon_lives_next_to_cli() {
        let daemon = to_daemon_path(PathBuf::from("bin").join("screentime"));
        assert_eq!(daemon.parent(), Some(PathBuf::from("bin").as_path()));
        assert_eq!(
            daemon.file_stem().and_then(|v| v.to_str()),
            Some("screentime-daemon")
        );
    }
}
