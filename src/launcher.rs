//! Playback launcher: run the external player on one video and wait for it.

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use tracing::{info, warn};

use crate::error::LaunchError;
use crate::settings::PlayerConfig;

/// How the player process ended. `code` is `None` when it was killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerExit {
    pub code: Option<i32>,
}

impl PlayerExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs a program to completion. The first element of `argv` is the program.
pub trait ProcessRunner {
    fn run_blocking(&mut self, argv: &[OsString]) -> Result<PlayerExit, LaunchError>;
}

/// Spawns real processes, inheriting stdio.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run_blocking(&mut self, argv: &[OsString]) -> Result<PlayerExit, LaunchError> {
        let (program, args) = argv.split_first().ok_or(LaunchError::EmptyCommand)?;
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|source| LaunchError::Spawn {
                program: program.to_string_lossy().into_owned(),
                source,
            })?;
        Ok(PlayerExit {
            code: status.code(),
        })
    }
}

/// `[command, args..., video]`.
pub fn player_argv(player: &PlayerConfig, video: &Path) -> Result<Vec<OsString>, LaunchError> {
    if player.command.trim().is_empty() {
        return Err(LaunchError::EmptyCommand);
    }
    let mut argv: Vec<OsString> = Vec::with_capacity(player.args.len() + 2);
    argv.push(player.command.clone().into());
    argv.extend(player.args.iter().map(OsString::from));
    argv.push(video.as_os_str().to_owned());
    Ok(argv)
}

/// Play `video` and block until the player exits.
///
/// A non-zero exit is logged and returned, not treated as an error.
pub fn play<R: ProcessRunner + ?Sized>(
    runner: &mut R,
    player: &PlayerConfig,
    video: &Path,
) -> Result<PlayerExit, LaunchError> {
    let argv = player_argv(player, video)?;
    info!("play: {} {}", player.command, video.display());
    let exit = runner.run_blocking(&argv)?;
    if exit.success() {
        info!("play: player finished");
    } else {
        warn!(code = ?exit.code, "play: player exited abnormally");
    }
    Ok(exit)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every argv and answers with a canned result.
    struct FakeRunner {
        calls: Vec<Vec<OsString>>,
        exit: Option<i32>,
        fail: bool,
    }

    impl FakeRunner {
        fn exiting(code: Option<i32>) -> Self {
            FakeRunner {
                calls: Vec::new(),
                exit: code,
                fail: false,
            }
        }
    }

    impl ProcessRunner for FakeRunner {
        fn run_blocking(&mut self, argv: &[OsString]) -> Result<PlayerExit, LaunchError> {
            self.calls.push(argv.to_vec());
            if self.fail {
                return Err(LaunchError::Spawn {
                    program: argv[0].to_string_lossy().into_owned(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            }
            Ok(PlayerExit { code: self.exit })
        }
    }

    fn player(command: &str, args: &[&str]) -> PlayerConfig {
        PlayerConfig {
            command: command.into(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn argv_appends_video_last() {
        let argv = player_argv(&player("vlc", &[]), Path::new("/v/a/cat.mp4")).unwrap();
        assert_eq!(argv, vec![OsString::from("vlc"), OsString::from("/v/a/cat.mp4")]);
    }

    #[test]
    fn argv_keeps_extra_args_before_video() {
        let argv = player_argv(
            &player("mpv", &["--fs", "--no-terminal"]),
            Path::new("clip.mkv"),
        )
        .unwrap();
        let want: Vec<OsString> = ["mpv", "--fs", "--no-terminal", "clip.mkv"]
            .iter()
            .map(OsString::from)
            .collect();
        assert_eq!(argv, want);
    }

    #[test]
    fn argv_keeps_command_with_spaces_whole() {
        let cmd = r"C:\Program Files\VideoLAN\VLC\vlc.exe";
        let argv = player_argv(&player(cmd, &[]), Path::new("x.mp4")).unwrap();
        assert_eq!(argv.len(), 2);
        assert_eq!(argv[0], OsString::from(cmd));
    }

    #[test]
    fn empty_command_is_rejected() {
        let err = player_argv(&player("  ", &[]), Path::new("x.mp4")).unwrap_err();
        assert!(matches!(err, LaunchError::EmptyCommand));
    }

    #[test]
    fn play_runs_once_and_reports_exit() {
        let mut runner = FakeRunner::exiting(Some(0));
        let exit = play(&mut runner, &player("vlc", &[]), Path::new("m.mp4")).unwrap();
        assert!(exit.success());
        assert_eq!(runner.calls.len(), 1);
    }

    #[test]
    fn nonzero_exit_is_not_an_error() {
        let mut runner = FakeRunner::exiting(Some(3));
        let exit = play(&mut runner, &player("vlc", &[]), Path::new("m.mp4")).unwrap();
        assert_eq!(exit.code, Some(3));
        assert!(!exit.success());
    }

    #[test]
    fn signal_exit_is_not_success() {
        assert!(!PlayerExit { code: None }.success());
    }

    #[test]
    fn spawn_failure_is_surfaced() {
        let mut runner = FakeRunner::exiting(Some(0));
        runner.fail = true;
        let err = play(&mut runner, &player("ghost", &[]), Path::new("m.mp4")).unwrap_err();
        assert!(matches!(err, LaunchError::Spawn { .. }));
    }

    #[test]
    fn system_runner_missing_binary_is_launch_error() {
        let argv = vec![OsString::from("kv-test-no-such-player-binary")];
        let err = SystemRunner.run_blocking(&argv).unwrap_err();
        match err {
            LaunchError::Spawn { program, source } => {
                assert_eq!(program, "kv-test-no-such-player-binary");
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn system_runner_empty_argv() {
        assert!(matches!(
            SystemRunner.run_blocking(&[]),
            Err(LaunchError::EmptyCommand)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_reports_exit_codes() {
        let ok = play(&mut SystemRunner, &player("true", &[]), Path::new("ignored.mp4")).unwrap();
        assert!(ok.success());

        let bad = play(&mut SystemRunner, &player("false", &[]), Path::new("ignored.mp4")).unwrap();
        assert_eq!(bad.code, Some(1));
    }
}
