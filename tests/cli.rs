//! Runs the binary and checks the exit status of fatal paths. A stand-in
//! `tesseract` script is put first on `PATH`, so neither ffmpeg nor
//! tesseract has to be installed.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::str::from_utf8;

fn video_words() -> Command {
    Command::new(env!("CARGO_BIN_EXE_video-words"))
}

/// Writes a `tesseract` that only answers `--list-langs`.
#[cfg(unix)]
fn fake_tesseract(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let bin = dir.join("bin");
    fs::create_dir_all(&bin).unwrap();
    let script = bin.join("tesseract");
    fs::write(
        &script,
        "#!/bin/sh\n\
         if [ \"$1\" = \"--list-langs\" ]; then\n\
         \techo 'List of available languages in \"/fake/tessdata/\" (2):'\n\
         \techo eng\n\
         \techo osd\n\
         \texit 0\n\
         fi\n\
         exit 1\n",
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    bin
}

/// Runs the binary with `bin` ahead of the inherited `PATH`. Executing a
/// freshly written script can race with other tests forking (ETXTBSY), so
/// a startup failure to launch tesseract is retried.
#[cfg(unix)]
fn run_with_fake_tools(bin: &Path, args: &[&std::ffi::OsStr]) -> Output {
    let mut path = OsString::from(bin);
    if let Some(inherited) = std::env::var_os("PATH") {
        path.push(":");
        path.push(inherited);
    }
    let mut output = None;
    for _ in 0..5 {
        let result = video_words()
            .args(args)
            .env("PATH", &path)
            .output()
            .expect("could not run video-words");
        let busy = from_utf8(&result.stderr)
            .unwrap()
            .contains("could not run tesseract");
        output = Some(result);
        if !busy {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(50));
    }
    output.unwrap()
}

#[test]
fn show_help() {
    let output = video_words().arg("--help").output().expect("could not run video-words");
    assert!(output.status.success());
    let stdout = from_utf8(&output.stdout).unwrap();
    assert!(stdout.contains("Usage"));
    assert!(stdout.contains("--frame-gap"));
}

#[test]
fn requires_an_input() {
    let output = video_words().output().expect("could not run video-words");
    assert!(!output.status.success());
}

#[test]
#[cfg(unix)]
fn missing_video_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let bin = fake_tesseract(dir.path());
    let video = dir.path().join("nope.mp4");
    let out = dir.path().join("out");
    let output = run_with_fake_tools(
        &bin,
        &[video.as_os_str(), "--output-dir".as_ref(), out.as_os_str()],
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = from_utf8(&output.stderr).unwrap();
    assert!(stderr.contains("Resource not found"), "{}", stderr);
    assert!(!out.join("nope_words.txt").exists());
}

#[test]
#[cfg(unix)]
fn unsupported_container_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let bin = fake_tesseract(dir.path());
    let video = dir.path().join("clip.webm");
    fs::write(&video, b"").unwrap();
    let out = dir.path().join("out");
    let output = run_with_fake_tools(
        &bin,
        &[video.as_os_str(), "--output-dir".as_ref(), out.as_os_str()],
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = from_utf8(&output.stderr).unwrap();
    assert!(stderr.contains("Unsupported video container"), "{}", stderr);
    assert!(!out.exists());
}

#[test]
#[cfg(unix)]
fn missing_language_data_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let bin = fake_tesseract(dir.path());
    let video = dir.path().join("clip.mp4");
    fs::write(&video, b"").unwrap();
    let output = run_with_fake_tools(&bin, &[video.as_os_str(), "--lang".as_ref(), "eng,jpn".as_ref()]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = from_utf8(&output.stderr).unwrap();
    assert!(stderr.contains("Missing language data files for: jpn"), "{}", stderr);
}

#[test]
fn non_positive_frame_gap_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("clip.mp4");
    fs::write(&video, b"").unwrap();
    let output = video_words()
        .arg(&video)
        .args(["--frame-gap", "0"])
        .output()
        .expect("could not run video-words");
    assert_eq!(output.status.code(), Some(1));
    assert!(from_utf8(&output.stderr).unwrap().contains("frame gap"));
}
