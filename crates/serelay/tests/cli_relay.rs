#![cfg(all(unix, feature = "cli"))]

use std::path::PathBuf;
use std::process::{Command, Output};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "serelay-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn serelay(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_serelay"))
        .args(["--log-level", "error"])
        .args(args)
        .env_remove("SERELAY_PORT")
        .env_remove("SERELAY_INPUT")
        .env_remove("SERELAY_OUTPUT")
        .output()
        .expect("serelay should run")
}

#[test]
fn missing_device_exits_with_open_code() {
    let dir = unique_temp_dir("missing-device");
    let device = dir.join("ttyNOPE");
    let input = dir.join("in.csv");
    std::fs::write(&input, "1,2\n").expect("input should be writable");

    let out = serelay(&[
        "relay",
        "-p",
        device.to_str().expect("utf-8 path"),
        "-f",
        input.to_str().expect("utf-8 path"),
    ]);

    // -1 truncated to an 8-bit process status.
    assert_eq!(out.status.code(), Some(255));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("failed to open serial device"), "stderr: {stderr}");
    assert!(stderr.contains("ttyNOPE"), "stderr: {stderr}");
    assert!(out.stdout.is_empty());
}

#[test]
fn non_terminal_device_exits_with_config_code() {
    let dir = unique_temp_dir("not-a-tty");
    let device = dir.join("plain-file");
    std::fs::write(&device, b"").expect("device stand-in should be writable");

    let out = serelay(&["relay", "-p", device.to_str().expect("utf-8 path")]);

    assert_eq!(out.status.code(), Some(254));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("failed to read attributes"), "stderr: {stderr}");
}

#[test]
fn forward_rejects_both_roles() {
    let out = serelay(&["forward", "-c", "-s"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn unknown_flag_is_reported_and_run_continues() {
    let dir = unique_temp_dir("unknown-flag");
    let device = dir.join("ttyNOPE");

    let out = serelay(&[
        "relay",
        "--bogus",
        "-p",
        device.to_str().expect("utf-8 path"),
    ]);

    // The run went on to the device open instead of stopping at parsing.
    assert_eq!(out.status.code(), Some(255));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("unknown argument \"--bogus\""), "stderr: {stderr}");
    assert!(stderr.contains("failed to open serial device"), "stderr: {stderr}");
}

#[test]
fn version_prints_package_version() {
    let out = serelay(&["version"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.trim(), format!("serelay {}", env!("CARGO_PKG_VERSION")));
}

#[cfg(target_os = "linux")]
mod loopback {
    use std::ffi::CStr;
    use std::fs::File;
    use std::io::{BufRead, BufReader, ErrorKind, Read, Write};
    use std::os::fd::FromRawFd;
    use std::path::PathBuf;
    use std::process::{Command, Stdio};
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    use super::{serelay, unique_temp_dir};

    fn open_pty() -> (File, PathBuf) {
        // SAFETY: plain libc pty allocation; every return code is checked
        // and the master descriptor is handed to a File exactly once.
        unsafe {
            let master = libc::posix_openpt(libc::O_RDWR | libc::O_NOCTTY);
            assert!(master >= 0, "posix_openpt failed");
            assert_eq!(libc::fcntl(master, libc::F_SETFD, libc::FD_CLOEXEC), 0);
            assert_eq!(libc::grantpt(master), 0);
            assert_eq!(libc::unlockpt(master), 0);
            let mut name = [0 as libc::c_char; 128];
            assert_eq!(libc::ptsname_r(master, name.as_mut_ptr(), name.len()), 0);
            let slave = CStr::from_ptr(name.as_ptr())
                .to_string_lossy()
                .into_owned();
            (File::from_raw_fd(master), PathBuf::from(slave))
        }
    }

    /// Echo everything the slave side writes straight back to it.
    ///
    /// The master reports EIO while no process holds the slave open, so
    /// that is retried until data has flowed and then taken as hang-up.
    fn spawn_echo(mut master: File) {
        std::thread::spawn(move || {
            let deadline = Instant::now() + Duration::from_secs(15);
            let mut seen = false;
            let mut buf = [0u8; 64];
            while Instant::now() < deadline {
                match master.read(&mut buf) {
                    Ok(0) => std::thread::sleep(Duration::from_millis(5)),
                    Ok(n) => {
                        seen = true;
                        if master.write_all(&buf[..n]).is_err() {
                            return;
                        }
                    }
                    Err(err) if err.kind() == ErrorKind::Interrupted => {}
                    Err(_) if !seen => std::thread::sleep(Duration::from_millis(5)),
                    Err(_) => return,
                }
            }
        });
    }

    #[test]
    fn relay_round_trips_records_through_a_pty_loopback() {
        let dir = unique_temp_dir("pty-loopback");
        let input = dir.join("in.csv");
        let output = dir.join("out.csv");
        std::fs::write(&input, "1,2,3\n4,5\n\n-7\n").expect("input should be writable");

        let (master, slave) = open_pty();
        spawn_echo(master);

        let out = serelay(&[
            "--format",
            "json",
            "relay",
            "-p",
            slave.to_str().expect("utf-8 path"),
            "-f",
            input.to_str().expect("utf-8 path"),
            "-o",
            output.to_str().expect("utf-8 path"),
        ]);

        let stderr = String::from_utf8_lossy(&out.stderr);
        assert!(out.status.success(), "stderr: {stderr}");
        let received = std::fs::read_to_string(&output).expect("output should exist");
        assert_eq!(received, "1,2,3\n4,5\n-7\n");
        assert!(stderr.contains("\"records_received\":3"), "stderr: {stderr}");
    }

    /// Collect `want` bytes arriving on the master side, tolerating EIO
    /// until the slave has been opened.
    fn collect_from_master(mut master: File, want: usize) -> mpsc::Receiver<Vec<u8>> {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let deadline = Instant::now() + Duration::from_secs(10);
            let mut got = Vec::new();
            let mut buf = [0u8; 64];
            while got.len() < want && Instant::now() < deadline {
                match master.read(&mut buf) {
                    Ok(0) => std::thread::sleep(Duration::from_millis(5)),
                    Ok(n) => got.extend_from_slice(&buf[..n]),
                    Err(err) if err.kind() == ErrorKind::Interrupted => {}
                    Err(_) if got.is_empty() => std::thread::sleep(Duration::from_millis(5)),
                    Err(_) => break,
                }
            }
            let _ = tx.send(got);
        });
        rx
    }

    #[test]
    fn forward_server_copies_stdin_to_device() {
        let (master, slave) = open_pty();
        let received = collect_from_master(master, 6);

        let mut child = Command::new(env!("CARGO_BIN_EXE_serelay"))
            .args(["--log-level", "error", "forward", "-s", "-p"])
            .arg(&slave)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .expect("forward server should start");
        {
            let mut stdin = child.stdin.take().expect("stdin should be piped");
            stdin.write_all(b"1,2,3\n").expect("stdin should accept input");
        }

        let out = child.wait_with_output().expect("forward server should exit");
        let stderr = String::from_utf8_lossy(&out.stderr);
        assert!(out.status.success(), "stderr: {stderr}");

        let got = received
            .recv_timeout(Duration::from_secs(10))
            .expect("master reader should report");
        assert_eq!(got, b"1,2,3\n");
    }

    #[test]
    fn forward_client_copies_device_to_stdout() {
        let (mut master, slave) = open_pty();

        let mut child = Command::new(env!("CARGO_BIN_EXE_serelay"))
            .args(["--log-level", "info", "forward", "-c", "-p"])
            .arg(&slave)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("forward client should start");

        // Input written before the port is configured would be flushed away.
        let stderr = child.stderr.take().expect("stderr should be piped");
        let (ready_tx, ready_rx) = mpsc::channel();
        std::thread::spawn(move || {
            for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                if line.contains("serial port configured") {
                    let _ = ready_tx.send(());
                }
            }
        });
        ready_rx
            .recv_timeout(Duration::from_secs(10))
            .expect("port should be configured");

        master.write_all(b"4,5\n").expect("master should accept input");

        // No --follow: the client ends at the first idle read timeout.
        let out = child.wait_with_output().expect("forward client should exit");
        assert!(out.status.success());
        assert_eq!(out.stdout, b"4,5\n");
    }
}
