use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};

use gtp_engine::player::Coord;

fn spawn_engine() -> std::process::Child {
    let exe = env!("CARGO_BIN_EXE_gtp_engine");
    Command::new(exe)
        .args(["--board-size", "9", "--num-readouts", "16", "--seed", "7"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn engine binary")
}

/// Read one `=`/`?` block, without its trailing blank line.
fn read_block(reader: &mut impl BufRead) -> String {
    let mut block = String::new();
    loop {
        let mut line = String::new();
        let bytes = reader.read_line(&mut line).expect("read failed");
        assert!(bytes > 0, "engine closed stdout mid-response: {block:?}");
        if line == "\n" {
            return block;
        }
        block.push_str(&line);
    }
}

#[test]
fn gtp_smoke_test_plays_a_legal_move() {
    let mut child = spawn_engine();
    let mut stdin = child.stdin.take().unwrap();
    let mut reader = BufReader::new(child.stdout.take().unwrap());

    stdin.write_all(b"1 name\n").unwrap();
    assert_eq!(read_block(&mut reader), "=1 gtp_engine-playout\n");

    stdin.write_all(b"2 boardsize 9\n3 komi 7.5\nplay b E5\n").unwrap();
    assert_eq!(read_block(&mut reader), "=2\n");
    assert_eq!(read_block(&mut reader), "=3\n");
    assert_eq!(read_block(&mut reader), "=\n");

    stdin.write_all(b"4 genmove w\n").unwrap();
    let reply = read_block(&mut reader);
    let mv = reply
        .strip_prefix("=4 ")
        .and_then(|rest| rest.strip_suffix('\n'))
        .unwrap_or_else(|| panic!("unexpected genmove reply: {reply:?}"));
    let coord = Coord::from_gtp(mv, 9, true).expect("genmove returned a non-GTP move");
    assert_ne!(coord, Coord::from_gtp("E5", 9, false).unwrap());

    stdin.write_all(b"showboard\n").unwrap();
    let board = read_block(&mut reader);
    assert!(board.starts_with("= \n    A B C D E F G H J\n"));
    assert!(board.contains('X'));

    stdin.write_all(b"quit\n").unwrap();
    assert_eq!(read_block(&mut reader), "=\n");
    let status = child.wait().unwrap();
    assert!(status.success());
}

#[test]
fn gtp_reports_errors_and_exits_at_eof() {
    let mut child = spawn_engine();
    let input = b"boardsize 19\nfrobnicate\n5 undo\nknown_command genmove\nlist_commands\n";
    child.stdin.take().unwrap().write_all(input).unwrap();

    let output = child.wait_with_output().expect("failed to read output");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);

    let blocks: Vec<&str> = stdout.split("\n\n").collect();
    assert_eq!(blocks[0], "? unacceptable size");
    assert_eq!(blocks[1], "? unknown command");
    assert_eq!(blocks[2], "?5 cannot undo");
    assert_eq!(blocks[3], "= true");
    assert!(blocks[4].starts_with("= benchmark\nboardsize\nclear_board\n"));
    assert!(blocks[4].ends_with("showboard\nundo"));
}
