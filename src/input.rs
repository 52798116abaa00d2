use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::settings::KeyCommand;

/// Parse one line typed at the console. Every recognised character becomes a
/// command, so `CCC` raises cohesion three steps.
pub fn parse_line(line: &str) -> Vec<KeyCommand> {
    line.chars().filter_map(KeyCommand::from_key).collect()
}

fn read_keys(reader: impl BufRead, tx: Sender<KeyCommand>) {
    for line in reader.lines() {
        let Ok(line) = line else {
            break;
        };
        for cmd in parse_line(&line) {
            if tx.send(cmd).is_err() {
                return;
            }
        }
    }
    log::debug!("keyboard input closed");
}

/// Read commands from stdin on a background thread.
pub fn spawn_key_reader() -> Receiver<KeyCommand> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || read_keys(std::io::stdin().lock(), tx));
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::WeightKind;

    #[test]
    fn unknown_keys_are_ignored() {
        assert_eq!(
            parse_line("Cx p"),
            vec![
                KeyCommand::Increase(WeightKind::Cohesion),
                KeyCommand::TogglePause
            ]
        );
    }

    #[test]
    fn reader_forwards_every_line() {
        let (tx, rx) = mpsc::channel();
        read_keys("a\nbq\n".as_bytes(), tx);
        let got: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            got,
            vec![
                KeyCommand::ToggleAnnotations,
                KeyCommand::Decrease(WeightKind::Boundary),
                KeyCommand::Quit
            ]
        );
    }
}
