use std::io::Read;

use log::{debug, warn};
use rock_core::Mode;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// A single-key command typed on the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Show(Mode),
    Screenshot,
    Quit,
}

impl KeyCommand {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'd' => Some(KeyCommand::Show(Mode::Weather)),
            'h' => Some(KeyCommand::Show(Mode::Hourly)),
            'i' => Some(KeyCommand::Show(Mode::Info)),
            's' => Some(KeyCommand::Screenshot),
            'q' => Some(KeyCommand::Quit),
            _ => None,
        }
    }
}

/// Reads stdin on its own thread and forwards recognised keys.
///
/// A plain thread rather than a runtime task, so a pending read never holds up shutdown.
/// The terminal stays in line-buffered mode, so on a tty keys arrive once Enter is
/// pressed. Several keys on one line run in order. Piped input needs no Enter.
pub fn spawn_reader() -> UnboundedReceiver<KeyCommand> {
    let (tx, rx) = unbounded_channel();
    std::thread::spawn(move || read_keys(std::io::stdin().lock(), tx));
    rx
}

fn read_keys<R: Read>(input: R, tx: UnboundedSender<KeyCommand>) {
    for byte in input.bytes() {
        let byte = match byte {
            Ok(b) => b,
            Err(err) => {
                warn!("Stopped reading keys: {err}");
                return;
            }
        };
        if let Some(cmd) = KeyCommand::from_char(byte as char) {
            debug!("Key command {cmd:?}");
            if tx.send(cmd).is_err() {
                return;
            }
        }
    }
    debug!("stdin closed, key commands disabled");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(KeyCommand::from_char('d'), Some(KeyCommand::Show(Mode::Weather)));
        assert_eq!(KeyCommand::from_char('H'), Some(KeyCommand::Show(Mode::Hourly)));
        assert_eq!(KeyCommand::from_char('i'), Some(KeyCommand::Show(Mode::Info)));
        assert_eq!(KeyCommand::from_char('s'), Some(KeyCommand::Screenshot));
        assert_eq!(KeyCommand::from_char('q'), Some(KeyCommand::Quit));
        assert_eq!(KeyCommand::from_char('x'), None);
    }

    #[test]
    fn reader_forwards_known_keys_only() {
        let (tx, mut rx) = unbounded_channel();
        read_keys(&b"hx\ns"[..], tx);

        assert_eq!(rx.try_recv().unwrap(), KeyCommand::Show(Mode::Hourly));
        assert_eq!(rx.try_recv().unwrap(), KeyCommand::Screenshot);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn one_line_of_keys_runs_in_order() {
        let (tx, mut rx) = unbounded_channel();
        read_keys(&b"ihq\n"[..], tx);

        assert_eq!(rx.try_recv().unwrap(), KeyCommand::Show(Mode::Info));
        assert_eq!(rx.try_recv().unwrap(), KeyCommand::Show(Mode::Hourly));
        assert_eq!(rx.try_recv().unwrap(), KeyCommand::Quit);
        assert!(rx.try_recv().is_err());
    }
}
