use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const MULTIPLE_CHOICE_SOUND: &str = "sounds/multiple_choice.wav";

/// Receives short status announcements.
pub trait SpeechSink: Send + Sync {
    /// `interrupt` asks the sink to cut off whatever it is currently saying.
    fn say(&self, text: &str, interrupt: bool);
}

pub trait SoundPlayer: Send + Sync {
    /// Plays the file at `path`. `None` does nothing.
    fn play(&self, path: Option<&Path>);
}

/// Announces through the log and stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSpeech;

impl SpeechSink for LogSpeech {
    fn say(&self, text: &str, interrupt: bool) {
        log::info!(target: "speech", "{}{}", if interrupt { "(interrupt) " } else { "" }, text);
        eprintln!("{}", text);
    }
}

/// Stands in for audio playback by ringing the terminal bell.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl SoundPlayer for TerminalBell {
    fn play(&self, path: Option<&Path>) {
        let Some(path) = path else {
            return;
        };
        if !path.is_file() {
            log::debug!("Sound file {} is missing, skipping", path.display());
            return;
        }
        log::debug!("Playing {}", path.display());
        let mut stderr = io::stderr();
        if let Err(e) = stderr.write_all(b"\x07").and_then(|_| stderr.flush()) {
            log::warn!("Failed to ring the terminal bell: {}", e);
        }
    }
}

/// Location of the multiple-choice cue next to the executable, if it exists.
pub fn multiple_choice_sound() -> Option<PathBuf> {
    let exe = env::current_exe().ok()?;
    let path = exe.parent()?.join(MULTIPLE_CHOICE_SOUND);
    path.is_file().then_some(path)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingSpeech {
        pub spoken: Mutex<Vec<String>>,
    }

    impl SpeechSink for RecordingSpeech {
        fn say(&self, text: &str, _interrupt: bool) {
            self.spoken.lock().unwrap().push(text.to_string());
        }
    }

    #[derive(Default)]
    pub struct RecordingSound {
        pub played: Mutex<Vec<Option<PathBuf>>>,
    }

    impl SoundPlayer for RecordingSound {
        fn play(&self, path: Option<&Path>) {
            self.played.lock().unwrap().push(path.map(Path::to_path_buf));
        }
    }
}
