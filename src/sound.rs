use std::{fmt::Debug, time::Duration};

use rodio::{OutputStream, OutputStreamBuilder, Sink, Source, source::SineWave};

/// The pitch of the beep tone
const TONE_HZ: f32 = 440.0;

/// Cross-platform audio wrapper for CHIP-8 beeps
///
/// The machine hands out tone durations; the speaker plays a sine wave for
/// exactly that long and lets it run out on its own.
pub struct Speaker {
    /// This must be held as long as [`Self::sink`] lives
    _stream: OutputStream,
    /// The audio stream used for playing beeps
    sink: Sink,
}

impl Debug for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Speaker").finish()
    }
}

impl Speaker {
    /// Attempts to open the default audio device and attach an empty sink
    pub fn new() -> Option<Self> {
        match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream_handle) => {
                // dont log warnings on exit if in release mode
                if !cfg!(debug_assertions) {
                    stream_handle.log_on_drop(false);
                }

                let sink = Sink::connect_new(stream_handle.mixer());

                Some(Self {
                    _stream: stream_handle,
                    sink,
                })
            }
            Err(e) => {
                log::error!("audio error when opening stream: {:?}", e);
                None
            }
        }
    }

    /// Plays the beep tone for the given duration.
    ///
    /// A tone requested while one is still playing replaces it rather than
    /// queueing behind it.
    pub fn play_for(&mut self, duration: Duration) {
        log::debug!("Playing tone for {:?}", duration);

        let source = SineWave::new(TONE_HZ)
            .take_duration(duration)
            .amplify(0.20);

        self.sink.clear();
        self.sink.append(source);
        self.sink.play();
    }
}
