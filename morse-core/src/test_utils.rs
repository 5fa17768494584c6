//! Test utilities for translator and playback functionality

pub mod timers {
    //! Periodic timer stand-ins driving the playback handler

    use crate::hal::{Duration, HalError, PeriodicTimer};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread::JoinHandle;

    /// Timer fired explicitly by the test, one callback per `fire` step
    #[derive(Debug, Default)]
    pub struct ManualTimer {
        callback: Option<fn()>,
        period: Option<Duration>,
        fired: usize,
    }

    impl ManualTimer {
        pub fn new() -> Self {
            Self::default()
        }

        /// Invoke the callback `periods` times; no-op while stopped
        pub fn fire(&mut self, periods: usize) -> usize {
            let Some(callback) = self.callback else {
                return 0;
            };
            for _ in 0..periods {
                callback();
            }
            self.fired += periods;
            periods
        }

        /// Total callbacks delivered since creation
        pub fn fired(&self) -> usize {
            self.fired
        }

        pub fn period(&self) -> Option<Duration> {
            self.period
        }

        pub fn is_running(&self) -> bool {
            self.callback.is_some()
        }
    }

    impl PeriodicTimer for ManualTimer {
        type Error = HalError;

        fn start(&mut self, period: Duration, callback: fn()) -> Result<(), Self::Error> {
            if period.as_micros() == 0 {
                return Err(HalError::InvalidConfig);
            }
            self.period = Some(period);
            self.callback = Some(callback);
            Ok(())
        }

        fn stop(&mut self) -> Result<(), Self::Error> {
            self.callback = None;
            Ok(())
        }
    }

    /// Wall-clock timer running the callback on a background thread
    #[derive(Debug, Default)]
    pub struct ThreadTimer {
        stop: Arc<AtomicBool>,
        handle: Option<JoinHandle<()>>,
    }

    impl ThreadTimer {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl PeriodicTimer for ThreadTimer {
        type Error = HalError;

        fn start(&mut self, period: Duration, callback: fn()) -> Result<(), Self::Error> {
            if self.handle.is_some() || period.as_micros() == 0 {
                return Err(HalError::InvalidConfig);
            }

            let stop = Arc::new(AtomicBool::new(false));
            let flag = stop.clone();
            let interval = std::time::Duration::from_micros(period.as_micros());

            let handle = std::thread::Builder::new()
                .name("playback-timer".into())
                .spawn(move || {
                    while !flag.load(Ordering::Acquire) {
                        std::thread::sleep(interval);
                        callback();
                    }
                })
                .map_err(|_| HalError::TimerError)?;

            self.stop = stop;
            self.handle = Some(handle);
            Ok(())
        }

        fn stop(&mut self) -> Result<(), Self::Error> {
            self.stop.store(true, Ordering::Release);
            match self.handle.take() {
                Some(handle) => handle.join().map_err(|_| HalError::TimerError),
                None => Ok(()),
            }
        }
    }

    impl Drop for ThreadTimer {
        fn drop(&mut self) {
            let _ = PeriodicTimer::stop(self);
        }
    }
}

pub mod output_capture {
    //! Decoding of recorded actuator output back into patterns and text

    use crate::table;
    use crate::types::TimingConfig;

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    enum Level {
        Tone,
        Indicator,
        Silent,
    }

    /// Split per-period actuator logs into letter patterns.
    ///
    /// Tone runs of `dot_periods` and `dash_periods` become `.` and `-`, any
    /// other tone length becomes `?`. Indicator runs become `/`. A silent run of
    /// at least `letter_gap` periods ends the current letter.
    pub fn patterns(tone_log: &[bool], indicator_log: &[bool], timing: &TimingConfig) -> Vec<String> {
        let levels = tone_log.iter().zip(indicator_log).map(|(&tone, &indicator)| {
            if tone {
                Level::Tone
            } else if indicator {
                Level::Indicator
            } else {
                Level::Silent
            }
        });

        let mut letters = Vec::new();
        let mut current = String::new();
        let mut run: Option<(Level, usize)> = None;

        let close = |level: Level, len: usize, current: &mut String, letters: &mut Vec<String>| {
            match level {
                Level::Tone if len == timing.dot_periods as usize => current.push('.'),
                Level::Tone if len == timing.dash_periods as usize => current.push('-'),
                Level::Tone => current.push('?'),
                Level::Indicator => current.push('/'),
                Level::Silent if len >= timing.letter_gap as usize && !current.is_empty() => {
                    letters.push(core::mem::take(current));
                }
                Level::Silent => {}
            }
        };

        for level in levels {
            run = match run {
                Some((prev, len)) if prev == level => Some((prev, len + 1)),
                Some((prev, len)) => {
                    close(prev, len, &mut current, &mut letters);
                    Some((level, 1))
                }
                None => Some((level, 1)),
            };
        }

        if let Some((prev, len)) = run {
            close(prev, len, &mut current, &mut letters);
        }
        if !current.is_empty() {
            letters.push(current);
        }
        letters
    }

    /// Map patterns back to characters, `?` for unknown patterns
    pub fn text(patterns: &[String]) -> String {
        patterns
            .iter()
            .map(|pattern| {
                table::entries()
                    .iter()
                    .find(|entry| entry.code == pattern.as_str())
                    .map_or('?', |entry| entry.ch as char)
            })
            .collect()
    }

    /// Decode actuator logs straight into text
    pub fn decode(tone_log: &[bool], indicator_log: &[bool], timing: &TimingConfig) -> String {
        text(&patterns(tone_log, indicator_log, timing))
    }
}

pub mod test_scenarios {
    //! Common input texts

    use crate::table;

    pub const SOS: &str = "sos";

    /// Uses every letter once plus word separators
    pub const PANGRAM: &str = "the quick brown fox jumps over the lazy dog";

    /// Typical short exchange including digits and a full stop
    pub const CQ_CALL: &str = "cq cq de n0call k.";

    /// Every character the table can translate, in table order
    pub fn every_mapped_character() -> String {
        table::entries().iter().map(|entry| entry.ch as char).collect()
    }
}
