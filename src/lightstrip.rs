use std::sync::{Arc, Mutex};

use crate::color::Color;

/// The device boundary: set all pixels to one color, then flush the frame
/// out to the hardware. Flushing may fail; setting pixels may not.
pub trait LightStrip: Send {
    fn fill(&mut self, color: Color);
    fn update(&mut self) -> Result<(), String>;
}

/// Handle to the one strip of the process. Animations clone this into
/// their thread and lock per write; exclusive use is guaranteed by the
/// scheduler, not by this lock.
#[derive(Clone)]
pub struct SharedStrip {
    strip: Arc<Mutex<Box<dyn LightStrip>>>,
}

impl SharedStrip {
    pub fn new(strip: Box<dyn LightStrip>) -> SharedStrip {
        SharedStrip {
            strip: Arc::new(Mutex::new(strip)),
        }
    }

    pub fn fill(&self, color: Color) {
        self.strip.lock().unwrap().fill(color);
    }

    pub fn update(&self) -> Result<(), String> {
        self.strip.lock().unwrap().update()
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    use super::{LightStrip, SharedStrip};
    use crate::color::Color;

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum Write {
        Fill(Color),
        Update,
    }

    #[derive(Debug, Clone, Copy)]
    pub struct Event {
        pub at: Instant,
        pub write: Write,
    }

    /// Shared view on everything a mock strip has been asked to do.
    #[derive(Clone)]
    pub struct Recording {
        events: Arc<Mutex<Vec<Event>>>,
    }

    impl Recording {
        pub fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }

        pub fn fills(&self) -> Vec<Color> {
            self.events()
                .iter()
                .filter_map(|event| match event.write {
                    Write::Fill(color) => Some(color),
                    Write::Update => None,
                })
                .collect()
        }

        pub fn len(&self) -> usize {
            self.events.lock().unwrap().len()
        }
    }

    pub struct MockStrip {
        recording: Recording,
    }

    impl MockStrip {
        pub fn new() -> (MockStrip, Recording) {
            let recording = Recording {
                events: Arc::new(Mutex::new(Vec::new())),
            };
            (
                MockStrip {
                    recording: recording.clone(),
                },
                recording,
            )
        }

        pub fn shared() -> (SharedStrip, Recording) {
            let (strip, recording) = MockStrip::new();
            (SharedStrip::new(Box::new(strip)), recording)
        }

        fn record(&self, write: Write) {
            self.recording.events.lock().unwrap().push(Event {
                at: Instant::now(),
                write,
            });
        }
    }

    impl LightStrip for MockStrip {
        fn fill(&mut self, color: Color) {
            self.record(Write::Fill(color));
        }

        fn update(&mut self) -> Result<(), String> {
            self.record(Write::Update);
            Ok(())
        }
    }

    /// A strip whose flush always fails, for exercising the error path.
    pub struct FailingStrip;

    impl LightStrip for FailingStrip {
        fn fill(&mut self, _: Color) {}

        fn update(&mut self) -> Result<(), String> {
            Err("strip unreachable".to_string())
        }
    }
}
