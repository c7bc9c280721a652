use std::{
    fs::File,
    io::{self, BufWriter, Write as _},
    path::Path,
};

/// Controller buttons understood by Dolphin's pipe input backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    A,
    B,
    X,
    Y,
    Z,
    L,
    R,
    Start,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::A,
        Button::B,
        Button::X,
        Button::Y,
        Button::Z,
        Button::L,
        Button::R,
        Button::Start,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Button::A => "A",
            Button::B => "B",
            Button::X => "X",
            Button::Y => "Y",
            Button::Z => "Z",
            Button::L => "L",
            Button::R => "R",
            Button::Start => "START",
        }
    }
}

/// Analog sticks understood by Dolphin's pipe input backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stick {
    Main,
    C,
}

impl Stick {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Stick::Main => "MAIN",
            Stick::C => "C",
        }
    }
}

/// A controller command could not be delivered to the live process.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
#[display("controller pipe write failed: {_0}")]
pub struct ControllerError(io::Error);

/// Sink for discrete controller commands.
///
/// Commands are observed by the external process in write order. Implemented
/// by [`Pad`] for the live pipe and by recording stubs in tests.
pub trait Controller {
    fn press(&mut self, button: Button) -> Result<(), ControllerError>;
    fn release(&mut self, button: Button) -> Result<(), ControllerError>;
    fn set_stick(&mut self, stick: Stick, x: f32, y: f32) -> Result<(), ControllerError>;

    /// Releases every button and centers both sticks.
    fn reset(&mut self) -> Result<(), ControllerError> {
        for button in Button::ALL {
            self.release(button)?;
        }
        self.set_stick(Stick::Main, 0.5, 0.5)?;
        self.set_stick(Stick::C, 0.5, 0.5)
    }
}

/// Writer for Dolphin's text controller-command pipe.
///
/// Protocol: `PRESS <BTN>`, `RELEASE <BTN>`, `SET <STICK> <x> <y>`, one
/// command per line, flushed immediately so the emulator sees the command on
/// the frame it was issued.
#[derive(Debug)]
pub struct Pad {
    writer: BufWriter<File>,
}

impl Pad {
    /// Opens the command pipe for writing.
    ///
    /// For a FIFO this blocks until the emulator has the read end open, which
    /// is why the pad is opened per generation, after the user has started
    /// Dolphin.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::options().write(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn command(&mut self, line: &str) -> Result<(), ControllerError> {
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl Controller for Pad {
    fn press(&mut self, button: Button) -> Result<(), ControllerError> {
        self.command(&format!("PRESS {}", button.as_str()))
    }

    fn release(&mut self, button: Button) -> Result<(), ControllerError> {
        self.command(&format!("RELEASE {}", button.as_str()))
    }

    fn set_stick(&mut self, stick: Stick, x: f32, y: f32) -> Result<(), ControllerError> {
        self.command(&format!("SET {} {x} {y}", stick.as_str()))
    }
}

impl Drop for Pad {
    fn drop(&mut self) {
        // Leave the virtual controller neutral for the next generation.
        let _ = self.reset();
    }
}
