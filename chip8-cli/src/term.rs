//! Terminal presentation.
use std::io::{self, Write};

use chip8_vm::{
    constants::{DISPLAY_BUFFER_SIZE, DISPLAY_HEIGHT},
    display::write_buffer,
    prelude::*,
};

/// Prints frames to a writer as rows of `#` and `.` characters.
pub struct TerminalDevices<W: Write> {
    out: W,
    render_every: u64,
    frames: u64,
    buzzing: bool,
}

impl<W: Write> TerminalDevices<W> {
    pub fn new(out: W, render_every: u64) -> Self {
        Self {
            out,
            render_every,
            frames: 0,
            buzzing: false,
        }
    }

    /// Number of frames the VM has presented.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn is_buzzing(&self) -> bool {
        self.buzzing
    }

    pub fn write_frame(&mut self, buffer: &DisplayBuffer) -> io::Result<()> {
        let mut text = String::with_capacity(DISPLAY_BUFFER_SIZE + DISPLAY_HEIGHT);
        write_buffer(buffer, &mut text)
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "failed to render frame"))?;
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Devices for TerminalDevices<W> {
    fn draw(&mut self, buffer: &DisplayBuffer) {
        self.frames += 1;

        if self.render_every > 0 && self.frames % self.render_every == 0 {
            if let Err(err) = self.write_frame(buffer) {
                log::warn!("failed to write frame {}: {err}", self.frames);
            }
        }
    }

    fn buzz(&mut self, buzzing: bool) {
        self.buzzing = buzzing;
        if buzzing {
            log::info!("buzzer on");
        } else {
            log::info!("buzzer off");
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chip8_vm::constants::DISPLAY_WIDTH;

    #[test]
    fn test_render_every() {
        let mut devices = TerminalDevices::new(Vec::new(), 2);
        let mut buffer = [false; DISPLAY_BUFFER_SIZE];
        buffer[0] = true;

        devices.draw(&buffer);
        assert!(devices.out.is_empty());
        devices.draw(&buffer);

        let text = String::from_utf8(devices.into_inner()).unwrap();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), DISPLAY_HEIGHT);
        assert!(rows[0].starts_with("#."));
        assert_eq!(rows[0].len(), DISPLAY_WIDTH);
    }

    #[test]
    fn test_buzz_state() {
        let mut devices = TerminalDevices::new(io::sink(), 0);
        devices.buzz(true);
        assert!(devices.is_buzzing());
        devices.buzz(false);
        assert!(!devices.is_buzzing());
    }
}
