//! ShopBot part-file command emission.

use std::fmt::Write;

use crate::config::Unit;
use crate::geometry::round4;

/// ShopBot command writer.
///
/// Takes values in millimeters and converts them to the program unit on
/// output. Speed commands are only written when they differ from the last
/// speed of the same kind written to this program.
pub struct SbpWriter {
    /// Output buffer.
    buffer: String,
    unit: Unit,
    last_move_speed: Option<String>,
    last_jog_speed: Option<String>,
    last_spindle: Option<String>,
}

impl SbpWriter {
    /// Create a writer for a program in `unit`.
    pub fn new(unit: Unit) -> Self {
        Self {
            buffer: String::new(),
            unit,
            last_move_speed: None,
            last_jog_speed: None,
            last_spindle: None,
        }
    }

    /// Get the generated program.
    pub fn output(&self) -> &str {
        &self.buffer
    }

    /// Take the generated program.
    pub fn take_output(self) -> String {
        self.buffer
    }

    /// Millimeter value in program units, formatted.
    fn value(&self, mm: f64) -> String {
        format_coord(mm / self.unit.from_mm_factor())
    }

    /// Write a line verbatim.
    pub fn write_raw(&mut self, content: &str) {
        writeln!(self.buffer, "{}", content).unwrap();
    }

    /// Write an empty line.
    pub fn write_blank(&mut self) {
        writeln!(self.buffer).unwrap();
    }

    /// Write a comment line.
    pub fn write_comment(&mut self, comment: &str) {
        writeln!(self.buffer, "'{}", comment).unwrap();
    }

    /// Write a `'KEY:value` metadata comment with a length value.
    pub fn write_metadata(&mut self, key: &str, mm: f64) {
        let value = self.value(mm);
        writeln!(self.buffer, "'{}:{}", key, value).unwrap();
    }

    /// Write a label.
    pub fn write_label(&mut self, label: &str) {
        writeln!(self.buffer, "{}:", label).unwrap();
    }

    // === Setup ===

    /// First line naming the program unit.
    pub fn unit_header(&mut self) {
        self.write_raw(self.unit.header());
    }

    /// Jump to `UNIT_ERROR` when the controller is set to the other unit.
    pub fn unit_guard(&mut self) {
        self.write_raw(self.unit.guard());
    }

    /// Absolute positioning (SA).
    pub fn absolute_mode(&mut self) {
        self.write_raw("SA");
    }

    /// Select a tool.
    pub fn select_tool(&mut self, number: u32) {
        writeln!(self.buffer, "&Tool = {}", number).unwrap();
    }

    /// Call a numbered custom cut (C6, C7, C9).
    pub fn custom_cut(&mut self, number: u32) {
        writeln!(self.buffer, "C{}", number).unwrap();
    }

    /// Pause for a number of seconds.
    pub fn pause(&mut self, seconds: u32) {
        writeln!(self.buffer, "PAUSE {}", seconds).unwrap();
    }

    // === Speeds ===

    /// Spindle speed (TR) in RPM.
    ///
    /// Returns whether a line was written.
    pub fn spindle_speed(&mut self, rpm: u32) -> bool {
        let line = format!("TR,{}", rpm);
        if self.last_spindle.as_deref() == Some(line.as_str()) {
            return false;
        }
        self.write_raw(&line);
        self.last_spindle = Some(line);
        true
    }

    /// Cutting speeds (MS) for XY and Z.
    ///
    /// Returns whether a line was written.
    pub fn move_speed(&mut self, xy: f64, z: f64) -> bool {
        let line = format!("MS,{},{}", self.value(xy), self.value(z));
        if self.last_move_speed.as_deref() == Some(line.as_str()) {
            return false;
        }
        self.write_raw(&line);
        self.last_move_speed = Some(line);
        true
    }

    /// Jog speed (JS).
    ///
    /// Returns whether a line was written.
    pub fn jog_speed(&mut self, speed: f64) -> bool {
        let line = format!("JS,{}", self.value(speed));
        if self.last_jog_speed.as_deref() == Some(line.as_str()) {
            return false;
        }
        self.write_raw(&line);
        self.last_jog_speed = Some(line);
        true
    }

    // === Movement ===

    /// Rapid Z move (JZ).
    pub fn jog_z(&mut self, z: f64) {
        let line = format!("JZ,{}", self.value(z));
        self.write_raw(&line);
    }

    /// Rapid XY move (J2).
    pub fn jog_xy(&mut self, x: f64, y: f64) {
        let line = format!("J2,{},{}", self.value(x), self.value(y));
        self.write_raw(&line);
    }

    /// Cutting move in three axes (M3).
    pub fn cut(&mut self, x: f64, y: f64, z: f64) {
        let line = format!("M3,{},{},{}", self.value(x), self.value(y), self.value(z));
        self.write_raw(&line);
    }
}

/// Format a value for a ShopBot file.
///
/// Rounds to four decimals and prints the shortest form, keeping a trailing
/// `.0` on whole numbers.
pub fn format_coord(value: f64) -> String {
    format!("{:?}", round4(value))
}
