//! ShopBot program generation.
//!
//! Turns an ordered toolpath list into one `.sbp` part file:
//!
//! 1. Header: unit banner, metadata comments, unit guard, absolute mode.
//! 2. Tool select, spindle on, spindle speed, warm-up pause.
//! 3. Per toolpath: speed changes (only when they differ from the last ones
//!    written), retract and jog to the start, then one `M3` per vertex per pass.
//! 4. Footer: retract, park, spindle off, `END` and the `UNIT_ERROR` target.
//!
//! Emission is strictly sequential because speed deduplication depends on
//! the order toolpaths are written in.

mod sbp;

pub use sbp::{format_coord, SbpWriter};

use tracing::debug;

use crate::config::PostProcessorConfig;
use crate::error::{CamError, Result};
use crate::model::{MachiningSettings, StockMaterial, Toolpath};

// Custom-cut numbers of the stock ShopBot macro set. `C9` (tool select and
// spindle start) is written before `C6` (spindle on), which follows `TR`.

/// `C6`: spindle on.
const SPINDLE_ON: u32 = 6;
/// `C7`: spindle off.
const SPINDLE_OFF: u32 = 7;
/// `C9`: tool select / spindle start macro.
const TOOL_CHANGE: u32 = 9;

/// Inputs to one program besides the toolpaths themselves.
#[derive(Debug, Clone, Copy)]
pub struct ProgramContext<'a> {
    pub post: &'a PostProcessorConfig,
    /// Settings for toolpaths that carry none; also used for the header.
    /// `None` means no operation was supplied.
    pub fallback: Option<&'a MachiningSettings>,
    /// Sheet the program cuts, for header metadata.
    pub material: Option<&'a StockMaterial>,
}

/// Generate a complete ShopBot program.
///
/// Fails with [`CamError::NoOperations`] when no fallback settings are given.
pub fn generate_sbp(toolpaths: &[Toolpath], ctx: &ProgramContext<'_>) -> Result<String> {
    let fallback = ctx.fallback.ok_or(CamError::NoOperations)?;
    let post = ctx.post;
    let mut w = SbpWriter::new(post.unit);

    write_header(&mut w, ctx, fallback);

    w.select_tool(post.tool_number);
    w.custom_cut(TOOL_CHANGE);
    w.spindle_speed(fallback.spindle_speed);
    w.custom_cut(SPINDLE_ON);
    w.pause(post.warmup_pause);
    w.write_blank();

    for toolpath in toolpaths {
        write_toolpath(&mut w, toolpath, fallback, post.safe_z);
    }

    write_footer(&mut w, post);

    debug!("Wrote program with {} toolpaths", toolpaths.len());
    Ok(w.take_output())
}

fn write_header(w: &mut SbpWriter, ctx: &ProgramContext<'_>, fallback: &MachiningSettings) {
    w.unit_header();
    w.write_comment("GENERATED BY sheetcam");
    w.write_comment(&format!("MACHINE:{}", ctx.post.machine_name));
    if let Some(m) = ctx.material {
        if m.label.is_empty() {
            w.write_comment(&format!("MATERIAL:{}", m.material_id));
        } else {
            w.write_comment(&format!("MATERIAL:{} {}", m.material_id, m.label));
        }
        w.write_comment(&format!(
            "SHEET_SIZE:{}x{}",
            format_coord(m.width),
            format_coord(m.depth)
        ));
        w.write_metadata("MATERIAL_THICKNESS", m.thickness);
    }
    w.write_metadata("MILL_SIZE", fallback.tool.diameter);
    w.unit_guard();
    w.absolute_mode();
    w.write_blank();
}

fn write_toolpath(w: &mut SbpWriter, toolpath: &Toolpath, fallback: &MachiningSettings, safe_z: f64) {
    let settings = toolpath.settings.as_ref().unwrap_or(fallback);
    let Some(start) = toolpath.start_point() else {
        return;
    };

    w.write_comment(&format!("Operation {}", toolpath.operation_id));
    w.spindle_speed(settings.spindle_speed);
    w.move_speed(settings.feed_rate.xy, settings.feed_rate.z);
    w.jog_speed(settings.jog_speed);
    w.jog_z(safe_z);
    w.jog_xy(start.x, start.y);

    for pass in &toolpath.passes {
        for (i, p) in pass.path.iter().enumerate() {
            w.cut(p.x, p.y, pass.z_at(i));
        }
        // Drill pecks retract between plunges.
        if pass.path.len() == 1 {
            w.jog_z(safe_z);
        }
    }
    w.write_blank();
}

fn write_footer(w: &mut SbpWriter, post: &PostProcessorConfig) {
    w.jog_z(post.safe_z);
    w.jog_xy(post.home_position[0], post.home_position[1]);
    w.custom_cut(SPINDLE_OFF);
    w.write_raw("END");
    w.write_blank();
    w.write_label("UNIT_ERROR");
    w.write_comment(&format!(
        "Program is written in {}; switch the controller unit and run again",
        post.unit
    ));
    w.write_raw("END");
}
