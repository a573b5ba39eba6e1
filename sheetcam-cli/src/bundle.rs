//! Zip bundle of per-sheet programs.

use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use anyhow::{Context, Result};
use sheetcam_core::SheetProgram;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Write every program into a zip archive, one entry per file name.
pub fn write_bundle<W: Write + Seek>(programs: &[SheetProgram], writer: W) -> Result<W> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .compression_level(Some(6));

    for program in programs {
        zip.start_file(program.filename.as_str(), options)
            .with_context(|| format!("Failed to add {} to bundle", program.filename))?;
        zip.write_all(program.code.as_bytes())?;
    }
    Ok(zip.finish()?)
}

/// Write the bundle to a file.
pub fn save_bundle(programs: &[SheetProgram], path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_bundle(programs, file)?;
    Ok(())
}
