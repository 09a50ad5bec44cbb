//! The `bdist_wheel` step: archive `build/lib` into a `py3-none-any` wheel.

use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::dist_info::{self, RecordEntry};
use crate::error::{Error, Result};
use crate::metadata::PackageMetadata;
use crate::utils::io;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WheelOutput {
    pub path: String,
    pub file_name: String,
    pub file_count: usize,
}

fn zip_error(path: &Path, err: zip::result::ZipError) -> Error {
    Error::internal_io(err.to_string(), Some(format!("write {}", path.display())))
}

pub fn bdist_wheel(
    build_lib: &Path,
    dist_dir: &Path,
    metadata: &PackageMetadata,
    packages: &[String],
) -> Result<WheelOutput> {
    io::ensure_dir(dist_dir, "create dist directory")?;

    let file_name = metadata.wheel_file_name();
    let wheel_path = dist_dir.join(&file_name);
    let dist_info_dir = metadata.dist_info_dir();

    let file = File::create(&wheel_path).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("create {}", wheel_path.display())))
    })?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut record = Vec::new();
    let mut add = |zip: &mut ZipWriter<File>, name: String, bytes: &[u8]| -> Result<()> {
        zip.start_file(name.as_str(), options)
            .map_err(|e| zip_error(&wheel_path, e))?;
        zip.write_all(bytes).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("write {}", wheel_path.display())))
        })?;
        record.push(RecordEntry::for_bytes(name, bytes));
        Ok(())
    };

    let files = dist_info::collect_files(build_lib)?;
    for (rel, abs) in &files {
        let bytes = io::read_bytes(abs, "read built module")?;
        add(&mut zip, rel.clone(), &bytes)?;
    }

    add(
        &mut zip,
        format!("{}/METADATA", dist_info_dir),
        metadata.render().as_bytes(),
    )?;
    add(
        &mut zip,
        format!("{}/WHEEL", dist_info_dir),
        dist_info::render_wheel().as_bytes(),
    )?;
    add(
        &mut zip,
        format!("{}/top_level.txt", dist_info_dir),
        dist_info::render_top_level(packages).as_bytes(),
    )?;

    let record_name = format!("{}/RECORD", dist_info_dir);
    record.push(RecordEntry::unhashed(record_name.clone()));
    zip.start_file(record_name.as_str(), options)
        .map_err(|e| zip_error(&wheel_path, e))?;
    zip.write_all(dist_info::render_record(&record).as_bytes())
        .map_err(|e| Error::internal_io(e.to_string(), Some("write RECORD".to_string())))?;
    zip.finish().map_err(|e| zip_error(&wheel_path, e))?;

    crate::log_status!("bdist_wheel", "Wrote {}", wheel_path.display());

    Ok(WheelOutput {
        path: wheel_path.display().to_string(),
        file_name,
        file_count: files.len(),
    })
}
