//! The `install` step: copy `build/lib` into a target directory and record it.

use serde::Serialize;
use std::path::Path;

use crate::dist_info::{self, RecordEntry};
use crate::error::Result;
use crate::metadata::PackageMetadata;
use crate::utils::io;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallOutput {
    pub target: String,
    pub dist_info: String,
    pub files: Vec<String>,
}

pub fn install(
    build_lib: &Path,
    target: &Path,
    metadata: &PackageMetadata,
    packages: &[String],
) -> Result<InstallOutput> {
    io::ensure_dir(target, "create install target")?;

    let mut record = Vec::new();
    let mut installed = Vec::new();

    for (rel, abs) in dist_info::collect_files(build_lib)? {
        let bytes = io::read_bytes(&abs, "read built module")?;
        io::copy_file(&abs, &target.join(&rel), "install module")?;
        record.push(RecordEntry::for_bytes(rel.clone(), &bytes));
        installed.push(rel);
    }

    let dist_info_dir = metadata.dist_info_dir();
    let info_path = target.join(&dist_info_dir);
    io::ensure_dir(&info_path, "create dist-info")?;

    let documents = [
        ("METADATA", metadata.render()),
        ("INSTALLER", format!("{}\n", dist_info::INSTALLER)),
        ("top_level.txt", dist_info::render_top_level(packages)),
    ];
    for (name, content) in &documents {
        io::write_file(&info_path.join(name), content, "write dist-info")?;
        record.push(RecordEntry::for_bytes(
            format!("{}/{}", dist_info_dir, name),
            content.as_bytes(),
        ));
    }

    record.push(RecordEntry::unhashed(format!("{}/RECORD", dist_info_dir)));
    io::write_file(
        &info_path.join("RECORD"),
        &dist_info::render_record(&record),
        "write RECORD",
    )?;

    crate::log_status!(
        "install",
        "Installed {} file(s) into {}",
        installed.len(),
        target.display()
    );

    Ok(InstallOutput {
        target: target.display().to_string(),
        dist_info: info_path.display().to_string(),
        files: installed,
    })
}
