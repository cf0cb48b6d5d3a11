use std::{
    fs::OpenOptions,
    io::{BufWriter, Write},
    path::Path,
};

use log::info;

use crate::runner::FileResult;

const HEADING: &str = "## AI Front Matter Applied";

pub(crate) fn render_summary(results: &[FileResult]) -> String {
    let lines: Vec<String> = results.iter().map(|r| format!("- {r}")).collect();
    format!("{HEADING}\n\n{}", lines.join("\n"))
}

pub(crate) fn write_summary(summary_path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    if let Some(parent) = summary_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let summary_fd = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(summary_path)?;
    let mut writer = BufWriter::new(summary_fd);
    writer.write_all(render_summary(results).as_bytes())?;
    writer.flush()?;
    info!("Wrote summary of {} file(s) to {summary_path:?}", results.len());

    Ok(())
}
