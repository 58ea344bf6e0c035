use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Persist subdomains one per line, truncating any existing file.
pub fn write_subdomains(path: &Path, subdomains: &[String]) -> anyhow::Result<()> {
    let f = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    for sub in subdomains {
        w.write_all(sub.as_bytes())?;
        w.write_all(b"\n")?;
    }
    w.flush().with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}
