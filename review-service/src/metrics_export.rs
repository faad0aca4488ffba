use std::{fs, path::Path};

use anyhow::Context;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROM_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Installs the Prometheus recorder. Report runs are short-lived, so instead of
/// serving `/metrics` the rendered exposition is dropped into a
/// textfile-collector directory with [`write_textfile`].
///
/// A process has one global recorder; later calls keep the first handle.
pub fn init() -> anyhow::Result<()> {
    PROM_HANDLE.get_or_try_init(|| {
        PrometheusBuilder::new()
            .install_recorder()
            .context("failed to install Prometheus metrics recorder")
    })?;
    Ok(())
}

/// Writes the current exposition to `path` via a temp file and rename, so the
/// collector never reads a half-written file.
pub fn write_textfile(path: &Path) -> anyhow::Result<()> {
    let Some(handle) = PROM_HANDLE.get() else {
        tracing::warn!("metrics recorder not initialized, skipping textfile export");
        return Ok(());
    };

    let tmp = path.with_extension("prom.tmp");
    fs::write(&tmp, handle.render()).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("renaming {} to {}", tmp.display(), path.display()))?;

    tracing::debug!(path = %path.display(), "metrics textfile written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textfile_contains_recorded_counters() {
        init().unwrap();
        init().unwrap();

        metrics::counter!("review_reports_total", "report" => "textfile-export").increment(1);

        let dir = std::env::temp_dir().join(format!("review-metrics-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("review.prom");

        write_textfile(&path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        assert!(
            text.contains(r#"review_reports_total{report="textfile-export"} 1"#),
            "exposition was:\n{text}"
        );
        assert!(!path.with_extension("prom.tmp").exists());
    }
}
