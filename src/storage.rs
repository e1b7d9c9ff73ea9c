//! Waveform export with clean feature flag handling.

#[cfg(feature = "storage_csv")]
mod csv_enabled {
    use std::path::Path;

    use crate::error::ScopeResult;
    use crate::waveform::Waveform;

    /// Write a waveform to a CSV file: a `time,amplitude` header followed
    /// by one row per sample.
    pub fn write_waveform_csv(path: &Path, waveform: &Waveform) -> ScopeResult<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["time", "amplitude"])?;
        for (t, v) in waveform.time.iter().zip(&waveform.amplitude) {
            writer.write_record([t.to_string(), v.to_string()])?;
        }
        writer.flush()?;
        log::info!(
            "Waveform ({} samples) written to '{}'",
            waveform.len(),
            path.display()
        );
        Ok(())
    }
}

#[cfg(feature = "storage_csv")]
pub use csv_enabled::write_waveform_csv;

/// Stub when CSV support is compiled out.
#[cfg(not(feature = "storage_csv"))]
pub fn write_waveform_csv(
    _path: &std::path::Path,
    _waveform: &crate::waveform::Waveform,
) -> crate::error::ScopeResult<()> {
    Err(crate::error::ScopeError::FeatureNotEnabled(
        "storage_csv".to_string(),
    ))
}

#[cfg(all(test, feature = "storage_csv"))]
mod tests {
    use super::*;
    use crate::waveform::{TimeUnit, Waveform};

    #[test]
    fn test_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waveform.csv");
        let waveform = Waveform {
            time: vec![0.0, 0.5, 1.0],
            amplitude: vec![0.1, -0.2, 0.3],
            unit: TimeUnit::Milliseconds,
        };
        write_waveform_csv(&path, &waveform).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[1][0], "0.5");
        assert_eq!(&rows[1][1], "-0.2");
    }

    #[test]
    fn test_csv_empty_waveform() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        let waveform = Waveform {
            time: Vec::new(),
            amplitude: Vec::new(),
            unit: TimeUnit::Seconds,
        };
        write_waveform_csv(&path, &waveform).unwrap();
        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.records().count(), 0);
    }
}
