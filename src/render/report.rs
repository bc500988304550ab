use crate::domain::model::RecordRejection;
use crate::utils::error::Result;

/// Rejected rows as CSV with a `line,name,reason` header.
pub fn rejections_csv(rejections: &[RecordRejection]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["line", "name", "reason"])?;
    for rejection in rejections {
        writer.write_record([
            rejection.line.to_string(),
            rejection.name.clone(),
            rejection.defect.to_string(),
        ])?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| crate::utils::error::MapError::IoError(e.into_error()))
}
