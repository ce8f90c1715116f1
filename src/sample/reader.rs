use std::path::Path;

use super::sample_struct::Sample;
use crate::error::{BoostError, Result};

/// A builder that reads a CSV/SVMLight format file to [`Sample`].
/// Other formats are not supported yet.
///
/// # Example
/// ```no_run
/// use rusboost::SampleReader;
/// let filename = "/path/to/csv/file.csv";
/// let sample = SampleReader::default()
///     .file(filename)
///     .has_header(true)
///     .target_feature("class")
///     .read()
///     .unwrap();
/// ```
pub struct SampleReader<P, S> {
    file: Option<P>,
    has_header: bool,
    target: Option<S>,
}

impl<P, S> Default for SampleReader<P, S> {
    fn default() -> Self {
        Self { file: None, has_header: false, target: None, }
    }
}

impl<P, S> SampleReader<P, S> {
    /// Set the flag whether the file has the header row or not.
    /// Default is `false.`
    pub fn has_header(mut self, flag: bool) -> Self {
        self.has_header = flag;
        self
    }
}

impl<P, S> SampleReader<P, S>
    where P: AsRef<Path>
{
    /// Set the file name.
    pub fn file(mut self, file: P) -> Self {
        self.file = Some(file);
        self
    }
}

impl<P, S> SampleReader<P, S>
    where S: AsRef<str>
{
    /// Set the column name that is used for the class label.
    /// Only CSV files need this.
    pub fn target_feature(mut self, column: S) -> Self {
        self.target = Some(column);
        self
    }
}

impl<P, S> SampleReader<P, S>
    where P: AsRef<Path>,
          S: AsRef<str>
{
    /// Reads the file based on the arguments.
    /// A file with the `.csv` extension is read as CSV,
    /// anything else as SVMLight.
    pub fn read(self) -> Result<Sample> {
        let file = self.file
            .ok_or_else(|| BoostError::parameter(
                "file", "the file name for csv/svmlight is not set"
            ))?;
        let file = file.as_ref();

        if file.extension().is_some_and(|ext| ext == "csv") {
            let target = self.target
                .ok_or_else(|| BoostError::parameter(
                    "target_feature",
                    "target (class) column is not specified. \
                    Use `SampleReader::target_feature`"
                ))?;
            Sample::from_csv(file, self.has_header)?
                .set_target(target.as_ref())
        } else {
            Sample::from_svmlight(file)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_read_svmlight() {
        let path = std::env::temp_dir()
            .join(format!("rusboost-reader-{}.svm", std::process::id()));
        fs::write(&path, "1 0:0.5 2:1.5\n0 1:2.0\n2 0:-1.0\n").unwrap();

        let sample = SampleReader::<_, &str>::default()
            .file(&path)
            .read()
            .unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(sample.shape(), (3, 3));
        assert_eq!(sample.labels(), vec![1, 0, 2]);
        assert_eq!(sample["Feat. [3]"][0], 1.5);
        assert_eq!(sample["Feat. [1]"][1], 0.0);
    }

    #[test]
    fn test_read_csv_requires_target() {
        let result = SampleReader::<_, &str>::default()
            .file("/nonexistent/train.csv")
            .has_header(true)
            .read();
        assert!(
            matches!(result, Err(BoostError::Parameter { name: "target_feature", .. })),
            "got {result:?}"
        );
    }
}
