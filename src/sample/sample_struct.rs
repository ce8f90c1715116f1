use std::path::Path;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::collections::{BTreeMap, HashMap};
use std::ops::Index;
use std::mem;

use polars::prelude::*;
use rayon::prelude::*;

use super::feature::*;
use crate::error::{BoostError, Result};

/// A batch of training (or test) examples.
/// Features are stored column-wise and the target holds integral
/// class labels encoded as `f64`.
#[derive(Debug, Clone)]
pub struct Sample {
    pub(super) name_to_index: HashMap<String, usize>,
    pub(super) features: Vec<Feature>,
    pub(super) target: Vec<f64>,
    pub(super) n_sample: usize,
    pub(super) n_feature: usize,
}

impl Sample {
    /// Construct a sample from dense columns `(name, values)`
    /// and the target labels.
    pub fn from_columns<S, T>(columns: T, target: Vec<f64>) -> Result<Self>
        where S: ToString,
              T: IntoIterator<Item = (S, Vec<f64>)>,
    {
        let n_sample = target.len();
        let features = columns.into_iter()
            .map(|(name, vals)| Feature::Dense { name: name.to_string(), vals })
            .collect::<Vec<_>>();

        if let Some(feat) = features.iter()
            .find(|feat| feat.len() != n_sample)
        {
            return Err(BoostError::sample(format!(
                "column `{}` does not have {n_sample} rows",
                feat.name()
            )));
        }

        let n_feature = features.len();
        let name_to_index = index_by_name(&features);
        Ok(Self { name_to_index, features, target, n_sample, n_feature, })
    }

    /// Convert a `polars::DataFrame` into [`Sample`].
    /// The column named `target` becomes the class label.
    pub fn from_dataframe(data: &DataFrame, target: &str) -> Result<Self> {
        let n_sample = data.height();
        let mut features = data.get_columns()
            .par_iter()
            .map(Feature::from_series)
            .collect::<Result<Vec<_>>>()?;

        let pos = features.iter()
            .position(|feat| feat.name() == target)
            .ok_or_else(|| BoostError::sample(
                format!("the target column `{target}` does not exist")
            ))?;
        let target = features.remove(pos).into_vals();

        let n_feature = features.len();
        let name_to_index = index_by_name(&features);
        Ok(Self { name_to_index, features, target, n_sample, n_feature, })
    }

    /// Read a CSV format file to [`Sample`] type.
    /// This method returns `Err` if the file does not exist.
    ///
    /// If the CSV file does not have a header row,
    /// this method assigns a default name for each column:
    /// `Feat. [1]`, `Feat. [2]`, ..., `Feat. [n]`.
    ///
    /// **Do not forget** to call [`Sample::set_target`] to
    /// assign the class label.
    pub fn from_csv<P>(file: P, has_header: bool) -> Result<Self>
        where P: AsRef<Path>,
    {
        let file = File::open(file)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader, has_header)
    }

    /// Read a CSV from [`BufReader`].
    pub fn from_reader<R>(reader: BufReader<R>, has_header: bool)
        -> Result<Self>
        where R: Read,
    {
        let mut lines = reader.lines();

        let mut features = Vec::new();
        if has_header {
            let line = lines.next()
                .ok_or_else(|| BoostError::sample("the header row is missing"))??;
            features = line.split(',')
                .map(|name| Feature::dense(name.trim()))
                .collect::<Vec<_>>();
        }
        let mut n_sample = 0_usize;

        for (i, line) in lines.enumerate() {
            let line = line?;
            if line.trim().is_empty() { continue; }

            let xs = line.split(',')
                .map(|x| parse_value(x, i))
                .collect::<Result<Vec<f64>>>()?;

            // Without a header, the first row fixes the column names.
            if features.is_empty() {
                features = (1..=xs.len())
                    .map(|k| Feature::dense(format!("Feat. [{k}]")))
                    .collect();
            }

            if xs.len() != features.len() {
                return Err(BoostError::sample(format!(
                    "line {i} has {} values, expected {}",
                    xs.len(), features.len()
                )));
            }

            features.iter_mut()
                .zip(xs)
                .for_each(|(feat, x)| feat.append((n_sample, x)));
            n_sample += 1;
        }

        let n_feature = features.len();
        let target = Vec::with_capacity(0);
        let name_to_index = index_by_name(&features);

        Ok(Self { name_to_index, features, target, n_sample, n_feature, })
    }

    /// Read a SVMLight format file to `Sample`.
    ///
    /// Each line of SVMLight format file has the following form:
    /// ```txt
    /// y index:value index:value
    /// ```
    /// where `y` is the class label,
    /// `index` is the feature index, and `value` is the value
    /// at the feature.
    pub fn from_svmlight<P: AsRef<Path>>(file: P) -> Result<Self> {
        let mut features = Vec::new();
        let mut target = Vec::new();
        let mut n_sample = 0_usize;

        let file = File::open(file)?;
        let lines = BufReader::new(file).lines();

        for (line_no, line) in lines.enumerate() {
            let line = line?;
            let mut words = line.split_whitespace();
            let Some(y) = words.next() else { continue; };
            target.push(parse_value(y, line_no)?);

            for word in words {
                let (i, x) = index_and_feature(word, line_no)?;

                while features.len() <= i {
                    let k = features.len() + 1;
                    let name = format!("Feat. [{k}]");
                    features.push(Feature::sparse(name, 0));
                }

                features[i].append((n_sample, x));
            }
            n_sample += 1;
        }

        features.iter_mut()
            .for_each(|feat| { feat.set_size(n_sample); });

        let n_feature = features.len();
        let name_to_index = index_by_name(&features);
        let mut sample = Self {
            name_to_index, features, target, n_sample, n_feature,
        };

        sample.remove_allzero_features();

        Ok(sample)
    }

    /// Removes the empty features in `self.features`.
    fn remove_allzero_features(&mut self) {
        let features = mem::take(&mut self.features);
        self.features = features.into_iter()
            .filter(|feat| !feat.is_empty())
            .collect();
        self.name_to_index = index_by_name(&self.features);
        self.n_feature = self.features.len();
    }

    /// Returns the slice of target values.
    pub fn target(&self) -> &[f64] {
        &self.target[..]
    }

    /// Returns the target values as integral class labels.
    pub fn labels(&self) -> Vec<i64> {
        self.target.iter()
            .map(|y| *y as i64)
            .collect()
    }

    /// Returns the sorted, distinct class labels.
    pub fn classes(&self) -> Vec<i64> {
        let mut classes = self.labels();
        classes.sort_unstable();
        classes.dedup();
        classes
    }

    /// Returns the number of examples per class label.
    pub fn class_counts(&self) -> BTreeMap<i64, usize> {
        let mut counts = BTreeMap::new();
        for y in self.labels() {
            *counts.entry(y).or_insert(0) += 1;
        }
        counts
    }

    /// Returns a slice of the features.
    pub fn features(&self) -> &[Feature] {
        &self.features[..]
    }

    /// Set the feature of name `target` to `self.target`.
    /// The old value assigned to `self.target` will be dropped.
    pub fn set_target<S: AsRef<str>>(mut self, target: S) -> Result<Self> {
        let target = target.as_ref();
        let pos = self.features.iter()
            .position(|feat| feat.name() == target)
            .ok_or_else(|| BoostError::sample(
                format!("the target column `{target}` does not exist")
            ))?;

        self.target = self.features.remove(pos).into_vals();
        self.n_feature -= 1;
        self.name_to_index = index_by_name(&self.features);

        Ok(self)
    }

    /// Returns the pair of the number of examples and
    /// the number of features
    pub fn shape(&self) -> (usize, usize) {
        (self.n_sample, self.n_feature)
    }

    /// Set the feature (column) names and returns the old ones.
    pub fn replace_names<S, T>(&mut self, names: T) -> Result<Vec<String>>
        where S: ToString,
              T: AsRef<[S]>,
    {
        let names = names.as_ref();
        if names.len() != self.n_feature {
            return Err(BoostError::sample(format!(
                "got {} names for {} features",
                names.len(), self.n_feature
            )));
        }

        let old_names = names.iter()
            .zip(&mut self.features[..])
            .map(|(name, feature)| feature.replace_name(name.to_string()))
            .collect();
        self.name_to_index = index_by_name(&self.features);
        Ok(old_names)
    }

    /// Returns the `idx`-th instance `(x, y)`.
    pub fn at(&self, idx: usize) -> (Vec<f64>, f64) {
        let x = self.features.iter()
            .map(|feat| feat[idx])
            .collect::<Vec<f64>>();
        let y = self.target[idx];

        (x, y)
    }

    /// Returns a new sample made of the rows `ix` of `self`,
    /// in the order given. Rows may repeat.
    pub fn subset(&self, ix: &[usize]) -> Self {
        let features = self.features.par_iter()
            .map(|feat| feat.subset(ix))
            .collect::<Vec<_>>();
        let target = ix.iter()
            .map(|&i| self.target[i])
            .collect();

        Self {
            name_to_index: self.name_to_index.clone(),
            features,
            target,
            n_sample: ix.len(),
            n_feature: self.n_feature,
        }
    }

    /// Check whether `self` is a training set for
    /// (possibly multi-class) classification.
    pub fn is_valid_classification_instance(&self) -> Result<()> {
        if self.n_sample == 0 {
            return Err(BoostError::sample("the sample has no examples"));
        }
        if self.n_feature == 0 {
            return Err(BoostError::sample("the sample has no features"));
        }
        if self.target.len() != self.n_sample {
            return Err(BoostError::sample(
                "the target class is not specified. \
                Use `Sample::set_target(\"Column Name\")`"
            ));
        }

        let non_integers = self.target.iter()
            .filter(|yi| !yi.is_finite() || yi.trunc() != **yi)
            .take(5)
            .map(|yi| yi.to_string())
            .collect::<Vec<_>>();
        if !non_integers.is_empty() {
            let line = non_integers.join(", ");
            return Err(BoostError::sample(format!(
                "target values must be integral class labels. \
                Ex. [{line}, ...]"
            )));
        }
        Ok(())
    }
}

fn index_by_name(features: &[Feature]) -> HashMap<String, usize> {
    features.iter()
        .enumerate()
        .map(|(i, f)| (f.name().to_string(), i))
        .collect()
}

fn parse_value(word: &str, line: usize) -> Result<f64> {
    let word = word.trim();
    word.parse::<f64>()
        .map_err(|_| BoostError::sample(format!(
            "non-numerical value `{word}` in line {line}"
        )))
}

/// Parse the following type of `str` to the pair of `(usize, f64)`.
/// `index:value`, where `index: usize` and `value: f64`.
fn index_and_feature(word: &str, line: usize) -> Result<(usize, f64)> {
    let malformed = || BoostError::sample(format!(
        "malformed entry `{word}` in line {line}"
    ));
    let (i, x) = word.split_once(':').ok_or_else(malformed)?;
    let i = i.trim().parse::<usize>().map_err(|_| malformed())?;
    let x = x.trim().parse::<f64>().map_err(|_| malformed())?;

    Ok((i, x))
}

impl<S> Index<S> for Sample
    where S: AsRef<str>
{
    type Output = Feature;

    fn index(&self, name: S) -> &Self::Output {
        let name: &str = name.as_ref();
        let k = self.name_to_index.get(name)
            .unwrap_or_else(|| panic!("the feature `{name}` does not exist"));
        &self.features[*k]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn training_examples(bytes: &[u8], has_header: bool) -> Sample {
        let reader = BufReader::new(bytes);
        Sample::from_reader(reader, has_header)
            .unwrap()
            .set_target("class")
            .unwrap()
    }

    #[test]
    fn test_from_reader_01() {
        let bytes = b"\
            test,dummy,class\n\
            0.1,0.2,1.0\n\
            -8.0,2.0,0.0\n\
            3.0,-9.0,2.0\n\
            -0.001,0.0,0.0";
        let sample = training_examples(bytes, true);
        assert_eq!(sample.shape(), (4, 2));
        assert_eq!(sample.labels(), vec![1, 0, 2, 0]);
        assert_eq!(sample.classes(), vec![0, 1, 2]);
        assert_eq!(sample["dummy"][2], -9.0);
        assert!(sample.is_valid_classification_instance().is_ok());
    }

    #[test]
    fn test_from_reader_without_header() {
        let bytes = b"1.0,2.0\n3.0,4.0\n";
        let sample = Sample::from_reader(BufReader::new(&bytes[..]), false)
            .unwrap()
            .set_target("Feat. [2]")
            .unwrap();
        assert_eq!(sample.shape(), (2, 1));
        assert_eq!(sample.target(), &[2.0, 4.0]);
    }

    #[test]
    fn test_from_reader_rejects_text() {
        let bytes = b"x,class\n1.0,a\n";
        let result = Sample::from_reader(BufReader::new(&bytes[..]), true);
        assert!(matches!(result, Err(BoostError::Sample(_))));
    }

    #[test]
    fn test_missing_target() {
        let bytes = b"x,class\n1.0,0.0\n";
        let result = Sample::from_reader(BufReader::new(&bytes[..]), true)
            .unwrap()
            .set_target("label");
        assert!(matches!(result, Err(BoostError::Sample(_))));
    }

    #[test]
    fn test_non_integral_target() {
        let sample = Sample::from_columns(
            [("x", vec![0.0, 1.0])],
            vec![0.0, 0.5],
        ).unwrap();
        let result = sample.is_valid_classification_instance();
        assert!(matches!(result, Err(BoostError::Sample(_))));
    }

    #[test]
    fn test_subset() {
        let sample = Sample::from_columns(
            [("x", vec![0.0, 1.0, 2.0, 3.0]), ("z", vec![5.0, 6.0, 7.0, 8.0])],
            vec![0.0, 1.0, 1.0, 2.0],
        ).unwrap();
        let sub = sample.subset(&[3, 0, 0]);
        assert_eq!(sub.shape(), (3, 2));
        assert_eq!(sub.target(), &[2.0, 0.0, 0.0]);
        assert_eq!(sub["z"][0], 8.0);
        assert_eq!(sub["x"][2], 0.0);
    }

    #[test]
    fn test_class_counts() {
        let sample = Sample::from_columns(
            [("x", vec![0.0; 6])],
            vec![2.0, 0.0, 2.0, 1.0, 2.0, 0.0],
        ).unwrap();
        let counts = sample.class_counts();
        let expected = BTreeMap::from([(0, 2), (1, 1), (2, 3)]);
        assert_eq!(counts, expected, "got {counts:?}");
    }

    #[test]
    fn test_from_dataframe() {
        let df = df!(
            "x" => &[0.5, 1.5, 2.5],
            "class" => &[0i64, 1, 1],
        ).unwrap();
        let sample = Sample::from_dataframe(&df, "class").unwrap();
        assert_eq!(sample.shape(), (3, 1));
        assert_eq!(sample.labels(), vec![0, 1, 1]);
        assert_eq!(sample["x"][1], 1.5);
    }
}
