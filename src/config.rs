
use serde::Deserialize;
use std::{fmt::Display, fs::File, io::BufReader};
use crate::error::{PipelineError, Result};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct JsonTrain {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub rounds: usize,
    pub train_fraction: f64,
    pub seed: Option<u64>
}

impl Default for JsonTrain {
    fn default() -> Self {
        Self {
            n_estimators: 10,
            max_depth: None,
            rounds: 10,
            train_fraction: 0.9,
            seed: None
        }
    }
}

impl Display for JsonTrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "training hyper parameters:
        n_estimators: {},
        max_depth: {:?},
        rounds: {},
        train_fraction: {},
        seed: {:?}",
        self.n_estimators, self.max_depth, self.rounds, self.train_fraction, self.seed
        )
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct JsonTypes {
    pub features_file: String,
    pub truth_file: String,
    pub output_dir: String,
    pub words_file: String,
    pub model_file: String,
    pub num_threads: usize,
    #[serde(flatten)]
    pub json_train: JsonTrain
}

impl Default for JsonTypes {
    fn default() -> Self {
        Self {
            features_file: "data/features.csv".to_owned(),
            truth_file: "data/truth.csv".to_owned(),
            output_dir: "data".to_owned(),
            words_file: "static_data/words_of_interest".to_owned(),
            model_file: "data/forest.bin".to_owned(),
            num_threads: 4,
            json_train: JsonTrain::default()
        }
    }
}

impl Display for JsonTypes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "using hyper-params:
        features_file: {}
        truth_file: {}
        output_dir: {}
        words_file: {}
        model_file: {}
        num_threads: {},
        Using training hyper-params: {}",
        self.features_file, self.truth_file, self.output_dir, self.words_file, self.model_file, self.num_threads, self.json_train)
    }
}

pub struct Config {
    params: JsonTypes
}

impl Config {

    pub fn get_params(&self) -> JsonTypes {
        self.params.clone()
    }

    /// Loads parameters from a json file, missing keys fall back to defaults.
    /// Without a file every parameter takes its default.
    pub fn new(json_path: Option<&str>) -> Result<Config> {

        let params = match json_path {
            Some(path) => {
                let f = BufReader::new(File::open(path)?);
                serde_json::from_reader(f)?
            },
            None => JsonTypes::default()
        };

        Config::validate(&params)?;
        Ok(Self { params })
    }

    pub fn from_json(json: &str) -> Result<Config> {
        let params: JsonTypes = serde_json::from_str(json)?;
        Config::validate(&params)?;
        Ok(Self { params })
    }

    fn validate(params: &JsonTypes) -> Result<()> {

        let train = &params.json_train;
        if train.n_estimators == 0 {
            return Err(PipelineError::InvalidConfig("n_estimators must be positive".into()));
        }
        if train.rounds == 0 {
            return Err(PipelineError::InvalidConfig("rounds must be positive".into()));
        }
        if !(train.train_fraction > 0.0 && train.train_fraction < 1.0) {
            return Err(PipelineError::InvalidConfig(format!("train_fraction must be in (0, 1), got {}", train.train_fraction)));
        }
        if train.max_depth == Some(0) {
            return Err(PipelineError::InvalidConfig("max_depth must be positive".into()));
        }
        if params.num_threads == 0 {
            return Err(PipelineError::InvalidConfig("num_threads must be positive".into()));
        }
        Ok(())
    }

}


pub mod files_handling {

    use ndarray::Array2;
    use flate2::read::GzDecoder;
    use std::fs::{self, File};
    use std::io::{prelude::*, BufReader, BufWriter};
    use std::path::Path;
    use crate::error::{PipelineError, Result};
    use crate::model::Forest;

    pub fn read_input<R: ReadFile>(file_path: &str) -> Result<<R as ReadFile>::Item> {
        let input = <R as ReadFile>::read_file(file_path)?;
        Ok(input)
    }

    pub fn save_output<S: SaveFile>(output_dir: &str, file_name: &str, item: S) -> Result<()> {

        // create output folder
        fs::create_dir_all(output_dir)?;
        item.save_file(output_dir, file_name)
    }

    pub trait ReadFile {
        type Item;
        fn read_file(file_path: &str) -> Result<Self::Item>;
    }

    pub trait SaveFile {
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<()>;
    }

    fn out_path(output_dir: &str, file_name: &str, extension: &str) -> String {
        Path::new(output_dir).join(format!("{}{}", file_name, extension)).display().to_string()
    }

    /// Splits newline separated text into its entries. A single trailing
    /// empty entry (the one left after the last newline) is discarded.
    pub fn split_list(text: &str) -> Vec<String> {
        let mut items: Vec<String> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_owned())
        .collect();

        if items.last().is_some_and(|last| last.is_empty()) {
            items.pop();
        }
        items
    }

    // newline separated list of tokens, gzipped when the path ends with .gz
    impl ReadFile for Vec<String> {
        type Item = Self;
        fn read_file(file_path: &str) -> Result<Self::Item> {

            let f = BufReader::new(File::open(file_path)?);
            let mut text = String::new();
            if file_path.ends_with(".gz") {
                GzDecoder::new(f).read_to_string(&mut text)?;
            } else {
                let mut f = f;
                f.read_to_string(&mut text)?;
            }
            Ok(split_list(&text))
        }
    }

    // csv without header, or a bincode dump when the path ends with .bin
    impl ReadFile for Array2<f32> {
        type Item = Self;
        fn read_file(file_path: &str) -> Result<Self::Item> {

            if file_path.ends_with(".bin") {
                let f = BufReader::new(File::open(file_path)?);
                let item: Array2<f32> = bincode::deserialize_from(f)?;
                return Ok(item)
            }

            let mut rdr = csv::ReaderBuilder::new().has_headers(false).flexible(true).from_path(file_path)?;
            let mut values: Vec<f32> = Vec::new();
            let mut n_cols: Option<usize> = None;
            let mut n_rows = 0;
            for record in rdr.deserialize::<Vec<f32>>() {
                let row = record?;
                let expected = *n_cols.get_or_insert(row.len());
                if row.len() != expected {
                    return Err(PipelineError::RaggedRow {
                        path: file_path.to_owned(),
                        row: n_rows,
                        expected,
                        found: row.len()
                    });
                }
                values.extend(row);
                n_rows += 1;
            }

            let shape = (n_rows, n_cols.unwrap_or(0));
            Array2::from_shape_vec(shape, values)
            .map_err(|e| PipelineError::Parse(format!("{}: {}", file_path, e)))
        }
    }

    // one value per line, first column of the csv
    impl ReadFile for Vec<f32> {
        type Item = Self;
        fn read_file(file_path: &str) -> Result<Self::Item> {
            let mut rdr = csv::ReaderBuilder::new().has_headers(false).flexible(true).from_path(file_path)?;
            let mut values = Vec::new();
            for (i, record) in rdr.records().enumerate() {
                let record = record?;
                let field = record.get(0).unwrap_or("").trim();
                let value: f32 = field.parse().map_err(|_| {
                    PipelineError::Parse(format!("{}: row {} is not numeric: {:?}", file_path, i, field))
                })?;
                values.push(value);
            }
            Ok(values)
        }
    }

    impl SaveFile for Vec<String> {
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<()> {
            let out = out_path(output_dir, file_name, "");
            let mut f = BufWriter::new(File::create(out)?);
            for item in self {
                writeln!(f, "{}", item)?;
            }
            f.flush()?;
            Ok(())
        }
    }

    impl SaveFile for Array2<f32> {
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<()> {
            let out = out_path(output_dir, file_name, ".csv");
            let mut wrt = csv::WriterBuilder::new().has_headers(false).from_path(out)?;
            for row in self.rows() {
                wrt.serialize(row.to_vec())?;
            }
            wrt.flush()?;
            Ok(())
        }
    }

    impl SaveFile for Vec<f32> {
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<()> {
            let out = out_path(output_dir, file_name, ".csv");
            let mut wrt = csv::WriterBuilder::new().has_headers(false).from_path(out)?;
            for value in self {
                wrt.serialize([*value])?;
            }
            wrt.flush()?;
            Ok(())
        }
    }

    /// Feature matrix dumped with bincode, loads faster than csv.
    pub struct BinaryMatrix(pub Array2<f32>);

    impl SaveFile for BinaryMatrix {
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<()> {
            let out = out_path(output_dir, file_name, ".bin");
            let mut f = BufWriter::new(File::create(out)?);
            bincode::serialize_into(&mut f, &self.0)?;
            f.flush()?;
            Ok(())
        }
    }

    // fitted forest, written as bincode next to the features
    impl SaveFile for &Forest {
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<()> {
            let out = out_path(output_dir, file_name, ".bin");
            let mut f = BufWriter::new(File::create(out)?);
            bincode::serialize_into(&mut f, *self)?;
            f.flush()?;
            Ok(())
        }
    }

    impl ReadFile for Forest {
        type Item = Self;
        fn read_file(file_path: &str) -> Result<Self::Item> {
            let f = BufReader::new(File::open(file_path)?);
            let forest: Forest = bincode::deserialize_from(f)?;
            Ok(forest)
        }
    }

}
