use crate::{
	config::{ColumnNames, Config, ForestConfig, Shuffle},
	progress::Progress,
	recommend::{FeatureColumn, Recommender},
	test,
};
use agron_dataframe::*;
use agron_forest::{MaxFeatures, MulticlassClassifier, TrainOptions};
use agron_metrics::ClassificationMetricsOutput;
use agron_util::progress_counter::ProgressCounter;
use anyhow::{format_err, Context, Result};
use num_traits::ToPrimitive;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use rayon::prelude::*;
use std::path::Path;

/// The result of `train`: the fitted recommender and the metrics computed on the held out test rows.
#[derive(Debug)]
pub struct TrainOutput {
	pub recommender: Recommender,
	pub test_metrics: ClassificationMetricsOutput,
}

/// Train a `Recommender` from a csv file of readings, holding out a fraction of the rows to measure how well the model generalizes.
pub fn train(
	file_path: &Path,
	config_path: Option<&Path>,
	update_progress: &mut dyn FnMut(Progress),
) -> Result<TrainOutput> {
	// load the config from the config file, if provided.
	let config: Option<Config> = load_config(config_path)?;

	// load the dataframe from the csv file
	let mut dataframe = load_dataframe(file_path, update_progress)?;

	// retrieve the column names
	let column_names: Vec<String> = dataframe
		.columns
		.iter()
		.map(|column| column.name().to_owned())
		.collect();

	// resolve the expected column names, applying any renames from the config
	let names =
		ColumnNames::from_config(config.as_ref().and_then(|config| config.columns.as_ref()));

	// check that the csv file has the expected columns, with the expected types and no invalid values
	check_schema(&dataframe, &names)?;

	// shuffle the dataframe if enabled
	shuffle(&mut dataframe, &config, update_progress);

	// train test split
	let test_fraction = config
		.as_ref()
		.and_then(|config| config.test_fraction)
		.unwrap_or(0.2);
	if !(test_fraction > 0.0 && test_fraction < 1.0) {
		return Err(format_err!("test_fraction must be between 0 and 1"));
	}
	let n_records_train = ((1.0 - test_fraction) * dataframe.nrows().to_f32().unwrap())
		.to_usize()
		.unwrap();
	let split_index = n_records_train;
	let (dataframe_train, dataframe_test) = dataframe.view().split_at_row(split_index);
	if dataframe_train.nrows() == 0 {
		return Err(format_err!("the train split contains no rows"));
	}

	// find the target column
	let target_column_index = column_names
		.iter()
		.position(|column_name| *column_name == names.target)
		.ok_or_else(|| {
			format_err!(
				"did not find target column \"{}\" among column names \"{}\"",
				names.target,
				column_names.join(", ")
			)
		})?;

	// separate the features from the target
	let features_train = feature_view(&dataframe_train, target_column_index);
	let features_test = feature_view(&dataframe_test, target_column_index);
	let labels_train = dataframe_train
		.columns
		.get(target_column_index)
		.unwrap()
		.as_enum()
		.unwrap();
	let labels_test = dataframe_test
		.columns
		.get(target_column_index)
		.unwrap()
		.as_enum()
		.unwrap();

	// describe the feature columns so a single reading can be encoded the same way at recommend time
	let feature_columns: Vec<FeatureColumn> = features_train
		.columns
		.iter()
		.map(|column| match column {
			ColumnView::Number(column) => FeatureColumn::Number {
				name: column.name.to_owned(),
			},
			ColumnView::Enum(column) => FeatureColumn::Enum {
				name: column.name.to_owned(),
				options: column.options.to_owned(),
			},
			_ => unreachable!(),
		})
		.collect();

	// flatten the features into arrays with one row per example
	let features_train = features_train.to_rows_f32().unwrap();
	let features_test = features_test.to_rows_f32().unwrap();

	// train the forest
	let options = forest_train_options(config.as_ref().and_then(|config| config.forest.as_ref()));
	let model = MulticlassClassifier::train(
		features_train.view(),
		labels_train.clone(),
		options,
		&mut |progress| update_progress(Progress::Training(progress)),
	);

	// test the model on the held out rows
	let progress_counter = ProgressCounter::new(dataframe_test.nrows().to_u64().unwrap());
	update_progress(Progress::Testing(progress_counter.clone()));
	let test_metrics = test::test_multiclass_classifier(
		features_test.view(),
		labels_test.clone(),
		&model,
		&progress_counter,
	);

	let recommender = Recommender {
		names,
		columns: feature_columns,
		model,
	};
	Ok(TrainOutput {
		recommender,
		test_metrics,
	})
}

fn load_config(config_path: Option<&Path>) -> Result<Option<Config>> {
	if let Some(config_path) = config_path {
		let config = std::fs::read_to_string(config_path)
			.with_context(|| format!("failed to read config file {}", config_path.display()))?;
		let config = serde_yaml::from_str(&config)
			.with_context(|| format!("failed to parse config file {}", config_path.display()))?;
		Ok(Some(config))
	} else {
		Ok(None)
	}
}

fn load_dataframe(
	file_path: &Path,
	update_progress: &mut dyn FnMut(Progress),
) -> Result<DataFrame> {
	let len = std::fs::metadata(file_path)?.len();
	let progress_counter = ProgressCounter::new(len);
	update_progress(Progress::Loading(progress_counter.clone()));
	let dataframe = DataFrame::from_path(
		file_path,
		FromCsvOptions {
			column_types: None,
			infer_options: Default::default(),
		},
		|byte| progress_counter.set(byte),
	)?;
	Ok(dataframe)
}

fn check_schema(dataframe: &DataFrame, names: &ColumnNames) -> Result<()> {
	if dataframe.nrows() == 0 {
		return Err(format_err!("the csv file contains no rows"));
	}
	let number_column_names = [
		names.temperature.as_str(),
		names.humidity.as_str(),
		names.moisture.as_str(),
		names.nitrogen.as_str(),
		names.phosphorus.as_str(),
		names.potassium.as_str(),
	];
	let enum_column_names = [
		names.soil_type.as_str(),
		names.crop_type.as_str(),
		names.target.as_str(),
	];
	// every column in the csv must be one of the expected columns
	for column in dataframe.columns.iter() {
		let name = column.name();
		if !number_column_names.contains(&name) && !enum_column_names.contains(&name) {
			return Err(format_err!("found unexpected column \"{}\"", name));
		}
	}
	// and every expected column must be present, with the expected type and no invalid values
	for name in number_column_names.iter() {
		let column = dataframe
			.columns
			.iter()
			.find(|column| column.name() == *name)
			.ok_or_else(|| format_err!("did not find column \"{}\"", name))?;
		let column = column
			.as_number()
			.ok_or_else(|| format_err!("expected column \"{}\" to contain numbers", name))?;
		if column.data.iter().any(|value| value.is_nan()) {
			return Err(format_err!("column \"{}\" contains invalid values", name));
		}
	}
	for name in enum_column_names.iter() {
		let column = dataframe
			.columns
			.iter()
			.find(|column| column.name() == *name)
			.ok_or_else(|| format_err!("did not find column \"{}\"", name))?;
		let column = column
			.as_enum()
			.ok_or_else(|| format_err!("expected column \"{}\" to contain categories", name))?;
		if column.data.iter().any(|value| value.is_none()) {
			return Err(format_err!("column \"{}\" contains invalid values", name));
		}
	}
	Ok(())
}

fn shuffle(
	dataframe: &mut DataFrame,
	config: &Option<Config>,
	update_progress: &mut dyn FnMut(Progress),
) {
	// check if shuffling is enabled in the config
	// and use the seed from the config if provided
	let default_seed = 42;
	let shuffle_options = config
		.as_ref()
		.and_then(|config| config.shuffle.as_ref())
		.map(|shuffle| match shuffle {
			Shuffle::Enabled(enabled) => {
				if *enabled {
					Some(default_seed)
				} else {
					None
				}
			}
			Shuffle::Options { seed } => Some(*seed),
		})
		.unwrap_or(Some(default_seed));
	// shuffle each column with the same seed so the rows stay aligned
	if let Some(seed) = shuffle_options {
		update_progress(Progress::Shuffling);
		dataframe.columns.par_iter_mut().for_each(|column| {
			let mut rng = Xoshiro256Plus::seed_from_u64(seed);
			match column {
				Column::Unknown(_) => {}
				Column::Number(column) => column.data.shuffle(&mut rng),
				Column::Enum(column) => column.data.shuffle(&mut rng),
				Column::Text(column) => column.data.shuffle(&mut rng),
			}
		});
	}
}

fn feature_view<'a>(dataframe: &DataFrameView<'a>, target_column_index: usize) -> DataFrameView<'a> {
	let columns = dataframe
		.columns
		.iter()
		.enumerate()
		.filter(|(column_index, _)| *column_index != target_column_index)
		.map(|(_, column)| column.clone())
		.collect();
	DataFrameView { columns }
}

fn forest_train_options(config: Option<&ForestConfig>) -> TrainOptions {
	let mut options = TrainOptions::default();
	if let Some(config) = config {
		if let Some(n_trees) = config.n_trees {
			options.n_trees = n_trees;
		}
		if let Some(max_depth) = config.max_depth {
			options.max_depth = Some(max_depth);
		}
		if let Some(max_features) = config.max_features {
			options.max_features = MaxFeatures::Count(max_features);
		}
		if let Some(min_examples_per_split) = config.min_examples_per_split {
			options.min_examples_per_split = min_examples_per_split;
		}
		if let Some(min_examples_per_leaf) = config.min_examples_per_leaf {
			options.min_examples_per_leaf = min_examples_per_leaf;
		}
		if let Some(seed) = config.seed {
			options.seed = seed;
		}
	}
	options
}

#[cfg(test)]
fn test_train_output() -> TrainOutput {
	train(Path::new("../data/fertilizers.csv"), None, &mut |_| {}).unwrap()
}

#[cfg(test)]
fn test_input() -> crate::recommend::RecommendInput {
	crate::recommend::RecommendInput {
		temperature: 30.0,
		humidity: 60.0,
		moisture: 25.0,
		soil_type: "Loamy".to_owned(),
		crop_type: "Sugarcane".to_owned(),
		nitrogen: 20.0,
		phosphorus: 30.0,
		potassium: 10.0,
	}
}

#[test]
fn test_train_observes_the_vocabularies() {
	let output = test_train_output();
	let recommender = &output.recommender;
	assert_eq!(
		recommender.soil_options(),
		["Black", "Clayey", "Loamy", "Red", "Sandy"],
	);
	assert_eq!(
		recommender.crop_options(),
		[
			"Barley",
			"Cotton",
			"Ground Nuts",
			"Maize",
			"Millets",
			"Oil seeds",
			"Paddy",
			"Pulses",
			"Sugarcane",
			"Tobacco",
			"Wheat",
		],
	);
	assert_eq!(
		recommender.classes(),
		["10-26-26", "14-35-14", "17-17-17", "20-20", "28-28", "DAP", "Urea"],
	);
}

#[test]
fn test_train_splits_off_a_fifth_of_the_rows_for_testing() {
	let output = test_train_output();
	let class = &output.test_metrics.class_metrics[0];
	let n_test_examples = class.true_positives
		+ class.false_positives
		+ class.true_negatives
		+ class.false_negatives;
	assert_eq!(n_test_examples, 24);
}

#[test]
fn test_train_is_deterministic() {
	let output_a = test_train_output();
	let output_b = test_train_output();
	let input = test_input();
	assert_eq!(
		output_a.recommender.recommend(&input).unwrap(),
		output_b.recommender.recommend(&input).unwrap(),
	);
	assert_eq!(
		output_a.test_metrics.accuracy,
		output_b.test_metrics.accuracy,
	);
}

#[test]
fn test_recommend_returns_a_code_from_the_target_vocabulary() {
	let output = test_train_output();
	let recommendation = output.recommender.recommend(&test_input()).unwrap();
	assert!(output.recommender.classes().contains(&recommendation.code));
	assert_eq!(
		recommendation.name,
		crate::info::fertilizer_info(&recommendation.code).name,
	);
}

#[test]
fn test_recommend_rejects_labels_missing_from_the_csv() {
	let output = test_train_output();
	let mut input = test_input();
	input.soil_type = "Peaty".to_owned();
	let error = output.recommender.recommend(&input).unwrap_err();
	assert_eq!(error.to_string(), "unknown Soil Type \"Peaty\"");
}

#[test]
fn test_forest_train_options_applies_the_config() {
	let options = forest_train_options(None);
	assert_eq!(options.n_trees, 100);
	assert_eq!(options.max_depth, None);
	let config = ForestConfig {
		n_trees: Some(8),
		max_depth: Some(3),
		max_features: Some(2),
		min_examples_per_split: None,
		min_examples_per_leaf: None,
		seed: Some(7),
	};
	let options = forest_train_options(Some(&config));
	assert_eq!(options.n_trees, 8);
	assert_eq!(options.max_depth, Some(3));
	match options.max_features {
		MaxFeatures::Count(2) => {}
		_ => panic!("expected max_features to be count 2"),
	}
	assert_eq!(options.min_examples_per_split, 2);
	assert_eq!(options.min_examples_per_leaf, 1);
	assert_eq!(options.seed, 7);
}
