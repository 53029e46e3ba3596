/*!
This module defines the `Config` struct, which is used to configure training a recommender with [`train`](../train/fn.train.html). Every field is optional, so an absent config file means all defaults.
*/

#[derive(Debug, Default, serde::Deserialize)]
pub struct Config {
	pub columns: Option<ColumnsConfig>,
	pub test_fraction: Option<f32>,
	pub shuffle: Option<Shuffle>,
	pub forest: Option<ForestConfig>,
}

/// Overrides for the column names expected in the csv file.
#[derive(Debug, Default, serde::Deserialize)]
pub struct ColumnsConfig {
	pub temperature: Option<String>,
	pub humidity: Option<String>,
	pub moisture: Option<String>,
	pub soil_type: Option<String>,
	pub crop_type: Option<String>,
	pub nitrogen: Option<String>,
	pub phosphorus: Option<String>,
	pub potassium: Option<String>,
	pub target: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
pub enum Shuffle {
	Enabled(bool),
	Options { seed: u64 },
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct ForestConfig {
	pub n_trees: Option<usize>,
	pub max_depth: Option<usize>,
	pub max_features: Option<usize>,
	pub min_examples_per_split: Option<usize>,
	pub min_examples_per_leaf: Option<usize>,
	pub seed: Option<u64>,
}

/// The resolved names of the nine columns, after applying any overrides from the config.
#[derive(Clone, Debug)]
pub struct ColumnNames {
	pub temperature: String,
	pub humidity: String,
	pub moisture: String,
	pub soil_type: String,
	pub crop_type: String,
	pub nitrogen: String,
	pub phosphorus: String,
	pub potassium: String,
	pub target: String,
}

impl Default for ColumnNames {
	fn default() -> Self {
		Self {
			temperature: "Temperature".to_owned(),
			humidity: "Humidity".to_owned(),
			moisture: "Moisture".to_owned(),
			soil_type: "Soil Type".to_owned(),
			crop_type: "Crop Type".to_owned(),
			nitrogen: "Nitrogen".to_owned(),
			phosphorus: "Phosphorus".to_owned(),
			potassium: "Potassium".to_owned(),
			target: "Fertilizer Name".to_owned(),
		}
	}
}

impl ColumnNames {
	pub fn from_config(config: Option<&ColumnsConfig>) -> Self {
		let mut names = Self::default();
		if let Some(config) = config {
			if let Some(temperature) = &config.temperature {
				names.temperature = temperature.clone();
			}
			if let Some(humidity) = &config.humidity {
				names.humidity = humidity.clone();
			}
			if let Some(moisture) = &config.moisture {
				names.moisture = moisture.clone();
			}
			if let Some(soil_type) = &config.soil_type {
				names.soil_type = soil_type.clone();
			}
			if let Some(crop_type) = &config.crop_type {
				names.crop_type = crop_type.clone();
			}
			if let Some(nitrogen) = &config.nitrogen {
				names.nitrogen = nitrogen.clone();
			}
			if let Some(phosphorus) = &config.phosphorus {
				names.phosphorus = phosphorus.clone();
			}
			if let Some(potassium) = &config.potassium {
				names.potassium = potassium.clone();
			}
			if let Some(target) = &config.target {
				names.target = target.clone();
			}
		}
		names
	}
}

#[test]
fn test_config_all_fields_optional() {
	let config: Config = serde_yaml::from_str("{}").unwrap();
	assert!(config.columns.is_none());
	assert!(config.test_fraction.is_none());
	assert!(config.shuffle.is_none());
	assert!(config.forest.is_none());
}

#[test]
fn test_config_shuffle_accepts_bool_or_seed() {
	let config: Config = serde_yaml::from_str("shuffle: false").unwrap();
	match config.shuffle {
		Some(Shuffle::Enabled(false)) => {}
		_ => panic!(),
	}
	let config: Config = serde_yaml::from_str("shuffle:\n  seed: 7").unwrap();
	match config.shuffle {
		Some(Shuffle::Options { seed: 7 }) => {}
		_ => panic!(),
	}
}

#[test]
fn test_column_names_from_config() {
	let config: Config = serde_yaml::from_str(
		r#"
columns:
  target: Fertilizer
  phosphorus: Phosphorous
"#,
	)
	.unwrap();
	let names = ColumnNames::from_config(config.columns.as_ref());
	assert_eq!(names.target, "Fertilizer");
	assert_eq!(names.phosphorus, "Phosphorous");
	assert_eq!(names.temperature, "Temperature");
}
