/*!
This module defines the `Recommender`, the context a trained model is wrapped in to answer recommendation requests. `recommend` encodes one reading the way the training data was encoded and decodes the model's prediction into a fertilizer code with its display info.
*/

use crate::{config::ColumnNames, info};
use agron_forest::MulticlassClassifier;
use derive_more::{Display, Error};
use ndarray::prelude::*;
use num_traits::ToPrimitive;

/// A trained model together with everything needed to turn one raw reading into a feature row: the resolved column names and the per-column encodings observed at training time.
#[derive(Debug)]
pub struct Recommender {
	pub(crate) names: ColumnNames,
	pub(crate) columns: Vec<FeatureColumn>,
	pub(crate) model: MulticlassClassifier,
}

/// The encoding of one feature column, in the column order the model was trained with.
#[derive(Debug)]
pub(crate) enum FeatureColumn {
	Number { name: String },
	Enum { name: String, options: Vec<String> },
}

/// One reading to recommend a fertilizer for.
#[derive(Clone, Debug)]
pub struct RecommendInput {
	pub temperature: f32,
	pub humidity: f32,
	pub moisture: f32,
	pub soil_type: String,
	pub crop_type: String,
	pub nitrogen: f32,
	pub phosphorus: f32,
	pub potassium: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Recommendation {
	/// The fertilizer code the model predicted. This is always one of the codes in the training data's target column.
	pub code: String,
	pub name: String,
	pub description: String,
}

#[derive(Debug, Display, Error)]
pub enum RecommendError {
	#[display(fmt = "unknown {} \"{}\"", column, label)]
	UnknownCategory { column: String, label: String },
}

impl Recommender {
	/// Recommend a fertilizer for one reading. Returns an error if the soil type or crop type was not among the options observed at training time.
	pub fn recommend(&self, input: &RecommendInput) -> Result<Recommendation, RecommendError> {
		let mut features = Array::zeros((1, self.columns.len()));
		for (feature, column) in features.row_mut(0).iter_mut().zip(self.columns.iter()) {
			*feature = match column {
				FeatureColumn::Number { name } => self.number_value(name, input),
				FeatureColumn::Enum { name, options } => {
					let label = self.enum_label(name, input);
					let position = options.iter().position(|option| option == label).ok_or_else(
						|| RecommendError::UnknownCategory {
							column: name.clone(),
							label: label.to_owned(),
						},
					)?;
					// enum features are encoded with the same 1-based codes as the training data
					(position + 1).to_f32().unwrap()
				}
			};
		}
		let mut predictions = Array::zeros(1);
		self.model
			.predict(features.view(), predictions.view_mut());
		let code = &self.model.classes[predictions[0]];
		let info = info::fertilizer_info(code);
		Ok(Recommendation {
			code: code.clone(),
			name: info.name.to_owned(),
			description: info.description.to_owned(),
		})
	}

	fn number_value(&self, name: &str, input: &RecommendInput) -> f32 {
		if name == self.names.temperature {
			input.temperature
		} else if name == self.names.humidity {
			input.humidity
		} else if name == self.names.moisture {
			input.moisture
		} else if name == self.names.nitrogen {
			input.nitrogen
		} else if name == self.names.phosphorus {
			input.phosphorus
		} else if name == self.names.potassium {
			input.potassium
		} else {
			unreachable!()
		}
	}

	fn enum_label<'a>(&self, name: &str, input: &'a RecommendInput) -> &'a str {
		if name == self.names.soil_type {
			&input.soil_type
		} else if name == self.names.crop_type {
			&input.crop_type
		} else {
			unreachable!()
		}
	}

	/// The soil types observed at training time, sorted.
	pub fn soil_options(&self) -> &[String] {
		self.enum_options(&self.names.soil_type)
	}

	/// The crop types observed at training time, sorted.
	pub fn crop_options(&self) -> &[String] {
		self.enum_options(&self.names.crop_type)
	}

	fn enum_options(&self, name: &str) -> &[String] {
		self.columns
			.iter()
			.find_map(|column| match column {
				FeatureColumn::Enum {
					name: column_name,
					options,
				} if column_name == name => Some(options.as_slice()),
				_ => None,
			})
			.unwrap()
	}

	/// The fertilizer codes the model can predict, sorted.
	pub fn classes(&self) -> &[String] {
		&self.model.classes
	}

	pub fn column_names(&self) -> &ColumnNames {
		&self.names
	}
}

#[cfg(test)]
fn test_recommender() -> Recommender {
	use agron_forest::{LeafNode, Node, Tree};
	// a model with a single leaf, so every prediction is class 1
	let model = MulticlassClassifier {
		trees: vec![Tree {
			nodes: vec![Node::Leaf(LeafNode { class_index: 1 })],
		}],
		n_classes: 2,
		classes: vec!["28-28".to_owned(), "Urea".to_owned()],
	};
	let names = ColumnNames::default();
	let columns = vec![
		FeatureColumn::Number {
			name: names.temperature.clone(),
		},
		FeatureColumn::Number {
			name: names.humidity.clone(),
		},
		FeatureColumn::Number {
			name: names.moisture.clone(),
		},
		FeatureColumn::Enum {
			name: names.soil_type.clone(),
			options: vec!["Clayey".to_owned(), "Loamy".to_owned()],
		},
		FeatureColumn::Enum {
			name: names.crop_type.clone(),
			options: vec!["Paddy".to_owned(), "Sugarcane".to_owned()],
		},
		FeatureColumn::Number {
			name: names.nitrogen.clone(),
		},
		FeatureColumn::Number {
			name: names.phosphorus.clone(),
		},
		FeatureColumn::Number {
			name: names.potassium.clone(),
		},
	];
	Recommender {
		names,
		columns,
		model,
	}
}

#[cfg(test)]
fn test_input() -> RecommendInput {
	RecommendInput {
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
fn test_recommend_decodes_the_predicted_class() {
	let recommender = test_recommender();
	let recommendation = recommender.recommend(&test_input()).unwrap();
	assert_eq!(
		recommendation,
		Recommendation {
			code: "Urea".to_owned(),
			name: "Urea".to_owned(),
			description: "Highly concentrated nitrogen fertilizer that boosts leaf and stem growth."
				.to_owned(),
		},
	);
}

#[test]
fn test_recommend_falls_back_for_codes_without_info() {
	let mut recommender = test_recommender();
	recommender.model.classes[1] = "0-0-60".to_owned();
	let recommendation = recommender.recommend(&test_input()).unwrap();
	assert_eq!(
		recommendation,
		Recommendation {
			code: "0-0-60".to_owned(),
			name: "Unknown Fertilizer".to_owned(),
			description: "No details available for this fertilizer.".to_owned(),
		},
	);
}

#[test]
fn test_recommend_rejects_an_unknown_soil_type() {
	let recommender = test_recommender();
	let mut input = test_input();
	input.soil_type = "Peat".to_owned();
	let error = recommender.recommend(&input).unwrap_err();
	assert_eq!(error.to_string(), "unknown Soil Type \"Peat\"");
}

#[test]
fn test_recommend_rejects_an_unknown_crop_type() {
	let recommender = test_recommender();
	let mut input = test_input();
	input.crop_type = "Quinoa".to_owned();
	let error = recommender.recommend(&input).unwrap_err();
	assert_eq!(error.to_string(), "unknown Crop Type \"Quinoa\"");
}
