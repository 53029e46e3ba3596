/*!
This crate provides a basic implementation of dataframes, which are two dimensional arrays of data where each column can have a different data type, like a spreadsheet. It implements only what is needed to load a csv of readings and train and apply a recommender on it. Enum columns double as fitted category encoders: the sorted list of options assigns each distinct string a code from `1` to `options.len()`, and [`value_for_option`](struct.EnumColumn.html#method.value_for_option) and [`option_for_value`](struct.EnumColumn.html#method.option_for_value) convert between the two.
*/

use itertools::izip;
use ndarray::prelude::*;
use num_traits::ToPrimitive;
use std::num::NonZeroUsize;

pub mod load;

pub use self::load::*;

#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
	pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataFrameView<'a> {
	pub columns: Vec<ColumnView<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
	Unknown(UnknownColumn),
	Number(NumberColumn),
	Enum(EnumColumn),
	Text(TextColumn),
}

/// A column whose type could not be determined because it contained no valid values.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownColumn {
	pub name: String,
	pub len: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberColumn {
	pub name: String,
	pub data: Vec<f32>,
}

/// An enum column stores each value as a code into `options`. Codes start at 1, and `None` marks values that were invalid or not among the options.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumColumn {
	pub name: String,
	pub options: Vec<String>,
	pub data: Vec<Option<NonZeroUsize>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextColumn {
	pub name: String,
	pub data: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnView<'a> {
	Unknown(UnknownColumnView<'a>),
	Number(NumberColumnView<'a>),
	Enum(EnumColumnView<'a>),
	Text(TextColumnView<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnknownColumnView<'a> {
	pub name: &'a str,
	pub len: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberColumnView<'a> {
	pub name: &'a str,
	pub data: &'a [f32],
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumColumnView<'a> {
	pub name: &'a str,
	pub options: &'a [String],
	pub data: &'a [Option<NonZeroUsize>],
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextColumnView<'a> {
	pub name: &'a str,
	pub data: &'a [String],
}

#[derive(Debug, Clone)]
pub enum ColumnType {
	Unknown,
	Number,
	Enum { options: Vec<String> },
	Text,
}

impl DataFrame {
	pub fn new(column_names: Vec<String>, column_types: Vec<ColumnType>) -> Self {
		let columns = column_names
			.into_iter()
			.zip(column_types.into_iter())
			.map(|(column_name, column_type)| match column_type {
				ColumnType::Unknown => Column::Unknown(UnknownColumn::new(column_name)),
				ColumnType::Number => Column::Number(NumberColumn::new(column_name)),
				ColumnType::Enum { options } => Column::Enum(EnumColumn::new(column_name, options)),
				ColumnType::Text => Column::Text(TextColumn::new(column_name)),
			})
			.collect();
		Self { columns }
	}

	pub fn ncols(&self) -> usize {
		self.columns.len()
	}

	pub fn nrows(&self) -> usize {
		self.columns.first().map(|column| column.len()).unwrap_or(0)
	}

	pub fn view(&self) -> DataFrameView {
		let columns = self.columns.iter().map(|column| column.view()).collect();
		DataFrameView { columns }
	}
}

impl Column {
	pub fn len(&self) -> usize {
		match self {
			Self::Unknown(s) => s.len,
			Self::Number(s) => s.data.len(),
			Self::Enum(s) => s.data.len(),
			Self::Text(s) => s.data.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		match self {
			Self::Unknown(s) => s.len == 0,
			Self::Number(s) => s.data.is_empty(),
			Self::Enum(s) => s.data.is_empty(),
			Self::Text(s) => s.data.is_empty(),
		}
	}

	pub fn name(&self) -> &str {
		match self {
			Self::Unknown(s) => s.name.as_str(),
			Self::Number(s) => s.name.as_str(),
			Self::Enum(s) => s.name.as_str(),
			Self::Text(s) => s.name.as_str(),
		}
	}

	pub fn as_number(&self) -> Option<&NumberColumn> {
		match self {
			Self::Number(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_enum(&self) -> Option<&EnumColumn> {
		match self {
			Self::Enum(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_text(&self) -> Option<&TextColumn> {
		match self {
			Self::Text(s) => Some(s),
			_ => None,
		}
	}

	pub fn view(&self) -> ColumnView {
		match self {
			Self::Unknown(column) => ColumnView::Unknown(column.view()),
			Self::Number(column) => ColumnView::Number(column.view()),
			Self::Enum(column) => ColumnView::Enum(column.view()),
			Self::Text(column) => ColumnView::Text(column.view()),
		}
	}
}

impl UnknownColumn {
	pub fn new(name: String) -> Self {
		Self { name, len: 0 }
	}

	pub fn view(&self) -> UnknownColumnView {
		UnknownColumnView {
			name: &self.name,
			len: self.len,
		}
	}
}

impl NumberColumn {
	pub fn new(name: String) -> Self {
		Self {
			name,
			data: Vec::new(),
		}
	}

	pub fn view(&self) -> NumberColumnView {
		NumberColumnView {
			name: &self.name,
			data: &self.data,
		}
	}
}

impl EnumColumn {
	pub fn new(name: String, options: Vec<String>) -> Self {
		Self {
			name,
			options,
			data: Vec::new(),
		}
	}

	/// Encode `option` as its code, or `None` if `option` is not among this column's options.
	pub fn value_for_option(&self, option: &str) -> Option<NonZeroUsize> {
		self.options
			.iter()
			.position(|o| o == option)
			.map(|position| NonZeroUsize::new(position + 1).unwrap())
	}

	/// Decode `value` back to the option it was assigned to, the inverse of `value_for_option`.
	pub fn option_for_value(&self, value: NonZeroUsize) -> Option<&str> {
		self.options.get(value.get() - 1).map(|o| o.as_str())
	}

	pub fn view(&self) -> EnumColumnView {
		EnumColumnView {
			name: &self.name,
			data: &self.data,
			options: &self.options,
		}
	}
}

impl TextColumn {
	pub fn new(name: String) -> Self {
		Self {
			name,
			data: Vec::new(),
		}
	}

	pub fn view(&self) -> TextColumnView {
		TextColumnView {
			name: &self.name,
			data: &self.data,
		}
	}
}

impl<'a> DataFrameView<'a> {
	pub fn ncols(&self) -> usize {
		self.columns.len()
	}

	pub fn nrows(&self) -> usize {
		self.columns.first().map(|column| column.len()).unwrap_or(0)
	}

	pub fn split_at_row(&self, index: usize) -> (Self, Self) {
		let iter = self.columns.iter().map(|column| column.split_at_row(index));
		let mut columns_a = Vec::with_capacity(self.columns.len());
		let mut columns_b = Vec::with_capacity(self.columns.len());
		for (column_a, column_b) in iter {
			columns_a.push(column_a);
			columns_b.push(column_b);
		}
		(Self { columns: columns_a }, Self { columns: columns_b })
	}

	/// Flatten the columns into an array of shape (nrows, ncols), with enum values cast to their codes. Returns `None` if any column is not a number or enum column, or if any enum value is invalid.
	pub fn to_rows_f32(&self) -> Option<Array2<f32>> {
		let mut rows = unsafe { Array::uninitialized((self.nrows(), self.ncols())) };
		for (mut rows_column, column) in izip!(rows.gencolumns_mut(), self.columns.iter()) {
			match column {
				ColumnView::Number(column) => {
					for (a, b) in izip!(rows_column.iter_mut(), column.data) {
						*a = *b;
					}
				}
				ColumnView::Enum(column) => {
					for (a, b) in izip!(rows_column.iter_mut(), column.data) {
						*a = (*b)?.get().to_f32().unwrap();
					}
				}
				_ => return None,
			}
		}
		Some(rows)
	}
}

impl<'a> ColumnView<'a> {
	pub fn len(&self) -> usize {
		match self {
			Self::Unknown(s) => s.len,
			Self::Number(s) => s.data.len(),
			Self::Enum(s) => s.data.len(),
			Self::Text(s) => s.data.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		match self {
			Self::Unknown(s) => s.len == 0,
			Self::Number(s) => s.data.is_empty(),
			Self::Enum(s) => s.data.is_empty(),
			Self::Text(s) => s.data.is_empty(),
		}
	}

	pub fn name(&self) -> &str {
		match self {
			Self::Unknown(s) => s.name,
			Self::Number(s) => s.name,
			Self::Enum(s) => s.name,
			Self::Text(s) => s.name,
		}
	}

	pub fn as_number(&self) -> Option<&NumberColumnView<'a>> {
		match self {
			Self::Number(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_enum(&self) -> Option<&EnumColumnView<'a>> {
		match self {
			Self::Enum(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_text(&self) -> Option<&TextColumnView<'a>> {
		match self {
			Self::Text(s) => Some(s),
			_ => None,
		}
	}

	pub fn split_at_row(&self, index: usize) -> (Self, Self) {
		match self {
			ColumnView::Unknown(column) => (
				ColumnView::Unknown(UnknownColumnView {
					name: column.name,
					len: index,
				}),
				ColumnView::Unknown(UnknownColumnView {
					name: column.name,
					len: column.len - index,
				}),
			),
			ColumnView::Number(column) => {
				let (data_a, data_b) = column.data.split_at(index);
				(
					ColumnView::Number(NumberColumnView {
						name: column.name,
						data: data_a,
					}),
					ColumnView::Number(NumberColumnView {
						name: column.name,
						data: data_b,
					}),
				)
			}
			ColumnView::Enum(column) => {
				let (data_a, data_b) = column.data.split_at(index);
				(
					ColumnView::Enum(EnumColumnView {
						name: column.name,
						options: column.options,
						data: data_a,
					}),
					ColumnView::Enum(EnumColumnView {
						name: column.name,
						options: column.options,
						data: data_b,
					}),
				)
			}
			ColumnView::Text(column) => {
				let (data_a, data_b) = column.data.split_at(index);
				(
					ColumnView::Text(TextColumnView {
						name: column.name,
						data: data_a,
					}),
					ColumnView::Text(TextColumnView {
						name: column.name,
						data: data_b,
					}),
				)
			}
		}
	}
}

impl<'a> EnumColumnView<'a> {
	/// Encode `option` as its code, or `None` if `option` is not among this column's options.
	pub fn value_for_option(&self, option: &str) -> Option<NonZeroUsize> {
		self.options
			.iter()
			.position(|o| o == option)
			.map(|position| NonZeroUsize::new(position + 1).unwrap())
	}

	/// Decode `value` back to the option it was assigned to, the inverse of `value_for_option`.
	pub fn option_for_value(&self, value: NonZeroUsize) -> Option<&'a str> {
		self.options.get(value.get() - 1).map(|o| o.as_str())
	}
}

#[cfg(test)]
fn test_enum_column(name: &str, options: &[&str]) -> EnumColumn {
	EnumColumn::new(
		name.to_owned(),
		options.iter().map(|o| o.to_string()).collect(),
	)
}

#[test]
fn test_enum_column_encode_decode_round_trip() {
	let columns = vec![
		test_enum_column("Soil Type", &["Black", "Clayey", "Loamy", "Red", "Sandy"]),
		test_enum_column(
			"Crop Type",
			&[
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
		),
		test_enum_column(
			"Fertilizer Name",
			&[
				"10-26-26", "14-35-14", "17-17-17", "20-20", "28-28", "DAP", "Urea",
			],
		),
	];
	for column in columns.iter() {
		for option in column.options.iter() {
			let value = column.value_for_option(option).unwrap();
			assert_eq!(column.option_for_value(value), Some(option.as_str()));
		}
		assert_eq!(column.value_for_option("Peat"), None);
	}
}

#[test]
fn test_enum_column_codes_are_one_indexed() {
	let column = test_enum_column("Soil Type", &["Black", "Clayey", "Loamy"]);
	assert_eq!(column.value_for_option("Black").unwrap().get(), 1);
	assert_eq!(column.value_for_option("Loamy").unwrap().get(), 3);
}

#[test]
fn test_split_at_row() {
	let mut column = NumberColumn::new("Temperature".to_owned());
	column.data = vec![26.0, 29.0, 34.0, 30.0, 28.0];
	let dataframe = DataFrame {
		columns: vec![Column::Number(column)],
	};
	let (left, right) = dataframe.view().split_at_row(4);
	assert_eq!(left.nrows(), 4);
	assert_eq!(right.nrows(), 1);
	assert_eq!(right.columns[0].as_number().unwrap().data, &[28.0]);
}
