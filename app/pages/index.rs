use crate::{error::Error, Context};
use agron_core::{ColumnNames, RecommendInput, Recommendation, Recommender};
use anyhow::Result;
use hyper::{header, Body, Request, Response, StatusCode};
use std::collections::BTreeMap;

pub(crate) async fn get(
	context: &Context,
	_request: Request<Body>,
	search_params: Option<BTreeMap<String, String>>,
) -> Result<Response<Body>> {
	let recommender = &context.recommender;
	let page = match search_params {
		None => render_page(recommender, &FormValues::default(), None),
		Some(search_params) => {
			let values =
				FormValues::from_search_params(&search_params, recommender.column_names())
					.ok_or(Error::BadRequest)?;
			let outcome = match parse_input(&values) {
				Some(input) => match recommender.recommend(&input) {
					Ok(recommendation) => Outcome::Recommendation(recommendation),
					Err(error) => Outcome::Error(error.to_string()),
				},
				None => Outcome::Error("make sure every field is a valid number".to_owned()),
			};
			render_page(recommender, &values, Some(&outcome))
		}
	};
	Ok(Response::builder()
		.status(StatusCode::OK)
		.header(header::CONTENT_TYPE, "text/html; charset=utf-8")
		.body(Body::from(page))?)
}

/// The raw values echoed back into the form, kept as strings so invalid submissions render unchanged.
struct FormValues {
	temperature: String,
	humidity: String,
	moisture: String,
	soil_type: String,
	crop_type: String,
	nitrogen: String,
	phosphorus: String,
	potassium: String,
}

impl Default for FormValues {
	fn default() -> Self {
		Self {
			temperature: "25".to_owned(),
			humidity: "60".to_owned(),
			moisture: "40".to_owned(),
			soil_type: String::new(),
			crop_type: String::new(),
			nitrogen: "20".to_owned(),
			phosphorus: "15".to_owned(),
			potassium: "10".to_owned(),
		}
	}
}

impl FormValues {
	fn from_search_params(
		search_params: &BTreeMap<String, String>,
		names: &ColumnNames,
	) -> Option<Self> {
		Some(Self {
			temperature: search_params.get(&names.temperature)?.clone(),
			humidity: search_params.get(&names.humidity)?.clone(),
			moisture: search_params.get(&names.moisture)?.clone(),
			soil_type: search_params.get(&names.soil_type)?.clone(),
			crop_type: search_params.get(&names.crop_type)?.clone(),
			nitrogen: search_params.get(&names.nitrogen)?.clone(),
			phosphorus: search_params.get(&names.phosphorus)?.clone(),
			potassium: search_params.get(&names.potassium)?.clone(),
		})
	}
}

fn parse_input(values: &FormValues) -> Option<RecommendInput> {
	Some(RecommendInput {
		temperature: values.temperature.parse().ok()?,
		humidity: values.humidity.parse().ok()?,
		moisture: values.moisture.parse().ok()?,
		soil_type: values.soil_type.clone(),
		crop_type: values.crop_type.clone(),
		nitrogen: values.nitrogen.parse().ok()?,
		phosphorus: values.phosphorus.parse().ok()?,
		potassium: values.potassium.parse().ok()?,
	})
}

enum Outcome {
	Recommendation(Recommendation),
	Error(String),
}

const HEADER: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta content="width=device-width, initial-scale=1" name="viewport">
<title>Fertilizer Recommender</title>
<style>
body { font-family: sans-serif; margin: 0 auto; max-width: 48rem; padding: 1rem; }
header { text-align: center; }
header p { color: #666; }
form { display: grid; gap: 0.75rem; grid-template-columns: repeat(2, 1fr); }
label { display: flex; flex-direction: column; font-size: 0.875rem; gap: 0.25rem; }
input, select { padding: 0.5rem; }
button { background: #2e7d32; border: none; color: white; grid-column: span 2; padding: 0.75rem; }
.result { background: #e8f5e9; border-left: 4px solid #2e7d32; margin-top: 1rem; padding: 0.5rem 1rem; }
.result .code { font-size: 1.5rem; font-weight: bold; margin: 0.25rem 0; }
.result .name { font-weight: bold; }
.error { background: #ffebee; border-left: 4px solid #c62828; margin-top: 1rem; padding: 0.5rem 1rem; }
.summary, .panels { display: grid; gap: 0.75rem; grid-template-columns: repeat(3, 1fr); margin-top: 1rem; }
.summary div, .panels div { background: #f5f5f5; font-size: 0.875rem; padding: 0.5rem 1rem; }
</style>
</head>
<body>
<header>
<h1>Smart Fertilizer Recommendation System</h1>
<p>Get personalized fertilizer suggestions based on soil and crop conditions using AI</p>
</header>
<main>
"#;

const PANELS: &str = r#"<section class="panels">
<div><h3>Temperature</h3><p>Optimal range: 20-35°C</p><p>Affects nutrient availability and microbial activity</p></div>
<div><h3>Humidity &amp; Moisture</h3><p>Humidity: Air moisture content</p><p>Moisture: Soil water content</p><p>Both affect nutrient uptake efficiency</p></div>
<div><h3>N-P-K Values</h3><p>N (Nitrogen): Leaf growth</p><p>P (Phosphorus): Root development</p><p>K (Potassium): Flowering &amp; fruiting</p></div>
</section>
"#;

const FOOTER: &str = "</main>\n</body>\n</html>\n";

fn render_page(
	recommender: &Recommender,
	values: &FormValues,
	outcome: Option<&Outcome>,
) -> String {
	let mut page = String::new();
	page.push_str(HEADER);
	page.push_str(&render_form(recommender, values));
	match outcome {
		Some(Outcome::Recommendation(recommendation)) => {
			page.push_str(&render_recommendation(recommendation, values));
		}
		Some(Outcome::Error(message)) => {
			page.push_str(&render_error(message));
		}
		None => {}
	}
	page.push_str(PANELS);
	page.push_str(FOOTER);
	page
}

fn render_form(recommender: &Recommender, values: &FormValues) -> String {
	let names = recommender.column_names();
	let mut form = String::new();
	form.push_str(r#"<form action="/" method="get">"#);
	form.push('\n');
	form.push_str(&render_number_field(
		&format!("{} (°C)", names.temperature),
		&names.temperature,
		&values.temperature,
		"0",
		"50",
		"0.1",
	));
	form.push_str(&render_number_field(
		&format!("{} (%)", names.humidity),
		&names.humidity,
		&values.humidity,
		"0",
		"100",
		"0.1",
	));
	form.push_str(&render_number_field(
		&format!("{} (%)", names.moisture),
		&names.moisture,
		&values.moisture,
		"0",
		"100",
		"0.1",
	));
	form.push_str(&render_select_field(
		&names.soil_type,
		&names.soil_type,
		recommender.soil_options(),
		&values.soil_type,
	));
	form.push_str(&render_select_field(
		&names.crop_type,
		&names.crop_type,
		recommender.crop_options(),
		&values.crop_type,
	));
	form.push_str(&render_number_field(
		&format!("{} (N)", names.nitrogen),
		&names.nitrogen,
		&values.nitrogen,
		"0",
		"50",
		"1",
	));
	form.push_str(&render_number_field(
		&format!("{} (P)", names.phosphorus),
		&names.phosphorus,
		&values.phosphorus,
		"0",
		"50",
		"1",
	));
	form.push_str(&render_number_field(
		&format!("{} (K)", names.potassium),
		&names.potassium,
		&values.potassium,
		"0",
		"50",
		"1",
	));
	form.push_str("<button type=\"submit\">Get Recommendation</button>\n");
	form.push_str("</form>\n");
	form
}

fn render_number_field(
	label: &str,
	name: &str,
	value: &str,
	min: &str,
	max: &str,
	step: &str,
) -> String {
	format!(
		"<label>{}<input max=\"{}\" min=\"{}\" name=\"{}\" step=\"{}\" type=\"number\" value=\"{}\"></label>\n",
		escape(label),
		max,
		min,
		escape(name),
		step,
		escape(value),
	)
}

fn render_select_field(label: &str, name: &str, options: &[String], selected: &str) -> String {
	let mut select = format!("<label>{}<select name=\"{}\">", escape(label), escape(name));
	for option in options {
		let marker = if option == selected { " selected" } else { "" };
		select.push_str(&format!("<option{}>{}</option>", marker, escape(option)));
	}
	select.push_str("</select></label>\n");
	select
}

fn render_recommendation(recommendation: &Recommendation, values: &FormValues) -> String {
	format!(
		r#"<section class="result">
<p class="code">{}</p>
<p class="name">{}</p>
<p>{}</p>
</section>
<section class="summary">
<div><h3>Environmental Conditions</h3><p>Temperature: {}°C</p><p>Humidity: {}%</p><p>Moisture: {}%</p></div>
<div><h3>Soil &amp; Crop</h3><p>Soil Type: {}</p><p>Crop Type: {}</p></div>
<div><h3>Nutrient Levels (N-P-K)</h3><p>Nitrogen: {}</p><p>Phosphorus: {}</p><p>Potassium: {}</p></div>
</section>
"#,
		escape(&recommendation.code),
		escape(&recommendation.name),
		escape(&recommendation.description),
		escape(&values.temperature),
		escape(&values.humidity),
		escape(&values.moisture),
		escape(&values.soil_type),
		escape(&values.crop_type),
		escape(&values.nitrogen),
		escape(&values.phosphorus),
		escape(&values.potassium),
	)
}

fn render_error(message: &str) -> String {
	format!(
		"<section class=\"error\"><p>Error getting recommendation: {}</p></section>\n",
		escape(message),
	)
}

fn escape(value: &str) -> String {
	let mut escaped = String::with_capacity(value.len());
	for c in value.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			_ => escaped.push(c),
		}
	}
	escaped
}

#[cfg(test)]
fn test_recommender() -> Recommender {
	agron_core::train(
		std::path::Path::new("../data/fertilizers.csv"),
		None,
		&mut |_| {},
	)
	.unwrap()
	.recommender
}

#[test]
fn test_render_form_marks_the_selected_options() {
	let recommender = test_recommender();
	let mut values = FormValues::default();
	values.soil_type = "Loamy".to_owned();
	let form = render_form(&recommender, &values);
	assert!(form.contains(r#"<select name="Soil Type">"#));
	assert!(form.contains("<option selected>Loamy</option>"));
	assert!(form.contains("<option>Black</option>"));
	assert!(form.contains(r#"name="Temperature""#));
}

#[test]
fn test_render_page_shows_the_recommendation() {
	let recommender = test_recommender();
	let values = FormValues::default();
	let outcome = Outcome::Recommendation(Recommendation {
		code: "Urea".to_owned(),
		name: "Urea".to_owned(),
		description: "Highly concentrated nitrogen fertilizer that boosts leaf and stem growth."
			.to_owned(),
	});
	let page = render_page(&recommender, &values, Some(&outcome));
	assert!(page.contains("Smart Fertilizer Recommendation System"));
	assert!(page.contains(r#"<p class="code">Urea</p>"#));
	assert!(page.contains("boosts leaf and stem growth"));
	assert!(page.contains("Environmental Conditions"));
}

#[test]
fn test_render_page_shows_the_error_box() {
	let recommender = test_recommender();
	let values = FormValues::default();
	let outcome = Outcome::Error("unknown Soil Type \"Peat\"".to_owned());
	let page = render_page(&recommender, &values, Some(&outcome));
	assert!(page.contains("Error getting recommendation: unknown Soil Type &quot;Peat&quot;"));
}

#[test]
fn test_form_values_require_every_field() {
	let names = ColumnNames::default();
	let mut search_params = BTreeMap::new();
	search_params.insert("Temperature".to_owned(), "30".to_owned());
	assert!(FormValues::from_search_params(&search_params, &names).is_none());
}

#[test]
fn test_escape() {
	assert_eq!(
		escape(r#"<Dap & "Urea">"#),
		"&lt;Dap &amp; &quot;Urea&quot;&gt;"
	);
}
