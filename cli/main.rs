//! This module contains the main entrypoint to the agron cli.

use agron_core::progress::Progress;
use anyhow::Result;
use clap::Clap;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Clap)]
#[clap(
	about = "Recommend fertilizers from soil, crop, and weather readings.",
	setting = clap::AppSettings::DisableHelpSubcommand,
)]
enum Options {
	#[clap(name = "train")]
	Train(Box<TrainOptions>),
	#[clap(name = "recommend")]
	Recommend(Box<RecommendOptions>),
	#[clap(name = "app")]
	App(Box<AppOptions>),
}

#[derive(Clap)]
#[clap(about = "train a recommender")]
#[clap(long_about = "train a recommender from a csv file and report its test metrics")]
struct TrainOptions {
	#[clap(
		short,
		long,
		about = "the path to your .csv file",
		default_value = "data/fertilizers.csv"
	)]
	file: PathBuf,
	#[clap(short, long, about = "the path to a config file")]
	config: Option<PathBuf>,
}

#[derive(Clap)]
#[clap(about = "recommend a fertilizer")]
#[clap(long_about = "train a recommender from a csv file and recommend a fertilizer for one reading")]
struct RecommendOptions {
	#[clap(
		short,
		long,
		about = "the path to your .csv file",
		default_value = "data/fertilizers.csv"
	)]
	file: PathBuf,
	#[clap(short, long, about = "the path to a config file")]
	config: Option<PathBuf>,
	#[clap(long, about = "the temperature in °C")]
	temperature: f32,
	#[clap(long, about = "the air humidity in percent")]
	humidity: f32,
	#[clap(long, about = "the soil moisture in percent")]
	moisture: f32,
	#[clap(long, about = "the soil type")]
	soil_type: String,
	#[clap(long, about = "the crop type")]
	crop_type: String,
	#[clap(long, about = "the nitrogen level")]
	nitrogen: f32,
	#[clap(long, about = "the phosphorus level")]
	phosphorus: f32,
	#[clap(long, about = "the potassium level")]
	potassium: f32,
}

#[derive(Clap)]
#[clap(about = "run the app")]
#[clap(long_about = "run the fertilizer recommender web app")]
struct AppOptions {
	#[clap(
		short,
		long,
		about = "the path to your .csv file",
		default_value = "data/fertilizers.csv"
	)]
	file: PathBuf,
	#[clap(short, long, about = "the path to a config file")]
	config: Option<PathBuf>,
	#[clap(long, default_value = "0.0.0.0")]
	host: std::net::IpAddr,
	#[clap(long, env = "PORT", default_value = "8080")]
	port: u16,
}

fn main() {
	let options = Options::parse();
	let result = match options {
		Options::Train(options) => cli_train(*options),
		Options::Recommend(options) => cli_recommend(*options),
		Options::App(options) => cli_app(*options),
	};
	if let Err(error) = result {
		eprintln!("{}: {}", "error".red().bold(), error);
		std::process::exit(1);
	}
}

fn cli_train(options: TrainOptions) -> Result<()> {
	let output =
		agron_core::train(&options.file, options.config.as_deref(), &mut update_progress)?;
	println!("test accuracy: {:.3}", output.test_metrics.accuracy);
	println!(
		"baseline accuracy: {:.3}",
		output.test_metrics.baseline_accuracy
	);
	println!();
	for (class, class_metrics) in output
		.recommender
		.classes()
		.iter()
		.zip(output.test_metrics.class_metrics.iter())
	{
		println!(
			"{}: precision {:.3} recall {:.3} f1 {:.3}",
			class, class_metrics.precision, class_metrics.recall, class_metrics.f1_score,
		);
	}
	Ok(())
}

fn cli_recommend(options: RecommendOptions) -> Result<()> {
	let output =
		agron_core::train(&options.file, options.config.as_deref(), &mut update_progress)?;
	let input = agron_core::RecommendInput {
		temperature: options.temperature,
		humidity: options.humidity,
		moisture: options.moisture,
		soil_type: options.soil_type,
		crop_type: options.crop_type,
		nitrogen: options.nitrogen,
		phosphorus: options.phosphorus,
		potassium: options.potassium,
	};
	let recommendation = output.recommender.recommend(&input)?;
	println!("{}", recommendation.code);
	println!("{}", recommendation.name);
	println!("{}", recommendation.description);
	Ok(())
}

fn cli_app(options: AppOptions) -> Result<()> {
	agron_app::run(agron_app::Options {
		config: options.config,
		file: options.file,
		host: options.host,
		port: options.port,
	})
}

fn update_progress(progress: Progress) {
	match progress {
		Progress::Loading(_) => eprintln!("loading"),
		Progress::Shuffling => eprintln!("shuffling"),
		Progress::Training(_) => eprintln!("training"),
		Progress::Testing(_) => eprintln!("testing"),
	}
}
