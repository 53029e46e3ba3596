use self::error::Error;
use agron_core::progress::Progress;
use anyhow::Result;
use hyper::{Body, Method, Request, Response, StatusCode};
use std::{borrow::Cow, collections::BTreeMap, path::PathBuf, sync::Arc};

mod error;
mod pages;

pub struct Options {
	pub config: Option<PathBuf>,
	pub file: PathBuf,
	pub host: std::net::IpAddr,
	pub port: u16,
}

pub struct Context {
	pub recommender: agron_core::Recommender,
}

async fn handle(context: Arc<Context>, request: Request<Body>) -> Response<Body> {
	let method = request.method().clone();
	let uri = request.uri().clone();
	let path_and_query = uri.path_and_query().unwrap();
	let path = path_and_query.path();
	let query = path_and_query.query();
	let path_components: Vec<_> = path.split('/').skip(1).collect();
	let search_params: Option<BTreeMap<String, String>> = query.map(|search_params| {
		url::form_urlencoded::parse(search_params.as_bytes())
			.into_owned()
			.collect()
	});
	let result = match (&method, path_components.as_slice()) {
		(&Method::GET, &["health"]) => self::pages::health::get(&context, request).await,
		(&Method::GET, &[""]) => self::pages::index::get(&context, request, search_params).await,
		_ => Err(Error::NotFound.into()),
	};
	let response = match result {
		Ok(response) => response,
		Err(error) => {
			if let Some(error) = error.downcast_ref::<Error>() {
				match error {
					Error::BadRequest => Response::builder()
						.status(StatusCode::BAD_REQUEST)
						.body(Body::from("bad request"))
						.unwrap(),
					Error::NotFound => Response::builder()
						.status(StatusCode::NOT_FOUND)
						.body(Body::from("not found"))
						.unwrap(),
				}
			} else {
				eprintln!("{}", error);
				let body: Cow<str> = if cfg!(debug_assertions) {
					format!("{}", error).into()
				} else {
					"internal server error".into()
				};
				Response::builder()
					.status(StatusCode::INTERNAL_SERVER_ERROR)
					.body(Body::from(body))
					.unwrap()
			}
		}
	};
	eprintln!("{} {} {}", method, path, response.status());
	response
}

pub fn run(options: Options) -> Result<()> {
	tokio::runtime::Builder::new()
		.threaded_scheduler()
		.enable_all()
		.build()
		.unwrap()
		.block_on(run_impl(options))
}

async fn run_impl(options: Options) -> Result<()> {
	// train the recommender before accepting any requests
	let output = agron_core::train(&options.file, options.config.as_deref(), &mut |progress| {
		match progress {
			Progress::Loading(_) => eprintln!("loading {}", options.file.display()),
			Progress::Shuffling => eprintln!("shuffling"),
			Progress::Training(_) => eprintln!("training"),
			Progress::Testing(_) => eprintln!("testing"),
		}
	})?;
	eprintln!(
		"test accuracy {:.1}%",
		output.test_metrics.accuracy * 100.0
	);
	let context = Context {
		recommender: output.recommender,
	};
	agron_util::serve(options.host, options.port, context, handle).await?;
	Ok(())
}
