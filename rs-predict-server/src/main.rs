use std::path::PathBuf;
use std::sync::RwLock;

use actix_cors::Cors;
use actix_web::{get, middleware, put, web, App, HttpResponse, HttpServer, Responder};

use clap::Parser;
use serde::{Deserialize, Serialize};
use rs_predict_core::error::PredictionError;
use rs_predict_core::loader::list_languages;
use rs_predict_core::model::prediction_model::{Language, ModelConfig, PredictionModel};

/// Command line arguments of the prediction server.
#[derive(Parser, Debug)]
#[clap(name = "rs-predict-server", version, about = "HTTP next-word prediction and completion server.")]
struct Args {
	/// Address to bind.
	#[clap(long, default_value = "127.0.0.1")]
	host: String,

	/// Port to bind.
	#[clap(short, long, default_value_t = 5000)]
	port: u16,

	/// Data root containing the `language-pack` directory.
	#[clap(short, long, default_value = "./data")]
	data: PathBuf,

	/// Language loaded at startup.
	#[clap(short, long, default_value = "en")]
	language: String,

	/// Do not initialize the model at startup (wait for `PUT /v1/initialize`).
	#[clap(long)]
	lazy: bool,
}

/// Query parameters of `/v1/predict`
#[derive(Deserialize)]
struct PredictParams {
	text: String,
	confidence: Option<bool>,
}

/// Query parameters of `/v1/complete`
#[derive(Deserialize)]
struct CompleteParams {
	prefix: String,
	confidence: Option<bool>,
}

#[derive(Deserialize)]
struct InitializeParams {
	language: Option<String>,
}

#[derive(Serialize)]
struct Status<'a> {
	initialized: bool,
	language: &'a str,
}

struct SharedData {
	model: PredictionModel,
	data_root: PathBuf,
}

/// Maps a model error to an HTTP response.
fn error_response(error: &PredictionError) -> HttpResponse {
	match error {
		PredictionError::NotInitialized => HttpResponse::Conflict().body(error.to_string()),
		PredictionError::UnsupportedLanguage(_) => HttpResponse::BadRequest().body(error.to_string()),
		_ => HttpResponse::InternalServerError().body(error.to_string()),
	}
}

/// HTTP GET endpoint `/v1/predict`
///
/// Returns the words most likely to follow `text` as a JSON array,
/// with their confidence when `confidence=true`.
#[get("/v1/predict")]
async fn get_predict(data: web::Data<RwLock<SharedData>>, query: web::Query<PredictParams>) -> impl Responder {
	let shared_data = match data.read() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let response = if query.confidence.unwrap_or(false) {
		shared_data.model.predict_next_with_confidence(&query.text).map(|r| HttpResponse::Ok().json(r))
	} else {
		shared_data.model.predict_next(&query.text).map(|r| HttpResponse::Ok().json(r))
	};
	response.unwrap_or_else(|e| error_response(&e))
}

/// HTTP GET endpoint `/v1/complete`
///
/// Returns the known words starting with `prefix` as a JSON array,
/// scored and re-ranked when `confidence=true`.
#[get("/v1/complete")]
async fn get_complete(data: web::Data<RwLock<SharedData>>, query: web::Query<CompleteParams>) -> impl Responder {
	let shared_data = match data.read() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let response = if query.confidence.unwrap_or(false) {
		shared_data.model.complete_with_confidence(&query.prefix).map(|r| HttpResponse::Ok().json(r))
	} else {
		shared_data.model.complete(&query.prefix).map(|r| HttpResponse::Ok().json(r))
	};
	response.unwrap_or_else(|e| error_response(&e))
}

#[get("/v1/status")]
async fn get_status(data: web::Data<RwLock<SharedData>>) -> impl Responder {
	let shared_data = match data.read() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().json(Status {
		initialized: shared_data.model.is_initialized(),
		language: shared_data.model.language().as_str(),
	})
}

#[get("/v1/metrics")]
async fn get_metrics(data: web::Data<RwLock<SharedData>>) -> impl Responder {
	let shared_data = match data.read() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().json(shared_data.model.metrics())
}

#[get("/v1/languages")]
async fn get_languages(data: web::Data<RwLock<SharedData>>) -> impl Responder {
	let data_root = match data.read() {
		Ok(m) => m.data_root.clone(),
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match list_languages(&data_root) {
		Ok(languages) => HttpResponse::Ok().body(languages.join("\n")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list languages"),
	}
}

#[put("/v1/initialize")]
async fn put_initialize(data: web::Data<RwLock<SharedData>>, query: web::Query<InitializeParams>) -> impl Responder {
	let language = match query.language.as_deref().map(str::trim) {
		Some(s) if !s.is_empty() => match Language::new(s) {
			Ok(language) => Some(language),
			Err(e) => return error_response(&e),
		},
		_ => None,
	};

	let mut shared_data = match data.write() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	match shared_data.model.initialize(language) {
		Ok(_) => HttpResponse::Ok().body(format!("Model initialized ({})", shared_data.model.language())),
		Err(e) => error_response(&e),
	}
}

#[put("/v1/reset")]
async fn put_reset(data: web::Data<RwLock<SharedData>>) -> impl Responder {
	let mut shared_data = match data.write() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	shared_data.model.reset();
	HttpResponse::Ok().body("Model reset")
}

/// Registers every route on an actix application.
fn configure(cfg: &mut web::ServiceConfig) {
	cfg.service(get_predict)
		.service(get_complete)
		.service(get_status)
		.service(get_metrics)
		.service(get_languages)
		.service(put_initialize)
		.service(put_reset);
}

/// Main entry point for the server.
///
/// Builds the prediction model from the language packs under `--data`,
/// wraps it in a `RwLock` (queries share the model, initialize/reset take
/// it exclusively) and starts an Actix-web HTTP server.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();
	let args = Args::parse();

	let language = Language::new(&args.language)
		.map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
	let config = ModelConfig::new(&args.data).with_language(language);
	let mut model = PredictionModel::new(config);

	if !args.lazy {
		if let Err(e) = model.initialize(None) {
			// Keep serving: the model can be initialized later through the API
			log::error!("{}", e);
		}
	}

	let shared_data = SharedData { model, data_root: args.data };
	let shared_model = web::Data::new(RwLock::new(shared_data));

	log::info!("Listening on {}:{}", args.host, args.port);
	HttpServer::new(move || {
		App::new()
			.wrap(middleware::Logger::default())
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.configure(configure)
	})
		.bind((args.host.as_str(), args.port))?
		.run()
		.await
}

#[cfg(test)]
mod tests {
	use std::fs;

	use actix_web::{http::StatusCode, test, App};
	use rs_predict_core::loader::{LANGUAGE_PACK_DIR, SENTENCE_CORPUS, WORD_CORPUS};

	use super::*;

	fn shared(root: &std::path::Path) -> web::Data<RwLock<SharedData>> {
		let pack = root.join(LANGUAGE_PACK_DIR).join("en");
		fs::create_dir_all(&pack).unwrap();
		fs::write(pack.join(SENTENCE_CORPUS), "the cat sat the cat ran").unwrap();
		fs::write(pack.join(WORD_CORPUS), "cat car cart").unwrap();

		let model = PredictionModel::new(ModelConfig::new(root));
		web::Data::new(RwLock::new(SharedData { model, data_root: root.to_path_buf() }))
	}

	#[actix_web::test]
	async fn queries_before_initialize_conflict() {
		let root = tempfile::tempdir().unwrap();
		let app = test::init_service(App::new().app_data(shared(root.path())).configure(configure)).await;

		let req = test::TestRequest::get().uri("/v1/predict?text=the").to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::CONFLICT);
	}

	#[actix_web::test]
	async fn initialize_then_query() {
		let root = tempfile::tempdir().unwrap();
		let app = test::init_service(App::new().app_data(shared(root.path())).configure(configure)).await;

		let req = test::TestRequest::put().uri("/v1/initialize").to_request();
		assert!(test::call_service(&app, req).await.status().is_success());

		let req = test::TestRequest::get().uri("/v1/predict?text=cat").to_request();
		let words: Vec<String> = test::call_and_read_body_json(&app, req).await;
		assert_eq!(words, vec!["sat", "ran"]);

		let req = test::TestRequest::get().uri("/v1/complete?prefix=ca&confidence=true").to_request();
		let results: serde_json::Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(results.as_array().map(Vec::len), Some(3));
		assert!(results[0]["confidence"].is_number());

		let req = test::TestRequest::get().uri("/v1/status").to_request();
		let status: serde_json::Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(status["initialized"], true);
		assert_eq!(status["language"], "en");

		let req = test::TestRequest::put().uri("/v1/reset").to_request();
		assert!(test::call_service(&app, req).await.status().is_success());
		let req = test::TestRequest::get().uri("/v1/complete?prefix=ca").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);
	}

	#[actix_web::test]
	async fn invalid_language_is_rejected() {
		let root = tempfile::tempdir().unwrap();
		let app = test::init_service(App::new().app_data(shared(root.path())).configure(configure)).await;

		let req = test::TestRequest::put().uri("/v1/initialize?language=..").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
	}
}
