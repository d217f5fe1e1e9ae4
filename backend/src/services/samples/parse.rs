//! `POST /api/samples/parse`: parses one instrument export on the blocking
//! pool and returns the `ParsedSample` as JSON.

use crate::report::parse_sample;
use actix_web::{web, HttpResponse, Responder};
use common::model::sample::SampleInput;
use common::requests::ParseSampleRequest;
use std::path::PathBuf;

pub(crate) async fn process(payload: web::Json<ParseSampleRequest>) -> impl Responder {
    let request = payload.into_inner();
    if request.txt_path.trim().is_empty() {
        return HttpResponse::BadRequest().body("txt_path must not be empty");
    }

    let input = SampleInput {
        name: request.txt_path.clone(),
        txt_path: PathBuf::from(request.txt_path.trim()),
        pdf_path: request
            .pdf_path
            .map(|path| path.trim().to_string())
            .filter(|path| !path.is_empty())
            .map(PathBuf::from),
        ..Default::default()
    };

    match web::block(move || parse_sample(&input)).await {
        Ok(Ok(parsed)) => HttpResponse::Ok().json(parsed),
        Ok(Err(err)) => {
            log::warn!("Sample parse failed: {}", err);
            HttpResponse::UnprocessableEntity().body(err.to_string())
        }
        Err(err) => HttpResponse::InternalServerError().body(format!("Task join error: {}", err)),
    }
}
