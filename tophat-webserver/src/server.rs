//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::runtime_config::{config_from_args, service_from_config};
use actix_web::{http::header, middleware, web, App, HttpResponse, HttpServer};
use clap::ArgMatches;
use std::io;
use tophat_service::lookup_service::{LookupError, LookupService};

#[derive(Deserialize)]
pub struct LookupParams {
    /// `text` for one summary line per sheet, JSON otherwise
    format: Option<String>,
}

#[derive(Serialize)]
struct ErrorMessage {
    error: String,
}

async fn index_json(service: web::Data<LookupService>) -> HttpResponse {
    match service.index_json() {
        Ok(json) => HttpResponse::Ok()
            .content_type("application/json")
            .body(json),
        Err(e) => {
            error!("Index serialization failed: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

async fn catalog_json(service: web::Data<LookupService>) -> HttpResponse {
    match service.get_catalog_metadata() {
        Ok(json) => HttpResponse::Ok().json(json),
        Err(e) => {
            error!("Catalog metadata failed: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Sheets covering a point
/// Example: /lookup/-92.0/46.0?format=text
async fn lookup(
    service: web::Data<LookupService>,
    point: web::Path<(f64, f64)>,
    params: web::Query<LookupParams>,
) -> HttpResponse {
    let (lon, lat) = point.into_inner();
    match service.lookup(lon, lat) {
        Ok(sheets) => {
            if params.format.as_deref() == Some("text") {
                let lines: Vec<String> = sheets.iter().map(|sheet| sheet.as_text()).collect();
                HttpResponse::Ok()
                    .content_type("text/plain; charset=utf-8")
                    .body(lines.join("\n"))
            } else {
                HttpResponse::Ok().json(sheets)
            }
        }
        Err(e @ LookupError::Index(_)) => HttpResponse::BadRequest().json(ErrorMessage {
            error: e.to_string(),
        }),
        Err(e) => {
            warn!("Lookup {},{} failed: {}", lon, lat, e);
            HttpResponse::UnprocessableEntity().json(ErrorMessage {
                error: e.to_string(),
            })
        }
    }
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/index.json", web::get().to(index_json))
        .route("/catalog.json", web::get().to(catalog_json))
        .route("/lookup/{lon}/{lat}", web::get().to(lookup));
}

pub fn webserver(args: &ArgMatches) -> io::Result<()> {
    let config = config_from_args(args);
    let host = config
        .webserver
        .bind
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let port = config.webserver.port.unwrap_or(6767);
    let bind_addr = format!("{}:{}", host, port);
    let workers = config
        .webserver
        .threads
        .map(|threads| threads.max(1) as usize)
        .unwrap_or_else(num_cpus::get);
    let cache_max_age = config.webserver.cache_control_max_age.unwrap_or(300);

    let service = web::Data::new(service_from_config(&config));
    info!(
        "Serving {} maps on http://{}/ with {} workers",
        service.index.len(),
        bind_addr,
        workers
    );

    actix_web::rt::System::new().block_on(async move {
        HttpServer::new(move || {
            App::new()
                .app_data(service.clone())
                .wrap(middleware::DefaultHeaders::new().add((
                    header::CACHE_CONTROL,
                    format!("max-age={}", cache_max_age),
                )))
                .wrap(middleware::Logger::default())
                .configure(routes)
        })
        .workers(workers)
        .bind(bind_addr.as_str())?
        .shutdown_timeout(3) // default: 30s
        .run()
        .await
    })
}
