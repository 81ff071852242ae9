use crate::sketch_file::{SketchError, SketchStore};
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde::Deserialize;

impl ResponseError for SketchError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidName(_) | Self::InvalidImage(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Io(err) => {
                log::error!("Sketch storage failure: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

pub fn configure_sketch_handlers(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/sketches")
            .route(web::post().to(save))
            .route(web::get().to(list)),
    )
    .service(web::resource("/sketches/{name}").route(web::get().to(show)));
}

#[derive(Deserialize)]
pub struct SaveSketchBody {
    name: String,
    #[serde(alias = "imageBytes")]
    sketch: String,
}

async fn save(
    store: web::Data<SketchStore>,
    body: web::Json<SaveSketchBody>,
) -> Result<HttpResponse, SketchError> {
    store.save(&body.name, &body.sketch).await?;
    Ok(HttpResponse::Ok().body("Sketch saved successfully."))
}

async fn list(store: web::Data<SketchStore>) -> Result<HttpResponse, SketchError> {
    let names = store.list().await?;
    log::debug!("Fetched sketches: {:?}", names);
    Ok(HttpResponse::Ok().json(names))
}

async fn show(
    store: web::Data<SketchStore>,
    name: web::Path<String>,
) -> Result<HttpResponse, SketchError> {
    let bytes = store.read(&name).await?;
    Ok(HttpResponse::Ok().content_type("image/png").body(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use whiteboard_system::serde_json::json;

    const PIXEL: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[actix_rt::test]
    async fn it_serves_saved_sketches() {
        let dir = tempfile::tempdir().expect("");
        let mut app = test::init_service(
            App::new()
                .data(SketchStore::new(dir.path()))
                .configure(configure_sketch_handlers),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/sketches")
            .set_json(&json!({
                "name": "art",
                "sketch": format!("data:image/png;base64,{}", PIXEL),
            }))
            .to_request();
        let resp = test::call_service(&mut app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/sketches").to_request();
        let names: Vec<String> = test::read_response_json(&mut app, req).await;
        assert_eq!(names, vec!["art"]);

        let req = test::TestRequest::get().uri("/sketches/art.png").to_request();
        let resp = test::call_service(&mut app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert_eq!(&body[1..4], b"PNG");
    }

    #[actix_rt::test]
    async fn it_maps_errors_to_statuses() {
        let dir = tempfile::tempdir().expect("");
        let mut app = test::init_service(
            App::new()
                .data(SketchStore::new(dir.path()))
                .configure(configure_sketch_handlers),
        )
        .await;

        let req = test::TestRequest::get().uri("/sketches/missing").to_request();
        let resp = test::call_service(&mut app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri("/sketches")
            .set_json(&json!({ "name": ".hidden", "imageBytes": PIXEL }))
            .to_request();
        let resp = test::call_service(&mut app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/sketches")
            .set_json(&json!({ "name": "art", "sketch": "%%%" }))
            .to_request();
        let resp = test::call_service(&mut app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
