//! HTTP 层端到端测试：内存 SQLite + 完整路由

use std::sync::Arc;

use actix_web::{App, http::StatusCode, test, web};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database};
use serde_json::{Value, json};

use rust_maat_next::cache::{MokaCacheWrapper, ObjectCache};
use rust_maat_next::routes;
use rust_maat_next::runtime::lifetime::startup::{DEFAULT_ADMIN_EMAIL, seed_admin};
use rust_maat_next::storage::Storage;
use rust_maat_next::storage::sea_orm_storage::{SeaOrmStorage, StorageOptions};
use rust_maat_next::utils::json_error_handler;

const ADMIN_PASSWORD: &str = "Admin12345";
const PDF: &[u8] = b"%PDF-1.4 student work";

async fn setup() -> (Arc<dyn Storage>, Arc<dyn ObjectCache>) {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let storage: Arc<dyn Storage> =
        Arc::new(SeaOrmStorage::from_connection(db, StorageOptions::default()));
    seed_admin(&storage, Some(ADMIN_PASSWORD.to_string()))
        .await
        .unwrap();

    let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(100, 60).unwrap());
    (storage, cache)
}

macro_rules! init_app {
    ($storage:expr, $cache:expr) => {
        test::init_service(
            App::new()
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .app_data(web::Data::new($storage.clone()))
                .app_data(web::Data::new($cache.clone()))
                .configure(routes::configure_api_routes),
        )
        .await
    };
}

macro_rules! login {
    ($app:expr, $email:expr, $password:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "marker_email": $email, "password": $password }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        body["data"]["access_token"]
            .as_str()
            .expect("login should return a token")
            .to_string()
    }};
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

#[actix_web::test]
async fn test_login_rejects_wrong_password_and_missing_token() {
    let (storage, cache) = setup().await;
    let app = init_app!(storage, cache);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "marker_email": DEFAULT_ADMIN_EMAIL, "password": "wrong-pass1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/v1/assessments")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let token = login!(app, DEFAULT_ADMIN_EMAIL, ADMIN_PASSWORD);
    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["marker_role"], "Admin");
    assert!(body["data"].get("password_hash").is_none());
}

#[actix_web::test]
async fn test_demi_cannot_create_assessment() {
    let (storage, cache) = setup().await;
    let app = init_app!(storage, cache);
    let admin = login!(app, DEFAULT_ADMIN_EMAIL, ADMIN_PASSWORD);

    let req = test::TestRequest::post()
        .uri("/api/v1/markers/demis")
        .insert_header(bearer(&admin))
        .set_json(json!({
            "marker_email": "demi@mandela.ac.za",
            "name": "Sipho",
            "surname": "Dlamini",
            "password": "Demi12345"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let demi = login!(app, "demi@mandela.ac.za", "Demi12345");
    let req = test::TestRequest::post()
        .uri("/api/v1/assessments")
        .insert_header(bearer(&demi))
        .set_json(json!({
            "assessment_name": "Practical 1",
            "module_code": "WRAV301",
            "total_mark": 100.0,
            "assessment_type": "Practical"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_assessment_lifecycle() {
    let (storage, cache) = setup().await;
    let app = init_app!(storage, cache);
    let token = login!(app, DEFAULT_ADMIN_EMAIL, ADMIN_PASSWORD);

    // 课程模块
    let req = test::TestRequest::post()
        .uri("/api/v1/modules")
        .insert_header(bearer(&token))
        .set_json(json!({ "module_code": "WRAV301", "module_name": "Advanced Programming" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    // 未知课程模块
    let req = test::TestRequest::post()
        .uri("/api/v1/assessments")
        .insert_header(bearer(&token))
        .set_json(json!({
            "assessment_name": "Practical 1",
            "module_code": "NOPE101",
            "total_mark": 100.0,
            "assessment_type": "Practical"
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    // 创建考核
    let req = test::TestRequest::post()
        .uri("/api/v1/assessments")
        .insert_header(bearer(&token))
        .set_json(json!({
            "lecturer_email": "lecturer@mandela.ac.za",
            "marker_email": ["demi@mandela.ac.za"],
            "assessment_name": "Practical 1",
            "module_code": "WRAV301",
            "memorandum": b"%PDF-1.4 memo".to_vec(),
            "mod_email": ["moderator@mandela.ac.za"],
            "total_mark": 100.0,
            "assessment_type": "Practical"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let assessment_id = body["data"]["assessment_id"].as_i64().unwrap();

    // 备忘录以原始 PDF 返回
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/assessments/{assessment_id}/memorandum"))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("content-type").unwrap(), "application/pdf");
    assert_eq!(test::read_body(resp).await.as_ref(), b"%PDF-1.4 memo");

    // 新增提交并批改
    let req = test::TestRequest::post()
        .uri("/api/v1/submissions")
        .insert_header(bearer(&token))
        .set_json(json!({
            "assessment_id": assessment_id,
            "student_num": "s221234567",
            "student_name": "Thandi",
            "student_surname": "Nkosi",
            "submission_pdf": PDF.to_vec()
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let submission_id = body["data"]["submission_id"].as_i64().unwrap();

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/submissions/{submission_id}/mark"))
        .insert_header(bearer(&token))
        .set_json(json!({ "submission_mark": 40.0 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/submissions/{submission_id}/status"))
        .insert_header(bearer(&token))
        .set_json(json!({ "submission_status": "Marked" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // 批改后的 PDF 通过 multipart 上传
    let multipart_body = [
        b"--BOUNDARY\r\nContent-Disposition: form-data; name=\"file\"; filename=\"marked.pdf\"\r\nContent-Type: application/pdf\r\n\r\n".as_slice(),
        b"%PDF-1.4 marked",
        b"\r\n--BOUNDARY--\r\n",
    ]
    .concat();
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/submissions/{submission_id}/marked-pdf"))
        .insert_header(bearer(&token))
        .insert_header(("Content-Type", "multipart/form-data; boundary=BOUNDARY"))
        .set_payload(multipart_body)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/submissions/{submission_id}/marked-pdf"))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(test::read_body(resp).await.as_ref(), b"%PDF-1.4 marked");

    // 满分 100 -> 50，40 分变为 80 分
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/assessments/{assessment_id}/total-mark"))
        .insert_header(bearer(&token))
        .set_json(json!({ "total_mark": 50.0 }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["updated"], 1);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/assessments/{assessment_id}/submissions"))
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["items"][0]["submission_mark"], 80.0);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/assessments/{assessment_id}"))
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["total_num_submissions"], 1);
    assert_eq!(body["data"]["num_submissions_marked"], 1);
    assert_eq!(body["data"]["marker_email"], json!(["demi@mandela.ac.za"]));

    // 级联删除
    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/assessments/{assessment_id}"))
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/assessments/{assessment_id}"))
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    assert!(storage.get_submission_by_id(submission_id).await.unwrap().is_none());
}

#[actix_web::test]
async fn test_invalid_path_id_is_bad_request() {
    let (storage, cache) = setup().await;
    let app = init_app!(storage, cache);
    let token = login!(app, DEFAULT_ADMIN_EMAIL, ADMIN_PASSWORD);

    let req = test::TestRequest::get()
        .uri("/api/v1/assessments/abc")
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}
