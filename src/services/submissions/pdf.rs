use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header};
use futures_util::TryStreamExt;
use futures_util::stream::StreamExt;
use tracing::info;

use super::{SubmissionService, load_markable_submission};
use crate::config::AppConfig;
use crate::models::common::response::storage_error_response;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::is_pdf;

const FILE_FIELD: &str = "file";

fn pdf_response(pdf: Vec<u8>, filename: String) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "application/pdf"))
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{filename}\""),
        ))
        .body(pdf)
}

pub async fn get_submission_pdf(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let (submission, _) = match load_markable_submission(&storage, request, submission_id).await {
        Ok(loaded) => loaded,
        Err(resp) => return Ok(resp),
    };

    match storage.get_submission_pdf(submission_id).await {
        Ok(Some(pdf)) => Ok(pdf_response(
            pdf,
            format!("{}.pdf", submission.student_num),
        )),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SubmissionPdfNotFound,
            "Submission has no PDF",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::SubmissionNotFound,
            ErrorCode::InternalServerError,
        )),
    }
}

pub async fn get_marked_pdf(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let (submission, _) = match load_markable_submission(&storage, request, submission_id).await {
        Ok(loaded) => loaded,
        Err(resp) => return Ok(resp),
    };

    match storage.get_marked_submission_pdf(submission_id).await {
        Ok(Some(pdf)) => Ok(pdf_response(
            pdf,
            format!("{}-marked.pdf", submission.student_num),
        )),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SubmissionPdfNotFound,
            "Submission has not been marked yet",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::SubmissionNotFound,
            ErrorCode::InternalServerError,
        )),
    }
}

pub async fn upload_marked_pdf(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
    mut payload: Multipart,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Err(resp) = load_markable_submission(&storage, request, submission_id).await {
        return Ok(resp);
    }

    let max_size = AppConfig::get().upload.max_size;
    let mut pdf: Option<Vec<u8>> = None;

    while let Ok(Some(mut field)) = payload.try_next().await {
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        if name != FILE_FIELD {
            continue;
        }
        if pdf.is_some() {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                "Only one file can be uploaded at a time",
            )));
        }

        let mut buf = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk?;
            if buf.len() + data.len() > max_size {
                return Ok(HttpResponse::PayloadTooLarge().json(ApiResponse::error_empty(
                    ErrorCode::FileSizeExceeded,
                    "File size exceeds the limit",
                )));
            }
            buf.extend_from_slice(&data);
        }
        pdf = Some(buf);
    }

    let Some(pdf) = pdf else {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::FileNotFound,
            "No file found in upload payload",
        )));
    };

    // 校验魔术字节
    if !is_pdf(&pdf) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::FileTypeNotAllowed,
            "Marked submission must be a PDF document",
        )));
    }

    let size = pdf.len();
    match storage.upload_marked_submission(submission_id, pdf).await {
        Ok(()) => {
            info!(
                "Marked PDF ({} bytes) stored for submission {}",
                size, submission_id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Marked submission uploaded successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::SubmissionNotFound,
            ErrorCode::SubmissionUpdateFailed,
        )),
    }
}
