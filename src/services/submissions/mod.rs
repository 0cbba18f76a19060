pub mod create;
pub mod pdf;
pub mod questions;
pub mod update;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::assessments::entities::Assessment;
use crate::models::common::response::storage_error_response;
use crate::models::markers::entities::{Marker, MarkerRole};
use crate::models::questions::requests::SetQuestionMarkRequest;
use crate::models::submissions::entities::Submission;
use crate::models::submissions::requests::{
    CreateSubmissionRequest, UpdateSubmissionMarkRequest, UpdateSubmissionRequest,
    UpdateSubmissionStatusRequest,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::assessments::current_marker;
use crate::storage::Storage;

pub struct SubmissionService {
    storage: Option<Arc<dyn Storage>>,
}

impl SubmissionService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn create_submission(
        &self,
        request: &HttpRequest,
        create_request: CreateSubmissionRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_submission(self, request, create_request).await
    }

    // 编辑提交
    pub async fn update_submission(
        &self,
        request: &HttpRequest,
        submission_id: i64,
        update_request: UpdateSubmissionRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_submission(self, request, submission_id, update_request).await
    }

    // 修改提交状态
    pub async fn update_status(
        &self,
        request: &HttpRequest,
        submission_id: i64,
        update_request: UpdateSubmissionStatusRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_status(self, request, submission_id, update_request).await
    }

    // 修改提交分数
    pub async fn update_mark(
        &self,
        request: &HttpRequest,
        submission_id: i64,
        update_request: UpdateSubmissionMarkRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_mark(self, request, submission_id, update_request).await
    }

    // 下载学生提交的 PDF
    pub async fn get_submission_pdf(
        &self,
        request: &HttpRequest,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        pdf::get_submission_pdf(self, request, submission_id).await
    }

    // 下载批改后的 PDF
    pub async fn get_marked_pdf(
        &self,
        request: &HttpRequest,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        pdf::get_marked_pdf(self, request, submission_id).await
    }

    // 上传批改后的 PDF
    pub async fn upload_marked_pdf(
        &self,
        request: &HttpRequest,
        submission_id: i64,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        pdf::upload_marked_pdf(self, request, submission_id, payload).await
    }

    pub async fn list_question_marks(
        &self,
        request: &HttpRequest,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        questions::list_question_marks(self, request, submission_id).await
    }

    pub async fn set_question_mark(
        &self,
        request: &HttpRequest,
        submission_id: i64,
        set_request: SetQuestionMarkRequest,
    ) -> ActixResult<HttpResponse> {
        questions::set_question_mark(self, request, submission_id, set_request).await
    }
}

/// 管理员、讲师、主持人与名单中的阅卷人可以批改
pub(crate) fn can_mark(marker: &Marker, assessment: &Assessment) -> bool {
    marker.marker_role == MarkerRole::Admin
        || assessment.lecturer_email == marker.marker_email
        || assessment.mod_email.contains(&marker.marker_email)
        || assessment.marker_email.contains(&marker.marker_email)
}

/// 加载提交及其考核，并校验当前阅卷人的批改权限
pub(crate) async fn load_markable_submission(
    storage: &Arc<dyn Storage>,
    request: &HttpRequest,
    submission_id: i64,
) -> Result<(Submission, Assessment), HttpResponse> {
    let marker = current_marker(request)?;

    let submission = match storage.get_submission_by_id(submission_id).await {
        Ok(Some(submission)) => submission,
        Ok(None) => return Err(submission_not_found()),
        Err(e) => {
            return Err(storage_error_response(
                &e,
                ErrorCode::SubmissionNotFound,
                ErrorCode::InternalServerError,
            ));
        }
    };

    let assessment = match storage.get_assessment_by_id(submission.assessment_id).await {
        Ok(Some(assessment)) => assessment,
        Ok(None) => {
            return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AssessmentNotFound,
                "Assessment not found",
            )));
        }
        Err(e) => {
            return Err(storage_error_response(
                &e,
                ErrorCode::AssessmentNotFound,
                ErrorCode::InternalServerError,
            ));
        }
    };

    if !can_mark(&marker, &assessment) {
        return Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "You are not a marker on this assessment",
        )));
    }

    Ok((submission, assessment))
}

pub(crate) fn submission_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::SubmissionNotFound,
        "Submission not found",
    ))
}
