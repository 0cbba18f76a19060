pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::middlewares::RequireJWT;
use crate::models::assessments::entities::Assessment;
use crate::models::assessments::requests::{
    AssessmentListQuery, CreateAssessmentRequest, UpdateAssessmentRequest, UpdateTotalMarkRequest,
};
use crate::models::markers::entities::{Marker, MarkerRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub struct AssessmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl AssessmentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    // 列出阅卷人参与的考核
    pub async fn list_assessments(
        &self,
        request: &HttpRequest,
        query: AssessmentListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_assessments(self, request, query).await
    }

    // 列出所有考核（管理员）
    pub async fn list_all_assessments(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_all_assessments(self, request).await
    }

    // 列出考核下的提交
    pub async fn list_submissions(
        &self,
        request: &HttpRequest,
        assessment_id: i64,
    ) -> ActixResult<HttpResponse> {
        list::list_submissions(self, request, assessment_id).await
    }

    pub async fn create_assessment(
        &self,
        request: &HttpRequest,
        create_request: CreateAssessmentRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_assessment(self, request, create_request).await
    }

    // 获取考核详情
    pub async fn get_assessment(
        &self,
        request: &HttpRequest,
        assessment_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_assessment(self, request, assessment_id).await
    }

    // 下载备忘录
    pub async fn get_memorandum(
        &self,
        request: &HttpRequest,
        assessment_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_memorandum(self, request, assessment_id).await
    }

    pub async fn update_assessment(
        &self,
        request: &HttpRequest,
        assessment_id: i64,
        update_request: UpdateAssessmentRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_assessment(self, request, assessment_id, update_request).await
    }

    // 调整满分
    pub async fn update_total_mark(
        &self,
        request: &HttpRequest,
        assessment_id: i64,
        update_request: UpdateTotalMarkRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_total_mark(self, request, assessment_id, update_request).await
    }

    // 刷新提交计数
    pub async fn recalculate(
        &self,
        request: &HttpRequest,
        assessment_id: i64,
    ) -> ActixResult<HttpResponse> {
        update::recalculate(self, request, assessment_id).await
    }

    pub async fn delete_assessment(
        &self,
        request: &HttpRequest,
        assessment_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_assessment(self, request, assessment_id).await
    }
}

/// 当前登录的阅卷人，缺失时返回 401 响应
pub(crate) fn current_marker(request: &HttpRequest) -> Result<Marker, HttpResponse> {
    RequireJWT::extract_marker(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized: missing marker",
        ))
    })
}

/// 管理员可管理所有考核，讲师只能管理自己负责或主持的考核
pub(crate) fn check_manage_permission(
    marker: &Marker,
    assessment: &Assessment,
) -> Result<(), HttpResponse> {
    let allowed = match marker.marker_role {
        MarkerRole::Admin => true,
        MarkerRole::Lecturer => {
            assessment.lecturer_email == marker.marker_email
                || assessment.mod_email.contains(&marker.marker_email)
        }
        MarkerRole::Demi => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "You do not have permission to manage this assessment",
        )))
    }
}

/// 加载考核并校验管理权限
pub(crate) async fn load_managed_assessment(
    storage: &Arc<dyn Storage>,
    request: &HttpRequest,
    assessment_id: i64,
) -> Result<Assessment, HttpResponse> {
    let marker = current_marker(request)?;

    let assessment = match storage.get_assessment_by_id(assessment_id).await {
        Ok(Some(assessment)) => assessment,
        Ok(None) => {
            return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AssessmentNotFound,
                "Assessment not found",
            )));
        }
        Err(e) => {
            return Err(crate::models::common::response::storage_error_response(
                &e,
                ErrorCode::AssessmentNotFound,
                ErrorCode::InternalServerError,
            ));
        }
    };

    check_manage_permission(&marker, &assessment)?;
    Ok(assessment)
}
