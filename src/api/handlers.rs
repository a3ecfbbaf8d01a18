use crate::error::BoqError;
use crate::models::{PricedItem, RowDiagnostic};
use crate::service::EstimationService;
use axum::{
    extract::{rejection::PathRejection, Json, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bigdecimal::BigDecimal;
use serde::Serialize;
use std::sync::Arc;

/// 上传表单中的文件字段名
const FILE_FIELD: &str = "file";

/// 响应体
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<PricedItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_total: Option<BigDecimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped_rows: Option<Vec<RowDiagnostic>>,
}

impl EstimateResponse {
    fn failure(error: &BoqError) -> Self {
        Self {
            success: false,
            message: format!("Error: {}", error),
            items: None,
            project_total: None,
            skipped_rows: None,
        }
    }
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 上传清单表格并估价
pub async fn upload_boq(
    State(service): State<Arc<EstimationService>>,
    project_id: std::result::Result<Path<i64>, PathRejection>,
    multipart: Multipart,
) -> Response {
    let project_id = match project_id {
        Ok(Path(id)) => id,
        Err(rejection) => {
            let e = BoqError::InvalidProjectId(rejection.body_text());
            tracing::warn!("Upload rejected: {}", e);
            return (StatusCode::BAD_REQUEST, Json(EstimateResponse::failure(&e))).into_response();
        }
    };

    let outcome = match read_file_field(multipart).await {
        Ok(bytes) => service.process_upload(project_id, &bytes).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(result) => {
            let response = EstimateResponse {
                success: true,
                message: format!(
                    "Priced {} items ({} rows skipped)",
                    result.items.len(),
                    result.skipped_rows.len()
                ),
                items: Some(result.items),
                project_total: Some(result.project_total),
                skipped_rows: Some(result.skipped_rows),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            let status = if e.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            tracing::warn!("Project {} upload failed: {}", project_id, e);
            (status, Json(EstimateResponse::failure(&e))).into_response()
        }
    }
}

async fn read_file_field(mut multipart: Multipart) -> Result<Vec<u8>, BoqError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| BoqError::Workbook(format!("invalid upload: {}", e)))?
    {
        if field.name() == Some(FILE_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| BoqError::Workbook(format!("invalid upload: {}", e)))?;
            return Ok(bytes.to_vec());
        }
    }
    Err(BoqError::MissingFile)
}
