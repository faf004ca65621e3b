use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::core::middleware::INTERNAL_TOKEN_HEADER;
use crate::features::activity_logs::{
    dtos as activity_dtos, handlers as activity_handlers, models as activity_models,
};
use crate::features::notifications::{
    dtos as notifications_dtos, handlers as notifications_handlers,
    models as notifications_models,
};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::shared::geo::GeoPoint;
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Reports
        reports_handlers::submit_report,
        reports_handlers::list_recent_reports,
        reports_handlers::list_nearby_reports,
        reports_handlers::get_report,
        reports_handlers::update_report_status,
        reports_handlers::list_user_reports,
        // Activity
        activity_handlers::list_report_activity,
        // Notifications
        notifications_handlers::send_notification,
        notifications_handlers::send_batch,
        notifications_handlers::subscribe,
        notifications_handlers::unsubscribe,
        notifications_handlers::send_traffic_alert,
        notifications_handlers::send_weather_alert,
        // Internal
        reports_handlers::process_report,
        reports_handlers::list_stale_reports,
    ),
    components(
        schemas(
            Meta,
            GeoPoint,
            // Reports
            reports_models::ReportStatus,
            reports_models::ReportPriority,
            reports_models::ReportCategory,
            reports_models::Department,
            reports_models::Sentiment,
            reports_models::Severity,
            reports_models::MediaAnalysis,
            reports_models::AnalysisResult,
            reports_models::GeocodingSource,
            reports_models::LocationEnrichment,
            reports_models::EnrichedLocation,
            reports_models::SubmittedLocation,
            reports_models::ReportSubmission,
            reports_dtos::ReportResponseDto,
            reports_dtos::SubmitReportResponseDto,
            reports_dtos::NearbyReportDto,
            reports_dtos::UpdateReportStatusDto,
            reports_dtos::ProcessingOutcomeDto,
            ApiResponse<reports_dtos::ReportResponseDto>,
            ApiResponse<Vec<reports_dtos::ReportResponseDto>>,
            ApiResponse<reports_dtos::SubmitReportResponseDto>,
            ApiResponse<Vec<reports_dtos::NearbyReportDto>>,
            ApiResponse<reports_dtos::ProcessingOutcomeDto>,
            // Activity
            activity_models::ActivityAction,
            activity_dtos::ActivityLogResponseDto,
            ApiResponse<Vec<activity_dtos::ActivityLogResponseDto>>,
            // Notifications
            notifications_models::NotificationMessage,
            notifications_models::BatchItem,
            notifications_models::BatchItemResult,
            notifications_models::BatchSummary,
            notifications_models::SubscriptionPreferences,
            notifications_models::TrafficAlert,
            notifications_models::AlertSeverity,
            notifications_models::WeatherAlert,
            notifications_dtos::SendNotificationDto,
            notifications_dtos::BatchNotificationDto,
            notifications_dtos::SubscribeDto,
            notifications_dtos::UnsubscribeDto,
            notifications_dtos::TrafficAlertDto,
            notifications_dtos::WeatherAlertDto,
            notifications_dtos::MulticastReceiptDto,
            notifications_dtos::MessageIdDto,
            notifications_dtos::SubscriptionResponseDto,
            ApiResponse<notifications_dtos::MulticastReceiptDto>,
            ApiResponse<notifications_dtos::MessageIdDto>,
            ApiResponse<notifications_dtos::SubscriptionResponseDto>,
            ApiResponse<notifications_models::BatchSummary>,
        )
    ),
    tags(
        (name = "reports", description = "Citizen report intake and queries"),
        (name = "activity", description = "Report audit trail"),
        (name = "notifications", description = "Push notifications, subscriptions and alerts"),
        (name = "internal", description = "Internal triggers (shared token)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "CivicPulse API",
        version = "0.1.0",
        description = "API documentation for CivicPulse",
    )
)]
pub struct ApiDoc;

/// Adds the internal token security scheme to the OpenAPI document
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "internal_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(INTERNAL_TOKEN_HEADER))),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
