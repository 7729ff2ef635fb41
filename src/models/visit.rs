// src/models/visit.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::{IntoParams, ToSchema};

use validator::Validate;

use crate::{common::validation::validate_otp_format, status_flow};

/// Janela mínima entre duas visitas do mesmo corretor de campo.
pub const VISIT_SLOT_MINUTES: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "visit_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

status_flow!(VisitStatus {
    Pending => "pending" => [Confirmed, Cancelled],
    Confirmed => "confirmed" => [Completed, Cancelled],
    Completed => "completed" => [],
    Cancelled => "cancelled" => [],
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "interest_level", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InterestLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tour_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TourStatus {
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

status_flow!(TourStatus {
    Planned => "planned" => [InProgress, Cancelled],
    InProgress => "in_progress" => [Completed, Cancelled],
    Completed => "completed" => [],
    Cancelled => "cancelled" => [],
});

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub listing_id: Uuid,
    pub field_agent_id: Option<Uuid>,
    pub buyer_agent_id: Option<Uuid>,
    pub tour_id: Option<Uuid>,
    pub scheduled_at: DateTime<Utc>,
    pub status: VisitStatus,

    // O OTP nunca sai pela API; o comprador recebe pelo canal de notificação
    #[serde(skip_serializing)]
    pub otp_code: Option<String>,
    #[serde(skip_serializing)]
    pub otp_generated_at: Option<DateTime<Utc>>,

    pub confirmed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancel_reason: Option<String>,
    pub completion_latitude: Option<f64>,
    pub completion_longitude: Option<f64>,
    pub feedback: Option<String>,
    pub rating: Option<i16>,
    pub interest_level: Option<InterestLevel>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Dados gravados na conclusão da visita
#[derive(Debug, Clone)]
pub struct VisitCompletion {
    pub latitude: f64,
    pub longitude: f64,
    pub feedback: Option<String>,
    pub rating: Option<i16>,
    pub interest_level: Option<InterestLevel>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VisitFilter {
    pub status: Option<VisitStatus>,
    pub lead_id: Option<Uuid>,
    pub listing_id: Option<Uuid>,
    pub field_agent_id: Option<Uuid>,
    pub buyer_agent_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

// Roteiro: várias visitas do mesmo lead no mesmo dia
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitTour {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub field_agent_id: Uuid,
    #[schema(value_type = String, format = Date, example = "2025-03-14")]
    pub tour_date: NaiveDate,
    pub status: TourStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TourDetail {
    #[serde(flatten)]
    pub tour: VisitTour,
    pub visits: Vec<Visit>,
}

/// `true` se as duas visitas ficam a menos de `VISIT_SLOT_MINUTES` uma da outra.
pub fn slots_overlap(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    (a - b).num_minutes().abs() < VISIT_SLOT_MINUTES
}

/// Algum dos horários já marcados colide com `at`?
pub fn slot_taken(existing: &[DateTime<Utc>], at: DateTime<Utc>) -> bool {
    existing.iter().any(|&other| slots_overlap(other, at))
}

/// Verificação do OTP informado pelo corretor de campo.
pub fn check_otp(
    stored: Option<&str>,
    generated_at: Option<DateTime<Utc>>,
    supplied: &str,
    ttl_minutes: i64,
    now: DateTime<Utc>,
) -> Result<(), crate::common::error::OtpFailure> {
    use crate::common::error::OtpFailure;

    let stored = stored.ok_or(OtpFailure::Missing)?;
    if stored != supplied.trim() {
        return Err(OtpFailure::Mismatch);
    }
    if let Some(generated_at) = generated_at {
        if (now - generated_at).num_minutes() >= ttl_minutes {
            return Err(OtpFailure::Expired);
        }
    }
    Ok(())
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleVisitPayload {
    pub lead_id: Uuid,
    pub listing_id: Uuid,
    pub field_agent_id: Option<Uuid>,
    pub buyer_agent_id: Option<Uuid>,
    pub tour_id: Option<Uuid>,
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleVisitPayload {
    pub scheduled_at: DateTime<Utc>,
    /// Troca opcional do corretor de campo
    pub field_agent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelVisitPayload {
    #[validate(length(max = 500, message = "invalid_length"))]
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteVisitPayload {
    #[validate(custom(function = "validate_otp_format"))]
    #[schema(example = "482913")]
    pub otp: String,

    #[validate(range(min = -90.0, max = 90.0, message = "invalid_latitude"))]
    #[schema(example = -23.5613)]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "invalid_longitude"))]
    #[schema(example = -46.6565)]
    pub longitude: f64,

    #[validate(length(max = 2000, message = "invalid_length"))]
    pub feedback: Option<String>,

    #[validate(range(min = 1, max = 5, message = "invalid_rating"))]
    pub rating: Option<i16>,

    pub interest_level: Option<InterestLevel>,
}

impl CompleteVisitPayload {
    pub fn completion(&self) -> VisitCompletion {
        VisitCompletion {
            latitude: self.latitude,
            longitude: self.longitude,
            feedback: self.feedback.clone(),
            rating: self.rating,
            interest_level: self.interest_level,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTourPayload {
    pub lead_id: Uuid,
    pub field_agent_id: Uuid,
    #[schema(value_type = String, format = Date, example = "2025-03-14")]
    pub tour_date: NaiveDate,
    #[validate(length(max = 1000, message = "invalid_length"))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachVisitPayload {
    pub visit_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TourStatusPayload {
    pub status: TourStatus,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TourFilter {
    pub field_agent_id: Option<Uuid>,
    /// Roteiros a partir desta data
    pub from_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{error::OtpFailure, status::StatusFlow};
    use chrono::Duration;

    #[test]
    fn completion_payload_checks_rating_and_otp() {
        let payload: CompleteVisitPayload = serde_json::from_value(serde_json::json!({
            "otp": "12a456",
            "latitude": -23.56,
            "longitude": -46.65,
            "rating": 6
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields["otp"][0].code, "invalid_otp_format");
        assert_eq!(fields["rating"][0].message.as_deref(), Some("invalid_rating"));
        assert!(!fields.contains_key("latitude"));
    }

    #[test]
    fn visit_completes_only_after_confirmation() {
        assert!(!VisitStatus::Pending.can_transition_to(VisitStatus::Completed));
        assert!(VisitStatus::Confirmed.can_transition_to(VisitStatus::Completed));
        assert!(VisitStatus::Pending.can_transition_to(VisitStatus::Cancelled));
        assert!(VisitStatus::Completed.is_terminal());
        assert!(!VisitStatus::Cancelled.can_transition_to(VisitStatus::Pending));
    }

    #[test]
    fn slot_overlap_uses_sixty_minute_window() {
        let base = Utc::now();
        assert!(slots_overlap(base, base + Duration::minutes(59)));
        assert!(slots_overlap(base, base - Duration::minutes(30)));
        assert!(!slots_overlap(base, base + Duration::minutes(60)));
        assert!(!slots_overlap(base, base - Duration::hours(2)));
    }

    #[test]
    fn slot_is_taken_only_inside_the_window() {
        let at = Utc::now();
        // Visitas nas bordas exatas da janela não colidem
        let edges = [at - Duration::minutes(60), at + Duration::minutes(60)];
        assert!(!slot_taken(&edges, at));
        assert!(!slot_taken(&[], at));

        let busy = [at - Duration::minutes(60), at + Duration::minutes(45)];
        assert!(slot_taken(&busy, at));
    }

    #[test]
    fn otp_must_match_exactly() {
        let now = Utc::now();
        assert_eq!(check_otp(Some("123456"), Some(now), "123456", 60, now), Ok(()));
        assert_eq!(check_otp(Some("123456"), Some(now), " 123456 ", 60, now), Ok(()));
        assert_eq!(
            check_otp(Some("123456"), Some(now), "123457", 60, now),
            Err(OtpFailure::Mismatch)
        );
        assert_eq!(
            check_otp(Some("123456"), Some(now), "12345", 60, now),
            Err(OtpFailure::Mismatch)
        );
    }

    #[test]
    fn otp_missing_or_expired() {
        let now = Utc::now();
        assert_eq!(check_otp(None, None, "123456", 60, now), Err(OtpFailure::Missing));
        let issued = now - Duration::minutes(61);
        assert_eq!(
            check_otp(Some("123456"), Some(issued), "123456", 60, now),
            Err(OtpFailure::Expired)
        );
    }

    #[test]
    fn otp_is_not_serialized() {
        let visit = Visit {
            id: Uuid::new_v4(),
            lead_id: Uuid::new_v4(),
            listing_id: Uuid::new_v4(),
            field_agent_id: None,
            buyer_agent_id: None,
            tour_id: None,
            scheduled_at: Utc::now(),
            status: VisitStatus::Confirmed,
            otp_code: Some("654321".into()),
            otp_generated_at: Some(Utc::now()),
            confirmed_at: Some(Utc::now()),
            completed_at: None,
            cancelled_at: None,
            cancel_reason: None,
            completion_latitude: None,
            completion_longitude: None,
            feedback: None,
            rating: None,
            interest_level: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&visit).unwrap();
        assert!(!json.contains("654321"));
        assert!(!json.contains("otpCode"));
    }
}
