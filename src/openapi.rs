use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers::{bookings, coaches, courts, equipment, pricing, pricing_rules};
use crate::models::{
    AvailabilityWindow, Booking, BookingResources, BookingStatus, BookingView, Coach,
    CoachSummary, Court, CourtSummary, CourtType, Equipment, EquipmentLine, EquipmentSummary,
    PricingBreakdown, PricingRule, RuleCondition, RuleKind,
};
use crate::requests::{
    BookingRequest, CoachRequest, CourtRequest, EquipmentLineRequest, EquipmentRequest,
    PricingRuleRequest, RuleConditionRequest,
};
use crate::responses::{CancelBookingResponse, MessageResponse};

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        courts::list_courts,
        courts::get_court,
        courts::list_all_courts,
        courts::create_court,
        courts::update_court,
        courts::delete_court,
        coaches::list_coaches,
        coaches::get_coach,
        coaches::create_coach,
        coaches::update_coach,
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        pricing_rules::list_pricing_rules,
        pricing_rules::get_pricing_rule,
        pricing_rules::create_pricing_rule,
        pricing_rules::update_pricing_rule,
        pricing_rules::delete_pricing_rule,
        pricing::estimate,
        bookings::create_booking,
        bookings::user_bookings,
        bookings::all_bookings,
        bookings::cancel_booking
    ),
    components(schemas(
        Court,
        CourtType,
        Coach,
        AvailabilityWindow,
        Equipment,
        PricingRule,
        RuleKind,
        RuleCondition,
        Booking,
        BookingStatus,
        BookingResources,
        EquipmentLine,
        PricingBreakdown,
        BookingView,
        CourtSummary,
        CoachSummary,
        EquipmentSummary,
        BookingRequest,
        EquipmentLineRequest,
        CourtRequest,
        CoachRequest,
        EquipmentRequest,
        PricingRuleRequest,
        RuleConditionRequest,
        MessageResponse,
        CancelBookingResponse
    )),
    tags(
        (name = "health", description = "Service status"),
        (name = "courts", description = "Court catalog"),
        (name = "coaches", description = "Coach catalog"),
        (name = "equipment", description = "Rentable equipment"),
        (name = "pricing", description = "Pricing rules and estimates"),
        (name = "bookings", description = "Court reservations")
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_booking_paths_and_bearer_scheme() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/bookings"));
        assert!(doc.paths.paths.contains_key("/bookings/{id}/cancel"));
        assert!(doc.paths.paths.contains_key("/pricing/estimate"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
