use std::num::IntErrorKind;

use super::error::RejectionReason;
use super::model::{RouteCategory, RouteForm, RouteRequest};

/// Turn raw form input into a [`RouteRequest`]. The first failing rule wins:
/// route number first, then the segment number (only when segment mode is on).
pub fn validate(
    category: RouteCategory,
    route_number_field: &str,
    segment_enabled: bool,
    segment_field: &str,
) -> Result<RouteRequest, RejectionReason> {
    let route_number = parse_positive(
        route_number_field,
        FieldRejections {
            required: RejectionReason::RouteNumberRequired,
            not_a_number: RejectionReason::RouteNumberNotANumber,
            not_positive: RejectionReason::RouteNumberNotPositive,
            too_large: RejectionReason::RouteNumberTooLarge,
        },
    )?;

    let segment = if segment_enabled {
        Some(parse_positive(
            segment_field,
            FieldRejections {
                required: RejectionReason::SegmentNumberRequired,
                not_a_number: RejectionReason::SegmentNumberNotANumber,
                not_positive: RejectionReason::SegmentNumberNotPositive,
                too_large: RejectionReason::SegmentNumberTooLarge,
            },
        )?)
    } else {
        None
    };

    Ok(RouteRequest::new(category, route_number, segment))
}

pub fn validate_form(form: &RouteForm) -> Result<RouteRequest, RejectionReason> {
    validate(
        form.category,
        &form.route_number,
        form.segment_enabled,
        &form.segment_number,
    )
}

struct FieldRejections {
    required: RejectionReason,
    not_a_number: RejectionReason,
    not_positive: RejectionReason,
    too_large: RejectionReason,
}

fn parse_positive(raw: &str, rejections: FieldRejections) -> Result<u32, RejectionReason> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(rejections.required);
    }

    let value = raw.parse::<i64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => rejections.too_large,
        IntErrorKind::NegOverflow => rejections.not_positive,
        _ => rejections.not_a_number,
    })?;

    if value < 1 {
        return Err(rejections.not_positive);
    }

    u32::try_from(value).map_err(|_| rejections.too_large)
}
