// ABOUTME: Integration tests for the two-phase parameter validator and typed queries
// ABOUTME: Required-field collection, relationship rules, display names and defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use carbon_aware::parameters::{
    AverageQuery, CarbonAwareParameters, DisplayNames, EmissionsQuery, ForecastAsOfQuery,
    ForecastQuery, ParameterValidator, PropertyName, Relationship,
};
use chrono::Duration;
use common::t0;

#[test]
fn test_all_missing_required_properties_are_reported() {
    let errors = ParameterValidator::new()
        .require(&[PropertyName::SingleLocation, PropertyName::Start, PropertyName::End])
        .validate(CarbonAwareParameters::default())
        .unwrap_err();

    assert_eq!(errors.len(), 3);
    assert_eq!(errors.messages("Start").unwrap(), ["Start is not set"]);
    assert_eq!(errors.messages("End").unwrap(), ["End is not set"]);
    assert_eq!(
        errors.messages("SingleLocation").unwrap(),
        ["SingleLocation is not set"]
    );
}

#[test]
fn test_relationships_are_not_checked_while_fields_are_missing() {
    let parameters = CarbonAwareParameters {
        start: Some(t0() + Duration::hours(1)),
        end: Some(t0()),
        ..CarbonAwareParameters::default()
    };
    let errors = ParameterValidator::new()
        .require(&[PropertyName::MultipleLocations])
        .validate(parameters)
        .unwrap_err();

    assert_eq!(errors.len(), 1);
    assert!(errors.messages("Start").is_none());
}

#[test]
fn test_start_must_precede_end() {
    let query = EmissionsQuery::new(["eastus"]).between(Some(t0()), Some(t0()));
    let errors = ParameterValidator::new()
        .require(&[PropertyName::MultipleLocations])
        .validate(query.to_parameters())
        .unwrap_err();

    assert_eq!(errors.messages("Start").unwrap(), ["Start must be before End"]);
}

#[test]
fn test_start_required_if_end() {
    let query = EmissionsQuery::new(["eastus"]).between(None, Some(t0()));
    let validator = ParameterValidator::new().require(&[PropertyName::MultipleLocations]);

    assert!(validator.validate(query.to_parameters()).is_ok());

    let errors = validator
        .check(&[Relationship::StartRequiredIfEnd])
        .validate(query.to_parameters())
        .unwrap_err();
    assert_eq!(
        errors.messages("Start").unwrap(),
        ["Start must be defined if End is defined"]
    );
}

#[test]
fn test_display_names_rename_keys_and_messages() {
    let names = DisplayNames::new()
        .with(PropertyName::Start, "startTime")
        .with(PropertyName::End, "endTime");
    let query = AverageQuery::new("eastus", t0() + Duration::hours(2), t0());
    let errors = ParameterValidator::new()
        .require(&[PropertyName::SingleLocation, PropertyName::Start, PropertyName::End])
        .with_display_names(names)
        .validate(query.to_parameters())
        .unwrap_err();

    assert_eq!(
        errors.messages("startTime").unwrap(),
        ["startTime must be before endTime"]
    );
    assert_eq!(
        errors.to_string(),
        "Invalid parameters: startTime [startTime must be before endTime]"
    );
}

#[test]
fn test_validated_defaults() {
    let query = EmissionsQuery::new(["eastus", "", "westus"]);
    let validated = ParameterValidator::new()
        .require(&[PropertyName::MultipleLocations])
        .validate(query.to_parameters())
        .unwrap();

    assert_eq!(validated.locations(), ["eastus", "westus"]);
    let start = validated.start_or(t0());
    assert_eq!(start, t0());
    assert_eq!(validated.end_or(start), t0());
    assert_eq!(validated.duration(), Duration::zero());
}

#[test]
fn test_forecast_queries_carry_window_and_requested_instant() {
    let current = ForecastQuery::new(["eastus"]).with_window_size(Duration::minutes(30));
    let parameters = current.to_parameters();
    assert_eq!(parameters.duration, Some(Duration::minutes(30)));
    assert!(parameters.is_set(PropertyName::MultipleLocations));

    let as_of = ForecastAsOfQuery::new("eastus", t0());
    let validated = ParameterValidator::new()
        .require(&[PropertyName::SingleLocation, PropertyName::Requested])
        .validate(as_of.to_parameters())
        .unwrap();
    assert_eq!(validated.single_location(), Some("eastus"));
    assert_eq!(validated.requested(), Some(t0()));
}
