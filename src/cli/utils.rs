//! Utilities for creating the command line interface.

use crate::{
    exit_on_error, exit_on_false, exit_with_error,
    io::{OverwriteMode, Verbosity},
    num::BFloat,
};
use clap::ArgMatches;
use std::str::FromStr;

pub fn parse_value_string<T>(argument_name: &str, value_string: &str) -> T
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    exit_on_error!(
        value_string.parse(),
        "Error: Could not parse value for {0}: {1}",
        argument_name
    )
}

fn parse_value_strings<'a, 'b, T, I>(argument_name: &'a str, value_strings: I) -> Vec<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
    I: Iterator<Item = &'b str>,
{
    value_strings
        .filter_map(|value_string| {
            if value_string.is_empty() {
                None
            } else {
                Some(parse_value_string(argument_name, value_string))
            }
        })
        .collect()
}

fn verify_finite_float_value<F: BFloat>(argument_name: &str, value: F) {
    exit_on_false!(value.is_finite(), "Error: {} must be finite", argument_name);
}

pub fn verify_argument_value_count<T>(argument_name: &str, values: &[T], required_count: usize) {
    let count = values.len();
    exit_on_false!(
        count == required_count,
        "Error: {} must have {} values, got {}",
        argument_name,
        required_count,
        count
    );
}

pub fn get_value_from_required_parseable_argument<T>(
    arguments: &ArgMatches,
    argument_name: &str,
) -> T
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let value_string = arguments
        .value_of(argument_name)
        .unwrap_or_else(|| exit_with_error!("Error: No value for {}", argument_name));
    parse_value_string(argument_name, value_string)
}

pub fn get_finite_float_value_from_parseable_argument<F>(
    arguments: &ArgMatches,
    argument_name: &str,
) -> Option<F>
where
    F: BFloat + FromStr,
    <F as FromStr>::Err: std::fmt::Display,
{
    arguments.value_of(argument_name).map(|value_string| {
        let value: F = parse_value_string(argument_name, value_string);
        verify_finite_float_value(argument_name, value);
        value
    })
}

pub fn get_finite_float_value_from_required_parseable_argument<F>(
    arguments: &ArgMatches,
    argument_name: &str,
) -> F
where
    F: BFloat + FromStr,
    <F as FromStr>::Err: std::fmt::Display,
{
    let value: F = get_value_from_required_parseable_argument(arguments, argument_name);
    verify_finite_float_value(argument_name, value);
    value
}

pub fn get_values_from_required_parseable_argument<T>(
    arguments: &ArgMatches,
    argument_name: &str,
) -> Vec<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let value_strings = arguments
        .values_of(argument_name)
        .unwrap_or_else(|| exit_with_error!("Error: No values for {}", argument_name));
    parse_value_strings(argument_name, value_strings)
}

pub fn get_finite_float_values_from_required_parseable_argument<F>(
    arguments: &ArgMatches,
    argument_name: &str,
) -> Vec<F>
where
    F: BFloat + FromStr,
    <F as FromStr>::Err: std::fmt::Display,
{
    let values = get_values_from_required_parseable_argument(arguments, argument_name);
    values
        .iter()
        .for_each(|&value| verify_finite_float_value(argument_name, value));
    values
}

pub fn get_value_from_required_constrained_argument<T>(
    arguments: &ArgMatches,
    argument_name: &str,
    possible_value_strings: &[&str],
    possible_values: &[T],
) -> T
where
    T: Copy,
{
    let value_string = arguments
        .value_of(argument_name)
        .unwrap_or_else(|| exit_with_error!("Error: No value for {}", argument_name));
    possible_value_strings
        .iter()
        .zip(possible_values)
        .find(|(possible_value_string, _)| **possible_value_string == value_string)
        .map(|(_, possible_value)| *possible_value)
        .unwrap_or_else(|| {
            exit_with_error!(
                "Error: Invalid value for {}: {}",
                argument_name,
                value_string
            )
        })
}

pub fn overwrite_mode_from_arguments(arguments: &ArgMatches) -> OverwriteMode {
    if arguments.is_present("overwrite") {
        OverwriteMode::Always
    } else {
        OverwriteMode::Never
    }
}

pub fn parse_verbosity(arguments: &ArgMatches, support_progress: bool) -> Verbosity {
    if support_progress && arguments.is_present("progress") {
        Verbosity::Progress
    } else if arguments.is_present("verbose") {
        Verbosity::Messages
    } else {
        Verbosity::Quiet
    }
}
