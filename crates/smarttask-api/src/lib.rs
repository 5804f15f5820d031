// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod dto;
pub mod errors;

pub use dto::{CreateSubtaskBody, CreateTaskBody, ErrorBody, UpdateBody};
pub use errors::{map_error_status, ApiError, ApiErrorCode};

pub const CRATE_NAME: &str = "smarttask-api";
