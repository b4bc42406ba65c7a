// ABOUTME: Renders text as a QR code PNG and wraps it in a data URL
// ABOUTME: Used to hand the WeChat connect URL to browsers as a ready-to-show image
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

use crate::errors::{AppError, AppResult};
use base64::{engine::general_purpose, Engine as _};
use image::{ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use std::io::Cursor;

/// Pixels per QR module
const MODULE_SIZE: u32 = 10;

/// Prefix of every rendered image
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Render `content` as a black on white PNG QR code, returned as a data URL
///
/// Uses low error correction and the standard four-module quiet zone.
///
/// # Errors
///
/// Returns an internal error if the content does not fit in a QR code or the
/// PNG encoder fails
pub fn png_data_url(content: &str) -> AppResult<String> {
    let code = QrCode::with_error_correction_level(content.as_bytes(), EcLevel::L)
        .map_err(|e| AppError::internal(format!("QR encoding failed: {e}")))?;

    let image = code
        .render::<Luma<u8>>()
        .module_dimensions(MODULE_SIZE, MODULE_SIZE)
        .quiet_zone(true)
        .build();

    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| AppError::internal(format!("QR image encoding failed: {e}")))?;

    Ok(format!(
        "{PNG_DATA_URL_PREFIX}{}",
        general_purpose::STANDARD.encode(png)
    ))
}
