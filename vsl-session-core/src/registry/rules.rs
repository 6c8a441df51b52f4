use crate::error::InvalidPayloadError;
use crate::registry::{RX_HEADER, SESSION_OPEN};
use crate::session::SessionFields;
use once_cell::sync::Lazy;
use regex::Regex;

// `<client ip> <client port> [<local ip>]:<local port>`
static SESSION_OPEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^((?:[0-9]+\.){3}[0-9]+) [0-9]+ (?:(?:[0-9]+\.){3}[0-9]+)?:[0-9]+$")
        .expect("session open pattern is valid")
});

pub(crate) fn session_open(
    fields: &mut SessionFields,
    payload: &str,
) -> Result<(), InvalidPayloadError> {
    let caps = SESSION_OPEN_PATTERN
        .captures(payload)
        .ok_or_else(|| InvalidPayloadError::new(SESSION_OPEN, payload))?;

    fields.ip = Some(caps[1].to_string());
    Ok(())
}

pub(crate) fn session_close(
    _fields: &mut SessionFields,
    _payload: &str,
) -> Result<(), InvalidPayloadError> {
    Ok(())
}

pub(crate) fn rx_header(
    fields: &mut SessionFields,
    payload: &str,
) -> Result<(), InvalidPayloadError> {
    let (name, value) = payload
        .split_once(':')
        .ok_or_else(|| InvalidPayloadError::new(RX_HEADER, payload))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(InvalidPayloadError::new(RX_HEADER, payload));
    }

    fields.set_header(name, value.trim_start());
    Ok(())
}
