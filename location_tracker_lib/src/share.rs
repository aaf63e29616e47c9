use crate::location_sample::LocationSample;

pub const MAPS_LINK_PREFIX: &str = "maps.apple.com/?ll=";

/// Message body pointing at the most recent sample, or None before the first fix.
pub fn location_message(samples: &[LocationSample]) -> Option<String> {
    samples.last().map(maps_link)
}

pub fn maps_link(sample: &LocationSample) -> String {
    format!("{}{},{}", MAPS_LINK_PREFIX, sample.latitude(), sample.longitude())
}
