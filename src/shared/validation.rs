use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating push topic names
    /// Same character set push providers accept for topic names
    /// - Valid: "authorities", "location_4071_-7401", "category_Safety"
    /// - Invalid: "", "two words", "topic/with/slash", "émoji"
    pub static ref TOPIC_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9\-_.~%]+$").unwrap();
}

/// Returns true when `topic` can be sent to or subscribed to
pub fn is_valid_topic(topic: &str) -> bool {
    TOPIC_REGEX.is_match(topic)
}
