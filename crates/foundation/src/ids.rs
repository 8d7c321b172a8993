use std::fmt;

/// Prefix shared by every place overlay source on the map.
pub const OVERLAY_PREFIX: &str = "place-";

/// Identifier of a selectable place (country, state or city).
///
/// Unique across every level of the location hierarchy.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlaceId(String);

impl PlaceId {
    pub fn new(id: impl Into<String>) -> Self {
        PlaceId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the overlay source backing this place.
    pub fn source_id(&self) -> String {
        format!("{OVERLAY_PREFIX}{}", self.0)
    }

    pub fn fill_layer_id(&self) -> String {
        format!("{OVERLAY_PREFIX}{}-fill", self.0)
    }

    pub fn line_layer_id(&self) -> String {
        format!("{OVERLAY_PREFIX}{}-line", self.0)
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlaceId {
    fn from(s: &str) -> Self {
        PlaceId::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::PlaceId;

    #[test]
    fn overlay_names_follow_convention() {
        let id = PlaceId::new("sp");
        assert_eq!(id.source_id(), "place-sp");
        assert_eq!(id.fill_layer_id(), "place-sp-fill");
        assert_eq!(id.line_layer_id(), "place-sp-line");
    }
}
