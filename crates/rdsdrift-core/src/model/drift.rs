use serde::Serialize;

/// One setting on which two sources disagree.
///
/// `None` on a side means the setting is absent there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftRecord {
    pub name: String,
    pub a: Option<String>,
    pub b: Option<String>,
    /// Unit reported by either side, for display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl DriftRecord {
    pub fn new(name: impl Into<String>, a: Option<&str>, b: Option<&str>) -> Self {
        Self {
            name: name.into(),
            a: a.map(str::to_owned),
            b: b.map(str::to_owned),
            unit: None,
        }
    }

    /// Present on one side only.
    pub fn is_absence(&self) -> bool {
        self.a.is_none() || self.b.is_none()
    }
}
