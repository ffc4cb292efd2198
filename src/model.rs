use serde::Serialize;

/// Unit kind, derived from the name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Service,
    Socket,
    Timer,
    Target,
    Path,
    Mount,
    Automount,
    Swap,
    Scope,
    Slice,
    Device,
    Other,
}

impl UnitKind {
    pub fn from_name(name: &str) -> Self {
        match name.rsplit_once('.').map(|(_, suffix)| suffix) {
            Some("service") => UnitKind::Service,
            Some("socket") => UnitKind::Socket,
            Some("timer") => UnitKind::Timer,
            Some("target") => UnitKind::Target,
            Some("path") => UnitKind::Path,
            Some("mount") => UnitKind::Mount,
            Some("automount") => UnitKind::Automount,
            Some("swap") => UnitKind::Swap,
            Some("scope") => UnitKind::Scope,
            Some("slice") => UnitKind::Slice,
            Some("device") => UnitKind::Device,
            _ => UnitKind::Other,
        }
    }

    /// The suffix systemctl understands as a `--type=` value.
    pub fn as_str(self) -> &'static str {
        match self {
            UnitKind::Service => "service",
            UnitKind::Socket => "socket",
            UnitKind::Timer => "timer",
            UnitKind::Target => "target",
            UnitKind::Path => "path",
            UnitKind::Mount => "mount",
            UnitKind::Automount => "automount",
            UnitKind::Swap => "swap",
            UnitKind::Scope => "scope",
            UnitKind::Slice => "slice",
            UnitKind::Device => "device",
            UnitKind::Other => "other",
        }
    }
}

/// One row of `systemctl --user list-units` output.
///
/// Every listing is a fresh snapshot; units are never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unit {
    pub name: String,
    pub kind: UnitKind,
    pub load_state: String,
    pub active_state: String,
    pub sub_state: String,
    pub description: String,
    /// Enablement per `list-unit-files`/`is-enabled`. `None` when the manager
    /// reports no unit file state for the name (e.g. transient units).
    pub enabled: Option<bool>,
}

impl Unit {
    pub fn new(
        name: impl Into<String>,
        load_state: impl Into<String>,
        active_state: impl Into<String>,
        sub_state: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let kind = UnitKind::from_name(&name);
        Self {
            name,
            kind,
            load_state: load_state.into(),
            active_state: active_state.into(),
            sub_state: sub_state.into(),
            description: description.into(),
            enabled: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.active_state == "active" && self.sub_state == "running"
    }

    pub fn is_failed(&self) -> bool {
        self.active_state == "failed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_name_suffix() {
        assert_eq!(UnitKind::from_name("foo.service"), UnitKind::Service);
        assert_eq!(UnitKind::from_name("backup.timer"), UnitKind::Timer);
        assert_eq!(UnitKind::from_name("gpg-agent.socket"), UnitKind::Socket);
        assert_eq!(UnitKind::from_name("default.target"), UnitKind::Target);
        assert_eq!(UnitKind::from_name("no-suffix"), UnitKind::Other);
        assert_eq!(UnitKind::from_name("weird.frobnicator"), UnitKind::Other);
    }

    #[test]
    fn running_and_failed_predicates() {
        let running = Unit::new("a.service", "loaded", "active", "running", "");
        assert!(running.is_running());
        assert!(!running.is_failed());

        let failed = Unit::new("b.service", "loaded", "failed", "failed", "");
        assert!(!failed.is_running());
        assert!(failed.is_failed());

        let oneshot = Unit::new("c.service", "loaded", "active", "exited", "");
        assert!(!oneshot.is_running());
    }

    #[test]
    fn unit_serializes_with_kind() {
        let unit = Unit::new("foo.timer", "loaded", "active", "waiting", "Foo timer");
        let json = serde_json::to_value(&unit).unwrap();
        assert_eq!(json["name"], "foo.timer");
        assert_eq!(json["kind"], "timer");
        assert_eq!(json["sub_state"], "waiting");
        // unknown until joined against unit file state
        assert!(json["enabled"].is_null());
    }

    #[test]
    fn unit_serializes_enablement_when_known() {
        let mut unit = Unit::new("foo.service", "loaded", "active", "running", "Foo");
        unit.enabled = Some(true);
        let json = serde_json::to_value(&unit).unwrap();
        assert_eq!(json["enabled"], true);
    }
}
