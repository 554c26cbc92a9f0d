//! Builds the title/compact/expanded status text from module state.

use crate::monitor::registry::Registry;

pub const APP_TITLE: &str = "Extension Box";
pub const ALL_DISABLED: &str = "All extensions disabled";
pub const NOTHING_ENABLED: &str = "Enable extensions from the app";

/// Module whose headline is surfaced in the title.
pub const PRIMARY_MODULE: &str = "battery";

const COMPACT_SEPARATOR: &str = " • ";
const MAX_COMPACT_PARTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub title: String,
    pub compact: String,
    pub expanded: String,
}

pub struct ReportBuilder<'a> {
    registry: &'a Registry,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    pub fn build(&self) -> Report {
        Report {
            title: self.build_title(),
            compact: self.build_compact(),
            expanded: self.build_expanded(),
        }
    }

    pub fn build_title(&self) -> String {
        self.registry
            .get(PRIMARY_MODULE)
            .filter(|m| m.alive())
            .and_then(|m| m.headline())
            .map(|headline| format!("{}{}{}", APP_TITLE, COMPACT_SEPARATOR, headline))
            .unwrap_or_else(|| APP_TITLE.to_string())
    }

    pub fn build_compact(&self) -> String {
        let parts: Vec<String> = self
            .registry
            .iter()
            .filter(|m| m.alive())
            .map(|m| m.compact())
            .filter(|c| !c.is_empty())
            .take(MAX_COMPACT_PARTS)
            .collect();

        if parts.is_empty() {
            ALL_DISABLED.to_string()
        } else {
            parts.join(COMPACT_SEPARATOR)
        }
    }

    pub fn build_expanded(&self) -> String {
        let lines: Vec<String> = self
            .registry
            .iter()
            .filter(|m| m.alive())
            .map(|m| m.detail())
            .filter(|d| !d.is_empty())
            .collect();

        if lines.is_empty() {
            NOTHING_ENABLED.to_string()
        } else {
            lines.join("\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::lifecycle::{LifecycleSynchronizer, ScheduleState};
    use crate::monitor::module::Module;
    use crate::monitor::store::AggregationStore;
    use crate::monitor::testing::{FakeModule, Harness};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn started(modules: Vec<Box<dyn Module>>) -> Registry {
        let harness = Harness::new();
        let mut registry = Registry::new(modules).unwrap();
        let sync = LifecycleSynchronizer::new(
            harness.ctx.clone(),
            harness.system(),
            Arc::new(AggregationStore::new()),
        );
        sync.synchronize(&mut registry, &mut ScheduleState::new());
        registry
    }

    #[test]
    fn test_nothing_alive_uses_fallbacks() {
        let registry = Registry::new(vec![Box::new(FakeModule::new("a", 1000))]).unwrap();
        let report = ReportBuilder::new(&registry).build();

        assert_eq!(report.title, "Extension Box");
        assert_eq!(report.compact, "All extensions disabled");
        assert_eq!(report.expanded, "Enable extensions from the app");
    }

    #[test]
    fn test_compact_takes_first_four_in_order() {
        let registry = started(vec![
            Box::new(FakeModule::new("m1", 1000)),
            Box::new(FakeModule::new("m2", 1000)),
            Box::new(FakeModule::new("m3", 1000)),
            Box::new(FakeModule::new("m4", 1000)),
            Box::new(FakeModule::new("m5", 1000)),
        ]);

        let builder = ReportBuilder::new(&registry);
        assert_eq!(builder.build_compact(), "m1 • m2 • m3 • m4");
        assert_eq!(
            builder.build_expanded(),
            "m1 detail\nm2 detail\nm3 detail\nm4 detail\nm5 detail"
        );
    }

    #[test]
    fn test_empty_fragments_are_skipped() {
        let registry = started(vec![
            Box::new(FakeModule::new("quiet", 1000).with_compact("")),
            Box::new(FakeModule::new("loud", 1000)),
            Box::new(FakeModule::new("off", 1000).disabled_by_default()),
        ]);

        let builder = ReportBuilder::new(&registry);
        assert_eq!(builder.build_compact(), "loud");
        assert_eq!(builder.build_expanded(), "loud detail");
    }

    #[test]
    fn test_title_uses_primary_headline() {
        let registry = started(vec![
            Box::new(FakeModule::new("network", 1000).with_headline("ignored")),
            Box::new(FakeModule::new("battery", 1000).with_headline("85%")),
        ]);
        assert_eq!(
            ReportBuilder::new(&registry).build_title(),
            "Extension Box • 85%"
        );

        let registry = started(vec![Box::new(
            FakeModule::new("battery", 1000)
                .with_headline("85%")
                .disabled_by_default(),
        )]);
        assert_eq!(ReportBuilder::new(&registry).build_title(), "Extension Box");
    }

    #[test]
    fn test_build_is_repeatable() {
        let registry = started(vec![Box::new(FakeModule::new("a", 1000))]);
        let builder = ReportBuilder::new(&registry);
        assert_eq!(builder.build(), builder.build());
    }
}
