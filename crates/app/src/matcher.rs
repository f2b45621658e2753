//! Rule matcher — pure selection of the rule to apply for an event.
//!
//! A candidate must respond to the event's trigger type, apply in the
//! current zone (or carry the wildcard), accept the payload, and be outside
//! its cooldown window. Among survivors the highest priority wins; ties
//! break by ascending rule id, so selection is reproducible across runs
//! regardless of document or arrival order.

use zoneshift_domain::event::TriggerEvent;
use zoneshift_domain::id::ZoneId;
use zoneshift_domain::rule::Rule;
use zoneshift_domain::time::Timestamp;

use crate::cooldown::CooldownTracker;
use crate::rule_store::RuleStore;

/// Select the rule to apply, or `None` when nothing matches.
///
/// Absence of a match is a normal outcome, not an error. Candidates that
/// match but sit inside their cooldown window are logged as suppressed.
#[must_use]
pub fn select_rule<'a>(
    store: &'a RuleStore,
    current_zone: &ZoneId,
    event: &TriggerEvent,
    cooldowns: &CooldownTracker,
    now: Timestamp,
) -> Option<&'a Rule> {
    let mut selected: Option<&Rule> = None;

    for rule in store.rules_for(event.trigger) {
        if !rule.from.matches(current_zone) {
            continue;
        }
        if !rule.condition.matches(&event.payload) {
            continue;
        }
        if !cooldowns.ready(rule, now) {
            tracing::info!(
                rule = %rule.id,
                event = %event.id,
                trigger = %event.trigger,
                "match suppressed by cooldown"
            );
            continue;
        }

        let wins = match selected {
            None => true,
            Some(best) => {
                rule.priority > best.priority
                    || (rule.priority == best.priority && rule.id < best.id)
            }
        };
        if wins {
            selected = Some(rule);
        }
    }

    if selected.is_none() {
        tracing::debug!(event = %event.id, trigger = %event.trigger, "no matching rule");
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use zoneshift_domain::event::{Payload, TriggerType};
    use zoneshift_domain::rule::{Condition, RuleSet};
    use zoneshift_domain::time;
    use zoneshift_domain::zone::{Zone, ZoneSelector};

    fn known_actions() -> HashSet<String> {
        ["notifyUser"].into_iter().map(str::to_string).collect()
    }

    fn store_with(rules: Vec<Rule>) -> RuleStore {
        let set = RuleSet {
            zones: vec![
                Zone::new("normal", "Normal"),
                Zone::new("sensitive", "Sensitive"),
                Zone::new("ultra", "Ultra"),
            ],
            default_zone: zoneshift_domain::id::ZoneId::from("normal"),
            rules,
        };
        RuleStore::new(set, &known_actions()).unwrap()
    }

    fn rule(id: &str, from: ZoneSelector, priority: u32) -> Rule {
        Rule::builder()
            .id(id)
            .from(from)
            .to("ultra")
            .trigger(TriggerType::UsbPlugged)
            .action("notifyUser")
            .priority(priority)
            .build()
            .unwrap()
    }

    fn usb_event() -> TriggerEvent {
        let mut payload = Payload::new();
        payload.insert("class".to_string(), "mass_storage".into());
        TriggerEvent::new(TriggerType::UsbPlugged, payload, "test")
    }

    #[test]
    fn should_select_only_rule_matching_trigger_zone_and_condition() {
        let store = store_with(vec![rule("r1", ZoneSelector::Any, 10)]);
        let selected = select_rule(
            &store,
            &ZoneId::from("normal"),
            &usb_event(),
            &CooldownTracker::new(),
            time::now(),
        );
        assert_eq!(selected.unwrap().id.as_str(), "r1");
    }

    #[test]
    fn should_return_none_when_no_rule_matches_trigger() {
        let store = store_with(vec![rule("r1", ZoneSelector::Any, 10)]);
        let event = TriggerEvent::new(TriggerType::UrlVisited, Payload::new(), "test");
        let selected = select_rule(
            &store,
            &ZoneId::from("normal"),
            &event,
            &CooldownTracker::new(),
            time::now(),
        );
        assert!(selected.is_none());
    }

    #[test]
    fn should_skip_rule_whose_source_zone_differs() {
        let store = store_with(vec![rule(
            "r1",
            ZoneSelector::Zone(ZoneId::from("sensitive")),
            10,
        )]);
        let selected = select_rule(
            &store,
            &ZoneId::from("normal"),
            &usb_event(),
            &CooldownTracker::new(),
            time::now(),
        );
        assert!(selected.is_none());
    }

    #[test]
    fn should_skip_rule_whose_condition_rejects_payload() {
        let mut guarded = rule("r1", ZoneSelector::Any, 10);
        guarded.condition = Condition::Equals {
            field: "class".to_string(),
            value: "hid".to_string(),
        };
        let store = store_with(vec![guarded]);
        let selected = select_rule(
            &store,
            &ZoneId::from("normal"),
            &usb_event(),
            &CooldownTracker::new(),
            time::now(),
        );
        assert!(selected.is_none());
    }

    #[test]
    fn should_prefer_higher_priority() {
        let store = store_with(vec![
            rule("low", ZoneSelector::Any, 10),
            rule("high", ZoneSelector::Any, 20),
        ]);
        let selected = select_rule(
            &store,
            &ZoneId::from("normal"),
            &usb_event(),
            &CooldownTracker::new(),
            time::now(),
        );
        assert_eq!(selected.unwrap().id.as_str(), "high");
    }

    #[test]
    fn should_break_priority_ties_by_ascending_rule_id() {
        let store = store_with(vec![
            rule("b-rule", ZoneSelector::Any, 10),
            rule("a-rule", ZoneSelector::Any, 10),
        ]);
        let selected = select_rule(
            &store,
            &ZoneId::from("normal"),
            &usb_event(),
            &CooldownTracker::new(),
            time::now(),
        );
        assert_eq!(selected.unwrap().id.as_str(), "a-rule");
    }

    #[test]
    fn should_select_deterministically_across_repeated_runs() {
        let store = store_with(vec![
            rule("c", ZoneSelector::Any, 5),
            rule("a", ZoneSelector::Any, 5),
            rule("b", ZoneSelector::Any, 5),
        ]);
        let now = time::now();
        let event = usb_event();
        let cooldowns = CooldownTracker::new();
        for _ in 0..10 {
            let selected =
                select_rule(&store, &ZoneId::from("normal"), &event, &cooldowns, now);
            assert_eq!(selected.unwrap().id.as_str(), "a");
        }
    }

    #[test]
    fn should_suppress_rule_inside_cooldown_window() {
        let mut cooled = rule("r1", ZoneSelector::Any, 10);
        cooled.cooldown_seconds = 5;
        let store = store_with(vec![cooled]);
        let now = time::now();
        let mut cooldowns = CooldownTracker::new();
        cooldowns.mark_fired(zoneshift_domain::id::RuleId::from("r1"), now);

        let selected = select_rule(
            &store,
            &ZoneId::from("normal"),
            &usb_event(),
            &cooldowns,
            now + chrono::Duration::seconds(2),
        );
        assert!(selected.is_none());
    }

    #[test]
    fn should_fall_back_to_lower_priority_when_winner_is_cooling_down() {
        let mut high = rule("high", ZoneSelector::Any, 20);
        high.cooldown_seconds = 60;
        let store = store_with(vec![high, rule("low", ZoneSelector::Any, 10)]);
        let now = time::now();
        let mut cooldowns = CooldownTracker::new();
        cooldowns.mark_fired(zoneshift_domain::id::RuleId::from("high"), now);

        let selected = select_rule(
            &store,
            &ZoneId::from("normal"),
            &usb_event(),
            &cooldowns,
            now + chrono::Duration::seconds(1),
        );
        assert_eq!(selected.unwrap().id.as_str(), "low");
    }
}
